//! Connection: reference resolution and backreference registration

use tracing::{debug, trace};

use super::keys;
use crate::error::{GfaError, Result};
use crate::gfa::{stale, Gfa, LineId};
use crate::line::alignment_type::edge_keys;
use crate::line::{Line, LineKind};
use crate::value::{LineRef, OrientedLine, Orientation, Value};
use crate::version::Version;

/// Where a reference is stored in its line.
#[derive(Debug, Clone)]
enum Slot {
    Field(String),
    Item(String, usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expected {
    Segment,
    Any,
}

#[derive(Debug, Clone)]
struct Reference {
    slot: Slot,
    name: String,
    expected: Expected,
    key: String,
}

fn push_ref(refs: &mut Vec<Reference>, slot: Slot, line: &LineRef, expected: Expected, key: &str) {
    if let LineRef::Name(name) = line {
        refs.push(Reference {
            slot,
            name: name.clone(),
            expected,
            key: key.to_string(),
        });
    }
}

fn dovetail_key(exit: bool, orient: Orientation) -> &'static str {
    if exit == orient.is_forward() {
        keys::DOVETAILS_R
    } else {
        keys::DOVETAILS_L
    }
}

fn gap_key(first: bool, orient: Orientation) -> &'static str {
    if first == orient.is_forward() {
        keys::GAPS_R
    } else {
        keys::GAPS_L
    }
}

/// Unresolved references of a line, with the key each target receives.
fn references_of(line: &Line) -> Result<Vec<Reference>> {
    let mut refs = Vec::new();
    let field = |name: &str| Slot::Field(name.to_string());
    match line.kind() {
        LineKind::Link => {
            let from = line.oriented_from()?;
            let to = line.oriented_to()?;
            let from_key = dovetail_key(true, from.orient);
            let to_key = dovetail_key(false, to.orient);
            push_ref(&mut refs, field("from_segment"), &from.line, Expected::Segment, from_key);
            push_ref(&mut refs, field("to_segment"), &to.line, Expected::Segment, to_key);
        }
        LineKind::Containment => {
            let from = line.oriented_from()?;
            let to = line.oriented_to()?;
            let contained = keys::EDGES_TO_CONTAINED;
            let containers = keys::EDGES_TO_CONTAINERS;
            push_ref(&mut refs, field("from_segment"), &from.line, Expected::Segment, contained);
            push_ref(&mut refs, field("to_segment"), &to.line, Expected::Segment, containers);
        }
        LineKind::Edge => {
            let (sid1, sid2) = (line.sid1()?, line.sid2()?);
            let (st1, st2) = line.edge_side_types()?;
            let (key1, key2) = edge_keys(st1, sid1.orient, st2, sid2.orient);
            push_ref(&mut refs, field("sid1"), &sid1.line, Expected::Segment, key1);
            push_ref(&mut refs, field("sid2"), &sid2.line, Expected::Segment, key2);
        }
        LineKind::Gap => {
            let (sid1, sid2) = (line.sid1()?, line.sid2()?);
            let key1 = gap_key(true, sid1.orient);
            let key2 = gap_key(false, sid2.orient);
            push_ref(&mut refs, field("sid1"), &sid1.line, Expected::Segment, key1);
            push_ref(&mut refs, field("sid2"), &sid2.line, Expected::Segment, key2);
        }
        LineKind::Fragment => {
            let sid = line.line_ref("sid")?;
            push_ref(&mut refs, field("sid"), &sid, Expected::Segment, keys::FRAGMENTS);
        }
        LineKind::Path => {
            list_refs(&mut refs, line, "segment_names", Expected::Segment, keys::PATHS)?
        }
        LineKind::OrderedGroup => list_refs(&mut refs, line, "items", Expected::Any, keys::PATHS)?,
        LineKind::UnorderedGroup => list_refs(&mut refs, line, "items", Expected::Any, keys::SETS)?,
        LineKind::Custom => {
            for reference in &line.spec().references {
                let target = line.line_ref(&reference.field)?;
                push_ref(
                    &mut refs,
                    field(&reference.field),
                    &target,
                    Expected::Any,
                    &reference.backref_key,
                );
            }
        }
        _ => {}
    }
    Ok(refs)
}

fn list_refs(
    refs: &mut Vec<Reference>,
    line: &Line,
    name: &str,
    expected: Expected,
    key: &str,
) -> Result<()> {
    let Value::List(items) = line.try_get(name)? else {
        return Ok(());
    };
    for (i, item) in items.iter().enumerate() {
        let target = match item {
            Value::String(s) => LineRef::Name(s.clone()),
            Value::OrientedLine(ol) => ol.line.clone(),
            _ => continue,
        };
        push_ref(refs, Slot::Item(name.to_string(), i), &target, expected, key);
    }
    Ok(())
}

/// Store `target` in the slot of a reference.
fn point(line: &mut Line, slot: &Slot, target: LineId) -> Result<()> {
    let (name, index) = match slot {
        Slot::Field(name) => (name, None),
        Slot::Item(name, i) => (name, Some(*i)),
    };
    let missing = || GfaError::Assertion(format!("reference slot {:?} not found", slot));
    let mut value = line.get_mut(name)?.ok_or_else(missing)?;
    if let Some(i) = index {
        value = match value {
            Value::List(items) => items.get_mut(i).ok_or_else(missing)?,
            _ => return Err(missing()),
        };
    }
    match value {
        Value::OrientedLine(ol) => ol.line = LineRef::Line(target),
        other => *other = Value::Line(target),
    }
    Ok(())
}

fn placeholder_segment(version: Option<Version>) -> LineKind {
    match version {
        Some(Version::Gfa2) => LineKind::SegmentGfa2,
        _ => LineKind::SegmentGfa1,
    }
}

/// Whether a virtual line of kind `placeholder` may be replaced by a line of kind `real`.
fn can_replace(placeholder: LineKind, real: LineKind) -> bool {
    placeholder == LineKind::Unknown || placeholder == real
}

impl Gfa {
    /// Store a line, resolve its references and register it on its targets.
    pub(crate) fn connect(&mut self, line: Line) -> Result<LineId> {
        if let Some(name) = line.name() {
            if let Some(&existing) = self.names.get(name) {
                return self.connect_over(existing, line);
            }
        }
        if line.kind() == LineKind::Link {
            if let Some((existing, _)) = self.find_link(&line)? {
                return self.connect_over(existing, line);
            }
        }
        let id = self.store(line)?;
        if let Err(err) = self.link_references(id) {
            self.rollback(id);
            return Err(err);
        }
        debug!(line = %id, "connected");
        Ok(id)
    }

    /// Connect a line whose identity matches the existing line `existing`.
    fn connect_over(&mut self, existing: LineId, line: Line) -> Result<LineId> {
        let current = self.try_line(existing)?;
        if current.is_virtual() && can_replace(current.kind(), line.kind()) {
            return self.substitute(existing, line);
        }
        let message = match line.name() {
            Some(name) => format!(
                "name {} is already used by a {} line",
                name,
                current.record_type()
            ),
            None => format!(
                "the graph already has the link {}",
                self.line_to_string(existing)?
            ),
        };
        Err(GfaError::NotUnique(message))
    }

    pub(crate) fn store(&mut self, line: Line) -> Result<LineId> {
        let id = self.arena.insert(line);
        self.index_line(id)?;
        Ok(id)
    }

    /// Undo a failed connection; virtual lines created meanwhile stay.
    fn rollback(&mut self, id: LineId) {
        if let Ok(line) = self.unindex_line(id) {
            for (target, key) in &line.outgoing {
                if let Some(target) = self.arena.get_mut(*target) {
                    target.backrefs.remove(key, id);
                }
            }
        }
    }

    /// Resolve the named references of a stored line.
    pub(crate) fn link_references(&mut self, id: LineId) -> Result<()> {
        let line = self.try_line(id)?;
        let references = references_of(line)?;
        let version = line.version();
        let is_path = line.kind() == LineKind::Path;
        for reference in references {
            let target = self.resolve(&reference.name, reference.expected, version)?;
            let line = self.arena.get_mut(id).ok_or_else(|| stale(id))?;
            point(line, &reference.slot, target)?;
            self.register(target, &reference.key, id)?;
        }
        if is_path {
            self.link_path(id)?;
        }
        Ok(())
    }

    /// Handle of the line `name`, creating a virtual placeholder if needed.
    fn resolve(&mut self, name: &str, expected: Expected, version: Option<Version>) -> Result<LineId> {
        if let Some(&id) = self.names.get(name) {
            let line = self.try_line(id)?;
            return match (expected, line.kind()) {
                (Expected::Any, _) => Ok(id),
                (Expected::Segment, LineKind::SegmentGfa1 | LineKind::SegmentGfa2) => Ok(id),
                (Expected::Segment, LineKind::Unknown) if line.is_virtual() => {
                    let segment = Line::placeholder(placeholder_segment(version), name, self.vlevel())?;
                    self.substitute(id, segment)
                }
                (Expected::Segment, _) => Err(GfaError::Inconsistency(format!(
                    "{} is the name of a {} line, not of a segment",
                    name,
                    line.record_type()
                ))),
            };
        }
        if self.config().segments_first {
            return Err(GfaError::NotFound(format!(
                "line {} is referenced before being declared",
                name
            )));
        }
        let kind = match expected {
            Expected::Segment => placeholder_segment(version),
            Expected::Any => LineKind::Unknown,
        };
        let id = self.store(Line::placeholder(kind, name, self.vlevel())?)?;
        debug!(name, ?kind, "virtual line created");
        Ok(id)
    }

    /// Record that `source` references `target` under `key`.
    pub(crate) fn register(&mut self, target: LineId, key: &str, source: LineId) -> Result<()> {
        self.arena
            .get_mut(target)
            .ok_or_else(|| stale(target))?
            .backrefs
            .add(key, source);
        self.arena
            .get_mut(source)
            .ok_or_else(|| stale(source))?
            .outgoing
            .push((target, key.to_string()));
        trace!(%source, %target, key, "backreference registered");
        Ok(())
    }

    /// Attach a GFA1 path to the links between its consecutive segments.
    ///
    /// A path with as many overlaps as segments is circular and also uses
    /// the link from its last segment to its first one.
    fn link_path(&mut self, path: LineId) -> Result<()> {
        let line = self.try_line(path)?;
        let steps: Vec<OrientedLine> = match line.try_get("segment_names")? {
            Value::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::OrientedLine(ol) => Some(ol.clone()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        let overlaps: Vec<Value> = match line.try_get("overlaps")? {
            Value::List(items) => items.clone(),
            _ => Vec::new(),
        };
        let n = steps.len();
        let mut pairs: Vec<(usize, usize)> = (1..n).map(|i| (i - 1, i)).collect();
        if n > 0 && overlaps.len() == n {
            pairs.push((n - 1, 0));
        }
        for (a, b) in pairs {
            let overlap = overlaps.get(a).cloned().unwrap_or(Value::Placeholder);
            let (link, orient) = self.path_link(&steps[a], &steps[b], &overlap)?;
            self.register(link, keys::PATHS, path)?;
            self.arena
                .get_mut(path)
                .ok_or_else(|| stale(path))?
                .path_links
                .push(OrientedLine::new(link, orient));
        }
        Ok(())
    }

    /// Link from `a` to `b`, creating a virtual one if the graph has none.
    fn path_link(
        &mut self,
        a: &OrientedLine,
        b: &OrientedLine,
        overlap: &Value,
    ) -> Result<(LineId, Orientation)> {
        let (Some(a_id), Some(b_id)) = (a.id(), b.id()) else {
            return Err(GfaError::Assertion(
                "path steps are resolved before their links".to_string(),
            ));
        };
        if let Some((link, reversed)) = self.find_link_between(a_id, a.orient, b_id, b.orient)? {
            let orient = if reversed {
                Orientation::Reverse
            } else {
                Orientation::Forward
            };
            return Ok((link, orient));
        }
        let a_name = self.try_line(a_id)?.name().unwrap_or_default().to_string();
        let b_name = self.try_line(b_id)?.name().unwrap_or_default().to_string();
        let overlap = match overlap {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let mut link = Line::from_fields(
            &[
                "L",
                &a_name,
                &a.orient.to_string(),
                &b_name,
                &b.orient.to_string(),
                &overlap,
            ],
            Some(Version::Gfa1),
            self.vlevel(),
        )?;
        link.set_virtual(true);
        let id = self.store(link)?;
        self.link_references(id)?;
        debug!(link = %id, from = %a_name, to = %b_name, "virtual link created for path");
        Ok((id, Orientation::Forward))
    }

    /// Link joining `a` (leaving it in `ao`) to `b` (entering it in `bo`);
    /// the flag tells whether the link is stored as its complement.
    pub(crate) fn find_link_between(
        &self,
        a: LineId,
        ao: Orientation,
        b: LineId,
        bo: Orientation,
    ) -> Result<Option<(LineId, bool)>> {
        let segment = self.try_line(a)?;
        for id in segment.dovetails() {
            let link = self.try_line(id)?;
            if link.kind() != LineKind::Link {
                continue;
            }
            let from = link.oriented_from()?;
            let to = link.oriented_to()?;
            if from.id() == Some(a) && from.orient == ao && to.id() == Some(b) && to.orient == bo {
                return Ok(Some((id, false)));
            }
            if from.id() == Some(b)
                && from.orient == bo.invert()
                && to.id() == Some(a)
                && to.orient == ao.invert()
            {
                return Ok(Some((id, true)));
            }
        }
        Ok(None)
    }

    /// Existing link with the endpoints of a detached link.
    ///
    /// A real link matches only if its alignment is compatible; a virtual
    /// one matches on the endpoints alone.
    pub(crate) fn find_link(&self, line: &Line) -> Result<Option<(LineId, bool)>> {
        let from = line.oriented_from()?;
        let to = line.oriented_to()?;
        let (Some(a), Some(b)) = (
            from.name().and_then(|n| self.names.get(n)),
            to.name().and_then(|n| self.names.get(n)),
        ) else {
            return Ok(None);
        };
        let Some((existing, reversed)) = self.find_link_between(*a, from.orient, *b, to.orient)?
        else {
            return Ok(None);
        };
        let current = self.try_line(existing)?;
        if current.is_virtual() {
            return Ok(Some((existing, reversed)));
        }
        let mut alignment = line.alignment()?;
        if reversed {
            alignment = alignment.complement();
        }
        if current.alignment()?.is_compatible(&alignment) {
            Ok(Some((existing, reversed)))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GfaConfig;
    use crate::error::ErrorKind;
    use crate::field::Datatype;
    use crate::line::{Extension, RecordType};
    use crate::value::EndType;

    #[test]
    fn test_extension_references_cascade() {
        Extension::new("ANN")
            .field("aid", Datatype::IdentifierGfa2)
            .field("segment", Datatype::IdentifierGfa2)
            .field("note", Datatype::Z)
            .name_field("aid")
            .reference("segment", "annotations")
            .register()
            .unwrap();
        let mut gfa = Gfa::new();
        let note = gfa.add_line("ANN\tx1\ts1\thello").unwrap();
        let placeholder = gfa.line("s1").unwrap();
        assert!(placeholder.is_virtual());
        assert_eq!(placeholder.record_type(), &RecordType::Unknown);

        let segment = gfa.add_line("S\ts1\t4\tACGT").unwrap();
        assert_eq!(gfa.try_line(segment).unwrap().backrefs("annotations"), &[note]);

        let removed: Vec<String> = gfa
            .disconnect(segment)
            .unwrap()
            .iter()
            .map(|l| l.to_string())
            .collect();
        assert_eq!(removed, vec!["S\ts1\t4\tACGT", "ANN\tx1\ts1\thello"]);
        assert!(gfa.get(note).is_none());
    }

    #[test]
    fn test_link_registers_dovetails() {
        let mut gfa = Gfa::new();
        let a = gfa.add_line("S\ta\t*").unwrap();
        let b = gfa.add_line("S\tb\t*").unwrap();
        let link = gfa.add_line("L\ta\t+\tb\t-\t*").unwrap();
        assert_eq!(gfa.try_line(a).unwrap().dovetails_of_end(EndType::R), &[link]);
        assert_eq!(gfa.try_line(b).unwrap().dovetails_of_end(EndType::R), &[link]);
        assert_eq!(gfa.try_line(link).unwrap().try_get("from_segment").unwrap(), &Value::Line(a));
    }

    #[test]
    fn test_containment_keys() {
        let mut gfa = Gfa::new();
        let a = gfa.add_line("S\ta\t*").unwrap();
        let b = gfa.add_line("S\tb\t*").unwrap();
        let c = gfa.add_line("C\ta\t+\tb\t+\t10\t5M").unwrap();
        assert_eq!(gfa.try_line(a).unwrap().edges_to_contained(), &[c]);
        assert_eq!(gfa.try_line(b).unwrap().edges_to_containers(), &[c]);
    }

    #[test]
    fn test_edge_and_gap_keys() {
        let mut gfa = Gfa::new();
        gfa.add_line("S\t1\t100\t*").unwrap();
        gfa.add_line("S\t2\t100\t*").unwrap();
        let e = gfa.add_line("E\te1\t1+\t2-\t90\t100$\t90\t100$\t10M").unwrap();
        let g = gfa.add_line("G\tg1\t1-\t2+\t500\t*").unwrap();
        let s1 = gfa.segment("1").unwrap();
        let s2 = gfa.segment("2").unwrap();
        assert_eq!(s1.dovetails_of_end(EndType::R), &[e]);
        assert_eq!(s2.dovetails_of_end(EndType::R), &[e]);
        assert_eq!(s1.gaps_of_end(EndType::L), &[g]);
        assert_eq!(s2.gaps_of_end(EndType::L), &[g]);
    }

    #[test]
    fn test_group_items_become_virtual_unknown_lines() {
        let mut gfa = Gfa::new();
        let group = gfa.add_line("U\tu1\ts1 e1").unwrap();
        let unknown = gfa.line("e1").unwrap();
        assert!(unknown.is_virtual());
        assert_eq!(unknown.kind(), LineKind::Unknown);
        assert_eq!(unknown.sets(), &[group]);
        let edge = gfa.add_line("E\te1\ts1+\ts2+\t0\t1\t0\t1\t*").unwrap();
        assert_eq!(gfa.line_id("e1"), Some(edge));
        assert_eq!(gfa.try_line(edge).unwrap().sets(), &[group]);
        let s1 = gfa.segment("s1").unwrap();
        assert!(s1.is_virtual());
        assert_eq!(s1.kind(), LineKind::SegmentGfa2);
        assert_eq!(s1.sets(), &[group]);
        assert_eq!(gfa.line_to_string(group).unwrap(), "U\tu1\ts1 e1");
    }

    #[test]
    fn test_segments_first_mode() {
        let mut gfa = Gfa::with_config(GfaConfig::new().with_segments_first(true));
        gfa.add_line("S\t1\t*").unwrap();
        let err = gfa.add_line("L\t1\t+\t2\t+\t*").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(gfa.links().is_empty());
        assert!(gfa.segment("1").unwrap().dovetails().is_empty());
    }

    #[test]
    fn test_duplicate_names() {
        let mut gfa = Gfa::new();
        gfa.add_line("S\t1\t*").unwrap();
        assert_eq!(gfa.add_line("S\t1\t*").unwrap_err().kind(), ErrorKind::NotUnique);
        assert_eq!(gfa.add_line("P\t1\t1+\t*").unwrap_err().kind(), ErrorKind::NotUnique);
    }

    #[test]
    fn test_link_deduplication() {
        let mut gfa = Gfa::new();
        gfa.add_line("S\t1\t*").unwrap();
        gfa.add_line("S\t2\t*").unwrap();
        gfa.add_line("L\t1\t+\t2\t-\t3M").unwrap();
        let err = gfa.add_line("L\t2\t+\t1\t-\t3M").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotUnique);
        gfa.add_line("L\t1\t+\t2\t-\t5M").unwrap();
        assert_eq!(gfa.links().len(), 2);
    }

    #[test]
    fn test_reference_to_non_segment() {
        let mut gfa = Gfa::new();
        gfa.add_line("S\t1\t*").unwrap();
        gfa.add_line("P\tp\t1+\t*").unwrap();
        assert_eq!(
            gfa.add_line("L\tp\t+\t1\t+\t*").unwrap_err().kind(),
            ErrorKind::Inconsistency
        );
    }
}
