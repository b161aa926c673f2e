//! Paths and groups as sequences and sets of lines

use std::collections::HashSet;

use super::lookup::is_segment;
use super::{Gfa, LineId};
use crate::error::{GfaError, Result};
use crate::line::{Line, LineKind};
use crate::value::{EndType, OrientedLine, Orientation, SegmentEnd, Value};

impl Gfa {
    /// Lines traversed by a path or ordered group, in order.
    ///
    /// A GFA1 path yields segment, link, segment, ...; an ordered group
    /// yields its items with sub-groups expanded and the dovetail edge
    /// between consecutive segments filled in.
    pub fn captured_path(&self, id: LineId) -> Result<Vec<OrientedLine>> {
        let line = self.try_line(id)?;
        match line.kind() {
            LineKind::Path => self.path_steps(line),
            LineKind::OrderedGroup => {
                let mut items = Vec::new();
                self.expand_group(id, Orientation::Forward, &mut Vec::new(), &mut items)?;
                self.fill_edges(items)
            }
            _ => Err(GfaError::Argument(format!(
                "{} lines do not capture a path",
                line.record_type()
            ))),
        }
    }

    fn path_steps(&self, path: &Line) -> Result<Vec<OrientedLine>> {
        let segments = oriented_items(path.try_get("segment_names")?)?;
        let n = segments.len();
        let mut steps = Vec::with_capacity(n * 2);
        for (i, segment) in segments.into_iter().enumerate() {
            if i > 0 {
                let link = path.path_links.get(i - 1).ok_or_else(|| {
                    GfaError::Runtime("path is not connected to a graph".to_string())
                })?;
                steps.push(link.clone());
            }
            steps.push(segment);
        }
        // circular paths end with the link back to the first segment
        if n > 0 && path.path_links.len() == n {
            steps.push(path.path_links[n - 1].clone());
        }
        Ok(steps)
    }

    /// Items of an ordered group, sub-groups replaced by their items.
    fn expand_group(
        &self,
        id: LineId,
        orient: Orientation,
        visiting: &mut Vec<LineId>,
        out: &mut Vec<OrientedLine>,
    ) -> Result<()> {
        if visiting.contains(&id) {
            return Err(GfaError::Inconsistency(format!(
                "ordered group {} contains itself",
                self.line_name_or_id(id)
            )));
        }
        visiting.push(id);
        let mut expanded = Vec::new();
        for item in oriented_items(self.try_line(id)?.try_get("items")?)? {
            let item_id = self.item_id(&item)?;
            let line = self.try_line(item_id)?;
            match line.kind() {
                LineKind::OrderedGroup => {
                    self.expand_group(item_id, item.orient, visiting, &mut expanded)?
                }
                LineKind::Path => {
                    let steps = self.path_steps(line)?;
                    push_oriented(&mut expanded, steps, item.orient);
                }
                LineKind::UnorderedGroup => {
                    return Err(GfaError::Inconsistency(format!(
                        "unordered group {} cannot be part of an ordered group",
                        line.name().unwrap_or("?")
                    )))
                }
                _ if line.is_virtual() => {
                    return Err(GfaError::NotFound(format!(
                        "group item {} is not defined",
                        line.name().unwrap_or("?")
                    )))
                }
                _ => expanded.push(item),
            }
        }
        visiting.pop();
        push_oriented(out, expanded, orient);
        Ok(())
    }

    /// Insert the dovetail between each pair of consecutive segments.
    fn fill_edges(&self, items: Vec<OrientedLine>) -> Result<Vec<OrientedLine>> {
        let mut filled: Vec<OrientedLine> = Vec::with_capacity(items.len() * 2);
        for item in items {
            if let Some(previous) = filled.last() {
                if self.is_segment_item(previous)? && self.is_segment_item(&item)? {
                    let edge = self.dovetail_between(previous, &item)?;
                    filled.push(edge);
                }
            }
            filled.push(item);
        }
        Ok(filled)
    }

    fn is_segment_item(&self, item: &OrientedLine) -> Result<bool> {
        Ok(is_segment(self.try_line(self.item_id(item)?)?.kind()))
    }

    /// Dovetail leaving `from` and entering `to`, oriented in that direction.
    pub(crate) fn dovetail_between(&self, from: &OrientedLine, to: &OrientedLine) -> Result<OrientedLine> {
        let from_id = self.item_id(from)?;
        let to_id = self.item_id(to)?;
        let exit = SegmentEnd::new(from_id, EndType::exit(from.orient));
        let entry = SegmentEnd::new(to_id, EndType::entry(to.orient));
        let segment = self.try_line(from_id)?;
        for edge in segment.dovetails_of_end(exit.end) {
            let Some(line) = self.arena.get(*edge) else {
                continue;
            };
            if line.is_virtual() {
                continue;
            }
            let (end1, end2) = line.dovetail_ends()?;
            if end1 == exit && end2 == entry {
                return Ok(OrientedLine::new(*edge, Orientation::Forward));
            }
            if end1 == entry && end2 == exit {
                return Ok(OrientedLine::new(*edge, Orientation::Reverse));
            }
        }
        Err(GfaError::NotFound(format!(
            "no dovetail joins {}{} to {}{}",
            self.line_name_or_id(from_id),
            from.orient,
            self.line_name_or_id(to_id),
            to.orient
        )))
    }

    fn item_id(&self, item: &OrientedLine) -> Result<LineId> {
        item.id().ok_or_else(|| {
            GfaError::Runtime(format!(
                "group item {} is not connected",
                item.name().unwrap_or("?")
            ))
        })
    }

    fn line_name_or_id(&self, id: LineId) -> String {
        self.arena
            .get(id)
            .and_then(|line| line.name().map(str::to_string))
            .unwrap_or_else(|| id.to_string())
    }

    /// Lines of an unordered group: its items with sub-groups expanded,
    /// plus every edge whose two segments are in the set.
    pub fn induced_set(&self, id: LineId) -> Result<Vec<LineId>> {
        let line = self.try_line(id)?;
        if line.kind() != LineKind::UnorderedGroup {
            return Err(GfaError::Argument(format!(
                "{} lines do not induce a set",
                line.record_type()
            )));
        }
        let mut members = Vec::new();
        self.collect_set(id, &mut Vec::new(), &mut members)?;

        let mut seen: HashSet<LineId> = members.iter().copied().collect();
        let segment_lines: Vec<&Line> = members
            .iter()
            .filter_map(|m| self.arena.get(*m))
            .filter(|l| is_segment(l.kind()))
            .collect();
        let segments: HashSet<LineId> = segment_lines.iter().filter_map(|l| l.handle()).collect();
        let mut induced = members;
        for line in segment_lines {
            let mut edges = line.dovetails();
            edges.extend(line.containments());
            edges.extend_from_slice(line.internals());
            for edge in edges {
                let Some(edge_line) = self.arena.get(edge) else {
                    continue;
                };
                if seen.contains(&edge) || edge_line.is_virtual() {
                    continue;
                }
                let (a, b) = edge_line.endpoints()?;
                let inside = |ol: &OrientedLine| ol.id().is_some_and(|i| segments.contains(&i));
                if inside(&a) && inside(&b) {
                    seen.insert(edge);
                    induced.push(edge);
                }
            }
        }
        Ok(induced)
    }

    fn collect_set(
        &self,
        id: LineId,
        visiting: &mut Vec<LineId>,
        out: &mut Vec<LineId>,
    ) -> Result<()> {
        if visiting.contains(&id) {
            return Ok(());
        }
        visiting.push(id);
        let items = self.try_line(id)?.try_get("items")?.line_ids();
        for item in items {
            let line = self.try_line(item)?;
            if line.is_virtual() {
                return Err(GfaError::NotFound(format!(
                    "group item {} is not defined",
                    line.name().unwrap_or("?")
                )));
            }
            match line.kind() {
                LineKind::UnorderedGroup => self.collect_set(item, visiting, out)?,
                LineKind::OrderedGroup | LineKind::Path => {
                    for step in self.captured_path(item)? {
                        let step = self.item_id(&step)?;
                        if !out.contains(&step) {
                            out.push(step);
                        }
                    }
                }
                _ => {
                    if !out.contains(&item) {
                        out.push(item);
                    }
                    if let Ok((a, b)) = line.endpoints() {
                        for end in [a, b] {
                            let segment = self.item_id(&end)?;
                            if !out.contains(&segment) {
                                out.push(segment);
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// Items of a list of oriented references.
fn oriented_items(value: &Value) -> Result<Vec<OrientedLine>> {
    let items = value
        .as_list()
        .ok_or_else(|| GfaError::Type(format!("{} is not a list of references", value)))?;
    items
        .iter()
        .map(|item| match item {
            Value::OrientedLine(ol) => Ok(ol.clone()),
            Value::String(s) => s.parse(),
            other => Err(GfaError::Type(format!(
                "group item {} is not an oriented reference",
                other
            ))),
        })
        .collect()
}

/// Append `items`, reversed and inverted when traversed in reverse.
fn push_oriented(out: &mut Vec<OrientedLine>, items: Vec<OrientedLine>, orient: Orientation) {
    if orient.is_forward() {
        out.extend(items);
    } else {
        out.extend(items.iter().rev().map(OrientedLine::invert));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;

    fn names(gfa: &Gfa, steps: &[OrientedLine]) -> Vec<String> {
        steps
            .iter()
            .map(|s| {
                let line = gfa.try_line(s.id().unwrap()).unwrap();
                format!("{}{}", line.name().unwrap_or(line.record_type().code()), s.orient)
            })
            .collect()
    }

    #[test]
    fn test_gfa1_path_captured() {
        let gfa = Gfa::parse(Cursor::new(
            "S\t1\t*\nS\t2\t*\nS\t3\t*\nL\t1\t+\t2\t+\t*\nL\t3\t+\t2\t-\t*\nP\tp\t1+,2+,3-\t*\n",
        ))
        .unwrap();
        let path = gfa.line_id("p").unwrap();
        let steps = gfa.captured_path(path).unwrap();
        assert_eq!(names(&gfa, &steps), vec!["1+", "L+", "2+", "L-", "3-"]);
    }

    #[test]
    fn test_ordered_group_fills_edges() {
        let gfa = Gfa::parse(Cursor::new(
            "S\t1\t100\t*
S\t2\t100\t*
S\t3\t100\t*
E\te1\t1+\t2+\t90\t100$\t0\t10\t*
E\te2\t3+\t2-\t90\t100$\t90\t100$\t*
O\tsub\t2+ 3-
O\tall\t1+ sub+
",
        ))
        .unwrap();
        let group = gfa.line_id("all").unwrap();
        let steps = gfa.captured_path(group).unwrap();
        assert_eq!(names(&gfa, &steps), vec!["1+", "e1+", "2+", "e2-", "3-"]);
    }

    #[test]
    fn test_reversed_subgroup() {
        let gfa = Gfa::parse(Cursor::new(
            "S\t1\t100\t*
S\t2\t100\t*
E\te1\t1+\t2+\t90\t100$\t0\t10\t*
O\tsub\t1+ 2+
O\tall\tsub-
",
        ))
        .unwrap();
        let steps = gfa.captured_path(gfa.line_id("all").unwrap()).unwrap();
        assert_eq!(names(&gfa, &steps), vec!["2-", "e1-", "1-"]);
    }

    #[test]
    fn test_unconnected_consecutive_segments() {
        let gfa = Gfa::parse(Cursor::new("S\t1\t100\t*\nS\t2\t100\t*\nO\to\t1+ 2+\n")).unwrap();
        let err = gfa.captured_path(gfa.line_id("o").unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_stale_path_handle() {
        let mut gfa = Gfa::new();
        gfa.add_line("S\t1\t*").unwrap();
        gfa.add_line("S\t2\t*").unwrap();
        gfa.add_line("L\t1\t+\t2\t+\t*").unwrap();
        let path = gfa.add_line("P\tp\t1+,2+\t*").unwrap();
        gfa.disconnect(path).unwrap();
        assert_eq!(gfa.captured_path(path).unwrap_err().kind(), ErrorKind::Runtime);
    }

    #[test]
    fn test_induced_set() {
        let gfa = Gfa::parse(Cursor::new(
            "S\t1\t100\t*
S\t2\t100\t*
S\t3\t100\t*
E\te1\t1+\t2+\t90\t100$\t0\t10\t*
E\te2\t2+\t3+\t90\t100$\t0\t10\t*
U\tinner\t2
U\tset\t1 inner
",
        ))
        .unwrap();
        let set = gfa.induced_set(gfa.line_id("set").unwrap()).unwrap();
        let mut names: Vec<&str> = set
            .iter()
            .filter_map(|id| gfa.try_line(*id).unwrap().name())
            .collect();
        names.sort_unstable();
        assert_eq!(names, vec!["1", "2", "e1"]);
    }
}
