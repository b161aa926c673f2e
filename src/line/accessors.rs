//! Typed accessors for the fields of the builtin record kinds

use super::alignment_type::{AlignmentType, SubstringType};
use super::kind::LineKind;
use super::Line;
use crate::error::{GfaError, Result};
use crate::gfa::LineId;
use crate::refs::keys;
use crate::value::{Alignment, EndType, LastPos, LineRef, OrientedLine, Orientation, SegmentEnd, Value};

impl Line {
    fn wrong_kind(&self, what: &str) -> GfaError {
        GfaError::Argument(format!("{} lines have no {}", self.record_type, what))
    }

    /// Sequence of a segment; `None` for `*` and for other kinds.
    pub fn sequence(&self) -> Result<Option<&str>> {
        match self.kind() {
            LineKind::SegmentGfa1 | LineKind::SegmentGfa2 => Ok(self.try_get("sequence")?.as_str()),
            _ => Ok(None),
        }
    }

    /// Segment length: `LN` or the sequence length in GFA1, `slen` in GFA2.
    pub fn length(&self) -> Result<Option<u64>> {
        match self.kind() {
            LineKind::SegmentGfa1 => {
                if let Some(ln) = self.get("LN")?.and_then(Value::as_int) {
                    return Ok(Some(ln.max(0) as u64));
                }
                Ok(self.sequence()?.map(|s| s.len() as u64))
            }
            LineKind::SegmentGfa2 => Ok(self.try_get("slen")?.as_int().map(|v| v.max(0) as u64)),
            _ => Ok(None),
        }
    }

    pub(crate) fn line_ref(&self, name: &str) -> Result<LineRef> {
        match self.try_get(name)? {
            Value::String(s) => Ok(LineRef::Name(s.clone())),
            Value::Line(id) => Ok(LineRef::Line(*id)),
            other => Err(GfaError::Type(format!(
                "field {} holds a {}, not a line reference",
                name,
                other.type_name()
            ))),
        }
    }

    fn orientation(&self, name: &str) -> Result<Orientation> {
        match self.try_get(name)? {
            Value::Orientation(o) => Ok(*o),
            Value::String(s) => s.parse(),
            other => Err(GfaError::Type(format!(
                "field {} holds a {}, not an orientation",
                name,
                other.type_name()
            ))),
        }
    }

    pub(crate) fn oriented_line(&self, name: &str) -> Result<OrientedLine> {
        match self.try_get(name)? {
            Value::OrientedLine(ol) => Ok(ol.clone()),
            Value::String(s) => s.parse(),
            other => Err(GfaError::Type(format!(
                "field {} holds a {}, not an oriented reference",
                name,
                other.type_name()
            ))),
        }
    }

    pub(crate) fn position(&self, name: &str) -> Result<LastPos> {
        match self.try_get(name)? {
            Value::LastPos(p) => Ok(*p),
            Value::Int(i) if *i >= 0 => Ok(LastPos::new(*i as u64, false)),
            Value::String(s) => s.parse(),
            other => Err(GfaError::Type(format!(
                "field {} holds a {}, not a position",
                name,
                other.type_name()
            ))),
        }
    }

    /// First segment of a link or containment, with its orientation.
    pub fn oriented_from(&self) -> Result<OrientedLine> {
        match self.kind() {
            LineKind::Link | LineKind::Containment => Ok(OrientedLine {
                line: self.line_ref("from_segment")?,
                orient: self.orientation("from_orient")?,
            }),
            _ => Err(self.wrong_kind("from segment")),
        }
    }

    pub fn oriented_to(&self) -> Result<OrientedLine> {
        match self.kind() {
            LineKind::Link | LineKind::Containment => Ok(OrientedLine {
                line: self.line_ref("to_segment")?,
                orient: self.orientation("to_orient")?,
            }),
            _ => Err(self.wrong_kind("to segment")),
        }
    }

    /// First segment of an edge or gap.
    pub fn sid1(&self) -> Result<OrientedLine> {
        match self.kind() {
            LineKind::Edge | LineKind::Gap => self.oriented_line("sid1"),
            _ => Err(self.wrong_kind("sid1")),
        }
    }

    pub fn sid2(&self) -> Result<OrientedLine> {
        match self.kind() {
            LineKind::Edge | LineKind::Gap => self.oriented_line("sid2"),
            _ => Err(self.wrong_kind("sid2")),
        }
    }

    /// The two oriented segments joined by a link, containment or edge.
    pub fn endpoints(&self) -> Result<(OrientedLine, OrientedLine)> {
        match self.kind() {
            LineKind::Link | LineKind::Containment => Ok((self.oriented_from()?, self.oriented_to()?)),
            LineKind::Edge | LineKind::Gap => Ok((self.sid1()?, self.sid2()?)),
            _ => Err(self.wrong_kind("endpoints")),
        }
    }

    /// Alignment of a link, containment, edge or fragment.
    pub fn alignment(&self) -> Result<Alignment> {
        let field = match self.kind() {
            LineKind::Link | LineKind::Containment => "overlap",
            LineKind::Edge | LineKind::Fragment => "alignment",
            _ => return Err(self.wrong_kind("alignment")),
        };
        match self.try_get(field)? {
            Value::Placeholder => Ok(Alignment::Placeholder),
            Value::Cigar(c) => Ok(Alignment::Cigar(c.clone())),
            Value::Trace(t) => Ok(Alignment::Trace(t.clone())),
            other => Err(GfaError::Type(format!(
                "field {} holds a {}, not an alignment",
                field,
                other.type_name()
            ))),
        }
    }

    /// Begin and end of the two sides of an edge.
    pub fn edge_positions(&self) -> Result<[LastPos; 4]> {
        if self.kind() != LineKind::Edge {
            return Err(self.wrong_kind("edge positions"));
        }
        Ok([
            self.position("beg1")?,
            self.position("end1")?,
            self.position("beg2")?,
            self.position("end2")?,
        ])
    }

    pub fn edge_side_types(&self) -> Result<(SubstringType, SubstringType)> {
        let [beg1, end1, beg2, end2] = self.edge_positions()?;
        Ok((SubstringType::of(beg1, end1), SubstringType::of(beg2, end2)))
    }

    pub fn alignment_type(&self) -> Result<AlignmentType> {
        match self.kind() {
            LineKind::Link => Ok(AlignmentType::Dovetail),
            LineKind::Containment => Ok(AlignmentType::Containment),
            LineKind::Edge => {
                let (st1, st2) = self.edge_side_types()?;
                Ok(AlignmentType::classify(
                    st1,
                    self.sid1()?.orient,
                    st2,
                    self.sid2()?.orient,
                ))
            }
            _ => Err(self.wrong_kind("alignment type")),
        }
    }

    /// Segment ends joined by a dovetail link or edge.
    pub fn dovetail_ends(&self) -> Result<(SegmentEnd, SegmentEnd)> {
        match self.kind() {
            LineKind::Link => {
                let from = self.oriented_from()?;
                let to = self.oriented_to()?;
                Ok((
                    SegmentEnd::new(from.line, EndType::exit(from.orient)),
                    SegmentEnd::new(to.line, EndType::entry(to.orient)),
                ))
            }
            LineKind::Edge if self.alignment_type()? == AlignmentType::Dovetail => {
                let (st1, st2) = self.edge_side_types()?;
                let end = |st: SubstringType| st.end_type().unwrap_or(EndType::R);
                Ok((
                    SegmentEnd::new(self.sid1()?.line, end(st1)),
                    SegmentEnd::new(self.sid2()?.line, end(st2)),
                ))
            }
            _ => Err(GfaError::Argument(format!(
                "{} line is not a dovetail",
                self.record_type
            ))),
        }
    }

    pub fn backrefs(&self, key: &str) -> &[LineId] {
        self.backrefs.get(key)
    }

    /// Dovetail links or edges attached to one end of a segment.
    pub fn dovetails_of_end(&self, end: EndType) -> &[LineId] {
        match end {
            EndType::L => self.backrefs(keys::DOVETAILS_L),
            EndType::R => self.backrefs(keys::DOVETAILS_R),
        }
    }

    pub fn dovetails(&self) -> Vec<LineId> {
        let mut ids = self.dovetails_of_end(EndType::L).to_vec();
        for id in self.dovetails_of_end(EndType::R) {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    /// Edges to segments contained in this one.
    pub fn edges_to_contained(&self) -> &[LineId] {
        self.backrefs(keys::EDGES_TO_CONTAINED)
    }

    /// Edges to segments containing this one.
    pub fn edges_to_containers(&self) -> &[LineId] {
        self.backrefs(keys::EDGES_TO_CONTAINERS)
    }

    pub fn containments(&self) -> Vec<LineId> {
        let mut ids = self.edges_to_contained().to_vec();
        ids.extend_from_slice(self.edges_to_containers());
        ids
    }

    pub fn internals(&self) -> &[LineId] {
        self.backrefs(keys::INTERNALS)
    }

    pub fn gaps_of_end(&self, end: EndType) -> &[LineId] {
        match end {
            EndType::L => self.backrefs(keys::GAPS_L),
            EndType::R => self.backrefs(keys::GAPS_R),
        }
    }

    pub fn fragments(&self) -> &[LineId] {
        self.backrefs(keys::FRAGMENTS)
    }

    /// Paths and ordered groups including this line.
    pub fn paths(&self) -> &[LineId] {
        self.backrefs(keys::PATHS)
    }

    /// Unordered groups including this line.
    pub fn sets(&self) -> &[LineId] {
        self.backrefs(keys::SETS)
    }
}
