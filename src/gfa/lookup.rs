//! Lookup of lines by handle, name and record type

use super::{stale, Gfa, LineId};
use crate::error::{GfaError, Result};
use crate::line::{AlignmentType, Line, LineKind, RecordType};

/// Criteria for [`Gfa::select`]: a record type and field texts.
///
/// A `*` on either side of a field comparison matches anything.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    record_type: Option<RecordType>,
    fields: Vec<(String, String)>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = Some(record_type);
        self
    }

    pub fn field(mut self, name: &str, text: &str) -> Self {
        self.fields.push((name.to_string(), text.to_string()));
        self
    }

    fn matches(&self, line: &Line, gfa: &Gfa) -> Result<bool> {
        if let Some(record_type) = &self.record_type {
            if line.record_type() != record_type {
                return Ok(false);
            }
        }
        for (name, expected) in &self.fields {
            if line.field_datatype(name).is_none() {
                return Ok(false);
            }
            let text = line.field_to_s_in(name, gfa, false)?;
            if text != *expected && text != "*" && expected != "*" {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl Gfa {
    pub fn get(&self, id: LineId) -> Option<&Line> {
        self.arena.get(id)
    }

    /// Mutable access to a line; linked fields of connected lines cannot
    /// be set through it.
    pub fn get_mut(&mut self, id: LineId) -> Option<&mut Line> {
        self.arena.get_mut(id)
    }

    /// As [`Gfa::get`], failing with a runtime error for stale handles.
    pub fn try_line(&self, id: LineId) -> Result<&Line> {
        self.arena.get(id).ok_or_else(|| stale(id))
    }

    pub fn line_id(&self, name: &str) -> Option<LineId> {
        self.names.get(name).copied()
    }

    /// Line of any name-bearing kind called `name`, virtual lines included.
    pub fn line(&self, name: &str) -> Option<&Line> {
        self.line_id(name).and_then(|id| self.arena.get(id))
    }

    pub fn try_get_line(&self, name: &str) -> Result<&Line> {
        self.line(name)
            .ok_or_else(|| GfaError::NotFound(format!("no line is named {}", name)))
    }

    pub fn segment_id(&self, name: &str) -> Option<LineId> {
        self.line_id(name).filter(|id| {
            self.arena
                .get(*id)
                .is_some_and(|line| is_segment(line.kind()))
        })
    }

    pub fn segment(&self, name: &str) -> Option<&Line> {
        self.segment_id(name).and_then(|id| self.arena.get(id))
    }

    pub fn try_get_segment(&self, name: &str) -> Result<&Line> {
        self.segment(name)
            .ok_or_else(|| GfaError::NotFound(format!("no segment is named {}", name)))
    }

    /// Real lines of one record type, in insertion order.
    fn of_type(&self, record_type: &RecordType) -> Vec<&Line> {
        self.by_type
            .get(record_type)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.arena.get(*id))
                    .filter(|line| !line.is_virtual())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every real line except the header, grouped by record type.
    pub fn lines(&self) -> Vec<&Line> {
        self.by_type
            .keys()
            .flat_map(|record_type| self.of_type(record_type))
            .collect()
    }

    pub fn segments(&self) -> Vec<&Line> {
        self.of_type(&RecordType::Segment)
    }

    pub fn links(&self) -> Vec<&Line> {
        self.of_type(&RecordType::Link)
    }

    pub fn containments(&self) -> Vec<&Line> {
        self.of_type(&RecordType::Containment)
    }

    /// Links, containments and GFA2 edges.
    pub fn edges(&self) -> Vec<&Line> {
        let mut edges = self.links();
        edges.extend(self.containments());
        edges.extend(self.of_type(&RecordType::Edge));
        edges
    }

    /// Links and the GFA2 edges classified as dovetails.
    pub fn dovetails(&self) -> Vec<&Line> {
        let mut dovetails = self.links();
        dovetails.extend(
            self.of_type(&RecordType::Edge)
                .into_iter()
                .filter(|e| matches!(e.alignment_type(), Ok(AlignmentType::Dovetail))),
        );
        dovetails
    }

    pub fn paths(&self) -> Vec<&Line> {
        self.of_type(&RecordType::Path)
    }

    pub fn gaps(&self) -> Vec<&Line> {
        self.of_type(&RecordType::Gap)
    }

    pub fn fragments(&self) -> Vec<&Line> {
        self.of_type(&RecordType::Fragment)
    }

    /// Unordered groups.
    pub fn sets(&self) -> Vec<&Line> {
        self.of_type(&RecordType::UnorderedGroup)
    }

    pub fn ordered_groups(&self) -> Vec<&Line> {
        self.of_type(&RecordType::OrderedGroup)
    }

    pub fn comments(&self) -> Vec<&Line> {
        self.of_type(&RecordType::Comment)
    }

    pub fn custom_records(&self) -> Vec<&Line> {
        self.by_type
            .keys()
            .filter(|record_type| record_type.is_custom())
            .flat_map(|record_type| self.of_type(record_type))
            .collect()
    }

    pub fn segment_names(&self) -> Vec<&str> {
        self.segments().into_iter().filter_map(Line::name).collect()
    }

    pub fn path_names(&self) -> Vec<&str> {
        self.paths().into_iter().filter_map(Line::name).collect()
    }

    /// Names of every real named line.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .names
            .iter()
            .filter(|(_, id)| self.arena.get(**id).is_some_and(|l| !l.is_virtual()))
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Placeholders of referenced lines not declared yet.
    pub fn virtual_lines(&self) -> Vec<&Line> {
        self.by_type
            .values()
            .flatten()
            .filter_map(|id| self.arena.get(*id))
            .filter(|line| line.is_virtual())
            .collect()
    }

    /// Lines matching a selector.
    pub fn select(&self, selector: &Selector) -> Result<Vec<&Line>> {
        let mut selected = Vec::new();
        for line in self.lines() {
            if selector.matches(line, self)? {
                selected.push(line);
            }
        }
        Ok(selected)
    }

    /// Detached copy of a connected line, references written as names.
    pub fn clone_line(&self, id: LineId) -> Result<Line> {
        let line = self.try_line(id)?;
        let fields = line.to_list_in(self)?;
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        let mut copy = Line::from_fields(&fields, line.version(), line.vlevel())?;
        copy.set_virtual(line.is_virtual());
        Ok(copy)
    }

    pub fn line_to_string(&self, id: LineId) -> Result<String> {
        self.try_line(id)?.to_string_in(self)
    }

    pub fn line_to_list(&self, id: LineId) -> Result<Vec<String>> {
        self.try_line(id)?.to_list_in(self)
    }
}

pub(crate) fn is_segment(kind: LineKind) -> bool {
    matches!(kind, LineKind::SegmentGfa1 | LineKind::SegmentGfa2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const GFA1: &str = "H\tVN:Z:1.0
S\t1\tACGT
S\t2\tCGTA\tRC:i:10
S\t3\t*
L\t1\t+\t2\t+\t2M
L\t2\t+\t3\t-\t*
C\t1\t+\t3\t+\t1\t2M
P\tp1\t1+,2+\t2M
# comment
";

    fn graph() -> Gfa {
        Gfa::parse(Cursor::new(GFA1)).unwrap()
    }

    #[test]
    fn test_collections() {
        let gfa = graph();
        assert_eq!(gfa.segment_names(), vec!["1", "2", "3"]);
        assert_eq!(gfa.links().len(), 2);
        assert_eq!(gfa.containments().len(), 1);
        assert_eq!(gfa.edges().len(), 3);
        assert_eq!(gfa.dovetails().len(), 2);
        assert_eq!(gfa.path_names(), vec!["p1"]);
        assert_eq!(gfa.comments().len(), 1);
        assert_eq!(gfa.names(), vec!["1", "2", "3", "p1"]);
        assert!(gfa.virtual_lines().is_empty());
        assert_eq!(gfa.lines().len(), 8);
    }

    #[test]
    fn test_lookup_by_name() {
        let gfa = graph();
        assert!(gfa.segment("p1").is_none());
        assert_eq!(gfa.line("p1").unwrap().record_type(), &RecordType::Path);
        assert!(gfa.try_get_segment("9").is_err());
        assert!(gfa.try_get_line("9").is_err());
    }

    #[test]
    fn test_select_with_placeholders() {
        let gfa = graph();
        let selector = Selector::new()
            .record_type(RecordType::Link)
            .field("from", "2");
        assert_eq!(gfa.select(&selector).unwrap().len(), 1);
        let selector = Selector::new().record_type(RecordType::Segment).field("sequence", "TTTT");
        let names: Vec<_> = gfa
            .select(&selector)
            .unwrap()
            .into_iter()
            .filter_map(Line::name)
            .collect();
        assert_eq!(names, vec!["3"]);
        let selector = Selector::new().field("RC", "10");
        assert_eq!(gfa.select(&selector).unwrap().len(), 1);
    }

    #[test]
    fn test_clone_line_is_detached() {
        let gfa = graph();
        let link = gfa.links()[0].handle().unwrap();
        let copy = gfa.clone_line(link).unwrap();
        assert!(!copy.is_connected());
        assert_eq!(copy.to_string(), "L\t1\t+\t2\t+\t2M");
        assert_eq!(copy.to_list().unwrap(), gfa.line_to_list(link).unwrap());
    }
}
