//! Connectivity queries over segments

use std::collections::{HashSet, VecDeque};

use crate::error::{GfaError, Result};
use crate::gfa::{Gfa, LineId};
use crate::line::{Line, LineKind};
use crate::value::{LineRef, SegmentEnd};

impl Gfa {
    fn segment_handle(&self, segment: &LineRef) -> Result<LineId> {
        match segment {
            LineRef::Line(id) => Ok(*id),
            LineRef::Name(name) => self.segment_id(name).ok_or_else(|| {
                GfaError::NotFound(format!("no segment is named {}", name))
            }),
        }
    }

    /// Segment ends joined by a dovetail to `end`.
    pub fn neighbours(&self, end: &SegmentEnd) -> Result<Vec<SegmentEnd>> {
        let id = self.segment_handle(&end.segment)?;
        let here = SegmentEnd::new(id, end.end);
        let segment = self.try_line(id)?;
        let mut neighbours = Vec::new();
        for edge in segment.dovetails_of_end(end.end) {
            let Some(edge) = self.get(*edge).filter(|l| !l.is_virtual()) else {
                continue;
            };
            let (end1, end2) = edge.dovetail_ends()?;
            let other = if end1 == here { end2 } else { end1 };
            if !neighbours.contains(&other) {
                neighbours.push(other);
            }
        }
        Ok(neighbours)
    }

    /// Segments sharing a dovetail or containment with `segment`, with
    /// the edge joining them.
    fn adjacent(&self, segment: &Line) -> Result<Vec<(LineId, LineId)>> {
        let mut edges = segment.dovetails();
        edges.extend(segment.containments());
        let mut adjacent = Vec::new();
        for edge_id in edges {
            let Some(edge) = self.get(edge_id).filter(|l| !l.is_virtual()) else {
                continue;
            };
            let (a, b) = edge.endpoints()?;
            for other in [a.id(), b.id()].into_iter().flatten() {
                if Some(other) != segment.handle() {
                    adjacent.push((other, edge_id));
                }
            }
        }
        Ok(adjacent)
    }

    /// Segments reachable from `start` without crossing the excluded
    /// segment or edge.
    fn reachable(
        &self,
        start: LineId,
        excluded_segment: Option<LineId>,
        excluded_edge: Option<LineId>,
    ) -> Result<Vec<LineId>> {
        let mut visited = HashSet::from([start]);
        let mut order = vec![start];
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            let line = self.try_line(current)?;
            for (other, edge) in self.adjacent(line)? {
                if Some(edge) == excluded_edge || Some(other) == excluded_segment {
                    continue;
                }
                let is_real_segment = self
                    .get(other)
                    .is_some_and(|l| !l.is_virtual() && is_segment_kind(l.kind()));
                if is_real_segment && visited.insert(other) {
                    order.push(other);
                    queue.push_back(other);
                }
            }
        }
        Ok(order)
    }

    /// Segments grouped into connected components, in segment order.
    pub fn connected_components(&self) -> Result<Vec<Vec<LineId>>> {
        let mut seen = HashSet::new();
        let mut components = Vec::new();
        for segment in self.segments() {
            let Some(id) = segment.handle() else {
                continue;
            };
            if seen.contains(&id) {
                continue;
            }
            let component = self.reachable(id, None, None)?;
            seen.extend(component.iter().copied());
            components.push(component);
        }
        Ok(components)
    }

    pub fn segment_connected_component(&self, name: &str) -> Result<Vec<LineId>> {
        let id = self
            .segment_id(name)
            .ok_or_else(|| GfaError::NotFound(format!("no segment is named {}", name)))?;
        self.reachable(id, None, None)
    }

    /// Whether removing the segment splits its component.
    pub fn is_cut_segment(&self, id: LineId) -> Result<bool> {
        let segment = self.try_line(id)?;
        let mut neighbours: Vec<LineId> = Vec::new();
        for (other, _) in self.adjacent(segment)? {
            if !neighbours.contains(&other) {
                neighbours.push(other);
            }
        }
        let Some((&first, rest)) = neighbours.split_first() else {
            return Ok(false);
        };
        let reached: HashSet<LineId> = self.reachable(first, Some(id), None)?.into_iter().collect();
        Ok(rest.iter().any(|n| !reached.contains(n)))
    }

    /// Whether removing the link or edge disconnects its two segments.
    pub fn is_cut_link(&self, id: LineId) -> Result<bool> {
        let edge = self.try_line(id)?;
        let (a, b) = edge.endpoints()?;
        let (Some(a), Some(b)) = (a.id(), b.id()) else {
            return Err(GfaError::Runtime("edge is not connected".to_string()));
        };
        if a == b {
            return Ok(false);
        }
        Ok(!self.reachable(a, None, Some(id))?.contains(&b))
    }
}

fn is_segment_kind(kind: LineKind) -> bool {
    matches!(kind, LineKind::SegmentGfa1 | LineKind::SegmentGfa2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::EndType;
    use std::io::Cursor;

    const GRAPH: &str = "S\t1\t*
S\t2\t*
S\t3\t*
S\t4\t*
S\t5\t*
L\t1\t+\t2\t+\t*
L\t2\t+\t3\t+\t*
L\t3\t+\t1\t+\t*
L\t3\t-\t4\t+\t*
C\t5\t+\t5\t+\t0\t*
";

    fn names(gfa: &Gfa, ids: &[LineId]) -> Vec<String> {
        let mut names: Vec<String> = ids
            .iter()
            .map(|id| gfa.try_line(*id).unwrap().name().unwrap().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_connected_components() {
        let gfa = Gfa::parse(Cursor::new(GRAPH)).unwrap();
        let components = gfa.connected_components().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(names(&gfa, &components[0]), vec!["1", "2", "3", "4"]);
        assert_eq!(names(&gfa, &components[1]), vec!["5"]);
        let component = gfa.segment_connected_component("4").unwrap();
        assert_eq!(component.len(), 4);
    }

    #[test]
    fn test_neighbours() {
        let gfa = Gfa::parse(Cursor::new(GRAPH)).unwrap();
        let three = gfa.segment_id("3").unwrap();
        let right = gfa.neighbours(&SegmentEnd::new("3", EndType::R)).unwrap();
        assert_eq!(right, vec![SegmentEnd::new(gfa.segment_id("1").unwrap(), EndType::L)]);
        let left = gfa.neighbours(&SegmentEnd::new(three, EndType::L)).unwrap();
        assert_eq!(left.len(), 2);
    }

    #[test]
    fn test_cut_segments_and_links() {
        let gfa = Gfa::parse(Cursor::new(GRAPH)).unwrap();
        assert!(gfa.is_cut_segment(gfa.segment_id("3").unwrap()).unwrap());
        assert!(!gfa.is_cut_segment(gfa.segment_id("1").unwrap()).unwrap());
        assert!(!gfa.is_cut_segment(gfa.segment_id("4").unwrap()).unwrap());
        let links = gfa.links();
        let first = links[0].handle().unwrap();
        let to_four = links[3].handle().unwrap();
        assert!(!gfa.is_cut_link(first).unwrap());
        assert!(gfa.is_cut_link(to_four).unwrap());
    }
}
