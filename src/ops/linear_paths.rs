//! Detection and merging of linear paths
//!
//! A linear path is a maximal chain of segments in which every junction
//! is the only dovetail of both ends it joins. Merging replaces the chain
//! by a single segment and re-attaches the dovetails of its two outer
//! ends.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{GfaError, Result};
use crate::gfa::{Gfa, LineId};
use crate::line::convert::ConversionContext;
use crate::line::{Line, LineKind};
use crate::value::{Alignment, EndType, LastPos, OrientedLine, Orientation, SegmentEnd};
use crate::version::Version;

/// Reverse complement of a nucleotide sequence, IUPAC codes included.
pub fn reverse_complement(sequence: &str) -> String {
    sequence
        .chars()
        .rev()
        .map(|c| {
            let complement = match c.to_ascii_uppercase() {
                'A' => 'T',
                'T' | 'U' => 'A',
                'C' => 'G',
                'G' => 'C',
                'R' => 'Y',
                'Y' => 'R',
                'K' => 'M',
                'M' => 'K',
                'B' => 'V',
                'V' => 'B',
                'D' => 'H',
                'H' => 'D',
                other => other,
            };
            if c.is_ascii_lowercase() {
                complement.to_ascii_lowercase()
            } else {
                complement
            }
        })
        .collect()
}

/// What a merged segment needs from one segment of the chain.
struct Piece {
    id: LineId,
    name: String,
    sequence: Option<String>,
    length: Option<u64>,
}

impl Gfa {
    /// Oriented segments of the linear path through `segment`.
    ///
    /// A segment on no linear path yields a one-element chain.
    pub fn linear_path(&self, segment: LineId) -> Result<Vec<OrientedLine>> {
        let line = self.try_line(segment)?;
        if !matches!(line.kind(), LineKind::SegmentGfa1 | LineKind::SegmentGfa2) {
            return Err(GfaError::Argument(format!(
                "linear paths start from segments, not {} lines",
                line.record_type()
            )));
        }
        let mut members = HashSet::from([segment]);
        let start = OrientedLine::new(segment, Orientation::Forward);
        let forward = self.extend_chain(&start, &mut members)?;
        let backward = self.extend_chain(&start.invert(), &mut members)?;
        let mut path: Vec<OrientedLine> = backward.iter().rev().map(OrientedLine::invert).collect();
        path.push(start);
        path.extend(forward);
        Ok(path)
    }

    /// Segments following `start` while junctions are unique.
    fn extend_chain(
        &self,
        start: &OrientedLine,
        members: &mut HashSet<LineId>,
    ) -> Result<Vec<OrientedLine>> {
        let mut chain = Vec::new();
        let mut current = start.clone();
        while let Some(id) = current.id() {
            let exit = SegmentEnd::new(id, EndType::exit(current.orient));
            let next = self.neighbours(&exit)?;
            let [entered] = next.as_slice() else {
                break;
            };
            let Some(next_id) = entered.segment.id() else {
                break;
            };
            if members.contains(&next_id) || self.neighbours(entered)?.len() != 1 {
                break;
            }
            let orient = match entered.end {
                EndType::L => Orientation::Forward,
                EndType::R => Orientation::Reverse,
            };
            members.insert(next_id);
            current = OrientedLine::new(next_id, orient);
            chain.push(current.clone());
        }
        Ok(chain)
    }

    /// Every linear path of two or more segments.
    pub fn linear_paths(&self) -> Result<Vec<Vec<OrientedLine>>> {
        let mut visited = HashSet::new();
        let mut paths = Vec::new();
        for segment in self.segments() {
            let Some(id) = segment.handle() else {
                continue;
            };
            if visited.contains(&id) {
                continue;
            }
            let path = self.linear_path(id)?;
            visited.extend(path.iter().filter_map(OrientedLine::id));
            if path.len() > 1 {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Replace a chain of segments by one segment.
    ///
    /// The new segment is named after the chain (names joined by `_`) and
    /// carries the chain sequence with the overlaps removed. Dovetails of
    /// the two outer ends are re-attached to it; the old segments are
    /// disconnected with every line depending on them.
    pub fn merge_linear_path(&mut self, path: &[OrientedLine]) -> Result<LineId> {
        if path.len() < 2 {
            return Err(GfaError::Argument(
                "a linear path to merge needs at least two segments".to_string(),
            ));
        }
        let steps: Vec<OrientedLine> = path
            .iter()
            .map(|step| self.connected_step(step))
            .collect::<Result<_>>()?;
        let pieces: Vec<Piece> = steps
            .iter()
            .map(|step| self.piece(step))
            .collect::<Result<_>>()?;

        let mut internal = HashSet::new();
        let mut overlaps = Vec::with_capacity(steps.len() - 1);
        for pair in steps.windows(2) {
            let edge = self.dovetail_between(&pair[0], &pair[1])?;
            overlaps.push(self.overlap_on_next(&edge)?);
            internal.extend(edge.id());
        }

        let name = pieces
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join("_");
        let length = merged_length(&pieces, &overlaps);
        let sequence = merged_sequence(&steps, &pieces, &overlaps)?;
        let merged_line = self.merged_segment(&name, sequence.as_deref(), length)?;

        let first = &steps[0];
        let last = &steps[steps.len() - 1];
        let outer = [
            (SegmentEnd::new(pieces[0].id, EndType::entry(first.orient)), EndType::L),
            (
                SegmentEnd::new(pieces[pieces.len() - 1].id, EndType::exit(last.orient)),
                EndType::R,
            ),
        ];
        let mut external = Vec::new();
        for (end, _) in &outer {
            let Some(id) = end.segment.id() else {
                continue;
            };
            for edge in self.try_line(id)?.dovetails_of_end(end.end) {
                if !internal.contains(edge) && !external.contains(edge) {
                    external.push(*edge);
                }
            }
        }
        let mut reattached = Vec::with_capacity(external.len());
        for edge in external {
            if self.try_line(edge)?.is_virtual() {
                continue;
            }
            reattached.push(self.reattach(edge, &outer, &name, length)?);
        }

        for piece in &pieces {
            if self.get(piece.id).is_some() {
                self.disconnect(piece.id)?;
            }
        }
        let merged = self.add(merged_line)?;
        for line in reattached {
            self.add(line)?;
        }
        debug!(segment = %name, merged = pieces.len(), "linear path merged");
        Ok(merged)
    }

    /// Merge every linear path of the graph; returns the new segments.
    pub fn merge_linear_paths(&mut self) -> Result<Vec<LineId>> {
        let paths = self.linear_paths()?;
        let mut merged = Vec::with_capacity(paths.len());
        for path in paths {
            merged.push(self.merge_linear_path(&path)?);
        }
        Ok(merged)
    }

    fn connected_step(&self, step: &OrientedLine) -> Result<OrientedLine> {
        let id = match step.id() {
            Some(id) => id,
            None => {
                let name = step.name().unwrap_or("?");
                self.segment_id(name)
                    .ok_or_else(|| GfaError::NotFound(format!("no segment is named {}", name)))?
            }
        };
        Ok(OrientedLine::new(id, step.orient))
    }

    fn chain_step_id(&self, step: &OrientedLine) -> Result<LineId> {
        self.connected_step(step)?
            .id()
            .ok_or_else(|| GfaError::Assertion("step has no handle".to_string()))
    }

    fn piece(&self, step: &OrientedLine) -> Result<Piece> {
        let id = self.chain_step_id(step)?;
        let line = self.try_line(id)?;
        if line.is_virtual() {
            return Err(GfaError::NotFound(format!(
                "segment {} is not defined",
                line.name().unwrap_or("?")
            )));
        }
        Ok(Piece {
            id,
            name: line.name().unwrap_or("?").to_string(),
            sequence: line.sequence()?.map(str::to_string),
            length: line.length()?,
        })
    }

    /// Overlap length of a dovetail on the segment it enters.
    fn overlap_on_next(&self, edge: &OrientedLine) -> Result<u64> {
        let id = self.chain_step_id(edge)?;
        let line = self.try_line(id)?;
        let forward = edge.orient.is_forward();
        if line.kind() == LineKind::Edge {
            let [beg1, end1, beg2, end2] = line.edge_positions()?;
            let (beg, end) = if forward { (beg2, end2) } else { (beg1, end1) };
            return Ok(end.value.saturating_sub(beg.value));
        }
        match line.alignment()? {
            Alignment::Cigar(cigar) if forward => Ok(cigar.length_on_query()),
            Alignment::Cigar(cigar) => Ok(cigar.length_on_reference()),
            other => {
                warn!(
                    link = %line.to_string_in(self)?,
                    overlap = %other,
                    "overlap unknown; segments merged without trimming"
                );
                Ok(0)
            }
        }
    }

    fn merged_segment(&self, name: &str, sequence: Option<&str>, length: Option<u64>) -> Result<Line> {
        let sequence = sequence.unwrap_or("*");
        let mut fields = vec!["S".to_string(), name.to_string()];
        match self.version() {
            Some(Version::Gfa2) => {
                let length = length.ok_or_else(|| {
                    GfaError::Value(format!("the length of merged segment {} is unknown", name))
                })?;
                fields.push(length.to_string());
                fields.push(sequence.to_string());
            }
            _ => {
                fields.push(sequence.to_string());
                if let (Some(length), "*") = (length, sequence) {
                    fields.push(format!("LN:i:{}", length));
                }
            }
        }
        let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
        Line::from_fields(&fields, self.version(), self.vlevel())
    }

    /// Detached copy of an outer dovetail attached to the merged segment.
    fn reattach(
        &self,
        edge: LineId,
        outer: &[(SegmentEnd, EndType); 2],
        name: &str,
        length: Option<u64>,
    ) -> Result<Line> {
        let line = self.try_line(edge)?;
        let (end1, end2) = line.dovetail_ends()?;
        let moved = |end: &SegmentEnd| -> Option<EndType> {
            outer
                .iter()
                .find(|(old, _)| old == end)
                .map(|(_, new_end)| *new_end)
        };
        let side = |end: &SegmentEnd| -> Result<(String, EndType)> {
            match moved(end) {
                Some(new_end) => Ok((name.to_string(), new_end)),
                None => {
                    let id = end.segment.id().ok_or_else(|| {
                        GfaError::Runtime("dovetail is not connected".to_string())
                    })?;
                    let other = self.try_line(id)?.name().unwrap_or("?").to_string();
                    Ok((other, end.end))
                }
            }
        };
        let (name1, new1) = side(&end1)?;
        let (name2, new2) = side(&end2)?;
        let orient1 = if new1 == EndType::R { "+" } else { "-" };
        let orient2 = if new2 == EndType::L { "+" } else { "-" };

        let mut copy = self.clone_line(edge)?;
        if line.kind() == LineKind::Link {
            copy.set("from_segment", name1.as_str())?;
            copy.set("from_orient", orient1)?;
            copy.set("to_segment", name2.as_str())?;
            copy.set("to_orient", orient2)?;
            return Ok(copy);
        }

        let [beg1, end1_pos, beg2, end2_pos] = line.edge_positions()?;
        let overlap1 = end1_pos.value.saturating_sub(beg1.value);
        let overlap2 = end2_pos.value.saturating_sub(beg2.value);
        let len1 = self.side_length(&end1, moved(&end1).is_some(), length)?;
        let len2 = self.side_length(&end2, moved(&end2).is_some(), length)?;
        let (b1, e1) = side_positions(new1, overlap1, len1);
        let (b2, e2) = side_positions(new2, overlap2, len2);
        copy.set("sid1", format!("{}{}", name1, orient1).as_str())?;
        copy.set("sid2", format!("{}{}", name2, orient2).as_str())?;
        copy.set("beg1", b1.to_string().as_str())?;
        copy.set("end1", e1.to_string().as_str())?;
        copy.set("beg2", b2.to_string().as_str())?;
        copy.set("end2", e2.to_string().as_str())?;
        if line.sid1()?.orient.to_string() != orient1 {
            let alignment = line.alignment()?.complement();
            copy.set("alignment", alignment.to_string().as_str())?;
        }
        Ok(copy)
    }

    fn side_length(&self, end: &SegmentEnd, merged: bool, length: Option<u64>) -> Result<u64> {
        if merged {
            return length.ok_or_else(|| {
                GfaError::Value("the length of the merged segment is unknown".to_string())
            });
        }
        self.segment_length(&end.segment)
    }
}

/// Begin and end of an overlap of `overlap` bases at one end of a segment.
fn side_positions(end: EndType, overlap: u64, length: u64) -> (LastPos, LastPos) {
    let (beg, end) = match end {
        EndType::L => (0, overlap.min(length)),
        EndType::R => (length.saturating_sub(overlap), length),
    };
    (LastPos::new(beg, beg == length), LastPos::new(end, end == length))
}

fn merged_length(pieces: &[Piece], overlaps: &[u64]) -> Option<u64> {
    let total: u64 = pieces
        .iter()
        .map(|p| p.length)
        .sum::<Option<u64>>()?;
    Some(total.saturating_sub(overlaps.iter().sum()))
}

fn merged_sequence(
    steps: &[OrientedLine],
    pieces: &[Piece],
    overlaps: &[u64],
) -> Result<Option<String>> {
    let mut merged = String::new();
    for (i, (step, piece)) in steps.iter().zip(pieces).enumerate() {
        let Some(sequence) = &piece.sequence else {
            return Ok(None);
        };
        let oriented = if step.orient.is_forward() {
            sequence.clone()
        } else {
            reverse_complement(sequence)
        };
        let trim = if i == 0 { 0 } else { overlaps[i - 1] as usize };
        let rest = oriented.get(trim..).ok_or_else(|| {
            GfaError::Inconsistency(format!(
                "overlap of {} bases is longer than segment {}",
                trim, piece.name
            ))
        })?;
        merged.push_str(rest);
    }
    Ok(Some(merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn chain_names(gfa: &Gfa, path: &[OrientedLine]) -> Vec<String> {
        path.iter()
            .map(|step| {
                let line = gfa.try_line(step.id().unwrap()).unwrap();
                format!("{}{}", line.name().unwrap(), step.orient)
            })
            .collect()
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("ACGTn"), "nACGT");
        assert_eq!(reverse_complement("AAcG"), "CgTT");
    }

    #[test]
    fn test_linear_paths_stop_at_branches() {
        let gfa = Gfa::parse(Cursor::new(
            "S\ta\t*
S\tb\t*
S\tc\t*
S\td\t*
S\te\t*
L\ta\t+\tb\t-\t*
L\tb\t-\tc\t+\t*
L\tc\t+\td\t+\t*
L\tc\t+\te\t+\t*
",
        ))
        .unwrap();
        let paths = gfa.linear_paths().unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(chain_names(&gfa, &paths[0]), vec!["a+", "b-", "c+"]);
        let single = gfa.linear_path(gfa.segment_id("d").unwrap()).unwrap();
        assert_eq!(single.len(), 1);
    }

    #[test]
    fn test_merge_linear_path_gfa1() {
        let mut gfa = Gfa::parse(Cursor::new(
            "S\t0\tTTTT
S\t1\tACGTAC
S\t2\tGTTTGG
S\t3\tGGCCCA
S\t4\tAAAA
L\t0\t+\t1\t+\t*
L\t1\t+\t2\t-\t2M
L\t2\t-\t3\t+\t2M
L\t3\t+\t4\t+\t*
L\t3\t+\t0\t+\t*
P\tp\t1+,2-\t2M
",
        ))
        .unwrap();
        let path = vec![
            OrientedLine::new("1", Orientation::Forward),
            OrientedLine::new("2", Orientation::Reverse),
            OrientedLine::new("3", Orientation::Forward),
        ];
        let merged = gfa.merge_linear_path(&path).unwrap();
        let segment = gfa.try_line(merged).unwrap();
        assert_eq!(segment.name(), Some("1_2_3"));
        assert_eq!(segment.sequence().unwrap(), Some("ACGTACAAACCCCA"));
        assert!(gfa.segment("2").is_none());
        assert!(gfa.paths().is_empty());
        let links: Vec<String> = gfa
            .links()
            .iter()
            .map(|l| l.to_string_in(&gfa).unwrap())
            .collect();
        assert_eq!(
            links,
            vec![
                "L\t0\t+\t1_2_3\t+\t*",
                "L\t1_2_3\t+\t4\t+\t*",
                "L\t1_2_3\t+\t0\t+\t*",
            ]
        );
        gfa.validate().unwrap();
    }

    #[test]
    fn test_merge_linear_paths_gfa2() {
        let mut gfa = Gfa::parse(Cursor::new(
            "S\t1\t6\tACGTAC
S\t2\t6\tACTTTT
S\t3\t4\tGGGG
S\t4\t4\tCCCC
E\t*\t1+\t2+\t4\t6$\t0\t2\t2M
E\t*\t2+\t3+\t4\t6$\t0\t2\t2M
E\t*\t4+\t3+\t2\t4$\t0\t2\t2M
",
        ))
        .unwrap();
        assert_eq!(gfa.linear_paths().unwrap().len(), 1);
        let merged = gfa.merge_linear_paths().unwrap();
        assert_eq!(merged.len(), 1);
        let segment = gfa.try_line(merged[0]).unwrap();
        assert_eq!(segment.name(), Some("1_2"));
        assert_eq!(segment.length().unwrap(), Some(10));
        assert_eq!(segment.sequence().unwrap(), Some("ACGTACTTTT"));
        let edges: Vec<String> = gfa
            .edges()
            .iter()
            .map(|l| l.to_string_in(&gfa).unwrap())
            .collect();
        assert_eq!(
            edges,
            vec![
                "E\t*\t4+\t3+\t2\t4$\t0\t2\t2M",
                "E\t*\t1_2+\t3+\t8\t10$\t0\t2\t2M",
            ]
        );
    }
}
