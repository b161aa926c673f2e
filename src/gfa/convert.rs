//! Conversion of whole graphs between GFA1 and GFA2

use tracing::{debug, warn};

use super::{Gfa, LineId};
use crate::config::GfaConfig;
use crate::error::{GfaError, Result};
use crate::line::{Line, LineKind};
use crate::value::{Alignment, OrientedLine};
use crate::version::Version;

impl Gfa {
    /// GFA1 copy of the graph.
    ///
    /// Fragments, gaps, unordered groups and custom records have no GFA1
    /// form and are dropped; ordered groups become paths.
    pub fn to_gfa1(&self) -> Result<Gfa> {
        self.to_version(Version::Gfa1)
    }

    /// GFA2 copy of the graph.
    pub fn to_gfa2(&self) -> Result<Gfa> {
        self.to_version(Version::Gfa2)
    }

    pub fn to_version(&self, version: Version) -> Result<Gfa> {
        let config = GfaConfig {
            version: Some(version),
            ..self.config.clone()
        };
        let mut converted = Gfa::with_config(config);
        converted.add(self.header()?.to_version_in(version, self)?)?;
        let mut dropped = 0usize;
        for line in self.lines() {
            match self.convert_line(line, version)? {
                Some(line) => {
                    converted.add(line)?;
                }
                None => dropped += 1,
            }
        }
        debug!(%version, dropped, "graph converted");
        Ok(converted)
    }

    fn convert_line(&self, line: &Line, version: Version) -> Result<Option<Line>> {
        if version == Version::Gfa1 {
            match line.kind() {
                LineKind::Fragment
                | LineKind::Gap
                | LineKind::UnorderedGroup
                | LineKind::Custom => {
                    warn!(
                        record_type = %line.record_type(),
                        line = %line.to_string_in(self)?,
                        "line has no GFA1 equivalent and is dropped"
                    );
                    return Ok(None);
                }
                LineKind::OrderedGroup => {
                    let id = line.handle().ok_or_else(|| {
                        GfaError::Assertion("listed line has no handle".to_string())
                    })?;
                    return self.group_to_path(id, line).map(Some);
                }
                _ => {}
            }
        }
        line.to_version_in(version, self).map(Some)
    }

    /// GFA1 path through the captured path of an ordered group.
    fn group_to_path(&self, id: LineId, group: &Line) -> Result<Line> {
        let name = group.name().ok_or_else(|| {
            GfaError::Value("an ordered group without name cannot become a GFA1 path".to_string())
        })?;
        let steps = self.captured_path(id)?;
        let mut segments = Vec::new();
        let mut overlaps = Vec::new();
        let mut previous: Option<&OrientedLine> = None;
        for step in &steps {
            let line = self.try_line(self.step_id(step)?)?;
            match line.kind() {
                LineKind::SegmentGfa1 | LineKind::SegmentGfa2 => {
                    segments.push(format!("{}{}", line.name().unwrap_or("?"), step.orient));
                    previous = Some(step);
                }
                LineKind::Edge | LineKind::Link => {
                    let from = previous.ok_or_else(|| {
                        GfaError::Value(format!("ordered group {} starts with an edge", name))
                    })?;
                    overlaps.push(self.step_overlap(line, from)?);
                }
                _ => {
                    return Err(GfaError::Value(format!(
                        "ordered group {} contains a {} line, not expressible in a GFA1 path",
                        name,
                        line.record_type()
                    )))
                }
            }
        }
        let overlaps = if overlaps.iter().any(Alignment::is_placeholder) || overlaps.is_empty() {
            "*".to_string()
        } else {
            overlaps
                .iter()
                .map(Alignment::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        let segments = segments.join(",");
        Line::from_fields(
            &["P", name, &segments, &overlaps],
            Some(Version::Gfa1),
            group.vlevel(),
        )
    }

    /// Overlap of an edge traversed after `from`, as a GFA1 link overlap.
    fn step_overlap(&self, edge: &Line, from: &OrientedLine) -> Result<Alignment> {
        let link = edge.to_version_in(Version::Gfa1, self)?;
        let alignment = link.alignment()?;
        let link_from = link.oriented_from()?;
        let from_name = self.try_line(self.step_id(from)?)?.name();
        if link_from.name() == from_name && link_from.orient == from.orient {
            Ok(alignment)
        } else {
            Ok(alignment.complement())
        }
    }

    fn step_id(&self, step: &OrientedLine) -> Result<LineId> {
        step.id()
            .ok_or_else(|| GfaError::Runtime("captured path step is not connected".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;

    #[test]
    fn test_gfa1_to_gfa2() {
        let gfa = Gfa::parse(Cursor::new(
            "H\tVN:Z:1.0
S\t1\tACGTACGTAC
S\t2\tGTACGTAAAA
L\t1\t+\t2\t+\t4M
P\tp\t1+,2+\t4M
",
        ))
        .unwrap();
        let gfa2 = gfa.to_gfa2().unwrap();
        assert_eq!(gfa2.version(), Some(Version::Gfa2));
        assert_eq!(
            gfa2.to_string(),
            "H\tVN:Z:2.0
S\t1\t10\tACGTACGTAC
S\t2\t10\tGTACGTAAAA
E\t*\t1+\t2+\t6\t10$\t0\t4\t4M
O\tp\t1+ 2+
"
        );
        gfa2.validate().unwrap();
    }

    #[test]
    fn test_gfa2_to_gfa1() {
        let gfa = Gfa::parse(Cursor::new(
            "H\tVN:Z:2.0
S\t1\t100\t*
S\t2\t100\t*
E\te1\t1+\t2+\t90\t100$\t0\t10\t10M
G\tg\t1+\t2+\t100\t*
F\t1\tread+\t0\t10\t0\t10\t*
U\tu\t1 2
O\to\t1+ 2+
",
        ))
        .unwrap();
        let gfa1 = gfa.to_gfa1().unwrap();
        assert_eq!(
            gfa1.to_string(),
            "H\tVN:Z:1.0
S\t1\t*\tLN:i:100
S\t2\t*\tLN:i:100
L\t1\t+\t2\t+\t10M\tID:Z:e1
P\to\t1+,2+\t10M
"
        );
        gfa1.validate().unwrap();
    }

    #[test]
    fn test_internal_edge_fails_conversion() {
        let gfa = Gfa::parse(Cursor::new(
            "S\t1\t100\t*\nS\t2\t100\t*\nE\t*\t1+\t2+\t10\t20\t10\t20\t10M\n",
        ))
        .unwrap();
        assert_eq!(gfa.to_gfa1().unwrap_err().kind(), ErrorKind::Value);
    }

    #[test]
    fn test_reverse_step_overlap_is_complemented() {
        let gfa = Gfa::parse(Cursor::new(
            "S\t1\t100\t*
S\t2\t100\t*
E\te1\t1+\t2+\t90\t100$\t0\t10\t2M1D8M
O\to\t2- 1-
",
        ))
        .unwrap();
        let gfa1 = gfa.to_gfa1().unwrap();
        let path = gfa1.paths()[0].to_string_in(&gfa1).unwrap();
        assert_eq!(path, "P\to\t2-,1-\t8M1I2M");
    }
}
