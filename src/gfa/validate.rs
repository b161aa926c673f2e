//! Whole-graph validation

use tracing::debug;

use super::{Gfa, LineId};
use crate::error::{GfaError, Result};
use crate::line::convert::ConversionContext;
use crate::line::{Line, LineKind};
use crate::value::{Alignment, LastPos, LineRef, Value};

impl Gfa {
    /// Validate every line and the consistency between lines.
    ///
    /// Fails with a not-found error while any referenced line is still
    /// virtual, including links required by paths.
    pub fn validate(&self) -> Result<()> {
        let spacing = self.trace_spacing()?;
        let mut checked = 0usize;
        for id in self.arena.ids() {
            let Some(line) = self.arena.get(id) else {
                continue;
            };
            if line.is_virtual() {
                return Err(GfaError::NotFound(format!(
                    "{} {} is referenced but not defined",
                    describe_virtual(line),
                    line.name().unwrap_or("?")
                )));
            }
            let context = || {
                self.line_to_string(id)
                    .unwrap_or_else(|_| line.record_type().to_string())
            };
            line.validate().map_err(|e| e.context(context()))?;
            self.validate_positions(line).map_err(|e| e.context(context()))?;
            if let Some(spacing) = spacing {
                validate_trace(line, spacing).map_err(|e| e.context(context()))?;
            }
            checked += 1;
        }
        debug!(lines = checked, "graph validated");
        Ok(())
    }

    fn trace_spacing(&self) -> Result<Option<i64>> {
        Ok(self.header()?.get("TS")?.and_then(Value::as_int))
    }

    /// `$` markers of edge and fragment positions against segment lengths.
    fn validate_positions(&self, line: &Line) -> Result<()> {
        match line.kind() {
            LineKind::Edge => {
                let [beg1, end1, beg2, end2] = line.edge_positions()?;
                self.check_positions(&line.sid1()?.line, &[beg1, end1])?;
                self.check_positions(&line.sid2()?.line, &[beg2, end2])
            }
            LineKind::Fragment => {
                let positions = [line.position("s_beg")?, line.position("s_end")?];
                self.check_positions(&line.line_ref("sid")?, &positions)
            }
            _ => Ok(()),
        }
    }

    fn check_positions(&self, segment: &LineRef, positions: &[LastPos]) -> Result<()> {
        let length = self.segment_length(segment)?;
        for position in positions {
            position.validate_against(length)?;
        }
        Ok(())
    }

    /// Ids of lines failing validation, with their errors.
    pub fn invalid_lines(&self) -> Vec<(LineId, GfaError)> {
        self.arena
            .ids()
            .filter_map(|id| {
                let line = self.arena.get(id)?;
                let result = line
                    .validate()
                    .and_then(|_| self.validate_positions(line));
                result.err().map(|e| (id, e))
            })
            .collect()
    }
}

fn describe_virtual(line: &Line) -> &'static str {
    match line.kind() {
        LineKind::SegmentGfa1 | LineKind::SegmentGfa2 => "segment",
        LineKind::Link => "link",
        _ => "line",
    }
}

fn validate_trace(line: &Line, spacing: i64) -> Result<()> {
    if !matches!(line.kind(), LineKind::Edge | LineKind::Fragment) {
        return Ok(());
    }
    match line.alignment()? {
        Alignment::Trace(trace) => trace.validate_with_spacing(spacing),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::Cursor;

    #[test]
    fn test_valid_graph() {
        let gfa = Gfa::parse(Cursor::new(
            "H\tVN:Z:2.0\tTS:i:100\nS\t1\t100\t*\nS\t2\t50\t*\nE\te\t1+\t2+\t90\t100$\t0\t10\t4,2\n",
        ))
        .unwrap();
        gfa.validate().unwrap();
        gfa.validate().unwrap();
    }

    #[test]
    fn test_virtual_segment_fails_validation() {
        let mut gfa = Gfa::new();
        gfa.add_line("S\t1\t*").unwrap();
        gfa.add_line("L\t1\t+\t2\t+\t*").unwrap();
        assert_eq!(gfa.validate().unwrap_err().kind(), ErrorKind::NotFound);
        gfa.add_line("S\t2\t*").unwrap();
        gfa.validate().unwrap();
    }

    #[test]
    fn test_path_requires_real_links() {
        let mut gfa = Gfa::new();
        gfa.add_line("S\t1\t*").unwrap();
        gfa.add_line("S\t2\t*").unwrap();
        gfa.add_line("P\tp\t1+,2+\t*").unwrap();
        assert_eq!(gfa.validate().unwrap_err().kind(), ErrorKind::NotFound);
        gfa.add_line("L\t1\t+\t2\t+\t*").unwrap();
        gfa.validate().unwrap();
    }

    #[test]
    fn test_last_position_marker_checked() {
        let gfa = Gfa::parse(Cursor::new(
            "S\t1\t100\t*\nS\t2\t50\t*\nE\te\t1+\t2+\t90\t100\t0\t10\t*\n",
        ))
        .unwrap();
        let err = gfa.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inconsistency);
        assert_eq!(gfa.invalid_lines().len(), 1);
    }

    #[test]
    fn test_fragment_positions_checked() {
        let gfa = Gfa::parse(Cursor::new("S\t1\t10\t*\nF\t1\tread+\t0\t12$\t0\t12\t*\n")).unwrap();
        assert_eq!(gfa.validate().unwrap_err().kind(), ErrorKind::Inconsistency);
    }

    #[test]
    fn test_trace_spacing() {
        let gfa = Gfa::parse(Cursor::new(
            "H\tTS:i:5\nS\t1\t100\t*\nS\t2\t50\t*\nE\te\t1+\t2+\t90\t100$\t0\t10\t4,7\n",
        ))
        .unwrap();
        assert_eq!(gfa.validate().unwrap_err().kind(), ErrorKind::Value);
    }
}
