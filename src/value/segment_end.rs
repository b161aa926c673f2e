//! Segment ends (`L` / `R`)

use std::fmt;
use std::str::FromStr;

use crate::error::{GfaError, Result};
use crate::value::{LineRef, Orientation};

/// One of the two ends of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndType {
    L,
    R,
}

impl EndType {
    pub fn invert(&self) -> Self {
        match self {
            EndType::L => EndType::R,
            EndType::R => EndType::L,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            EndType::L => 'L',
            EndType::R => 'R',
        }
    }

    /// End through which a segment traversed in `orient` is left.
    pub fn exit(orient: Orientation) -> Self {
        match orient {
            Orientation::Forward => EndType::R,
            Orientation::Reverse => EndType::L,
        }
    }

    /// End through which a segment traversed in `orient` is entered.
    pub fn entry(orient: Orientation) -> Self {
        EndType::exit(orient).invert()
    }
}

impl fmt::Display for EndType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A segment (or segment name) plus one of its ends
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentEnd {
    pub segment: LineRef,
    pub end: EndType,
}

impl SegmentEnd {
    pub fn new(segment: impl Into<LineRef>, end: EndType) -> Self {
        Self {
            segment: segment.into(),
            end,
        }
    }

    pub fn invert(&self) -> Self {
        Self {
            segment: self.segment.clone(),
            end: self.end.invert(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.segment.name()
    }
}

impl FromStr for SegmentEnd {
    type Err = GfaError;

    /// Parse `nameL` or `nameR`.
    fn from_str(s: &str) -> Result<Self> {
        let end = match s.chars().last() {
            Some('L') => EndType::L,
            Some('R') => EndType::R,
            _ => {
                return Err(GfaError::Format(format!(
                    "segment end '{}' must end with L or R",
                    s
                )))
            }
        };
        let name = &s[..s.len() - 1];
        if name.is_empty() {
            return Err(GfaError::Format(format!("segment end '{}' lacks a name", s)));
        }
        Ok(SegmentEnd::new(name, end))
    }
}

impl fmt::Display for SegmentEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.segment {
            LineRef::Name(name) => write!(f, "{}{}", name, self.end),
            LineRef::Line(id) => write!(f, "{}{}", id, self.end),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_invert() {
        let se: SegmentEnd = "s1L".parse().unwrap();
        assert_eq!(se.name(), Some("s1"));
        assert_eq!(se.invert().to_string(), "s1R");
        assert!("s1".parse::<SegmentEnd>().is_err());
    }

    #[test]
    fn test_entry_exit() {
        assert_eq!(EndType::exit(Orientation::Forward), EndType::R);
        assert_eq!(EndType::entry(Orientation::Forward), EndType::L);
        assert_eq!(EndType::entry(Orientation::Reverse), EndType::R);
    }
}
