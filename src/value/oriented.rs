//! Orientations and oriented references to lines

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GfaError, Result};
use crate::gfa::LineId;

/// Orientation of a segment in a path or link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Forward,
    Reverse,
}

impl Orientation {
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            '+' => Ok(Orientation::Forward),
            '-' => Ok(Orientation::Reverse),
            _ => Err(GfaError::Format(format!("Invalid orientation: {}", c))),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Orientation::Forward => '+',
            Orientation::Reverse => '-',
        }
    }

    pub fn invert(&self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reverse,
            Orientation::Reverse => Orientation::Forward,
        }
    }

    pub fn is_forward(&self) -> bool {
        *self == Orientation::Forward
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Orientation {
    type Err = GfaError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Orientation::from_char(c),
            _ => Err(GfaError::Format(format!("Invalid orientation: {}", s))),
        }
    }
}

/// A reference to another line: either its name (detached lines) or the
/// handle of the line in its graph (connected lines).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LineRef {
    Name(String),
    Line(LineId),
}

impl LineRef {
    pub fn name(&self) -> Option<&str> {
        match self {
            LineRef::Name(name) => Some(name),
            LineRef::Line(_) => None,
        }
    }

    pub fn id(&self) -> Option<LineId> {
        match self {
            LineRef::Line(id) => Some(*id),
            LineRef::Name(_) => None,
        }
    }
}

impl From<&str> for LineRef {
    fn from(name: &str) -> Self {
        LineRef::Name(name.to_string())
    }
}

impl From<LineId> for LineRef {
    fn from(id: LineId) -> Self {
        LineRef::Line(id)
    }
}

/// A line reference with an orientation, written `name+` / `name-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrientedLine {
    pub line: LineRef,
    pub orient: Orientation,
}

impl OrientedLine {
    pub fn new(line: impl Into<LineRef>, orient: Orientation) -> Self {
        Self {
            line: line.into(),
            orient,
        }
    }

    pub fn invert(&self) -> Self {
        Self {
            line: self.line.clone(),
            orient: self.orient.invert(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.line.name()
    }

    pub fn id(&self) -> Option<LineId> {
        self.line.id()
    }
}

impl FromStr for OrientedLine {
    type Err = GfaError;

    /// Parse `name+` or `name-`.
    fn from_str(s: &str) -> Result<Self> {
        let orient = s
            .chars()
            .last()
            .ok_or_else(|| GfaError::Format("empty oriented identifier".to_string()))
            .and_then(Orientation::from_char)
            .map_err(|_| {
                GfaError::Format(format!("oriented identifier '{}' lacks an orientation", s))
            })?;
        let name = &s[..s.len() - 1];
        if name.is_empty() {
            return Err(GfaError::Format(format!(
                "oriented identifier '{}' lacks a name",
                s
            )));
        }
        Ok(OrientedLine::new(name, orient))
    }
}

impl fmt::Display for OrientedLine {
    /// Handles are written as `#index.generation`; use the graph to
    /// render names of connected references.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.line {
            LineRef::Name(name) => write!(f, "{}{}", name, self.orient),
            LineRef::Line(id) => write!(f, "{}{}", id, self.orient),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_display() {
        assert_eq!(format!("{}", Orientation::Forward), "+");
        assert_eq!(format!("{}", Orientation::Reverse), "-");
        assert_eq!(Orientation::Forward.invert(), Orientation::Reverse);
    }

    #[test]
    fn test_oriented_line_parse() {
        let ol: OrientedLine = "a+b-".parse().unwrap();
        assert_eq!(ol.name(), Some("a+b"));
        assert_eq!(ol.orient, Orientation::Reverse);
        assert_eq!(ol.invert().to_string(), "a+b+");
        assert!("abc".parse::<OrientedLine>().is_err());
        assert!("+".parse::<OrientedLine>().is_err());
    }
}
