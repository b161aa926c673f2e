//! GFA2 positions, optionally flagged as the last position of a segment

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{GfaError, Result};

/// A position written as `123` or `123$`.
///
/// The `$` suffix states that the position equals the length of the
/// segment it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LastPos {
    pub value: u64,
    pub last: bool,
}

impl LastPos {
    pub fn new(value: u64, last: bool) -> Self {
        Self { value, last }
    }

    pub fn first() -> Self {
        Self::new(0, false)
    }

    pub fn is_first(&self) -> bool {
        self.value == 0
    }

    pub fn is_last(&self) -> bool {
        self.last
    }

    /// Check the `$` marker against the actual segment length.
    pub fn validate_against(&self, segment_length: u64) -> Result<()> {
        if self.value > segment_length {
            return Err(GfaError::Inconsistency(format!(
                "position {} exceeds the segment length {}",
                self, segment_length
            )));
        }
        match (self.last, self.value == segment_length) {
            (true, false) => Err(GfaError::Inconsistency(format!(
                "position {} is marked as last but the segment length is {}",
                self, segment_length
            ))),
            (false, true) if segment_length > 0 => Err(GfaError::Inconsistency(format!(
                "position {} equals the segment length but lacks the '$' marker",
                self
            ))),
            _ => Ok(()),
        }
    }
}

impl PartialOrd for LastPos {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LastPos {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl From<u64> for LastPos {
    fn from(value: u64) -> Self {
        LastPos::new(value, false)
    }
}

impl FromStr for LastPos {
    type Err = GfaError;

    fn from_str(s: &str) -> Result<Self> {
        let (digits, last) = match s.strip_suffix('$') {
            Some(digits) => (digits, true),
            None => (s, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(GfaError::Format(format!("'{}' is not a valid position", s)));
        }
        let value = digits
            .parse()
            .map_err(|_| GfaError::Value(format!("position '{}' is too large", s)))?;
        Ok(LastPos::new(value, last))
    }
}

impl fmt::Display for LastPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.last {
            write!(f, "{}$", self.value)
        } else {
            write!(f, "{}", self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("100$".parse::<LastPos>().unwrap(), LastPos::new(100, true));
        assert_eq!("0".parse::<LastPos>().unwrap(), LastPos::first());
        assert!("$".parse::<LastPos>().is_err());
        assert!("-1".parse::<LastPos>().is_err());
        assert_eq!(LastPos::new(12, true).to_string(), "12$");
    }

    #[test]
    fn test_validate_against_length() {
        assert!(LastPos::new(100, true).validate_against(100).is_ok());
        assert!(LastPos::new(90, false).validate_against(100).is_ok());
        assert!(LastPos::new(99, true).validate_against(100).is_err());
        assert!(LastPos::new(100, false).validate_against(100).is_err());
        assert!(LastPos::new(101, false).validate_against(100).is_err());
    }
}
