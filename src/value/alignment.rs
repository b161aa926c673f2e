//! Alignments: CIGAR strings and traces

use std::fmt;
use std::str::FromStr;

use crate::error::{GfaError, Result};
use crate::version::Version;

/// CIGAR operation code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarCode {
    M,
    I,
    D,
    N,
    S,
    H,
    P,
    Eq,
    X,
}

impl CigarCode {
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'M' => Ok(CigarCode::M),
            'I' => Ok(CigarCode::I),
            'D' => Ok(CigarCode::D),
            'N' => Ok(CigarCode::N),
            'S' => Ok(CigarCode::S),
            'H' => Ok(CigarCode::H),
            'P' => Ok(CigarCode::P),
            '=' => Ok(CigarCode::Eq),
            'X' => Ok(CigarCode::X),
            _ => Err(GfaError::Format(format!("'{}' is not a CIGAR operation", c))),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            CigarCode::M => 'M',
            CigarCode::I => 'I',
            CigarCode::D => 'D',
            CigarCode::N => 'N',
            CigarCode::S => 'S',
            CigarCode::H => 'H',
            CigarCode::P => 'P',
            CigarCode::Eq => '=',
            CigarCode::X => 'X',
        }
    }

    /// GFA2 alignments only use M, I, D and P.
    pub fn is_gfa2(&self) -> bool {
        matches!(self, CigarCode::M | CigarCode::I | CigarCode::D | CigarCode::P)
    }

    pub fn consumes_reference(&self) -> bool {
        matches!(
            self,
            CigarCode::M | CigarCode::Eq | CigarCode::X | CigarCode::D | CigarCode::N
        )
    }

    pub fn consumes_query(&self) -> bool {
        matches!(
            self,
            CigarCode::M | CigarCode::Eq | CigarCode::X | CigarCode::I | CigarCode::S
        )
    }

    fn complement(&self) -> Self {
        match self {
            CigarCode::I => CigarCode::D,
            CigarCode::S => CigarCode::D,
            CigarCode::D => CigarCode::I,
            CigarCode::N => CigarCode::I,
            other => *other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CigarOp {
    pub len: u64,
    pub code: CigarCode,
}

impl CigarOp {
    pub fn new(len: u64, code: CigarCode) -> Self {
        Self { len, code }
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.len, self.code.as_char())
    }
}

/// A CIGAR alignment: an ordered list of (length, code) operations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Cigar(pub Vec<CigarOp>);

impl Cigar {
    pub fn new(ops: Vec<CigarOp>) -> Self {
        Cigar(ops)
    }

    pub fn ops(&self) -> &[CigarOp] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Alignment of the reversed edge: operations in reverse order with
    /// insertions and deletions swapped (S becomes D, N becomes I).
    pub fn complement(&self) -> Cigar {
        Cigar(
            self.0
                .iter()
                .rev()
                .map(|op| CigarOp::new(op.len, op.code.complement()))
                .collect(),
        )
    }

    /// Same alignment read with reference and query exchanged.
    pub fn swap_roles(&self) -> Cigar {
        Cigar(
            self.0
                .iter()
                .map(|op| {
                    let code = match op.code {
                        CigarCode::I => CigarCode::D,
                        CigarCode::D => CigarCode::I,
                        other => other,
                    };
                    CigarOp::new(op.len, code)
                })
                .collect(),
        )
    }

    pub fn length_on_reference(&self) -> u64 {
        self.0
            .iter()
            .filter(|op| op.code.consumes_reference())
            .map(|op| op.len)
            .sum()
    }

    pub fn length_on_query(&self) -> u64 {
        self.0
            .iter()
            .filter(|op| op.code.consumes_query())
            .map(|op| op.len)
            .sum()
    }

    /// Check operation codes for `version` and operation lengths.
    ///
    /// A single zero-length operation (`0M`) is the conventional way of
    /// writing a blunt overlap and is accepted.
    pub fn validate(&self, version: Option<Version>) -> Result<()> {
        if self.0.is_empty() {
            return Err(GfaError::Value("CIGAR has no operations".to_string()));
        }
        for op in &self.0 {
            if op.len == 0 && self.0.len() > 1 {
                return Err(GfaError::Value(format!(
                    "CIGAR {} contains the non-positive operation {}",
                    self, op
                )));
            }
            if version == Some(Version::Gfa2) && !op.code.is_gfa2() {
                return Err(GfaError::Version(format!(
                    "CIGAR operation '{}' of {} is not allowed in GFA2 (only M, I, D, P)",
                    op.code.as_char(),
                    self
                )));
            }
        }
        Ok(())
    }
}

impl FromStr for Cigar {
    type Err = GfaError;

    fn from_str(s: &str) -> Result<Self> {
        let mut ops = Vec::new();
        let mut len: Option<u64> = None;
        for c in s.chars() {
            if let Some(d) = c.to_digit(10) {
                let current = len.unwrap_or(0);
                len = Some(
                    current
                        .checked_mul(10)
                        .and_then(|v| v.checked_add(d as u64))
                        .ok_or_else(|| {
                            GfaError::Value(format!("CIGAR operation length overflow in '{}'", s))
                        })?,
                );
            } else {
                let code = CigarCode::from_char(c)
                    .map_err(|e| e.context(format!("CIGAR '{}'", s)))?;
                let op_len = len.take().ok_or_else(|| {
                    GfaError::Format(format!("CIGAR '{}': operation '{}' lacks a length", s, c))
                })?;
                ops.push(CigarOp::new(op_len, code));
            }
        }
        if len.is_some() || ops.is_empty() {
            return Err(GfaError::Format(format!("'{}' is not a CIGAR string", s)));
        }
        Ok(Cigar(ops))
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.0 {
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

/// A trace alignment: comma-separated non-negative differences
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Trace(pub Vec<i64>);

impl Trace {
    pub fn values(&self) -> &[i64] {
        &self.0
    }

    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(GfaError::Value("trace has no values".to_string()));
        }
        if let Some(v) = self.0.iter().find(|v| **v < 0) {
            return Err(GfaError::Value(format!(
                "trace {} contains the negative value {}",
                self, v
            )));
        }
        Ok(())
    }

    /// Check each value against the trace spacing (header `TS` tag).
    pub fn validate_with_spacing(&self, spacing: i64) -> Result<()> {
        self.validate()?;
        if let Some(v) = self.0.iter().find(|v| **v > spacing) {
            return Err(GfaError::Value(format!(
                "trace value {} exceeds the trace spacing {}",
                v, spacing
            )));
        }
        Ok(())
    }
}

impl FromStr for Trace {
    type Err = GfaError;

    fn from_str(s: &str) -> Result<Self> {
        s.split(',')
            .map(|item| {
                item.parse::<i64>()
                    .map_err(|_| GfaError::Format(format!("'{}' is not a trace", s)))
            })
            .collect::<Result<Vec<i64>>>()
            .map(Trace)
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items: Vec<String> = self.0.iter().map(|v| v.to_string()).collect();
        write!(f, "{}", items.join(","))
    }
}

/// Content of an alignment field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alignment {
    Placeholder,
    Cigar(Cigar),
    Trace(Trace),
}

impl Alignment {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Alignment::Placeholder)
    }

    pub fn cigar(&self) -> Option<&Cigar> {
        match self {
            Alignment::Cigar(cigar) => Some(cigar),
            _ => None,
        }
    }

    /// Complement of a CIGAR; traces and placeholders cannot be
    /// complemented and become a placeholder.
    pub fn complement(&self) -> Alignment {
        match self {
            Alignment::Cigar(cigar) => Alignment::Cigar(cigar.complement()),
            _ => Alignment::Placeholder,
        }
    }

    /// Placeholders are compatible with anything.
    pub fn is_compatible(&self, other: &Alignment) -> bool {
        self.is_placeholder() || other.is_placeholder() || self == other
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alignment::Placeholder => write!(f, "*"),
            Alignment::Cigar(cigar) => write!(f, "{}", cigar),
            Alignment::Trace(trace) => write!(f, "{}", trace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_complement_scenario() {
        let cigar: Cigar = "2M1D3M".parse().unwrap();
        assert_eq!(cigar.complement().to_string(), "3M1I2M");
    }

    #[test]
    fn test_lengths() {
        let cigar: Cigar = "5M2I3D1S".parse().unwrap();
        assert_eq!(cigar.length_on_reference(), 8);
        assert_eq!(cigar.length_on_query(), 8);
        let cigar: Cigar = "10M".parse().unwrap();
        assert_eq!(cigar.length_on_reference(), 10);
    }

    #[test]
    fn test_soft_clip_complement() {
        let cigar: Cigar = "2S3M1N".parse().unwrap();
        assert_eq!(cigar.complement().to_string(), "1I3M2D");
    }

    #[test]
    fn test_parse_errors() {
        assert!("M".parse::<Cigar>().is_err());
        assert!("10".parse::<Cigar>().is_err());
        assert!("3Q".parse::<Cigar>().is_err());
        assert!("".parse::<Cigar>().is_err());
    }

    #[test]
    fn test_validate_versions() {
        let cigar: Cigar = "3M2X".parse().unwrap();
        assert!(cigar.validate(Some(Version::Gfa1)).is_ok());
        let err = cigar.validate(Some(Version::Gfa2)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Version);
        assert!("0M".parse::<Cigar>().unwrap().validate(None).is_ok());
        assert!("2M0I2M".parse::<Cigar>().unwrap().validate(None).is_err());
    }

    #[test]
    fn test_trace() {
        let trace: Trace = "12,14,15".parse().unwrap();
        assert!(trace.validate().is_ok());
        assert!(trace.validate_with_spacing(14).is_err());
        let negative: Trace = "3,-1".parse().unwrap();
        assert_eq!(
            negative.validate().unwrap_err().kind(),
            crate::error::ErrorKind::Value
        );
    }

    fn cigar_strategy() -> impl Strategy<Value = Cigar> {
        let code = prop_oneof![
            Just(CigarCode::M),
            Just(CigarCode::I),
            Just(CigarCode::D),
            Just(CigarCode::Eq),
            Just(CigarCode::X),
            Just(CigarCode::P),
        ];
        proptest::collection::vec((1u64..1000, code), 1..12)
            .prop_map(|ops| Cigar(ops.into_iter().map(|(l, c)| CigarOp::new(l, c)).collect()))
    }

    proptest! {
        #[test]
        fn prop_complement_is_involution(cigar in cigar_strategy()) {
            prop_assert_eq!(cigar.complement().complement(), cigar);
        }

        #[test]
        fn prop_complement_swaps_lengths(cigar in cigar_strategy()) {
            prop_assert_eq!(cigar.length_on_reference(), cigar.complement().length_on_query());
        }

        #[test]
        fn prop_display_parses_back(cigar in cigar_strategy()) {
            prop_assert_eq!(cigar.to_string().parse::<Cigar>().unwrap(), cigar);
        }
    }
}
