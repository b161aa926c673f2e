//! Numeric arrays for `B` tags

use std::fmt;
use std::str::FromStr;

use crate::error::{GfaError, Result};
use crate::value::format_float;

/// Element type code of a numeric array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericSubtype {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    Float,
}

impl NumericSubtype {
    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'c' => Ok(NumericSubtype::I8),
            'C' => Ok(NumericSubtype::U8),
            's' => Ok(NumericSubtype::I16),
            'S' => Ok(NumericSubtype::U16),
            'i' => Ok(NumericSubtype::I32),
            'I' => Ok(NumericSubtype::U32),
            'f' => Ok(NumericSubtype::Float),
            _ => Err(GfaError::Format(format!(
                "'{}' is not a numeric array subtype (one of cCsSiIf)",
                c
            ))),
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            NumericSubtype::I8 => 'c',
            NumericSubtype::U8 => 'C',
            NumericSubtype::I16 => 's',
            NumericSubtype::U16 => 'S',
            NumericSubtype::I32 => 'i',
            NumericSubtype::U32 => 'I',
            NumericSubtype::Float => 'f',
        }
    }

    /// Inclusive range of an integer subtype
    pub fn range(&self) -> Option<(i64, i64)> {
        match self {
            NumericSubtype::I8 => Some((i8::MIN as i64, i8::MAX as i64)),
            NumericSubtype::U8 => Some((0, u8::MAX as i64)),
            NumericSubtype::I16 => Some((i16::MIN as i64, i16::MAX as i64)),
            NumericSubtype::U16 => Some((0, u16::MAX as i64)),
            NumericSubtype::I32 => Some((i32::MIN as i64, i32::MAX as i64)),
            NumericSubtype::U32 => Some((0, u32::MAX as i64)),
            NumericSubtype::Float => None,
        }
    }

    /// Narrowest integer subtype holding every value in `[min, max]`.
    pub fn for_range(min: i64, max: i64) -> Result<Self> {
        let candidates: &[NumericSubtype] = if min >= 0 {
            &[NumericSubtype::U8, NumericSubtype::U16, NumericSubtype::U32]
        } else {
            &[NumericSubtype::I8, NumericSubtype::I16, NumericSubtype::I32]
        };
        candidates
            .iter()
            .copied()
            .find(|subtype| match subtype.range() {
                Some((lo, hi)) => lo <= min && max <= hi,
                None => false,
            })
            .ok_or_else(|| {
                GfaError::Value(format!(
                    "values in [{}, {}] do not fit any integer array subtype",
                    min, max
                ))
            })
    }
}

/// Elements of a numeric array: all integers or all floats
#[derive(Debug, Clone, PartialEq)]
pub enum NumericValues {
    Int(Vec<i64>),
    Float(Vec<f64>),
}

/// A homogeneous array of integers or floats
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    subtype: Option<NumericSubtype>,
    values: NumericValues,
}

impl NumericArray {
    /// Integer array; the subtype is computed from the value range.
    pub fn from_ints(values: Vec<i64>) -> Self {
        Self {
            subtype: None,
            values: NumericValues::Int(values),
        }
    }

    pub fn from_floats(values: Vec<f64>) -> Self {
        Self {
            subtype: None,
            values: NumericValues::Float(values),
        }
    }

    /// Array with an explicit subtype; checked by [`NumericArray::validate`].
    pub fn with_subtype(subtype: NumericSubtype, values: NumericValues) -> Self {
        Self {
            subtype: Some(subtype),
            values,
        }
    }

    pub fn values(&self) -> &NumericValues {
        &self.values
    }

    pub fn len(&self) -> usize {
        match &self.values {
            NumericValues::Int(v) => v.len(),
            NumericValues::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Explicit subtype, or the narrowest one fitting the values.
    pub fn subtype(&self) -> Result<NumericSubtype> {
        if let Some(subtype) = self.subtype {
            return Ok(subtype);
        }
        Self::compute_subtype(&self.values)
    }

    pub fn compute_subtype(values: &NumericValues) -> Result<NumericSubtype> {
        match values {
            NumericValues::Float(_) => Ok(NumericSubtype::Float),
            NumericValues::Int(ints) => {
                let min = ints.iter().copied().min().unwrap_or(0);
                let max = ints.iter().copied().max().unwrap_or(0);
                NumericSubtype::for_range(min, max)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(GfaError::Value("numeric array is empty".to_string()));
        }
        let subtype = self.subtype()?;
        match (&self.values, subtype.range()) {
            (NumericValues::Float(_), None) => Ok(()),
            (NumericValues::Float(_), Some(_)) => Err(GfaError::Value(format!(
                "float values in an array of subtype '{}'",
                subtype.as_char()
            ))),
            (NumericValues::Int(_), None) => Ok(()),
            (NumericValues::Int(ints), Some((lo, hi))) => {
                match ints.iter().find(|v| **v < lo || **v > hi) {
                    Some(v) => Err(GfaError::Value(format!(
                        "value {} out of range for array subtype '{}'",
                        v,
                        subtype.as_char()
                    ))),
                    None => Ok(()),
                }
            }
        }
    }

    /// `B` tag content: subtype code followed by comma-separated elements.
    pub fn to_gfa_string(&self) -> Result<String> {
        let subtype = self.subtype()?;
        Ok(self.render(subtype))
    }

    fn render(&self, subtype: NumericSubtype) -> String {
        let mut out = String::new();
        out.push(subtype.as_char());
        match &self.values {
            NumericValues::Int(ints) => {
                for v in ints {
                    out.push(',');
                    out.push_str(&v.to_string());
                }
            }
            NumericValues::Float(floats) => {
                for v in floats {
                    out.push(',');
                    out.push_str(&format_float(*v));
                }
            }
        }
        out
    }
}

impl From<Vec<i64>> for NumericArray {
    fn from(values: Vec<i64>) -> Self {
        NumericArray::from_ints(values)
    }
}

impl From<Vec<f64>> for NumericArray {
    fn from(values: Vec<f64>) -> Self {
        NumericArray::from_floats(values)
    }
}

impl FromStr for NumericArray {
    type Err = GfaError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(',');
        let code = parts.next().unwrap_or("");
        let mut chars = code.chars();
        let subtype = match (chars.next(), chars.next()) {
            (Some(c), None) => NumericSubtype::from_char(c)?,
            _ => {
                return Err(GfaError::Format(format!(
                    "numeric array '{}' must start with a one-letter subtype",
                    s
                )))
            }
        };
        let items: Vec<&str> = parts.collect();
        if items.is_empty() {
            return Err(GfaError::Format(format!("numeric array '{}' has no elements", s)));
        }
        let values = if subtype == NumericSubtype::Float {
            NumericValues::Float(
                items
                    .iter()
                    .map(|item| {
                        item.parse::<f64>().map_err(|_| {
                            GfaError::Format(format!("'{}' is not a float in '{}'", item, s))
                        })
                    })
                    .collect::<Result<_>>()?,
            )
        } else {
            NumericValues::Int(
                items
                    .iter()
                    .map(|item| {
                        item.parse::<i64>().map_err(|_| {
                            GfaError::Format(format!("'{}' is not an integer in '{}'", item, s))
                        })
                    })
                    .collect::<Result<_>>()?,
            )
        };
        Ok(NumericArray::with_subtype(subtype, values))
    }
}

impl fmt::Display for NumericArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subtype = self.subtype().unwrap_or(match self.values {
            NumericValues::Int(_) => NumericSubtype::I32,
            NumericValues::Float(_) => NumericSubtype::Float,
        });
        f.write_str(&self.render(subtype))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn subtype_of(values: Vec<i64>) -> Result<char> {
        NumericArray::from_ints(values)
            .subtype()
            .map(|s| s.as_char())
    }

    #[test]
    fn test_subtype_boundaries() {
        assert_eq!(subtype_of(vec![0, 255]).unwrap(), 'C');
        assert_eq!(subtype_of(vec![256]).unwrap(), 'S');
        assert_eq!(subtype_of(vec![-128, 0]).unwrap(), 'c');
        assert_eq!(subtype_of(vec![-129]).unwrap(), 's');
        assert_eq!(subtype_of(vec![4_294_967_295]).unwrap(), 'I');
        assert_eq!(subtype_of(vec![-2_147_483_648]).unwrap(), 'i');
    }

    #[test]
    fn test_out_of_range_is_value_error() {
        let err = subtype_of(vec![4_294_967_296]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Value);
        assert!(subtype_of(vec![-2_147_483_649]).is_err());
        assert!(subtype_of(vec![-1, 3_000_000_000]).is_err());
    }

    #[test]
    fn test_parse_keeps_declared_subtype() {
        let array: NumericArray = "s,1,2".parse().unwrap();
        assert_eq!(array.to_gfa_string().unwrap(), "s,1,2");
        let bad: NumericArray = "c,1,300".parse().unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_float_array() {
        let array: NumericArray = "f,1.5,2.0".parse().unwrap();
        assert_eq!(array.to_gfa_string().unwrap(), "f,1.5,2.0");
        assert!(array.validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_unsigned_byte_range(v in 0i64..256) {
            prop_assert_eq!(subtype_of(vec![v]).unwrap(), 'C');
        }

        #[test]
        fn prop_signed_byte_range(v in -128i64..0) {
            prop_assert_eq!(subtype_of(vec![v]).unwrap(), 'c');
        }

        #[test]
        fn prop_computed_subtype_validates(values in proptest::collection::vec(-2_147_483_648i64..4_294_967_296, 1..8)) {
            let array = NumericArray::from_ints(values.clone());
            let min = *values.iter().min().unwrap();
            let max = *values.iter().max().unwrap();
            if min < 0 && max > i32::MAX as i64 {
                prop_assert!(array.subtype().is_err());
            } else {
                prop_assert!(array.validate().is_ok());
            }
        }
    }
}
