//! Byte arrays for `H` tags

use std::fmt;
use std::str::FromStr;

use crate::error::{GfaError, Result};

/// Immutable byte array, written as uppercase hexadecimal.
///
/// To edit, take the bytes out with [`ByteArray::to_vec`] and build a new
/// array from the modified vector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ByteArray(Vec<u8>);

impl ByteArray {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.0.clone()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(GfaError::Value("byte array is empty".to_string()));
        }
        Ok(())
    }
}

impl From<Vec<u8>> for ByteArray {
    fn from(bytes: Vec<u8>) -> Self {
        ByteArray(bytes)
    }
}

impl From<&[u8]> for ByteArray {
    fn from(bytes: &[u8]) -> Self {
        ByteArray(bytes.to_vec())
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

impl FromStr for ByteArray {
    type Err = GfaError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        if bytes.is_empty() || bytes.len() % 2 != 0 {
            return Err(GfaError::Format(format!(
                "'{}' is not an even-length hexadecimal string",
                s
            )));
        }
        bytes
            .chunks(2)
            .map(|pair| match (hex_digit(pair[0]), hex_digit(pair[1])) {
                (Some(hi), Some(lo)) => Ok(hi << 4 | lo),
                _ => Err(GfaError::Format(format!(
                    "'{}' contains characters other than 0-9 and A-F",
                    s
                ))),
            })
            .collect::<Result<Vec<u8>>>()
            .map(ByteArray)
    }
}

impl fmt::Display for ByteArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{:02X}", b)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let ba: ByteArray = "12ACF0".parse().unwrap();
        assert_eq!(ba.as_bytes(), &[0x12, 0xAC, 0xF0]);
        assert_eq!(ba.to_string(), "12ACF0");
    }

    #[test]
    fn test_rejects_lowercase_and_odd_length() {
        assert!("12ac".parse::<ByteArray>().is_err());
        assert!("123".parse::<ByteArray>().is_err());
        assert!("".parse::<ByteArray>().is_err());
    }

    #[test]
    fn test_edit_through_vec() {
        let ba: ByteArray = "0001".parse().unwrap();
        let mut bytes = ba.to_vec();
        bytes.push(0xFF);
        assert_eq!(ByteArray::from(bytes).to_string(), "0001FF");
    }
}
