//! Field datatypes and their codecs
//!
//! Every positional field and tag of a line has a [`Datatype`]. The codec
//! registered for the datatype converts between the GFA text of a field and
//! its decoded [`Value`], and validates either form:
//!
//! ```
//! use gfakit::field::{self, Datatype};
//! use gfakit::value::Value;
//!
//! let value = field::decode(&Datatype::I, "12").unwrap();
//! assert_eq!(value, Value::Int(12));
//! assert_eq!(field::encode(&Datatype::I, &value).unwrap(), "12");
//! assert!(field::decode(&Datatype::I, "1x").is_err());
//! ```
//!
//! New datatypes are added with [`register_datatype`].

/// Compile a regex literal once.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).expect("regex literal is valid"))
    }};
}
pub(crate) use regex;

mod common;
mod gfa1;
mod gfa2;
pub mod parser;
mod registry;
mod tag;

use std::fmt;
use std::str::FromStr;

use crate::error::{GfaError, Result};
use crate::value::Value;

pub use parser::{is_tag_shaped, parse_tag, validate_custom_tag_name, TagParts};
pub use registry::{codec, register_datatype};

/// Identifier of a field datatype
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Datatype {
    /// Printable character
    A,
    /// Signed integer
    I,
    /// Float
    F,
    /// Printable string, spaces allowed
    Z,
    /// JSON
    J,
    /// Byte array in hex
    H,
    /// Numeric array
    B,
    SegmentNameGfa1,
    PathNameGfa1,
    OrientedIdentifierListGfa1,
    AlignmentGfa1,
    AlignmentListGfa1,
    SequenceGfa1,
    PositionGfa1,
    IdentifierGfa2,
    OptionalIdentifierGfa2,
    OrientedIdentifierGfa2,
    IdentifierListGfa2,
    OrientedIdentifierListGfa2,
    AlignmentGfa2,
    PositionGfa2,
    SequenceGfa2,
    OptionalInteger,
    CustomRecordType,
    Comment,
    Orientation,
    Generic,
    /// Datatype added at runtime with [`register_datatype`]
    Custom(String),
}

const BUILTIN: &[Datatype] = &[
    Datatype::A,
    Datatype::I,
    Datatype::F,
    Datatype::Z,
    Datatype::J,
    Datatype::H,
    Datatype::B,
    Datatype::SegmentNameGfa1,
    Datatype::PathNameGfa1,
    Datatype::OrientedIdentifierListGfa1,
    Datatype::AlignmentGfa1,
    Datatype::AlignmentListGfa1,
    Datatype::SequenceGfa1,
    Datatype::PositionGfa1,
    Datatype::IdentifierGfa2,
    Datatype::OptionalIdentifierGfa2,
    Datatype::OrientedIdentifierGfa2,
    Datatype::IdentifierListGfa2,
    Datatype::OrientedIdentifierListGfa2,
    Datatype::AlignmentGfa2,
    Datatype::PositionGfa2,
    Datatype::SequenceGfa2,
    Datatype::OptionalInteger,
    Datatype::CustomRecordType,
    Datatype::Comment,
    Datatype::Orientation,
    Datatype::Generic,
];

impl Datatype {
    pub fn name(&self) -> &str {
        match self {
            Datatype::A => "A",
            Datatype::I => "i",
            Datatype::F => "f",
            Datatype::Z => "Z",
            Datatype::J => "J",
            Datatype::H => "H",
            Datatype::B => "B",
            Datatype::SegmentNameGfa1 => "segment_name_gfa1",
            Datatype::PathNameGfa1 => "path_name_gfa1",
            Datatype::OrientedIdentifierListGfa1 => "oriented_identifier_list_gfa1",
            Datatype::AlignmentGfa1 => "alignment_gfa1",
            Datatype::AlignmentListGfa1 => "alignment_list_gfa1",
            Datatype::SequenceGfa1 => "sequence_gfa1",
            Datatype::PositionGfa1 => "position_gfa1",
            Datatype::IdentifierGfa2 => "identifier_gfa2",
            Datatype::OptionalIdentifierGfa2 => "optional_identifier_gfa2",
            Datatype::OrientedIdentifierGfa2 => "oriented_identifier_gfa2",
            Datatype::IdentifierListGfa2 => "identifier_list_gfa2",
            Datatype::OrientedIdentifierListGfa2 => "oriented_identifier_list_gfa2",
            Datatype::AlignmentGfa2 => "alignment_gfa2",
            Datatype::PositionGfa2 => "position_gfa2",
            Datatype::SequenceGfa2 => "sequence_gfa2",
            Datatype::OptionalInteger => "optional_integer",
            Datatype::CustomRecordType => "custom_record_type",
            Datatype::Comment => "comment",
            Datatype::Orientation => "orientation",
            Datatype::Generic => "generic",
            Datatype::Custom(name) => name,
        }
    }

    /// Datatypes usable in the `NAME:TYPE:VALUE` tag syntax.
    pub fn is_tag_datatype(&self) -> bool {
        matches!(
            self,
            Datatype::A
                | Datatype::I
                | Datatype::F
                | Datatype::Z
                | Datatype::J
                | Datatype::H
                | Datatype::B
        )
    }

    /// Datatypes decoded only when first accessed.
    pub fn is_delayed(&self) -> bool {
        matches!(
            self,
            Datatype::J
                | Datatype::H
                | Datatype::B
                | Datatype::AlignmentGfa1
                | Datatype::AlignmentGfa2
                | Datatype::AlignmentListGfa1
                | Datatype::OrientedIdentifierListGfa1
                | Datatype::IdentifierListGfa2
                | Datatype::OrientedIdentifierListGfa2
        )
    }

    pub fn builtins() -> &'static [Datatype] {
        BUILTIN
    }
}

impl FromStr for Datatype {
    type Err = GfaError;

    /// Builtin names map to their variant; any other name to
    /// [`Datatype::Custom`]. Whether a codec exists is checked on use.
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(GfaError::Argument("empty datatype name".to_string()));
        }
        Ok(BUILTIN
            .iter()
            .find(|dt| dt.name() == s)
            .cloned()
            .unwrap_or_else(|| Datatype::Custom(s.to_string())))
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decode/validate/encode contract of one datatype.
///
/// Implementors provide the unchecked transformations and the two
/// validators; the checked `decode` and `encode` are derived from them.
pub trait Codec: Send + Sync {
    /// Interpret `s`, assuming it is valid.
    fn unsafe_decode(&self, s: &str) -> Result<Value>;

    /// Fail with a format error unless `s` follows the grammar.
    fn validate_encoded(&self, s: &str) -> Result<()>;

    /// Fail with a type, value or version error unless `value` is
    /// acceptable.
    fn validate_decoded(&self, value: &Value) -> Result<()>;

    /// Write `value`, assuming it is valid.
    fn unsafe_encode(&self, value: &Value) -> Result<String>;

    fn decode(&self, s: &str) -> Result<Value> {
        self.validate_encoded(s)?;
        let value = self.unsafe_decode(s)?;
        self.validate_decoded(&value)?;
        Ok(value)
    }

    /// Strings are taken as already encoded.
    fn encode(&self, value: &Value) -> Result<String> {
        if let Value::String(s) = value {
            self.validate_encoded(s)?;
            return Ok(s.clone());
        }
        self.validate_decoded(value)?;
        self.unsafe_encode(value)
    }
}

pub fn decode(datatype: &Datatype, s: &str) -> Result<Value> {
    codec(datatype)?
        .decode(s)
        .map_err(|e| e.context(format!("datatype {}", datatype)))
}

pub fn unsafe_decode(datatype: &Datatype, s: &str) -> Result<Value> {
    codec(datatype)?.unsafe_decode(s)
}

pub fn encode(datatype: &Datatype, value: &Value) -> Result<String> {
    codec(datatype)?
        .encode(value)
        .map_err(|e| e.context(format!("datatype {}", datatype)))
}

pub fn unsafe_encode(datatype: &Datatype, value: &Value) -> Result<String> {
    codec(datatype)?.unsafe_encode(value)
}

pub fn validate_encoded(datatype: &Datatype, s: &str) -> Result<()> {
    codec(datatype)?
        .validate_encoded(s)
        .map_err(|e| e.context(format!("datatype {}", datatype)))
}

pub fn validate_decoded(datatype: &Datatype, value: &Value) -> Result<()> {
    codec(datatype)?
        .validate_decoded(value)
        .map_err(|e| e.context(format!("datatype {}", datatype)))
}

/// Type error for a value of the wrong variant.
pub(crate) fn wrong_type(datatype: &str, value: &Value) -> GfaError {
    GfaError::Type(format!(
        "a {} value is not acceptable for datatype {}",
        value.type_name(),
        datatype
    ))
}

pub(crate) fn check(re: &regex::Regex, datatype: &str, s: &str, grammar: &str) -> Result<()> {
    if re.is_match(s) {
        Ok(())
    } else {
        Err(bad_format(datatype, s, grammar))
    }
}

/// Format error naming the expected grammar.
pub(crate) fn bad_format(datatype: &str, s: &str, grammar: &str) -> GfaError {
    GfaError::Format(format!(
        "'{}' is not a valid {} (expected {})",
        s, datatype, grammar
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    /// encode(decode(s)) == s for valid samples of every builtin datatype.
    #[test]
    fn test_round_trips() {
        let samples: &[(Datatype, &[&str])] = &[
            (Datatype::A, &["A", "~"]),
            (Datatype::I, &["12", "-3", "0"]),
            (Datatype::F, &["1.5", "-0.25", "3.0"]),
            (Datatype::Z, &["hello world", "x"]),
            (Datatype::J, &["{\"a\":1}", "[1,2]"]),
            (Datatype::H, &["12ACF0"]),
            (Datatype::B, &["c,1,-2", "f,1.5,2.0", "I,4294967295"]),
            (Datatype::SegmentNameGfa1, &["seg1", "a-b"]),
            (Datatype::PathNameGfa1, &["p1"]),
            (Datatype::OrientedIdentifierListGfa1, &["1+,2-,3+", "a+b-,c+"]),
            (Datatype::AlignmentGfa1, &["10M", "*", "2M1D3M"]),
            (Datatype::AlignmentListGfa1, &["10M,*,2M", "*"]),
            (Datatype::SequenceGfa1, &["ACGT", "*", "acg=."]),
            (Datatype::PositionGfa1, &["12"]),
            (Datatype::IdentifierGfa2, &["s1"]),
            (Datatype::OptionalIdentifierGfa2, &["e1", "*"]),
            (Datatype::OrientedIdentifierGfa2, &["s1+", "s2-"]),
            (Datatype::IdentifierListGfa2, &["a b c"]),
            (Datatype::OrientedIdentifierListGfa2, &["a+ b- c+"]),
            (Datatype::AlignmentGfa2, &["*", "3M2I", "12,14,0"]),
            (Datatype::PositionGfa2, &["100$", "0"]),
            (Datatype::SequenceGfa2, &["*", "ACGT"]),
            (Datatype::OptionalInteger, &["*", "-12"]),
            (Datatype::CustomRecordType, &["X", "ZZ"]),
            (Datatype::Comment, &["any text", ""]),
            (Datatype::Orientation, &["+", "-"]),
            (Datatype::Generic, &["anything goes"]),
        ];
        for (datatype, strings) in samples {
            for s in *strings {
                let value = decode(datatype, s)
                    .unwrap_or_else(|e| panic!("decode {} {:?}: {}", datatype, s, e));
                assert_eq!(&encode(datatype, &value).unwrap(), s, "{}", datatype);
                assert_eq!(decode(datatype, &encode(datatype, &value).unwrap()).unwrap(), value);
            }
        }
    }

    #[test]
    fn test_every_builtin_is_registered() {
        for datatype in Datatype::builtins() {
            assert!(codec(datatype).is_ok(), "{}", datatype);
            assert_eq!(&datatype.name().parse::<Datatype>().unwrap(), datatype);
        }
    }

    #[test]
    fn test_unknown_datatype_is_type_error() {
        let datatype: Datatype = "no_such_type".parse().unwrap();
        let err = decode(&datatype, "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn test_encode_rejects_wrong_type() {
        let err = encode(&Datatype::I, &Value::Float(1.5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        let err = encode(&Datatype::I, &Value::from("x1")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_validate_encoded_matches_decode() {
        for (datatype, s) in [
            (Datatype::I, "1.0"),
            (Datatype::A, "AB"),
            (Datatype::H, "ABC"),
            (Datatype::SegmentNameGfa1, "a+,b"),
            (Datatype::SegmentNameGfa1, "=a"),
            (Datatype::AlignmentGfa1, "10Q"),
            (Datatype::PositionGfa2, "$1"),
            (Datatype::Orientation, "x"),
        ] {
            assert!(validate_encoded(&datatype, s).is_err(), "{} {:?}", datatype, s);
            assert!(decode(&datatype, s).is_err(), "{} {:?}", datatype, s);
        }
    }
}
