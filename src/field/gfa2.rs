//! Codecs of GFA2 positional fields

use super::{check, regex, wrong_type, Codec};
use crate::error::{GfaError, Result};
use crate::value::{Cigar, LastPos, LineRef, OrientedLine, Trace, Value};
use crate::version::Version;

fn unresolved(id: &crate::gfa::LineId) -> GfaError {
    GfaError::Runtime(format!(
        "reference {} must be resolved to a name before writing",
        id
    ))
}

pub struct Identifier;

impl Codec for Identifier {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::String(s.to_string()))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^[!-~]+$"), "identifier_gfa2", s, "[!-~]+")
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.validate_encoded(s),
            Value::Line(_) => Ok(()),
            other => Err(wrong_type("identifier_gfa2", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Line(id) => Err(unresolved(id)),
            other => Err(wrong_type("identifier_gfa2", other)),
        }
    }
}

pub struct OptionalIdentifier;

impl Codec for OptionalIdentifier {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        if s == "*" {
            Ok(Value::Placeholder)
        } else {
            Ok(Value::String(s.to_string()))
        }
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(
            regex!(r"^[!-~]+$"),
            "optional_identifier_gfa2",
            s,
            "* or [!-~]+",
        )
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::Placeholder => Ok(()),
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("optional_identifier_gfa2", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Placeholder => Ok("*".to_string()),
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type("optional_identifier_gfa2", other)),
        }
    }
}

fn encode_oriented(datatype: &str, value: &Value) -> Result<String> {
    match value {
        Value::OrientedLine(ol) => match &ol.line {
            LineRef::Name(name) => Ok(format!("{}{}", name, ol.orient)),
            LineRef::Line(id) => Err(unresolved(id)),
        },
        Value::String(s) => Ok(s.clone()),
        other => Err(wrong_type(datatype, other)),
    }
}

fn validate_oriented(datatype: &str, value: &Value) -> Result<()> {
    match value {
        Value::OrientedLine(ol) => match &ol.line {
            LineRef::Name(name) => check(regex!(r"^[!-~]+$"), datatype, name, "[!-~]+"),
            LineRef::Line(_) => Ok(()),
        },
        other => Err(wrong_type(datatype, other)),
    }
}

pub struct OrientedIdentifier;

impl Codec for OrientedIdentifier {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::OrientedLine(s.parse::<OrientedLine>()?))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(
            regex!(r"^[!-~]+[+-]$"),
            "oriented_identifier_gfa2",
            s,
            "an identifier followed by + or -",
        )
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        if let Value::String(s) = value {
            return self.validate_encoded(s);
        }
        validate_oriented("oriented_identifier_gfa2", value)
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        encode_oriented("oriented_identifier_gfa2", value)
    }
}

pub struct IdentifierList;

impl Codec for IdentifierList {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::List(
            s.split(' ')
                .map(|item| Value::String(item.to_string()))
                .collect(),
        ))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(
            regex!(r"^[!-~]+( [!-~]+)*$"),
            "identifier_list_gfa2",
            s,
            "space-separated identifiers",
        )
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.validate_encoded(s),
            Value::List(items) => items
                .iter()
                .try_for_each(|item| Identifier.validate_decoded(item)),
            other => Err(wrong_type("identifier_list_gfa2", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::List(items) => Ok(items
                .iter()
                .map(|item| Identifier.unsafe_encode(item))
                .collect::<Result<Vec<_>>>()?
                .join(" ")),
            other => Err(wrong_type("identifier_list_gfa2", other)),
        }
    }
}

pub struct OrientedIdentifierList;

impl Codec for OrientedIdentifierList {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        s.split(' ')
            .map(|item| item.parse::<OrientedLine>().map(Value::OrientedLine))
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(
            regex!(r"^[!-~]+[+-]( [!-~]+[+-])*$"),
            "oriented_identifier_list_gfa2",
            s,
            "space-separated identifiers each followed by + or -",
        )
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.validate_encoded(s),
            Value::List(items) => items
                .iter()
                .try_for_each(|item| validate_oriented("oriented_identifier_list_gfa2", item)),
            other => Err(wrong_type("oriented_identifier_list_gfa2", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::List(items) => Ok(items
                .iter()
                .map(|item| encode_oriented("oriented_identifier_list_gfa2", item))
                .collect::<Result<Vec<_>>>()?
                .join(" ")),
            other => Err(wrong_type("oriented_identifier_list_gfa2", other)),
        }
    }
}

pub struct Alignment;

impl Codec for Alignment {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        if s == "*" {
            Ok(Value::Placeholder)
        } else if s.bytes().all(|b| b.is_ascii_digit() || b == b',' || b == b'-') {
            Ok(Value::Trace(s.parse::<Trace>()?))
        } else {
            Ok(Value::Cigar(s.parse::<Cigar>()?))
        }
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(
            regex!(r"^(\*|([0-9]+[MDIP])+|-?[0-9]+(,-?[0-9]+)*)$"),
            "alignment_gfa2",
            s,
            "*, a CIGAR string with M, D, I, P operations, or a trace",
        )
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::Placeholder => Ok(()),
            Value::String(s) => self.validate_encoded(s),
            Value::Cigar(cigar) => cigar.validate(Some(Version::Gfa2)),
            Value::Trace(trace) => trace.validate(),
            other => Err(wrong_type("alignment_gfa2", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Placeholder => Ok("*".to_string()),
            Value::String(s) => Ok(s.clone()),
            Value::Cigar(cigar) => Ok(cigar.to_string()),
            Value::Trace(trace) => Ok(trace.to_string()),
            other => Err(wrong_type("alignment_gfa2", other)),
        }
    }
}

pub struct Position;

impl Codec for Position {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::LastPos(s.parse::<LastPos>()?))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^[0-9]+\$?$"), "position_gfa2", s, "[0-9]+$?")
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::LastPos(_) => Ok(()),
            Value::Int(i) if *i >= 0 => Ok(()),
            Value::Int(i) => Err(GfaError::Value(format!("position {} is negative", i))),
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("position_gfa2", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::LastPos(pos) => Ok(pos.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type("position_gfa2", other)),
        }
    }
}

pub struct Sequence;

impl Codec for Sequence {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        if s == "*" {
            Ok(Value::Placeholder)
        } else {
            Ok(Value::String(s.to_string()))
        }
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^(\*|[!-~]+)$"), "sequence_gfa2", s, "* or [!-~]+")
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::Placeholder => Ok(()),
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("sequence_gfa2", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Placeholder => Ok("*".to_string()),
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type("sequence_gfa2", other)),
        }
    }
}

pub struct OptionalInteger;

impl Codec for OptionalInteger {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        if s == "*" {
            return Ok(Value::Placeholder);
        }
        s.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| GfaError::Value(format!("integer '{}' is out of range", s)))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(
            regex!(r"^(\*|[-+]?[0-9]+)$"),
            "optional_integer",
            s,
            "* or an integer",
        )
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::Placeholder | Value::Int(_) => Ok(()),
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("optional_integer", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Placeholder => Ok("*".to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type("optional_integer", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_alignment_kinds() {
        assert!(matches!(Alignment.decode("*").unwrap(), Value::Placeholder));
        assert!(matches!(Alignment.decode("4M2I").unwrap(), Value::Cigar(_)));
        assert!(matches!(Alignment.decode("12,12,4").unwrap(), Value::Trace(_)));
        assert!(matches!(Alignment.decode("7").unwrap(), Value::Trace(_)));
    }

    #[test]
    fn test_gfa1_only_cigar_ops_rejected() {
        assert_eq!(
            Alignment.decode("4X").unwrap_err().kind(),
            ErrorKind::Format
        );
        let cigar: Cigar = "4M2X".parse().unwrap();
        assert_eq!(
            Alignment.validate_decoded(&Value::Cigar(cigar)).unwrap_err().kind(),
            ErrorKind::Version
        );
    }

    #[test]
    fn test_negative_trace_is_value_error() {
        Alignment.validate_encoded("12,-1").unwrap();
        assert!(matches!(Alignment.unsafe_decode("12,-1").unwrap(), Value::Trace(_)));
        assert_eq!(
            Alignment.decode("12,-1").unwrap_err().kind(),
            ErrorKind::Value
        );
        assert_eq!(
            Alignment.decode("-3").unwrap_err().kind(),
            ErrorKind::Value
        );
    }

    #[test]
    fn test_position_last_marker() {
        assert_eq!(
            Position.decode("100$").unwrap(),
            Value::LastPos(LastPos::new(100, true))
        );
        assert!(Position.decode("10$0").is_err());
    }

    #[test]
    fn test_identifier_list() {
        let value = IdentifierList.decode("a b c").unwrap();
        assert_eq!(value.as_list().unwrap().len(), 3);
        assert!(IdentifierList.decode("a  b").is_err());
    }
}
