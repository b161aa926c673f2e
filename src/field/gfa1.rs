//! Codecs of GFA1 positional fields

use super::{check, regex, wrong_type, Codec};
use crate::error::{GfaError, Result};
use crate::value::{Cigar, LineRef, OrientedLine, Value};
use crate::version::Version;

fn check_segment_name(s: &str) -> Result<()> {
    check(
        regex!(r"^[!-)+-<>-~][!-~]*$"),
        "segment_name_gfa1",
        s,
        "[!-)+-<>-~][!-~]* not containing '+,' or '-,'",
    )?;
    if s.contains("+,") || s.contains("-,") {
        return Err(GfaError::Format(format!(
            "segment name '{}' contains '+,' or '-,'",
            s
        )));
    }
    Ok(())
}

fn encode_name(datatype: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Line(id) => Err(GfaError::Runtime(format!(
            "reference {} must be resolved to a name before writing",
            id
        ))),
        other => Err(wrong_type(datatype, other)),
    }
}

pub struct SegmentName;

impl Codec for SegmentName {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::String(s.to_string()))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check_segment_name(s)
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => check_segment_name(s),
            Value::Line(_) => Ok(()),
            other => Err(wrong_type("segment_name_gfa1", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        encode_name("segment_name_gfa1", value)
    }
}

pub struct PathName;

impl Codec for PathName {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::String(s.to_string()))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(
            regex!(r"^[!-)+-<>-~][!-~]*$"),
            "path_name_gfa1",
            s,
            "[!-)+-<>-~][!-~]*",
        )
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("path_name_gfa1", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        encode_name("path_name_gfa1", value)
    }
}

/// Split `a+,b-,c+` after each orientation sign.
fn split_oriented_list(s: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut start = 0;
    let bytes = s.as_bytes();
    for i in 1..bytes.len() {
        if bytes[i] == b',' && (bytes[i - 1] == b'+' || bytes[i - 1] == b'-') {
            items.push(&s[start..i]);
            start = i + 1;
        }
    }
    items.push(&s[start..]);
    items
}

fn check_oriented_segment(item: &OrientedLine) -> Result<()> {
    match &item.line {
        LineRef::Name(name) => check_segment_name(name),
        LineRef::Line(_) => Ok(()),
    }
}

fn encode_oriented(datatype: &str, item: &Value) -> Result<String> {
    match item {
        Value::OrientedLine(ol) => match &ol.line {
            LineRef::Name(name) => Ok(format!("{}{}", name, ol.orient)),
            LineRef::Line(id) => Err(GfaError::Runtime(format!(
                "reference {} must be resolved to a name before writing",
                id
            ))),
        },
        Value::String(s) => Ok(s.clone()),
        other => Err(wrong_type(datatype, other)),
    }
}

pub struct OrientedIdentifierList;

impl Codec for OrientedIdentifierList {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        split_oriented_list(s)
            .into_iter()
            .map(|item| item.parse::<OrientedLine>().map(Value::OrientedLine))
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(
            regex!(r"^[!-)+-<>-~][!-~]*[+-](,[!-)+-<>-~][!-~]*[+-])*$"),
            "oriented_identifier_list_gfa1",
            s,
            "comma-separated segment names each followed by + or -",
        )?;
        for item in split_oriented_list(s) {
            check_segment_name(&item[..item.len() - 1])?;
        }
        Ok(())
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        let items = match value {
            Value::List(items) => items,
            Value::String(s) => return self.validate_encoded(s),
            other => return Err(wrong_type("oriented_identifier_list_gfa1", other)),
        };
        if items.is_empty() {
            return Err(GfaError::Value("the list of segments is empty".to_string()));
        }
        for item in items {
            match item {
                Value::OrientedLine(ol) => check_oriented_segment(ol)?,
                other => return Err(wrong_type("oriented_identifier_list_gfa1", other)),
            }
        }
        Ok(())
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::List(items) => Ok(items
                .iter()
                .map(|item| encode_oriented("oriented_identifier_list_gfa1", item))
                .collect::<Result<Vec<_>>>()?
                .join(",")),
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type("oriented_identifier_list_gfa1", other)),
        }
    }
}

fn validate_cigar_value(datatype: &str, value: &Value) -> Result<()> {
    match value {
        Value::Placeholder => Ok(()),
        Value::Cigar(cigar) => cigar.validate(Some(Version::Gfa1)),
        other => Err(wrong_type(datatype, other)),
    }
}

fn decode_cigar_or_placeholder(s: &str) -> Result<Value> {
    if s == "*" {
        Ok(Value::Placeholder)
    } else {
        Ok(Value::Cigar(s.parse::<Cigar>()?))
    }
}

pub struct Alignment;

impl Codec for Alignment {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        decode_cigar_or_placeholder(s)
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(
            regex!(r"^(\*|([0-9]+[MIDNSHPX=])+)$"),
            "alignment_gfa1",
            s,
            "* or a CIGAR string",
        )
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        if let Value::String(s) = value {
            return self.validate_encoded(s);
        }
        validate_cigar_value("alignment_gfa1", value)
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Placeholder => Ok("*".to_string()),
            Value::Cigar(cigar) => Ok(cigar.to_string()),
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type("alignment_gfa1", other)),
        }
    }
}

pub struct AlignmentList;

impl Codec for AlignmentList {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        if s == "*" {
            return Ok(Value::Placeholder);
        }
        s.split(',')
            .map(decode_cigar_or_placeholder)
            .collect::<Result<Vec<_>>>()
            .map(Value::List)
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(
            regex!(r"^(\*|([0-9]+[MIDNSHPX=])+)(,(\*|([0-9]+[MIDNSHPX=])+))*$"),
            "alignment_list_gfa1",
            s,
            "* or comma-separated CIGAR strings",
        )
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::Placeholder => Ok(()),
            Value::String(s) => self.validate_encoded(s),
            Value::List(items) => items
                .iter()
                .try_for_each(|item| validate_cigar_value("alignment_list_gfa1", item)),
            other => Err(wrong_type("alignment_list_gfa1", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Placeholder => Ok("*".to_string()),
            Value::String(s) => Ok(s.clone()),
            Value::List(items) => Ok(items
                .iter()
                .map(|item| Alignment.unsafe_encode(item))
                .collect::<Result<Vec<_>>>()?
                .join(",")),
            other => Err(wrong_type("alignment_list_gfa1", other)),
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
        check(
            regex!(r"^(\*|[A-Za-z=.]+)$"),
            "sequence_gfa1",
            s,
            "* or [A-Za-z=.]+",
        )
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::Placeholder => Ok(()),
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("sequence_gfa1", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Placeholder => Ok("*".to_string()),
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type("sequence_gfa1", other)),
        }
    }
}

pub struct Position;

impl Codec for Position {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        s.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| GfaError::Value(format!("position '{}' is out of range", s)))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^[0-9]+$"), "position_gfa1", s, "[0-9]+")
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::Int(i) if *i >= 0 => Ok(()),
            Value::Int(i) => Err(GfaError::Value(format!("position {} is negative", i))),
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("position_gfa1", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Int(i) => Ok(i.to_string()),
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type("position_gfa1", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::value::Orientation;

    #[test]
    fn test_split_oriented_list() {
        assert_eq!(split_oriented_list("a+,b-,c+"), vec!["a+", "b-", "c+"]);
        assert_eq!(split_oriented_list("x,y+,z-"), vec!["x,y+", "z-"]);
    }

    #[test]
    fn test_segment_names_with_commas() {
        let value = OrientedIdentifierList.decode("a,b+,c-").unwrap();
        let items = value.as_list().unwrap();
        assert_eq!(items.len(), 2);
        match &items[1] {
            Value::OrientedLine(ol) => {
                assert_eq!(ol.name(), Some("c"));
                assert_eq!(ol.orient, Orientation::Reverse);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_gfa1_cigar_allows_all_ops() {
        assert!(Alignment.decode("1M2I3D4N5S6H7P8=9X").is_ok());
        assert!(Alignment.decode("10").is_err());
    }

    #[test]
    fn test_alignment_list_mixes_placeholders() {
        let value = AlignmentList.decode("3M,*").unwrap();
        assert_eq!(
            value,
            Value::List(vec![Value::Cigar("3M".parse().unwrap()), Value::Placeholder])
        );
    }

    #[test]
    fn test_negative_position_is_value_error() {
        let err = Position.validate_decoded(&Value::Int(-1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }
}
