//! Construction of lines from text

use std::str::FromStr;
use std::sync::Arc;

use super::kind::{self, KindSpec, LineKind, RecordType};
use super::{Field, Line, Tag, GENERIC};
use crate::error::{GfaError, Result};
use crate::field::{self, is_tag_shaped, parse_tag, Datatype, TagParts};
use crate::value::{FieldArray, Value};
use crate::version::{ValidationLevel, Version};

/// Tag marking a line as a virtual placeholder in its text form
pub const VIRTUAL_MARKER: &str = "co:Z:GFA_virtual_line";

/// Header tags which may be given more than once only with the same value
const SINGLE_DEFINITION_TAGS: &[&str] = &["VN", "TS"];

impl Line {
    /// Parse one line of GFA text.
    ///
    /// `version` is the version of the graph the line is meant for; when
    /// `None`, the version of `S` lines is inferred from their shape.
    pub fn parse(text: &str, version: Option<Version>, vlevel: ValidationLevel) -> Result<Line> {
        let text = text.trim_end_matches(['\n', '\r']);
        if let Some(rest) = text.strip_prefix('#') {
            let content = rest.trim_start_matches([' ', '\t']);
            let spacer = &rest[..rest.len() - content.len()];
            return Line::comment(content, spacer, vlevel);
        }
        let fields: Vec<&str> = text.split('\t').collect();
        Line::from_fields(&fields, version, vlevel)
    }

    /// Build a line from its already split fields, record type first.
    pub fn from_fields(
        fields: &[&str],
        version: Option<Version>,
        vlevel: ValidationLevel,
    ) -> Result<Line> {
        let (code, rest) = fields
            .split_first()
            .ok_or_else(|| GfaError::Format("empty line".to_string()))?;
        if code.is_empty() {
            return Err(GfaError::Format(format!(
                "line '{}' has an empty record type",
                fields.join("\t")
            )));
        }
        let record_type = RecordType::from_code(code);
        if record_type == RecordType::Comment {
            if rest.len() > 2 {
                return Err(GfaError::Format(format!(
                    "comment has {} fields, expected content and spacer",
                    rest.len()
                )));
            }
            let content = rest.first().copied().unwrap_or("");
            let spacer = rest.get(1).copied().unwrap_or("");
            return Line::comment(content, spacer, vlevel);
        }

        let spec = kind_spec(&record_type, rest, version)?;
        let n_positional = if spec.is_variadic() {
            rest.iter().rposition(|f| !is_tag_shaped(f)).map_or(0, |i| i + 1)
        } else {
            spec.fields.len()
        };
        if rest.len() < n_positional {
            return Err(GfaError::Format(format!(
                "{} line '{}' has {} positional fields, expected {}",
                record_type,
                fields.join("\t"),
                rest.len(),
                n_positional
            )));
        }
        let (positional_strs, tag_strs) = rest.split_at(n_positional);

        let mut positional = Vec::with_capacity(n_positional);
        for (i, s) in positional_strs.iter().enumerate() {
            let (name, datatype) = match spec.fields.get(i) {
                Some(f) => (f.name.clone(), &f.datatype),
                None => (format!("field{}", i + 1), &GENERIC),
            };
            let field = make_field(datatype, s, vlevel)
                .map_err(|e| e.context(format!("{} line, field {}", record_type, name)))?;
            positional.push(field);
        }

        let mut line = Line::build(spec, record_type, vlevel, positional, Vec::new(), false);
        for s in tag_strs {
            if *s == VIRTUAL_MARKER {
                line.is_virtual = true;
                continue;
            }
            let parts = parse_tag(s)?;
            line.push_parsed_tag(parts)?;
        }
        if vlevel.validates_on_access() {
            line.check_consistency()?;
        }
        Ok(line)
    }

    fn comment(content: &str, spacer: &str, vlevel: ValidationLevel) -> Result<Line> {
        let positional = [content, spacer]
            .iter()
            .map(|s| make_field(&Datatype::Comment, s, vlevel))
            .collect::<Result<Vec<_>>>()?;
        Ok(Line::build(
            kind::spec(LineKind::Comment),
            RecordType::Comment,
            vlevel,
            positional,
            Vec::new(),
            false,
        ))
    }

    pub(crate) fn empty_header(vlevel: ValidationLevel) -> Line {
        Line::build(
            kind::spec(LineKind::Header),
            RecordType::Header,
            vlevel,
            Vec::new(),
            Vec::new(),
            false,
        )
    }

    /// Minimal virtual line standing in for the undeclared line `name`.
    pub(crate) fn placeholder(kind: LineKind, name: &str, vlevel: ValidationLevel) -> Result<Line> {
        let mut line = match kind {
            LineKind::SegmentGfa1 => Line::from_fields(&["S", name, "*"], Some(Version::Gfa1), vlevel)?,
            LineKind::SegmentGfa2 => {
                Line::from_fields(&["S", name, "0", "*"], Some(Version::Gfa2), vlevel)?
            }
            LineKind::Unknown => {
                let spec = kind::spec(LineKind::Unknown);
                let field = make_field(&spec.fields[0].datatype, name, vlevel)?;
                Line::build(spec, RecordType::Unknown, vlevel, vec![field], Vec::new(), false)
            }
            other => {
                return Err(GfaError::Assertion(format!(
                    "no placeholder exists for {:?} lines",
                    other
                )))
            }
        };
        line.is_virtual = true;
        Ok(line)
    }

    fn push_parsed_tag(&mut self, parts: TagParts<'_>) -> Result<()> {
        if self.vlevel.validates_on_access() {
            if let Some(expected) = self.spec.predefined_tag(parts.name) {
                if *expected != parts.datatype {
                    return Err(GfaError::Type(format!(
                        "tag {} of {} lines must have datatype {}, found {}",
                        parts.name, self.record_type, expected, parts.datatype
                    )));
                }
            }
        }
        if self.tags.iter().any(|t| t.name == parts.name) {
            if self.record_type == RecordType::Header {
                let value = field::decode(&parts.datatype, parts.value)?;
                return self.merge_header_tag(parts.name, parts.datatype, value);
            }
            return Err(GfaError::NotUnique(format!(
                "tag {} is defined more than once in {} line",
                parts.name, self.record_type
            )));
        }
        let field = make_field(&parts.datatype, parts.value, self.vlevel)
            .map_err(|e| e.context(format!("tag {}", parts.name)))?;
        self.tags.push(Tag {
            name: parts.name.to_string(),
            datatype: parts.datatype,
            field,
        });
        Ok(())
    }

    /// Add a value to a header tag, turning repeated tags into a field array.
    pub(crate) fn merge_header_tag(
        &mut self,
        name: &str,
        datatype: Datatype,
        value: Value,
    ) -> Result<()> {
        let Some(index) = self.tags.iter().position(|t| t.name == name) else {
            self.tags.push(Tag {
                name: name.to_string(),
                datatype,
                field: Field::decoded(value),
            });
            return Ok(());
        };
        let tag = &mut self.tags[index];
        let existing = tag.field.value_mut(&tag.datatype, true)?;
        if SINGLE_DEFINITION_TAGS.contains(&name) {
            if *existing == value {
                return Ok(());
            }
            return Err(GfaError::Inconsistency(format!(
                "header tag {} has conflicting values '{}' and '{}'",
                name, existing, value
            )));
        }
        if tag.datatype != datatype {
            return Err(GfaError::Inconsistency(format!(
                "header tag {} is defined with datatypes {} and {}",
                name, tag.datatype, datatype
            )));
        }
        match existing {
            Value::FieldArray(array) => array.absorb(value),
            other => {
                let first = std::mem::replace(other, Value::Placeholder);
                let mut array = FieldArray::new(datatype, vec![first]);
                array.absorb(value);
                *other = Value::FieldArray(array);
            }
        }
        Ok(())
    }

    /// Cross-field checks run on construction and by [`Line::validate`].
    pub(crate) fn check_consistency(&self) -> Result<()> {
        if self.spec.kind != LineKind::SegmentGfa1 {
            return Ok(());
        }
        let Some(declared) = self.get("LN")?.and_then(Value::as_int) else {
            return Ok(());
        };
        if let Some(Value::String(sequence)) = self.get("sequence")? {
            if declared != sequence.len() as i64 {
                return Err(GfaError::Inconsistency(format!(
                    "segment {}: LN:i:{} but the sequence has length {}",
                    self.name().unwrap_or("?"),
                    declared,
                    sequence.len()
                )));
            }
        }
        Ok(())
    }
}

/// Stored form of a field read from text at the given validation level.
pub(crate) fn make_field(datatype: &Datatype, s: &str, vlevel: ValidationLevel) -> Result<Field> {
    if !vlevel.validates_on_access() || datatype.is_delayed() {
        return Ok(Field::raw(s));
    }
    Ok(Field::decoded(field::decode(datatype, s)?))
}

fn kind_spec(
    record_type: &RecordType,
    rest: &[&str],
    version: Option<Version>,
) -> Result<Arc<KindSpec>> {
    let kind = match record_type {
        RecordType::Header => LineKind::Header,
        RecordType::Comment => LineKind::Comment,
        RecordType::Segment => match version {
            Some(Version::Gfa1) => LineKind::SegmentGfa1,
            Some(Version::Gfa2) => LineKind::SegmentGfa2,
            None if rest.len() >= 3 && !is_tag_shaped(rest[2]) => LineKind::SegmentGfa2,
            None => LineKind::SegmentGfa1,
        },
        RecordType::Link => gfa1_only(record_type, version, LineKind::Link)?,
        RecordType::Containment => gfa1_only(record_type, version, LineKind::Containment)?,
        RecordType::Path => gfa1_only(record_type, version, LineKind::Path)?,
        RecordType::Edge => gfa2_only(record_type, version, LineKind::Edge)?,
        RecordType::Fragment => gfa2_only(record_type, version, LineKind::Fragment)?,
        RecordType::Gap => gfa2_only(record_type, version, LineKind::Gap)?,
        RecordType::OrderedGroup => gfa2_only(record_type, version, LineKind::OrderedGroup)?,
        RecordType::UnorderedGroup => gfa2_only(record_type, version, LineKind::UnorderedGroup)?,
        RecordType::Custom(code) => {
            gfa2_only(record_type, version, LineKind::Custom)?;
            field::validate_encoded(&Datatype::CustomRecordType, code)?;
            return Ok(kind::extension(code).unwrap_or_else(|| kind::spec(LineKind::Custom)));
        }
        RecordType::Unknown => {
            return Err(GfaError::Format(format!(
                "'{}' is not a record type",
                record_type
            )))
        }
    };
    Ok(kind::spec(kind))
}

fn gfa1_only(record_type: &RecordType, version: Option<Version>, kind: LineKind) -> Result<LineKind> {
    match version {
        Some(Version::Gfa2) => Err(GfaError::Version(format!(
            "{} lines are GFA1 only and cannot be used in GFA2",
            record_type
        ))),
        _ => Ok(kind),
    }
}

fn gfa2_only(record_type: &RecordType, version: Option<Version>, kind: LineKind) -> Result<LineKind> {
    match version {
        Some(Version::Gfa1) if record_type.is_custom() => Err(GfaError::Version(format!(
            "custom record type {} is not allowed in GFA1",
            record_type
        ))),
        Some(Version::Gfa1) => Err(GfaError::Version(format!(
            "{} lines are GFA2 only and cannot be used in GFA1",
            record_type
        ))),
        _ => Ok(kind),
    }
}

impl FromStr for Line {
    type Err = GfaError;

    fn from_str(s: &str) -> Result<Self> {
        Line::parse(s, None, ValidationLevel::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_segment_version_inference() {
        let s1: Line = "S\t1\tACGT\tLN:i:4".parse().unwrap();
        assert_eq!(s1.kind(), LineKind::SegmentGfa1);
        let s2: Line = "S\t1\t4\tACGT".parse().unwrap();
        assert_eq!(s2.kind(), LineKind::SegmentGfa2);
        assert_eq!(s2.name(), Some("1"));
    }

    #[test]
    fn test_too_few_fields() {
        let err = "L\t1\t+\t2\t-".parse::<Line>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn test_version_mismatch() {
        let err = Line::parse("L\t1\t+\t2\t-\t*", Some(Version::Gfa2), ValidationLevel::OnAccess)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Version);
        let err = Line::parse("E\t*\t1+\t2+\t0\t1\t0\t1\t*", Some(Version::Gfa1), ValidationLevel::OnAccess)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Version);
        let err = Line::parse("X\tfoo", Some(Version::Gfa1), ValidationLevel::OnAccess).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Version);
    }

    #[test]
    fn test_comment_spacer() {
        let line: Line = "#  hello world".parse().unwrap();
        assert_eq!(line.get("content").unwrap(), Some(&Value::from("hello world")));
        assert_eq!(line.get("spacer").unwrap(), Some(&Value::from("  ")));
        assert_eq!(line.to_string(), "#  hello world");
    }

    #[test]
    fn test_duplicate_tag() {
        let err = "S\t1\t*\tRC:i:1\tRC:i:2".parse::<Line>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotUnique);
    }

    #[test]
    fn test_predefined_tag_datatype() {
        let err = "S\t1\t*\tLN:Z:12".parse::<Line>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
        assert!(Line::parse("S\t1\t*\tLN:Z:12", None, ValidationLevel::Off).is_ok());
    }

    #[test]
    fn test_segment_length_mismatch() {
        let err = "S\t1\tACGT\tLN:i:5".parse::<Line>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inconsistency);
    }

    #[test]
    fn test_header_merges_repeated_tags() {
        let header: Line = "H\txx:i:1\txx:i:2\tVN:Z:1.0\tVN:Z:1.0".parse().unwrap();
        match header.get("xx").unwrap() {
            Some(Value::FieldArray(array)) => {
                assert_eq!(array.values, vec![Value::Int(1), Value::Int(2)])
            }
            other => panic!("expected field array, got {:?}", other),
        }
        let err = "H\tVN:Z:1.0\tVN:Z:2.0".parse::<Line>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Inconsistency);
    }

    #[test]
    fn test_custom_record() {
        let line: Line = "X\tfoo\tbar baz\txx:i:1".parse().unwrap();
        assert_eq!(line.record_type(), &RecordType::Custom("X".to_string()));
        assert_eq!(line.get("field2").unwrap(), Some(&Value::from("bar baz")));
        assert_eq!(line.get("xx").unwrap(), Some(&Value::Int(1)));
    }

    #[test]
    fn test_virtual_marker() {
        let line: Line = format!("S\t1\t*\t{}", VIRTUAL_MARKER).parse().unwrap();
        assert!(line.is_virtual());
        assert!(line.tag_names().is_empty());
        assert_eq!(line.to_list().unwrap().last().map(String::as_str), Some(VIRTUAL_MARKER));
    }

    #[test]
    fn test_delayed_field_is_checked_on_access() {
        let line: Line = "L\t1\t+\t2\t-\t10Q".parse().unwrap();
        let err = line.get("overlap").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
