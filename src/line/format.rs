//! Text output of lines

use std::fmt;

use super::kind::RecordType;
use super::{Field, Line, VIRTUAL_MARKER};
use crate::error::{GfaError, Result};
use crate::field::{self, Datatype};
use crate::value::{Detached, IdLabels, NameResolver, Value};

impl Line {
    fn encode_field(
        &self,
        field: &Field,
        datatype: &Datatype,
        resolver: &dyn NameResolver,
    ) -> Result<Vec<String>> {
        let strict = self.vlevel.validates_on_output();
        if let Some(raw) = field.raw.as_deref() {
            if strict {
                field::validate_encoded(datatype, raw)?;
            }
            return Ok(vec![raw.to_string()]);
        }
        let value = field.value(datatype, strict)?;
        let value = value.resolved(resolver)?;
        match value.as_ref() {
            Value::FieldArray(array) => array
                .iter()
                .map(|v| encode_value(&array.datatype, v, strict))
                .collect(),
            other => Ok(vec![encode_value(datatype, other, strict)?]),
        }
    }

    /// GFA text of one field, prefixed by `NAME:TYPE:` if `as_tag`.
    ///
    /// Fails for fields holding line handles; render connected lines
    /// through their graph.
    pub fn field_to_s(&self, name: &str, as_tag: bool) -> Result<String> {
        self.field_to_s_in(name, &Detached, as_tag)
    }

    pub fn field_to_s_in(
        &self,
        name: &str,
        resolver: &dyn NameResolver,
        as_tag: bool,
    ) -> Result<String> {
        let (field, datatype) = match self.positional_index(name) {
            Some(i) => (&self.positional[i], self.positional_datatype(i)),
            None => {
                let tag = self.tags.iter().find(|t| t.name == name).ok_or_else(|| {
                    GfaError::NotFound(format!(
                        "{} line has no field or tag {}",
                        self.record_type, name
                    ))
                })?;
                (&tag.field, &tag.datatype)
            }
        };
        let parts = self
            .encode_field(field, datatype, resolver)
            .map_err(|e| e.context(format!("{} line, field {}", self.record_type, name)))?;
        if as_tag {
            let tags: Vec<String> = parts
                .iter()
                .map(|p| format!("{}:{}:{}", name, datatype, p))
                .collect();
            Ok(tags.join("\t"))
        } else {
            Ok(parts.join("\t"))
        }
    }

    /// Record type, positional fields and tags as strings.
    pub fn to_list(&self) -> Result<Vec<String>> {
        self.to_list_in(&Detached)
    }

    pub fn to_list_in(&self, resolver: &dyn NameResolver) -> Result<Vec<String>> {
        let mut list = Vec::with_capacity(1 + self.positional.len() + self.tags.len());
        list.push(self.record_type.code().to_string());
        for (i, field) in self.positional.iter().enumerate() {
            let datatype = self.positional_datatype(i);
            let parts = self.encode_field(field, datatype, resolver).map_err(|e| {
                e.context(format!("{} line, positional field {}", self.record_type, i + 1))
            })?;
            list.push(parts.join("\t"));
        }
        for tag in &self.tags {
            let parts = self
                .encode_field(&tag.field, &tag.datatype, resolver)
                .map_err(|e| e.context(format!("{} line, tag {}", self.record_type, tag.name)))?;
            list.extend(
                parts
                    .into_iter()
                    .map(|p| format!("{}:{}:{}", tag.name, tag.datatype, p)),
            );
        }
        if self.is_virtual {
            list.push(VIRTUAL_MARKER.to_string());
        }
        Ok(list)
    }

    /// The line as one string of GFA text.
    pub fn to_string_in(&self, resolver: &dyn NameResolver) -> Result<String> {
        let list = self.to_list_in(resolver)?;
        if self.record_type == RecordType::Comment {
            let content = list.get(1).map(String::as_str).unwrap_or("");
            let spacer = list.get(2).map(String::as_str).unwrap_or("");
            return Ok(format!("#{}{}", spacer, content));
        }
        Ok(list.join("\t"))
    }
}

fn encode_value(datatype: &Datatype, value: &Value, strict: bool) -> Result<String> {
    match value {
        Value::String(s) => {
            if strict {
                field::validate_encoded(datatype, s)?;
            }
            Ok(s.clone())
        }
        other if strict => field::encode(datatype, other),
        other => field::unsafe_encode(datatype, other),
    }
}

impl fmt::Display for Line {
    /// GFA text; line handles are written as `#index.generation`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.to_string_in(&IdLabels).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Cigar;
    use crate::version::ValidationLevel;

    #[test]
    fn test_field_to_s() {
        let mut line: Line = "L\t1\t+\t2\t-\t*\tMQ:i:30".parse().unwrap();
        assert_eq!(line.field_to_s("from", false).unwrap(), "1");
        assert_eq!(line.field_to_s("MQ", true).unwrap(), "MQ:i:30");
        line.set("overlap", "2M1D3M".parse::<Cigar>().unwrap()).unwrap();
        assert_eq!(line.field_to_s("overlap", false).unwrap(), "2M1D3M");
        assert_eq!(line.to_string(), "L\t1\t+\t2\t-\t2M1D3M\tMQ:i:30");
    }

    #[test]
    fn test_output_validation_level() {
        let mut line = Line::parse("S\t1\t*", None, ValidationLevel::Off).unwrap();
        line.set("LN", "abc").unwrap();
        assert!(line.to_list().is_ok());
        line.set_vlevel(ValidationLevel::OnOutput);
        assert!(line.to_list().is_err());
    }

    #[test]
    fn test_field_array_output() {
        let header: Line = "H\txx:i:1\txx:i:2".parse().unwrap();
        assert_eq!(header.to_string(), "H\txx:i:1\txx:i:2");
        assert_eq!(header.field_to_s("xx", true).unwrap(), "xx:i:1\txx:i:2");
    }

    #[test]
    fn test_comment_round_trip() {
        let line: Line = "#\tnote".parse().unwrap();
        assert_eq!(line.to_list().unwrap(), vec!["#", "note", "\t"]);
        assert_eq!(line.to_string(), "#\tnote");
    }
}
