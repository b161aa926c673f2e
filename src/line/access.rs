//! Field access and mutation

use super::{validate_value, Field, Line, Tag, GENERIC};
use crate::error::{GfaError, Result};
use crate::field::{self, validate_custom_tag_name, Datatype};
use crate::gfa::LineId;
use crate::value::{LineRef, NameResolver, Value};

#[derive(Debug, Clone, Copy)]
enum Slot {
    Positional(usize),
    Tag(usize),
}

impl Line {
    fn slot(&self, name: &str) -> Option<Slot> {
        if let Some(i) = self.positional_index(name) {
            return Some(Slot::Positional(i));
        }
        self.tags.iter().position(|t| t.name == name).map(Slot::Tag)
    }

    fn parts(&self, slot: Slot) -> (&Field, &Datatype) {
        match slot {
            Slot::Positional(i) => (&self.positional[i], self.positional_datatype(i)),
            Slot::Tag(i) => (&self.tags[i].field, &self.tags[i].datatype),
        }
    }

    /// Index of a positional field, resolving aliases.
    pub fn positional_index(&self, name: &str) -> Option<usize> {
        if self.spec.is_variadic() {
            let n: usize = name.strip_prefix("field")?.parse().ok()?;
            return (1..=self.positional.len()).contains(&n).then(|| n - 1);
        }
        self.spec.field_index(name)
    }

    pub(crate) fn positional_datatype(&self, index: usize) -> &Datatype {
        self.spec
            .fields
            .get(index)
            .map(|f| &f.datatype)
            .unwrap_or(&GENERIC)
    }

    pub fn positional_names(&self) -> Vec<String> {
        if self.spec.is_variadic() {
            return (1..=self.positional.len())
                .map(|i| format!("field{}", i))
                .collect();
        }
        self.spec.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    /// Positional field names followed by tag names.
    pub fn field_names(&self) -> Vec<String> {
        let mut names = self.positional_names();
        names.extend(self.tags.iter().map(|t| t.name.clone()));
        names
    }

    pub fn field_datatype(&self, name: &str) -> Option<&Datatype> {
        self.slot(name).map(|slot| self.parts(slot).1)
    }

    /// Decoded value of a field; `None` if the line has no such field.
    pub fn get(&self, name: &str) -> Result<Option<&Value>> {
        let Some(slot) = self.slot(name) else {
            return Ok(None);
        };
        let (field, datatype) = self.parts(slot);
        let value = field
            .value(datatype, self.vlevel.validates_on_access())
            .map_err(|e| e.context(format!("{} line, field {}", self.record_type, name)))?;
        if self.vlevel.validates_always() {
            validate_value(datatype, value)?;
        }
        Ok(Some(value))
    }

    /// As [`Line::get`], failing with a not-found error if the field is absent.
    pub fn try_get(&self, name: &str) -> Result<&Value> {
        self.get(name)?.ok_or_else(|| {
            GfaError::NotFound(format!(
                "{} line has no field or tag {}",
                self.record_type, name
            ))
        })
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Result<Option<&mut Value>> {
        let validate = self.vlevel.validates_on_access();
        match self.slot(name) {
            None => Ok(None),
            Some(Slot::Positional(i)) => {
                let datatype = self.spec.fields.get(i).map(|f| &f.datatype).unwrap_or(&GENERIC);
                self.positional[i].value_mut(datatype, validate).map(Some)
            }
            Some(Slot::Tag(i)) => {
                let tag = &mut self.tags[i];
                tag.field.value_mut(&tag.datatype, validate).map(Some)
            }
        }
    }

    /// Set a positional field or tag.
    ///
    /// Strings are taken as the GFA text of the field; other values as
    /// decoded content. A new tag takes the predefined datatype of its name,
    /// or a datatype inferred from the value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        match self.slot(name) {
            Some(Slot::Positional(i)) => {
                if self.is_connected() && self.spec.is_linked(name) {
                    return Err(GfaError::Runtime(format!(
                        "field {} of a connected {} line cannot be changed{}",
                        name,
                        self.record_type,
                        if self.spec.name_field.as_deref() == Some(self.spec.canonical(name)) {
                            "; rename the line through its graph"
                        } else {
                            "; disconnect the line first"
                        }
                    )));
                }
                self.put_positional(i, value)
            }
            Some(Slot::Tag(i)) => {
                let datatype = self.tags[i].datatype.clone();
                self.put_tag(name, datatype, value)
            }
            None => {
                let datatype = match self.spec.predefined_tag(name) {
                    Some(datatype) => datatype.clone(),
                    None => value.default_datatype(),
                };
                self.put_tag(name, datatype, value)
            }
        }
    }

    /// Set a tag with an explicit datatype.
    pub fn set_with_datatype(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        datatype: Datatype,
    ) -> Result<()> {
        if self.positional_index(name).is_some() {
            return Err(GfaError::Argument(format!(
                "the datatype of positional field {} cannot be changed",
                name
            )));
        }
        self.put_tag(name, datatype, value.into())
    }

    /// Change the datatype of an existing tag, keeping its content.
    pub fn set_datatype(&mut self, name: &str, datatype: Datatype) -> Result<()> {
        if self.positional_index(name).is_some() {
            return Err(GfaError::Argument(format!(
                "the datatype of positional field {} cannot be changed",
                name
            )));
        }
        let text = self.field_to_s(name, false)?;
        self.put_tag(name, datatype, Value::String(text))
    }

    /// Remove a tag, returning its value.
    pub fn delete(&mut self, name: &str) -> Result<Option<Value>> {
        match self.slot(name) {
            None => Ok(None),
            Some(Slot::Positional(_)) => Err(GfaError::Argument(format!(
                "positional field {} cannot be deleted",
                name
            ))),
            Some(Slot::Tag(i)) => {
                let value = self.get(name)?.cloned();
                self.tags.remove(i);
                Ok(value)
            }
        }
    }

    /// Set a positional field without the linked-field check.
    pub(crate) fn set_internal(&mut self, name: &str, value: Value) -> Result<()> {
        let index = self.positional_index(name).ok_or_else(|| {
            GfaError::NotFound(format!("{} line has no field {}", self.record_type, name))
        })?;
        self.put_positional(index, value)
    }

    fn put_positional(&mut self, index: usize, value: Value) -> Result<()> {
        let datatype = self.positional_datatype(index).clone();
        let field = self.checked_field(&datatype, value)?;
        self.positional[index] = field;
        Ok(())
    }

    fn put_tag(&mut self, name: &str, datatype: Datatype, value: Value) -> Result<()> {
        if self.is_virtual {
            return Err(GfaError::Runtime(format!(
                "tag {} cannot be set on a virtual {} line",
                name, self.record_type
            )));
        }
        if !datatype.is_tag_datatype() {
            return Err(GfaError::Type(format!(
                "{} is not a tag datatype (tag {})",
                datatype, name
            )));
        }
        if let Some(predefined) = self.spec.predefined_tag(name) {
            if *predefined != datatype && self.vlevel.validates_on_access() {
                return Err(GfaError::Type(format!(
                    "tag {} of {} lines must have datatype {}, not {}",
                    name, self.record_type, predefined, datatype
                )));
            }
        } else {
            validate_custom_tag_name(name)?;
        }
        let field = self
            .checked_field(&datatype, value)
            .map_err(|e| e.context(format!("tag {}", name)))?;
        match self.tags.iter_mut().find(|t| t.name == name) {
            Some(tag) => {
                tag.datatype = datatype;
                tag.field = field;
            }
            None => self.tags.push(Tag {
                name: name.to_string(),
                datatype,
                field,
            }),
        }
        Ok(())
    }

    fn checked_field(&self, datatype: &Datatype, value: Value) -> Result<Field> {
        let check = self.vlevel.validates_on_access();
        match value {
            Value::String(s) => {
                if check {
                    field::validate_encoded(datatype, &s)?;
                }
                Ok(Field::raw(s))
            }
            other => {
                if check {
                    validate_value(datatype, &other)?;
                }
                Ok(Field::decoded(other))
            }
        }
    }

    /// Name, datatype and decoded value of every tag, in line order.
    pub(crate) fn tag_entries(&self) -> Result<Vec<(String, Datatype, Value)>> {
        self.tags
            .iter()
            .map(|t| Ok((t.name.clone(), t.datatype.clone(), self.try_get(&t.name)?.clone())))
            .collect()
    }

    fn decoded_fields_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        self.positional
            .iter_mut()
            .chain(self.tags.iter_mut().map(|t| &mut t.field))
            .filter_map(|field| field.decoded.get_mut())
    }

    /// Point every handle to `old` at `new`. With `reversed`, path steps
    /// through `old` flip orientation.
    pub(crate) fn replace_line_id(&mut self, old: LineId, new: LineId, reversed: bool) {
        for value in self.decoded_fields_mut() {
            value.replace_id(old, new);
        }
        for (target, _) in self.outgoing.iter_mut() {
            if *target == old {
                *target = new;
            }
        }
        for step in self.path_links.iter_mut() {
            if step.id() == Some(old) {
                step.line = LineRef::Line(new);
                if reversed {
                    step.orient = step.orient.invert();
                }
            }
        }
    }

    /// Drop `id` from every list field.
    pub(crate) fn remove_list_item(&mut self, id: LineId) {
        for value in self.decoded_fields_mut() {
            value.remove_id(id);
        }
        self.outgoing.retain(|(target, _)| *target != id);
    }

    /// Replace every line handle by the name of its line.
    pub(crate) fn downgrade_references(&mut self, resolver: &dyn NameResolver) -> Result<()> {
        for value in self.decoded_fields_mut() {
            if value.has_line_ids() {
                let named = value.resolved(resolver)?.into_owned();
                *value = named;
            }
        }
        self.outgoing.clear();
        self.path_links.clear();
        Ok(())
    }

    /// Run the codec validator of one field.
    pub fn validate_field(&self, name: &str) -> Result<()> {
        let slot = self.slot(name).ok_or_else(|| {
            GfaError::NotFound(format!(
                "{} line has no field or tag {}",
                self.record_type, name
            ))
        })?;
        let (field, datatype) = self.parts(slot);
        let value = field
            .value(datatype, true)
            .map_err(|e| e.context(format!("{} line, field {}", self.record_type, name)))?;
        validate_value(datatype, value)
            .map_err(|e| e.context(format!("{} line, field {}", self.record_type, name)))
    }

    /// Validate every field and the line's internal consistency.
    pub fn validate(&self) -> Result<()> {
        for name in self.field_names() {
            self.validate_field(&name)?;
        }
        self.check_consistency()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::version::{ValidationLevel, Version};

    #[test]
    fn test_get_resolves_aliases() {
        let line: Line = "E\te1\t1+\t2-\t0\t10\t90\t100$\t10M".parse().unwrap();
        assert_eq!(line.get("name").unwrap(), line.get("eid").unwrap());
        assert!(line.get("zz").unwrap().is_none());
        assert_eq!(line.try_get("zz").unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_new_tag_datatype_inference() {
        let mut line: Line = "S\t1\t*".parse().unwrap();
        line.set("aa", 12i64).unwrap();
        line.set("bb", 1.5).unwrap();
        line.set("cc", Value::List(vec![Value::Int(1), Value::Int(2)])).unwrap();
        line.set("dd", "text").unwrap();
        assert_eq!(line.field_datatype("aa"), Some(&Datatype::I));
        assert_eq!(line.field_datatype("bb"), Some(&Datatype::F));
        assert_eq!(line.field_datatype("cc"), Some(&Datatype::B));
        assert_eq!(line.field_datatype("dd"), Some(&Datatype::Z));
        assert_eq!(line.to_string(), "S\t1\t*\taa:i:12\tbb:f:1.5\tcc:B:C,1,2\tdd:Z:text");
    }

    #[test]
    fn test_invalid_tag_name() {
        let mut line: Line = "S\t1\t*".parse().unwrap();
        assert_eq!(line.set("abc", 1i64).unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn test_set_validates() {
        let mut line: Line = "S\t1\t*".parse().unwrap();
        assert_eq!(line.set("LN", "x").unwrap_err().kind(), ErrorKind::Format);
        assert_eq!(line.set("LN", 1.5).unwrap_err().kind(), ErrorKind::Type);
        line.set("sequence", "ACGT").unwrap();
        line.set("LN", 4i64).unwrap();
        assert_eq!(line.get("sequence").unwrap(), Some(&Value::from("ACGT")));
    }

    #[test]
    fn test_virtual_line_accepts_no_tags() {
        let mut line = Line::placeholder(super::super::LineKind::SegmentGfa1, "x", ValidationLevel::OnAccess)
            .unwrap();
        assert_eq!(line.set("xx", 1i64).unwrap_err().kind(), ErrorKind::Runtime);
    }

    #[test]
    fn test_delete_and_set_datatype() {
        let mut line: Line = "S\t1\t*\txx:i:12".parse().unwrap();
        line.set_datatype("xx", Datatype::Z).unwrap();
        assert_eq!(line.get("xx").unwrap(), Some(&Value::from("12")));
        assert_eq!(line.delete("xx").unwrap(), Some(Value::from("12")));
        assert!(line.get("xx").unwrap().is_none());
        assert_eq!(line.delete("name").unwrap_err().kind(), ErrorKind::Argument);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let line = Line::parse("S\t1\t*\tLN:i:x", Some(Version::Gfa1), ValidationLevel::Off).unwrap();
        let first = line.validate().map_err(|e| e.kind());
        let second = line.validate().map_err(|e| e.kind());
        assert_eq!(first, second);
        assert_eq!(first, Err(ErrorKind::Format));
    }

    #[test]
    fn test_level_zero_defers_failures() {
        let line = Line::parse("S\t1\t*\tLN:i:x", None, ValidationLevel::Off).unwrap();
        assert!(line.get("LN").is_err());
    }

    #[test]
    fn test_always_level_revalidates() {
        let mut line = Line::parse("S\t1\t*", None, ValidationLevel::Always).unwrap();
        line.set("xx", -1i64).unwrap();
        *line.get_mut("xx").unwrap().unwrap() = Value::Float(1.5);
        assert_eq!(line.get("xx").unwrap_err().kind(), ErrorKind::Type);
    }
}
