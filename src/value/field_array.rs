//! Multi-valued tags

use crate::field::Datatype;
use crate::value::Value;

/// Values of a tag defined more than once (e.g. in several header lines).
///
/// All elements share the datatype of the tag.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldArray {
    pub datatype: Datatype,
    pub values: Vec<Value>,
}

impl FieldArray {
    pub fn new(datatype: Datatype, values: Vec<Value>) -> Self {
        Self { datatype, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Add a value, flattening nested arrays.
    pub fn absorb(&mut self, value: Value) {
        match value {
            Value::FieldArray(other) => self.values.extend(other.values),
            other => self.values.push(other),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_flattens() {
        let mut array = FieldArray::new(Datatype::I, vec![Value::Int(1)]);
        array.absorb(Value::FieldArray(FieldArray::new(
            Datatype::I,
            vec![Value::Int(2), Value::Int(3)],
        )));
        array.absorb(Value::Int(4));
        assert_eq!(array.len(), 4);
        assert_eq!(array.values[3], Value::Int(4));
    }
}
