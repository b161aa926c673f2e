//! Scalar value types and the [`Value`] union held by line fields

pub mod alignment;
pub mod byte_array;
pub mod field_array;
pub mod last_pos;
pub mod numeric_array;
pub mod oriented;
pub mod segment_end;

use std::borrow::Cow;
use std::fmt;

pub use alignment::{Alignment, Cigar, CigarCode, CigarOp, Trace};
pub use byte_array::ByteArray;
pub use field_array::FieldArray;
pub use last_pos::LastPos;
pub use numeric_array::{NumericArray, NumericSubtype, NumericValues};
pub use oriented::{LineRef, OrientedLine, Orientation};
pub use segment_end::{EndType, SegmentEnd};

use crate::error::{GfaError, Result};
use crate::field::Datatype;
use crate::gfa::LineId;

/// Decoded content of a field
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
    Json(serde_json::Value),
    ByteArray(ByteArray),
    NumericArray(NumericArray),
    Cigar(Cigar),
    Trace(Trace),
    /// `*`
    Placeholder,
    LastPos(LastPos),
    Orientation(Orientation),
    /// Reference to a line of the same graph
    Line(LineId),
    OrientedLine(OrientedLine),
    SegmentEnd(SegmentEnd),
    List(Vec<Value>),
    FieldArray(FieldArray),
}

impl Value {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Value::Placeholder)
    }

    /// Short name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Json(_) => "json",
            Value::ByteArray(_) => "byte array",
            Value::NumericArray(_) => "numeric array",
            Value::Cigar(_) => "CIGAR",
            Value::Trace(_) => "trace",
            Value::Placeholder => "placeholder",
            Value::LastPos(_) => "position",
            Value::Orientation(_) => "orientation",
            Value::Line(_) => "line",
            Value::OrientedLine(_) => "oriented line",
            Value::SegmentEnd(_) => "segment end",
            Value::List(_) => "list",
            Value::FieldArray(_) => "field array",
        }
    }

    /// Tag datatype used for a new custom tag holding this value.
    pub fn default_datatype(&self) -> Datatype {
        match self {
            Value::Int(_) => Datatype::I,
            Value::Float(_) => Datatype::F,
            Value::Char(_) => Datatype::A,
            Value::Json(_) => Datatype::J,
            Value::ByteArray(_) => Datatype::H,
            Value::NumericArray(_) => Datatype::B,
            Value::List(items) if is_numeric_list(items) => Datatype::B,
            Value::List(_) => Datatype::J,
            Value::FieldArray(array) => array.datatype.clone(),
            _ => Datatype::Z,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether the value, or any nested value, refers to a line handle.
    pub fn has_line_ids(&self) -> bool {
        match self {
            Value::Line(_) => true,
            Value::OrientedLine(ol) => ol.id().is_some(),
            Value::SegmentEnd(se) => se.segment.id().is_some(),
            Value::List(items) => items.iter().any(Value::has_line_ids),
            Value::FieldArray(array) => array.values.iter().any(Value::has_line_ids),
            _ => false,
        }
    }

    /// Every line handle referenced by the value.
    pub fn line_ids(&self) -> Vec<LineId> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, ids: &mut Vec<LineId>) {
        match self {
            Value::Line(id) => ids.push(*id),
            Value::OrientedLine(ol) => ids.extend(ol.id()),
            Value::SegmentEnd(se) => ids.extend(se.segment.id()),
            Value::List(items) => items.iter().for_each(|v| v.collect_ids(ids)),
            _ => {}
        }
    }

    /// Point every reference to `old` at `new`; returns whether anything changed.
    pub fn replace_id(&mut self, old: LineId, new: LineId) -> bool {
        match self {
            Value::Line(id) if *id == old => {
                *id = new;
                true
            }
            Value::OrientedLine(ol) => replace_ref(&mut ol.line, old, new),
            Value::SegmentEnd(se) => replace_ref(&mut se.segment, old, new),
            Value::List(items) => items
                .iter_mut()
                .fold(false, |changed, v| v.replace_id(old, new) || changed),
            _ => false,
        }
    }

    /// Drop list elements referring to `id`.
    pub fn remove_id(&mut self, id: LineId) {
        if let Value::List(items) = self {
            items.retain(|item| !item.line_ids().contains(&id));
        }
    }

    /// Copy of the value with line handles replaced by line names.
    pub fn resolved(&self, resolver: &dyn NameResolver) -> Result<Cow<'_, Value>> {
        if !self.has_line_ids() {
            return Ok(Cow::Borrowed(self));
        }
        Ok(Cow::Owned(self.to_named(resolver)?))
    }

    fn to_named(&self, resolver: &dyn NameResolver) -> Result<Value> {
        Ok(match self {
            Value::Line(id) => Value::String(resolve_name(resolver, *id)?),
            Value::OrientedLine(ol) => {
                Value::OrientedLine(OrientedLine::new(named_ref(&ol.line, resolver)?, ol.orient))
            }
            Value::SegmentEnd(se) => {
                Value::SegmentEnd(SegmentEnd::new(named_ref(&se.segment, resolver)?, se.end))
            }
            Value::List(items) => Value::List(
                items
                    .iter()
                    .map(|v| v.to_named(resolver))
                    .collect::<Result<_>>()?,
            ),
            other => other.clone(),
        })
    }
}

fn replace_ref(line_ref: &mut LineRef, old: LineId, new: LineId) -> bool {
    if line_ref.id() == Some(old) {
        *line_ref = LineRef::Line(new);
        true
    } else {
        false
    }
}

fn named_ref(line_ref: &LineRef, resolver: &dyn NameResolver) -> Result<LineRef> {
    match line_ref {
        LineRef::Name(name) => Ok(LineRef::Name(name.clone())),
        LineRef::Line(id) => Ok(LineRef::Name(resolve_name(resolver, *id)?)),
    }
}

fn resolve_name(resolver: &dyn NameResolver, id: LineId) -> Result<String> {
    resolver.line_name(id).ok_or_else(|| {
        GfaError::Runtime(format!(
            "line {} cannot be named: it is not connected to this graph or has no name",
            id
        ))
    })
}

fn is_numeric_list(items: &[Value]) -> bool {
    !items.is_empty()
        && (items.iter().all(|v| matches!(v, Value::Int(_)))
            || items.iter().all(|v| matches!(v, Value::Float(_))))
}

/// Numeric array built from a homogeneous list of ints or floats.
pub(crate) fn numeric_array_from_list(items: &[Value]) -> Option<NumericArray> {
    if !is_numeric_list(items) {
        return None;
    }
    if let Some(ints) = items.iter().map(Value::as_int).collect::<Option<Vec<i64>>>() {
        return Some(NumericArray::from_ints(ints));
    }
    items
        .iter()
        .map(|v| match v {
            Value::Float(f) => Some(*f),
            _ => None,
        })
        .collect::<Option<Vec<f64>>>()
        .map(NumericArray::from_floats)
}

/// Floats are written with a decimal point even when integral.
pub fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Maps line handles to the names used when writing references.
pub trait NameResolver {
    fn line_name(&self, id: LineId) -> Option<String>;
}

/// Resolver for lines outside any graph: handles cannot be named.
pub struct Detached;

impl NameResolver for Detached {
    fn line_name(&self, _id: LineId) -> Option<String> {
        None
    }
}

/// Resolver writing handles as `#index.generation`.
pub struct IdLabels;

impl NameResolver for IdLabels {
    fn line_name(&self, id: LineId) -> Option<String> {
        Some(id.to_string())
    }
}

impl fmt::Display for Value {
    /// Debug-oriented rendering; use a codec to obtain the GFA text.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Char(c) => write!(f, "{}", c),
            Value::String(s) => f.write_str(s),
            Value::Json(j) => write!(f, "{}", j),
            Value::ByteArray(b) => write!(f, "{}", b),
            Value::NumericArray(n) => write!(f, "{}", n),
            Value::Cigar(c) => write!(f, "{}", c),
            Value::Trace(t) => write!(f, "{}", t),
            Value::Placeholder => f.write_str("*"),
            Value::LastPos(p) => write!(f, "{}", p),
            Value::Orientation(o) => write!(f, "{}", o),
            Value::Line(id) => write!(f, "{}", id),
            Value::OrientedLine(ol) => write!(f, "{}", ol),
            Value::SegmentEnd(se) => write!(f, "{}", se),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::FieldArray(array) => {
                let parts: Vec<String> = array.values.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Orientation> for Value {
    fn from(v: Orientation) -> Self {
        Value::Orientation(v)
    }
}

impl From<Cigar> for Value {
    fn from(v: Cigar) -> Self {
        Value::Cigar(v)
    }
}

impl From<LastPos> for Value {
    fn from(v: LastPos) -> Self {
        Value::LastPos(v)
    }
}

impl From<OrientedLine> for Value {
    fn from(v: OrientedLine) -> Self {
        Value::OrientedLine(v)
    }
}

impl From<LineId> for Value {
    fn from(v: LineId) -> Self {
        Value::Line(v)
    }
}

impl From<Alignment> for Value {
    fn from(v: Alignment) -> Self {
        match v {
            Alignment::Placeholder => Value::Placeholder,
            Alignment::Cigar(c) => Value::Cigar(c),
            Alignment::Trace(t) => Value::Trace(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(-3.0), "-3.0");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(1e20), "100000000000000000000");
    }

    #[test]
    fn test_default_datatypes() {
        assert_eq!(Value::Int(1).default_datatype(), Datatype::I);
        assert_eq!(Value::Float(1.5).default_datatype(), Datatype::F);
        assert_eq!(Value::from("x").default_datatype(), Datatype::Z);
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Int(2)]).default_datatype(),
            Datatype::B
        );
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Float(2.0)]).default_datatype(),
            Datatype::J
        );
        assert_eq!(
            Value::Json(serde_json::json!({"a": 1})).default_datatype(),
            Datatype::J
        );
    }

    #[test]
    fn test_resolved_without_ids_borrows() {
        let value = Value::List(vec![Value::OrientedLine("a+".parse().unwrap())]);
        assert!(matches!(value.resolved(&Detached).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_numeric_list_to_array() {
        let array = numeric_array_from_list(&[Value::Int(1), Value::Int(300)]).unwrap();
        assert_eq!(array.to_gfa_string().unwrap(), "S,1,300");
        assert!(numeric_array_from_list(&[Value::Int(1), Value::from("x")]).is_none());
    }
}
