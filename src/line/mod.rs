//! Lines: one GFA record each
//!
//! A [`Line`] holds the positional fields and tags of a record together
//! with the static layout of its record kind. Field contents are kept as
//! read and decoded into [`Value`]s on first access.
//!
//! ```
//! use gfakit::line::Line;
//! use gfakit::value::Value;
//!
//! let mut line: Line = "S\ts1\tACGT\tRC:i:12".parse().unwrap();
//! assert_eq!(line.name(), Some("s1"));
//! assert_eq!(line.get("RC").unwrap(), Some(&Value::Int(12)));
//! line.set("xx", "hello").unwrap();
//! assert_eq!(line.to_string(), "S\ts1\tACGT\tRC:i:12\txx:Z:hello");
//! ```

mod access;
mod accessors;
pub mod alignment_type;
mod compare;
pub mod convert;
mod format;
pub mod kind;
mod parse;

use std::cell::OnceCell;
use std::sync::Arc;

pub use alignment_type::{AlignmentType, SubstringType};
pub use compare::{Diff, Edit, Side};
pub use kind::{Extension, FieldSpec, KindSpec, LineKind, RecordType, ReferenceSpec};
pub use parse::VIRTUAL_MARKER;

use crate::error::{GfaError, Result};
use crate::field::{self, Datatype};
use crate::gfa::LineId;
use crate::refs::Backrefs;
use crate::value::{OrientedLine, Value};
use crate::version::{ValidationLevel, Version};

/// Content of one field: the text as read, the decoded value, or both.
#[derive(Debug, Clone)]
pub(crate) struct Field {
    raw: Option<String>,
    decoded: OnceCell<Value>,
}

impl Field {
    pub(crate) fn raw(s: impl Into<String>) -> Self {
        Self {
            raw: Some(s.into()),
            decoded: OnceCell::new(),
        }
    }

    pub(crate) fn decoded(value: Value) -> Self {
        Self {
            raw: None,
            decoded: OnceCell::from(value),
        }
    }

    fn value(&self, datatype: &Datatype, validate: bool) -> Result<&Value> {
        if let Some(value) = self.decoded.get() {
            return Ok(value);
        }
        let raw = self
            .raw
            .as_deref()
            .ok_or_else(|| GfaError::Assertion("field has no content".to_string()))?;
        let value = if validate {
            field::decode(datatype, raw)?
        } else {
            field::unsafe_decode(datatype, raw)?
        };
        Ok(self.decoded.get_or_init(|| value))
    }

    fn value_mut(&mut self, datatype: &Datatype, validate: bool) -> Result<&mut Value> {
        self.value(datatype, validate)?;
        self.raw = None;
        self.decoded
            .get_mut()
            .ok_or_else(|| GfaError::Assertion("field was not decoded".to_string()))
    }
}

/// An optional field: `NAME:TYPE:VALUE`
#[derive(Debug, Clone)]
pub(crate) struct Tag {
    name: String,
    datatype: Datatype,
    field: Field,
}

/// One GFA record.
///
/// Lines are created detached (parsed or built) and become connected when
/// added to a [`crate::Gfa`]; connected lines hold [`Value::Line`]
/// handles in their reference fields. Lines are not `Clone`: use
/// [`Line::try_clone`] for detached lines or [`crate::Gfa::clone_line`].
#[derive(Debug)]
pub struct Line {
    spec: Arc<KindSpec>,
    record_type: RecordType,
    vlevel: ValidationLevel,
    positional: Vec<Field>,
    tags: Vec<Tag>,
    is_virtual: bool,
    handle: Option<LineId>,
    pub(crate) backrefs: Backrefs,
    /// Lines this line registered on, with the key used
    pub(crate) outgoing: Vec<(LineId, String)>,
    /// Links traversed by a GFA1 path, oriented in path direction
    pub(crate) path_links: Vec<OrientedLine>,
}

static GENERIC: Datatype = Datatype::Generic;

impl Line {
    fn build(
        spec: Arc<KindSpec>,
        record_type: RecordType,
        vlevel: ValidationLevel,
        positional: Vec<Field>,
        tags: Vec<Tag>,
        is_virtual: bool,
    ) -> Self {
        Self {
            spec,
            record_type,
            vlevel,
            positional,
            tags,
            is_virtual,
            handle: None,
            backrefs: Backrefs::default(),
            outgoing: Vec::new(),
            path_links: Vec::new(),
        }
    }

    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    pub fn kind(&self) -> LineKind {
        self.spec.kind
    }

    pub fn spec(&self) -> &KindSpec {
        &self.spec
    }

    /// GFA version of the record kind; `None` for headers and comments.
    pub fn version(&self) -> Option<Version> {
        self.spec.version
    }

    pub fn vlevel(&self) -> ValidationLevel {
        self.vlevel
    }

    pub fn set_vlevel(&mut self, vlevel: ValidationLevel) {
        self.vlevel = vlevel;
    }

    /// Whether the line is a stand-in for a referenced, undeclared line.
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    pub(crate) fn set_virtual(&mut self, is_virtual: bool) {
        self.is_virtual = is_virtual;
    }

    /// Handle of the line in its graph, if connected.
    pub fn handle(&self) -> Option<LineId> {
        self.handle
    }

    pub(crate) fn set_handle(&mut self, handle: Option<LineId>) {
        self.handle = handle;
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    /// Backreferences registered on this line, by relation key.
    pub fn backref_table(&self) -> &Backrefs {
        &self.backrefs
    }

    /// Value of the name field; `None` for unnamed kinds and `*` names.
    pub fn name(&self) -> Option<&str> {
        let index = self.spec.field_index(self.spec.name_field.as_deref()?)?;
        let datatype = &self.spec.fields[index].datatype;
        match self.positional.get(index)?.value(datatype, false) {
            Ok(Value::String(name)) => Some(name),
            _ => None,
        }
    }

    /// Independent detached copy; references are kept by name.
    ///
    /// Fails with a runtime error for connected lines, whose references
    /// can only be named by their graph.
    pub fn try_clone(&self) -> Result<Line> {
        if self.is_connected() {
            return Err(GfaError::Runtime(format!(
                "{} line is connected; clone it through its graph",
                self.record_type
            )));
        }
        let mut copy = Line::build(
            Arc::clone(&self.spec),
            self.record_type.clone(),
            self.vlevel,
            self.positional.clone(),
            self.tags.clone(),
            self.is_virtual,
        );
        for field in copy.positional.iter_mut().chain(copy.tags.iter_mut().map(|t| &mut t.field)) {
            if field.decoded.get().is_some_and(Value::has_line_ids) {
                return Err(GfaError::Assertion(
                    "detached line holds line handles".to_string(),
                ));
            }
        }
        copy.vlevel = self.vlevel;
        Ok(copy)
    }
}

/// Validate a decoded value, including each element of a field array.
pub(crate) fn validate_value(datatype: &Datatype, value: &Value) -> Result<()> {
    match value {
        Value::FieldArray(array) => array
            .values
            .iter()
            .try_for_each(|v| field::validate_decoded(&array.datatype, v)),
        other => field::validate_decoded(datatype, other),
    }
}
