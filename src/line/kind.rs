//! Record kinds and their static field layouts

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use crate::error::{GfaError, Result};
use crate::field::{self, Datatype};
use crate::refs::keys;
use crate::version::Version;

/// Record type code of a line (its first field)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RecordType {
    Header,
    Comment,
    Segment,
    Link,
    Containment,
    Path,
    Edge,
    Fragment,
    Gap,
    OrderedGroup,
    UnorderedGroup,
    Custom(String),
    /// Placeholder for a referenced line of unknown type
    Unknown,
}

impl RecordType {
    pub fn code(&self) -> &str {
        match self {
            RecordType::Header => "H",
            RecordType::Comment => "#",
            RecordType::Segment => "S",
            RecordType::Link => "L",
            RecordType::Containment => "C",
            RecordType::Path => "P",
            RecordType::Edge => "E",
            RecordType::Fragment => "F",
            RecordType::Gap => "G",
            RecordType::OrderedGroup => "O",
            RecordType::UnorderedGroup => "U",
            RecordType::Custom(code) => code,
            RecordType::Unknown => "?",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code {
            "H" => RecordType::Header,
            "#" => RecordType::Comment,
            "S" => RecordType::Segment,
            "L" => RecordType::Link,
            "C" => RecordType::Containment,
            "P" => RecordType::Path,
            "E" => RecordType::Edge,
            "F" => RecordType::Fragment,
            "G" => RecordType::Gap,
            "O" => RecordType::OrderedGroup,
            "U" => RecordType::UnorderedGroup,
            "?" => RecordType::Unknown,
            other => RecordType::Custom(other.to_string()),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, RecordType::Custom(_))
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Concrete kind of a line; segments differ between the versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Header,
    Comment,
    SegmentGfa1,
    SegmentGfa2,
    Link,
    Containment,
    Path,
    Edge,
    Fragment,
    Gap,
    OrderedGroup,
    UnorderedGroup,
    Custom,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub datatype: Datatype,
}

impl FieldSpec {
    fn new(name: &str, datatype: Datatype) -> Self {
        Self {
            name: name.to_string(),
            datatype,
        }
    }
}

/// A reference field of an extension record kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSpec {
    pub field: String,
    pub backref_key: String,
}

/// Static description of a record kind
#[derive(Debug, Clone)]
pub struct KindSpec {
    pub kind: LineKind,
    /// `None` for custom records without a registered layout
    pub record_type: Option<RecordType>,
    pub version: Option<Version>,
    pub fields: Vec<FieldSpec>,
    pub predefined_tags: Vec<FieldSpec>,
    /// alias -> field name
    pub aliases: Vec<(String, String)>,
    pub name_field: Option<String>,
    /// Reference fields of extension kinds
    pub references: Vec<ReferenceSpec>,
    /// Keys this kind accepts backreferences under
    pub backref_keys: Vec<String>,
    /// Keys whose referencing lines are disconnected with this line
    pub dependent_keys: Vec<String>,
    /// Fields that cannot be changed while the line is connected
    pub linked_fields: Vec<String>,
}

impl KindSpec {
    fn new(kind: LineKind, record_type: RecordType, version: Option<Version>) -> Self {
        Self {
            kind,
            record_type: Some(record_type),
            version,
            fields: Vec::new(),
            predefined_tags: Vec::new(),
            aliases: Vec::new(),
            name_field: None,
            references: Vec::new(),
            backref_keys: Vec::new(),
            dependent_keys: Vec::new(),
            linked_fields: Vec::new(),
        }
    }

    fn field(mut self, name: &str, datatype: Datatype) -> Self {
        self.fields.push(FieldSpec::new(name, datatype));
        self
    }

    fn tag(mut self, name: &str, datatype: Datatype) -> Self {
        self.predefined_tags.push(FieldSpec::new(name, datatype));
        self
    }

    fn alias(mut self, alias: &str, field: &str) -> Self {
        self.aliases.push((alias.to_string(), field.to_string()));
        self
    }

    fn named_by(mut self, field: &str) -> Self {
        self.name_field = Some(field.to_string());
        self
    }

    fn backrefs(mut self, keys: &[&str], dependent: &[&str]) -> Self {
        self.backref_keys = keys.iter().map(|k| k.to_string()).collect();
        self.dependent_keys = dependent.iter().map(|k| k.to_string()).collect();
        self
    }

    fn linked(mut self, fields: &[&str]) -> Self {
        self.linked_fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Field name after alias resolution.
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases
            .iter()
            .find(|(alias, _)| alias == name)
            .map(|(_, field)| field.as_str())
            .unwrap_or(name)
    }

    /// Index of a positional field, resolving aliases.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        let name = self.canonical(name);
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn predefined_tag(&self, name: &str) -> Option<&Datatype> {
        self.predefined_tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| &t.datatype)
    }

    pub fn is_linked(&self, name: &str) -> bool {
        let name = self.canonical(name);
        self.linked_fields.iter().any(|f| f == name)
    }

    /// Keys not declared by the kind come from extension references and
    /// are dependent.
    pub fn is_dependent_key(&self, key: &str) -> bool {
        self.dependent_keys.iter().any(|k| k == key) || !self.backref_keys.iter().any(|k| k == key)
    }

    /// Layouts without declared fields take any number of generic fields.
    pub fn is_variadic(&self) -> bool {
        self.kind == LineKind::Custom && self.record_type.is_none()
    }
}

const GFA1_SEGMENT_KEYS: &[&str] = &[
    keys::DOVETAILS_L,
    keys::DOVETAILS_R,
    keys::EDGES_TO_CONTAINED,
    keys::EDGES_TO_CONTAINERS,
    keys::PATHS,
];

const GFA2_SEGMENT_DEPENDENT: &[&str] = &[
    keys::DOVETAILS_L,
    keys::DOVETAILS_R,
    keys::EDGES_TO_CONTAINED,
    keys::EDGES_TO_CONTAINERS,
    keys::INTERNALS,
    keys::GAPS_L,
    keys::GAPS_R,
    keys::FRAGMENTS,
];

const GFA2_SEGMENT_KEYS: &[&str] = &[
    keys::DOVETAILS_L,
    keys::DOVETAILS_R,
    keys::EDGES_TO_CONTAINED,
    keys::EDGES_TO_CONTAINERS,
    keys::INTERNALS,
    keys::GAPS_L,
    keys::GAPS_R,
    keys::FRAGMENTS,
    keys::PATHS,
    keys::SETS,
];

const GROUP_MEMBER_KEYS: &[&str] = &[keys::PATHS, keys::SETS];

fn build(kind: LineKind) -> KindSpec {
    use Datatype as D;
    match kind {
        LineKind::Header => KindSpec::new(kind, RecordType::Header, None)
            .tag("VN", D::Z)
            .tag("TS", D::I),
        LineKind::Comment => KindSpec::new(kind, RecordType::Comment, None)
            .field("content", D::Comment)
            .field("spacer", D::Comment),
        LineKind::SegmentGfa1 => KindSpec::new(kind, RecordType::Segment, Some(Version::Gfa1))
            .field("name", D::SegmentNameGfa1)
            .field("sequence", D::SequenceGfa1)
            .tag("LN", D::I)
            .tag("RC", D::I)
            .tag("FC", D::I)
            .tag("KC", D::I)
            .tag("SH", D::H)
            .tag("UR", D::Z)
            .named_by("name")
            .backrefs(GFA1_SEGMENT_KEYS, GFA1_SEGMENT_KEYS)
            .linked(&["name"]),
        LineKind::SegmentGfa2 => KindSpec::new(kind, RecordType::Segment, Some(Version::Gfa2))
            .field("sid", D::IdentifierGfa2)
            .field("slen", D::I)
            .field("sequence", D::SequenceGfa2)
            .alias("name", "sid")
            .named_by("sid")
            .backrefs(GFA2_SEGMENT_KEYS, GFA2_SEGMENT_DEPENDENT)
            .linked(&["sid"]),
        LineKind::Link => KindSpec::new(kind, RecordType::Link, Some(Version::Gfa1))
            .field("from_segment", D::SegmentNameGfa1)
            .field("from_orient", D::Orientation)
            .field("to_segment", D::SegmentNameGfa1)
            .field("to_orient", D::Orientation)
            .field("overlap", D::AlignmentGfa1)
            .alias("from", "from_segment")
            .alias("to", "to_segment")
            .tag("MQ", D::I)
            .tag("NM", D::I)
            .tag("RC", D::I)
            .tag("FC", D::I)
            .tag("KC", D::I)
            .tag("ID", D::Z)
            .backrefs(&[keys::PATHS], &[keys::PATHS])
            .linked(&["from_segment", "from_orient", "to_segment", "to_orient"]),
        LineKind::Containment => KindSpec::new(kind, RecordType::Containment, Some(Version::Gfa1))
            .field("from_segment", D::SegmentNameGfa1)
            .field("from_orient", D::Orientation)
            .field("to_segment", D::SegmentNameGfa1)
            .field("to_orient", D::Orientation)
            .field("pos", D::PositionGfa1)
            .field("overlap", D::AlignmentGfa1)
            .alias("container", "from_segment")
            .alias("contained", "to_segment")
            .alias("container_orient", "from_orient")
            .alias("contained_orient", "to_orient")
            .tag("MQ", D::I)
            .tag("NM", D::I)
            .tag("ID", D::Z)
            .linked(&["from_segment", "from_orient", "to_segment", "to_orient"]),
        LineKind::Path => KindSpec::new(kind, RecordType::Path, Some(Version::Gfa1))
            .field("path_name", D::PathNameGfa1)
            .field("segment_names", D::OrientedIdentifierListGfa1)
            .field("overlaps", D::AlignmentListGfa1)
            .alias("name", "path_name")
            .named_by("path_name")
            .linked(&["path_name", "segment_names", "overlaps"]),
        LineKind::Edge => KindSpec::new(kind, RecordType::Edge, Some(Version::Gfa2))
            .field("eid", D::OptionalIdentifierGfa2)
            .field("sid1", D::OrientedIdentifierGfa2)
            .field("sid2", D::OrientedIdentifierGfa2)
            .field("beg1", D::PositionGfa2)
            .field("end1", D::PositionGfa2)
            .field("beg2", D::PositionGfa2)
            .field("end2", D::PositionGfa2)
            .field("alignment", D::AlignmentGfa2)
            .alias("name", "eid")
            .named_by("eid")
            .backrefs(GROUP_MEMBER_KEYS, &[])
            .linked(&["eid", "sid1", "sid2", "beg1", "end1", "beg2", "end2"]),
        LineKind::Fragment => KindSpec::new(kind, RecordType::Fragment, Some(Version::Gfa2))
            .field("sid", D::IdentifierGfa2)
            .field("external", D::OrientedIdentifierGfa2)
            .field("s_beg", D::PositionGfa2)
            .field("s_end", D::PositionGfa2)
            .field("f_beg", D::PositionGfa2)
            .field("f_end", D::PositionGfa2)
            .field("alignment", D::AlignmentGfa2)
            .linked(&["sid"]),
        LineKind::Gap => KindSpec::new(kind, RecordType::Gap, Some(Version::Gfa2))
            .field("gid", D::OptionalIdentifierGfa2)
            .field("sid1", D::OrientedIdentifierGfa2)
            .field("sid2", D::OrientedIdentifierGfa2)
            .field("disp", D::I)
            .field("var", D::OptionalInteger)
            .alias("name", "gid")
            .named_by("gid")
            .backrefs(GROUP_MEMBER_KEYS, &[])
            .linked(&["gid", "sid1", "sid2"]),
        LineKind::OrderedGroup => KindSpec::new(kind, RecordType::OrderedGroup, Some(Version::Gfa2))
            .field("pid", D::OptionalIdentifierGfa2)
            .field("items", D::OrientedIdentifierListGfa2)
            .alias("name", "pid")
            .named_by("pid")
            .backrefs(GROUP_MEMBER_KEYS, &[])
            .linked(&["pid", "items"]),
        LineKind::UnorderedGroup => {
            KindSpec::new(kind, RecordType::UnorderedGroup, Some(Version::Gfa2))
                .field("pid", D::OptionalIdentifierGfa2)
                .field("items", D::IdentifierListGfa2)
                .alias("name", "pid")
                .named_by("pid")
                .backrefs(GROUP_MEMBER_KEYS, &[])
                .linked(&["pid", "items"])
        }
        LineKind::Custom => KindSpec {
            record_type: None,
            ..KindSpec::new(kind, RecordType::Unknown, Some(Version::Gfa2))
        },
        LineKind::Unknown => KindSpec::new(kind, RecordType::Unknown, Some(Version::Gfa2))
            .field("name", D::IdentifierGfa2)
            .named_by("name")
            .backrefs(GROUP_MEMBER_KEYS, &[]),
    }
}

const ALL_KINDS: &[LineKind] = &[
    LineKind::Header,
    LineKind::Comment,
    LineKind::SegmentGfa1,
    LineKind::SegmentGfa2,
    LineKind::Link,
    LineKind::Containment,
    LineKind::Path,
    LineKind::Edge,
    LineKind::Fragment,
    LineKind::Gap,
    LineKind::OrderedGroup,
    LineKind::UnorderedGroup,
    LineKind::Custom,
    LineKind::Unknown,
];

/// Shared layout of a builtin kind.
pub fn spec(kind: LineKind) -> Arc<KindSpec> {
    static SPECS: OnceLock<HashMap<LineKind, Arc<KindSpec>>> = OnceLock::new();
    let specs = SPECS.get_or_init(|| {
        ALL_KINDS
            .iter()
            .map(|kind| (*kind, Arc::new(build(*kind))))
            .collect()
    });
    match specs.get(&kind) {
        Some(spec) => Arc::clone(spec),
        None => Arc::new(build(kind)),
    }
}

fn extensions() -> &'static RwLock<HashMap<String, Arc<KindSpec>>> {
    static EXTENSIONS: OnceLock<RwLock<HashMap<String, Arc<KindSpec>>>> = OnceLock::new();
    EXTENSIONS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Layout registered for a custom record type.
pub fn extension(record_type: &str) -> Option<Arc<KindSpec>> {
    extensions()
        .read()
        .ok()
        .and_then(|table| table.get(record_type).cloned())
}

/// Layout of a GFA2 custom record type, registered with [`Extension::register`].
///
/// ```
/// use gfakit::field::Datatype;
/// use gfakit::line::Extension;
///
/// Extension::new("X")
///     .field("xid", Datatype::IdentifierGfa2)
///     .field("segment", Datatype::IdentifierGfa2)
///     .field("note", Datatype::Z)
///     .name_field("xid")
///     .reference("segment", "annotations")
///     .register()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Extension {
    record_type: String,
    fields: Vec<FieldSpec>,
    tags: Vec<FieldSpec>,
    references: Vec<ReferenceSpec>,
    name_field: Option<String>,
}

impl Extension {
    pub fn new(record_type: &str) -> Self {
        Self {
            record_type: record_type.to_string(),
            fields: Vec::new(),
            tags: Vec::new(),
            references: Vec::new(),
            name_field: None,
        }
    }

    pub fn field(mut self, name: &str, datatype: Datatype) -> Self {
        self.fields.push(FieldSpec::new(name, datatype));
        self
    }

    pub fn tag(mut self, name: &str, datatype: Datatype) -> Self {
        self.tags.push(FieldSpec::new(name, datatype));
        self
    }

    /// The named line of `field` registers this line under `backref_key`.
    pub fn reference(mut self, field: &str, backref_key: &str) -> Self {
        self.references.push(ReferenceSpec {
            field: field.to_string(),
            backref_key: backref_key.to_string(),
        });
        self
    }

    pub fn name_field(mut self, field: &str) -> Self {
        self.name_field = Some(field.to_string());
        self
    }

    pub fn register(self) -> Result<()> {
        let record_type = RecordType::from_code(&self.record_type);
        if !record_type.is_custom() {
            return Err(GfaError::Argument(format!(
                "record type {} is predefined and cannot be redefined",
                self.record_type
            )));
        }
        field::validate_encoded(&Datatype::CustomRecordType, &self.record_type)
            .map_err(|e| GfaError::Argument(e.to_string()))?;
        for spec in self.fields.iter().chain(self.tags.iter()) {
            field::codec(&spec.datatype)?;
        }
        for tag in &self.tags {
            field::validate_custom_tag_name(&tag.name)?;
        }
        let declared = |name: &str| self.fields.iter().any(|f| f.name == name);
        for name in self
            .references
            .iter()
            .map(|r| r.field.as_str())
            .chain(self.name_field.as_deref())
        {
            if !declared(name) {
                return Err(GfaError::Argument(format!(
                    "field {} of record type {} is not declared",
                    name, self.record_type
                )));
            }
        }
        let mut linked: Vec<String> = self.references.iter().map(|r| r.field.clone()).collect();
        linked.extend(self.name_field.clone());
        let spec = KindSpec {
            fields: self.fields,
            predefined_tags: self.tags,
            name_field: self.name_field,
            references: self.references,
            backref_keys: GROUP_MEMBER_KEYS.iter().map(|k| k.to_string()).collect(),
            linked_fields: linked,
            ..KindSpec::new(LineKind::Custom, record_type, Some(Version::Gfa2))
        };
        let mut table = extensions()
            .write()
            .map_err(|_| GfaError::Assertion("extension registry lock poisoned".to_string()))?;
        debug!(record_type = %self.record_type, "registered extension");
        table.insert(self.record_type, Arc::new(spec));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        let edge = spec(LineKind::Edge);
        assert_eq!(edge.field_index("name"), Some(0));
        assert_eq!(edge.field_index("sid2"), Some(2));
        let containment = spec(LineKind::Containment);
        assert_eq!(containment.field_index("contained"), Some(2));
        assert!(containment.is_linked("container_orient"));
    }

    #[test]
    fn test_record_type_codes() {
        assert_eq!(RecordType::from_code("S"), RecordType::Segment);
        assert_eq!(
            RecordType::from_code("XY"),
            RecordType::Custom("XY".to_string())
        );
        assert_eq!(RecordType::OrderedGroup.code(), "O");
    }

    #[test]
    fn test_extension_rejects_builtin_code() {
        assert!(Extension::new("S").register().is_err());
        assert!(Extension::new("Q")
            .field("a", Datatype::Z)
            .reference("b", "x")
            .register()
            .is_err());
    }

    #[test]
    fn test_gfa2_group_membership_is_not_dependent() {
        let segment = spec(LineKind::SegmentGfa2);
        assert!(segment.is_dependent_key(keys::INTERNALS));
        assert!(!segment.is_dependent_key(keys::SETS));
        assert!(spec(LineKind::SegmentGfa1).is_dependent_key(keys::PATHS));
    }
}
