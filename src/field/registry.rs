//! Process-wide table of datatype codecs

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use super::{common, gfa1, gfa2, tag, Codec, Datatype};
use crate::error::{GfaError, Result};

type Table = HashMap<String, Arc<dyn Codec>>;

fn table() -> &'static RwLock<Table> {
    static TABLE: OnceLock<RwLock<Table>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table: Table = HashMap::new();
        for datatype in Datatype::builtins() {
            table.insert(datatype.name().to_string(), builtin(datatype));
        }
        RwLock::new(table)
    })
}

fn builtin(datatype: &Datatype) -> Arc<dyn Codec> {
    match datatype {
        Datatype::A => Arc::new(tag::Char),
        Datatype::I => Arc::new(tag::Integer),
        Datatype::F => Arc::new(tag::Float),
        Datatype::Z => Arc::new(tag::Text),
        Datatype::J => Arc::new(tag::Json),
        Datatype::H => Arc::new(tag::Hex),
        Datatype::B => Arc::new(tag::Numeric),
        Datatype::SegmentNameGfa1 => Arc::new(gfa1::SegmentName),
        Datatype::PathNameGfa1 => Arc::new(gfa1::PathName),
        Datatype::OrientedIdentifierListGfa1 => Arc::new(gfa1::OrientedIdentifierList),
        Datatype::AlignmentGfa1 => Arc::new(gfa1::Alignment),
        Datatype::AlignmentListGfa1 => Arc::new(gfa1::AlignmentList),
        Datatype::SequenceGfa1 => Arc::new(gfa1::Sequence),
        Datatype::PositionGfa1 => Arc::new(gfa1::Position),
        Datatype::IdentifierGfa2 => Arc::new(gfa2::Identifier),
        Datatype::OptionalIdentifierGfa2 => Arc::new(gfa2::OptionalIdentifier),
        Datatype::OrientedIdentifierGfa2 => Arc::new(gfa2::OrientedIdentifier),
        Datatype::IdentifierListGfa2 => Arc::new(gfa2::IdentifierList),
        Datatype::OrientedIdentifierListGfa2 => Arc::new(gfa2::OrientedIdentifierList),
        Datatype::AlignmentGfa2 => Arc::new(gfa2::Alignment),
        Datatype::PositionGfa2 => Arc::new(gfa2::Position),
        Datatype::SequenceGfa2 => Arc::new(gfa2::Sequence),
        Datatype::OptionalInteger => Arc::new(gfa2::OptionalInteger),
        Datatype::CustomRecordType => Arc::new(common::CustomRecordType),
        Datatype::Comment => Arc::new(common::Comment),
        Datatype::Orientation => Arc::new(common::OrientationCodec),
        Datatype::Generic | Datatype::Custom(_) => Arc::new(common::Generic),
    }
}

/// Codec registered for `datatype`.
pub fn codec(datatype: &Datatype) -> Result<Arc<dyn Codec>> {
    let table = table()
        .read()
        .map_err(|_| GfaError::Assertion("datatype registry lock poisoned".to_string()))?;
    table
        .get(datatype.name())
        .cloned()
        .ok_or_else(|| GfaError::Type(format!("datatype unknown: {}", datatype)))
}

/// Register a codec under `name`, for use by extension record kinds.
///
/// Builtin datatypes cannot be replaced; registering an existing custom
/// name replaces its codec.
pub fn register_datatype(name: &str, codec: Arc<dyn Codec>) -> Result<Datatype> {
    let datatype: Datatype = name.parse()?;
    if !matches!(datatype, Datatype::Custom(_)) {
        return Err(GfaError::Argument(format!(
            "datatype {} is builtin and cannot be replaced",
            name
        )));
    }
    let mut table = table()
        .write()
        .map_err(|_| GfaError::Assertion("datatype registry lock poisoned".to_string()))?;
    table.insert(name.to_string(), codec);
    debug!(datatype = name, "registered datatype");
    Ok(datatype)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{bad_format, regex, wrong_type};
    use crate::value::Value;

    struct Dna;

    impl Codec for Dna {
        fn unsafe_decode(&self, s: &str) -> Result<Value> {
            Ok(Value::String(s.to_string()))
        }

        fn validate_encoded(&self, s: &str) -> Result<()> {
            if regex!(r"^[ACGT]+$").is_match(s) {
                Ok(())
            } else {
                Err(bad_format("dna", s, "[ACGT]+"))
            }
        }

        fn validate_decoded(&self, value: &Value) -> Result<()> {
            match value {
                Value::String(s) => self.validate_encoded(s),
                other => Err(wrong_type("dna", other)),
            }
        }

        fn unsafe_encode(&self, value: &Value) -> Result<String> {
            match value {
                Value::String(s) => Ok(s.clone()),
                other => Err(wrong_type("dna", other)),
            }
        }
    }

    #[test]
    fn test_register_custom_datatype() {
        let datatype = register_datatype("registry_test_dna", Arc::new(Dna)).unwrap();
        assert_eq!(datatype, Datatype::Custom("registry_test_dna".to_string()));
        let codec = codec(&datatype).unwrap();
        assert!(codec.decode("ACGT").is_ok());
        assert!(codec.decode("ACGU").is_err());
    }

    #[test]
    fn test_builtin_cannot_be_replaced() {
        assert!(register_datatype("i", Arc::new(Dna)).is_err());
    }
}
