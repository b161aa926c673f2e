//! Codecs shared by both GFA versions

use super::{check, regex, wrong_type, Codec};
use crate::error::Result;
use crate::value::{Orientation, Value};

fn encode_string(datatype: &str, value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(wrong_type(datatype, other)),
    }
}

pub struct CustomRecordType;

impl Codec for CustomRecordType {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::String(s.to_string()))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^[!-~]+$"), "custom_record_type", s, "[!-~]+")
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("custom_record_type", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        encode_string("custom_record_type", value)
    }
}

pub struct Comment;

impl Codec for Comment {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::String(s.to_string()))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^[^\n\r]*$"), "comment", s, "no newlines")
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("comment", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        encode_string("comment", value)
    }
}

pub struct OrientationCodec;

impl Codec for OrientationCodec {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::Orientation(s.parse::<Orientation>()?))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^[+-]$"), "orientation", s, "+ or -")
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::Orientation(_) => Ok(()),
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("orientation", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Orientation(o) => Ok(o.to_string()),
            other => encode_string("orientation", other),
        }
    }
}

/// Any tab-free content; used for fields of unregistered custom records.
pub struct Generic;

impl Codec for Generic {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::String(s.to_string()))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^[^\t\n\r]+$"), "generic", s, "no tabs or newlines")
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.validate_encoded(s),
            Value::Line(_) => Ok(()),
            other => Err(wrong_type("generic", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        encode_string("generic", value)
    }
}
