//! Codecs of the tag datatypes `A i f Z J H B`

use super::{bad_format, check, regex, wrong_type, Codec};
use crate::error::{GfaError, Result};
use crate::value::{format_float, numeric_array_from_list, ByteArray, NumericArray, Value};

pub struct Char;

impl Codec for Char {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        s.chars()
            .next()
            .map(Value::Char)
            .ok_or_else(|| bad_format("A", s, "a single printable character"))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^[!-~]$"), "A", s, "a single printable character")
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::Char(c) => self.validate_encoded(&c.to_string()),
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("A", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Char(c) => Ok(c.to_string()),
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type("A", other)),
        }
    }
}

pub struct Integer;

impl Codec for Integer {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        s.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| GfaError::Value(format!("integer '{}' is out of range", s)))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^[-+]?[0-9]+$"), "i", s, "[-+]?[0-9]+")
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::Int(_) => Ok(()),
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("i", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Int(i) => Ok(i.to_string()),
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type("i", other)),
        }
    }
}

pub struct Float;

impl Codec for Float {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        s.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| bad_format("f", s, "a decimal or scientific float"))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(
            regex!(r"^[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?$"),
            "f",
            s,
            "[-+]?[0-9]*.?[0-9]+([eE][-+]?[0-9]+)?",
        )
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::Float(f) if f.is_finite() => Ok(()),
            Value::Float(f) => Err(GfaError::Value(format!(
                "{} cannot be written as a GFA float",
                f
            ))),
            Value::Int(_) => Ok(()),
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("f", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::Float(f) => Ok(format_float(*f)),
            Value::Int(i) => Ok(i.to_string()),
            Value::String(s) => Ok(s.clone()),
            other => Err(wrong_type("f", other)),
        }
    }
}

pub struct Text;

impl Codec for Text {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::String(s.to_string()))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^[ !-~]+$"), "Z", s, "printable characters and spaces")
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("Z", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Ok(other.to_string()),
        }
    }
}

/// JSON view of a value set by the caller, if it has one.
fn to_json(value: &Value) -> Option<serde_json::Value> {
    match value {
        Value::Json(j) => Some(j.clone()),
        Value::Int(i) => Some(serde_json::Value::from(*i)),
        Value::Float(f) => serde_json::Number::from_f64(*f).map(serde_json::Value::Number),
        Value::String(s) => Some(serde_json::Value::String(s.clone())),
        Value::Char(c) => Some(serde_json::Value::String(c.to_string())),
        Value::List(items) => items
            .iter()
            .map(to_json)
            .collect::<Option<Vec<_>>>()
            .map(serde_json::Value::Array),
        _ => None,
    }
}

pub struct Json;

impl Codec for Json {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::Json(serde_json::from_str(s).map_err(|e| {
            GfaError::Format(format!("'{}' is not valid JSON: {}", s, e))
        })?))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^[ !-~]+$"), "J", s, "printable characters and spaces")?;
        serde_json::from_str::<serde_json::Value>(s)
            .map(|_| ())
            .map_err(|e| GfaError::Format(format!("'{}' is not valid JSON: {}", s, e)))
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        if let Value::String(s) = value {
            return self.validate_encoded(s);
        }
        let json = to_json(value).ok_or_else(|| wrong_type("J", value))?;
        let text = serde_json::to_string(&json)?;
        check(regex!(r"^[ !-~]+$"), "J", &text, "printable characters and spaces")
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        if let Value::String(s) = value {
            return Ok(s.clone());
        }
        let json = to_json(value).ok_or_else(|| wrong_type("J", value))?;
        Ok(serde_json::to_string(&json)?)
    }
}

pub struct Hex;

impl Codec for Hex {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::ByteArray(s.parse()?))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(regex!(r"^[0-9A-F]+$"), "H", s, "uppercase hexadecimal digits")?;
        if s.len() % 2 != 0 {
            return Err(bad_format("H", s, "an even number of hexadecimal digits"));
        }
        Ok(())
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        match value {
            Value::ByteArray(bytes) => bytes.validate(),
            Value::String(s) => self.validate_encoded(s),
            other => Err(wrong_type("H", other)),
        }
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        match value {
            Value::ByteArray(bytes) => Ok(bytes.to_string()),
            Value::String(s) => Ok(s.clone()),
            Value::List(items) => {
                let bytes = items
                    .iter()
                    .map(|v| v.as_int().and_then(|i| u8::try_from(i).ok()))
                    .collect::<Option<Vec<u8>>>()
                    .ok_or_else(|| wrong_type("H", value))?;
                Ok(ByteArray::from(bytes).to_string())
            }
            other => Err(wrong_type("H", other)),
        }
    }
}

pub struct Numeric;

impl Numeric {
    fn array(value: &Value) -> Result<NumericArray> {
        match value {
            Value::NumericArray(array) => Ok(array.clone()),
            Value::List(items) => {
                numeric_array_from_list(items).ok_or_else(|| wrong_type("B", value))
            }
            other => Err(wrong_type("B", other)),
        }
    }
}

impl Codec for Numeric {
    fn unsafe_decode(&self, s: &str) -> Result<Value> {
        Ok(Value::NumericArray(s.parse()?))
    }

    fn validate_encoded(&self, s: &str) -> Result<()> {
        check(
            regex!(
                r"^([cCsSiI](,[-+]?[0-9]+)+|f(,[-+]?[0-9]*\.?[0-9]+([eE][-+]?[0-9]+)?)+)$"
            ),
            "B",
            s,
            "a subtype code followed by comma-separated numbers",
        )
    }

    fn validate_decoded(&self, value: &Value) -> Result<()> {
        if let Value::String(s) = value {
            return self.validate_encoded(s);
        }
        Self::array(value)?.validate()
    }

    fn unsafe_encode(&self, value: &Value) -> Result<String> {
        if let Value::String(s) = value {
            return Ok(s.clone());
        }
        Self::array(value)?.to_gfa_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_integer_overflow_is_value_error() {
        let err = Integer.decode("99999999999999999999").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn test_float_accepts_integers() {
        assert_eq!(Float.encode(&Value::Int(3)).unwrap(), "3");
        assert_eq!(Float.encode(&Value::Float(3.0)).unwrap(), "3.0");
        assert!(Float.validate_encoded(".5").is_ok());
        assert!(Float.validate_encoded("1.").is_err());
    }

    #[test]
    fn test_json_requires_printable_ascii() {
        assert!(Json.decode("{\"a\": [1, 2]}").is_ok());
        assert!(Json.decode("{a}").is_err());
        let value = Value::Json(serde_json::json!({"k": "caf\u{e9}"}));
        assert_eq!(Json.encode(&value).unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn test_json_from_list() {
        let value = Value::List(vec![Value::Int(1), Value::from("x")]);
        assert_eq!(Json.encode(&value).unwrap(), "[1,\"x\"]");
    }

    #[test]
    fn test_numeric_from_list() {
        let value = Value::List(vec![Value::Int(-1), Value::Int(200)]);
        assert_eq!(Numeric.encode(&value).unwrap(), "s,-1,200");
        let overflow = Value::List(vec![Value::Int(-1), Value::Int(1 << 40)]);
        assert_eq!(Numeric.encode(&overflow).unwrap_err().kind(), ErrorKind::Value);
    }

    #[test]
    fn test_char() {
        assert_eq!(Char.decode("x").unwrap(), Value::Char('x'));
        assert!(Char.decode(" ").is_err());
        assert!(Char.encode(&Value::Int(1)).is_err());
    }
}
