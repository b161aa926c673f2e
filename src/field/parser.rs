//! Tag syntax: `NAME:TYPE:VALUE`

use super::{regex, Datatype};
use crate::error::{GfaError, Result};

/// The three parts of a tag string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagParts<'a> {
    pub name: &'a str,
    pub datatype: Datatype,
    pub value: &'a str,
}

/// Whether `s` looks like a tag, i.e. it cannot be a positional field.
pub fn is_tag_shaped(s: &str) -> bool {
    regex!(r"^[A-Za-z][A-Za-z0-9]:[AifZJHB]:").is_match(s)
}

pub fn parse_tag(s: &str) -> Result<TagParts<'_>> {
    let caps = regex!(r"^([A-Za-z][A-Za-z0-9]):([AifZJHB]):(.*)$")
        .captures(s)
        .ok_or_else(|| {
            GfaError::Format(format!(
                "'{}' is not a tag (expected NAME:TYPE:VALUE, NAME matching \
                 [A-Za-z][A-Za-z0-9] and TYPE one of A, i, f, Z, J, H, B)",
                s
            ))
        })?;
    let (name, datatype, value) = match (caps.get(1), caps.get(2), caps.get(3)) {
        (Some(n), Some(t), Some(v)) => (n.as_str(), t.as_str(), v.as_str()),
        _ => return Err(GfaError::Format(format!("'{}' is not a tag", s))),
    };
    Ok(TagParts {
        name,
        datatype: datatype.parse()?,
        value,
    })
}

/// Custom tag names follow the tag name syntax.
pub fn validate_custom_tag_name(name: &str) -> Result<()> {
    if regex!(r"^[A-Za-z][A-Za-z0-9]$").is_match(name) {
        Ok(())
    } else {
        Err(GfaError::Format(format!(
            "'{}' is not a valid tag name (expected [A-Za-z][A-Za-z0-9])",
            name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        let tag = parse_tag("LN:i:100").unwrap();
        assert_eq!(tag.name, "LN");
        assert_eq!(tag.datatype, Datatype::I);
        assert_eq!(tag.value, "100");
        let tag = parse_tag("xx:Z:a:b c").unwrap();
        assert_eq!(tag.value, "a:b c");
    }

    #[test]
    fn test_malformed_tags() {
        assert!(parse_tag("LN:x:100").is_err());
        assert!(parse_tag("1N:i:100").is_err());
        assert!(parse_tag("LNN:i:100").is_err());
        assert!(parse_tag("ACGT").is_err());
    }

    #[test]
    fn test_tag_shape() {
        assert!(is_tag_shaped("RC:i:12"));
        assert!(!is_tag_shaped("ACGT"));
        assert!(!is_tag_shaped("100"));
    }
}
