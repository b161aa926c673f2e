//! GFA format versions and validation levels

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GfaError, Result};

/// Version of the GFA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Version {
    Gfa1,
    Gfa2,
}

impl Version {
    /// Value of the `VN` header tag for this version.
    pub fn header_value(&self) -> &'static str {
        match self {
            Version::Gfa1 => "1.0",
            Version::Gfa2 => "2.0",
        }
    }

    /// Interpret the value of a `VN` header tag.
    pub fn from_header_value(value: &str) -> Result<Self> {
        match value {
            "1.0" | "1" | "1.1" | "1.2" => Ok(Version::Gfa1),
            "2.0" | "2" => Ok(Version::Gfa2),
            _ => Err(GfaError::Version(format!(
                "VN:Z:{} does not name a supported GFA version",
                value
            ))),
        }
    }

    pub fn other(&self) -> Self {
        match self {
            Version::Gfa1 => Version::Gfa2,
            Version::Gfa2 => Version::Gfa1,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Gfa1 => write!(f, "gfa1"),
            Version::Gfa2 => write!(f, "gfa2"),
        }
    }
}

impl FromStr for Version {
    type Err = GfaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gfa1" | "1" | "1.0" => Ok(Version::Gfa1),
            "gfa2" | "2" | "2.0" => Ok(Version::Gfa2),
            _ => Err(GfaError::Argument(format!(
                "Unknown GFA version: {}. Valid versions: gfa1, gfa2",
                s
            ))),
        }
    }
}

/// How eagerly field contents are validated.
///
/// The level gates *when* codec validators run. Level 0 never validates
/// proactively; decoding still fails on content it cannot interpret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ValidationLevel {
    /// No proactive validation
    Off = 0,
    /// Structure on construction, field contents on first access
    OnAccess = 1,
    /// As `OnAccess`, plus on every stringification
    OnOutput = 2,
    /// As `OnOutput`, plus on every field access
    Always = 3,
}

impl Default for ValidationLevel {
    fn default() -> Self {
        ValidationLevel::OnAccess
    }
}

impl ValidationLevel {
    pub fn validates_on_access(self) -> bool {
        self >= ValidationLevel::OnAccess
    }

    pub fn validates_on_output(self) -> bool {
        self >= ValidationLevel::OnOutput
    }

    pub fn validates_always(self) -> bool {
        self >= ValidationLevel::Always
    }
}

impl TryFrom<u8> for ValidationLevel {
    type Error = GfaError;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            0 => Ok(ValidationLevel::Off),
            1 => Ok(ValidationLevel::OnAccess),
            2 => Ok(ValidationLevel::OnOutput),
            3 => Ok(ValidationLevel::Always),
            _ => Err(GfaError::Argument(format!(
                "validation level must be between 0 and 3, got {}",
                level
            ))),
        }
    }
}

impl From<ValidationLevel> for u8 {
    fn from(level: ValidationLevel) -> u8 {
        level as u8
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        assert_eq!("gfa1".parse::<Version>().unwrap(), Version::Gfa1);
        assert_eq!("2.0".parse::<Version>().unwrap(), Version::Gfa2);
        assert!("gfa3".parse::<Version>().is_err());
    }

    #[test]
    fn test_header_value() {
        assert_eq!(Version::from_header_value("1.0").unwrap(), Version::Gfa1);
        assert_eq!(Version::Gfa2.header_value(), "2.0");
        assert!(Version::from_header_value("9.9").is_err());
    }

    #[test]
    fn test_validation_level_order() {
        assert!(!ValidationLevel::Off.validates_on_access());
        assert!(ValidationLevel::OnAccess.validates_on_access());
        assert!(!ValidationLevel::OnAccess.validates_on_output());
        assert!(ValidationLevel::Always.validates_on_output());
        assert_eq!(ValidationLevel::try_from(2).unwrap(), ValidationLevel::OnOutput);
        assert!(ValidationLevel::try_from(4).is_err());
    }
}
