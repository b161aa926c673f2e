//! Graph configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GfaError, Result};
use crate::version::{ValidationLevel, Version};

/// Settings applied to a [`crate::Gfa`] and the lines parsed into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GfaConfig {
    /// Fixed GFA version; `None` infers it from the header or the first
    /// version-specific line.
    pub version: Option<Version>,
    /// Validation level for lines created by the graph
    pub vlevel: ValidationLevel,
    /// Fail on references to segments not declared yet instead of creating
    /// virtual placeholders.
    pub segments_first: bool,
}

impl GfaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_vlevel(mut self, vlevel: ValidationLevel) -> Self {
        self.vlevel = vlevel;
        self
    }

    pub fn with_segments_first(mut self, segments_first: bool) -> Self {
        self.segments_first = segments_first;
        self
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(GfaError::NotFound(format!(
                "configuration file {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = GfaConfig::default();
        assert_eq!(config.version, None);
        assert_eq!(config.vlevel, ValidationLevel::OnAccess);
        assert!(!config.segments_first);
    }

    #[test]
    fn test_partial_json() {
        let config = GfaConfig::from_json(r#"{"vlevel": 3, "version": "gfa2"}"#).unwrap();
        assert_eq!(config.vlevel, ValidationLevel::Always);
        assert_eq!(config.version, Some(Version::Gfa2));
        assert!(!config.segments_first);
    }

    #[test]
    fn test_invalid_vlevel() {
        assert!(GfaConfig::from_json(r#"{"vlevel": 7}"#).is_err());
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gfakit.json");
        let config = GfaConfig::new()
            .with_version(Version::Gfa1)
            .with_segments_first(true);
        std::fs::write(&path, config.to_json().unwrap()).unwrap();
        let loaded = GfaConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
