//! Fixture configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`FixtureConfig::test_data_file`]
pub const ENV_TEST_DATA_FILE: &str = "FIXTURE_TEST_DATA_FILE";
/// Environment variable overriding [`FixtureConfig::host`]
pub const ENV_HOST: &str = "FIXTURE_HOST";

/// Test data configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Resource read when `initialize` is called without a name
    pub test_data_file: Option<String>,

    /// Environment identifier; selects the `<scope_prefix><host>` subtree
    pub host: String,

    /// Prefix of scope tag names
    pub scope_prefix: String,

    /// Directories searched, in order, for relative resource names
    pub resource_roots: Vec<PathBuf>,

    /// Retry count for UI collaborators
    pub retry_count: u32,

    /// Timeout for UI collaborators
    pub timeout_secs: u64,

    /// Capacity of the compiled pointer-expression cache
    pub xpath_cache_size: usize,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            test_data_file: None,
            host: String::new(),
            scope_prefix: "APP_".to_string(),
            resource_roots: vec![PathBuf::from(".")],
            retry_count: 0,
            timeout_secs: 30,
            xpath_cache_size: 64,
        }
    }
}

impl FixtureConfig {
    /// Load configuration from a TOML file, then apply environment overrides
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)?
        } else {
            Self::default()
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Apply overrides from a variable lookup such as `std::env::var`
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(file) = lookup(ENV_TEST_DATA_FILE).filter(|v| !v.trim().is_empty()) {
            self.test_data_file = Some(file);
        }
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        self
    }

    /// Scope tag for the configured host, empty when no host is set
    pub fn scope_tag(&self) -> String {
        let host = self.host.trim();
        if host.is_empty() {
            String::new()
        } else {
            format!("{}{}", self.scope_prefix, host)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FixtureConfig::default();
        assert_eq!(config.scope_prefix, "APP_");
        assert_eq!(config.resource_roots, vec![PathBuf::from(".")]);
        assert_eq!(config.scope_tag(), "");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FixtureConfig::from_toml_str(
            r#"
            test_data_file = "data/TestData.xml"
            host = "QA"
            resource_roots = ["fixtures", "/srv/data"]
            "#,
        )
        .unwrap();
        assert_eq!(config.test_data_file.as_deref(), Some("data/TestData.xml"));
        assert_eq!(config.scope_tag(), "APP_QA");
        assert_eq!(config.resource_roots.len(), 2);
        assert_eq!(config.xpath_cache_size, 64);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = FixtureConfig {
            test_data_file: Some("TestData.xml".to_string()),
            host: "PROD".to_string(),
            resource_roots: vec![PathBuf::from("fixtures"), PathBuf::from("/srv/data")],
            retry_count: 3,
            ..FixtureConfig::default()
        };
        let written = toml::to_string(&config).unwrap();
        assert_eq!(FixtureConfig::from_toml_str(&written).unwrap(), config);

        // an unset default resource is left out, not written as a value
        let written = toml::to_string(&FixtureConfig::default()).unwrap();
        assert!(!written.contains("test_data_file"));
        assert_eq!(FixtureConfig::from_toml_str(&written).unwrap(), FixtureConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = FixtureConfig::from_toml_str("host = [").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let config = FixtureConfig::default().with_overrides(|key| match key {
            ENV_TEST_DATA_FILE => Some("other.xml".to_string()),
            ENV_HOST => Some("PROD".to_string()),
            _ => None,
        });
        assert_eq!(config.test_data_file.as_deref(), Some("other.xml"));
        assert_eq!(config.scope_tag(), "APP_PROD");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FixtureConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.scope_prefix, "APP_");
    }
}
