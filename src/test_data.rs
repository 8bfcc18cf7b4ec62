//! Test data reader
//!
//! The entry point for test code: select a document with
//! [`TestDataReader::initialize`], then look values up by path.
//!
//! ```no_run
//! use xmlfixture::{FixtureConfig, TestDataReader};
//!
//! let reader = TestDataReader::new(FixtureConfig::default());
//! reader.initialize(Some("TestData.xml"))?;
//! let user = reader.lookup_map("Login/Case/0/user")?;
//! assert_eq!(user.as_str(), Some("alice"));
//! # Ok::<(), xmlfixture::Error>(())
//! ```

use crate::config::FixtureConfig;
use crate::error::{Error, Result};
use crate::fixture::{build_fixture, count_keys_starting_with, navigate::navigate_segments, split_path, ResultMap, Value};
use crate::resource::{FixtureCache, FixtureKey};
use parking_lot::RwLock;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Document and scope chosen by `initialize`
#[derive(Debug, Clone)]
struct Selection {
    resource: String,
    scope_tag: String,
}

/// Path lookups over cached fixtures of one test data document
pub struct TestDataReader {
    config: FixtureConfig,
    selection: RwLock<Option<Selection>>,
    cache: FixtureCache,
}

impl TestDataReader {
    pub fn new(config: FixtureConfig) -> Self {
        let cache = FixtureCache::new(config.xpath_cache_size);
        TestDataReader {
            config,
            selection: RwLock::new(None),
            cache,
        }
    }

    pub fn config(&self) -> &FixtureConfig {
        &self.config
    }

    /// Select the document to read, or the configured default when `None`
    ///
    /// May be called again to switch documents. Fixtures of the previous
    /// document stay cached under their own key.
    pub fn initialize(&self, resource: Option<&str>) -> Result<()> {
        let resource = resource
            .map(str::to_string)
            .or_else(|| self.config.test_data_file.clone())
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| Error::Config("no test data file given or configured".to_string()))?;
        let scope_tag = self.config.scope_tag();

        info!(resource = %resource, scope = %scope_tag, "Initializing test data reader");
        *self.selection.write() = Some(Selection { resource, scope_tag });
        Ok(())
    }

    /// Resource selected by the last `initialize`
    pub fn current_resource(&self) -> Option<String> {
        self.selection.read().as_ref().map(|s| s.resource.clone())
    }

    /// Scope tag derived from the configured host
    pub fn scope_tag(&self) -> String {
        self.config.scope_tag()
    }

    /// The fixture built for `root_tag`, from cache when possible
    pub fn fixture(&self, root_tag: &str) -> Result<Arc<ResultMap>> {
        let selection = self.selection.read().clone().ok_or(Error::NotInitialized)?;
        let key = FixtureKey::new(selection.resource, selection.scope_tag, root_tag);
        debug!(resource = %key.resource, root = root_tag, "Looking up test data");

        self.cache.get_or_build(&key, |xpath| {
            build_fixture(&key.resource, &self.config.resource_roots, &key.scope_tag, &key.root_tag, xpath)
        })
    }

    /// Value addressed by `path`; the first segment names the root tag
    pub fn lookup_map(&self, path: &str) -> Result<Value> {
        let segments = split_path(path)?;
        let fixture = self.fixture(segments[0])?;
        let value = navigate_segments(&fixture, &segments, path)?;
        Ok(value.into_owned())
    }

    /// Values at `path` in order, without their keys
    pub fn lookup_list(&self, path: &str) -> Result<Vec<Value>> {
        Ok(self.lookup_map(path)?.values())
    }

    /// Whether `path` addresses data; never fails
    pub fn path_exists(&self, path: &str) -> bool {
        match self.lookup_list(path) {
            Ok(_) => true,
            Err(e) if e.is_lookup_miss() => false,
            Err(e) => {
                warn!(path, error = %e, "Test data lookup failed");
                false
            }
        }
    }

    /// Number of keys directly under `path` starting with `prefix`
    pub fn count_children_starting_with(&self, path: &str, prefix: &str) -> Result<usize> {
        Ok(count_keys_starting_with(&self.lookup_map(path)?, prefix))
    }

    /// Build the fixtures of several root tags in parallel
    pub fn preload(&self, root_tags: &[&str]) -> Result<()> {
        root_tags
            .par_iter()
            .map(|root_tag| self.fixture(root_tag).map(|_| ()))
            .collect()
    }

    /// Drop all cached fixtures
    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &FixtureCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_before_initialize() {
        let reader = TestDataReader::new(FixtureConfig::default());
        assert!(matches!(reader.lookup_map("Root"), Err(Error::NotInitialized)));
        assert!(!reader.path_exists("Root"));
        assert_eq!(reader.current_resource(), None);
    }

    #[test]
    fn test_initialize_needs_a_resource() {
        let reader = TestDataReader::new(FixtureConfig::default());
        assert!(matches!(reader.initialize(None), Err(Error::Config(_))));
        assert!(matches!(reader.initialize(Some(" ")), Err(Error::Config(_))));

        let config = FixtureConfig {
            test_data_file: Some("default.xml".to_string()),
            ..FixtureConfig::default()
        };
        let reader = TestDataReader::new(config);
        reader.initialize(None).unwrap();
        assert_eq!(reader.current_resource().as_deref(), Some("default.xml"));
        reader.initialize(Some("other.xml")).unwrap();
        assert_eq!(reader.current_resource().as_deref(), Some("other.xml"));
    }

    #[test]
    fn test_invalid_path_checked_first() {
        let reader = TestDataReader::new(FixtureConfig::default());
        assert!(matches!(reader.lookup_map("  "), Err(Error::InvalidPath)));
    }
}
