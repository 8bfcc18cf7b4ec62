//! Fixture cache
//!
//! Built fixtures are kept per (resource, scope, root tag). Each key owns a
//! slot that is filled at most once; concurrent callers of the same key
//! wait for the first build, while other keys build independently.

use crate::error::Result;
use crate::fixture::ResultMap;
use crate::xpath::XPathCache;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Cache key of one built fixture
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixtureKey {
    pub resource: String,
    pub scope_tag: String,
    pub root_tag: String,
}

impl FixtureKey {
    pub fn new(resource: impl Into<String>, scope_tag: impl Into<String>, root_tag: impl Into<String>) -> Self {
        FixtureKey {
            resource: resource.into(),
            scope_tag: scope_tag.into(),
            root_tag: root_tag.into(),
        }
    }
}

/// Holds one fixture once it has been built
///
/// A failed build leaves the slot empty so a later call can retry.
#[derive(Default)]
pub struct FixtureSlot {
    built: OnceCell<Arc<ResultMap>>,
}

impl FixtureSlot {
    pub fn get(&self) -> Option<Arc<ResultMap>> {
        self.built.get().cloned()
    }

    fn get_or_build<F>(&self, build: F) -> Result<Arc<ResultMap>>
    where
        F: FnOnce() -> Result<ResultMap>,
    {
        self.built.get_or_try_init(|| build().map(Arc::new)).cloned()
    }
}

/// Process-wide store of built fixtures, plus the compiled pointer cache
/// shared by every build
pub struct FixtureCache {
    slots: Mutex<HashMap<FixtureKey, Arc<FixtureSlot>>>,
    xpath: XPathCache,
    builds: AtomicUsize,
}

impl FixtureCache {
    pub fn new(xpath_cache_size: usize) -> Self {
        FixtureCache {
            slots: Mutex::new(HashMap::new()),
            xpath: XPathCache::new(xpath_cache_size),
            builds: AtomicUsize::new(0),
        }
    }

    /// Return the fixture for `key`, running `build` if it is not cached
    ///
    /// The map lock is only held to find the slot, never during a build.
    pub fn get_or_build<F>(&self, key: &FixtureKey, build: F) -> Result<Arc<ResultMap>>
    where
        F: FnOnce(&XPathCache) -> Result<ResultMap>,
    {
        let slot = Arc::clone(self.slots.lock().entry(key.clone()).or_default());
        slot.get_or_build(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            build(&self.xpath)
        })
    }

    /// Cached fixture for `key`, without building
    pub fn get(&self, key: &FixtureKey) -> Option<Arc<ResultMap>> {
        self.slots.lock().get(key).and_then(|slot| slot.get())
    }

    pub fn xpath(&self) -> &XPathCache {
        &self.xpath
    }

    /// Number of keys with a built fixture
    pub fn len(&self) -> usize {
        self.slots.lock().values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of builds started, failed ones included
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Drop every cached fixture and compiled expression
    ///
    /// Fixtures already handed out stay valid.
    pub fn clear(&self) {
        self.slots.lock().clear();
        self.xpath.clear();
    }
}

impl Default for FixtureCache {
    fn default() -> Self {
        FixtureCache::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::fixture::Value;
    use std::thread;

    fn one_entry(value: &str) -> ResultMap {
        let mut map = ResultMap::new();
        map.insert("k".to_string(), Value::from(value));
        map
    }

    #[test]
    fn test_builds_once_per_key() {
        let cache = FixtureCache::default();
        let key = FixtureKey::new("data.xml", "APP_QA", "Root");
        let first = cache.get_or_build(&key, |_| Ok(one_entry("a"))).unwrap();
        let second = cache.get_or_build(&key, |_| Ok(one_entry("b"))).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.build_count(), 1);

        let other = FixtureKey::new("data.xml", "APP_QA", "Other");
        cache.get_or_build(&other, |_| Ok(one_entry("c"))).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_build_not_cached() {
        let cache = FixtureCache::default();
        let key = FixtureKey::new("data.xml", "", "Root");
        let err = cache.get_or_build(&key, |_| Err(Error::NotInitialized));
        assert!(err.is_err());
        assert!(cache.get(&key).is_none());
        assert!(cache.get_or_build(&key, |_| Ok(one_entry("ok"))).is_ok());
        assert_eq!(cache.build_count(), 2);
    }

    #[test]
    fn test_concurrent_callers_share_one_build() {
        let cache = Arc::new(FixtureCache::default());
        let key = FixtureKey::new("data.xml", "", "Root");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let key = key.clone();
                thread::spawn(move || {
                    cache
                        .get_or_build(&key, |_| {
                            thread::sleep(std::time::Duration::from_millis(5));
                            Ok(one_entry("v"))
                        })
                        .unwrap()
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(cache.build_count(), 1);
    }

    #[test]
    fn test_clear_keeps_handed_out_fixtures() {
        let cache = FixtureCache::default();
        let key = FixtureKey::new("data.xml", "", "Root");
        let held = cache.get_or_build(&key, |_| Ok(one_entry("v"))).unwrap();
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(held["k"], Value::from("v"));
    }
}
