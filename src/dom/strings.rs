//! String Interning Pool
//!
//! Stores element names, attribute names/values and text content once.
//! Fixture documents repeat the same tag names heavily (`Case`, `Username`,
//! ...), so each distinct byte string is kept a single time and nodes
//! refer to it by id.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// String interning pool
///
/// Id 0 is reserved for the empty string.
#[derive(Debug)]
pub struct StringPool {
    /// (offset, len) into `data`, indexed by string id
    spans: Vec<(u32, u32)>,
    data: Vec<u8>,
    /// Hash of string content -> ids with that hash (collisions are rare)
    hash_index: HashMap<u64, Vec<u32>>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    pub fn new() -> Self {
        StringPool {
            spans: vec![(0, 0)],
            data: Vec::with_capacity(4096),
            hash_index: HashMap::new(),
        }
    }

    #[inline]
    fn compute_hash(s: &[u8]) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a byte string, returning its id
    pub fn intern(&mut self, s: &[u8]) -> u32 {
        if s.is_empty() {
            return 0;
        }

        let hash = Self::compute_hash(s);
        if let Some(ids) = self.hash_index.get(&hash) {
            if let Some(&id) = ids.iter().find(|&&id| self.get(id) == Some(s)) {
                return id;
            }
        }

        let offset = self.data.len() as u32;
        self.data.extend_from_slice(s);

        let id = self.spans.len() as u32;
        self.spans.push((offset, s.len() as u32));
        self.hash_index.entry(hash).or_default().push(id);
        id
    }

    /// Look up an already interned string without inserting it
    pub fn find(&self, s: &[u8]) -> Option<u32> {
        if s.is_empty() {
            return Some(0);
        }
        self.hash_index
            .get(&Self::compute_hash(s))?
            .iter()
            .copied()
            .find(|&id| self.get(id) == Some(s))
    }

    /// Get the bytes of a string by id
    pub fn get(&self, id: u32) -> Option<&[u8]> {
        let &(offset, len) = self.spans.get(id as usize)?;
        let start = offset as usize;
        self.data.get(start..start + len as usize)
    }

    /// Get a string by id as UTF-8
    pub fn get_str(&self, id: u32) -> Option<&str> {
        self.get(id).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Number of distinct strings, including the reserved empty string
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.len() <= 1
    }

    /// Bytes of string storage in use
    pub fn bytes_used(&self) -> usize {
        self.data.len()
    }
}
