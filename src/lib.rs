//! xmlfixture - Hierarchical XML test fixtures
//!
//! Layers:
//! - core / reader: memchr-accelerated tokenizer and event reader
//! - dom: arena document with string interning
//! - xpath: XPath 1.0 subset with an LRU compile cache
//! - fixture: scoping, tree-to-map transform, `//` pointer resolution
//! - test_data: cached path lookups for test code
//!
//! ```no_run
//! use xmlfixture::{FixtureConfig, TestDataReader};
//!
//! let config = FixtureConfig::load(std::path::Path::new("fixture.toml"))?;
//! let reader = TestDataReader::new(config);
//! reader.initialize(None)?;
//! if reader.path_exists("Login/Case") {
//!     let cases = reader.lookup_list("Login/Case")?;
//!     println!("{} login cases", cases.len());
//! }
//! # Ok::<(), xmlfixture::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod dom;
pub mod error;
pub mod fixture;
pub mod reader;
pub mod resource;
pub mod test_data;
pub mod xpath;

pub use config::FixtureConfig;
pub use error::{Error, Result};
pub use fixture::{Attributes, ResultMap, Value};
pub use resource::{FixtureCache, FixtureKey};
pub use test_data::TestDataReader;
