//! XML Reader Module
//!
//! - SliceReader: zero-copy event reader over a byte slice
//! - Events: XML event types for pull parsing

pub mod events;
pub mod slice;
