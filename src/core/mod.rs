//! Core XML parsing primitives
//!
//! - Scanner: memchr-accelerated delimiter search
//! - Tokenizer: pull tokenizer for markup and text
//! - Entities: predefined entity and character reference decoding
//! - Attributes: attribute parsing with optional strict checks
//! - Encoding: BOM handling and UTF-16 to UTF-8 conversion

pub mod attributes;
pub mod encoding;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
