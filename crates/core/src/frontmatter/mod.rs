//! Frontmatter parsing for markdown documents.
//!
//! This module splits a YAML frontmatter block from the markdown body and
//! exposes the fields the indexer cares about (`type`, `tags`) alongside the
//! full metadata as JSON.

pub mod parser;
pub mod types;

pub use parser::{FrontmatterParseError, parse};
pub use types::{Frontmatter, ParsedDocument};
