//! Wiki-link extraction.
//!
//! Link syntax parsing sits behind the [`LinkParser`] trait so the indexer
//! can be driven by any parser that turns source text into raw link records.
//! [`WikiLinkParser`] is the default implementation and understands
//! `[[target]]`, `[[target|alias]]`, `[[target#heading]]` and the `![[...]]`
//! embed form.
//!
//! [`extract_file_links`] adapts raw records to a containing file: it assigns
//! each link a content-addressed id and the file's id as `from`. Targets stay
//! unresolved until the indexer's second pass.

pub mod extract;
pub mod parser;

pub use extract::{FileLink, extract_file_links, link_id};
pub use parser::{LinkParseError, LinkParser, RawLink, WikiLinkOptions, WikiLinkParser, slugify};
