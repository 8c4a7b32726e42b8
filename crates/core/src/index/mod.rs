//! Content index backed by SQLite.
//!
//! This module provides storage and queries for:
//! - Files (logical path, filetype, frontmatter metadata)
//! - Tags and the files carrying them
//! - Links between files, with dangling targets kept as `NULL`
//!
//! # Example
//!
//! ```no_run
//! use mddb_core::index::{FileQuery, IndexDb, LinkQuery};
//! use std::path::Path;
//!
//! let db = IndexDb::open(Path::new("markdown.db")).unwrap();
//!
//! // All markdown files under blog/ tagged "economy"
//! let query = FileQuery {
//!     folder: Some("blog".into()),
//!     tags: Some(vec!["economy".into()]),
//!     ..Default::default()
//! };
//! let posts = db.list_files(&query).unwrap();
//!
//! // Backlinks of the first one
//! let backlinks = db.get_links(&LinkQuery::backward(&posts[0].id)).unwrap();
//! ```

pub mod builder;
pub mod db;
pub mod schema;
pub mod types;

pub use builder::{
    AccumulateError, BuilderError, IndexAccumulator, IndexBuilder, IndexStats, ProgressCallback,
    compile_patterns, index_folder,
};
pub use db::{IndexDb, IndexError};
pub use schema::SchemaError;
pub use types::{
    Direction, FileQuery, FileTag, IndexedFile, IndexedLink, LinkQuery, LinkType,
    ResolvedLink,
};
