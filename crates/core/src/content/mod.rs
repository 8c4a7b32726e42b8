//! Content folder discovery and per-file extraction.
//!
//! This module provides utilities for walking content folders, classifying
//! each file into an index record and computing content-addressed ids.

pub mod extractor;
pub mod hasher;
pub mod walker;

pub use extractor::{ClassifiedFile, ExtractError, classify, markdown_url_path};
pub use hasher::id_for;
pub use walker::{ContentWalker, ContentWalkerError, WalkedFile};
