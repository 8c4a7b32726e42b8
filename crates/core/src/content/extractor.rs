//! Per-file record construction: filetype, logical path, frontmatter, links.

use std::path::Path;

use thiserror::Error;

use super::hasher::id_for;
use super::walker::WalkedFile;
use crate::frontmatter::{self, FrontmatterParseError};
use crate::index::types::{IndexedFile, is_markdown};
use crate::wikilink::{FileLink, LinkParseError, LinkParser, extract_file_links, slugify};

/// File stem of a folder's landing page.
const INDEX_STEM: &str = "index";

/// Why a single file could not be indexed. Never fatal to a run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid frontmatter in {path}: {source}")]
    Frontmatter {
        path: String,
        #[source]
        source: FrontmatterParseError,
    },

    #[error("frontmatter of {path} cannot be stored as JSON: {source}")]
    Metadata {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to extract links from {path}: {source}")]
    Links {
        path: String,
        #[source]
        source: LinkParseError,
    },
}

/// A file record together with its outgoing links.
#[derive(Debug, Clone)]
pub struct ClassifiedFile {
    /// The file row. `tags` is `Some` for the markdown family.
    pub file: IndexedFile,
    /// Outgoing links, unresolved. Empty for non-markdown files.
    pub links: Vec<FileLink>,
}

/// Build the index record for a walked file.
///
/// Markdown-family files are read and parsed; other files are classified
/// from their path alone.
pub fn classify(
    walked: &WalkedFile,
    parser: &dyn LinkParser,
) -> Result<ClassifiedFile, ExtractError> {
    let path = walked.absolute_path.to_string_lossy().to_string();
    let relative = walked.relative_slash_path();
    let filetype = filetype_of(&walked.relative_path);
    let id = id_for(&path);

    if !is_markdown(&filetype) {
        return Ok(ClassifiedFile {
            file: IndexedFile {
                id,
                path,
                url_path: relative,
                filetype,
                metadata: None,
                declared_type: None,
                tags: None,
            },
            links: Vec::new(),
        });
    }

    let content = std::fs::read_to_string(&walked.absolute_path)
        .map_err(|source| ExtractError::Read { path: path.clone(), source })?;

    let parsed = frontmatter::parse(&content)
        .map_err(|source| ExtractError::Frontmatter { path: path.clone(), source })?;
    let fm = parsed.frontmatter.unwrap_or_default();

    let metadata =
        fm.to_json().map_err(|source| ExtractError::Metadata { path: path.clone(), source })?;

    let links = extract_file_links(
        parser,
        &parsed.body,
        &source_logical_path(&relative),
        &id,
        &path,
    )
    .map_err(|source| ExtractError::Links { path: path.clone(), source })?;

    Ok(ClassifiedFile {
        file: IndexedFile {
            id,
            path,
            url_path: markdown_url_path(&relative),
            filetype,
            metadata: Some(metadata),
            declared_type: fm.declared_type().map(str::to_string),
            tags: Some(fm.tags()),
        },
        links,
    })
}

/// Lowercase text after the last `.` of the file name, or empty.
pub fn filetype_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()))
        .unwrap_or_default()
}

/// Logical path of a markdown file from its `/`-separated relative path.
///
/// `blog/post.md` becomes `blog/post`, `blog/index.md` becomes `blog` and
/// the root `index.md` becomes the empty string.
pub fn markdown_url_path(relative: &str) -> String {
    let (folder, filename) = match relative.rsplit_once('/') {
        Some((folder, filename)) => (folder, filename),
        None => ("", relative),
    };
    let stem = match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    };

    if stem == INDEX_STEM {
        folder.to_string()
    } else if folder.is_empty() {
        stem.to_string()
    } else {
        format!("{folder}/{stem}")
    }
}

/// Source context handed to the link parser: `/` + slugified relative path
/// without extension.
pub fn source_logical_path(relative: &str) -> String {
    let without_ext = match relative.rsplit_once('.') {
        Some((rest, ext)) if !ext.contains('/') => rest,
        _ => relative,
    };
    let slug = without_ext.split('/').map(slugify).collect::<Vec<_>>().join("/");
    format!("/{slug}")
}
