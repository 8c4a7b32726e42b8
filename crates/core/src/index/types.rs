//! Index data types for files, tags and links.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::db::IndexError;

/// Extensions of the markdown family. Only these files carry metadata,
/// tags and outgoing links.
pub const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// Whether a filetype belongs to the markdown family.
pub fn is_markdown(filetype: &str) -> bool {
    MARKDOWN_EXTENSIONS.contains(&filetype)
}

/// Type of link between files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Reference: [[target]]
    Normal,
    /// Transclusion: ![[target]]
    Embed,
}

impl LinkType {
    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Embed => "embed",
        }
    }
}

impl FromStr for LinkType {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "embed" => Ok(Self::Embed),
            other => Err(IndexError::InvalidQuery(format!(
                "unknown link type '{other}' (expected normal or embed)"
            ))),
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a link graph traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Outgoing links of a file.
    #[default]
    Forward,
    /// Incoming links (backlinks) of a file.
    Backward,
}

impl FromStr for Direction {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" => Ok(Self::Forward),
            "backward" => Ok(Self::Backward),
            other => Err(IndexError::InvalidQuery(format!(
                "unknown direction '{other}' (expected forward or backward)"
            ))),
        }
    }
}

/// A file in the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedFile {
    /// Content address of the path.
    pub id: String,
    /// Filesystem path.
    pub path: String,
    /// Logical path used for addressing and link resolution.
    pub url_path: String,
    /// Lowercase extension.
    pub filetype: String,
    /// Frontmatter (markdown family only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Frontmatter `type` field.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub declared_type: Option<String>,
    /// Tags in declaration order. Populated on query results for the
    /// markdown family, `None` otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl IndexedFile {
    pub fn is_markdown(&self) -> bool {
        is_markdown(&self.filetype)
    }
}

/// Membership of a file in a tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileTag {
    pub tag: String,
    /// File id.
    pub file: String,
}

/// A link row between two files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedLink {
    /// Content address of the raw link record.
    pub id: String,
    pub link_type: LinkType,
    /// Source file id.
    pub from: String,
    /// Target file id (None if the target never resolved).
    pub to: Option<String>,
}

/// A traversed link, carrying the logical path of the other endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLink {
    pub id: String,
    pub link_type: LinkType,
    pub from: String,
    pub to: String,
    /// `url_path` of the target for forward traversal, of the source for
    /// backward traversal.
    pub url_path: String,
}

/// Query filter for listing files. All set fields must match.
#[derive(Debug, Clone, Default)]
pub struct FileQuery {
    /// Folder prefix of `url_path` (a trailing `/` is ignored).
    pub folder: Option<String>,
    /// File must carry at least one of these tags.
    pub tags: Option<Vec<String>>,
    /// File must have one of these filetypes.
    pub filetypes: Option<Vec<String>>,
    /// Exact `url_path`.
    pub url_path: Option<String>,
}

/// Options for link traversal.
#[derive(Debug, Clone)]
pub struct LinkQuery {
    pub file_id: String,
    pub direction: Direction,
    pub link_type: Option<LinkType>,
}

impl LinkQuery {
    /// Outgoing links of `file_id`, any type.
    pub fn forward(file_id: impl Into<String>) -> Self {
        Self { file_id: file_id.into(), direction: Direction::Forward, link_type: None }
    }

    /// Incoming links of `file_id`, any type.
    pub fn backward(file_id: impl Into<String>) -> Self {
        Self { file_id: file_id.into(), direction: Direction::Backward, link_type: None }
    }

    pub fn with_link_type(mut self, link_type: LinkType) -> Self {
        self.link_type = Some(link_type);
        self
    }
}
