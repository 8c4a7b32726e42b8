//! Attach raw links to the file that contains them.

use serde::Serialize;

use super::parser::{LinkParseError, LinkParser, RawLink};
use crate::content::hasher::id_for;
use crate::index::types::LinkType;

/// A link extracted from a file, with its target not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLink {
    /// Content-addressed link id.
    pub id: String,
    /// Id of the containing file.
    pub from: String,
    /// Root-relative target path with a leading `/`.
    pub target: String,
    pub link_type: LinkType,
}

#[derive(Serialize)]
struct LinkRecord<'a> {
    from: &'a str,
    target: &'a str,
    fragment: Option<&'a str>,
    kind: LinkType,
}

/// Id of a raw link found in the file at `from_path`.
///
/// Hashes the JSON form of the whole record, so two references between the
/// same files that differ in heading or kind get distinct ids.
pub fn link_id(raw: &RawLink, from_path: &str) -> String {
    let record = LinkRecord {
        from: from_path,
        target: &raw.target,
        fragment: raw.fragment.as_deref(),
        kind: raw.kind,
    };
    // Serializing plain strings and a unit enum cannot fail
    let encoded = serde_json::to_string(&record).unwrap_or_default();
    id_for(&encoded)
}

/// Run `parser` over `source` and attach each link to the containing file.
///
/// Repeated identical references collapse into one link.
pub fn extract_file_links(
    parser: &dyn LinkParser,
    source: &str,
    source_path: &str,
    from_id: &str,
    from_path: &str,
) -> Result<Vec<FileLink>, LinkParseError> {
    let raw_links = parser.extract_links(source, source_path)?;

    let mut links: Vec<FileLink> = Vec::with_capacity(raw_links.len());
    for raw in raw_links {
        let id = link_id(&raw, from_path);
        if links.iter().any(|l| l.id == id) {
            continue;
        }
        links.push(FileLink {
            id,
            from: from_id.to_string(),
            target: raw.target,
            link_type: raw.kind,
        });
    }

    Ok(links)
}
