//! Wiki-link syntax parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::index::types::LinkType;

#[derive(Debug, Error)]
pub enum LinkParseError {
    #[error("malformed link markup on line {line}: {message}")]
    Malformed { line: u32, message: String },
}

/// A link as produced by a parser, before it is attached to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawLink {
    /// Root-relative target path with a leading `/` (e.g. `/blog/post`).
    pub target: String,
    /// Heading anchor within the target, slugified.
    pub fragment: Option<String>,
    /// Reference or transclusion.
    pub kind: LinkType,
}

/// Capability for extracting links from a markdown source.
///
/// `source_path` is the logical path of the containing file (leading `/`,
/// no extension); relative targets resolve against its folder.
pub trait LinkParser: Send + Sync {
    fn extract_links(
        &self,
        source: &str,
        source_path: &str,
    ) -> Result<Vec<RawLink>, LinkParseError>;
}

/// Options for [`WikiLinkParser`].
#[derive(Debug, Clone)]
pub struct WikiLinkOptions {
    /// Separates the target from the display alias.
    pub alias_divider: char,
    /// Lowercase note targets and turn whitespace into `-`.
    pub slugify: bool,
}

impl Default for WikiLinkOptions {
    fn default() -> Self {
        Self { alias_divider: '|', slugify: true }
    }
}

/// Regex-based parser for Obsidian-style wiki links.
#[derive(Debug, Clone, Default)]
pub struct WikiLinkParser {
    options: WikiLinkOptions,
}

// Matches [[inner]] with an optional leading ! for embeds
static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[\[([^\[\]\n]+)\]\]").unwrap());

static INLINE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(`+)[^`]*?(`+)").unwrap());

impl WikiLinkParser {
    pub fn new(options: WikiLinkOptions) -> Self {
        Self { options }
    }

    fn parse_inner(&self, inner: &str, embed: bool, source_path: &str) -> Option<RawLink> {
        let target_part = match inner.split_once(self.options.alias_divider) {
            Some((target, _alias)) => target,
            None => inner,
        };

        let (path, heading) = match target_part.split_once('#') {
            Some((path, heading)) => (path, Some(heading)),
            None => (target_part, None),
        };

        let target = normalize_target(path, source_path, self.options.slugify)?;
        let fragment = heading.map(slugify).filter(|h| !h.is_empty());
        let kind = if embed { LinkType::Embed } else { LinkType::Normal };

        Some(RawLink { target, fragment, kind })
    }
}

impl LinkParser for WikiLinkParser {
    fn extract_links(
        &self,
        source: &str,
        source_path: &str,
    ) -> Result<Vec<RawLink>, LinkParseError> {
        let mut links = Vec::new();
        let mut fence: Option<&str> = None;

        for line in source.lines() {
            let trimmed = line.trim_start();

            if let Some(open) = fence {
                if trimmed.starts_with(open) {
                    fence = None;
                }
                continue;
            }
            if trimmed.starts_with("```") {
                fence = Some("```");
                continue;
            }
            if trimmed.starts_with("~~~") {
                fence = Some("~~~");
                continue;
            }

            let line = INLINE_CODE_RE.replace_all(line, "");
            for cap in WIKILINK_RE.captures_iter(&line) {
                let embed = !cap[1].is_empty();
                if let Some(link) = self.parse_inner(&cap[2], embed, source_path) {
                    links.push(link);
                }
            }
        }

        Ok(links)
    }
}

/// Lowercase and turn whitespace runs into `-`.
pub fn slugify(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join("-").to_lowercase()
}

/// Turn a raw target into a root-relative path with a leading `/`.
/// Returns `None` for targets without a path (e.g. `[[#heading]]`).
fn normalize_target(path: &str, source_path: &str, slug: bool) -> Option<String> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }

    let mut segments: Vec<String> = Vec::new();
    if path.starts_with("./") || path.starts_with("../") {
        let mut folder: Vec<&str> =
            source_path.split('/').filter(|s| !s.is_empty()).collect();
        folder.pop();
        segments.extend(folder.into_iter().map(str::to_string));
    }

    for part in path.split('/') {
        match part.trim() {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            part => segments.push(part.to_string()),
        }
    }

    // Markdown targets lose their extension, anything else with an
    // extension is an asset and keeps its spelling
    let last = segments.pop()?;
    let split =
        last.rsplit_once('.').filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty());
    let (last, is_asset) = match split {
        Some((stem, ext))
            if ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("mdx") =>
        {
            (stem.to_string(), false)
        }
        Some(_) => (last.clone(), true),
        None => (last.clone(), false),
    };
    segments.push(last);

    if slug && !is_asset {
        segments = segments.iter().map(|s| slugify(s)).collect();
    }

    Some(format!("/{}", segments.join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(source: &str) -> Vec<RawLink> {
        WikiLinkParser::default().extract_links(source, "/blog/post").unwrap()
    }

    fn targets(source: &str) -> Vec<String> {
        links(source).into_iter().map(|l| l.target).collect()
    }

    #[test]
    fn test_simple_wikilink() {
        let found = links("See [[blog/blog1]] for details.");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].target, "/blog/blog1");
        assert_eq!(found[0].kind, LinkType::Normal);
        assert_eq!(found[0].fragment, None);
    }

    #[test]
    fn test_alias_is_dropped() {
        assert_eq!(targets("[[example/test|custom text]]"), vec!["/example/test"]);
    }

    #[test]
    fn test_custom_alias_divider() {
        let parser =
            WikiLinkParser::new(WikiLinkOptions { alias_divider: ':', slugify: true });
        let found = parser.extract_links("[[Real Page:Page Alias]]", "/index").unwrap();
        assert_eq!(found[0].target, "/real-page");
    }

    #[test]
    fn test_heading_becomes_fragment() {
        let found = links("[[example/test#With Heading|alias]]");
        assert_eq!(found[0].target, "/example/test");
        assert_eq!(found[0].fragment.as_deref(), Some("with-heading"));
    }

    #[test]
    fn test_in_page_heading_is_skipped() {
        assert!(links("Jump to [[#Heading]].").is_empty());
    }

    #[test]
    fn test_slugified_target() {
        assert_eq!(targets("[[New Page]]"), vec!["/new-page"]);
    }

    #[test]
    fn test_slugify_disabled() {
        let parser =
            WikiLinkParser::new(WikiLinkOptions { alias_divider: '|', slugify: false });
        let found = parser.extract_links("[[A Page]]", "/index").unwrap();
        assert_eq!(found[0].target, "/A Page");
    }

    #[test]
    fn test_markdown_extension_dropped() {
        assert_eq!(targets("[[notes/Idea.md]] [[notes/other.mdx]]"), vec![
            "/notes/idea",
            "/notes/other"
        ]);
    }

    #[test]
    fn test_embed_keeps_asset_name() {
        let found = links("![[assets/Test image.png]]");
        assert_eq!(found[0].kind, LinkType::Embed);
        assert_eq!(found[0].target, "/assets/Test image.png");
    }

    #[test]
    fn test_relative_targets() {
        assert_eq!(targets("[[./sibling]] [[../about]] [[../../too-far]]"), vec![
            "/blog/sibling",
            "/about",
            "/too-far"
        ]);
    }

    #[test]
    fn test_leading_slash_target() {
        assert_eq!(targets("[[/about]]"), vec!["/about"]);
    }

    #[test]
    fn test_code_is_ignored() {
        let source = "Inline `[[not-a-link]]` here.\n\n```\n[[also-not]]\n```\n\n~~~md\n[[nor-this]]\n~~~\n[[real]]";
        assert_eq!(targets(source), vec!["/real"]);
    }

    #[test]
    fn test_open_wikilink_is_ignored() {
        assert!(links("t[[\nt").is_empty());
        assert!(links("t [[").is_empty());
    }

    #[test]
    fn test_multiple_links_per_line() {
        assert_eq!(targets("[[a]] and ![[b]] and [[c|C]]"), vec!["/a", "/b", "/c"]);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("  Hello   World "), "hello-world");
        assert_eq!(slugify("blog2"), "blog2");
    }
}
