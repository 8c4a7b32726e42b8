//! Frontmatter parsing from markdown documents.

use super::types::{Frontmatter, ParsedDocument};
use thiserror::Error;

/// Errors that can occur during frontmatter parsing.
#[derive(Debug, Error)]
pub enum FrontmatterParseError {
    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Parse frontmatter from markdown content.
///
/// Frontmatter is delimited by `---` at the start of the document:
/// ```markdown
/// ---
/// key: value
/// ---
/// # Document content
/// ```
pub fn parse(content: &str) -> Result<ParsedDocument, FrontmatterParseError> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();

    let Some(after_first) = trimmed.strip_prefix("---") else {
        return Ok(ParsedDocument { frontmatter: None, body: content.to_string() });
    };

    // `----` or `--- title` is not a delimiter line
    let Some(after_newline) =
        after_first.strip_prefix('\n').or_else(|| after_first.strip_prefix("\r\n"))
    else {
        return Ok(ParsedDocument { frontmatter: None, body: content.to_string() });
    };

    let Some((end_pos, body_pos)) = find_closing_delimiter(after_newline) else {
        // No closing ---, treat as no frontmatter
        return Ok(ParsedDocument { frontmatter: None, body: content.to_string() });
    };

    let yaml_content = &after_newline[..end_pos];
    let body = after_newline[body_pos..].to_string();

    let frontmatter: Frontmatter = if yaml_content.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml_content)?
    };

    Ok(ParsedDocument { frontmatter: Some(frontmatter), body })
}

/// Find the closing `---` line.
/// Returns the byte offset where the delimiter line starts and the offset
/// just past it (where the body begins).
fn find_closing_delimiter(content: &str) -> Option<(usize, usize)> {
    let mut pos = 0;
    for line in content.split_inclusive('\n') {
        if line.trim() == "---" {
            return Some((pos, pos + line.len()));
        }
        pos += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn title(doc: &ParsedDocument) -> Option<&str> {
        doc.frontmatter.as_ref()?.fields.get("title")?.as_str()
    }

    #[rstest]
    #[case::lf("---\ntitle: Blog 1\n---\n# Blog 1", "# Blog 1")]
    #[case::crlf("---\r\ntitle: Blog 1\r\n---\r\n# Blog 1", "# Blog 1")]
    #[case::bom("\u{feff}---\ntitle: Blog 1\n---\n# Blog 1", "# Blog 1")]
    #[case::blank_line_kept("---\ntitle: Blog 1\n---\n\n# Blog 1", "\n# Blog 1")]
    #[case::closing_at_eof("---\ntitle: Blog 1\n---", "")]
    fn splits_block_from_body(#[case] content: &str, #[case] body: &str) {
        let doc = parse(content).unwrap();
        assert_eq!(title(&doc), Some("Blog 1"));
        assert_eq!(doc.body, body);
    }

    #[rstest]
    #[case::plain("# Blog 1\n\n[[blog/blog2]]")]
    #[case::unclosed("---\ntitle: Blog 1\n# Blog 1")]
    #[case::thematic_break("----\nnot yaml\n----\n")]
    #[case::dashes_with_text("--- intro\ntitle: x\n---\n")]
    fn without_block_the_whole_file_is_body(#[case] content: &str) {
        let doc = parse(content).unwrap();
        assert!(doc.frontmatter.is_none());
        assert_eq!(doc.body, content);
    }

    #[test]
    fn empty_block_yields_empty_frontmatter() {
        let doc = parse("---\n---\nBody").unwrap();
        assert!(doc.frontmatter.unwrap().fields.is_empty());
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn block_fields_are_typed() {
        let doc =
            parse("---\ntype: post\ndraft: false\ntags:\n  - economy\n  - rust\n---\n")
                .unwrap();
        let fm = doc.frontmatter.unwrap();
        assert_eq!(fm.declared_type(), Some("post"));
        assert_eq!(fm.fields.get("draft").and_then(|v| v.as_bool()), Some(false));
        assert_eq!(fm.tags(), vec!["economy", "rust"]);
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = parse("---\ntags: [economy\n---\nBody");
        assert!(matches!(result, Err(FrontmatterParseError::InvalidYaml(_))));
    }
}
