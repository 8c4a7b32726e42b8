pub mod config;
pub mod content;
pub mod frontmatter;
pub mod index;
pub mod wikilink;
