//! Index building orchestration.
//!
//! A run is a full rebuild in two phases:
//!
//! 1. files, tags and file/tag edges are inserted;
//! 2. each link target is resolved against the `files` table written in
//!    phase 1, then links are inserted.
//!
//! Both phases, together with wiping the previous contents, happen inside
//! one transaction. A failed run leaves the previous index untouched.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use regex::Regex;
use thiserror::Error;

use super::db::{IndexDb, IndexError};
use super::types::{FileTag, IndexedFile, IndexedLink};
use crate::content::{ClassifiedFile, ContentWalker, ContentWalkerError, classify};
use crate::wikilink::{FileLink, LinkParser, WikiLinkParser, slugify};

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("Content walker error: {0}")]
    Walker(#[from] ContentWalkerError),

    #[error("Index database error: {0}")]
    Index(#[from] IndexError),

    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl From<rusqlite::Error> for BuilderError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Index(IndexError::Database(e))
    }
}

/// Statistics from an indexing operation.
#[derive(Debug, Clone, Default)]
pub struct IndexStats {
    /// Number of files discovered.
    pub files_found: usize,
    /// Number of files written to the index.
    pub files_indexed: usize,
    /// Number of files skipped due to errors.
    pub files_skipped: usize,
    /// Number of files matching an ignore pattern.
    pub files_ignored: usize,
    /// Number of distinct tags.
    pub tags_indexed: usize,
    /// Number of links indexed.
    pub links_indexed: usize,
    /// Number of links whose target did not resolve.
    pub broken_links: usize,
    /// Indexing duration in milliseconds.
    pub duration_ms: u64,
}

/// Progress callback for indexing operations.
/// Parameters: (current, total, current_path)
pub type ProgressCallback = Box<dyn Fn(usize, usize, &str)>;

/// Why a classified file could not join the index.
#[derive(Debug, Error)]
pub enum AccumulateError {
    #[error("url path '{url_path}' is already taken by {holder}")]
    UrlPathTaken { url_path: String, holder: String },
}

/// Collects records from classified files before they are written.
///
/// Files are folded in one at a time from a single place, so classification
/// itself can run in parallel without shared state.
///
/// Logical paths are unique among markdown files only. A non-markdown file
/// whose path collides with a markdown file's logical path is kept but
/// stored without a `url_path`.
#[derive(Debug, Default)]
pub struct IndexAccumulator {
    files: Vec<IndexedFile>,
    unaddressed: Vec<IndexedFile>,
    tags: Vec<String>,
    file_tags: Vec<FileTag>,
    links: Vec<FileLink>,
    seen_tags: HashSet<String>,
    by_url_path: HashMap<String, usize>,
}

impl IndexAccumulator {
    /// Add a classified file.
    ///
    /// Fails when another markdown file already holds the same `url_path`;
    /// the new file is then left out.
    pub fn push(&mut self, classified: ClassifiedFile) -> Result<(), AccumulateError> {
        let ClassifiedFile { mut file, links } = classified;

        let slot = match self.by_url_path.get(&file.url_path).copied() {
            None => None,
            Some(pos) => match (self.files[pos].is_markdown(), file.is_markdown()) {
                (false, true) => Some(pos),
                (true, false) => {
                    tracing::warn!(
                        "{} shares its url path with {}, storing it without one",
                        file.path,
                        self.files[pos].path
                    );
                    self.unaddressed.push(file);
                    return Ok(());
                }
                _ => {
                    return Err(AccumulateError::UrlPathTaken {
                        url_path: file.url_path,
                        holder: self.files[pos].path.clone(),
                    });
                }
            },
        };

        for tag in file.tags.take().unwrap_or_default() {
            if self.seen_tags.insert(tag.clone()) {
                self.tags.push(tag.clone());
            }
            self.file_tags.push(FileTag { tag, file: file.id.clone() });
        }
        self.links.extend(links);

        match slot {
            Some(pos) => {
                let asset = std::mem::replace(&mut self.files[pos], file);
                tracing::warn!(
                    "{} shares its url path with {}, storing it without one",
                    asset.path,
                    self.files[pos].path
                );
                self.unaddressed.push(asset);
            }
            None => {
                self.by_url_path.insert(file.url_path.clone(), self.files.len());
                self.files.push(file);
            }
        }
        Ok(())
    }

    /// Files holding a `url_path`, in walk order.
    pub fn files(&self) -> &[IndexedFile] {
        &self.files
    }

    /// Distinct tags in first-seen order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Non-markdown files stored without a `url_path`.
    pub fn unaddressed(&self) -> &[IndexedFile] {
        &self.unaddressed
    }

    pub fn file_tags(&self) -> &[FileTag] {
        &self.file_tags
    }

    /// Raw links, targets unresolved.
    pub fn links(&self) -> &[FileLink] {
        &self.links
    }
}

/// Builder for populating the content index.
pub struct IndexBuilder<'a> {
    db: &'a IndexDb,
    root: &'a Path,
    ignore_patterns: Vec<Regex>,
    excluded_folders: Vec<PathBuf>,
    parser: Box<dyn LinkParser>,
}

impl<'a> IndexBuilder<'a> {
    /// Create a new index builder using the default wiki-link parser.
    pub fn new(db: &'a IndexDb, root: &'a Path) -> Self {
        Self {
            db,
            root,
            ignore_patterns: Vec::new(),
            excluded_folders: Vec::new(),
            parser: Box::new(WikiLinkParser::default()),
        }
    }

    /// Leave out files whose `url_path` matches any of these patterns.
    pub fn with_ignore_patterns(mut self, patterns: Vec<Regex>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Do not descend into these folders (relative to the root).
    pub fn with_excluded_folders(mut self, folders: Vec<PathBuf>) -> Self {
        self.excluded_folders = folders;
        self
    }

    /// Use a different link parser.
    pub fn with_parser(mut self, parser: Box<dyn LinkParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Perform a full reindex of the content root.
    /// Clears existing data and rebuilds from scratch.
    pub fn full_reindex(
        &self,
        progress: Option<ProgressCallback>,
    ) -> Result<IndexStats, BuilderError> {
        let start = Instant::now();
        let mut stats = IndexStats::default();

        let walker = ContentWalker::with_exclusions(self.root, self.excluded_folders.clone())?;
        let walked = walker.walk()?;
        stats.files_found = walked.len();

        let parser = self.parser.as_ref();
        let classified: Vec<_> = walked.par_iter().map(|file| classify(file, parser)).collect();

        let mut acc = IndexAccumulator::default();
        for (i, (file, result)) in walked.iter().zip(classified).enumerate() {
            let relative = file.relative_slash_path();
            if let Some(ref cb) = progress {
                cb(i + 1, walked.len(), &relative);
            }

            let classified = match result {
                Ok(classified) => classified,
                Err(e) => {
                    tracing::warn!("Failed to parse {relative}, skipping: {e}");
                    stats.files_skipped += 1;
                    continue;
                }
            };

            if self.is_ignored(&classified.file.url_path) {
                tracing::debug!("Ignoring {relative}");
                stats.files_ignored += 1;
                continue;
            }

            match acc.push(classified) {
                Ok(()) => tracing::debug!("Classified {relative}"),
                Err(e) => {
                    tracing::warn!("Skipping {relative}: {e}");
                    stats.files_skipped += 1;
                }
            }
        }

        let tx = self.db.connection().unchecked_transaction()?;
        self.db.ensure_schema()?;
        self.db.wipe()?;

        // Phase 1: files, tags and memberships
        stats.files_indexed = self.db.insert_files(acc.files())?
            + self.db.insert_unaddressed_files(acc.unaddressed())?;
        stats.tags_indexed = self.db.insert_tags(acc.tags())?;
        self.db.insert_file_tags(acc.file_tags())?;

        // Phase 2: resolve targets against the files written above
        let links = self.resolve_links(acc.links(), &slug_index(acc.files()))?;
        stats.broken_links = links.iter().filter(|l| l.to.is_none()).count();
        stats.links_indexed = self.db.insert_links(&links)?;

        tx.commit()?;

        stats.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            files = stats.files_indexed,
            skipped = stats.files_skipped,
            ignored = stats.files_ignored,
            tags = stats.tags_indexed,
            links = stats.links_indexed,
            broken = stats.broken_links,
            "Indexed {}",
            walker.root().display()
        );
        Ok(stats)
    }

    fn is_ignored(&self, url_path: &str) -> bool {
        self.ignore_patterns.iter().any(|re| re.is_match(url_path))
    }

    fn resolve_links(
        &self,
        raw: &[FileLink],
        slugs: &HashMap<String, String>,
    ) -> Result<Vec<IndexedLink>, IndexError> {
        raw.iter()
            .map(|link| -> Result<IndexedLink, IndexError> {
                let target = link.target.strip_prefix('/').unwrap_or(&link.target);
                let to = match self.db.file_id_for_url_path(target)? {
                    Some(id) => Some(id),
                    None => slugs.get(target).cloned(),
                };
                Ok(IndexedLink {
                    id: link.id.clone(),
                    link_type: link.link_type,
                    from: link.from.clone(),
                    to,
                })
            })
            .collect()
    }
}

/// Markdown files keyed by their slugified logical path, so slugified link
/// targets reach files named with capitals or spaces. First in walk order
/// wins.
fn slug_index(files: &[IndexedFile]) -> HashMap<String, String> {
    let mut slugs = HashMap::new();
    for file in files.iter().filter(|f| f.is_markdown()) {
        let slug = file.url_path.split('/').map(slugify).collect::<Vec<_>>().join("/");
        slugs.entry(slug).or_insert_with(|| file.id.clone());
    }
    slugs
}

/// Compile ignore patterns, failing on the first invalid one.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, BuilderError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p)
                .map_err(|source| BuilderError::InvalidPattern { pattern: p.clone(), source })
        })
        .collect()
}

/// Index `root` into the database at `db_path`, replacing its contents.
///
/// The database handle is closed before returning, whether the run
/// succeeded or not.
pub fn index_folder(
    db_path: &Path,
    root: &Path,
    ignore_patterns: &[String],
) -> Result<IndexStats, BuilderError> {
    let patterns = compile_patterns(ignore_patterns)?;
    let db = IndexDb::open(db_path)?;

    let result =
        IndexBuilder::new(&db, root).with_ignore_patterns(patterns).full_reindex(None);
    let closed = db.close();

    let stats = result?;
    closed?;
    Ok(stats)
}
