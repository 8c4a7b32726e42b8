//! Recursive content folder walker.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum ContentWalkerError {
    #[error("content root does not exist: {0}")]
    MissingRoot(String),

    #[error("content root is not a directory: {0}")]
    NotADirectory(String),

    #[error("failed to walk content directory {0}: {1}")]
    WalkError(String, #[source] walkdir::Error),
}

/// A regular file discovered under the content root.
#[derive(Debug, Clone)]
pub struct WalkedFile {
    /// Absolute path to the file.
    pub absolute_path: PathBuf,
    /// Path relative to the content root.
    pub relative_path: PathBuf,
}

impl WalkedFile {
    /// Relative path with `/` separators regardless of platform.
    pub fn relative_slash_path(&self) -> String {
        self.relative_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Walker for discovering every file in a content folder.
#[derive(Debug)]
pub struct ContentWalker {
    root: PathBuf,
    /// Folders to exclude from walking (relative paths from the content root).
    excluded_folders: Vec<PathBuf>,
}

impl ContentWalker {
    /// Create a new walker for the given content root.
    pub fn new(root: &Path) -> Result<Self, ContentWalkerError> {
        Self::with_exclusions(root, Vec::new())
    }

    /// Create a new walker with folder exclusions.
    ///
    /// Excluded folders can be specified as:
    /// - Relative paths from the content root (e.g., "drafts/private")
    /// - Absolute paths (will be converted to relative)
    pub fn with_exclusions(
        root: &Path,
        excluded_folders: Vec<PathBuf>,
    ) -> Result<Self, ContentWalkerError> {
        let root = root
            .canonicalize()
            .map_err(|_| ContentWalkerError::MissingRoot(root.display().to_string()))?;

        if !root.is_dir() {
            return Err(ContentWalkerError::NotADirectory(root.display().to_string()));
        }

        let excluded_folders = excluded_folders
            .into_iter()
            .map(|p| {
                if p.is_absolute() {
                    p.strip_prefix(&root).unwrap_or(&p).to_path_buf()
                } else {
                    p
                }
            })
            .collect();

        Ok(Self { root, excluded_folders })
    }

    /// Walk the content root depth first and return every regular file,
    /// sorted by relative path.
    pub fn walk(&self) -> Result<Vec<WalkedFile>, ContentWalkerError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e))
        {
            let entry = entry.map_err(|e| {
                ContentWalkerError::WalkError(self.root.display().to_string(), e)
            })?;

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative_path =
                path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();

            files.push(WalkedFile { absolute_path: path.to_path_buf(), relative_path });
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    fn is_excluded(&self, entry: &walkdir::DirEntry) -> bool {
        // Never filter the root directory (depth 0)
        if entry.depth() == 0 || self.excluded_folders.is_empty() {
            return false;
        }

        match entry.path().strip_prefix(&self.root) {
            Ok(relative) => self.excluded_folders.iter().any(|ex| relative.starts_with(ex)),
            Err(_) => false,
        }
    }

    /// Get the canonical content root path.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_content() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::write(root.join("index.md"), "# Home").unwrap();
        fs::write(root.join("about.mdx"), "# About").unwrap();

        fs::create_dir(root.join("blog")).unwrap();
        fs::write(root.join("blog/post.md"), "# Post").unwrap();

        fs::create_dir(root.join("assets")).unwrap();
        fs::write(root.join("assets/logo.png"), [0x89, 0x50, 0x4e, 0x47]).unwrap();

        dir
    }

    #[test]
    fn test_walk_finds_all_files() {
        let content = create_test_content();
        let walker = ContentWalker::new(content.path()).unwrap();
        let files = walker.walk().unwrap();

        assert_eq!(files.len(), 4);

        let paths: Vec<_> = files.iter().map(|f| f.relative_slash_path()).collect();
        assert!(paths.contains(&"index.md".to_string()));
        assert!(paths.contains(&"about.mdx".to_string()));
        assert!(paths.contains(&"blog/post.md".to_string()));
        assert!(paths.contains(&"assets/logo.png".to_string()));
    }

    #[test]
    fn test_walk_includes_hidden_files() {
        let content = create_test_content();
        fs::write(content.path().join(".nojekyll"), "").unwrap();

        let walker = ContentWalker::new(content.path()).unwrap();
        let files = walker.walk().unwrap();

        assert_eq!(files.len(), 5);
    }

    #[test]
    fn test_walk_results_sorted() {
        let content = create_test_content();
        let walker = ContentWalker::new(content.path()).unwrap();
        let files = walker.walk().unwrap();

        let paths: Vec<_> = files.iter().map(|f| &f.relative_path).collect();
        let mut sorted = paths.clone();
        sorted.sort();

        assert_eq!(paths, sorted);
    }

    #[test]
    fn test_missing_root() {
        let result = ContentWalker::new(Path::new("/nonexistent/path"));
        assert!(matches!(result.unwrap_err(), ContentWalkerError::MissingRoot(_)));
    }

    #[test]
    fn test_root_is_file() {
        let content = create_test_content();
        let result = ContentWalker::new(&content.path().join("index.md"));
        assert!(matches!(result.unwrap_err(), ContentWalkerError::NotADirectory(_)));
    }

    #[test]
    fn test_walk_with_exclusions() {
        let content = create_test_content();
        let walker =
            ContentWalker::with_exclusions(content.path(), vec![PathBuf::from("assets")])
                .unwrap();
        let files = walker.walk().unwrap();

        assert_eq!(files.len(), 3);
        assert!(!files.iter().any(|f| f.relative_slash_path().starts_with("assets")));
    }
}
