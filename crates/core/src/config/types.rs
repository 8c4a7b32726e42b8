use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Database file name used when no configuration names one.
pub const DEFAULT_DATABASE: &str = "markdown.db";

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub content_root: String,
    /// Database file; may reference `{{content_root}}`.
    #[serde(default = "default_database")]
    pub database: String,
    /// Regexes matched against each file's logical path.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Folders to skip while walking (relative to content_root).
    #[serde(default)]
    pub excluded_folders: Vec<String>,
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    pub content_root: PathBuf,
    pub database: PathBuf,
    pub ignore_patterns: Vec<String>,
    /// Folders to skip while walking, relative to `content_root`.
    pub excluded_folders: Vec<PathBuf>,
    pub logging: LoggingConfig,
}

impl ResolvedConfig {
    /// Configuration used when no config file exists: index `content_root`
    /// into `markdown.db` in the working directory.
    pub fn for_root(content_root: &Path) -> Self {
        Self {
            active_profile: "default".to_string(),
            content_root: content_root.to_path_buf(),
            database: PathBuf::from(DEFAULT_DATABASE),
            ignore_patterns: Vec::new(),
            excluded_folders: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}
