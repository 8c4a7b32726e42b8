use std::env::{self, VarError};
use std::fs;
use std::path::{Path, PathBuf};

use dirs::home_dir;
use regex::Regex;
use shellexpand::LookupError;
use thiserror::Error;

use crate::config::types::{ConfigFile, LoggingConfig, Profile, ResolvedConfig};

/// Placeholder replaced by the expanded content root in other path fields.
const CONTENT_ROOT_VAR: &str = "{{content_root}}";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(String),

    #[error("failed to read config file {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse TOML in {0}: {1}")]
    ParseError(String, #[source] toml::de::Error),

    #[error("version {0} is unsupported (expected 1)")]
    BadVersion(u32),

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),

    #[error("profile '{0}' has an empty content_root")]
    EmptyContentRoot(String),

    #[error("profile '{profile}' has an invalid ignore pattern '{pattern}': {source}")]
    InvalidIgnorePattern {
        profile: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot expand '{input}': {source}")]
    Expand {
        input: String,
        #[source]
        source: LookupError<VarError>,
    },
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load `config_path` (or the default location) and resolve the active
    /// profile: `profile_override`, then the file's `profile`, then `default`.
    pub fn load(
        config_path: Option<&Path>,
        profile_override: Option<&str>,
    ) -> Result<ResolvedConfig, ConfigError> {
        let path = config_path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
        let cf = read_config_file(&path)?;

        let active = profile_override
            .or(cf.profile.as_deref())
            .unwrap_or("default")
            .to_string();
        let prof = cf
            .profiles
            .get(&active)
            .ok_or_else(|| ConfigError::ProfileNotFound(active.clone()))?;

        resolve_profile(active, prof, &cf.logging)
    }
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let shown = path.display().to_string();
    if !path.exists() {
        return Err(ConfigError::NotFound(shown));
    }

    let raw = fs::read_to_string(path).map_err(|e| ConfigError::ReadError(shown.clone(), e))?;
    let cf: ConfigFile = toml::from_str(&raw).map_err(|e| ConfigError::ParseError(shown, e))?;

    if cf.version != 1 {
        return Err(ConfigError::BadVersion(cf.version));
    }
    Ok(cf)
}

fn resolve_profile(
    active: String,
    prof: &Profile,
    log_cfg: &LoggingConfig,
) -> Result<ResolvedConfig, ConfigError> {
    if prof.content_root.trim().is_empty() {
        return Err(ConfigError::EmptyContentRoot(active));
    }
    let content_root = expand_path(&prof.content_root)?;
    let root_str = content_root.to_string_lossy();
    let expand_in_root = |s: &str| expand_path(&s.replace(CONTENT_ROOT_VAR, &root_str));

    let database = expand_in_root(&prof.database)?;
    let excluded_folders = prof
        .excluded_folders
        .iter()
        .map(|f| expand_in_root(f))
        .collect::<Result<Vec<_>, _>>()?;

    // Rejected here so `doctor` reports a bad pattern before any run
    for pattern in &prof.ignore_patterns {
        Regex::new(pattern).map_err(|source| ConfigError::InvalidIgnorePattern {
            profile: active.clone(),
            pattern: pattern.clone(),
            source,
        })?;
    }

    let file = match &log_cfg.file {
        Some(file) => Some(expand_in_root(&file.to_string_lossy())?),
        None => None,
    };
    let logging = LoggingConfig { file, ..log_cfg.clone() };

    Ok(ResolvedConfig {
        active_profile: active,
        content_root,
        database,
        ignore_patterns: prof.ignore_patterns.clone(),
        excluded_folders,
        logging,
    })
}

/// `$XDG_CONFIG_HOME/mddb/config.toml`, falling back to `~/.config`.
pub fn default_config_path() -> PathBuf {
    let config_home = match env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => home_dir().unwrap_or_else(|| PathBuf::from("~")).join(".config"),
    };
    config_home.join("mddb").join("config.toml")
}

fn expand_path(input: &str) -> Result<PathBuf, ConfigError> {
    shellexpand::full(input)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|source| ConfigError::Expand { input: input.to_string(), source })
}
