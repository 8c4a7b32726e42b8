pub mod doctor;
pub mod index;
pub mod links;
pub mod list;
pub mod output;
pub mod tags;

use mddb_core::config::{ConfigError, ConfigLoader, ResolvedConfig};
use mddb_core::index::IndexDb;

use crate::{GlobalArgs, OutputFormat};

/// Load the active profile and apply `--root`/`--db` overrides.
///
/// Without a config file, `--root` alone is enough: the database then
/// defaults to `markdown.db` in the working directory.
pub fn resolve_config(global: &GlobalArgs) -> Result<ResolvedConfig, ConfigError> {
    let mut rc = match ConfigLoader::load(global.config.as_deref(), global.profile.as_deref())
    {
        Ok(rc) => rc,
        Err(e @ ConfigError::NotFound(_)) if global.config.is_none() => {
            match global.root.as_deref() {
                Some(root) => ResolvedConfig::for_root(root),
                None => return Err(e),
            }
        }
        Err(e) => return Err(e),
    };

    if let Some(ref root) = global.root {
        rc.content_root = root.clone();
    }
    if let Some(ref db) = global.db {
        rc.database = db.clone();
    }
    Ok(rc)
}

/// Resolve configuration and start logging, exiting on failure.
pub fn load_config(global: &GlobalArgs) -> ResolvedConfig {
    let rc = match resolve_config(global) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };
    init_logging(&rc);
    rc
}

/// Start logging as configured, exiting if the log file cannot be created.
pub fn init_logging(rc: &ResolvedConfig) {
    if let Err(e) = crate::logging::init(&rc.logging) {
        eprintln!("Failed to create log file: {}", e);
        std::process::exit(1);
    }
}

/// Open an existing index database, exiting if there is none.
pub fn open_index(rc: &ResolvedConfig) -> IndexDb {
    if !rc.database.exists() {
        eprintln!("No index found at {}", rc.database.display());
        eprintln!("Hint: Run 'mddb index' to build the index first.");
        std::process::exit(1);
    }
    match IndexDb::open(&rc.database) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error opening index: {}", e);
            std::process::exit(1);
        }
    }
}

/// Resolve the output format from flags.
pub fn resolve_format(output: OutputFormat, json: bool, quiet: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else if quiet {
        OutputFormat::Quiet
    } else {
        output
    }
}
