//! Index command implementation.

use std::io::Write;

use mddb_core::index::{IndexBuilder, IndexDb, ProgressCallback, compile_patterns};

use crate::{GlobalArgs, IndexArgs};

/// Run the index command.
pub fn run(global: &GlobalArgs, args: IndexArgs) {
    let rc = super::load_config(global);

    // Profile patterns first, then the ones given on the command line
    let mut patterns = rc.ignore_patterns.clone();
    patterns.extend(args.ignore);
    let patterns = match compile_patterns(&patterns) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Nothing is created on disk for a root that cannot be indexed
    if !rc.content_root.is_dir() {
        eprintln!("Error: content root is not a directory: {}", rc.content_root.display());
        std::process::exit(1);
    }

    if let Some(parent) = rc.database.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        eprintln!("Error creating index directory: {}", e);
        std::process::exit(1);
    }

    let db = match IndexDb::open(&rc.database) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error opening index database: {}", e);
            std::process::exit(1);
        }
    };

    println!("Indexing content: {}", rc.content_root.display());

    let verbose = args.verbose;
    let progress: ProgressCallback = if verbose {
        Box::new(|current, total, path| {
            println!("[{}/{}] {}", current, total, path);
        })
    } else {
        Box::new(|current, total, _path| {
            if current % 50 == 0 || current == total {
                print!("\rIndexing... {}/{}", current, total);
                std::io::stdout().flush().ok();
            }
        })
    };

    let result = IndexBuilder::new(&db, &rc.content_root)
        .with_ignore_patterns(patterns)
        .with_excluded_folders(rc.excluded_folders.clone())
        .full_reindex(Some(progress));

    if let Err(e) = db.close() {
        tracing::warn!("Failed to close index database: {e}");
    }

    match result {
        Ok(stats) => {
            if !verbose && stats.files_found > 0 {
                println!(); // Newline after progress
            }
            println!();
            println!("Indexing complete:");
            println!("  Files found:    {}", stats.files_found);
            println!("  Files indexed:  {}", stats.files_indexed);
            if stats.files_skipped > 0 {
                println!("  Files skipped:  {}", stats.files_skipped);
            }
            if stats.files_ignored > 0 {
                println!("  Files ignored:  {}", stats.files_ignored);
            }
            println!("  Tags indexed:   {}", stats.tags_indexed);
            println!("  Links indexed:  {}", stats.links_indexed);
            println!("  Broken links:   {}", stats.broken_links);
            println!("  Duration:       {}ms", stats.duration_ms);
            println!();
            println!("Index stored at: {}", rc.database.display());
        }
        Err(e) => {
            eprintln!("\nError during indexing: {}", e);
            std::process::exit(1);
        }
    }
}
