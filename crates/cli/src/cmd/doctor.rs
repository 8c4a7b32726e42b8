use mddb_core::config::default_config_path;
use mddb_core::index::IndexDb;

use crate::GlobalArgs;

pub fn run(global: &GlobalArgs) {
    let rc = match super::resolve_config(global) {
        Ok(rc) => rc,
        Err(e) => {
            println!("FAIL mddb doctor");
            println!("{e}");
            if global.config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    };
    super::init_logging(&rc);

    println!("OK   mddb doctor");
    println!(
        "path: {}",
        global.config.as_ref().map_or_else(
            || default_config_path().display().to_string(),
            |p| p.display().to_string()
        )
    );
    println!("profile: {}", rc.active_profile);
    println!("content_root: {}", rc.content_root.display());
    println!("database: {}", rc.database.display());
    println!("ignore_patterns: {}", rc.ignore_patterns.join(", "));
    println!(
        "excluded_folders: {}",
        rc.excluded_folders
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    if !rc.content_root.is_dir() {
        println!("warning: content_root is not a directory");
    }

    if !rc.database.exists() {
        println!("index: not built yet");
        return;
    }
    let summary = IndexDb::open(&rc.database).and_then(|db| {
        Ok((db.count_files()?, db.count_links()?, db.count_broken_links()?))
    });
    match summary {
        Ok((files, links, broken)) => {
            println!("index: {files} files, {links} links ({broken} broken)")
        }
        Err(e) => println!("index: unreadable ({e})"),
    }
}
