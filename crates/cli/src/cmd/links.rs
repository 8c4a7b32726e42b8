//! Links command implementation.

use mddb_core::index::LinkQuery;

use super::output::{
    display_url_path, print_links_json, print_links_quiet, print_links_table,
};
use crate::{GlobalArgs, LinksArgs, OutputFormat};

pub fn run(global: &GlobalArgs, args: LinksArgs) {
    let rc = super::load_config(global);
    let db = super::open_index(&rc);

    let url_path = normalize_url_path(&args.url_path);

    let file = match db.get_file_by_url_path(url_path) {
        Ok(Some(f)) => f,
        Ok(None) => {
            eprintln!("File not found in index: {}", display_url_path(url_path));
            eprintln!("Hint: Check the path or run 'mddb index'.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error looking up file: {}", e);
            std::process::exit(1);
        }
    };

    let mut query = if args.backlinks {
        LinkQuery::backward(&file.id)
    } else {
        LinkQuery::forward(&file.id)
    };
    if let Some(kind) = args.link_type {
        query = query.with_link_type(kind.into());
    }

    let links = match db.get_links(&query) {
        Ok(links) => links,
        Err(e) => {
            eprintln!("Error getting links: {}", e);
            std::process::exit(1);
        }
    };

    let direction = if args.backlinks { "backlinks" } else { "outgoing links" };
    match super::resolve_format(args.output, args.json, args.quiet) {
        OutputFormat::Table => print_links_table(&links, direction),
        OutputFormat::Json => print_links_json(&links),
        OutputFormat::Quiet => print_links_quiet(&links),
    }
}

/// Accept "./blog/post", "/blog/post" and "blog/post/" for "blog/post".
fn normalize_url_path(path: &str) -> &str {
    let path = path.strip_prefix("./").unwrap_or(path);
    path.trim_matches('/')
}
