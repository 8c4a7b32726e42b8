//! List command implementation.

use mddb_core::index::FileQuery;

use super::output::{print_files_json, print_files_quiet, print_files_table};
use crate::{GlobalArgs, ListArgs, OutputFormat};

pub fn run(global: &GlobalArgs, args: ListArgs) {
    let rc = super::load_config(global);
    let db = super::open_index(&rc);

    // Repeatable flags left unset mean "no filter", not "match nothing"
    let query = FileQuery {
        folder: args.folder,
        tags: (!args.tags.is_empty()).then_some(args.tags),
        filetypes: (!args.extensions.is_empty()).then_some(args.extensions),
        url_path: args.url_path,
    };

    let files = match db.list_files(&query) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error querying files: {}", e);
            std::process::exit(1);
        }
    };

    match super::resolve_format(args.output, args.json, args.quiet) {
        OutputFormat::Table => print_files_table(&files),
        OutputFormat::Json => print_files_json(&files),
        OutputFormat::Quiet => print_files_quiet(&files),
    }
}
