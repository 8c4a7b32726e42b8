//! Tags command implementation.

use crate::{GlobalArgs, TagsArgs};

pub fn run(global: &GlobalArgs, args: TagsArgs) {
    let rc = super::load_config(global);
    let db = super::open_index(&rc);

    let tags = match db.get_tags() {
        Ok(tags) => tags,
        Err(e) => {
            eprintln!("Error querying tags: {}", e);
            std::process::exit(1);
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tags).unwrap_or_default());
    } else {
        for tag in &tags {
            println!("{}", tag);
        }
    }
}
