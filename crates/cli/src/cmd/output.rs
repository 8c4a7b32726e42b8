//! Shared output formatting for query commands.

use mddb_core::index::{IndexedFile, ResolvedLink};

/// Print files as a table.
pub fn print_files_table(files: &[IndexedFile]) {
    if files.is_empty() {
        println!("(no files found)");
        return;
    }

    let path_width = files
        .iter()
        .map(|f| display_url_path(&f.url_path).len())
        .max()
        .unwrap_or(8)
        .clamp(8, 50);
    let type_width = 6;

    println!(
        "{:<path_width$}  {:<type_width$}  TAGS",
        "URL_PATH",
        "EXT",
        path_width = path_width,
        type_width = type_width,
    );
    println!(
        "{:-<path_width$}  {:-<type_width$}  {:-<20}",
        "",
        "",
        "",
        path_width = path_width,
        type_width = type_width,
    );

    for file in files {
        let path = truncate(display_url_path(&file.url_path), path_width);
        let tags = file.tags.as_ref().map(|t| t.join(", ")).unwrap_or_default();

        println!(
            "{:<path_width$}  {:<type_width$}  {}",
            path,
            file.filetype,
            tags,
            path_width = path_width,
            type_width = type_width,
        );
    }

    println!();
    println!("-- {} files --", files.len());
}

/// Print files as JSON.
pub fn print_files_json(files: &[IndexedFile]) {
    println!("{}", serde_json::to_string_pretty(files).unwrap_or_default());
}

/// Print files as filesystem paths only (quiet mode).
pub fn print_files_quiet(files: &[IndexedFile]) {
    for file in files {
        println!("{}", file.path);
    }
}

/// Print links as a table.
pub fn print_links_table(links: &[ResolvedLink], direction: &str) {
    if links.is_empty() {
        println!("(no {} found)", direction);
        return;
    }

    let path_width = links
        .iter()
        .map(|l| display_url_path(&l.url_path).len())
        .max()
        .unwrap_or(8)
        .clamp(8, 50);

    println!("{:<path_width$}  LINK_TYPE", "URL_PATH", path_width = path_width);
    println!("{:-<path_width$}  {:-<9}", "", "", path_width = path_width);

    for link in links {
        let path = truncate(display_url_path(&link.url_path), path_width);
        println!("{:<path_width$}  {}", path, link.link_type, path_width = path_width);
    }

    println!();
    println!("-- {} {} --", links.len(), direction);
}

/// Print links as JSON.
pub fn print_links_json(links: &[ResolvedLink]) {
    println!("{}", serde_json::to_string_pretty(links).unwrap_or_default());
}

/// Print the other endpoint of each link (quiet mode).
pub fn print_links_quiet(links: &[ResolvedLink]) {
    for link in links {
        println!("{}", display_url_path(&link.url_path));
    }
}

/// The root landing page has an empty logical path.
pub fn display_url_path(url_path: &str) -> &str {
    if url_path.is_empty() { "/" } else { url_path }
}

/// Truncate string with ellipsis if needed.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
