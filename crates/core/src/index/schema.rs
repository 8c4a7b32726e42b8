//! SQLite schema definition.
//!
//! Every index run is a full rebuild, so there are no migrations: tables are
//! created when absent and emptied with [`wipe`] before each run.

use rusqlite::Connection;
use thiserror::Error;

/// Tables in the order [`wipe`] empties them (children before parents).
pub const TABLES: [&str; 4] = ["file_tags", "tags", "files", "links"];

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Create the index tables if they do not exist yet.
/// Safe to call on every run; existing tables are never dropped or altered.
pub fn ensure_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(
        r#"
        -- One row per indexed file
        CREATE TABLE IF NOT EXISTS files (
            id TEXT PRIMARY KEY,
            path TEXT NOT NULL UNIQUE,
            url_path TEXT UNIQUE,
            metadata TEXT,
            filetype TEXT NOT NULL,
            type TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_files_filetype ON files(filetype);

        -- Tag vocabulary
        CREATE TABLE IF NOT EXISTS tags (
            name TEXT PRIMARY KEY
        );

        -- File/tag membership
        CREATE TABLE IF NOT EXISTS file_tags (
            tag TEXT NOT NULL REFERENCES tags(name) ON DELETE CASCADE,
            file TEXT NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            UNIQUE (tag, file)
        );

        CREATE INDEX IF NOT EXISTS idx_file_tags_file ON file_tags(file);

        -- Link graph; "to" stays NULL for dangling links
        CREATE TABLE IF NOT EXISTS links (
            id TEXT PRIMARY KEY,
            link_type TEXT NOT NULL CHECK (link_type IN ('normal', 'embed')),
            "from" TEXT NOT NULL REFERENCES files(id) ON DELETE CASCADE,
            "to" TEXT REFERENCES files(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_links_from ON links("from");
        CREATE INDEX IF NOT EXISTS idx_links_to ON links("to");
        "#,
    )?;

    Ok(())
}

/// Delete every row from the index tables.
pub fn wipe(conn: &Connection) -> Result<(), SchemaError> {
    for table in TABLES {
        conn.execute(&format!("DELETE FROM {table}"), [])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_ensure_schema_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        assert_eq!(table_names(&conn), vec!["file_tags", "files", "links", "tags"]);
    }

    #[test]
    fn test_ensure_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO files (id, path, url_path, filetype) VALUES ('a', 'a.md', 'a', 'md')",
            [],
        )
        .unwrap();

        ensure_schema(&conn).unwrap(); // Should not fail or drop data

        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0)).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_wipe_respects_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute_batch(
            r#"
            INSERT INTO files (id, path, url_path, filetype) VALUES ('a', 'a.md', 'a', 'md');
            INSERT INTO files (id, path, url_path, filetype) VALUES ('b', 'b.md', 'b', 'md');
            INSERT INTO tags (name) VALUES ('economy');
            INSERT INTO file_tags (tag, file) VALUES ('economy', 'a');
            INSERT INTO links (id, link_type, "from", "to") VALUES ('l', 'normal', 'a', 'b');
            "#,
        )
        .unwrap();

        wipe(&conn).unwrap();

        for table in TABLES {
            let count: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 0, "{table} should be empty");
        }
    }

    #[test]
    fn test_link_type_is_constrained() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO files (id, path, url_path, filetype) VALUES ('a', 'a.md', 'a', 'md')",
            [],
        )
        .unwrap();

        let result = conn.execute(
            r#"INSERT INTO links (id, link_type, "from") VALUES ('l', 'wikilink', 'a')"#,
            [],
        );
        assert!(result.is_err());
    }
}
