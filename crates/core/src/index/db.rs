//! Database connection, batch writes and queries.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use thiserror::Error;

use super::schema::{self, SchemaError};
use super::types::{
    Direction, FileQuery, FileTag, IndexedFile, IndexedLink, LinkQuery, LinkType,
    ResolvedLink, is_markdown,
};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Separates tags in the aggregated tag column. Tags may contain commas.
const TAG_SEPARATOR: char = '\u{1f}';

const FILE_COLUMNS: &str = "f.id, f.path, f.url_path, f.metadata, f.filetype, f.type,
     (SELECT GROUP_CONCAT(ft.tag, char(31) ORDER BY ft.rowid)
      FROM file_tags ft WHERE ft.file = f.id) AS tags";

/// Content index database handle.
pub struct IndexDb {
    conn: Connection,
}

impl IndexDb {
    /// Open or create an index database at the given path.
    pub fn open(path: &Path) -> Result<Self, IndexError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        schema::ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, IndexError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Get the underlying connection (for transactions).
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create the index tables if absent.
    pub fn ensure_schema(&self) -> Result<(), IndexError> {
        schema::ensure_schema(&self.conn)?;
        Ok(())
    }

    /// Delete all rows from every index table.
    pub fn wipe(&self) -> Result<(), IndexError> {
        schema::wipe(&self.conn)?;
        Ok(())
    }

    /// Close the database handle.
    pub fn close(self) -> Result<(), IndexError> {
        self.conn.close().map_err(|(_, e)| IndexError::Database(e))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Batch writes
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert files. Tags on the records are ignored; see [`Self::insert_file_tags`].
    pub fn insert_files(&self, files: &[IndexedFile]) -> Result<usize, IndexError> {
        self.insert_file_rows(files, true)
    }

    /// Insert files with a `NULL` `url_path`. They are listed and filtered
    /// like any other file but never resolve a link target.
    pub fn insert_unaddressed_files(&self, files: &[IndexedFile]) -> Result<usize, IndexError> {
        self.insert_file_rows(files, false)
    }

    fn insert_file_rows(
        &self,
        files: &[IndexedFile],
        with_url_path: bool,
    ) -> Result<usize, IndexError> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO files (id, path, url_path, metadata, filetype, type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for file in files {
            stmt.execute(params![
                file.id,
                file.path,
                with_url_path.then_some(file.url_path.as_str()),
                file.metadata.as_ref().map(|m| m.to_string()),
                file.filetype,
                file.declared_type,
            ])?;
        }
        Ok(files.len())
    }

    /// Insert tag names.
    pub fn insert_tags(&self, tags: &[String]) -> Result<usize, IndexError> {
        let mut stmt = self.conn.prepare_cached("INSERT INTO tags (name) VALUES (?1)")?;
        for tag in tags {
            stmt.execute([tag])?;
        }
        Ok(tags.len())
    }

    /// Insert file/tag membership edges.
    pub fn insert_file_tags(&self, edges: &[FileTag]) -> Result<usize, IndexError> {
        let mut stmt =
            self.conn.prepare_cached("INSERT INTO file_tags (tag, file) VALUES (?1, ?2)")?;
        for edge in edges {
            stmt.execute(params![edge.tag, edge.file])?;
        }
        Ok(edges.len())
    }

    /// Insert links.
    pub fn insert_links(&self, links: &[IndexedLink]) -> Result<usize, IndexError> {
        let mut stmt = self.conn.prepare_cached(
            r#"INSERT INTO links (id, link_type, "from", "to") VALUES (?1, ?2, ?3, ?4)"#,
        )?;
        for link in links {
            stmt.execute(params![link.id, link.link_type.as_str(), link.from, link.to])?;
        }
        Ok(links.len())
    }

    /// Id of the file whose `url_path` equals the given path.
    pub fn file_id_for_url_path(&self, url_path: &str) -> Result<Option<String>, IndexError> {
        let mut stmt = self.conn.prepare_cached("SELECT id FROM files WHERE url_path = ?1")?;
        stmt.query_row([url_path], |row| row.get(0)).optional().map_err(Into::into)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// List files matching every set filter, one row per file.
    pub fn list_files(&self, query: &FileQuery) -> Result<Vec<IndexedFile>, IndexError> {
        let mut sql = format!("SELECT {FILE_COLUMNS} FROM files f WHERE 1=1");
        let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(folder) = &query.folder {
            let folder = folder.strip_suffix('/').unwrap_or(folder);
            if folder.is_empty() {
                return Err(IndexError::InvalidQuery("folder must not be empty".into()));
            }
            let prefix = format!("{folder}/");
            sql.push_str(" AND substr(f.url_path, 1, ?) = ?");
            params_vec.push(Box::new(prefix.chars().count() as i64));
            params_vec.push(Box::new(prefix));
        }

        if let Some(tags) = &query.tags {
            if tags.is_empty() {
                return Err(IndexError::InvalidQuery("tag set must not be empty".into()));
            }
            sql.push_str(&format!(
                " AND f.id IN (SELECT file FROM file_tags WHERE tag IN ({}))",
                placeholders(tags.len())
            ));
            for tag in tags {
                params_vec.push(Box::new(tag.clone()));
            }
        }

        if let Some(filetypes) = &query.filetypes {
            if filetypes.is_empty() {
                return Err(IndexError::InvalidQuery("filetype set must not be empty".into()));
            }
            sql.push_str(&format!(" AND f.filetype IN ({})", placeholders(filetypes.len())));
            for filetype in filetypes {
                params_vec.push(Box::new(filetype.trim_start_matches('.').to_lowercase()));
            }
        }

        if let Some(url_path) = &query.url_path {
            sql.push_str(" AND f.url_path = ?");
            params_vec.push(Box::new(url_path.clone()));
        }

        sql.push_str(" ORDER BY f.path");

        let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_refs.as_slice(), FileRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(FileRow::into_file).collect()
    }

    /// Get a file by its logical path.
    pub fn get_file_by_url_path(
        &self,
        url_path: &str,
    ) -> Result<Option<IndexedFile>, IndexError> {
        let query = FileQuery { url_path: Some(url_path.to_string()), ..Default::default() };
        Ok(self.list_files(&query)?.into_iter().next())
    }

    /// Get a file by its id.
    pub fn get_file_by_id(&self, id: &str) -> Result<Option<IndexedFile>, IndexError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {FILE_COLUMNS} FROM files f WHERE f.id = ?1"),
                [id],
                FileRow::from_row,
            )
            .optional()?;
        row.map(FileRow::into_file).transpose()
    }

    /// All distinct tag names, sorted.
    pub fn get_tags(&self) -> Result<Vec<String>, IndexError> {
        let mut stmt = self.conn.prepare("SELECT name FROM tags ORDER BY name")?;
        let tags = stmt.query_map([], |row| row.get(0))?.collect::<Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    /// Traverse the link graph from a file.
    ///
    /// Each result carries the other endpoint's `url_path`. Links whose
    /// target never resolved are not returned in either direction.
    pub fn get_links(&self, query: &LinkQuery) -> Result<Vec<ResolvedLink>, IndexError> {
        let (join_key, other_key) = match query.direction {
            Direction::Forward => ("from", "to"),
            Direction::Backward => ("to", "from"),
        };

        let mut sql = format!(
            r#"SELECT l.id, l.link_type, l."from", l."to", f.url_path
               FROM links l
               JOIN files f ON f.id = l."{other_key}"
               WHERE l."{join_key}" = ?1"#
        );
        let mut params_vec: Vec<Box<dyn ToSql>> = vec![Box::new(query.file_id.clone())];

        if let Some(link_type) = query.link_type {
            sql.push_str(" AND l.link_type = ?2");
            params_vec.push(Box::new(link_type.as_str()));
        }

        sql.push_str(" ORDER BY f.url_path, l.id");

        let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, link_type, from, to, url_path)| -> Result<ResolvedLink, IndexError> {
                let link_type = link_type.parse::<LinkType>().map_err(|_| {
                    IndexError::InvalidData(format!("link {id} has type '{link_type}'"))
                })?;
                Ok(ResolvedLink { id, link_type, from, to, url_path })
            })
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statistics
    // ─────────────────────────────────────────────────────────────────────────

    /// Get total file count.
    pub fn count_files(&self) -> Result<i64, IndexError> {
        self.count("SELECT COUNT(*) FROM files")
    }

    /// Get total link count.
    pub fn count_links(&self) -> Result<i64, IndexError> {
        self.count("SELECT COUNT(*) FROM links")
    }

    /// Get count of links whose target did not resolve.
    pub fn count_broken_links(&self) -> Result<i64, IndexError> {
        self.count(r#"SELECT COUNT(*) FROM links WHERE "to" IS NULL"#)
    }

    fn count(&self, sql: &str) -> Result<i64, IndexError> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count)
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Raw `files` row before metadata and tags are decoded.
struct FileRow {
    id: String,
    path: String,
    url_path: Option<String>,
    metadata: Option<String>,
    filetype: String,
    declared_type: Option<String>,
    tags: Option<String>,
}

impl FileRow {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            path: row.get(1)?,
            url_path: row.get(2)?,
            metadata: row.get(3)?,
            filetype: row.get(4)?,
            declared_type: row.get(5)?,
            tags: row.get(6)?,
        })
    }

    fn into_file(self) -> Result<IndexedFile, IndexError> {
        let markdown = is_markdown(&self.filetype);

        let metadata = match (&self.metadata, markdown) {
            (Some(raw), true) => Some(serde_json::from_str(raw).map_err(|e| {
                IndexError::InvalidData(format!("metadata of {}: {e}", self.path))
            })?),
            _ => None,
        };

        let tags = markdown.then(|| {
            self.tags
                .map(|t| t.split(TAG_SEPARATOR).map(str::to_string).collect())
                .unwrap_or_default()
        });

        Ok(IndexedFile {
            id: self.id,
            url_path: self.url_path.unwrap_or_else(|| self.path.clone()),
            path: self.path,
            filetype: self.filetype,
            metadata,
            declared_type: self.declared_type,
            tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn md_file(url_path: &str) -> IndexedFile {
        IndexedFile {
            id: format!("id:{url_path}"),
            path: format!("/content/{url_path}.md"),
            url_path: url_path.to_string(),
            filetype: "md".to_string(),
            metadata: Some(json!({"title": url_path})),
            declared_type: None,
            tags: None,
        }
    }

    fn asset(url_path: &str) -> IndexedFile {
        IndexedFile {
            id: format!("id:{url_path}"),
            path: format!("/content/{url_path}"),
            url_path: url_path.to_string(),
            filetype: url_path.rsplit('.').next().unwrap().to_string(),
            metadata: None,
            declared_type: None,
            tags: None,
        }
    }

    fn edge(tag: &str, url_path: &str) -> FileTag {
        FileTag { tag: tag.to_string(), file: format!("id:{url_path}") }
    }

    fn link(id: &str, from: &str, to: Option<&str>, link_type: LinkType) -> IndexedLink {
        IndexedLink {
            id: id.to_string(),
            link_type,
            from: format!("id:{from}"),
            to: to.map(|t| format!("id:{t}")),
        }
    }

    fn sample_db() -> IndexDb {
        let db = IndexDb::open_in_memory().unwrap();
        db.insert_files(&[
            md_file("blog/first"),
            md_file("blog/second"),
            md_file("blogroll"),
            md_file("about"),
            asset("assets/logo.png"),
        ])
        .unwrap();
        db.insert_tags(&["economy".into(), "rust".into(), "a,b".into()]).unwrap();
        db.insert_file_tags(&[
            edge("rust", "blog/first"),
            edge("economy", "blog/first"),
            edge("economy", "blog/second"),
            edge("a,b", "about"),
        ])
        .unwrap();
        db.insert_links(&[
            link("l1", "blog/second", Some("blog/first"), LinkType::Normal),
            link("l2", "about", Some("blog/first"), LinkType::Embed),
            link("l3", "blog/first", None, LinkType::Normal),
            link("l4", "blog/first", Some("assets/logo.png"), LinkType::Embed),
        ])
        .unwrap();
        db
    }

    fn url_paths(files: &[IndexedFile]) -> Vec<&str> {
        files.iter().map(|f| f.url_path.as_str()).collect()
    }

    #[test]
    fn test_list_all_files() {
        let db = sample_db();
        let files = db.list_files(&FileQuery::default()).unwrap();
        assert_eq!(files.len(), 5);
    }

    #[test]
    fn test_folder_filter_is_prefix_with_slash() {
        let db = sample_db();
        for folder in ["blog", "blog/"] {
            let query = FileQuery { folder: Some(folder.into()), ..Default::default() };
            let files = db.list_files(&query).unwrap();
            assert_eq!(url_paths(&files), vec!["blog/first", "blog/second"]);
        }
    }

    #[test]
    fn test_folder_filter_is_case_sensitive() {
        let db = sample_db();
        let query = FileQuery { folder: Some("Blog".into()), ..Default::default() };
        assert!(db.list_files(&query).unwrap().is_empty());
    }

    #[test]
    fn test_tag_filter_does_not_duplicate_rows() {
        let db = sample_db();
        let query = FileQuery {
            tags: Some(vec!["economy".into(), "rust".into()]),
            ..Default::default()
        };
        let files = db.list_files(&query).unwrap();

        assert_eq!(url_paths(&files), vec!["blog/first", "blog/second"]);
        // Full tag set in declaration order, not only the matching tags
        assert_eq!(files[0].tags, Some(vec!["rust".to_string(), "economy".to_string()]));
    }

    #[test]
    fn test_tag_filter_returns_full_tag_set() {
        let db = sample_db();
        let query = FileQuery { tags: Some(vec!["rust".into()]), ..Default::default() };
        let files = db.list_files(&query).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].tags.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_tags_with_commas_survive_aggregation() {
        let db = sample_db();
        let about = db.get_file_by_url_path("about").unwrap().unwrap();
        assert_eq!(about.tags, Some(vec!["a,b".to_string()]));
    }

    #[test]
    fn test_filetype_filter() {
        let db = sample_db();
        let query = FileQuery { filetypes: Some(vec!["PNG".into()]), ..Default::default() };
        let files = db.list_files(&query).unwrap();

        assert_eq!(url_paths(&files), vec!["assets/logo.png"]);
        assert_eq!(files[0].tags, None);
        assert_eq!(files[0].metadata, None);
    }

    #[test]
    fn test_markdown_without_tags_has_empty_tag_list() {
        let db = sample_db();
        let blogroll = db.get_file_by_url_path("blogroll").unwrap().unwrap();
        assert_eq!(blogroll.tags, Some(vec![]));
        assert_eq!(blogroll.metadata, Some(json!({"title": "blogroll"})));
    }

    #[test]
    fn test_filters_compose() {
        let db = sample_db();
        let query = FileQuery {
            folder: Some("blog".into()),
            tags: Some(vec!["rust".into()]),
            filetypes: Some(vec!["md".into()]),
            url_path: Some("blog/first".into()),
        };
        assert_eq!(url_paths(&db.list_files(&query).unwrap()), vec!["blog/first"]);

        let query = FileQuery {
            folder: Some("blog".into()),
            url_path: Some("about".into()),
            ..Default::default()
        };
        assert!(db.list_files(&query).unwrap().is_empty());
    }

    #[test]
    fn test_empty_sets_are_invalid() {
        let db = sample_db();
        let query = FileQuery { tags: Some(vec![]), ..Default::default() };
        assert!(matches!(db.list_files(&query), Err(IndexError::InvalidQuery(_))));

        let query = FileQuery { filetypes: Some(vec![]), ..Default::default() };
        assert!(matches!(db.list_files(&query), Err(IndexError::InvalidQuery(_))));

        let query = FileQuery { folder: Some("/".into()), ..Default::default() };
        assert!(matches!(db.list_files(&query), Err(IndexError::InvalidQuery(_))));
    }

    #[test]
    fn test_get_tags() {
        let db = sample_db();
        assert_eq!(db.get_tags().unwrap(), vec!["a,b", "economy", "rust"]);
    }

    #[test]
    fn test_forward_links_skip_dangling() {
        let db = sample_db();
        let links = db.get_links(&LinkQuery::forward("id:blog/first")).unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, "l4");
        assert_eq!(links[0].url_path, "assets/logo.png");
    }

    #[test]
    fn test_backward_links_carry_source_url_path() {
        let db = sample_db();
        let links = db.get_links(&LinkQuery::backward("id:blog/first")).unwrap();

        let sources: Vec<_> = links.iter().map(|l| l.url_path.as_str()).collect();
        assert_eq!(sources, vec!["about", "blog/second"]);
    }

    #[test]
    fn test_link_type_filter() {
        let db = sample_db();
        let query = LinkQuery::backward("id:blog/first").with_link_type(LinkType::Embed);
        let links = db.get_links(&query).unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].from, "id:about");
    }

    #[test]
    fn test_counts() {
        let db = sample_db();
        assert_eq!(db.count_files().unwrap(), 5);
        assert_eq!(db.count_links().unwrap(), 4);
        assert_eq!(db.count_broken_links().unwrap(), 1);
    }

    #[test]
    fn test_file_id_for_url_path() {
        let db = sample_db();
        assert_eq!(db.file_id_for_url_path("about").unwrap(), Some("id:about".into()));
        assert_eq!(db.file_id_for_url_path("missing").unwrap(), None);
    }

    #[test]
    fn test_unaddressed_file_is_listed_but_not_addressable() {
        let db = sample_db();
        let shadowed = IndexedFile { id: "id:about-asset".into(), ..asset("about") };
        db.insert_unaddressed_files(std::slice::from_ref(&shadowed)).unwrap();

        assert_eq!(db.count_files().unwrap(), 6);
        assert_eq!(db.file_id_for_url_path("about").unwrap(), Some("id:about".into()));

        let file = db.get_file_by_id("id:about-asset").unwrap().unwrap();
        assert_eq!(file.url_path, "/content/about");
        assert_eq!(file.tags, None);
    }

    #[test]
    fn test_get_file_by_id() {
        let db = sample_db();
        let file = db.get_file_by_id("id:blog/second").unwrap().unwrap();
        assert_eq!(file.tags, Some(vec!["economy".to_string()]));
        assert!(db.get_file_by_id("nope").unwrap().is_none());
    }
}
