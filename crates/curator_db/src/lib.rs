//! File-tag index store
//!
//! A synchronous SQLite store of file paths and their tag values. The
//! engine treats this as an external collaborator: the whole surface is
//! put (upsert a file with its tags) and query (files by tag filters,
//! distinct values of a tag). Writes serialize through the single
//! connection.

mod error;

pub use error::{DbError, Result};

use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Mapping of tag name to value, as persisted per file.
pub type TagValues = BTreeMap<String, String>;

const SCHEMA_SQL: &str = r#"
-- Files: indexed paths, relative to their layout root
CREATE TABLE IF NOT EXISTS files (
    path TEXT PRIMARY KEY,
    root TEXT NOT NULL,
    indexed_at INTEGER NOT NULL
);

-- Tags: name/value pairs extracted from each file's path
CREATE TABLE IF NOT EXISTS tags (
    path TEXT NOT NULL REFERENCES files(path) ON DELETE CASCADE,
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (path, name)
);

CREATE INDEX IF NOT EXISTS idx_tags_name_value ON tags(name, value);
"#;

/// A file row from the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    pub path: String,
    pub root: String,
}

/// Row counts for status reporting
#[derive(Debug, Clone, Copy, Default)]
pub struct DbStats {
    pub files: u64,
    pub tags: u64,
}

/// The index database
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create an index at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Self::init(conn)?;
        info!(path = %path.display(), "index opened");
        Ok(db)
    }

    /// Open an existing index (fails if not present).
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DbError::NotFound(format!(
                "index database not found: {}",
                path.display()
            )));
        }
        Self::init(Connection::open(path)?)
    }

    /// In-memory index, used by tests and dry runs.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self { conn })
    }

    /// Upsert a file and replace its tags.
    pub fn put_file(&mut self, path: &str, root: &str, tags: &TagValues) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO files (path, root, indexed_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(path) DO UPDATE SET
                 root = excluded.root,
                 indexed_at = excluded.indexed_at",
            params![path, root, Utc::now().timestamp_millis()],
        )?;
        tx.execute("DELETE FROM tags WHERE path = ?1", params![path])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO tags (path, name, value) VALUES (?1, ?2, ?3)")?;
            for (name, value) in tags {
                stmt.execute(params![path, name, value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Remove a file and, through the cascade, its tags.
    pub fn remove_file(&mut self, path: &str) -> Result<bool> {
        let n = self
            .conn
            .execute("DELETE FROM files WHERE path = ?1", params![path])?;
        Ok(n > 0)
    }

    /// Files carrying every requested tag name/value pair, optionally
    /// restricted to one root. No filters returns everything.
    pub fn query(&self, root: Option<&str>, filters: &[(String, String)]) -> Result<Vec<IndexedFile>> {
        let mut sql = String::from("SELECT path, root FROM files");
        let mut conditions: Vec<String> = Vec::new();
        let mut args: Vec<String> = Vec::new();

        if !filters.is_empty() {
            conditions.push(format!(
                "path IN (SELECT path FROM tags WHERE {} GROUP BY path HAVING COUNT(*) = {})",
                filter_clause(filters.len()),
                filters.len()
            ));
            push_filter_args(&mut args, filters);
        }
        if let Some(root) = root {
            conditions.push("root = ?".to_string());
            args.push(root.to_string());
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY path");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
            Ok(IndexedFile {
                path: row.get(0)?,
                root: row.get(1)?,
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Distinct values of a tag across files matching the filters.
    pub fn tag_values(&self, name: &str, filters: &[(String, String)]) -> Result<Vec<String>> {
        let mut sql = String::from("SELECT DISTINCT value FROM tags WHERE name = ?");
        let mut args: Vec<String> = vec![name.to_string()];

        if !filters.is_empty() {
            sql.push_str(&format!(
                " AND path IN (SELECT path FROM tags WHERE {} GROUP BY path HAVING COUNT(*) = {})",
                filter_clause(filters.len()),
                filters.len()
            ));
            push_filter_args(&mut args, filters);
        }
        sql.push_str(" ORDER BY value");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| row.get(0))?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Tags recorded for one file.
    pub fn tags_for(&self, path: &str) -> Result<TagValues> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, value FROM tags WHERE path = ?1")?;
        let rows = stmt.query_map(params![path], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut tags = TagValues::new();
        for row in rows {
            let (name, value) = row?;
            tags.insert(name, value);
        }
        Ok(tags)
    }

    pub fn stats(&self) -> Result<DbStats> {
        let files = self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get::<_, i64>(0))?;
        let tags = self
            .conn
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get::<_, i64>(0))?;
        Ok(DbStats {
            files: files as u64,
            tags: tags as u64,
        })
    }
}

fn filter_clause(n: usize) -> String {
    vec!["(name = ? AND value = ?)"; n].join(" OR ")
}

fn push_filter_args(args: &mut Vec<String>, filters: &[(String, String)]) {
    for (name, value) in filters {
        args.push(name.clone());
        args.push(value.clone());
    }
}
