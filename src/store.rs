//! Alias lookup tables backed by SQLite.
//!
//! Two disjoint namespaces: `sys_command` (alias -> application path) and
//! `web_command` (alias -> URL). Lookups are exact and case-insensitive; when
//! an alias is duplicated the earliest row wins.

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// Which table an alias lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasKind {
    Application,
    Website,
}

impl AliasKind {
    fn table(self) -> &'static str {
        match self {
            Self::Application => "sys_command",
            Self::Website => "web_command",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Application => "path",
            Self::Website => "url",
        }
    }
}

impl std::fmt::Display for AliasKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Application => write!(f, "app"),
            Self::Website => write!(f, "web"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasRecord {
    pub kind: AliasKind,
    pub alias: String,
    pub target: String,
}

pub struct LookupStore {
    conn: Mutex<Connection>,
}

impl LookupStore {
    /// Open or create the store at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {:?}", path))?;
        Self::with_connection(conn)
    }

    /// Store that lives only as long as the process.
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sys_command (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                path TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS web_command (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                url TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn lookup_application(&self, name: &str) -> Result<Option<String>> {
        self.lookup(AliasKind::Application, name)
    }

    pub fn lookup_website(&self, name: &str) -> Result<Option<String>> {
        self.lookup(AliasKind::Website, name)
    }

    fn lookup(&self, kind: AliasKind, name: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        let sql = format!(
            "SELECT {} FROM {} WHERE LOWER(name) = LOWER(?1) ORDER BY id LIMIT 1",
            kind.column(),
            kind.table()
        );
        let target = conn
            .query_row(&sql, params![name.trim()], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(target)
    }

    pub fn add(&self, kind: AliasKind, alias: &str, target: &str) -> Result<()> {
        let alias = alias.trim();
        if alias.is_empty() {
            anyhow::bail!("Alias name must not be empty");
        }
        let conn = self.conn.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        let sql = format!(
            "INSERT INTO {} (name, {}) VALUES (?1, ?2)",
            kind.table(),
            kind.column()
        );
        conn.execute(&sql, params![alias, target.trim()])?;
        Ok(())
    }

    /// Remove an alias from both tables. Returns the number of rows deleted.
    pub fn remove(&self, alias: &str) -> Result<usize> {
        let conn = self.conn.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        let mut removed = 0;
        for kind in [AliasKind::Application, AliasKind::Website] {
            let sql = format!("DELETE FROM {} WHERE LOWER(name) = LOWER(?1)", kind.table());
            removed += conn.execute(&sql, params![alias.trim()])?;
        }
        Ok(removed)
    }

    pub fn list(&self) -> Result<Vec<AliasRecord>> {
        let conn = self.conn.lock().map_err(|_| anyhow::anyhow!("store lock poisoned"))?;
        let mut records = Vec::new();
        for kind in [AliasKind::Application, AliasKind::Website] {
            let sql = format!(
                "SELECT name, {} FROM {} ORDER BY id",
                kind.column(),
                kind.table()
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| {
                Ok(AliasRecord {
                    kind,
                    alias: row.get(0)?,
                    target: row.get(1)?,
                })
            })?;
            for row in rows {
                records.push(row?);
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive_exact() {
        let store = LookupStore::in_memory().unwrap();
        store
            .add(AliasKind::Application, "Notepad", "C:\\Windows\\notepad.exe")
            .unwrap();

        assert_eq!(
            store.lookup_application("notepad").unwrap().as_deref(),
            Some("C:\\Windows\\notepad.exe")
        );
        assert_eq!(
            store.lookup_application("NOTEPAD").unwrap().as_deref(),
            Some("C:\\Windows\\notepad.exe")
        );
        assert!(store.lookup_application("note").unwrap().is_none());
        assert!(store.lookup_application("notepad plus").unwrap().is_none());
    }

    #[test]
    fn test_namespaces_are_disjoint() {
        let store = LookupStore::in_memory().unwrap();
        store
            .add(AliasKind::Website, "github", "https://github.com")
            .unwrap();

        assert!(store.lookup_application("github").unwrap().is_none());
        assert_eq!(
            store.lookup_website("GitHub").unwrap().as_deref(),
            Some("https://github.com")
        );
    }

    #[test]
    fn test_first_duplicate_wins() {
        let store = LookupStore::in_memory().unwrap();
        store.add(AliasKind::Website, "mail", "https://first.example").unwrap();
        store.add(AliasKind::Website, "Mail", "https://second.example").unwrap();

        assert_eq!(
            store.lookup_website("mail").unwrap().as_deref(),
            Some("https://first.example")
        );
    }

    #[test]
    fn test_remove_and_list() {
        let store = LookupStore::in_memory().unwrap();
        store.add(AliasKind::Application, "code", "/usr/bin/code").unwrap();
        store.add(AliasKind::Website, "code", "https://code.example").unwrap();
        store.add(AliasKind::Website, "news", "https://news.example").unwrap();

        assert_eq!(store.list().unwrap().len(), 3);
        assert_eq!(store.remove("CODE").unwrap(), 2);

        let remaining = store.list().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].alias, "news");
        assert_eq!(remaining[0].kind, AliasKind::Website);
    }

    #[test]
    fn test_empty_alias_rejected() {
        let store = LookupStore::in_memory().unwrap();
        assert!(store.add(AliasKind::Application, "  ", "/bin/true").is_err());
    }

    #[test]
    fn test_persists_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("assistant.db");
        {
            let store = LookupStore::open(&path).unwrap();
            store.add(AliasKind::Website, "docs", "https://docs.rs").unwrap();
        }
        let reopened = LookupStore::open(&path).unwrap();
        assert_eq!(
            reopened.lookup_website("docs").unwrap().as_deref(),
            Some("https://docs.rs")
        );
    }
}
