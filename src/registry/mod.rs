//! Persistent project registry.
//!
//! Maps a unique project name to its canonical filesystem path and the time it
//! was last semantically indexed. Every other component resolves project
//! identity through this registry; nothing else stores project paths.

use crate::error::{RegistryError, RegistryResult};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::{Path, PathBuf};

/// A registered project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub path: PathBuf,
    pub last_indexed_at: Option<DateTime<Utc>>,
}

/// SQLite-backed registry of searchable projects.
///
/// All mutating operations are atomic per entry; the registry relies on
/// SQLite's own transaction semantics and needs no additional locking.
#[derive(Debug)]
pub struct ProjectRegistry {
    conn: Connection,
}

impl ProjectRegistry {
    /// Open (or create) the registry database at `db_path`.
    pub fn open(db_path: &Path) -> RegistryResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| RegistryError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn)
    }

    /// In-memory registry, used by tests.
    pub fn open_in_memory() -> RegistryResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> RegistryResult<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                path TEXT NOT NULL,
                last_indexed_at TEXT
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    /// Register a project under a unique name.
    ///
    /// The path is canonicalized before storing so repeated registrations and
    /// lookups compare byte-for-byte. Fails with `DuplicateName` (and performs
    /// no mutation) if the name is already taken.
    pub fn register(&self, name: &str, path: &Path) -> RegistryResult<i64> {
        let canonical = path
            .canonicalize()
            .map_err(|source| RegistryError::InvalidPath {
                path: path.to_path_buf(),
                source,
            })?;

        let canonical_str = canonical.to_string_lossy().into_owned();
        let result = self.conn.execute(
            "INSERT INTO projects (name, path) VALUES (?1, ?2)",
            params![name, canonical_str],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(RegistryError::DuplicateName {
                    name: name.to_string(),
                })
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Resolve a project name to its canonical path.
    pub fn resolve(&self, name: &str) -> RegistryResult<PathBuf> {
        let path: Option<String> = self
            .conn
            .query_row(
                "SELECT path FROM projects WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        path.map(PathBuf::from)
            .ok_or_else(|| RegistryError::ProjectNotFound {
                name: name.to_string(),
            })
    }

    /// All registered projects, ordered by name.
    pub fn list(&self) -> RegistryResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, path, last_indexed_at FROM projects ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let name: String = row.get(1)?;
            let path: String = row.get(2)?;
            let stamp: Option<String> = row.get(3)?;
            Ok((id, name, path, stamp))
        })?;

        let mut projects = Vec::new();
        for row in rows {
            let (id, name, path, stamp) = row?;
            projects.push(Project {
                id,
                name,
                path: PathBuf::from(path),
                last_indexed_at: stamp.as_deref().and_then(parse_timestamp),
            });
        }
        Ok(projects)
    }

    /// Record that a project was just indexed.
    ///
    /// A no-op for names that are not registered; the pipeline resolves the
    /// project before indexing, so an absent row here means it was removed
    /// mid-run and there is nothing useful to record.
    pub fn touch(&self, name: &str) -> RegistryResult<()> {
        self.conn.execute(
            "UPDATE projects SET last_indexed_at = ?1 WHERE name = ?2",
            params![Utc::now().to_rfc3339(), name],
        )?;
        Ok(())
    }

    /// Remove a project. Removing an absent name is not an error.
    pub fn remove(&self, name: &str) -> RegistryResult<()> {
        self.conn
            .execute("DELETE FROM projects WHERE name = ?1", params![name])?;
        Ok(())
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_project_dir() -> tempfile::TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    #[test]
    fn register_and_resolve_round_trip() {
        let registry = ProjectRegistry::open_in_memory().unwrap();
        let dir = temp_project_dir();

        let id = registry.register("demo", dir.path()).unwrap();
        assert!(id > 0);

        let resolved = registry.resolve("demo").unwrap();
        assert_eq!(resolved, dir.path().canonicalize().unwrap());
    }

    #[test]
    fn duplicate_name_rejected_without_mutation() {
        let registry = ProjectRegistry::open_in_memory().unwrap();
        let first = temp_project_dir();
        let second = temp_project_dir();

        registry.register("demo", first.path()).unwrap();
        let err = registry.register("demo", second.path()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName { name } if name == "demo"));

        // Original path untouched by the failed insert.
        assert_eq!(
            registry.resolve("demo").unwrap(),
            first.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn resolve_unknown_project_is_not_found() {
        let registry = ProjectRegistry::open_in_memory().unwrap();
        let err = registry.resolve("ghost").unwrap_err();
        assert!(matches!(err, RegistryError::ProjectNotFound { name } if name == "ghost"));
    }

    #[test]
    fn remove_is_idempotent() {
        let registry = ProjectRegistry::open_in_memory().unwrap();
        let dir = temp_project_dir();

        registry.register("demo", dir.path()).unwrap();
        registry.remove("demo").unwrap();
        assert!(matches!(
            registry.resolve("demo"),
            Err(RegistryError::ProjectNotFound { .. })
        ));

        // Second removal of the same name is a no-op, not an error.
        registry.remove("demo").unwrap();
        registry.remove("never-existed").unwrap();
    }

    #[test]
    fn list_is_ordered_by_name() {
        let registry = ProjectRegistry::open_in_memory().unwrap();
        let dir = temp_project_dir();

        registry.register("zeta", dir.path()).unwrap();
        registry.register("alpha", dir.path()).unwrap();
        registry.register("mid", dir.path()).unwrap();

        let names: Vec<String> = registry
            .list()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn touch_sets_last_indexed_at() {
        let registry = ProjectRegistry::open_in_memory().unwrap();
        let dir = temp_project_dir();

        registry.register("demo", dir.path()).unwrap();
        assert!(registry.list().unwrap()[0].last_indexed_at.is_none());

        registry.touch("demo").unwrap();
        let stamp = registry.list().unwrap()[0].last_indexed_at;
        assert!(stamp.is_some());
        assert!((Utc::now() - stamp.unwrap()).num_seconds() < 10);
    }

    #[test]
    fn register_nonexistent_path_fails() {
        let registry = ProjectRegistry::open_in_memory().unwrap();
        let err = registry
            .register("demo", Path::new("/definitely/not/a/real/path"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidPath { .. }));
    }
}
