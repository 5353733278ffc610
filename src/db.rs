//! Persistent storage for imported records and scan history

use rusqlite::{params, Connection};
use std::path::Path;

use crate::error::ImportError;
use crate::models::{MediaRecord, ScannedRoot};

/// Narrow persistence interface consumed by the import workflow.
///
/// The coordinator and the selection model only ever talk to this
/// trait, so tests can substitute scripted stores and alternate
/// backends can be plugged in without touching the orchestration.
pub trait RecordStore {
    /// Persist one record, replacing any previous record for the same path
    fn persist(&mut self, record: &MediaRecord) -> Result<(), ImportError>;

    /// Record a root directory as scanned, refreshing its timestamp
    fn record_scanned_root(&mut self, path: &Path) -> Result<(), ImportError>;

    /// List all previously scanned roots, ordered by path
    fn list_scanned_roots(&self) -> Result<Vec<ScannedRoot>, ImportError>;

    /// Delete every record and every scanned root
    fn delete_all(&mut self) -> Result<(), ImportError>;
}

/// SQLite-backed store for records and scan history
pub struct HistoryDb {
    conn: Connection,
}

impl HistoryDb {
    /// Open or create a database file
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    pub fn open_memory() -> Result<Self, ImportError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<(), ImportError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS records (
                path TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                size INTEGER NOT NULL,
                mtime INTEGER NOT NULL,
                extension TEXT NOT NULL,
                format TEXT NOT NULL,
                hash TEXT,
                is_partial_hash INTEGER DEFAULT 0
            );
            CREATE INDEX IF NOT EXISTS idx_records_mtime ON records(mtime);
            CREATE INDEX IF NOT EXISTS idx_records_hash ON records(hash);
            CREATE INDEX IF NOT EXISTS idx_records_format ON records(format);

            CREATE TABLE IF NOT EXISTS scanned_roots (
                path TEXT PRIMARY KEY,
                last_scanned INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    /// Record a scanned root with an explicit timestamp
    pub fn record_scanned_root_at(&mut self, path: &Path, timestamp: i64) -> Result<(), ImportError> {
        // Normalize path separators for cross-platform consistency
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.conn.execute(
            "INSERT INTO scanned_roots (path, last_scanned) VALUES (?1, ?2)
             ON CONFLICT(path) DO UPDATE SET last_scanned = ?2",
            params![path_str, timestamp],
        )?;
        Ok(())
    }

    /// Get the number of stored records
    pub fn record_count(&self) -> Result<u64, ImportError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Get the number of scanned roots
    pub fn root_count(&self) -> Result<u64, ImportError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM scanned_roots", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn now_unix() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

impl RecordStore for HistoryDb {
    fn persist(&mut self, record: &MediaRecord) -> Result<(), ImportError> {
        // Normalize path separators for cross-platform consistency
        let path_str = record.path.to_string_lossy().replace('\\', "/");
        self.conn.execute(
            "INSERT OR REPLACE INTO records
             (path, name, size, mtime, extension, format, hash, is_partial_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                path_str,
                record.name,
                record.size as i64,
                record.mtime,
                record.extension,
                record.format.as_str(),
                record.hash,
                record.is_partial_hash as i32,
            ],
        )?;
        Ok(())
    }

    fn record_scanned_root(&mut self, path: &Path) -> Result<(), ImportError> {
        self.record_scanned_root_at(path, Self::now_unix())
    }

    fn list_scanned_roots(&self) -> Result<Vec<ScannedRoot>, ImportError> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, last_scanned FROM scanned_roots ORDER BY path")?;

        let rows = stmt.query_map([], |row| {
            Ok(ScannedRoot {
                path: row.get(0)?,
                last_scanned: row.get(1)?,
            })
        })?;

        let mut roots = Vec::new();
        for row in rows {
            roots.push(row?);
        }
        Ok(roots)
    }

    fn delete_all(&mut self) -> Result<(), ImportError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM records", [])?;
        tx.execute("DELETE FROM scanned_roots", [])?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_record(path: &str) -> MediaRecord {
        MediaRecord::new(
            PathBuf::from(path),
            Path::new(path)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("")
                .to_string(),
            1024,
            1700000000,
            "mp3".to_string(),
        )
    }

    #[test]
    fn test_persist_and_count() {
        let mut db = HistoryDb::open_memory().unwrap();
        db.persist(&sample_record("/music/a.mp3")).unwrap();
        db.persist(&sample_record("/music/b.mp3")).unwrap();
        assert_eq!(db.record_count().unwrap(), 2);
    }

    #[test]
    fn test_persist_replaces_same_path() {
        let mut db = HistoryDb::open_memory().unwrap();
        db.persist(&sample_record("/music/a.mp3")).unwrap();

        let mut updated = sample_record("/music/a.mp3");
        updated.size = 4096;
        db.persist(&updated).unwrap();

        assert_eq!(db.record_count().unwrap(), 1);
    }

    #[test]
    fn test_record_scanned_root_no_duplicates() {
        let mut db = HistoryDb::open_memory().unwrap();
        db.record_scanned_root_at(Path::new("/music"), 100).unwrap();
        db.record_scanned_root_at(Path::new("/music"), 200).unwrap();

        let roots = db.list_scanned_roots().unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].path, "/music");
        assert_eq!(roots[0].last_scanned, 200);
    }

    #[test]
    fn test_list_scanned_roots_ordered() {
        let mut db = HistoryDb::open_memory().unwrap();
        db.record_scanned_root(Path::new("/zebra")).unwrap();
        db.record_scanned_root(Path::new("/alpha")).unwrap();

        let roots = db.list_scanned_roots().unwrap();
        let paths: Vec<&str> = roots.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/alpha", "/zebra"]);
    }

    #[test]
    fn test_delete_all() {
        let mut db = HistoryDb::open_memory().unwrap();
        db.persist(&sample_record("/music/a.mp3")).unwrap();
        db.record_scanned_root(Path::new("/music")).unwrap();

        db.delete_all().unwrap();

        assert_eq!(db.record_count().unwrap(), 0);
        assert_eq!(db.root_count().unwrap(), 0);
        assert!(db.list_scanned_roots().unwrap().is_empty());
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("library.db");

        {
            let mut db = HistoryDb::open(&db_path).unwrap();
            db.persist(&sample_record("/music/a.mp3")).unwrap();
        }

        let db = HistoryDb::open(&db_path).unwrap();
        assert_eq!(db.record_count().unwrap(), 1);
    }
}
