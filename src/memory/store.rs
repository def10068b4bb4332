//! SQLite-backed memory store implementation.

use crate::error::{Error, Result};
use crate::memory::schema::initialize_schema;
use crate::memory::types::{CycleEntry, MemoryRecord};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// SQLite-backed memory store.
///
/// All access goes through one connection behind a mutex, which makes the
/// store a single serialization point for writers across concurrent runs.
/// The connection is closed when the last handle is dropped.
#[derive(Clone)]
pub struct SqliteMemoryStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMemoryStore {
    /// Open or create a memory store at the given path.
    ///
    /// Missing tables are created on every open, so a file holding only the
    /// `storage` table is upgraded in place.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        initialize_schema(&conn)?;

        debug!(path = %path.as_ref().display(), "Opened memory store");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| Error::Internal(format!("Failed to lock connection: {}", e)))?;
        f(&conn).map_err(|e| Error::MemoryStorage(e.to_string()))
    }

    // ==================== Best-result table ====================

    /// Upsert the result for `query`. Last write wins, whatever the prior score.
    pub fn store(&self, query: &str, result: &str, score: u32) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "REPLACE INTO storage (query, result, score) VALUES (?1, ?2, ?3)",
                params![query, result, score],
            )?;
            Ok(())
        })
    }

    /// Exact-key lookup of the stored result text.
    pub fn retrieve(&self, query: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT result FROM storage WHERE query = ?1",
                params![query],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()
            .map(Option::flatten)
        })
    }

    /// Full record for `query`, if any.
    pub fn get_record(&self, query: &str) -> Result<Option<MemoryRecord>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT query, result, score FROM storage WHERE query = ?1",
                params![query],
                row_to_record,
            )
            .optional()
        })
    }

    /// Up to `limit` records by score descending. Equal scores are ordered by
    /// ascending query text.
    pub fn retrieve_top_results(&self, limit: usize) -> Result<Vec<MemoryRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT query, result, score FROM storage
                 ORDER BY score DESC, query ASC
                 LIMIT ?1",
            )?;

            let records = stmt
                .query_map(params![limit as i64], row_to_record)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(records)
        })
    }

    /// Number of stored queries.
    pub fn count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM storage", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    // ==================== Cycle history ====================

    /// Append a cycle outcome to the history log.
    pub fn record_cycle(&self, entry: &CycleEntry) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO cycle_log (query, cycle, idea, initial_score, final_score, tier, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    entry.query,
                    entry.cycle,
                    entry.idea,
                    entry.initial_score,
                    entry.final_score,
                    entry.tier,
                    entry.recorded_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })
    }

    /// All recorded cycles for `query`, oldest first.
    pub fn cycle_history(&self, query: &str) -> Result<Vec<CycleEntry>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT query, cycle, idea, initial_score, final_score, tier, created_at
                 FROM cycle_log WHERE query = ?1 ORDER BY id ASC",
            )?;

            let entries = stmt
                .query_map(params![query], |row| {
                    Ok(CycleEntry {
                        query: row.get(0)?,
                        cycle: row.get(1)?,
                        idea: row.get(2)?,
                        initial_score: row.get(3)?,
                        final_score: row.get(4)?,
                        tier: row.get(5)?,
                        recorded_at: parse_datetime(6, &row.get::<_, String>(6)?)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(entries)
        })
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<MemoryRecord> {
    let score: i64 = row.get(2)?;
    let score = u32::try_from(score)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Integer, Box::new(e)))?;

    Ok(MemoryRecord {
        query: row.get(0)?,
        result: row.get(1)?,
        score,
    })
}

fn parse_datetime(column: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_store_and_retrieve() {
        let store = SqliteMemoryStore::in_memory().unwrap();

        store.store("urban energy", "Smart grids", 7).unwrap();

        assert_eq!(
            store.retrieve("urban energy").unwrap(),
            Some("Smart grids".to_string())
        );
        assert_eq!(store.retrieve("unknown").unwrap(), None);
    }

    #[test]
    fn test_store_is_idempotent() {
        let store = SqliteMemoryStore::in_memory().unwrap();

        store.store("q", "r", 5).unwrap();
        store.store("q", "r", 5).unwrap();

        assert_eq!(store.retrieve("q").unwrap(), Some("r".to_string()));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_last_write_wins_even_with_lower_score() {
        let store = SqliteMemoryStore::in_memory().unwrap();

        store.store("q", "first", 9).unwrap();
        store.store("q", "second", 4).unwrap();

        assert_eq!(
            store.get_record("q").unwrap(),
            Some(MemoryRecord::new("q", "second", 4))
        );
    }

    #[test]
    fn test_top_results_ordering_and_tie_break() {
        let store = SqliteMemoryStore::in_memory().unwrap();

        store.store("b", "rb", 8).unwrap();
        store.store("c", "rc", 3).unwrap();
        store.store("a", "ra", 8).unwrap();
        store.store("d", "rd", 10).unwrap();

        let top = store.retrieve_top_results(3).unwrap();
        let queries: Vec<&str> = top.iter().map(|r| r.query.as_str()).collect();
        assert_eq!(queries, vec!["d", "a", "b"]);

        assert!(store.retrieve_top_results(0).unwrap().is_empty());
        assert_eq!(store.retrieve_top_results(10).unwrap().len(), 4);
    }

    #[test]
    fn test_empty_store_has_no_top_results() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        assert!(store.retrieve_top_results(1).unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.db");

        {
            let store = SqliteMemoryStore::open(&path).unwrap();
            store.store("urban energy solutions", "Smart grids", 9).unwrap();
        }

        let reopened = SqliteMemoryStore::open(&path).unwrap();
        assert_eq!(
            reopened.retrieve("urban energy solutions").unwrap(),
            Some("Smart grids".to_string())
        );
    }

    #[test]
    fn test_open_fails_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("memory.db");

        let result = SqliteMemoryStore::open(&path);
        assert!(matches!(result, Err(Error::MemoryStorage(_))));
    }

    #[test]
    fn test_open_upgrades_storage_only_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memory.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute(
                "CREATE TABLE storage (query TEXT PRIMARY KEY, result TEXT, score INTEGER DEFAULT 0)",
                [],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO storage (query, result, score) VALUES ('energy', 'Smart grids', 8)",
                [],
            )
            .unwrap();
        }

        let store = SqliteMemoryStore::open(&path).unwrap();

        assert_eq!(
            store.get_record("energy").unwrap(),
            Some(MemoryRecord::new("energy", "Smart grids", 8))
        );
        store
            .record_cycle(&CycleEntry {
                query: "energy".to_string(),
                cycle: 1,
                idea: "Smart grids".to_string(),
                initial_score: 8,
                final_score: 10,
                tier: "minimal".to_string(),
                recorded_at: Utc::now(),
            })
            .unwrap();
        assert_eq!(store.cycle_history("energy").unwrap().len(), 1);

        let version = store
            .with_conn(crate::memory::schema::get_schema_version)
            .unwrap();
        assert_eq!(version, crate::memory::schema::SCHEMA_VERSION);
    }

    #[test]
    fn test_corrupt_score_is_a_storage_error() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        store
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO storage (query, result, score) VALUES ('neg', 'r', -4)",
                    [],
                )
            })
            .unwrap();

        assert!(matches!(
            store.retrieve_top_results(1),
            Err(Error::MemoryStorage(_))
        ));
        assert!(matches!(store.get_record("neg"), Err(Error::MemoryStorage(_))));
    }

    #[test]
    fn test_null_score_is_a_storage_error() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        store
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO storage (query, result, score) VALUES ('q', 'r', NULL)",
                    [],
                )
            })
            .unwrap();

        assert!(matches!(store.get_record("q"), Err(Error::MemoryStorage(_))));
    }

    #[test]
    fn test_unparseable_cycle_timestamp_is_a_storage_error() {
        let store = SqliteMemoryStore::in_memory().unwrap();
        store
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO cycle_log (query, cycle, idea, initial_score, final_score, tier, created_at)
                     VALUES ('q', 1, 'idea', 3, 6, 'moderate', 'yesterday')",
                    [],
                )
            })
            .unwrap();

        assert!(matches!(
            store.cycle_history("q"),
            Err(Error::MemoryStorage(_))
        ));
    }

    #[test]
    fn test_cycle_history_keeps_every_cycle() {
        let store = SqliteMemoryStore::in_memory().unwrap();

        for cycle in 1..=3 {
            store
                .record_cycle(&CycleEntry {
                    query: "q".to_string(),
                    cycle,
                    idea: format!("idea {}", cycle),
                    initial_score: 3,
                    final_score: 6,
                    tier: "moderate".to_string(),
                    recorded_at: Utc::now(),
                })
                .unwrap();
        }

        let history = store.cycle_history("q").unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].cycle, 1);
        assert_eq!(history[2].idea, "idea 3");
        assert!(store.cycle_history("other").unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_top_results_sorted_and_bounded(
            scores in proptest::collection::vec(0u32..=10, 0..12),
            limit in 0usize..15,
        ) {
            let store = SqliteMemoryStore::in_memory().unwrap();
            for (i, score) in scores.iter().enumerate() {
                store.store(&format!("q{}", i), "r", *score).unwrap();
            }

            let top = store.retrieve_top_results(limit).unwrap();
            prop_assert!(top.len() <= limit);
            prop_assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }
}
