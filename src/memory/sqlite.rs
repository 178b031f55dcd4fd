//! Durable thought store backed by SQLite.
//!
//! Two record sets: `thoughts` (superset) and `golden_thoughts` (subset).
//! Append-only; each append commits as one transaction covering both
//! record sets, so concurrent readers never observe a partial record or
//! a gold row without its main record. Connections are short-lived and
//! opened inside `spawn_blocking` to keep the async loop unblocked.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tokio::task;

use crate::dream::thought::{ReasoningMode, Thought};
use crate::error::{DreamError, Result};

/// Append/scan interface over the durable record sets.
#[async_trait]
pub trait ThoughtStore: Send + Sync {
    /// Append one thought. Gold thoughts land in both record sets as a
    /// single atomic write; a failure leaves neither record behind.
    async fn append(&self, thought: &Thought) -> Result<()>;
    /// All thoughts, oldest-to-newest.
    async fn all_thoughts(&self) -> Result<Vec<Thought>>;
    /// Every gold thought ever stored, across sessions, oldest-to-newest.
    async fn all_gold(&self) -> Result<Vec<Thought>>;
    /// Thoughts of one session, oldest-to-newest.
    async fn session_thoughts(&self, session_id: &str) -> Result<Vec<Thought>>;
    async fn count(&self) -> Result<usize>;
}

#[derive(Clone)]
pub struct SqliteThoughtStore {
    db_path: PathBuf,
}

impl SqliteThoughtStore {
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let path_clone = path.clone();

        task::spawn_blocking(move || {
            let conn = open(&path_clone)?;
            for table in ["thoughts", "golden_thoughts"] {
                conn.execute(
                    &format!(
                        r#"
                        CREATE TABLE IF NOT EXISTS {} (
                            id TEXT PRIMARY KEY,
                            timestamp TEXT NOT NULL,
                            session_id TEXT NOT NULL,
                            mode TEXT NOT NULL,
                            seed_text TEXT,
                            content TEXT NOT NULL,
                            interest_score REAL NOT NULL,
                            is_gold INTEGER NOT NULL
                        );
                        "#,
                        table
                    ),
                    [],
                )
                .map_err(store_err)?;
                conn.execute(
                    &format!(
                        "CREATE INDEX IF NOT EXISTS idx_{t}_timestamp ON {t}(timestamp);",
                        t = table
                    ),
                    [],
                )
                .map_err(store_err)?;
                conn.execute(
                    &format!(
                        "CREATE INDEX IF NOT EXISTS idx_{t}_session ON {t}(session_id);",
                        t = table
                    ),
                    [],
                )
                .map_err(store_err)?;
            }
            Ok::<_, DreamError>(())
        })
        .await
        .map_err(join_err)??;

        Ok(Self { db_path: path })
    }

    async fn scan(&self, query: &'static str, session: Option<String>) -> Result<Vec<Thought>> {
        let path = self.db_path.clone();
        task::spawn_blocking(move || {
            let conn = open(&path)?;
            let mut stmt = conn.prepare(query).map_err(store_err)?;
            let rows = match session {
                Some(ref sid) => stmt.query_map(params![sid], row_to_thought),
                None => stmt.query_map([], row_to_thought),
            }
            .map_err(store_err)?;
            let mut thoughts = Vec::new();
            for row in rows {
                thoughts.push(row.map_err(store_err)?);
            }
            Ok::<_, DreamError>(thoughts)
        })
        .await
        .map_err(join_err)?
    }
}

fn open(path: &Path) -> Result<Connection> {
    Connection::open(path).map_err(store_err)
}

fn insert_into(conn: &Connection, table: &str, t: &Thought) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO {} (id, timestamp, session_id, mode, seed_text, content, interest_score, is_gold) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            table
        ),
        params![
            t.id,
            t.timestamp.to_rfc3339(),
            t.session_id,
            t.mode.as_str(),
            t.seed_text,
            t.content,
            t.interest_score,
            t.is_gold as i64,
        ],
    )
    .map_err(store_err)?;
    Ok(())
}

fn store_err(e: rusqlite::Error) -> DreamError {
    DreamError::StoreWrite(e.to_string())
}

fn join_err(e: task::JoinError) -> DreamError {
    DreamError::StoreWrite(format!("store task panicked: {}", e))
}

fn row_to_thought(row: &Row<'_>) -> rusqlite::Result<Thought> {
    let timestamp: String = row.get(1)?;
    let mode: String = row.get(3)?;
    Ok(Thought {
        id: row.get(0)?,
        timestamp: DateTime::parse_from_rfc3339(&timestamp)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        session_id: row.get(2)?,
        mode: ReasoningMode::parse(&mode).unwrap_or(ReasoningMode::FreeAssociation),
        seed_text: row.get(4)?,
        content: row.get(5)?,
        interest_score: row.get(6)?,
        is_gold: row.get::<_, i64>(7)? != 0,
    })
}

#[async_trait]
impl ThoughtStore for SqliteThoughtStore {
    async fn append(&self, thought: &Thought) -> Result<()> {
        let path = self.db_path.clone();
        let t = thought.clone();
        task::spawn_blocking(move || {
            let mut conn = open(&path)?;
            // Both record sets commit together; a gold row never exists
            // without its main record, and vice versa.
            let tx = conn.transaction().map_err(store_err)?;
            insert_into(&tx, "thoughts", &t)?;
            if t.is_gold {
                insert_into(&tx, "golden_thoughts", &t)?;
            }
            tx.commit().map_err(store_err)?;
            Ok::<_, DreamError>(())
        })
        .await
        .map_err(join_err)?
    }

    async fn all_thoughts(&self) -> Result<Vec<Thought>> {
        self.scan(
            "SELECT id, timestamp, session_id, mode, seed_text, content, interest_score, is_gold \
             FROM thoughts ORDER BY rowid",
            None,
        )
        .await
    }

    async fn all_gold(&self) -> Result<Vec<Thought>> {
        self.scan(
            "SELECT id, timestamp, session_id, mode, seed_text, content, interest_score, is_gold \
             FROM golden_thoughts ORDER BY rowid",
            None,
        )
        .await
    }

    async fn session_thoughts(&self, session_id: &str) -> Result<Vec<Thought>> {
        self.scan(
            "SELECT id, timestamp, session_id, mode, seed_text, content, interest_score, is_gold \
             FROM thoughts WHERE session_id = ?1 ORDER BY rowid",
            Some(session_id.to_string()),
        )
        .await
    }

    async fn count(&self) -> Result<usize> {
        let path = self.db_path.clone();
        task::spawn_blocking(move || {
            let conn = open(&path)?;
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM thoughts", [], |row| row.get(0))
                .map_err(store_err)?;
            Ok::<_, DreamError>(count as usize)
        })
        .await
        .map_err(join_err)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn thought(session: &str, content: &str, gold: bool) -> Thought {
        Thought::new(session, ReasoningMode::PatternRecognition, content, 0.5, gold)
    }

    #[tokio::test]
    async fn test_append_and_scan_preserves_order() {
        let dir = tempdir().unwrap();
        let store = SqliteThoughtStore::new(dir.path().join("mem.db")).await.unwrap();

        for i in 0..5 {
            store.append(&thought("s1", &format!("thought {}", i), false)).await.unwrap();
        }

        let all = store.all_thoughts().await.unwrap();
        assert_eq!(all.len(), 5);
        for (i, t) in all.iter().enumerate() {
            assert_eq!(t.content, format!("thought {}", i));
        }
        assert_eq!(store.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_gold_subset_across_sessions() {
        let dir = tempdir().unwrap();
        let store = SqliteThoughtStore::new(dir.path().join("mem.db")).await.unwrap();

        store.append(&thought("s1", "first gold", true)).await.unwrap();
        store.append(&thought("s1", "plain", false)).await.unwrap();
        store.append(&thought("s2", "second gold", true)).await.unwrap();

        let gold = store.all_gold().await.unwrap();
        assert_eq!(gold.len(), 2);
        assert_eq!(gold[0].content, "first gold");
        assert_eq!(gold[1].content, "second gold");
        assert!(gold.iter().all(|t| t.is_gold));
    }

    #[tokio::test]
    async fn test_single_append_fills_both_record_sets() {
        let dir = tempdir().unwrap();
        let store = SqliteThoughtStore::new(dir.path().join("mem.db")).await.unwrap();

        let g = thought("s1", "shiny", true);
        store.append(&g).await.unwrap();

        let all = store.all_thoughts().await.unwrap();
        let gold = store.all_gold().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(gold.len(), 1);
        assert_eq!(all[0].id, gold[0].id);

        // Plain thoughts never reach the gold record set.
        store.append(&thought("s1", "plain", false)).await.unwrap();
        assert_eq!(store.all_gold().await.unwrap().len(), 1);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mem.db");

        {
            let store = SqliteThoughtStore::new(&path).await.unwrap();
            let t = thought("s1", "durable", false).with_seed("a + b");
            store.append(&t).await.unwrap();
        }

        let store = SqliteThoughtStore::new(&path).await.unwrap();
        let all = store.all_thoughts().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].content, "durable");
        assert_eq!(all[0].seed_text.as_deref(), Some("a + b"));
        assert_eq!(all[0].mode, ReasoningMode::PatternRecognition);
    }

    #[tokio::test]
    async fn test_session_scan_filters() {
        let dir = tempdir().unwrap();
        let store = SqliteThoughtStore::new(dir.path().join("mem.db")).await.unwrap();

        store.append(&thought("s1", "one", false)).await.unwrap();
        store.append(&thought("s2", "two", false)).await.unwrap();
        store.append(&thought("s1", "three", false)).await.unwrap();

        let s1 = store.session_thoughts("s1").await.unwrap();
        assert_eq!(s1.len(), 2);
        assert_eq!(s1[0].content, "one");
        assert_eq!(s1[1].content, "three");
    }
}
