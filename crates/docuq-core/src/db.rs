//! SQLite persistence for the Q&A log.

use crate::Result;
use chrono::{DateTime, Utc};
use docuq_types::QaRecord;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// Append-only SQLite store of question/answer rows.
pub struct QaLogStore {
    conn: Mutex<Connection>,
}

impl QaLogStore {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        store.migrate()?;
        Ok(store)
    }

    /// Initialize database schema.
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS qa_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                question TEXT,
                answer TEXT
            );
            "#,
        )?;
        Ok(())
    }

    /// Run migrations for schema updates.
    fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();

        // Databases written by earlier versions have no created_at column
        let has_created_at: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM pragma_table_info('qa_logs') WHERE name = 'created_at'",
                [],
                |row| row.get(0),
            )
            .unwrap_or(false);

        if !has_created_at {
            debug!(target: "docuq::db", "Adding created_at column to qa_logs");
            conn.execute_batch("ALTER TABLE qa_logs ADD COLUMN created_at TEXT;")?;
        }

        Ok(())
    }

    /// Append one row and return it as stored.
    pub fn insert(&self, name: &str, question: &str, answer: &str) -> Result<QaRecord> {
        let conn = self.conn.lock().unwrap();
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO qa_logs (name, question, answer, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![name, question, answer, created_at.to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();
        debug!(target: "docuq::db", "Logged answer {} for {}", id, name);

        Ok(QaRecord {
            id,
            name: name.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            created_at,
        })
    }

    /// All rows, newest first.
    pub fn list(&self) -> Result<Vec<QaRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, question, answer, created_at FROM qa_logs ORDER BY id DESC",
        )?;
        let rows = stmt
            .query_map([], |row| Self::row_to_record(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// At most `limit` rows, newest first.
    pub fn list_recent(&self, limit: u32) -> Result<Vec<QaRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, question, answer, created_at FROM qa_logs ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], |row| Self::row_to_record(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM qa_logs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<QaRecord> {
        let id: i64 = row.get("id")?;
        let name: Option<String> = row.get("name")?;
        let question: Option<String> = row.get("question")?;
        let answer: Option<String> = row.get("answer")?;
        let created_at: Option<String> = row.get("created_at")?;

        Ok(QaRecord {
            id,
            name: name.unwrap_or_default(),
            question: question.unwrap_or_default(),
            answer: answer.unwrap_or_default(),
            created_at: created_at
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_default(),
        })
    }
}
