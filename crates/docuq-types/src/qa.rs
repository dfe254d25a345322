//! Question/answer log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the append-only Q&A log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    /// Auto-incrementing row id, newest rows have the highest id.
    pub id: i64,
    /// Name of the user who asked.
    pub name: String,
    /// The question as typed.
    pub question: String,
    /// The model's answer.
    pub answer: String,
    /// When the row was written. Rows from databases created before this
    /// column existed carry the Unix epoch.
    pub created_at: DateTime<Utc>,
}

/// Log listing returned by the JSON API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaLogResponse {
    pub entries: Vec<QaRecord>,
    pub total_count: u64,
}
