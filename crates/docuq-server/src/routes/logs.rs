//! Q&A log routes.

use crate::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use docuq_types::QaLogResponse;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct LogQuery {
    #[serde(default)]
    pub limit: Option<u32>,
}

/// GET /api/logs - Logged answers, newest first.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogQuery>,
) -> Result<Json<QaLogResponse>, (StatusCode, String)> {
    let entries = match query.limit {
        Some(limit) => state.store.list_recent(limit),
        None => state.store.list(),
    }
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let total_count = state
        .store
        .count()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(QaLogResponse {
        entries,
        total_count,
    }))
}
