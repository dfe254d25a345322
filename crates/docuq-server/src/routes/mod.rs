//! HTTP route handlers.

pub mod ask;
pub mod logs;
pub mod page;

use crate::state::AppState;
use crate::ui::{self, Notice, PageView};
use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use docuq_types::SessionContext;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "docuq_session";

/// Body allowance on top of `max_upload_bytes` for multipart boundaries, part headers
/// and the question field. The file itself is checked against the exact limit in `ask`.
pub const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the full application router.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(FORM_OVERHEAD_BYTES);

    let api_routes = Router::new()
        .route("/logs", get(logs::list))
        .route("/health", get(health));

    Router::new()
        .route("/", get(page::index))
        .route("/identify", post(page::identify))
        .route("/switch-user", post(page::switch_user))
        .route("/session/end", post(page::end_session))
        .route("/ask", post(ask::submit))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Session id from the request's cookie header, if any.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: Uuid) -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE, id
    ))
    .unwrap_or_else(|_| HeaderValue::from_static(""))
}

pub fn expired_session_cookie() -> HeaderValue {
    HeaderValue::from_static("docuq_session=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// Extra content for one page render.
#[derive(Default)]
pub struct PageParts<'a> {
    pub notice: Option<Notice>,
    pub question: Option<&'a str>,
    pub answer: Option<&'a str>,
    pub show_log: bool,
}

/// Render the page for `session` and refresh its cookie.
pub fn render(
    state: &AppState,
    session: &SessionContext,
    status: StatusCode,
    parts: PageParts,
) -> Response {
    let mut notice = parts.notice;

    let log = if parts.show_log {
        match state.store.list() {
            Ok(rows) => rows,
            Err(e) => {
                warn!(target: "docuq::api", "Failed to read Q&A log: {}", e);
                notice.get_or_insert(Notice::Error(format!("Error: {}", e)));
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    let view = PageView {
        session,
        notice,
        question: parts.question,
        answer: parts.answer,
        show_log: parts.show_log,
        log: &log,
    };

    (
        status,
        [(header::SET_COOKIE, session_cookie(session.id))],
        Html(ui::render_page(&view)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_from_cookie_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; docuq_session={}; other=1", id)).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn test_session_id_missing_or_malformed() {
        assert_eq!(session_id(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("docuq_session=not-a-uuid"));
        assert_eq!(session_id(&headers), None);
    }

    #[test]
    fn test_session_cookie_format() {
        let id = Uuid::nil();
        assert_eq!(
            session_cookie(id).to_str().unwrap(),
            "docuq_session=00000000-0000-0000-0000-000000000000; Path=/; HttpOnly; SameSite=Lax"
        );
    }
}
