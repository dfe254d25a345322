//! Page, identification and session routes.

use super::{PageParts, expired_session_cookie, render, session_cookie, session_id};
use crate::state::AppState;
use crate::ui::Notice;
use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use docuq_core::DocuqError;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize, Default)]
pub struct PageQuery {
    #[serde(default)]
    pub show_log: bool,
}

/// GET / - Render the form for the caller's session.
pub async fn index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> Response {
    let session = state.sessions.get_or_start(session_id(&headers));
    render(
        &state,
        &session,
        StatusCode::OK,
        PageParts {
            show_log: query.show_log,
            ..Default::default()
        },
    )
}

#[derive(Deserialize)]
pub struct IdentifyForm {
    #[serde(default)]
    pub name: String,
}

/// POST /identify - Anonymous → Identified.
pub async fn identify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<IdentifyForm>,
) -> Response {
    let session = state.sessions.get_or_start(session_id(&headers));

    match state.sessions.identify(session.id, &form.name) {
        Ok(session) => {
            let name = session.state.user_name().unwrap_or_default();
            let notice = Notice::Success(format!("Welcome, {}!", name));
            render(
                &state,
                &session,
                StatusCode::OK,
                PageParts {
                    notice: Some(notice),
                    ..Default::default()
                },
            )
        }
        Err(e) => {
            let notice = match e {
                DocuqError::InvalidInput(_) => Notice::Info("Enter your name to begin.".to_string()),
                other => Notice::Error(format!("Error: {}", other)),
            };
            render(
                &state,
                &session,
                StatusCode::UNPROCESSABLE_ENTITY,
                PageParts {
                    notice: Some(notice),
                    ..Default::default()
                },
            )
        }
    }
}

/// POST /switch-user - Identified → Anonymous.
pub async fn switch_user(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = state.sessions.get_or_start(session_id(&headers));
    // A freshly started session is already anonymous
    let _ = state.sessions.switch_user(session.id);

    (
        [(header::SET_COOKIE, session_cookie(session.id))],
        Redirect::to("/"),
    )
        .into_response()
}

/// POST /session/end - Tear the session down and drop the cookie.
pub async fn end_session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if let Some(id) = session_id(&headers) {
        state.sessions.end(id);
    }

    (
        [(header::SET_COOKIE, expired_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
