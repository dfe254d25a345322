//! Server startup.

use crate::config::{Config, resolve_api_key};
use crate::routes;
use crate::state::AppState;
use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Check the credential, build state and serve until the listener closes.
///
/// A missing or blank `api_key` fails before any state is built or port is bound.
pub async fn run(config: Config, api_key: Option<String>) -> Result<()> {
    // No credential, no server
    let api_key = match resolve_api_key(api_key) {
        Ok(key) => key,
        Err(e) => {
            tracing::error!(target: "docuq::startup", "{}", e);
            return Err(e.into());
        }
    };

    let state = Arc::new(AppState::new(config.clone(), &api_key)?);
    tracing::info!(
        target: "docuq::startup",
        "Using OCR model {} and chat model {}",
        config.ocr_model,
        config.chat_model
    );

    spawn_session_reaper(state.clone());

    let app = routes::router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!(target: "docuq::startup", "Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Sweep idle sessions on a timer so abandoned ones go even when nobody new arrives.
fn spawn_session_reaper(state: Arc<AppState>) {
    let period = Duration::from_secs(state.config.session_reap_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // First tick fires immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            state.sessions.reap_idle();
        }
    });
}
