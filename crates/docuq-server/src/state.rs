//! Shared application state.

use crate::config::Config;
use docuq_core::{
    AnsweringService, ChatService, DocumentPipeline, MistralClient, OcrService, QaLogStore,
    SessionManager,
};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state.
pub struct AppState {
    pub pipeline: DocumentPipeline,
    pub store: Arc<QaLogStore>,
    pub sessions: SessionManager,
    pub config: Config,
}

impl AppState {
    /// Build state backed by the Mistral API.
    pub fn new(config: Config, api_key: &str) -> docuq_core::Result<Self> {
        let client = Arc::new(
            MistralClient::new(api_key)?
                .with_base_url(config.api_base_url.clone())
                .with_models(config.ocr_model.clone(), config.chat_model.clone())
                .with_retry(config.retry.clone())
                .with_timeout(Duration::from_secs(config.request_timeout_secs))?,
        );
        Self::with_services(config, client.clone(), client)
    }

    /// Build state around arbitrary OCR and chat services.
    pub fn with_services(
        config: Config,
        ocr: Arc<dyn OcrService>,
        chat: Arc<dyn ChatService>,
    ) -> docuq_core::Result<Self> {
        let sessions = SessionManager::new(config.session_manager_config()?);
        let store = Arc::new(QaLogStore::open(&config.db_path)?);

        let answering = AnsweringService::new(chat, config.limits.clone());
        let mut pipeline = DocumentPipeline::new(ocr, answering)
            .with_signed_url_expiry(config.signed_url_expiry_hours);
        if let Some(dir) = &config.upload_dir {
            pipeline = pipeline.with_upload_dir(dir.clone());
        }

        Ok(Self {
            pipeline,
            store,
            sessions,
            config,
        })
    }
}
