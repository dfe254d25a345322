//! Server configuration.

use anyhow::Result;
use docuq_core::{DocumentLimits, DocuqError, RetryPolicy, SessionManagerConfig, mistral};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable holding the vendor API key.
pub const API_KEY_VAR: &str = "MISTRAL_API_KEY";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Where uploads are staged while a question runs. System temp dir when unset.
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_ocr_model")]
    pub ocr_model: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_signed_url_expiry_hours")]
    pub signed_url_expiry_hours: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    /// How often idle sessions are swept in the background.
    #[serde(default = "default_session_reap_interval_secs")]
    pub session_reap_interval_secs: u64,
    #[serde(default)]
    pub limits: DocumentLimits,
    #[serde(default)]
    pub retry: RetryPolicy,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docuq")
        .join("qa_database.db")
}

fn default_api_base_url() -> String {
    mistral::DEFAULT_BASE_URL.to_string()
}

fn default_ocr_model() -> String {
    mistral::DEFAULT_OCR_MODEL.to_string()
}

fn default_chat_model() -> String {
    mistral::DEFAULT_CHAT_MODEL.to_string()
}

fn default_signed_url_expiry_hours() -> u32 {
    1
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_session_idle_secs() -> u64 {
    24 * 60 * 60
}

fn default_max_sessions() -> usize {
    10_000
}

fn default_session_reap_interval_secs() -> u64 {
    5 * 60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
            upload_dir: None,
            api_base_url: default_api_base_url(),
            ocr_model: default_ocr_model(),
            chat_model: default_chat_model(),
            signed_url_expiry_hours: default_signed_url_expiry_hours(),
            request_timeout_secs: default_request_timeout_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            session_idle_secs: default_session_idle_secs(),
            max_sessions: default_max_sessions(),
            session_reap_interval_secs: default_session_reap_interval_secs(),
            limits: DocumentLimits::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl Config {
    /// Load config from a specific file path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default location (config/default.toml) or fall back to defaults.
    pub fn load() -> Result<Self> {
        let config_path = PathBuf::from("config/default.toml");
        if config_path.exists() {
            return Self::load_from(&config_path);
        }

        Ok(Config::default())
    }

    /// Session settings, rejecting an idle timeout chrono cannot represent.
    pub fn session_manager_config(&self) -> docuq_core::Result<SessionManagerConfig> {
        let idle_timeout = i64::try_from(self.session_idle_secs)
            .ok()
            .and_then(chrono::TimeDelta::try_seconds)
            .ok_or_else(|| {
                DocuqError::InvalidInput(format!(
                    "session_idle_secs is out of range: {}",
                    self.session_idle_secs
                ))
            })?;

        Ok(SessionManagerConfig {
            idle_timeout,
            max_sessions: self.max_sessions,
        })
    }

}

/// An absent or blank key is a missing credential.
pub fn resolve_api_key(value: Option<String>) -> docuq_core::Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(DocuqError::MissingCredential),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_or_blank_key_is_rejected() {
        assert!(matches!(resolve_api_key(None), Err(DocuqError::MissingCredential)));
        assert!(matches!(
            resolve_api_key(Some("  ".to_string())),
            Err(DocuqError::MissingCredential)
        ));
        assert_eq!(resolve_api_key(Some(" sk-1 ".to_string())).unwrap(), "sk-1");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            port = 9000
            chat_model = "mistral-small-latest"

            [limits]
            max_document_chars = 5000

            [retry]
            max_attempts = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.chat_model, "mistral-small-latest");
        assert_eq!(config.ocr_model, "mistral-ocr-latest");
        assert_eq!(config.signed_url_expiry_hours, 1);
        assert_eq!(config.limits.max_document_chars, 5000);
        assert_eq!(config.limits.chunk_chars, DocumentLimits::default().chunk_chars);
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.retry.base_delay_ms, RetryPolicy::default().base_delay_ms);
    }

    #[test]
    fn test_session_manager_config_from_defaults() {
        let sessions = Config::default().session_manager_config().unwrap();
        assert_eq!(sessions.idle_timeout, chrono::TimeDelta::hours(24));
        assert_eq!(sessions.max_sessions, 10_000);
    }

    #[test]
    fn test_out_of_range_idle_timeout_is_a_config_error() {
        for secs in [u64::MAX, i64::MAX as u64, (i64::MAX / 1000) as u64 + 1] {
            let config = Config {
                session_idle_secs: secs,
                ..Config::default()
            };
            assert!(matches!(
                config.session_manager_config(),
                Err(DocuqError::InvalidInput(_))
            ));
        }
    }
}
