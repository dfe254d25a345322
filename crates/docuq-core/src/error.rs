//! Error types for DocuQ.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum DocuqError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("OCR returned no text for the document")]
    EmptyDocument,

    #[error("Model returned no answer")]
    EmptyAnswer,

    #[error("Document too large: {chars} characters needs {chunks} chunks, limit is {max_chunks}")]
    DocumentTooLarge {
        chars: usize,
        chunks: usize,
        max_chunks: usize,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("MISTRAL_API_KEY is not set in environment variables")]
    MissingCredential,

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl DocuqError {
    /// Whether a retry might succeed: network failures, rate limits and server errors.
    pub fn is_transient(&self) -> bool {
        match self {
            DocuqError::Network(_) | DocuqError::RateLimit { .. } => true,
            DocuqError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Server-requested wait in seconds, if any.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            DocuqError::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(DocuqError::RateLimit {
            message: "slow down".into(),
            retry_after: Some(2)
        }
        .is_transient());
        assert!(DocuqError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_transient());
        assert!(!DocuqError::Api {
            status: 404,
            message: "missing".into()
        }
        .is_transient());
        assert!(!DocuqError::Authentication("bad key".into()).is_transient());
        assert!(!DocuqError::EmptyDocument.is_transient());
    }

    #[test]
    fn test_missing_credential_message() {
        assert_eq!(
            DocuqError::MissingCredential.to_string(),
            "MISTRAL_API_KEY is not set in environment variables"
        );
    }
}
