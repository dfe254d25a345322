//! Service seams between the pipeline and the remote vendor.

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One page of OCR output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrPage {
    #[serde(default)]
    pub index: u32,
    /// Extracted page text, as markdown.
    pub markdown: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Remote document OCR: upload, sign, extract.
#[async_trait]
pub trait OcrService: Send + Sync {
    /// Upload document bytes for OCR and return the remote file id.
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String>;

    /// Obtain a temporary signed URL for an uploaded file.
    async fn signed_url(&self, file_id: &str, expiry_hours: u32) -> Result<String>;

    /// Run OCR against a document URL.
    async fn extract_pages(&self, document_url: &str) -> Result<Vec<OcrPage>>;
}

/// Remote chat completion.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Send `messages` and return the first choice's content.
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String>;
}
