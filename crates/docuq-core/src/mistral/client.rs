use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::client::{ChatMessage, ChatService, OcrPage, OcrService};
use crate::mistral::types::{
    ChatCompletionRequest, ChatCompletionResponse, OcrDocument, OcrRequest, OcrResponse,
    SignedUrl, UploadedFile,
};
use crate::retry::RetryPolicy;
use crate::{DocuqError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.mistral.ai";
pub const DEFAULT_OCR_MODEL: &str = "mistral-ocr-latest";
pub const DEFAULT_CHAT_MODEL: &str = "mistral-large-latest";

/// Client for the Mistral files, OCR and chat completion endpoints.
pub struct MistralClient {
    api_key: String,
    base_url: String,
    ocr_model: String,
    chat_model: String,
    retry: RetryPolicy,
    http_client: reqwest::Client,
}

impl MistralClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(DocuqError::MissingCredential);
        }

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            ocr_model: DEFAULT_OCR_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            retry: RetryPolicy::default(),
            http_client: build_http_client(Duration::from_secs(120))?,
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_models(mut self, ocr_model: impl Into<String>, chat_model: impl Into<String>) -> Self {
        self.ocr_model = ocr_model.into();
        self.chat_model = chat_model.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Per-request timeout for every call.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http_client = build_http_client(timeout)?;
        Ok(self)
    }

    /// Upload a document for OCR (`POST /v1/files`, `purpose=ocr`).
    pub async fn upload_file(&self, file_name: &str, bytes: &[u8]) -> Result<UploadedFile> {
        let url = format!("{}/v1/files", self.base_url);
        debug!(target: "docuq::mistral", "Uploading {} ({} bytes)", file_name, bytes.len());

        self.retry
            .run("file upload", || async {
                let part = reqwest::multipart::Part::bytes(bytes.to_vec())
                    .file_name(file_name.to_string())
                    .mime_str("application/pdf")?;
                let form = reqwest::multipart::Form::new()
                    .text("purpose", "ocr")
                    .part("file", part);

                let response = self
                    .http_client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .multipart(form)
                    .send()
                    .await?;
                parse_response(response).await
            })
            .await
    }

    /// Request a signed URL valid for `expiry_hours` (`GET /v1/files/{id}/url`).
    pub async fn get_signed_url(&self, file_id: &str, expiry_hours: u32) -> Result<SignedUrl> {
        let url = format!("{}/v1/files/{}/url", self.base_url, file_id);

        self.retry
            .run("signed url", || async {
                let response = self
                    .http_client
                    .get(&url)
                    .bearer_auth(&self.api_key)
                    .query(&[("expiry", expiry_hours)])
                    .send()
                    .await?;
                parse_response(response).await
            })
            .await
    }

    /// Run OCR on a document URL (`POST /v1/ocr`).
    pub async fn process_ocr(&self, document_url: &str) -> Result<OcrResponse> {
        let url = format!("{}/v1/ocr", self.base_url);
        let request = OcrRequest {
            model: self.ocr_model.clone(),
            document: OcrDocument::DocumentUrl {
                document_url: document_url.to_string(),
            },
            include_image_base64: false,
        };

        self.retry
            .run("ocr", || async {
                let response = self
                    .http_client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&request)
                    .send()
                    .await?;
                parse_response(response).await
            })
            .await
    }

    /// Create a chat completion (`POST /v1/chat/completions`).
    pub async fn chat_complete(&self, messages: Vec<ChatMessage>) -> Result<ChatCompletionResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let request = ChatCompletionRequest {
            model: self.chat_model.clone(),
            messages,
        };

        let response: ChatCompletionResponse = self
            .retry
            .run("chat completion", || async {
                let response = self
                    .http_client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&request)
                    .send()
                    .await?;
                parse_response(response).await
            })
            .await?;

        if let Some(usage) = &response.usage {
            debug!(
                target: "docuq::mistral",
                "Chat completion used {} prompt + {} completion tokens",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }
        Ok(response)
    }
}

#[async_trait]
impl OcrService for MistralClient {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        Ok(self.upload_file(file_name, &bytes).await?.id)
    }

    async fn signed_url(&self, file_id: &str, expiry_hours: u32) -> Result<String> {
        Ok(self.get_signed_url(file_id, expiry_hours).await?.url)
    }

    async fn extract_pages(&self, document_url: &str) -> Result<Vec<OcrPage>> {
        Ok(self.process_ocr(document_url).await?.pages)
    }
}

#[async_trait]
impl ChatService for MistralClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let response = self.chat_complete(messages).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(DocuqError::EmptyAnswer)
    }
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        let body = response.text().await?;
        return serde_json::from_str(&body)
            .map_err(|e| DocuqError::Parse(format!("Failed to parse response: {}", e)));
    }

    // Extract retry-after header before consuming the response
    let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
        response
            .headers()
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
    } else {
        None
    };

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let message = error_message(&error_text);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DocuqError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => DocuqError::RateLimit {
            message,
            retry_after,
        },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            DocuqError::InvalidRequest(message)
        }
        StatusCode::PAYLOAD_TOO_LARGE => DocuqError::InvalidRequest("Request too large".to_string()),
        _ => DocuqError::Api {
            status: status.as_u16(),
            message,
        },
    })
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };
    for key in ["message", "detail"] {
        match value.get(key) {
            Some(serde_json::Value::String(s)) => return s.clone(),
            Some(other) if !other.is_null() => return other.to_string(),
            _ => {}
        }
    }
    body.to_string()
}
