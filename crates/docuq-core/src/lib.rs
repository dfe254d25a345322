//! Core document pipeline, answering, persistence and sessions for DocuQ.

mod answer;
mod chunking;
mod client;
mod db;
mod error;
pub mod mistral;
mod pipeline;
mod retry;
mod session;

pub use answer::{AnsweringService, DocumentLimits, build_prompt};
pub use chunking::{chunk_document, truncate_chars};
pub use client::{ChatMessage, ChatRole, ChatService, OcrPage, OcrService};
pub use db::QaLogStore;
pub use error::DocuqError;
pub use mistral::MistralClient;
pub use pipeline::{DocumentPipeline, join_pages};
pub use retry::RetryPolicy;
pub use session::{SessionManager, SessionManagerConfig};

/// Result type for DocuQ operations.
pub type Result<T> = std::result::Result<T, DocuqError>;
