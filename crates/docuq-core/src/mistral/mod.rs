//! Mistral REST client for file upload, OCR and chat completion.

pub mod client;
pub mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL, DEFAULT_OCR_MODEL, MistralClient};
