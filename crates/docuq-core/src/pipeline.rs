//! Document pipeline: upload → signed URL → OCR → answer.

use crate::answer::AnsweringService;
use crate::client::{OcrPage, OcrService};
use crate::{DocuqError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Join per-page OCR text with blank lines. No pages yields an empty string.
pub fn join_pages(pages: &[OcrPage]) -> String {
    pages
        .iter()
        .map(|page| page.markdown.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Runs one question against one document, strictly in sequence.
pub struct DocumentPipeline {
    ocr: Arc<dyn OcrService>,
    answering: AnsweringService,
    signed_url_expiry_hours: u32,
    upload_dir: Option<PathBuf>,
}

impl DocumentPipeline {
    pub fn new(ocr: Arc<dyn OcrService>, answering: AnsweringService) -> Self {
        Self {
            ocr,
            answering,
            signed_url_expiry_hours: 1,
            upload_dir: None,
        }
    }

    pub fn with_signed_url_expiry(mut self, hours: u32) -> Self {
        self.signed_url_expiry_hours = hours;
        self
    }

    /// Directory for temporary upload files. Defaults to the system temp dir.
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = Some(dir.into());
        self
    }

    /// Answer `question` about the file at `path`.
    pub async fn answer_file(&self, path: &Path, question: &str) -> Result<String> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "document.pdf".to_string());
        self.run(path, &file_name, question).await
    }

    /// Answer `question` about uploaded bytes.
    ///
    /// The bytes are staged in a temporary file that is removed when this returns,
    /// whether the pipeline succeeded or not.
    pub async fn answer_upload(&self, file_name: &str, bytes: &[u8], question: &str) -> Result<String> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("docuq-").suffix(".pdf");
        let mut staged = match &self.upload_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempfile_in(dir)?
            }
            None => builder.tempfile()?,
        };
        staged.write_all(bytes)?;
        staged.flush()?;
        debug!(target: "docuq::pipeline", "Staged {} at {}", file_name, staged.path().display());

        self.run(staged.path(), file_name, question).await
    }

    /// OCR the file at `path` and return the joined page text.
    pub async fn extract_text(&self, path: &Path, file_name: &str) -> Result<String> {
        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Err(DocuqError::InvalidInput("uploaded file is empty".to_string()));
        }

        let file_id = self.ocr.upload(file_name, bytes).await?;
        debug!(target: "docuq::pipeline", "Uploaded {} as {}", file_name, file_id);

        let url = self
            .ocr
            .signed_url(&file_id, self.signed_url_expiry_hours)
            .await?;

        let pages = self.ocr.extract_pages(&url).await?;
        info!(target: "docuq::pipeline", "OCR returned {} pages for {}", pages.len(), file_name);

        Ok(join_pages(&pages))
    }

    async fn run(&self, path: &Path, file_name: &str, question: &str) -> Result<String> {
        let document = self.extract_text(path, file_name).await?;
        if document.trim().is_empty() {
            return Err(DocuqError::EmptyDocument);
        }
        self.answering.answer(&document, question).await
    }
}
