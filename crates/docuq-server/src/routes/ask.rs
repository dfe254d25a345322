//! Question submission route.

use super::{PageParts, render, session_id};
use crate::state::AppState;
use crate::ui::Notice;
use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Fields of the multipart ask form.
#[derive(Debug, Default)]
pub struct AskForm {
    pub file_name: Option<String>,
    pub file: Vec<u8>,
    pub question: String,
    pub show_log: bool,
}

impl AskForm {
    /// A file input left empty still arrives as a part with no name and no bytes.
    pub fn has_file(&self) -> bool {
        !self.file.is_empty()
    }

    pub fn is_pdf(&self) -> bool {
        self.file_name
            .as_deref()
            .map(|name| name.to_lowercase().ends_with(".pdf"))
            .unwrap_or(false)
    }
}

async fn read_form(mut multipart: Multipart) -> Result<AskForm, MultipartError> {
    let mut form = AskForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                form.file_name = field.file_name().map(|n| n.to_string()).filter(|n| !n.is_empty());
                form.file = field.bytes().await?.to_vec();
            }
            "question" => form.question = field.text().await?,
            "show_log" => form.show_log = field.text().await? == "true",
            _ => {}
        }
    }
    Ok(form)
}

/// POST /ask - Run the document pipeline for an identified user and log the answer.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let session = state.sessions.get_or_start(session_id(&headers));

    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!(target: "docuq::api", "Rejected upload: {}", e);
            return render(
                &state,
                &session,
                e.status(),
                PageParts {
                    notice: Some(Notice::Error(format!("Error: {}", e.body_text()))),
                    ..Default::default()
                },
            );
        }
    };
    let question = form.question.trim();

    let Some(user_name) = session.state.user_name() else {
        return render(
            &state,
            &session,
            StatusCode::FORBIDDEN,
            PageParts {
                notice: Some(Notice::Info("Enter your name to begin.".to_string())),
                ..Default::default()
            },
        );
    };

    let max_upload_bytes = state.config.max_upload_bytes;
    if form.file.len() > max_upload_bytes {
        warn!(
            target: "docuq::api",
            "Rejected {} byte upload from {} (limit {})",
            form.file.len(),
            user_name,
            max_upload_bytes
        );
        return render(
            &state,
            &session,
            StatusCode::PAYLOAD_TOO_LARGE,
            PageParts {
                notice: Some(Notice::Error(format!(
                    "Error: file is {} bytes, the upload limit is {} bytes",
                    form.file.len(),
                    max_upload_bytes
                ))),
                question: Some(question),
                show_log: form.show_log,
                ..Default::default()
            },
        );
    }

    if !session.state.can_submit(form.has_file(), question) {
        return render(
            &state,
            &session,
            StatusCode::UNPROCESSABLE_ENTITY,
            PageParts {
                notice: Some(Notice::Info(
                    "Upload a PDF and enter a question to get an answer.".to_string(),
                )),
                question: Some(question),
                show_log: form.show_log,
                ..Default::default()
            },
        );
    }

    if !form.is_pdf() {
        return render(
            &state,
            &session,
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            PageParts {
                notice: Some(Notice::Error("Error: only PDF files are supported".to_string())),
                question: Some(question),
                show_log: form.show_log,
                ..Default::default()
            },
        );
    }

    let file_name = form.file_name.as_deref().unwrap_or("document.pdf");
    info!(
        target: "docuq::api",
        "{} asked about {} ({} bytes)",
        user_name,
        file_name,
        form.file.len()
    );

    let result = match state.pipeline.answer_upload(file_name, &form.file, question).await {
        Ok(answer) => state
            .store
            .insert(user_name, question, &answer)
            .map(|record| record.answer),
        Err(e) => Err(e),
    };

    match result {
        Ok(answer) => render(
            &state,
            &session,
            StatusCode::OK,
            PageParts {
                notice: Some(Notice::Success("Answer:".to_string())),
                question: Some(question),
                answer: Some(&answer),
                show_log: form.show_log,
            },
        ),
        Err(e) => {
            warn!(target: "docuq::api", "Question from {} failed: {}", user_name, e);
            render(
                &state,
                &session,
                StatusCode::OK,
                PageParts {
                    notice: Some(Notice::Error(format!("Error: {}", e))),
                    question: Some(question),
                    show_log: form.show_log,
                    ..Default::default()
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension_check() {
        let mut form = AskForm {
            file_name: Some("Report.PDF".to_string()),
            file: b"%PDF".to_vec(),
            ..Default::default()
        };
        assert!(form.is_pdf());
        assert!(form.has_file());

        form.file_name = Some("notes.txt".to_string());
        assert!(!form.is_pdf());

        form.file_name = None;
        assert!(!form.is_pdf());
    }

    #[test]
    fn test_empty_file_part_is_no_file() {
        let form = AskForm::default();
        assert!(!form.has_file());
    }
}
