//! Question answering over extracted document text.

use crate::chunking::{chunk_document, truncate_chars};
use crate::client::{ChatMessage, ChatService};
use crate::{DocuqError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Size limits on what is sent to the chat model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentLimits {
    /// Largest document sent verbatim in a single prompt.
    pub max_document_chars: usize,
    /// Chunk size used when a document exceeds `max_document_chars`.
    pub chunk_chars: usize,
    /// Documents needing more chunks than this are refused.
    pub max_chunks: usize,
}

impl Default for DocumentLimits {
    fn default() -> Self {
        Self {
            max_document_chars: 100_000,
            chunk_chars: 20_000,
            max_chunks: 16,
        }
    }
}

/// The single user message sent for a question about a document.
pub fn build_prompt(document: &str, question: &str) -> String {
    format!("Document content:\n{}\n\nQuestion: {}", document, question)
}

fn build_condense_prompt(excerpt: &str, question: &str, part: usize, total: usize) -> String {
    format!(
        "You are reading part {} of {} of a long document. Write concise notes containing \
         everything in this excerpt that could help answer the question. \
         If nothing is relevant, reply with \"(nothing relevant)\".\n\n\
         Excerpt:\n{}\n\nQuestion: {}",
        part, total, excerpt, question
    )
}

/// Sends document text plus a question to the chat model.
pub struct AnsweringService {
    chat: Arc<dyn ChatService>,
    limits: DocumentLimits,
}

impl AnsweringService {
    pub fn new(chat: Arc<dyn ChatService>, limits: DocumentLimits) -> Self {
        Self { chat, limits }
    }

    pub fn limits(&self) -> &DocumentLimits {
        &self.limits
    }

    /// Answer `question` about `document`.
    ///
    /// Documents over `max_document_chars` are condensed chunk by chunk before the final call.
    pub async fn answer(&self, document: &str, question: &str) -> Result<String> {
        let chars = document.chars().count();
        if chars <= self.limits.max_document_chars {
            debug!(target: "docuq::pipeline", "Asking about {} chars of document text", chars);
            return self.ask(build_prompt(document, question)).await;
        }

        let condensed = self.condense(document, chars, question).await?;
        self.ask(build_prompt(&condensed, question)).await
    }

    async fn condense(&self, document: &str, chars: usize, question: &str) -> Result<String> {
        let chunks = chunk_document(document, self.limits.chunk_chars);
        if chunks.len() > self.limits.max_chunks {
            return Err(DocuqError::DocumentTooLarge {
                chars,
                chunks: chunks.len(),
                max_chunks: self.limits.max_chunks,
            });
        }

        info!(
            target: "docuq::pipeline",
            "Document has {} chars, condensing {} chunks",
            chars,
            chunks.len()
        );

        let total = chunks.len();
        let mut notes = Vec::with_capacity(total);
        for (i, chunk) in chunks.iter().enumerate() {
            let note = self
                .ask(build_condense_prompt(chunk, question, i + 1, total))
                .await?;
            notes.push(note);
        }

        let joined = notes.join("\n\n");
        Ok(truncate_chars(&joined, self.limits.max_document_chars).to_string())
    }

    async fn ask(&self, content: String) -> Result<String> {
        self.chat.complete(vec![ChatMessage::user(content)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every prompt and answers with a fixed reply.
    struct RecordingChat {
        prompts: Mutex<Vec<String>>,
        reply: String,
    }

    impl RecordingChat {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatService for RecordingChat {
        async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String> {
            assert_eq!(messages.len(), 1);
            self.prompts.lock().unwrap().push(messages[0].content.clone());
            Ok(self.reply.clone())
        }
    }

    #[test]
    fn test_build_prompt_format() {
        assert_eq!(
            build_prompt("Hello\n\nWorld", "What is this?"),
            "Document content:\nHello\n\nWorld\n\nQuestion: What is this?"
        );
        assert_eq!(build_prompt("", "Q"), "Document content:\n\n\nQuestion: Q");
    }

    #[tokio::test]
    async fn test_small_document_single_call() {
        let chat = RecordingChat::new("An answer");
        let service = AnsweringService::new(chat.clone(), DocumentLimits::default());

        let answer = service.answer("Hello\n\nWorld", "What is this?").await.unwrap();

        assert_eq!(answer, "An answer");
        assert_eq!(
            chat.prompts(),
            vec!["Document content:\nHello\n\nWorld\n\nQuestion: What is this?".to_string()]
        );
    }

    #[tokio::test]
    async fn test_large_document_is_condensed() {
        let chat = RecordingChat::new("note");
        let limits = DocumentLimits {
            max_document_chars: 10,
            chunk_chars: 6,
            max_chunks: 4,
        };
        let service = AnsweringService::new(chat.clone(), limits);

        let answer = service.answer("aaaaa\n\nbbbbb\n\nccccc", "Q?").await.unwrap();
        assert_eq!(answer, "note");

        let prompts = chat.prompts();
        assert_eq!(prompts.len(), 4);
        assert!(prompts[0].contains("part 1 of 3"));
        assert!(prompts[0].contains("Excerpt:\naaaaa"));
        assert!(prompts[2].contains("Excerpt:\nccccc"));
        // Notes joined (16 chars) then truncated to the 10 char limit
        assert_eq!(prompts[3], "Document content:\nnote\n\nnote\n\nQuestion: Q?");
    }

    #[tokio::test]
    async fn test_too_many_chunks_is_refused() {
        let chat = RecordingChat::new("note");
        let limits = DocumentLimits {
            max_document_chars: 4,
            chunk_chars: 2,
            max_chunks: 2,
        };
        let service = AnsweringService::new(chat.clone(), limits);

        let result = service.answer("abcdefgh", "Q?").await;

        assert!(matches!(
            result,
            Err(DocuqError::DocumentTooLarge {
                chars: 8,
                chunks: 4,
                max_chunks: 2
            })
        ));
        assert!(chat.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_refusal_reports_chunk_count_not_chars() {
        let chat = RecordingChat::new("note");
        let limits = DocumentLimits {
            max_document_chars: 10,
            chunk_chars: 10,
            max_chunks: 3,
        };
        let service = AnsweringService::new(chat.clone(), limits);

        // Four 6-char paragraphs cannot share a 10-char chunk, so 30 chars need 4 chunks
        let document = "aaaaaa\n\nbbbbbb\n\ncccccc\n\ndddddd";
        let err = service.answer(document, "Q?").await.unwrap_err();

        assert!(matches!(
            err,
            DocuqError::DocumentTooLarge {
                chars: 30,
                chunks: 4,
                max_chunks: 3
            }
        ));
        assert_eq!(
            err.to_string(),
            "Document too large: 30 characters needs 4 chunks, limit is 3"
        );
        assert!(chat.prompts().is_empty());
    }
}
