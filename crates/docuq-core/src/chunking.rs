//! Splitting oversized documents into model-sized pieces.

/// Pack blank-line separated paragraphs into chunks of at most `chunk_chars` characters.
///
/// Paragraphs longer than `chunk_chars` are hard-split on char boundaries. Empty input
/// produces no chunks and no chunk is ever empty.
pub fn chunk_document(text: &str, chunk_chars: usize) -> Vec<String> {
    let chunk_chars = chunk_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for para in text.split("\n\n") {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }
        let para_len = para.chars().count();

        // Separator costs two chars when the paragraph joins a non-empty chunk
        let joined_len = if current.is_empty() {
            para_len
        } else {
            current_len + 2 + para_len
        };

        if joined_len <= chunk_chars {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(para);
            current_len = joined_len;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if para_len <= chunk_chars {
            current.push_str(para);
            current_len = para_len;
        } else {
            let chars: Vec<char> = para.chars().collect();
            for piece in chars.chunks(chunk_chars) {
                chunks.push(piece.iter().collect());
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input_has_no_chunks() {
        assert!(chunk_document("", 10).is_empty());
        assert!(chunk_document("\n\n\n\n", 10).is_empty());
    }

    #[test]
    fn test_packs_paragraphs_greedily() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        assert_eq!(chunk_document(text, 10), vec!["aaaa\n\nbbbb", "cccc"]);
        assert_eq!(chunk_document(text, 100), vec![text]);
    }

    #[test]
    fn test_hard_splits_long_paragraph() {
        let chunks = chunk_document("abcdefghij\n\nxy", 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn test_split_respects_multibyte_chars() {
        let chunks = chunk_document("ééééé", 2);
        assert_eq!(chunks, vec!["éé", "éé", "é"]);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("", 2), "");
    }

    proptest! {
        #[test]
        fn prop_chunks_are_bounded_and_non_empty(
            paras in proptest::collection::vec("[a-z]{1,30}", 0..20),
            limit in 1usize..40,
        ) {
            let text = paras.join("\n\n");
            let chunks = chunk_document(&text, limit);
            for chunk in &chunks {
                prop_assert!(!chunk.is_empty());
                prop_assert!(chunk.chars().count() <= limit);
            }
            let rebuilt: String = chunks.concat().replace("\n\n", "");
            prop_assert_eq!(rebuilt, paras.concat());
        }
    }
}
