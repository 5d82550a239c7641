//! Sliding-window text chunker.
//!
//! Splits canonical document text into fixed-size character windows with a
//! fixed overlap, sliding forward by `window - overlap` each step. The
//! final chunk may be shorter than the window. Windows are measured in
//! characters and sliced on UTF-8 boundaries.
//!
//! Each chunk carries its sequence index and a SHA-256 hash of its text.

use sha2::{Digest, Sha256};

use crate::models::Chunk;

/// Split `text` into overlapping windows. Empty input yields an empty
/// vector, not an error.
///
/// Callers must guarantee `overlap < window` and `window > 0`; config
/// validation enforces both before any build reaches this point.
pub fn chunk_text(text: &str, window: usize, overlap: usize) -> Vec<Chunk> {
    debug_assert!(window > 0 && overlap < window);

    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let stride = window - overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < chars.len() {
        let end = (start + window).min(chars.len());
        let piece: String = chars[start..end].iter().collect();
        chunks.push(make_chunk(chunks.len(), piece));
        if end == chars.len() {
            break;
        }
        start += stride;
    }

    chunks
}

fn make_chunk(index: usize, text: String) -> Chunk {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    Chunk { index, text, hash }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 400, 80).is_empty());
    }

    #[test]
    fn short_input_is_a_single_chunk() {
        let chunks = chunk_text("hello", 400, 80);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello");
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn windows_overlap_by_configured_amount() {
        // window 10, overlap 4 => stride 6
        let text = "abcdefghijklmnopqrst"; // 20 chars
        let chunks = chunk_text(text, 10, 4);
        assert_eq!(chunks[0].text, "abcdefghij");
        assert_eq!(chunks[1].text, "ghijklmnop");
        assert_eq!(chunks[2].text, "mnopqrst");
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn final_chunk_may_be_shorter_than_window() {
        let chunks = chunk_text("abcdefghijk", 10, 4);
        assert_eq!(chunks.last().unwrap().text, "ghijk");
    }

    #[test]
    fn indices_are_contiguous_from_zero() {
        let chunks = chunk_text(&"x".repeat(100), 10, 4);
        for (i, c) in chunks.iter().enumerate() {
            assert_eq!(c.index, i);
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "五十音図あいうえおかきくけこ";
        let chunks = chunk_text(text, 5, 2);
        assert_eq!(chunks[0].text.chars().count(), 5);
        let rebuilt: String = chunks.iter().map(|c| c.text.as_str()).collect::<String>();
        assert!(rebuilt.starts_with("五十音図あ"));
    }

    #[test]
    fn identical_input_hashes_identically() {
        let a = chunk_text("same text", 400, 80);
        let b = chunk_text("same text", 400, 80);
        assert_eq!(a[0].hash, b[0].hash);
    }
}
