//! Cheap gate that rejects gibberish or too-short topic queries.

use tracing::{debug, instrument};

use crate::text::{normalize, tokenize};

const MIN_QUERY_CHARS: usize = 4;
const MIN_SINGLE_TOKEN_CHARS: usize = 8;
const SHORT_TOKEN_MAX_CHARS: usize = 2;
const MIN_SHORT_TOKEN_COUNT: usize = 3;
const MIN_SIGNIFICANT_TOKEN_CHARS: usize = 3;

/// Returns whether `query` carries enough signal to be worth matching or
/// sending on to generation.
///
/// Rules, first failure wins:
/// 1. Empty input is rejected
/// 2. Normalized text must be at least 4 characters
/// 3. A single-token query must be at least 8 characters
/// 4. Fewer than 3 tokens that are all 2 characters or shorter are rejected
/// 5. At least one token must be 3 characters or longer
///
/// # Examples
///
/// ```
/// use van_tutor_core::topics::is_meaningful_topic;
///
/// assert!(is_meaningful_topic("Đăm Săn"));
/// assert!(!is_meaningful_topic("d a m"));
/// ```
#[must_use]
#[instrument]
pub fn is_meaningful_topic(query: &str) -> bool {
    if query.is_empty() {
        return false;
    }

    let normalized = normalize(query);
    let length = normalized.char_len();
    if length < MIN_QUERY_CHARS {
        debug!(length, "topic query too short");
        return false;
    }

    let tokens = tokenize(&normalized);
    let token_lengths: Vec<usize> = tokens.iter().map(|token| token.chars().count()).collect();

    if tokens.len() < 2 && length < MIN_SINGLE_TOKEN_CHARS {
        debug!(length, "single-word topic query too short");
        return false;
    }

    if tokens.len() < MIN_SHORT_TOKEN_COUNT
        && token_lengths.iter().all(|len| *len <= SHORT_TOKEN_MAX_CHARS)
    {
        debug!(tokens = tokens.len(), "topic query made of short fragments");
        return false;
    }

    if !token_lengths
        .iter()
        .any(|len| *len >= MIN_SIGNIFICANT_TOKEN_CHARS)
    {
        debug!("topic query has no significant token");
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_is_not_meaningful() {
        assert!(!is_meaningful_topic(""));
        assert!(!is_meaningful_topic("   "));
    }

    #[test]
    fn test_short_queries_are_not_meaningful() {
        assert!(!is_meaningful_topic("d"));
        assert!(!is_meaningful_topic("abc"));
        assert!(!is_meaningful_topic("Đ!?"));
    }

    #[test]
    fn test_single_word_needs_eight_characters() {
        assert!(!is_meaningful_topic("Sóng"));
        assert!(!is_meaningful_topic("truyen"));
        assert!(is_meaningful_topic("Tuyenngon"));
        assert!(is_meaningful_topic("chinhphu"));
    }

    #[test]
    fn test_letter_by_letter_noise_is_not_meaningful() {
        // three single letters pass the short-fragment rule but have no token >= 3
        assert!(!is_meaningful_topic("d a m"));
        assert!(!is_meaningful_topic("ab cd"));
        assert!(!is_meaningful_topic("a b c d e"));
    }

    #[test]
    fn test_multi_word_topics_are_meaningful() {
        assert!(is_meaningful_topic("dam san"));
        assert!(is_meaningful_topic("Đăm Săn"));
        assert!(is_meaningful_topic("Chữ người tử tù"));
        assert!(is_meaningful_topic("vo nhat"));
    }

    #[test]
    fn test_diacritics_do_not_count_toward_length() {
        // "ăn ở" folds to "an o": 4 chars but no token of length 3
        assert!(!is_meaningful_topic("ăn ở"));
    }
}
