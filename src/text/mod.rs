//! Text normalization for diacritics-insensitive Vietnamese matching.
//!
//! Every comparison in the topic matcher runs on [`NormalizedText`]: lowercase,
//! diacritic-free, punctuation-stripped text with single-space separators.
//! [`tokenize`] splits it into the tokens the scorer works with.

mod normalizer;

pub use normalizer::{NormalizedText, normalize, tokenize, tokens};
