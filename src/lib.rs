//! Van Tutor Core Library
//!
//! Core of the literature tutoring backend: matching free-text Vietnamese
//! topic queries against a curated curriculum list, gating meaningless
//! queries before they reach a generative model, and throttling clients.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`text`] - Diacritic folding, punctuation stripping and tokenization
//! - [`topics`] - Composite fuzzy scoring, meaningfulness gate, topic catalog
//! - [`rate_limit`] - Fixed-window per-minute and per-day quotas per client
//! - [`server`] - HTTP routes with rate-limit middleware
//! - [`config`] - File configuration and settings resolution

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod rate_limit;
pub mod server;
pub mod text;
pub mod topics;

// Re-export commonly used types
pub use rate_limit::{RateLimitDecision, RateLimitPolicy, RateLimitRejection, RequestLimiter};
pub use text::{NormalizedText, normalize, tokenize};
pub use topics::{
    Candidate, TOPIC_MATCH_THRESHOLD, TopicCatalog, TopicResolution, is_meaningful_topic,
    score_candidates,
};
