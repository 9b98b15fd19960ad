//! Topic matching for free-text literature queries.
//!
//! Queries are normalized (see [`crate::text`]) and scored against a curated
//! topic list with a composite of token Jaccard similarity, containment,
//! token-prefix and token-overlap signals. [`is_meaningful_topic`] is the
//! cheap gate run before any scoring or generation work.

mod catalog;
mod curriculum;
mod matcher;
mod validation;

pub use catalog::{TopicCatalog, TopicResolution};
pub use curriculum::DEFAULT_TOPICS;
pub use matcher::{Candidate, DEFAULT_TOP_K, TOPIC_MATCH_THRESHOLD, score_candidates, score_pair};
pub use validation::is_meaningful_topic;
