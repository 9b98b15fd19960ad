//! Multi-signal fuzzy scoring of a query against candidate topics.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::text::{NormalizedText, normalize, tokenize};

/// Score at or above which a candidate should be treated as a confident match.
///
/// Advisory only: [`score_candidates`] never filters on it.
pub const TOPIC_MATCH_THRESHOLD: f64 = 0.45;

/// Default number of candidates returned by [`score_candidates`].
pub const DEFAULT_TOP_K: usize = 8;

/// Normalized queries shorter than this are never scored.
const MIN_QUERY_CHARS: usize = 2;

/// Bonus when the candidate contains the whole query.
const CONTAINMENT_BONUS: f64 = 0.35;

/// Bonus when the query contains the whole candidate.
const REVERSE_CONTAINMENT_BONUS: f64 = 0.25;

/// Query must be longer than this fraction of the candidate for the reverse
/// containment bonus. Tunable; kept at the calibrated value.
const REVERSE_CONTAINMENT_MIN_RATIO: f64 = 0.5;

/// Maximum bonus for query tokens that prefix (or are prefixed by) a candidate token.
const PREFIX_BONUS: f64 = 0.15;

/// Query tokens shorter than this never take part in prefix matching.
const MIN_PREFIX_TOKEN_CHARS: usize = 2;

/// Flat bonus when enough query tokens overlap candidate tokens.
const OVERLAP_BONUS: f64 = 0.15;

/// Overlap bonus applies when at least 3/5 (60%) of query tokens overlap.
const OVERLAP_RATIO_NUMERATOR: usize = 3;
const OVERLAP_RATIO_DENOMINATOR: usize = 5;

/// A scored topic, carrying the topic's original display form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub topic: String,
    pub score: f64,
}

/// Text prepared once for scoring: its normalized form and tokens.
#[derive(Debug, Clone)]
pub(crate) struct PreparedText {
    normalized: NormalizedText,
    tokens: Vec<String>,
}

impl PreparedText {
    pub(crate) fn new(raw: &str) -> Self {
        let normalized = normalize(raw);
        let tokens = tokenize(&normalized).into_iter().map(String::from).collect();
        Self { normalized, tokens }
    }

    pub(crate) fn normalized(&self) -> &NormalizedText {
        &self.normalized
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Scores `query` against every topic and returns the best `top_k` candidates.
///
/// Candidates are sorted by descending score (ties keep input order), only
/// scores above zero are kept. Queries that normalize to fewer than two
/// characters return nothing. Topics that normalize to the empty string
/// (pure punctuation, say) are skipped rather than scored.
///
/// # Examples
///
/// ```
/// use van_tutor_core::topics::score_candidates;
///
/// let ranked = score_candidates("chu nguoi tu tu", &["Truyện Kiều", "Chữ người tử tù"], 8);
/// assert_eq!(ranked[0].topic, "Chữ người tử tù");
/// assert!((ranked[0].score - 1.0).abs() < f64::EPSILON);
/// ```
#[must_use]
#[instrument(skip(topics), fields(topic_count = topics.len()))]
pub fn score_candidates<S: AsRef<str>>(query: &str, topics: &[S], top_k: usize) -> Vec<Candidate> {
    let query = PreparedText::new(query);
    let prepared: Vec<(String, PreparedText)> = topics
        .iter()
        .map(|topic| {
            let topic = topic.as_ref();
            (topic.to_string(), PreparedText::new(topic))
        })
        .collect();

    rank_prepared(
        &query,
        prepared.iter().map(|(display, text)| (display.as_str(), text)),
        top_k,
    )
}

/// Scores a single pair of raw strings with the composite algorithm.
///
/// Unlike [`score_candidates`] this applies no minimum query length, but a
/// query or candidate that normalizes to the empty string scores 0.0.
#[must_use]
pub fn score_pair(query: &str, candidate: &str) -> f64 {
    let query = PreparedText::new(query);
    let candidate = PreparedText::new(candidate);
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    composite_score(&query, &candidate)
}

pub(crate) fn rank_prepared<'a, I>(query: &PreparedText, topics: I, top_k: usize) -> Vec<Candidate>
where
    I: IntoIterator<Item = (&'a str, &'a PreparedText)>,
{
    if query.normalized.char_len() < MIN_QUERY_CHARS {
        debug!(query = %query.normalized, "query too short to score");
        return Vec::new();
    }

    let mut candidates: Vec<Candidate> = topics
        .into_iter()
        // A topic with nothing left after normalization cannot be matched.
        .filter(|(_, prepared)| !prepared.is_empty())
        .map(|(display, prepared)| Candidate {
            topic: display.to_string(),
            score: composite_score(query, prepared),
        })
        .collect();

    // `sort_by` is stable, so equal scores keep their input order.
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.retain(|candidate| candidate.score > 0.0);
    candidates.truncate(top_k);

    debug!(
        query = %query.normalized,
        returned = candidates.len(),
        "scored topic candidates"
    );
    candidates
}

#[allow(clippy::cast_precision_loss)]
fn composite_score(query: &PreparedText, candidate: &PreparedText) -> f64 {
    let q = query.normalized.as_str();
    let c = candidate.normalized.as_str();

    let mut score = jaccard(&query.tokens, &candidate.tokens);

    if c.contains(q) {
        score += CONTAINMENT_BONUS;
    }

    let q_len = query.normalized.char_len() as f64;
    let c_len = candidate.normalized.char_len() as f64;
    if q_len > REVERSE_CONTAINMENT_MIN_RATIO * c_len && q.contains(c) {
        score += REVERSE_CONTAINMENT_BONUS;
    }

    if !query.tokens.is_empty() {
        let prefix_matches = query
            .tokens
            .iter()
            .filter(|token| token.chars().count() >= MIN_PREFIX_TOKEN_CHARS)
            .filter(|token| {
                candidate
                    .tokens
                    .iter()
                    .any(|other| other.starts_with(token.as_str()) || token.starts_with(other.as_str()))
            })
            .count();
        score += PREFIX_BONUS * (prefix_matches as f64 / query.tokens.len() as f64);

        let overlapping = query
            .tokens
            .iter()
            .filter(|token| {
                candidate
                    .tokens
                    .iter()
                    .any(|other| other.contains(token.as_str()) || token.contains(other.as_str()))
            })
            .count();
        if overlapping * OVERLAP_RATIO_DENOMINATOR >= query.tokens.len() * OVERLAP_RATIO_NUMERATOR {
            score += OVERLAP_BONUS;
        }
    }

    score.min(1.0)
}

#[allow(clippy::cast_precision_loss)]
fn jaccard(left: &[String], right: &[String]) -> f64 {
    let left: HashSet<&str> = left.iter().map(String::as_str).collect();
    let right: HashSet<&str> = right.iter().map(String::as_str).collect();

    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    intersection as f64 / union as f64
}
