//! Read-only catalog of canonical topics, normalized once at load time.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::curriculum::DEFAULT_TOPICS;
use super::matcher::{Candidate, PreparedText, TOPIC_MATCH_THRESHOLD, rank_prepared};
use super::validation::is_meaningful_topic;
use crate::text::NormalizedText;

#[derive(Debug, Clone)]
struct CatalogEntry {
    display: String,
    prepared: PreparedText,
}

/// Curated topic list the matcher ranks queries against.
#[derive(Debug, Clone, Default)]
pub struct TopicCatalog {
    entries: Vec<CatalogEntry>,
}

/// Outcome of resolving a free-text query against the catalog.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TopicResolution {
    /// The query failed [`is_meaningful_topic`] and was not scored.
    Rejected { normalized: NormalizedText },
    /// The query was scored; `best_match` is set when the top candidate
    /// reaches [`TOPIC_MATCH_THRESHOLD`].
    Ranked {
        normalized: NormalizedText,
        candidates: Vec<Candidate>,
        best_match: Option<Candidate>,
    },
}

impl TopicResolution {
    #[must_use]
    pub fn normalized(&self) -> &NormalizedText {
        match self {
            Self::Rejected { normalized } | Self::Ranked { normalized, .. } => normalized,
        }
    }

    #[must_use]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

impl TopicCatalog {
    /// Builds a catalog from display strings.
    ///
    /// Entries that normalize to nothing are skipped, and entries whose
    /// normalized form repeats an earlier one are dropped (first display form wins).
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for topic in topics {
            let display = topic.as_ref().trim();
            let prepared = PreparedText::new(display);
            if prepared.is_empty() {
                continue;
            }
            if seen.insert(prepared.normalized().clone()) {
                entries.push(CatalogEntry {
                    display: display.to_string(),
                    prepared,
                });
            }
        }

        Self { entries }
    }

    /// Catalog of the built-in curriculum works.
    #[must_use]
    pub fn curriculum() -> Self {
        Self::new(DEFAULT_TOPICS.iter().copied())
    }

    /// Loads a catalog from a file with one topic per line.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    /// Returns error if the file cannot be read.
    #[instrument]
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read topics file '{}'", path.display()))?;

        let catalog = Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        );
        info!(topics = catalog.len(), path = %path.display(), "loaded topics file");
        Ok(catalog)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display forms in catalog order.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.display.as_str())
    }

    /// Ranks catalog topics against `query`; same contract as
    /// [`score_candidates`](super::score_candidates).
    #[must_use]
    pub fn score(&self, query: &str, top_k: usize) -> Vec<Candidate> {
        let query = PreparedText::new(query);
        rank_prepared(
            &query,
            self.entries
                .iter()
                .map(|entry| (entry.display.as_str(), &entry.prepared)),
            top_k,
        )
    }

    /// Applies the meaningfulness gate, then ranks the query.
    #[must_use]
    #[instrument(skip(self), fields(catalog_size = self.len()))]
    pub fn resolve(&self, query: &str, top_k: usize) -> TopicResolution {
        let normalized = PreparedText::new(query).normalized().clone();

        if !is_meaningful_topic(query) {
            debug!(normalized = %normalized, "rejected topic query");
            return TopicResolution::Rejected { normalized };
        }

        let candidates = self.score(query, top_k);
        let best_match = candidates
            .first()
            .filter(|candidate| candidate.score >= TOPIC_MATCH_THRESHOLD)
            .cloned();
        debug!(
            normalized = %normalized,
            candidates = candidates.len(),
            matched = best_match.is_some(),
            "resolved topic query"
        );

        TopicResolution::Ranked {
            normalized,
            candidates,
            best_match,
        }
    }
}
