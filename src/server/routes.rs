//! Topic endpoints.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::{ApiError, AppState};
use crate::text::{NormalizedText, normalize};
use crate::topics::{
    Candidate, DEFAULT_TOP_K, TOPIC_MATCH_THRESHOLD, TopicResolution, is_meaningful_topic,
};

/// Largest `limit` a client may ask for.
pub const MAX_MATCH_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub query: String,
    pub normalized: NormalizedText,
    pub meaningful: bool,
}

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub query: String,
    pub normalized: NormalizedText,
    pub candidates: Vec<Candidate>,
    pub best_match: Option<Candidate>,
    pub threshold: f64,
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip_all)]
pub(crate) async fn validate_topic(
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let meaningful = is_meaningful_topic(&request.query);
    debug!(meaningful, "validated topic query");
    Ok(Json(ValidateResponse {
        normalized: normalize(&request.query),
        query: request.query,
        meaningful,
    }))
}

#[instrument(skip_all)]
pub(crate) async fn match_topic(
    State(state): State<AppState>,
    payload: Result<Json<MatchRequest>, JsonRejection>,
) -> Result<Json<MatchResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let limit = request
        .limit
        .unwrap_or(DEFAULT_TOP_K)
        .clamp(1, MAX_MATCH_LIMIT);

    match state.catalog.resolve(&request.query, limit) {
        TopicResolution::Rejected { normalized } => Err(ApiError::NotMeaningful {
            normalized: normalized.into_string(),
        }),
        TopicResolution::Ranked {
            normalized,
            candidates,
            best_match,
        } => Ok(Json(MatchResponse {
            query: request.query,
            normalized,
            candidates,
            best_match,
            threshold: TOPIC_MATCH_THRESHOLD,
        })),
    }
}
