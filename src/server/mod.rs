//! HTTP surface for topic matching.
//!
//! Every `/api` route passes through the rate-limit middleware before its
//! handler runs; `/health` is not throttled.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /health` | liveness |
//! | `POST /api/topics/validate` | normalized form and meaningfulness verdict |
//! | `POST /api/topics/match` | ranked catalog candidates, 422 for meaningless queries |

mod error;
mod routes;
mod throttle;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use error::ApiError;
pub use routes::{MAX_MATCH_LIMIT, MatchRequest, MatchResponse, ValidateRequest, ValidateResponse};
pub use throttle::{AuthenticatedUser, REMAINING_HEADER, USER_ID_HEADER, client_key};

use crate::rate_limit::RequestLimiter;
use crate::topics::TopicCatalog;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub catalog: Arc<TopicCatalog>,
    pub limiter: Arc<RequestLimiter>,
    /// Honour `x-user-id` and `x-forwarded-for` from a fronting proxy.
    pub trust_proxy_headers: bool,
}

impl AppState {
    #[must_use]
    pub fn new(catalog: TopicCatalog, limiter: RequestLimiter) -> Self {
        Self {
            catalog: Arc::new(catalog),
            limiter: Arc::new(limiter),
            trust_proxy_headers: false,
        }
    }

    /// Keys anonymous clients by proxy-supplied headers instead of the peer.
    #[must_use]
    pub fn with_trusted_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/topics/validate", post(routes::validate_topic))
        .route("/api/topics/match", post(routes::match_topic))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            throttle::enforce_rate_limit,
        ));

    Router::new()
        .route("/health", get(routes::health))
        .merge(api)
        .layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
        .with_state(state)
}

/// Serves the router on `listener` until Ctrl-C.
///
/// # Errors
/// Returns error if the server fails while accepting connections.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let local_addr = listener
        .local_addr()
        .context("Cannot read listener address")?;
    info!(addr = %local_addr, topics = state.catalog.len(), "listening");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
