//! HTTP route handlers for the bot.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health        - Liveness check
//! GET  /health/ready  - Readiness check (database ping)
//!
//! # Slack webhooks (signature verified)
//! POST /new           - `/pear` slash command
//! POST /submit        - Block Kit button interactions
//! ```

pub mod slack;

use axum::{Router, extract::State, http::StatusCode, middleware::from_fn_with_state, routing::get};

use crate::db::PearStore;
use crate::middleware::verify_slack_signature;
use crate::slack::ChatApi;
use crate::state::AppState;

/// Build the application router.
///
/// Health checks are mounted outside the signature middleware so load
/// balancers can reach them.
pub fn app<S: PearStore, C: ChatApi>(state: AppState<S, C>) -> Router {
    let verifier = state.verifier().clone();

    Router::new()
        .merge(
            slack::router::<S, C>()
                .route_layer(from_fn_with_state(verifier, verify_slack_signature)),
        )
        .route("/health", get(health))
        .route("/health/ready", get(readiness::<S, C>))
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness<S: PearStore, C: ChatApi>(State(state): State<AppState<S, C>>) -> StatusCode {
    match state.service().store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
