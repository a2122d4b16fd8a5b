//! Slack webhook handlers.
//!
//! Both routes sit behind [`verify_slack_signature`](crate::middleware::verify_slack_signature),
//! so the raw body they receive has already been authenticated.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::post,
};
use tracing::{debug, instrument};

use crate::db::PearStore;
use crate::error::AppError;
use crate::slack::{ChatApi, InteractionPayload, ResponseMessage, SlashCommand};
use crate::state::AppState;

/// Create Slack webhook routes.
pub fn router<S: PearStore, C: ChatApi>() -> Router<AppState<S, C>> {
    Router::new()
        .route("/new", post(handle_new::<S, C>))
        .route("/submit", post(handle_submit::<S, C>))
}

/// Handle the `/pear` slash command.
///
/// Replies inline with an ephemeral message: either the confirm/cancel
/// prompt or the caller's history.
#[instrument(skip(state, body))]
async fn handle_new<S: PearStore, C: ChatApi>(
    State(state): State<AppState<S, C>>,
    body: Bytes,
) -> Result<Json<ResponseMessage>, AppError> {
    let command = SlashCommand::from_form(&body)?;
    debug!(command = %command.command, user = %command.user_id, "Slash command received");

    let message = state.service().handle_new(&command).await?;

    Ok(Json(message))
}

/// Handle a Block Kit button click.
///
/// Every visible effect goes out through `response_url` or the Web API;
/// Slack only needs an empty 200 here.
#[instrument(skip(state, body))]
async fn handle_submit<S: PearStore, C: ChatApi>(
    State(state): State<AppState<S, C>>,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let payload = InteractionPayload::from_form(&body)?;
    debug!(
        interaction = %payload.interaction_type,
        user = %payload.user.id,
        actions = payload.actions.len(),
        "Interaction received"
    );

    state.service().handle_submit(&payload).await?;

    Ok(StatusCode::OK)
}
