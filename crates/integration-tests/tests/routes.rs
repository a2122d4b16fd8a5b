//! Integration tests for the HTTP surface.
//!
//! Requests go through the full router, signature middleware included, with
//! the fakes standing in for Postgres and Slack.

use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use pear_bot::middleware::MAX_BODY_BYTES;
use pear_bot::routes;
use pear_bot::slack::unix_now;
use pear_integration_tests::{
    TestState, block_actions, interaction_body, signature, signed_post, signed_post_at,
    slash_command_body, state, with_message,
};

async fn send(state: &TestState, request: Request<Body>) -> Response<Body> {
    routes::app(state.clone())
        .oneshot(request)
        .await
        .expect("router is infallible")
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

fn assert_untouched(state: &TestState) {
    assert_eq!(state.service().store().calls(), 0, "store should not be called");
    assert!(
        state.service().chat().calls().is_empty(),
        "chat should not be called"
    );
}

// =============================================================================
// Signature Tests
// =============================================================================

#[tokio::test]
async fn test_new_with_valid_signature() {
    let state = state();
    let body = slash_command_body("U0REQUEST", "learn Go");

    let response = send(&state, signed_post("/new", &body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).expect("JSON reply");
    assert_eq!(json["response_type"], "ephemeral");
    assert_eq!(json["blocks"][1]["type"], "actions");
}

#[tokio::test]
async fn test_header_names_are_case_insensitive() {
    let state = state();
    let body = slash_command_body("U0REQUEST", "rust");
    let timestamp = unix_now().expect("clock");

    let request = Request::post("/new")
        .header("X-Slack-Request-Timestamp", timestamp.to_string())
        .header("X-SLACK-SIGNATURE", signature(timestamp, &body))
        .body(Body::from(body))
        .expect("request");

    let response = send(&state, request).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_signature_rejected() {
    let state = state();
    let body = slash_command_body("U0REQUEST", "list");

    let request = Request::post("/new")
        .header("x-slack-request-timestamp", unix_now().expect("clock").to_string())
        .body(Body::from(body))
        .expect("request");

    let response = send(&state, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_untouched(&state);
}

#[tokio::test]
async fn test_missing_timestamp_rejected() {
    let state = state();
    let body = slash_command_body("U0REQUEST", "list");

    let request = Request::post("/new")
        .header("x-slack-signature", signature(unix_now().expect("clock"), &body))
        .body(Body::from(body))
        .expect("request");

    let response = send(&state, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_untouched(&state);
}

#[tokio::test]
async fn test_stale_timestamp_rejected() {
    let state = state();
    let body = slash_command_body("U0REQUEST", "list");
    let stale = unix_now().expect("clock") - 600;

    let response = send(&state, signed_post_at("/new", &body, stale)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_untouched(&state);
}

#[tokio::test]
async fn test_tampered_body_rejected() {
    let state = state();
    let body = interaction_body(&block_actions("U0REQUEST", &[("submit-seed", "rust")]));
    let timestamp = unix_now().expect("clock");

    let request = Request::post("/submit")
        .header("x-slack-request-timestamp", timestamp.to_string())
        .header("x-slack-signature", signature(timestamp, &body))
        .body(Body::from(body.replace("rust", "ruby")))
        .expect("request");

    let response = send(&state, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, "Unauthorized");
    assert_untouched(&state);
}

// =============================================================================
// Payload Tests
// =============================================================================

#[tokio::test]
async fn test_new_without_user_is_bad_request() {
    let state = state();

    let response = send(&state, signed_post("/new", "command=%2Fpear&text=rust")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_untouched(&state);
}

#[tokio::test]
async fn test_submit_with_invalid_json_is_bad_request() {
    let state = state();

    let response = send(&state, signed_post("/submit", "payload=%7Bnot-json")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_untouched(&state);
}

#[tokio::test]
async fn test_submit_with_two_actions_is_bad_request() {
    let state = state();
    let body = interaction_body(&block_actions(
        "U0REQUEST",
        &[("submit-seed", "rust"), ("pick-pear", "1")],
    ));

    let response = send(&state, signed_post("/submit", &body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_untouched(&state);
}

#[tokio::test]
async fn test_oversized_body_is_bad_request() {
    let state = state();
    let body = format!(
        "{}&padding={}",
        slash_command_body("U0REQUEST", "rust"),
        "a".repeat(MAX_BODY_BYTES)
    );

    let response = send(&state, signed_post("/new", &body)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Bad Request");
    assert_untouched(&state);
}

#[tokio::test]
async fn test_pick_with_non_numeric_id_is_bad_request() {
    let state = state();
    let payload = with_message(
        block_actions("U0HELPER", &[("pick-pear", "seed-one")]),
        Some("<@U0REQUEST> wants to learn rust. :seedling:"),
    );

    let response = send(&state, signed_post("/submit", &interaction_body(&payload))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_untouched(&state);
}

#[tokio::test]
async fn test_submit_without_response_url_is_bad_request() {
    let state = state();
    let mut payload = block_actions("U0REQUEST", &[("submit-seed", "rust")]);
    if let Some(fields) = payload.as_object_mut() {
        fields.remove("response_url");
    }

    let response = send(&state, signed_post("/submit", &interaction_body(&payload))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_untouched(&state);
}

#[tokio::test]
async fn test_submit_confirm_returns_empty_ok() {
    let state = state();
    let body = interaction_body(&block_actions("U0REQUEST", &[("submit-seed", "rust")]));

    let response = send(&state, signed_post("/submit", &body)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.is_empty());
    assert_eq!(state.service().store().seeds().len(), 1);
    assert_eq!(state.service().chat().calls().len(), 2);
}

#[tokio::test]
async fn test_announcement_failure_is_server_error() {
    let state = state();
    state.service().chat().fail_post_message();
    let body = interaction_body(&block_actions("U0REQUEST", &[("submit-seed", "rust")]));

    let response = send(&state, signed_post("/submit", &body)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    // Internal details stay in the logs
    assert_eq!(body_text(response).await, "Internal Server Error");
    assert_eq!(state.service().store().seeds().len(), 1);
}

// =============================================================================
// Health Tests
// =============================================================================

#[tokio::test]
async fn test_health_needs_no_signature() {
    let state = state();

    let response = send(
        &state,
        Request::get("/health").body(Body::empty()).expect("request"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_reflects_store() {
    let state = state();

    let ready = send(
        &state,
        Request::get("/health/ready").body(Body::empty()).expect("request"),
    )
    .await;
    assert_eq!(ready.status(), StatusCode::OK);

    state.service().store().set_unavailable(true);
    let unavailable = send(
        &state,
        Request::get("/health/ready").body(Body::empty()).expect("request"),
    )
    .await;
    assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
}
