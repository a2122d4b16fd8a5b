//! Slack signature verification middleware.
//!
//! Buffers the body, checks `X-Slack-Signature` against it, then hands the
//! same bytes to the handler. Unsigned or stale requests never reach a handler.

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::AppError;
use crate::slack::{SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER};

/// Largest webhook body accepted. Slack payloads are well under this.
pub const MAX_BODY_BYTES: usize = 512 * 1024;

/// Reject requests whose Slack signature is missing, stale, or wrong.
///
/// # Errors
///
/// Returns `AppError::Unauthorized` for any verification failure and
/// `AppError::BadRequest` if the body cannot be read.
pub async fn verify_slack_signature(
    State(verifier): State<SignatureVerifier>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (parts, body) = request.into_parts();

    let timestamp = header_str(&parts.headers, TIMESTAMP_HEADER)?.to_owned();
    let signature = header_str(&parts.headers, SIGNATURE_HEADER)?.to_owned();

    let bytes = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read body: {e}")))?;

    verifier.verify(&timestamp, &bytes, &signature)?;

    Ok(next
        .run(Request::from_parts(parts, Body::from(bytes)))
        .await)
}

/// Header lookup is case-insensitive; `HeaderMap` normalizes names.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, AppError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {name} header")))
}
