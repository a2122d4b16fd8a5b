//! Request signing command.
//!
//! Prints the `X-Slack-Signature` header Slack would send for a body, for
//! replaying webhooks against a local bot with curl.
//!
//! # Usage
//!
//! ```bash
//! pear-cli sign --body 'command=%2Fpear&text=rust&user_id=U1'
//! pear-cli sign --timestamp 1700000000 --body 'payload=...'
//! ```
//!
//! # Environment Variables
//!
//! - `SLACK_SIGNING_SECRET` - Slack app signing secret

use pear_bot::slack::{SIGNATURE_HEADER, SignatureVerifier, TIMESTAMP_HEADER, unix_now};
use secrecy::SecretString;

use super::{CommandError, required_env};

/// Headers for a signed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    /// `X-Slack-Request-Timestamp` value.
    pub timestamp: String,
    /// `X-Slack-Signature` value.
    pub signature: String,
}

/// Sign `body` at `timestamp` (defaults to now).
///
/// # Errors
///
/// Returns error if `SLACK_SIGNING_SECRET` is unset.
pub fn run(timestamp: Option<i64>, body: &str) -> Result<SignedHeaders, CommandError> {
    let secret = SecretString::from(required_env("SLACK_SIGNING_SECRET")?);
    let timestamp = match timestamp {
        Some(ts) => ts,
        None => unix_now()?,
    };

    sign_with(&SignatureVerifier::new(secret), timestamp, body)
}

fn sign_with(
    verifier: &SignatureVerifier,
    timestamp: i64,
    body: &str,
) -> Result<SignedHeaders, CommandError> {
    let timestamp = timestamp.to_string();
    let signature = verifier.sign(&timestamp, body.as_bytes())?;

    Ok(SignedHeaders {
        timestamp,
        signature,
    })
}

/// Render the headers as curl `-H` arguments.
#[must_use]
pub fn curl_headers(headers: &SignedHeaders) -> String {
    format!(
        "-H '{TIMESTAMP_HEADER}: {}' -H '{SIGNATURE_HEADER}: {}'",
        headers.timestamp, headers.signature
    )
}
