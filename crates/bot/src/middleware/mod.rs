//! HTTP middleware for the bot.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing with status and latency)
//! 3. Slack signature verification (webhook routes only, via `route_layer`)

mod signature;

pub use signature::{MAX_BODY_BYTES, verify_slack_signature};
