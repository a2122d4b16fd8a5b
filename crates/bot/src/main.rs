//! Pear bot - Slack webhook server.
//!
//! # Architecture
//!
//! - Axum web framework
//! - `PostgreSQL` for seeds and pears (migrations run on startup)
//! - Slack Web API for announcements and direct messages
//!
//! # Endpoints
//!
//! - `POST /new` and `POST /submit` (Slack-signed)
//! - `GET /health` and `GET /health/ready`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use pear_bot::config::BotConfig;
use pear_bot::db::{self, PearRepository};
use pear_bot::routes;
use pear_bot::services::PearService;
use pear_bot::slack::{SignatureVerifier, SlackClient};
use pear_bot::state::BotState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &BotConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            // Slack user IDs are the only user data we hold; keep them out
            send_default_pii: false,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `DEBUG` picks debug or info for the bot.
fn init_tracing(config: &BotConfig) {
    let default_filter = if config.debug {
        "pear_bot=debug,tower_http=debug"
    } else {
        "pear_bot=info,tower_http=info"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    let json_layer = config
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!config.json_logs).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // No subscriber yet; stderr is the only sink
            #[allow(clippy::print_stderr)]
            eprintln!("pear-bot: failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);
    init_tracing(&config);

    for warning in config.secret_warnings() {
        tracing::warn!(%warning, "Weak secret configured");
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "pear-bot exited with error");
            ExitCode::FAILURE
        }
    }
}

/// Connect, migrate, and serve until a shutdown signal arrives.
async fn run(config: BotConfig) -> Result<(), Box<dyn std::error::Error>> {
    let pool = db::create_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout,
    )
    .await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    let slack = SlackClient::new(
        config.slack.bot_token.clone(),
        config.slack.api_base.clone(),
        config.slack.http_timeout,
    )?;

    let service = PearService::new(
        PearRepository::new(pool),
        slack,
        config.slack.channel_id.clone(),
    );
    let state = BotState::new(
        service,
        SignatureVerifier::new(config.slack.signing_secret.clone()),
    );

    let app = routes::app(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("pear-bot listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
