//! Bot configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SLACK_SIGNING_SECRET` - Slack app signing secret for webhook verification
//! - `SLACK_BOT_TOKEN` - Slack bot token (xoxb-...)
//! - `SLACK_CHANNEL_ID` - Channel where new seeds are announced
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `PORT` - Listen port
//!
//! ## Optional
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `DEBUG` - Enable debug logging (`1`, `true`, `yes`, `on`)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SLACK_API_BASE` - Slack Web API base URL (default: <https://slack.com/api>)
//! - `HTTP_TIMEOUT_SECS` - Outbound HTTP timeout (default: 10)
//! - `DB_TIMEOUT_SECS` - Pool acquire and statement timeout (default: 5)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::slack::SLACK_API_BASE;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DB_TIMEOUT_SECS: u64 = 5;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Slack configuration
    pub slack: SlackConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Debug logging
    pub debug: bool,
    /// Emit JSON logs
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
}

/// Slack app configuration.
///
/// Implements `Debug` manually to redact secrets.
#[derive(Clone)]
pub struct SlackConfig {
    /// Slack app signing secret for webhook verification.
    pub signing_secret: SecretString,
    /// Slack bot token (xoxb-...).
    pub bot_token: SecretString,
    /// Channel ID where seeds are announced.
    pub channel_id: String,
    /// Web API base URL.
    pub api_base: String,
    /// Timeout for every outbound Slack request.
    pub http_timeout: Duration,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("bot_token", &"[REDACTED]")
            .field("channel_id", &self.channel_id)
            .field("api_base", &self.api_base)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

/// Database configuration.
///
/// Implements `Debug` manually because the URL contains the password.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// `PostgreSQL` database connection URL
    pub url: SecretString,
    /// Pool size
    pub max_connections: u32,
    /// Acquire and statement timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` naming the first required variable that is
    /// missing, or the first variable that fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`BotConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let signing_secret = env.required_secret("SLACK_SIGNING_SECRET")?;
        let bot_token = env.required_secret("SLACK_BOT_TOKEN")?;
        let channel_id = env.required("SLACK_CHANNEL_ID")?;
        let database_url = env.required_secret("DATABASE_URL")?;
        let port = env.required_parsed::<u16>("PORT")?;
        let host = env.parsed_or("HOST", IpAddr::from([0, 0, 0, 0]))?;
        let debug = env.flag("DEBUG")?;
        let json_logs = env
            .optional("LOG_FORMAT")
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));
        let api_base = env
            .optional("SLACK_API_BASE")
            .unwrap_or_else(|| SLACK_API_BASE.to_string());
        let http_timeout = Duration::from_secs(
            env.parsed_or("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
        );
        let db_timeout =
            Duration::from_secs(env.parsed_or("DB_TIMEOUT_SECS", DEFAULT_DB_TIMEOUT_SECS)?);
        let max_connections = env.parsed_or("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS)?;

        Ok(Self {
            slack: SlackConfig {
                signing_secret,
                bot_token,
                channel_id,
                api_base,
                http_timeout,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                timeout: db_timeout,
            },
            host,
            port,
            debug,
            json_logs,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Check the Slack secrets for placeholders and low entropy.
    ///
    /// Returns one warning per suspicious secret; loading never fails on these.
    #[must_use]
    pub fn secret_warnings(&self) -> Vec<ConfigError> {
        use secrecy::ExposeSecret;

        [
            ("SLACK_SIGNING_SECRET", &self.slack.signing_secret),
            ("SLACK_BOT_TOKEN", &self.slack.bot_token),
        ]
        .into_iter()
        .filter_map(|(name, secret)| validate_secret_strength(secret.expose_secret(), name).err())
        .collect()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with typed accessors.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable. Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a required variable as a secret.
    fn required_secret(&self, key: &str) -> Result<SecretString, ConfigError> {
        self.required(key).map(SecretString::from)
    }

    /// Get and parse a required variable.
    fn required_parsed<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        parse_var(key, &self.required(key)?)
    }

    /// Get and parse an optional variable, falling back to `default`.
    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .map_or(Ok(default), |value| parse_var(key, &value))
    }

    /// Get an optional boolean flag (default false).
    fn flag(&self, key: &str) -> Result<bool, ConfigError> {
        self.optional(key).map_or(Ok(false), |value| parse_flag(key, &value))
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
