use anyhow::{Context, anyhow};
use chrono::NaiveTime;
use std::env;

/// URL for accessing the PostgreSQL database
pub const DB_URL: &str = "DATABASE_URL";
/// Upper bound on pooled database connections. Defaults to 10.
pub const DB_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
/// Shared HS256 secret used to verify access tokens issued by the auth provider
pub const JWT_SECRET: &str = "JWT_SECRET";
/// Expected `aud` claim of access tokens. Audience is not checked when unset.
pub const JWT_AUDIENCE: &str = "JWT_AUDIENCE";
/// Base URL of the GoTrue-compatible auth provider, e.g. https://project.supabase.co
pub const AUTH_PROVIDER_URL: &str = "AUTH_PROVIDER_URL";
/// API key sent to the auth provider in the `apikey` header
pub const AUTH_PROVIDER_KEY: &str = "AUTH_PROVIDER_KEY";
/// Socket address the HTTP server listens on. Defaults to 0.0.0.0:8080.
pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
/// Local time of day (HH:MM) the daily digest runs at. Defaults to 09:00.
pub const DIGEST_TIME: &str = "DIGEST_TIME";
/// Log level configuration for the application. Uses [tracing_subscriber::EnvFilter] directive syntax.
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// OpenTelemetry span export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_SPAN_EXPORT_URL: &str = "OTEL_SPAN_EXPORT_URL";
/// OpenTelemetry metrics export URL. Should be http://localhost:4317 by default, as the service should
/// have an OpenTelemetry collector sidecar which directs metrics to the correct place
pub const OTEL_METRIC_EXPORT_URL: &str = "OTEL_METRIC_EXPORT_URL";

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DIGEST_TIME: &str = "09:00";

/// Settings read once at startup
#[derive(Debug, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_audience: Option<String>,
    pub auth_provider_url: String,
    pub auth_provider_key: String,
    pub bind_address: String,
    pub digest_time: NaiveTime,
    /// Raw [LOG_LEVEL] directives, if any were given
    pub log_directives: Option<String>,
    /// Span and metric export URLs, present only when both are configured
    pub otel_endpoints: Option<(String, String)>,
}

impl AppConfig {
    pub fn from_env() -> Result<AppConfig, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key/value source. Missing required keys and unparsable
    /// values are reported by name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig, anyhow::Error> {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };

        let database_max_connections = match lookup(DB_MAX_CONNECTIONS) {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("{DB_MAX_CONNECTIONS} must be a positive integer"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let raw_digest_time =
            lookup(DIGEST_TIME).unwrap_or_else(|| DEFAULT_DIGEST_TIME.to_owned());
        let digest_time = NaiveTime::parse_from_str(&raw_digest_time, "%H:%M").with_context(|| {
            format!("{DIGEST_TIME} must look like HH:MM, got \"{raw_digest_time}\"")
        })?;
        let otel_endpoints = lookup(OTEL_SPAN_EXPORT_URL).zip(lookup(OTEL_METRIC_EXPORT_URL));

        Ok(AppConfig {
            database_url: required(DB_URL)?,
            database_max_connections,
            jwt_secret: required(JWT_SECRET)?,
            jwt_audience: lookup(JWT_AUDIENCE).filter(|aud| !aud.is_empty()),
            auth_provider_url: required(AUTH_PROVIDER_URL)?,
            auth_provider_key: required(AUTH_PROVIDER_KEY)?,
            bind_address: lookup(BIND_ADDRESS).unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_owned()),
            digest_time,
            log_directives: lookup(LOG_LEVEL).filter(|directives| !directives.is_empty()),
            otel_endpoints,
        })
    }
}

pub mod test {
    /// URL for accessing the PostgreSQL database during integration tests (should not contain a schema name in the path)
    pub const TEST_DB_URL: &str = "TEST_DB_URL";
}
