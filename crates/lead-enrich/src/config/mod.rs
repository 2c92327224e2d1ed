use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::workflows::enrichment::{RetryPolicy, ValidationConfig};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub enrichment: EnrichmentConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(value) => LogFormat::parse(&value)?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            enrichment: EnrichmentConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Output layout of the fmt subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            _ => Err(ConfigError::InvalidLogFormat(value.to_string())),
        }
    }
}

/// Budgets and toggles for a single lead enrichment run.
///
/// Passed explicitly into the service; nothing in the enrichment workflow reads
/// the environment on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentConfig {
    /// Budget for each fan-out branch (collectors and company research).
    pub collector_timeout: Duration,
    /// Budget for each individual collaborator call.
    pub call_timeout: Duration,
    pub retry_max_attempts: u32,
    pub retry_backoff: Duration,
    pub max_input_chars: usize,
    pub max_team_pages: usize,
    pub max_enrichment_candidates: usize,
    pub max_secondary_matches: usize,
    pub min_employment_confidence: f32,
    pub ai_classification: bool,
    pub name_prefilter: bool,
    pub skip_paid_providers: bool,
    /// URL fragment marking a person profile in role-search hits.
    pub profile_url_marker: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            collector_timeout: Duration::from_secs(45),
            call_timeout: Duration::from_secs(30),
            retry_max_attempts: 2,
            retry_backoff: Duration::from_millis(250),
            max_input_chars: 12_000,
            max_team_pages: 2,
            max_enrichment_candidates: 3,
            max_secondary_matches: 3,
            min_employment_confidence: 0.5,
            ai_classification: true,
            name_prefilter: true,
            skip_paid_providers: false,
            profile_url_marker: "linkedin.com/in/".to_string(),
        }
    }
}

impl EnrichmentConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            collector_timeout: Duration::from_secs(env_number(
                "ENRICH_COLLECTOR_TIMEOUT_SECS",
                defaults.collector_timeout.as_secs(),
            )?),
            call_timeout: Duration::from_secs(env_number(
                "ENRICH_CALL_TIMEOUT_SECS",
                defaults.call_timeout.as_secs(),
            )?),
            retry_max_attempts: env_number("ENRICH_RETRY_MAX_ATTEMPTS", defaults.retry_max_attempts)?
                .max(1),
            retry_backoff: Duration::from_millis(env_number(
                "ENRICH_RETRY_BACKOFF_MS",
                defaults.retry_backoff.as_millis() as u64,
            )?),
            max_input_chars: env_number("ENRICH_MAX_INPUT_CHARS", defaults.max_input_chars)?,
            max_team_pages: env_number("ENRICH_MAX_TEAM_PAGES", defaults.max_team_pages)?,
            max_enrichment_candidates: env_number(
                "ENRICH_MAX_ENRICHMENT_CANDIDATES",
                defaults.max_enrichment_candidates,
            )?,
            max_secondary_matches: env_number(
                "ENRICH_MAX_SECONDARY_MATCHES",
                defaults.max_secondary_matches,
            )?,
            min_employment_confidence: env_number(
                "ENRICH_MIN_EMPLOYMENT_CONFIDENCE",
                defaults.min_employment_confidence,
            )?,
            ai_classification: env_flag("ENRICH_AI_CLASSIFICATION", defaults.ai_classification)?,
            name_prefilter: env_flag("ENRICH_NAME_PREFILTER", defaults.name_prefilter)?,
            skip_paid_providers: env_flag(
                "ENRICH_SKIP_PAID_PROVIDERS",
                defaults.skip_paid_providers,
            )?,
            profile_url_marker: env::var("ENRICH_PROFILE_URL_MARKER")
                .ok()
                .map(|marker| marker.trim().to_lowercase())
                .filter(|marker| !marker.is_empty())
                .unwrap_or(defaults.profile_url_marker),
        })
    }

    /// The retry policy shared by every collaborator call of a run.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_max_attempts.max(1),
            initial_backoff: self.retry_backoff,
            max_backoff: self.retry_backoff * 8,
            call_timeout: self.call_timeout,
        }
    }

    pub fn validation(&self) -> ValidationConfig {
        ValidationConfig {
            ai_classification: self.ai_classification,
            name_prefilter: self.name_prefilter,
        }
    }
}

fn env_number<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value }),
        _ => Ok(default),
    }
}

fn env_flag(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidFlag { key, value }),
            }
        }
        _ => Ok(default),
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("APP_PORT must be a valid u16")]
    InvalidPort,
    #[error("APP_HOST must parse to an IPv4 or IPv6 address")]
    InvalidHost {
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("{key} must be a number (got '{value}')")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be true or false (got '{value}')")]
    InvalidFlag { key: &'static str, value: String },
    #[error("APP_LOG_FORMAT must be compact or pretty (got '{0}')")]
    InvalidLogFormat(String),
}
