use std::{env, str::FromStr, time::Duration};

use repotrack_core::breaker::BreakerConfig;
use thiserror::Error;

/// How breakers are shared between the two entity pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerScope {
    /// One breaker guards the store for both pipelines.
    Shared,
    /// Users and repositories trip independently.
    PerEntity,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown breaker scope '{0}', expected 'shared' or 'per-entity'")]
pub struct UnknownBreakerScope(String);

impl FromStr for BreakerScope {
    type Err = UnknownBreakerScope;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(Self::Shared),
            "per-entity" | "per_entity" => Ok(Self::PerEntity),
            other => Err(UnknownBreakerScope(other.to_string())),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds (default: 600)
    pub cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Deadline for a single cache call in milliseconds (default: 500)
    pub cache_timeout_ms: u64,
    /// Deadline for a single store call in milliseconds (default: 5,000)
    pub store_timeout_ms: u64,
    /// Deadline for a single publish in milliseconds (default: 2,000)
    pub publish_timeout_ms: u64,
    /// HTTP request deadline in seconds (default: 15)
    pub request_timeout_seconds: u64,
    pub breaker_failure_threshold: u32,
    pub breaker_open_timeout_seconds: u64,
    pub breaker_interval_seconds: u64,
    pub breaker_half_open_max_calls: u32,
    pub breaker_success_threshold: u32,
    pub breaker_scope: BreakerScope,
    /// Capacity of the in-process event channel (default: 256)
    pub event_channel_capacity: usize,
    /// Run the background task that logs every published event (default: true)
    pub event_log_enabled: bool,
    /// Path to SQLite database file (default: "repotrack.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to their defaults. An unknown
    /// `BREAKER_SCOPE` falls back to `shared` with a warning.
    pub fn from_env() -> Self {
        let defaults = BreakerConfig::default();

        let breaker_scope = match env::var("BREAKER_SCOPE") {
            Ok(value) => value.parse().unwrap_or_else(|err: UnknownBreakerScope| {
                tracing::warn!(error = %err, "Falling back to shared breaker");
                BreakerScope::Shared
            }),
            Err(_) => BreakerScope::Shared,
        };

        Self {
            cache_ttl_seconds: parse_env("CACHE_TTL_SECONDS", 600),
            cache_max_entries: parse_env("CACHE_MAX_ENTRIES", 10_000),
            cache_timeout_ms: parse_env("CACHE_TIMEOUT_MS", 500),
            store_timeout_ms: parse_env("STORE_TIMEOUT_MS", 5_000),
            publish_timeout_ms: parse_env("PUBLISH_TIMEOUT_MS", 2_000),
            request_timeout_seconds: parse_env("REQUEST_TIMEOUT_SECONDS", 15),
            breaker_failure_threshold: parse_env(
                "BREAKER_FAILURE_THRESHOLD",
                defaults.failure_threshold,
            ),
            breaker_open_timeout_seconds: parse_env(
                "BREAKER_OPEN_TIMEOUT_SECONDS",
                defaults.open_timeout.as_secs(),
            ),
            breaker_interval_seconds: parse_env(
                "BREAKER_INTERVAL_SECONDS",
                defaults.interval.as_secs(),
            ),
            breaker_half_open_max_calls: parse_env(
                "BREAKER_HALF_OPEN_MAX_CALLS",
                defaults.max_half_open_requests,
            ),
            breaker_success_threshold: parse_env(
                "BREAKER_SUCCESS_THRESHOLD",
                defaults.success_threshold,
            ),
            breaker_scope,
            event_channel_capacity: parse_env("EVENT_CHANNEL_CAPACITY", 256),
            event_log_enabled: parse_env("EVENT_LOG_ENABLED", true),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "repotrack.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_millis(self.cache_timeout_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Breaker settings assembled from the `BREAKER_*` variables.
    pub fn breaker(&self) -> BreakerConfig {
        BreakerConfig {
            failure_threshold: self.breaker_failure_threshold,
            open_timeout: Duration::from_secs(self.breaker_open_timeout_seconds),
            interval: Duration::from_secs(self.breaker_interval_seconds),
            max_half_open_requests: self.breaker_half_open_max_calls,
            success_threshold: self.breaker_success_threshold,
        }
        .sanitized()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_env<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
