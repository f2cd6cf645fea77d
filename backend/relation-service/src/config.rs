/// Configuration management for Relation Service
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Application settings
    pub app: AppConfig,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Redis configuration
    pub redis: RedisConfig,
    /// Relationship cache and request settings
    pub relation: RelationConfig,
}

/// Application settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    /// Server host to bind to
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Emit logs as JSON
    pub json_logs: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL
    pub url: String,
    /// Max connections in pool
    pub max_connections: u32,
    /// Min connections in pool
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,
    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (redis://host:port)
    pub url: String,
    /// When false the in-process cache is used instead
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct RelationConfig {
    /// TTL for cached membership flags
    pub cache_ttl_secs: u64,
    /// Capacity of the in-process fallback cache
    pub local_cache_max_entries: u64,
    /// Per-request deadline applied by the HTTP layer
    pub request_timeout_ms: u64,
}

impl RelationConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            http_port: env_or("PORT", 8080),
            json_logs: std::env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        let database = DatabaseConfig {
            url: std::env::var("DATABASE_URL")
                .context("DATABASE_URL environment variable not set")?,
            max_connections: env_or("DB_MAX_CONNECTIONS", 20),
            min_connections: env_or("DB_MIN_CONNECTIONS", 2),
            acquire_timeout_secs: env_or("DB_ACQUIRE_TIMEOUT_SECS", 10),
            run_migrations: env_flag("RUN_MIGRATIONS", true),
        };

        let redis = RedisConfig {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            enabled: env_flag("REDIS_ENABLED", true),
        };

        let relation = RelationConfig {
            cache_ttl_secs: env_or("RELATION_CACHE_TTL_SECS", 600),
            local_cache_max_entries: env_or("LOCAL_CACHE_MAX_ENTRIES", 100_000),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 5_000),
        };

        if relation.cache_ttl_secs == 0 {
            anyhow::bail!("RELATION_CACHE_TTL_SECS must be greater than zero");
        }

        Ok(Config {
            app,
            database,
            redis,
            relation,
        })
    }
}
