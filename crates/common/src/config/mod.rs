//! Configuration management for WattWise services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml, config/local.toml)
//! - Default values
//!
//! The loaded [`AppConfig`] is built once at startup and handed to every
//! component explicitly.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Scraping and scheduling configuration
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Benchmark comparison configuration
    #[serde(default)]
    pub benchmark: BenchmarkConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Grace period for in-flight work on shutdown, in seconds
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Maximum concurrent requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Connection string, `postgres://...` or `sqlite://...`
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Shared secret required to trigger scrapes
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// API key header name
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    /// Provider slugs scraped when a request or tick names none
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,

    /// Minutes between scheduled scrape passes
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,

    /// Run the recurring scheduler inside the API process
    #[serde(default = "default_enabled")]
    pub scheduler_enabled: bool,

    /// Upper bound for a single provider scrape, in seconds
    #[serde(default = "default_scrape_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BenchmarkConfig {
    /// Slug of the provider every plan is compared against
    #[serde(default = "default_benchmark_provider")]
    pub provider: String,

    /// Monthly usage in kWh used for the comparison
    #[serde(default = "default_benchmark_usage")]
    pub usage_kwh: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error), overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Install the Prometheus recorder and expose /metrics
    #[serde(default = "default_enabled")]
    pub metrics_enabled: bool,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_request_timeout() -> u64 { 30 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_max_concurrent() -> usize { 100 }
fn default_database_url() -> String { "sqlite://wattwise.db?mode=rwc".to_string() }
fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_api_key() -> String { "local-dev-key".to_string() }
fn default_api_key_header() -> String { "x-api-key".to_string() }
fn default_providers() -> Vec<String> {
    ["txu", "reliant", "gexa", "direct_energy"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_interval_minutes() -> u64 { 360 }
fn default_scrape_timeout() -> u64 { 30 }
fn default_benchmark_provider() -> String { crate::DEFAULT_BENCHMARK_PROVIDER.to_string() }
fn default_benchmark_usage() -> f64 { crate::DEFAULT_BENCHMARK_USAGE_KWH }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { false }
fn default_service_name() -> String { "wattwise".to_string() }
fn default_enabled() -> bool { true }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SCRAPER__PROVIDERS=txu,gexa
            .add_source(env_source())

            .build()?;

        config.try_deserialize()
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Request timeout for a scrape trigger covering `providers` sequential
    /// scrapes, each bounded by the scraper timeout
    pub fn scrape_request_timeout(&self, providers: usize) -> Duration {
        let providers = u32::try_from(providers).unwrap_or(u32::MAX);
        self.request_timeout()
            .saturating_add(self.scraper.timeout().saturating_mul(providers))
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("APP")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("scraper.providers")
}

impl ScraperConfig {
    /// Interval between scheduled passes, `None` when the interval is zero
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_minutes > 0).then(|| Duration::from_secs(self.interval_minutes * 60))
    }

    /// Get per-provider scrape timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DatabaseConfig {
    /// Single-connection in-memory SQLite, used by tests and throwaway runs.
    ///
    /// The pool is pinned to one connection because every SQLite memory
    /// connection opens its own empty database.
    pub fn sqlite_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            api_key_header: default_api_key_header(),
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            interval_minutes: default_interval_minutes(),
            scheduler_enabled: default_enabled(),
            timeout_secs: default_scrape_timeout(),
        }
    }
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            provider: default_benchmark_provider(),
            usage_kwh: default_benchmark_usage(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_enabled: default_enabled(),
            service_name: default_service_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.auth.api_key_header, "x-api-key");
        assert_eq!(
            config.scraper.providers,
            vec!["txu", "reliant", "gexa", "direct_energy"]
        );
        assert_eq!(config.scraper.interval_minutes, 360);
        assert!(config.scraper.scheduler_enabled);
        assert_eq!(config.benchmark.provider, "txu");
        assert_eq!(config.benchmark.usage_kwh, 1000.0);
    }

    #[test]
    fn test_scraper_interval() {
        let mut scraper = ScraperConfig::default();
        assert_eq!(scraper.interval(), Some(Duration::from_secs(360 * 60)));

        scraper.interval_minutes = 0;
        assert_eq!(scraper.interval(), None);
    }

    #[test]
    fn test_partial_sections_fall_back_to_defaults() {
        let config: AppConfig = Config::builder()
            .set_override("auth.api_key", "secret")
            .unwrap()
            .set_override("scraper.scheduler_enabled", false)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.auth.api_key, "secret");
        assert_eq!(config.auth.api_key_header, "x-api-key");
        assert!(!config.scraper.scheduler_enabled);
        assert_eq!(config.scraper.providers.len(), 4);
        assert_eq!(config.database.url, "sqlite://wattwise.db?mode=rwc");
    }

    #[test]
    fn test_scrape_request_timeout_covers_every_provider() {
        let mut config = AppConfig::default();
        config.server.request_timeout_secs = 30;
        config.scraper.timeout_secs = 20;

        assert_eq!(config.scrape_request_timeout(0), Duration::from_secs(30));
        assert_eq!(config.scrape_request_timeout(4), Duration::from_secs(110));
        assert!(config.scrape_request_timeout(4) > config.scraper.timeout() * 4);
    }

    #[test]
    fn test_sqlite_memory_pins_single_connection() {
        let db = DatabaseConfig::sqlite_memory();
        assert_eq!(db.url, "sqlite::memory:");
        assert_eq!(db.max_connections, 1);
        assert_eq!(db.min_connections, 1);
    }
}
