//! WattWise Common Library
//!
//! Shared code for the WattWise services including:
//! - Configuration management
//! - Error types and handling
//! - API key verification
//! - Database entities and the provider/plan repository
//! - Plan valuation and benchmark savings
//! - Metrics and tracing bootstrap

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod pricing;
pub mod telemetry;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};
pub use pricing::Benchmark;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Slug of the provider every plan is compared against by default
pub const DEFAULT_BENCHMARK_PROVIDER: &str = "txu";

/// Monthly usage (kWh) used for benchmark comparisons by default
pub const DEFAULT_BENCHMARK_USAGE_KWH: f64 = 1000.0;
