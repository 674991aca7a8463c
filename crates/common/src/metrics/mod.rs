//! Metrics and observability utilities
//!
//! Provides Prometheus metrics for the HTTP surface and the scrape pipeline
//! with standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::{Duration, Instant};

/// Metrics prefix for all WattWise metrics
pub const METRICS_PREFIX: &str = "wattwise";

/// Histogram buckets for request latency (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.001,  // 1ms
    0.005,  // 5ms
    0.010,  // 10ms
    0.025,  // 25ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
];

/// Buckets for scrape runs (parse plus a database rewrite)
pub const SCRAPE_BUCKETS: &[f64] = &[
    0.010,  // 10ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Request metrics
    describe_counter!(
        format!("{}_requests_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of HTTP requests"
    );

    describe_histogram!(
        format!("{}_request_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "HTTP request latency in seconds"
    );

    // Scrape metrics
    describe_counter!(
        format!("{}_scrapes_total", METRICS_PREFIX),
        Unit::Count,
        "Total scrape runs by provider and outcome"
    );

    describe_histogram!(
        format!("{}_scrape_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Scrape run latency in seconds"
    );

    describe_gauge!(
        format!("{}_plans_stored", METRICS_PREFIX),
        Unit::Count,
        "Plans stored for a provider by its latest successful scrape"
    );

    describe_counter!(
        format!("{}_scrape_errors_total", METRICS_PREFIX),
        Unit::Count,
        "Total failed scrape runs"
    );

    describe_counter!(
        format!("{}_scheduler_ticks_total", METRICS_PREFIX),
        Unit::Count,
        "Total recurring scheduler ticks"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record request metrics
pub struct RequestMetrics {
    start: Instant,
    endpoint: String,
    method: String,
}

impl RequestMetrics {
    /// Start tracking a request
    pub fn start(method: &str, endpoint: &str) -> Self {
        Self {
            start: Instant::now(),
            endpoint: endpoint.to_string(),
            method: method.to_string(),
        }
    }

    /// Record request completion
    pub fn finish(self, status: u16) {
        let duration = self.start.elapsed().as_secs_f64();

        counter!(
            format!("{}_requests_total", METRICS_PREFIX),
            "method" => self.method.clone(),
            "endpoint" => self.endpoint.clone(),
            "status" => status.to_string()
        )
        .increment(1);

        histogram!(
            format!("{}_request_duration_seconds", METRICS_PREFIX),
            "method" => self.method,
            "endpoint" => self.endpoint
        )
        .record(duration);
    }
}

/// Record one scrape run; `plans_stored` is `None` when the run failed
pub fn record_scrape(provider: &str, elapsed: Duration, plans_stored: Option<usize>) {
    let status = if plans_stored.is_some() { "success" } else { "error" };

    counter!(
        format!("{}_scrapes_total", METRICS_PREFIX),
        "provider" => provider.to_string(),
        "status" => status
    )
    .increment(1);

    histogram!(
        format!("{}_scrape_duration_seconds", METRICS_PREFIX),
        "provider" => provider.to_string()
    )
    .record(elapsed.as_secs_f64());

    match plans_stored {
        Some(count) => {
            gauge!(
                format!("{}_plans_stored", METRICS_PREFIX),
                "provider" => provider.to_string()
            )
            .set(count as f64);
        }
        None => {
            counter!(
                format!("{}_scrape_errors_total", METRICS_PREFIX),
                "provider" => provider.to_string()
            )
            .increment(1);
        }
    }
}

/// Record one scheduler tick
pub fn record_scheduler_tick() {
    counter!(format!("{}_scheduler_ticks_total", METRICS_PREFIX)).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_are_sorted() {
        for buckets in [LATENCY_BUCKETS, SCRAPE_BUCKETS] {
            let mut prev = 0.0;
            for &bucket in buckets {
                assert!(bucket > prev);
                prev = bucket;
            }
        }
    }

    #[test]
    fn test_recorders_run_without_exporter() {
        let metrics = RequestMetrics::start("GET", "/plans");
        metrics.finish(200);
        record_scrape("txu", Duration::from_millis(12), Some(2));
        record_scrape("txu", Duration::from_millis(3), None);
        record_scheduler_tick();
    }
}
