//! WattWise API Gateway
//!
//! The entry point for all external API requests.
//! Handles:
//! - Plan and provider queries with benchmark savings
//! - API-key protected scrape triggers
//! - The in-process recurring scrape scheduler
//! - Observability (logging, metrics, request ids)

mod extract;
mod handlers;
mod middleware;

use anyhow::Context;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use tokio::sync::watch;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use wattwise_common::{
    config::AppConfig,
    db::DbPool,
    metrics::{self, LATENCY_BUCKETS, METRICS_PREFIX, SCRAPE_BUCKETS},
    telemetry, Repository,
};
use wattwise_ingestion::{signal::shutdown_signal, ScrapeRunner, ScrapeScheduler};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub runner: ScrapeRunner,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn repository(&self) -> Repository {
        Repository::new(self.db.clone())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Arc::new(AppConfig::load().context("Failed to load configuration")?);

    // Initialize tracing
    telemetry::init_tracing(&config.observability)?;

    info!(
        service = %config.observability.service_name,
        "Starting WattWise API Gateway v{}",
        wattwise_common::VERSION
    );

    // Initialize metrics
    let prometheus = if config.observability.metrics_enabled {
        let handle = install_prometheus()?;
        metrics::register_metrics();
        Some(handle)
    } else {
        None
    };

    // Initialize database connection
    let db = DbPool::connect_and_migrate(&config.database).await?;

    let runner = ScrapeRunner::from_config(Repository::new(db.clone()), &config.scraper);

    // Recurring scrapes
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = match ScrapeScheduler::from_config(runner.clone(), &config.scraper) {
        Some(scheduler) => Some(scheduler.spawn(shutdown_rx)),
        None => {
            info!("Recurring scrape scheduler disabled");
            None
        }
    };

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        runner,
        metrics: prometheus,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let an in-flight scrape finish, bounded by the shutdown timeout
    let _ = shutdown_tx.send(true);
    if let Some(handle) = scheduler {
        if tokio::time::timeout(config.shutdown_timeout(), handle).await.is_err() {
            warn!("Scheduler did not stop within the shutdown timeout");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_request_duration_seconds", METRICS_PREFIX)),
            LATENCY_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(format!("{}_scrape_duration_seconds", METRICS_PREFIX)),
            SCRAPE_BUCKETS,
        )?
        .install_recorder()?;

    Ok(handle)
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // A scrape trigger runs its providers back to back, so it gets room for
    // every registered adapter on top of the usual request budget
    let request_timeout = state.config.request_timeout();
    let scrape_timeout = state
        .config
        .scrape_request_timeout(state.runner.registry().slugs().len());
    let max_concurrent = state.config.server.max_concurrent_requests;

    let queries: Router<AppState> = Router::new()
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        .route("/metrics", get(handlers::health::metrics))

        // Provider endpoints
        .route("/providers", get(handlers::providers::list_providers))
        .route("/providers/{slug}/plans", get(handlers::providers::list_provider_plans))

        // Plan endpoints
        .route("/plans", get(handlers::plans::list_plans))
        .route("/plans/{id}", get(handlers::plans::get_plan))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout));

    // Scrape trigger (API key)
    let scrape: Router<AppState> = Router::new()
        .route("/scrape", post(handlers::scrape::trigger_scrape))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, scrape_timeout));

    Router::new()
        .merge(queries)
        .merge(scrape)
        .route_layer(axum::middleware::from_fn(middleware::metrics::track_requests))
        .layer(GlobalConcurrencyLimitLayer::new(max_concurrent))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}
