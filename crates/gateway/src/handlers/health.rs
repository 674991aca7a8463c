//! Liveness, readiness and metrics exposition

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Instant;
use wattwise_common::errors::AppError;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub checks: ReadyChecks,
}

#[derive(Serialize)]
pub struct ReadyChecks {
    pub database: DatabaseCheck,
    pub scraper: ScraperCheck,
}

#[derive(Serialize)]
pub struct DatabaseCheck {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Static scraping setup, reported so operators can see what ticks will do
#[derive(Serialize)]
pub struct ScraperCheck {
    pub adapters: Vec<String>,
    pub default_providers: Vec<String>,
    pub scheduler_enabled: bool,
    pub interval_minutes: u64,
}

/// Always ok while the process serves requests; the store is not consulted
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let started = Instant::now();
    let database = match state.db.ping().await {
        Ok(()) => DatabaseCheck {
            status: "up",
            latency_ms: Some(started.elapsed().as_millis() as u64),
            error: None,
        },
        Err(e) => DatabaseCheck {
            status: "down",
            latency_ms: None,
            error: Some(e.to_string()),
        },
    };

    let scraper_config = &state.config.scraper;
    let scraper = ScraperCheck {
        adapters: state.runner.registry().slugs().into_iter().map(str::to_string).collect(),
        default_providers: scraper_config.providers.clone(),
        scheduler_enabled: scraper_config.scheduler_enabled,
        interval_minutes: scraper_config.interval_minutes,
    };

    let (code, status) = if database.status == "up" {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        code,
        Json(ReadyResponse {
            status,
            version: wattwise_common::VERSION,
            checks: ReadyChecks { database, scraper },
        }),
    )
}

/// Prometheus text exposition, 404 when the recorder is not installed
pub async fn metrics(State(state): State<AppState>) -> Response {
    let Some(handle) = &state.metrics else {
        return AppError::NotFound {
            resource_type: "endpoint".to_string(),
            id: "/metrics".to_string(),
        }
        .into_response();
    };

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response()
}
