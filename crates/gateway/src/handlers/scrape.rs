//! Manual scrape trigger

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::{middleware::api_key::ApiKey, AppState};
use wattwise_common::errors::{AppError, Result};

/// Optional request body
///
/// `providers: None` means "use the configured defaults", which only an
/// absent body, `null` or `{}` selects. Any other object must carry a
/// non-null `providers` list.
#[derive(Debug, Default, PartialEq)]
pub struct ScrapeRequest {
    pub providers: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct ScrapeBody {
    #[serde(default)]
    providers: Option<Vec<String>>,
}

impl ScrapeRequest {
    /// Parse a possibly empty body
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let invalid = |e: serde_json::Error| AppError::InvalidFormat {
            message: format!("Invalid scrape request body: {}", e),
        };

        let value: Value = serde_json::from_slice(body).map_err(invalid)?;
        match &value {
            Value::Null => return Ok(Self::default()),
            Value::Object(fields) if fields.is_empty() => return Ok(Self::default()),
            _ => {}
        }

        let parsed: ScrapeBody = serde_json::from_value(value).map_err(invalid)?;
        Ok(Self {
            providers: Some(parsed.providers.unwrap_or_default()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ScrapeSummary {
    pub provider: String,
    pub plans: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub status: &'static str,
    pub results: Vec<ScrapeSummary>,
}

/// Scrape the requested providers now
pub async fn trigger_scrape(
    State(state): State<AppState>,
    _key: ApiKey,
    body: Bytes,
) -> Result<(StatusCode, Json<ScrapeResponse>)> {
    let request = ScrapeRequest::from_body(&body)?;
    let slugs = request
        .providers
        .unwrap_or_else(|| state.config.scraper.providers.clone());

    info!(providers = ?slugs, "Manual scrape requested");

    let results = state
        .runner
        .run_many(slugs.as_slice())
        .await?
        .into_iter()
        .map(|result| ScrapeSummary {
            provider: result.provider.slug,
            plans: result.plans.into_iter().map(|plan| plan.name).collect(),
        })
        .collect();

    Ok((
        StatusCode::ACCEPTED,
        Json(ScrapeResponse {
            status: "queued",
            results,
        }),
    ))
}
