//! Provider handlers

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{load_benchmark, PlanResponse};
use crate::{extract::Path, AppState};
use wattwise_common::errors::{AppError, Result};

/// A provider with its enriched plans
#[derive(Debug, Serialize)]
pub struct ProviderResponse {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub plans: Vec<PlanResponse>,
}

/// List providers with their plans
pub async fn list_providers(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProviderResponse>>> {
    let repo = state.repository();
    let benchmark = load_benchmark(&state, &repo).await?;

    let providers = repo
        .list_providers()
        .await?
        .into_iter()
        .map(|entry| ProviderResponse {
            plans: entry
                .plans
                .into_iter()
                .map(|plan| PlanResponse::new(plan, &benchmark, None))
                .collect(),
            id: entry.provider.id,
            name: entry.provider.name,
            slug: entry.provider.slug,
            website: entry.provider.website,
            created_at: entry.provider.created_at,
        })
        .collect();

    Ok(Json(providers))
}

/// Plans of one provider
pub async fn list_provider_plans(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<PlanResponse>>> {
    let repo = state.repository();

    let provider = repo
        .find_provider_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::ProviderNotFound { slug: slug.clone() })?;

    let benchmark = load_benchmark(&state, &repo).await?;

    let plans = repo
        .get_plans_by_provider_slug(&slug)
        .await?
        .into_iter()
        .map(|plan| PlanResponse::new(plan, &benchmark, Some(&provider)))
        .collect();

    Ok(Json(plans))
}
