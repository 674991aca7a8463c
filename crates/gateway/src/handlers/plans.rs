//! Plan query handlers

use axum::{extract::State, Json};
use serde::Deserialize;

use super::{load_benchmark, PlanResponse};
use crate::{
    extract::{Path, Query},
    AppState,
};
use wattwise_common::{
    db::PlanWithProvider,
    errors::{AppError, Result},
};

/// Plans at or above this renewable share count as green
pub const RENEWABLE_THRESHOLD: i32 = 50;

/// Optional `GET /plans` filters
#[derive(Debug, Default, Deserialize)]
pub struct PlanFilters {
    /// Provider slug
    pub provider: Option<String>,
    pub term_months: Option<i32>,
    #[serde(default)]
    pub renewable_only: bool,
    /// Upper bound on the rate in cents per kWh; unrated plans pass
    pub max_rate: Option<f64>,
}

impl PlanFilters {
    pub fn matches(&self, row: &PlanWithProvider) -> bool {
        let plan = &row.plan;

        if let Some(slug) = &self.provider {
            if &row.provider.slug != slug {
                return false;
            }
        }

        if let Some(term) = self.term_months {
            if plan.term_months != Some(term) {
                return false;
            }
        }

        if self.renewable_only
            && plan.renewable_percentage.unwrap_or(0) < RENEWABLE_THRESHOLD
        {
            return false;
        }

        match (self.max_rate, plan.rate_cents_kwh) {
            (Some(max), Some(rate)) => rate <= max,
            _ => true,
        }
    }
}

/// List plans, cheapest rate first
pub async fn list_plans(
    State(state): State<AppState>,
    Query(filters): Query<PlanFilters>,
) -> Result<Json<Vec<PlanResponse>>> {
    let repo = state.repository();
    let benchmark = load_benchmark(&state, &repo).await?;

    let plans = repo
        .list_plans()
        .await?
        .into_iter()
        .filter(|row| filters.matches(row))
        .map(|row| PlanResponse::new(row.plan, &benchmark, Some(&row.provider)))
        .collect();

    Ok(Json(plans))
}

/// Get a single plan
pub async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PlanResponse>> {
    let repo = state.repository();

    let row = repo
        .get_plan(id)
        .await?
        .ok_or(AppError::PlanNotFound { id })?;

    let benchmark = load_benchmark(&state, &repo).await?;

    Ok(Json(PlanResponse::new(row.plan, &benchmark, Some(&row.provider))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wattwise_common::db::models::{Plan, Provider};

    fn row(slug: &str, rate: Option<f64>, term: Option<i32>, renewable: Option<i32>) -> PlanWithProvider {
        PlanWithProvider {
            plan: Plan {
                id: 1,
                provider_id: 1,
                name: "Plan".into(),
                term_months: term,
                rate_cents_kwh: rate,
                base_fee: None,
                cancellation_fee: None,
                renewable_percentage: renewable,
                features: None,
                url: None,
                last_scraped_at: Utc::now(),
            },
            provider: Provider {
                id: 1,
                slug: slug.into(),
                name: slug.into(),
                website: None,
                created_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_default_filters_keep_everything() {
        let filters = PlanFilters::default();
        assert!(filters.matches(&row("txu", None, None, None)));
    }

    #[test]
    fn test_filters() {
        let by_provider = PlanFilters { provider: Some("gexa".into()), ..Default::default() };
        assert!(by_provider.matches(&row("gexa", Some(9.8), Some(12), Some(100))));
        assert!(!by_provider.matches(&row("txu", Some(9.8), Some(12), Some(100))));

        let by_term = PlanFilters { term_months: Some(12), ..Default::default() };
        assert!(by_term.matches(&row("txu", None, Some(12), None)));
        assert!(!by_term.matches(&row("txu", None, Some(24), None)));
        assert!(!by_term.matches(&row("txu", None, None, None)));

        let green = PlanFilters { renewable_only: true, ..Default::default() };
        assert!(green.matches(&row("txu", None, None, Some(50))));
        assert!(!green.matches(&row("txu", None, None, Some(49))));
        assert!(!green.matches(&row("txu", None, None, None)));

        let cheap = PlanFilters { max_rate: Some(10.0), ..Default::default() };
        assert!(cheap.matches(&row("txu", Some(10.0), None, None)));
        assert!(!cheap.matches(&row("txu", Some(10.1), None, None)));
        assert!(cheap.matches(&row("txu", None, None, None)));
    }
}
