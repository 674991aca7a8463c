//! API handlers module

pub mod health;
pub mod plans;
pub mod providers;
pub mod scrape;

use chrono::{DateTime, Utc};
use serde::Serialize;
use wattwise_common::{
    db::models::{Plan, Provider},
    errors::Result,
    Benchmark, Repository,
};

use crate::AppState;

/// Provider fields embedded in a plan response
#[derive(Debug, Serialize)]
pub struct ProviderSummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub website: Option<String>,
}

impl From<&Provider> for ProviderSummary {
    fn from(provider: &Provider) -> Self {
        Self {
            id: provider.id,
            name: provider.name.clone(),
            slug: provider.slug.clone(),
            website: provider.website.clone(),
        }
    }
}

/// A plan with its benchmark savings
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: i32,
    pub provider_id: i32,
    pub name: String,
    pub term_months: Option<i32>,
    pub rate_cents_kwh: Option<f64>,
    pub base_fee: Option<f64>,
    pub cancellation_fee: Option<f64>,
    pub renewable_percentage: Option<i32>,
    pub features: Option<String>,
    pub url: Option<String>,
    pub last_scraped_at: DateTime<Utc>,
    /// Monthly savings against the benchmark plan; positive means cheaper
    pub estimated_savings_vs_txu: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderSummary>,
}

impl PlanResponse {
    pub fn new(plan: Plan, benchmark: &Benchmark, provider: Option<&Provider>) -> Self {
        let estimated_savings_vs_txu = benchmark.savings_for(&plan);

        Self {
            id: plan.id,
            provider_id: plan.provider_id,
            name: plan.name,
            term_months: plan.term_months,
            rate_cents_kwh: plan.rate_cents_kwh,
            base_fee: plan.base_fee,
            cancellation_fee: plan.cancellation_fee,
            renewable_percentage: plan.renewable_percentage,
            features: plan.features,
            url: plan.url,
            last_scraped_at: plan.last_scraped_at,
            estimated_savings_vs_txu,
            provider: provider.map(ProviderSummary::from),
        }
    }
}

/// The benchmark for the current store contents
pub(crate) async fn load_benchmark(state: &AppState, repo: &Repository) -> Result<Benchmark> {
    let config = &state.config.benchmark;
    let candidates = repo.get_plans_by_provider_slug(&config.provider).await?;
    Ok(Benchmark::from_config(config, &candidates))
}
