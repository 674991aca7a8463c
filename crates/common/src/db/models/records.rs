//! Normalized records produced by scrape adapters, before they are stored

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Provider identity as parsed from a provider's site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProviderRecord {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(length(min = 1))]
    pub slug: String,

    #[validate(url)]
    pub website: Option<String>,
}

/// One plan as parsed from a provider's site
///
/// `provider_id` is unset when an adapter emits the record and is filled in
/// once the owning provider has been upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PlanRecord {
    pub provider_id: Option<i32>,

    #[validate(length(min = 1))]
    pub name: String,

    #[validate(range(min = 0))]
    pub term_months: Option<i32>,

    #[validate(range(min = 0.0))]
    pub rate_cents_kwh: Option<f64>,

    #[validate(range(min = 0.0))]
    pub base_fee: Option<f64>,

    #[validate(range(min = 0.0))]
    pub cancellation_fee: Option<f64>,

    #[validate(range(min = 0, max = 100))]
    pub renewable_percentage: Option<i32>,

    pub features: Option<String>,

    #[validate(url)]
    pub url: Option<String>,
}

impl PlanRecord {
    /// Copy of this record owned by `provider_id`
    pub fn assigned_to(&self, provider_id: i32) -> Self {
        Self {
            provider_id: Some(provider_id),
            ..self.clone()
        }
    }

    /// Estimated monthly cost in dollars at the given usage
    pub fn cost_for_usage(&self, usage_kwh: f64) -> f64 {
        crate::pricing::cost_for_usage(self.rate_cents_kwh, self.base_fee, usage_kwh)
    }
}
