//! Plan valuation and benchmark savings
//!
//! Monthly cost is `base_fee + (rate_cents_kwh / 100) * usage_kwh` with missing
//! components counted as zero. Savings compare every plan against the cheapest
//! plan of a designated benchmark provider at a fixed usage.

use crate::config::BenchmarkConfig;
use crate::db::models::Plan;

/// Estimated monthly cost in dollars
pub fn cost_for_usage(rate_cents_kwh: Option<f64>, base_fee: Option<f64>, usage_kwh: f64) -> f64 {
    base_fee.unwrap_or(0.0) + (rate_cents_kwh.unwrap_or(0.0) / 100.0) * usage_kwh
}

/// The reference plan every other plan is priced against
#[derive(Debug, Clone)]
pub struct Benchmark {
    provider_slug: String,
    usage_kwh: f64,
    reference: Option<Plan>,
}

impl Benchmark {
    /// Pick the cheapest rated plan among `candidates` (the benchmark provider's plans)
    ///
    /// Ties keep the first plan encountered.
    pub fn select<'a, I>(provider_slug: impl Into<String>, usage_kwh: f64, candidates: I) -> Self
    where
        I: IntoIterator<Item = &'a Plan>,
    {
        let mut reference: Option<(&Plan, f64)> = None;

        for plan in candidates.into_iter().filter(|p| p.rate_cents_kwh.is_some()) {
            let cost = plan.cost_for_usage(usage_kwh);
            match reference {
                Some((_, best)) if cost >= best => {}
                _ => reference = Some((plan, cost)),
            }
        }

        Self {
            provider_slug: provider_slug.into(),
            usage_kwh,
            reference: reference.map(|(plan, _)| plan.clone()),
        }
    }

    /// Same as [`Benchmark::select`] with provider and usage taken from configuration
    pub fn from_config<'a, I>(config: &BenchmarkConfig, candidates: I) -> Self
    where
        I: IntoIterator<Item = &'a Plan>,
    {
        Self::select(config.provider.clone(), config.usage_kwh, candidates)
    }

    pub fn provider_slug(&self) -> &str {
        &self.provider_slug
    }

    pub fn usage_kwh(&self) -> f64 {
        self.usage_kwh
    }

    /// The selected plan, if the benchmark provider has any rated plan
    pub fn reference(&self) -> Option<&Plan> {
        self.reference.as_ref()
    }

    /// Monthly savings of `plan` against the reference; positive means cheaper
    pub fn savings_for(&self, plan: &Plan) -> Option<f64> {
        let reference = self.reference.as_ref()?;
        plan.rate_cents_kwh?;

        Some(reference.cost_for_usage(self.usage_kwh) - plan.cost_for_usage(self.usage_kwh))
    }
}
