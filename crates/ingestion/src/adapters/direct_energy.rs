//! Direct Energy: carousel slides carrying every field as a data attribute

use super::{ProviderAdapter, ScrapeResult};
use crate::errors::IngestionError;
use crate::normalize::{
    collapse_whitespace, normalize_rate, parse_int, parse_money, parse_percent, selector,
    text_or_none,
};
use scraper::Html;
use tracing::warn;
use wattwise_common::db::models::{PlanRecord, ProviderRecord};

const SLUG: &str = "direct_energy";
const PLANS_URL: &str = "https://www.directenergy.com/texas";

const MARKUP: &str = r#"
<div class="carousel">
  <div class="slide" data-plan="Direct Better Rate 12" data-term="12" data-rate="0.119" data-base="0" data-cancel="150" data-renewable="25">
    <p>Online only plan with paperless billing.</p>
  </div>
  <div class="slide" data-plan="Direct Comfort 24" data-term="24" data-rate="0.125" data-base="4.95" data-cancel="295" data-renewable="30">
    <p>Includes HVAC maintenance visits.</p>
  </div>
</div>
"#;

pub struct DirectEnergyAdapter {
    markup: String,
}

impl DirectEnergyAdapter {
    pub fn new() -> Self {
        Self::with_markup(MARKUP)
    }

    pub fn with_markup(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }
}

impl Default for DirectEnergyAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderAdapter for DirectEnergyAdapter {
    fn slug(&self) -> &'static str {
        SLUG
    }

    fn parse(&self) -> Result<ScrapeResult, IngestionError> {
        let document = Html::parse_fragment(&self.markup);
        let slide_sel = selector(".carousel .slide")?;

        let mut plans = Vec::new();

        for slide in document.select(&slide_sel) {
            let attr = |key: &str| slide.value().attr(key);

            let Some(name) = attr("data-plan").and_then(collapse_whitespace) else {
                warn!(provider = SLUG, "Skipping plan without a name");
                continue;
            };

            plans.push(PlanRecord {
                provider_id: None,
                name,
                term_months: attr("data-term").and_then(parse_int),
                rate_cents_kwh: attr("data-rate").and_then(normalize_rate),
                base_fee: attr("data-base").and_then(parse_money),
                cancellation_fee: attr("data-cancel").and_then(parse_money),
                renewable_percentage: attr("data-renewable").and_then(parse_percent),
                features: text_or_none(Some(slide)),
                url: Some(PLANS_URL.to_string()),
            });
        }

        Ok(ScrapeResult {
            provider: ProviderRecord {
                name: "Direct Energy".to_string(),
                slug: SLUG.to_string(),
                website: Some("https://www.directenergy.com".to_string()),
            },
            plans,
        })
    }
}
