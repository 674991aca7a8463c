//! Reliant Energy: `ul.plans li` items, title in `h3`, figures as data attributes

use super::{ProviderAdapter, ScrapeResult};
use crate::errors::IngestionError;
use crate::normalize::{normalize_rate, parse_int, parse_money, parse_percent, selector, text_or_none};
use scraper::Html;
use tracing::warn;
use wattwise_common::db::models::{PlanRecord, ProviderRecord};

const SLUG: &str = "reliant";
const PLANS_URL: &str = "https://www.reliant.com/en/plans";

// data-rate is published in dollars per kWh
const MARKUP: &str = r#"
<ul class="plans">
  <li>
    <h3>Reliant Secure Advantage 12</h3>
    <div class="details" data-term="12" data-rate="0.109" data-base="4.95" data-cancel="150" data-renewable="20">
      <p>Fixed rate with autopay discount.</p>
    </div>
  </li>
  <li>
    <h3>Reliant Truly Free Weekends</h3>
    <div class="details" data-term="24" data-rate="0.123" data-base="9.95" data-cancel="295" data-renewable="15">
      <p>Free energy every weekend.</p>
    </div>
  </li>
</ul>
"#;

pub struct ReliantAdapter {
    markup: String,
}

impl ReliantAdapter {
    pub fn new() -> Self {
        Self::with_markup(MARKUP)
    }

    pub fn with_markup(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }
}

impl Default for ReliantAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderAdapter for ReliantAdapter {
    fn slug(&self) -> &'static str {
        SLUG
    }

    fn parse(&self) -> Result<ScrapeResult, IngestionError> {
        let document = Html::parse_fragment(&self.markup);

        let item_sel = selector("ul.plans li")?;
        let title_sel = selector("h3")?;
        let details_sel = selector("div.details")?;

        let mut plans = Vec::new();

        for item in document.select(&item_sel) {
            let Some(name) = text_or_none(item.select(&title_sel).next()) else {
                warn!(provider = SLUG, "Skipping plan without a name");
                continue;
            };

            let details = item.select(&details_sel).next();
            let attr = |key: &str| details.and_then(|d| d.value().attr(key));

            plans.push(PlanRecord {
                provider_id: None,
                name,
                term_months: attr("data-term").and_then(parse_int),
                rate_cents_kwh: attr("data-rate").and_then(normalize_rate),
                base_fee: attr("data-base").and_then(parse_money),
                cancellation_fee: attr("data-cancel").and_then(parse_money),
                renewable_percentage: attr("data-renewable").and_then(parse_percent),
                features: text_or_none(details),
                url: Some(PLANS_URL.to_string()),
            });
        }

        Ok(ScrapeResult {
            provider: ProviderRecord {
                name: "Reliant Energy".to_string(),
                slug: SLUG.to_string(),
                website: Some("https://www.reliant.com".to_string()),
            },
            plans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_bundled_plans() {
        let result = ReliantAdapter::new().parse().unwrap();

        assert_eq!(result.provider.slug, "reliant");
        let names: Vec<&str> = result.plans.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Reliant Secure Advantage 12", "Reliant Truly Free Weekends"]);

        let secure = &result.plans[0];
        assert_eq!(secure.term_months, Some(12));
        assert_eq!(secure.rate_cents_kwh, Some(10.9));
        assert_eq!(secure.base_fee, Some(4.95));
        assert_eq!(secure.cancellation_fee, Some(150.0));
        assert_eq!(secure.renewable_percentage, Some(20));
        assert_eq!(secure.features.as_deref(), Some("Fixed rate with autopay discount."));

        assert_eq!(result.plans[1].rate_cents_kwh, Some(12.3));
    }

    #[test]
    fn test_missing_details_leave_fields_empty() {
        let markup = r#"
            <ul class="plans">
              <li><h3>Bare Plan</h3></li>
              <li><div class="details" data-rate="0.1"></div></li>
            </ul>
        "#;
        let result = ReliantAdapter::with_markup(markup).parse().unwrap();

        assert_eq!(result.plans.len(), 1);
        assert_eq!(result.plans[0].name, "Bare Plan");
        assert_eq!(result.plans[0].rate_cents_kwh, None);
        assert_eq!(result.plans[0].features, None);
    }
}
