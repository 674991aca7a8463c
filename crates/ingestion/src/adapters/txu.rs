//! TXU Energy: one `article.plan` per plan, one span per field

use super::{ProviderAdapter, ScrapeResult};
use crate::errors::IngestionError;
use crate::normalize::{normalize_rate, parse_int, parse_money, parse_percent, selector, text_or_none};
use scraper::{Html, Selector};
use tracing::warn;
use wattwise_common::db::models::{PlanRecord, ProviderRecord};

const SLUG: &str = "txu";
const PLANS_URL: &str = "https://www.txu.com/en/rates";

const MARKUP: &str = r#"
<section id="plans">
  <article class="plan">
    <h2>Smart Edge 12</h2>
    <span class="term">12</span>
    <span class="rate">12.4¢/kWh</span>
    <span class="base">$9.95</span>
    <span class="cancel">$150</span>
    <span class="renewable">25%</span>
    <p class="features">Free nights from 8pm to 6am.</p>
  </article>
  <article class="plan">
    <h2>Flex Saver 24</h2>
    <span class="term">24</span>
    <span class="rate">11.1¢/kWh</span>
    <span class="base">$0</span>
    <span class="cancel">$295</span>
    <span class="renewable">30%</span>
    <p class="features">Bill credit after 1000 kWh.</p>
  </article>
</section>
"#;

pub struct TxuAdapter {
    markup: String,
}

impl TxuAdapter {
    pub fn new() -> Self {
        Self::with_markup(MARKUP)
    }

    pub fn with_markup(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }
}

impl Default for TxuAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderAdapter for TxuAdapter {
    fn slug(&self) -> &'static str {
        SLUG
    }

    fn parse(&self) -> Result<ScrapeResult, IngestionError> {
        let document = Html::parse_fragment(&self.markup);

        let plan_sel = selector("section#plans article.plan")?;
        let name_sel = selector("h2")?;
        let term_sel = selector(".term")?;
        let rate_sel = selector(".rate")?;
        let base_sel = selector(".base")?;
        let cancel_sel = selector(".cancel")?;
        let renewable_sel = selector(".renewable")?;
        let features_sel = selector(".features")?;

        let mut plans = Vec::new();

        for article in document.select(&plan_sel) {
            let field = |sel: &Selector| text_or_none(article.select(sel).next());

            let Some(name) = field(&name_sel) else {
                warn!(provider = SLUG, "Skipping plan without a name");
                continue;
            };

            plans.push(PlanRecord {
                provider_id: None,
                name,
                term_months: field(&term_sel).as_deref().and_then(parse_int),
                rate_cents_kwh: field(&rate_sel).as_deref().and_then(normalize_rate),
                base_fee: field(&base_sel).as_deref().and_then(parse_money),
                cancellation_fee: field(&cancel_sel).as_deref().and_then(parse_money),
                renewable_percentage: field(&renewable_sel).as_deref().and_then(parse_percent),
                features: field(&features_sel),
                url: Some(PLANS_URL.to_string()),
            });
        }

        Ok(ScrapeResult {
            provider: ProviderRecord {
                name: "TXU Energy".to_string(),
                slug: SLUG.to_string(),
                website: Some("https://www.txu.com".to_string()),
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
        let result = TxuAdapter::new().parse().unwrap();

        assert_eq!(result.provider.name, "TXU Energy");
        assert_eq!(result.plans.len(), 2);

        let smart = &result.plans[0];
        assert_eq!(smart.name, "Smart Edge 12");
        assert_eq!(smart.term_months, Some(12));
        assert_eq!(smart.rate_cents_kwh, Some(12.4));
        assert_eq!(smart.base_fee, Some(9.95));
        assert_eq!(smart.cancellation_fee, Some(150.0));
        assert_eq!(smart.renewable_percentage, Some(25));
        assert_eq!(smart.features.as_deref(), Some("Free nights from 8pm to 6am."));
        assert_eq!(smart.url.as_deref(), Some(PLANS_URL));

        let flex = &result.plans[1];
        assert_eq!(flex.name, "Flex Saver 24");
        assert_eq!(flex.rate_cents_kwh, Some(11.1));
        assert_eq!(flex.base_fee, Some(0.0));
    }

    #[test]
    fn test_malformed_fields_become_none() {
        let markup = r#"
            <section id="plans">
              <article class="plan">
                <h2>Odd Plan</h2>
                <span class="term">twelve</span>
                <span class="rate">call us</span>
                <span class="base">$4.95</span>
              </article>
              <article class="plan">
                <span class="rate">9.9¢/kWh</span>
              </article>
            </section>
        "#;
        let result = TxuAdapter::with_markup(markup).parse().unwrap();

        assert_eq!(result.plans.len(), 1);
        let plan = &result.plans[0];
        assert_eq!(plan.name, "Odd Plan");
        assert_eq!(plan.term_months, None);
        assert_eq!(plan.rate_cents_kwh, None);
        assert_eq!(plan.base_fee, Some(4.95));
        assert_eq!(plan.cancellation_fee, None);
        assert_eq!(plan.features, None);
    }
}
