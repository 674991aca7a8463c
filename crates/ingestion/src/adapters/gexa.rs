//! Gexa Energy: a plan table, one row per plan after the header row

use super::{ProviderAdapter, ScrapeResult};
use crate::errors::IngestionError;
use crate::normalize::{
    collapse_whitespace, normalize_rate, parse_int, parse_money, parse_percent, selector,
};
use scraper::Html;
use tracing::warn;
use wattwise_common::db::models::{PlanRecord, ProviderRecord};

const SLUG: &str = "gexa";
const PLANS_URL: &str = "https://www.gexaenergy.com/residential";

const MARKUP: &str = r#"
<table id="gexa-plans">
  <tr>
    <th>Plan</th><th>Term</th><th>Rate</th><th>Base Fee</th><th>Cancel Fee</th><th>Renewable</th><th>Features</th>
  </tr>
  <tr>
    <td>Gexa Saver Deluxe 12</td>
    <td>12</td>
    <td>$0.098</td>
    <td>0</td>
    <td>150</td>
    <td>100</td>
    <td>100% renewable energy.</td>
  </tr>
  <tr>
    <td>Gexa Eco Saver 36</td>
    <td>36</td>
    <td>$0.104</td>
    <td>5</td>
    <td>295</td>
    <td>100</td>
    <td>Bill credits and smart thermostat.</td>
  </tr>
</table>
"#;

pub struct GexaAdapter {
    markup: String,
}

impl GexaAdapter {
    pub fn new() -> Self {
        Self::with_markup(MARKUP)
    }

    pub fn with_markup(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }
}

impl Default for GexaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderAdapter for GexaAdapter {
    fn slug(&self) -> &'static str {
        SLUG
    }

    fn parse(&self) -> Result<ScrapeResult, IngestionError> {
        let document = Html::parse_fragment(&self.markup);

        let row_sel = selector("table#gexa-plans tr")?;
        let cell_sel = selector("td")?;

        let mut plans = Vec::new();

        // Header row is `th`-only and yields no cells
        for row in document.select(&row_sel) {
            let cells: Vec<Option<String>> = row
                .select(&cell_sel)
                .map(|cell| collapse_whitespace(&cell.text().collect::<String>()))
                .collect();
            if cells.is_empty() {
                continue;
            }

            let cell = |index: usize| cells.get(index).and_then(|c| c.as_deref());

            let Some(name) = cell(0).map(str::to_string) else {
                warn!(provider = SLUG, "Skipping plan without a name");
                continue;
            };

            plans.push(PlanRecord {
                provider_id: None,
                name,
                term_months: cell(1).and_then(parse_int),
                rate_cents_kwh: cell(2).and_then(normalize_rate),
                base_fee: cell(3).and_then(parse_money),
                cancellation_fee: cell(4).and_then(parse_money),
                renewable_percentage: cell(5).and_then(parse_percent),
                features: cell(6).map(str::to_string),
                url: Some(PLANS_URL.to_string()),
            });
        }

        Ok(ScrapeResult {
            provider: ProviderRecord {
                name: "Gexa Energy".to_string(),
                slug: SLUG.to_string(),
                website: Some("https://www.gexaenergy.com".to_string()),
            },
            plans,
        })
    }
}
