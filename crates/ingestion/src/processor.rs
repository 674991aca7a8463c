//! Scrape orchestration
//!
//! Runs one adapter and writes its output: the provider is upserted and its
//! plan set replaced inside a single transaction. Runs for the same slug are
//! serialized; every run is bounded by the configured timeout.

use crate::adapters::{AdapterRegistry, ProviderAdapter, ScrapeResult};
use crate::errors::IngestionError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{error, info, instrument};
use validator::Validate;
use wattwise_common::config::ScraperConfig;
use wattwise_common::db::models::PlanRecord;
use wattwise_common::db::{replace_plans, upsert_provider, Repository};
use wattwise_common::errors::{AppError, Result};
use wattwise_common::metrics::record_scrape;

/// Runs provider scrapes against the store
#[derive(Clone)]
pub struct ScrapeRunner {
    repository: Repository,
    registry: Arc<AdapterRegistry>,
    timeout: Duration,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ScrapeRunner {
    pub fn new(repository: Repository, registry: AdapterRegistry, timeout: Duration) -> Self {
        Self {
            repository,
            registry: Arc::new(registry),
            timeout,
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Runner over the built-in adapters with the configured timeout
    pub fn from_config(repository: Repository, config: &ScraperConfig) -> Self {
        Self::new(repository, AdapterRegistry::default(), config.timeout())
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    /// Fail on the first slug without a registered adapter
    pub fn ensure_known<S: AsRef<str>>(&self, slugs: &[S]) -> Result<()> {
        match slugs.iter().find(|slug| !self.registry.contains(slug.as_ref())) {
            Some(unknown) => Err(IngestionError::UnknownProvider(unknown.as_ref().to_string()).into()),
            None => Ok(()),
        }
    }

    /// Scrape a batch in order, stopping at the first failure
    ///
    /// The whole batch is checked against the registry before anything runs.
    pub async fn run_many<S: AsRef<str>>(&self, slugs: &[S]) -> Result<Vec<ScrapeResult>> {
        if slugs.is_empty() {
            return Err(AppError::NoProvidersRequested);
        }
        self.ensure_known(slugs)?;

        let mut results = Vec::with_capacity(slugs.len());
        for slug in slugs {
            results.push(self.run_scraper(slug.as_ref()).await?);
        }
        Ok(results)
    }

    /// Scrape one provider and replace its stored plans
    ///
    /// Returns the records as the adapter produced them (`provider_id` unset).
    #[instrument(skip(self, slug), fields(provider = %slug))]
    pub async fn run_scraper(&self, slug: &str) -> Result<ScrapeResult> {
        let adapter = self
            .registry
            .get(slug)
            .ok_or_else(|| IngestionError::UnknownProvider(slug.to_string()))?;

        let lock = self.lock_for(slug).await;
        let _guard = lock.lock().await;

        let started = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, self.scrape(slug, adapter)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AppError::ScrapeTimeout {
                slug: slug.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }),
        };
        let elapsed = started.elapsed();

        match &outcome {
            Ok((result, stored)) => {
                record_scrape(slug, elapsed, Some(*stored));
                info!(
                    plans = result.plans.len(),
                    stored = *stored,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Scrape completed"
                );
            }
            Err(e) => {
                record_scrape(slug, elapsed, None);
                error!(error = %e, elapsed_ms = elapsed.as_millis() as u64, "Scrape failed");
            }
        }

        outcome.map(|(result, _)| result)
    }

    async fn lock_for(&self, slug: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(slug.to_string()).or_default().clone()
    }

    async fn scrape(
        &self,
        slug: &str,
        adapter: Box<dyn ProviderAdapter>,
    ) -> Result<(ScrapeResult, usize)> {
        let result = tokio::task::spawn_blocking(move || adapter.parse())
            .await
            .map_err(|e| IngestionError::Task(e.to_string()))??;

        check_records(slug, &result)?;

        let txn = self.repository.begin().await?;
        let provider = upsert_provider(&txn, &result.provider).await?;
        let assigned: Vec<PlanRecord> = result
            .plans
            .iter()
            .map(|plan| plan.assigned_to(provider.id))
            .collect();
        let stored = replace_plans(&txn, &provider, &assigned).await?;
        txn.commit().await?;

        Ok((result, stored.len()))
    }
}

fn check_records(slug: &str, result: &ScrapeResult) -> std::result::Result<(), IngestionError> {
    let invalid = |message: String| IngestionError::InvalidRecord {
        slug: slug.to_string(),
        message,
    };

    if result.provider.slug != slug {
        return Err(invalid(format!(
            "adapter reported provider '{}'",
            result.provider.slug
        )));
    }

    result
        .provider
        .validate()
        .map_err(|e| invalid(format!("provider: {}", e)))?;

    for plan in &result.plans {
        plan.validate()
            .map_err(|e| invalid(format!("plan '{}': {}", plan.name, e)))?;
    }

    Ok(())
}
