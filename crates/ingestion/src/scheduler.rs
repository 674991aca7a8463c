//! Recurring scrape scheduler
//!
//! One interval timer drives sequential passes over the configured providers.
//! The first pass runs one full period after start, and ticks missed while a
//! pass is still running are skipped rather than queued.

use crate::processor::ScrapeRunner;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, instrument, warn};
use wattwise_common::config::ScraperConfig;
use wattwise_common::metrics::record_scheduler_tick;

/// Outcome of one pass over the providers
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, String)>,
    /// Providers not attempted because shutdown was requested mid-pass
    pub skipped: Vec<String>,
}

pub struct ScrapeScheduler {
    runner: ScrapeRunner,
    providers: Vec<String>,
    period: Duration,
}

impl ScrapeScheduler {
    pub fn new(runner: ScrapeRunner, providers: Vec<String>, period: Duration) -> Self {
        Self {
            runner,
            providers,
            period,
        }
    }

    /// `None` when the scheduler is disabled or the interval is zero
    pub fn from_config(runner: ScrapeRunner, config: &ScraperConfig) -> Option<Self> {
        if !config.scheduler_enabled {
            return None;
        }
        let period = config.interval()?;
        Some(Self::new(runner, config.providers.clone(), period))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    /// One full pass, ignoring shutdown
    pub async fn run_once(&self) -> TickReport {
        self.pass(None).await
    }

    /// Run passes on the interval until `shutdown` flips to true or its sender is dropped
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                period_secs = self.period.as_secs(),
                providers = ?self.providers,
                "Scrape scheduler started"
            );

            let mut ticker = interval_at(Instant::now() + self.period, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        record_scheduler_tick();
                        self.pass(Some(&shutdown)).await;
                    }
                    _ = shutdown.changed() => break,
                }

                if *shutdown.borrow() {
                    break;
                }
            }

            info!("Scrape scheduler stopped");
        })
    }

    #[instrument(skip_all)]
    async fn pass(&self, shutdown: Option<&watch::Receiver<bool>>) -> TickReport {
        let mut report = TickReport::default();

        for (index, slug) in self.providers.iter().enumerate() {
            if shutdown.is_some_and(|rx| *rx.borrow()) {
                report.skipped = self.providers[index..].to_vec();
                info!(remaining = report.skipped.len(), "Shutdown requested, ending pass early");
                break;
            }

            match self.runner.run_scraper(slug).await {
                Ok(_) => report.succeeded.push(slug.clone()),
                Err(e) => {
                    warn!(provider = %slug, error = %e, "Scheduled scrape failed, continuing");
                    report.failed.push((slug.clone(), e.to_string()));
                }
            }
        }

        info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "Scheduled pass finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::AdapterRegistry;
    use crate::processor::tests::repository;

    fn providers(slugs: &[&str]) -> Vec<String> {
        slugs.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_pass_continues_past_failures() {
        let repo = repository().await;
        let runner = ScrapeRunner::new(repo.clone(), AdapterRegistry::default(), Duration::from_secs(5));
        let scheduler = ScrapeScheduler::new(
            runner,
            providers(&["txu", "acme", "gexa"]),
            Duration::from_secs(3600),
        );

        let report = scheduler.run_once().await;

        assert_eq!(report.succeeded, vec!["txu", "gexa"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "acme");
        assert!(report.skipped.is_empty());
        assert_eq!(repo.get_plans_by_provider_slug("gexa").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_spawned_scheduler_runs_and_stops() {
        let repo = repository().await;
        let runner = ScrapeRunner::new(repo.clone(), AdapterRegistry::default(), Duration::from_secs(5));
        let scheduler =
            ScrapeScheduler::new(runner, providers(&["reliant"]), Duration::from_millis(50));

        let (tx, rx) = watch::channel(false);
        let handle = scheduler.spawn(rx);

        tokio::time::sleep(Duration::from_millis(250)).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(repo.get_plans_by_provider_slug("reliant").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_first_pass_waits_one_period() {
        let repo = repository().await;
        let runner = ScrapeRunner::new(repo.clone(), AdapterRegistry::default(), Duration::from_secs(5));
        let scheduler = ScrapeScheduler::new(runner, providers(&["txu"]), Duration::from_secs(3600));

        let (tx, rx) = watch::channel(false);
        let handle = scheduler.spawn(rx);

        tokio::time::sleep(Duration::from_millis(100)).await;
        drop(tx);
        handle.await.unwrap();

        assert!(repo.list_providers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pass_stops_between_providers_on_shutdown() {
        let runner = ScrapeRunner::new(repository().await, AdapterRegistry::default(), Duration::from_secs(5));
        let scheduler = ScrapeScheduler::new(runner, providers(&["txu", "gexa"]), Duration::from_secs(60));

        let (_tx, rx) = watch::channel(true);
        let report = scheduler.pass(Some(&rx)).await;

        assert!(report.succeeded.is_empty());
        assert_eq!(report.skipped, vec!["txu", "gexa"]);
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = ScraperConfig::default();
        let disabled = ScraperConfig {
            scheduler_enabled: false,
            ..ScraperConfig::default()
        };
        let zero = ScraperConfig {
            interval_minutes: 0,
            ..ScraperConfig::default()
        };
        let runner = ScrapeRunner::from_config(repository().await, &config);

        let scheduler = ScrapeScheduler::from_config(runner.clone(), &config).unwrap();
        assert_eq!(scheduler.period(), Duration::from_secs(360 * 60));
        assert_eq!(scheduler.providers().len(), 4);

        assert!(ScrapeScheduler::from_config(runner.clone(), &disabled).is_none());
        assert!(ScrapeScheduler::from_config(runner, &zero).is_none());
    }
}
