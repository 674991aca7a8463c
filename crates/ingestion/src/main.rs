//! WattWise Scrape Worker
//!
//! Usage:
//! - `scrape-worker once [slug...]` runs one pass (default providers when no slug is
//!   given) and exits non-zero if any scrape fails
//! - `scrape-worker` runs the recurring scheduler until Ctrl+C / SIGTERM

use anyhow::{bail, Context};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use wattwise_common::{config::AppConfig, db::DbPool, metrics, telemetry, Repository, VERSION};
use wattwise_ingestion::{signal::shutdown_signal, ScrapeRunner, ScrapeScheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Arc::new(AppConfig::load().context("Failed to load configuration")?);

    telemetry::init_tracing(&config.observability)?;

    info!("Starting WattWise Scrape Worker v{}", VERSION);

    if config.observability.metrics_enabled {
        metrics::register_metrics();
    }

    let db = DbPool::connect_and_migrate(&config.database).await?;
    let runner = ScrapeRunner::from_config(Repository::new(db), &config.scraper);

    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("once") => {
            let slugs = if args.len() > 1 {
                args[1..].to_vec()
            } else {
                config.scraper.providers.clone()
            };

            info!(providers = ?slugs, "Running a single scrape pass");
            let results = runner.run_many(slugs.as_slice()).await?;

            for result in &results {
                info!(
                    provider = %result.provider.slug,
                    plans = result.plans.len(),
                    "Provider scraped"
                );
            }
            Ok(())
        }
        Some(other) => bail!("Unknown command '{}', expected `once [slug...]`", other),
        None => {
            let Some(scheduler) = ScrapeScheduler::from_config(runner, &config.scraper) else {
                bail!("Scheduler is disabled; enable scraper.scheduler_enabled or use `once`");
            };

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let handle = scheduler.spawn(shutdown_rx);

            shutdown_signal().await;
            let _ = shutdown_tx.send(true);

            match tokio::time::timeout(config.shutdown_timeout(), handle).await {
                Ok(joined) => joined.context("Scheduler task panicked")?,
                Err(_) => warn!("Scheduler did not stop within the shutdown timeout"),
            }

            info!("Scrape worker shutdown complete");
            Ok(())
        }
    }
}
