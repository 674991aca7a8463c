//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling and transaction support.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::Result;
use chrono::Utc;
use sea_orm::sea_query::{NullOrdering, Order};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, LoaderTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::debug;

/// A plan joined with its owning provider
#[derive(Debug, Clone, Serialize)]
pub struct PlanWithProvider {
    pub plan: Plan,
    pub provider: Provider,
}

/// A provider with every plan it currently offers
#[derive(Debug, Clone, Serialize)]
pub struct ProviderWithPlans {
    pub provider: Provider,
    pub plans: Vec<Plan>,
}

// ============================================================================
// Transaction-scoped operations
// ============================================================================

/// Insert the provider, or overwrite name and website of the existing row with the same slug
pub async fn upsert_provider<C>(conn: &C, record: &ProviderRecord) -> Result<Provider>
where
    C: ConnectionTrait,
{
    let existing = ProviderEntity::find()
        .filter(ProviderColumn::Slug.eq(record.slug.as_str()))
        .one(conn)
        .await?;

    match existing {
        Some(provider) => {
            let mut active: ProviderActiveModel = provider.into();
            active.name = Set(record.name.clone());
            active.website = Set(record.website.clone());
            active.update(conn).await.map_err(Into::into)
        }
        None => {
            let active = ProviderActiveModel {
                slug: Set(record.slug.clone()),
                name: Set(record.name.clone()),
                website: Set(record.website.clone()),
                created_at: Set(Utc::now()),
                ..Default::default()
            };
            active.insert(conn).await.map_err(Into::into)
        }
    }
}

/// Delete every plan owned by `provider` and insert `plans` in their place
///
/// Each record's `provider_id` is overwritten with the provider's id.
pub async fn replace_plans<C>(
    conn: &C,
    provider: &Provider,
    plans: &[PlanRecord],
) -> Result<Vec<Plan>>
where
    C: ConnectionTrait,
{
    let removed = PlanEntity::delete_many()
        .filter(PlanColumn::ProviderId.eq(provider.id))
        .exec(conn)
        .await?;

    let scraped_at = Utc::now();
    let mut stored = Vec::with_capacity(plans.len());

    for record in plans {
        let active = PlanActiveModel {
            provider_id: Set(provider.id),
            name: Set(record.name.clone()),
            term_months: Set(record.term_months),
            rate_cents_kwh: Set(record.rate_cents_kwh),
            base_fee: Set(record.base_fee),
            cancellation_fee: Set(record.cancellation_fee),
            renewable_percentage: Set(record.renewable_percentage),
            features: Set(record.features.clone()),
            url: Set(record.url.clone()),
            last_scraped_at: Set(scraped_at),
            ..Default::default()
        };
        stored.push(active.insert(conn).await?);
    }

    debug!(
        provider = %provider.slug,
        removed = removed.rows_affected,
        inserted = stored.len(),
        "Replaced provider plans"
    );

    Ok(stored)
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    /// Start a transaction on the underlying pool
    pub async fn begin(&self) -> Result<DatabaseTransaction> {
        self.conn().begin().await.map_err(Into::into)
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Provider Operations
    // ========================================================================

    /// Upsert a provider outside of any caller transaction
    pub async fn upsert_provider(&self, record: &ProviderRecord) -> Result<Provider> {
        upsert_provider(self.conn(), record).await
    }

    /// Find provider by slug
    pub async fn find_provider_by_slug(&self, slug: &str) -> Result<Option<Provider>> {
        ProviderEntity::find()
            .filter(ProviderColumn::Slug.eq(slug))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// All providers ordered by name, each with its plans
    pub async fn list_providers(&self) -> Result<Vec<ProviderWithPlans>> {
        let providers = ProviderEntity::find()
            .order_by_asc(ProviderColumn::Name)
            .order_by_asc(ProviderColumn::Id)
            .all(self.conn())
            .await?;

        let plans = providers.load_many(PlanEntity, self.conn()).await?;

        Ok(providers
            .into_iter()
            .zip(plans)
            .map(|(provider, mut plans)| {
                plans.sort_by_key(|plan| plan.id);
                ProviderWithPlans { provider, plans }
            })
            .collect())
    }

    /// Delete a provider and its plans; returns false when the slug is unknown
    pub async fn delete_provider(&self, slug: &str) -> Result<bool> {
        let txn = self.begin().await?;

        let Some(provider) = ProviderEntity::find()
            .filter(ProviderColumn::Slug.eq(slug))
            .one(&txn)
            .await?
        else {
            return Ok(false);
        };

        PlanEntity::delete_many()
            .filter(PlanColumn::ProviderId.eq(provider.id))
            .exec(&txn)
            .await?;
        ProviderEntity::delete_by_id(provider.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }

    // ========================================================================
    // Plan Operations
    // ========================================================================

    /// Replace a provider's plans inside a dedicated transaction
    pub async fn replace_plans(
        &self,
        provider: &Provider,
        plans: &[PlanRecord],
    ) -> Result<Vec<Plan>> {
        let txn = self.begin().await?;
        let stored = replace_plans(&txn, provider, plans).await?;
        txn.commit().await?;
        Ok(stored)
    }

    /// All plans, cheapest rate first, then shortest term, then id
    pub async fn list_plans(&self) -> Result<Vec<PlanWithProvider>> {
        let rows = PlanEntity::find()
            .find_also_related(ProviderEntity)
            .order_by_with_nulls(PlanColumn::RateCentsKwh, Order::Asc, NullOrdering::Last)
            .order_by_with_nulls(PlanColumn::TermMonths, Order::Asc, NullOrdering::Last)
            .order_by_asc(PlanColumn::Id)
            .all(self.conn())
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(plan, provider)| {
                provider.map(|provider| PlanWithProvider { plan, provider })
            })
            .collect())
    }

    /// One plan with its provider
    pub async fn get_plan(&self, id: i32) -> Result<Option<PlanWithProvider>> {
        let row = PlanEntity::find_by_id(id)
            .find_also_related(ProviderEntity)
            .one(self.conn())
            .await?;

        Ok(row.and_then(|(plan, provider)| {
            provider.map(|provider| PlanWithProvider { plan, provider })
        }))
    }

    /// Plans of the provider with this slug; empty when the slug is unknown
    pub async fn get_plans_by_provider_slug(&self, slug: &str) -> Result<Vec<Plan>> {
        PlanEntity::find()
            .inner_join(ProviderEntity)
            .filter(ProviderColumn::Slug.eq(slug))
            .order_by_asc(PlanColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    async fn repository() -> Repository {
        let pool = DbPool::connect_and_migrate(&DatabaseConfig::sqlite_memory())
            .await
            .unwrap();
        Repository::new(pool)
    }

    fn provider(slug: &str, name: &str) -> ProviderRecord {
        ProviderRecord {
            name: name.into(),
            slug: slug.into(),
            website: Some(format!("https://www.{}.com", slug)),
        }
    }

    fn plan(name: &str, rate: Option<f64>, term: Option<i32>) -> PlanRecord {
        PlanRecord {
            provider_id: None,
            name: name.into(),
            term_months: term,
            rate_cents_kwh: rate,
            base_fee: Some(4.95),
            cancellation_fee: Some(150.0),
            renewable_percentage: Some(20),
            features: Some("Fixed rate".into()),
            url: None,
        }
    }

    fn names(plans: &[Plan]) -> Vec<String> {
        plans.iter().map(|p| p.name.clone()).collect()
    }

    #[tokio::test]
    async fn test_upsert_provider_keeps_one_row_per_slug() {
        let repo = repository().await;

        let first = repo.upsert_provider(&provider("txu", "TXU")).await.unwrap();
        let second = repo
            .upsert_provider(&provider("txu", "TXU Energy"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "TXU Energy");

        let providers = repo.list_providers().await.unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].provider.name, "TXU Energy");
    }

    #[tokio::test]
    async fn test_replace_plans_is_exact_and_idempotent() {
        let repo = repository().await;
        let txu = repo.upsert_provider(&provider("txu", "TXU Energy")).await.unwrap();

        let first = vec![plan("A", Some(12.0), Some(12)), plan("B", Some(11.0), Some(24))];
        repo.replace_plans(&txu, &first).await.unwrap();

        let second = vec![plan("C", Some(10.0), Some(36))];
        repo.replace_plans(&txu, &second).await.unwrap();
        repo.replace_plans(&txu, &second).await.unwrap();

        let stored = repo.get_plans_by_provider_slug("txu").await.unwrap();
        assert_eq!(names(&stored), vec!["C"]);
        assert!(stored.iter().all(|p| p.provider_id == txu.id));
    }

    #[tokio::test]
    async fn test_replace_plans_leaves_other_providers_alone() {
        let repo = repository().await;
        let txu = repo.upsert_provider(&provider("txu", "TXU Energy")).await.unwrap();
        let gexa = repo.upsert_provider(&provider("gexa", "Gexa Energy")).await.unwrap();

        repo.replace_plans(&txu, &[plan("T", Some(12.0), Some(12))]).await.unwrap();
        repo.replace_plans(&gexa, &[plan("G", Some(9.8), Some(12))]).await.unwrap();
        repo.replace_plans(&txu, &[]).await.unwrap();

        assert!(repo.get_plans_by_provider_slug("txu").await.unwrap().is_empty());
        assert_eq!(names(&repo.get_plans_by_provider_slug("gexa").await.unwrap()), vec!["G"]);
    }

    #[tokio::test]
    async fn test_list_plans_orders_by_rate_then_term() {
        let repo = repository().await;
        let txu = repo.upsert_provider(&provider("txu", "TXU Energy")).await.unwrap();

        repo.replace_plans(
            &txu,
            &[
                plan("no-rate", None, Some(6)),
                plan("pricey", Some(13.0), Some(12)),
                plan("cheap-long", Some(10.0), Some(36)),
                plan("cheap-short", Some(10.0), Some(12)),
            ],
        )
        .await
        .unwrap();

        let listed: Vec<String> = repo
            .list_plans()
            .await
            .unwrap()
            .into_iter()
            .map(|row| {
                assert_eq!(row.provider.slug, "txu");
                row.plan.name
            })
            .collect();

        assert_eq!(listed, vec!["cheap-short", "cheap-long", "pricey", "no-rate"]);
    }

    #[tokio::test]
    async fn test_get_plan_attaches_provider() {
        let repo = repository().await;
        let gexa = repo.upsert_provider(&provider("gexa", "Gexa Energy")).await.unwrap();
        let stored = repo
            .replace_plans(&gexa, &[plan("Gexa Saver", Some(9.8), Some(12))])
            .await
            .unwrap();

        let found = repo.get_plan(stored[0].id).await.unwrap().unwrap();
        assert_eq!(found.plan.name, "Gexa Saver");
        assert_eq!(found.provider.slug, "gexa");

        assert!(repo.get_plan(stored[0].id + 100).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_slug_yields_nothing() {
        let repo = repository().await;
        assert!(repo.get_plans_by_provider_slug("nobody").await.unwrap().is_empty());
        assert!(repo.find_provider_by_slug("nobody").await.unwrap().is_none());
        assert!(!repo.delete_provider("nobody").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_providers_nests_plans_sorted_by_name() {
        let repo = repository().await;
        let txu = repo.upsert_provider(&provider("txu", "TXU Energy")).await.unwrap();
        let gexa = repo.upsert_provider(&provider("gexa", "Gexa Energy")).await.unwrap();
        repo.replace_plans(&txu, &[plan("T1", Some(12.0), Some(12))]).await.unwrap();
        repo.replace_plans(&gexa, &[plan("G1", Some(9.8), Some(12)), plan("G2", Some(10.4), Some(36))])
            .await
            .unwrap();

        let providers = repo.list_providers().await.unwrap();
        let slugs: Vec<&str> = providers.iter().map(|p| p.provider.slug.as_str()).collect();
        assert_eq!(slugs, vec!["gexa", "txu"]);
        assert_eq!(names(&providers[0].plans), vec!["G1", "G2"]);
        assert_eq!(names(&providers[1].plans), vec!["T1"]);
    }

    #[tokio::test]
    async fn test_delete_provider_removes_plans() {
        let repo = repository().await;
        let txu = repo.upsert_provider(&provider("txu", "TXU Energy")).await.unwrap();
        repo.replace_plans(&txu, &[plan("T1", Some(12.0), Some(12))]).await.unwrap();

        assert!(repo.delete_provider("txu").await.unwrap());
        assert!(repo.list_plans().await.unwrap().is_empty());
        assert!(repo.list_providers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let repo = repository().await;
        let txu = repo.upsert_provider(&provider("txu", "TXU Energy")).await.unwrap();
        repo.replace_plans(&txu, &[plan("kept", Some(12.0), Some(12))]).await.unwrap();

        {
            let txn = repo.begin().await.unwrap();
            replace_plans(&txn, &txu, &[plan("discarded", Some(1.0), Some(1))])
                .await
                .unwrap();
        }

        let stored = repo.get_plans_by_provider_slug("txu").await.unwrap();
        assert_eq!(names(&stored), vec!["kept"]);
    }
}
