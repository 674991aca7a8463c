//! Database layer for WattWise
//!
//! Provides:
//! - SeaORM entity models
//! - Repository pattern for data access
//! - Connection pool management
//! - Schema bootstrap from the entity definitions

pub mod models;
mod repository;

pub use repository::{
    replace_plans, upsert_provider, PlanWithProvider, ProviderWithPlans, Repository,
};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use models::{PlanEntity, ProviderEntity};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let mut opts = ConnectOptions::new(&config.url);
        opts
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(false);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e)
            })?;

        info!(backend = ?conn.get_database_backend(), "Database connection established");

        Ok(Self { conn })
    }

    /// Connect and make sure the schema exists
    pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<Self> {
        let pool = Self::new(config).await?;
        pool.init_schema().await?;
        Ok(pool)
    }

    /// Get the underlying connection
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Create the provider and plan tables (and the plan index) when missing
    pub async fn init_schema(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut providers = schema.create_table_from_entity(ProviderEntity);
        providers.if_not_exists();
        self.conn.execute(backend.build(&providers)).await?;

        let mut plans = schema.create_table_from_entity(PlanEntity);
        plans.if_not_exists();
        self.conn.execute(backend.build(&plans)).await?;

        for mut index in schema.create_index_from_entity(PlanEntity) {
            index.if_not_exists();
            self.conn.execute(backend.build(&index)).await?;
        }

        info!("Database schema ready");
        Ok(())
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;

        Ok(())
    }
}
