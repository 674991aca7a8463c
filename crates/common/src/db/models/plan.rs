//! Plan entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub provider_id: i32,

    pub name: String,

    pub term_months: Option<i32>,

    /// Energy charge in cents per kWh
    pub rate_cents_kwh: Option<f64>,

    /// Fixed monthly charge in dollars
    pub base_fee: Option<f64>,

    pub cancellation_fee: Option<f64>,

    /// 0-100
    pub renewable_percentage: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub features: Option<String>,

    #[sea_orm(nullable)]
    pub url: Option<String>,

    /// Set on every write; plans are rewritten wholesale on each scrape
    pub last_scraped_at: DateTimeUtc,
}

impl Model {
    /// Estimated monthly cost in dollars at the given usage
    pub fn cost_for_usage(&self, usage_kwh: f64) -> f64 {
        crate::pricing::cost_for_usage(self.rate_cents_kwh, self.base_fee, usage_kwh)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::provider::Entity",
        from = "Column::ProviderId",
        to = "super::provider::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Provider,
}

impl Related<super::provider::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Provider.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
