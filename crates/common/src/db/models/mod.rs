//! SeaORM entity models
//!
//! Database entities for WattWise plus the records adapters emit

mod plan;
mod provider;
mod records;

pub use provider::{
    Entity as ProviderEntity,
    Model as Provider,
    ActiveModel as ProviderActiveModel,
    Column as ProviderColumn,
};

pub use plan::{
    Entity as PlanEntity,
    Model as Plan,
    ActiveModel as PlanActiveModel,
    Column as PlanColumn,
};

pub use records::{PlanRecord, ProviderRecord};
