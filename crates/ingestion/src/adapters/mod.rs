//! Provider adapters
//!
//! Each adapter knows one provider's markup and turns it into normalized
//! records. Adapters are looked up by slug through [`AdapterRegistry`].

mod direct_energy;
mod gexa;
mod reliant;
mod txu;

pub use direct_energy::DirectEnergyAdapter;
pub use gexa::GexaAdapter;
pub use reliant::ReliantAdapter;
pub use txu::TxuAdapter;

use crate::errors::IngestionError;
use serde::Serialize;
use std::collections::HashMap;
use wattwise_common::db::models::{PlanRecord, ProviderRecord};

/// Everything one adapter run extracted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeResult {
    pub provider: ProviderRecord,
    pub plans: Vec<PlanRecord>,
}

/// A provider-specific extractor
pub trait ProviderAdapter: Send + Sync {
    /// Slug the adapter is registered under
    fn slug(&self) -> &'static str;

    /// Extract the provider and its plans from the adapter's markup
    fn parse(&self) -> Result<ScrapeResult, IngestionError>;
}

/// Builds a fresh adapter for one run
pub type AdapterFactory = fn() -> Box<dyn ProviderAdapter>;

/// Slug to adapter factory
#[derive(Clone)]
pub struct AdapterRegistry {
    factories: HashMap<String, AdapterFactory>,
}

impl AdapterRegistry {
    /// Registry without any adapters
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register (or replace) the factory for `slug`
    pub fn register(&mut self, slug: impl Into<String>, factory: AdapterFactory) -> &mut Self {
        self.factories.insert(slug.into(), factory);
        self
    }

    /// Fresh adapter for `slug`
    pub fn get(&self, slug: &str) -> Option<Box<dyn ProviderAdapter>> {
        self.factories.get(slug).map(|factory| factory())
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.factories.contains_key(slug)
    }

    /// Registered slugs, sorted
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        slugs.sort_unstable();
        slugs
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("txu", || Box::new(TxuAdapter::new()))
            .register("reliant", || Box::new(ReliantAdapter::new()))
            .register("gexa", || Box::new(GexaAdapter::new()))
            .register("direct_energy", || Box::new(DirectEnergyAdapter::new()));
        registry
    }
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("slugs", &self.slugs())
            .finish()
    }
}
