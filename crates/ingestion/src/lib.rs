//! WattWise ingestion
//!
//! Provider adapters turn each provider's plan markup into normalized records;
//! the runner writes them to the store and the scheduler repeats that on an
//! interval.

pub mod adapters;
pub mod errors;
pub mod normalize;
pub mod processor;
pub mod scheduler;
pub mod signal;

pub use adapters::{AdapterRegistry, ProviderAdapter, ScrapeResult};
pub use errors::IngestionError;
pub use processor::ScrapeRunner;
pub use scheduler::{ScrapeScheduler, TickReport};
