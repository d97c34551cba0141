//! Per-connection caches
//!
//! Three pieces of state survive across check runs, all created lazily at
//! first use and mutated only by the refresh path:
//! - [`CounterStore`]: counter id -> metadata, scoped by instance key
//! - [`MetricsMetadataCache`]: per-resource-type counter tables, TTL-gated
//! - [`InfrastructureCache`]: the object-topology snapshot, TTL-gated

mod counters;
mod infrastructure;
mod metadata;

pub use counters::CounterStore;
pub use infrastructure::{InfrastructureCache, InfrastructureSnapshot};
pub use metadata::{CounterTable, MetricsMetadataCache, TypeTables};
