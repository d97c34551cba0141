//! # vcmon Core
//!
//! Caching and concurrent-collection engine - no wire protocol code.
//!
//! This crate contains:
//! - Per-connection counter metadata store and TTL cache specializations
//! - Instance-resolution utilities for per-instance metric tagging
//! - Port/adapter interfaces (traits) for the remote API and metric sink
//! - The collection orchestrator that drives one check run
//!
//! ## Architecture Principles
//! - Only depends on `vcmon-common` and `vcmon-domain`
//! - All external collaborators reached via traits
//! - Caches are the only state shared across tasks

pub mod cache;
pub mod collector;
pub mod metrics;
pub mod resolution;

// Re-export specific items to avoid ambiguity
pub use cache::{CounterStore, CounterTable, InfrastructureCache, MetricsMetadataCache};
pub use collector::ports::{InventoryApi, MetricSink};
pub use collector::{Collector, RunSummary};
pub use resolution::{
    is_metric_available_per_instance, mapped_instance_tag, should_collect_per_instance,
};
