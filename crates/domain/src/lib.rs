//! # vcmon Domain
//!
//! Business domain types and models for vcmon.
//!
//! This crate contains:
//! - Domain data types (managed object references, counters, samples)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other vcmon crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::{CollectionConfig, CompiledFilters};
pub use errors::{CheckError, Result};
pub use types::{
    CounterId, CounterMetadata, InstanceKey, MetricSubmission, Mor, MorId, MorProperties, MorType,
    PerfSample, PowerState, RollupType, ServiceCheckStatus,
};
