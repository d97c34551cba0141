//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! engine.

// Collection cadence
/// Sampling interval of the realtime tier, in seconds (fixed server-side)
pub const REALTIME_INTERVAL_SECS: u64 = 20;
/// Default time-to-live of the infrastructure topology cache
pub const DEFAULT_INFRASTRUCTURE_TTL_SECS: u64 = 180;
/// Default time-to-live of the counter metadata cache
pub const DEFAULT_METADATA_TTL_SECS: u64 = 600;

// Worker pool
/// Default size of the collection worker pool
pub const DEFAULT_POOL_SIZE: usize = 4;
/// Default bound on one whole check run, in seconds
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 60;
/// Default bound on one remote call, in seconds
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 15;

// Submission naming
/// Prefix applied to every submitted metric name
pub const METRIC_PREFIX: &str = "vsphere.";
/// Name of the connectivity service check
pub const SERVICE_CHECK_NAME: &str = "vcmon.can_connect";
/// Source type key used in the external host-tag payload
pub const SOURCE_TYPE: &str = "vsphere";
/// Fallback tag key for multi-valued metrics with no specific mapping
pub const DEFAULT_INSTANCE_TAG: &str = "instance";
