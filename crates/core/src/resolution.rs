//! Instance-resolution utilities
//!
//! Pure, stateless functions that decide, for a given metric and resource
//! type, which tag key names the sub-component of a multi-valued metric
//! and whether per-instance collection is available and wanted. Remote
//! availability always dominates user configuration: no filter can turn on
//! a per-instance query the API cannot satisfy.

use vcmon_domain::constants::DEFAULT_INSTANCE_TAG;
use vcmon_domain::{CompiledFilters, MorType};

use crate::metrics;

/// Metric-name prefix -> tag key used for the sub-component dimension
///
/// Longest matching prefix wins, so `virtualDisk.` is checked against the
/// full prefix and never swallowed by `disk.`.
static INSTANCE_TAG_MAPPING: &[(&str, &str)] = &[
    ("cpu.", "cpu_core"),
    ("datastore.", "vmfs_uuid"),
    ("disk.", "device_path"),
    ("net.", "nic"),
    ("virtualDisk.", "disk"),
];

/// Tag key used for the per-instance dimension of a metric
///
/// Total function: unmapped metric names fall back to the generic
/// `instance` tag key, never an error.
pub fn mapped_instance_tag(metric_name: &str) -> &'static str {
    INSTANCE_TAG_MAPPING
        .iter()
        .filter(|(prefix, _)| metric_name.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map_or(DEFAULT_INSTANCE_TAG, |(_, tag)| tag)
}

/// Whether the remote API can report this metric per sub-component on this
/// resource type
///
/// Consulted before issuing per-instance queries so the engine never asks
/// for data the server cannot produce.
pub fn is_metric_available_per_instance(metric_name: &str, mor_type: MorType) -> bool {
    metrics::per_instance_available(mor_type, metric_name)
}

/// Whether per-instance values of this metric should be collected
///
/// `false` whenever availability is `false`, regardless of configuration;
/// otherwise the user's resource-type-scoped filters decide.
pub fn should_collect_per_instance(
    filters: &CompiledFilters,
    metric_name: &str,
    mor_type: MorType,
) -> bool {
    if !is_metric_available_per_instance(metric_name, mor_type) {
        return false;
    }
    filters.per_instance_requested(mor_type, metric_name)
}
