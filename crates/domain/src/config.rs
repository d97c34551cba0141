//! Configuration structures
//!
//! The configuration is supplied by the embedding agent (YAML/CLI loading
//! is out of scope) and consumed read-only by the collection engine. User
//! regex filters are compiled once per check instance so invalid patterns
//! surface before a run starts, never in the middle of one.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_INFRASTRUCTURE_TTL_SECS, DEFAULT_METADATA_TTL_SECS,
    DEFAULT_POOL_SIZE, DEFAULT_RUN_TIMEOUT_SECS,
};
use crate::errors::{CheckError, Result};
use crate::types::MorType;

/// Per-connection collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Unique name of the monitored endpoint
    pub instance_key: String,
    /// Tags appended to every submission from this instance
    pub custom_tags: Vec<String>,
    /// Per-type include patterns applied to resource names; a type with no
    /// patterns includes everything
    pub resource_filters: HashMap<MorType, Vec<String>>,
    /// Per-type patterns selecting which metrics are collected once per
    /// sub-component instead of once per resource
    pub collect_per_instance_filters: HashMap<MorType, Vec<String>>,
    /// Whether the historical tier (cluster/datastore/datacenter) is
    /// collected at all
    pub collect_historical: bool,
    /// Tag keys stripped from the external host-tag payload
    pub excluded_host_tags: Vec<String>,
    /// Size of the collection worker pool
    pub pool_size: usize,
    /// Bound on one whole check run, in seconds
    pub run_timeout_secs: u64,
    /// Bound on one remote call, in seconds
    pub call_timeout_secs: u64,
    /// Time-to-live of the infrastructure topology cache, in seconds
    pub infrastructure_ttl_secs: u64,
    /// Time-to-live of the counter metadata cache, in seconds
    pub metadata_ttl_secs: u64,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            instance_key: String::new(),
            custom_tags: Vec::new(),
            resource_filters: HashMap::new(),
            collect_per_instance_filters: HashMap::new(),
            collect_historical: true,
            excluded_host_tags: Vec::new(),
            pool_size: DEFAULT_POOL_SIZE,
            run_timeout_secs: DEFAULT_RUN_TIMEOUT_SECS,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
            infrastructure_ttl_secs: DEFAULT_INFRASTRUCTURE_TTL_SECS,
            metadata_ttl_secs: DEFAULT_METADATA_TTL_SECS,
        }
    }
}

impl CollectionConfig {
    /// Compile the regex filters for this configuration
    ///
    /// # Errors
    /// Returns [`CheckError::Config`] when the instance key is empty or any
    /// pattern fails to compile.
    pub fn compile_filters(&self) -> Result<CompiledFilters> {
        if self.instance_key.is_empty() {
            return Err(CheckError::Config(
                "a unique instance_key must be set per monitored endpoint".to_string(),
            ));
        }
        Ok(CompiledFilters {
            resource_include: compile_map(&self.resource_filters)?,
            per_instance: compile_map(&self.collect_per_instance_filters)?,
        })
    }
}

fn compile_map(patterns: &HashMap<MorType, Vec<String>>) -> Result<HashMap<MorType, Vec<Regex>>> {
    let mut compiled = HashMap::new();
    for (mor_type, list) in patterns {
        let regexes = list
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    CheckError::Config(format!("invalid filter pattern `{p}` for {mor_type}: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        compiled.insert(*mor_type, regexes);
    }
    Ok(compiled)
}

/// Compiled form of the user's regex filters
#[derive(Debug, Default)]
pub struct CompiledFilters {
    resource_include: HashMap<MorType, Vec<Regex>>,
    per_instance: HashMap<MorType, Vec<Regex>>,
}

impl CompiledFilters {
    /// Whether a resource of the given type and name passes the include
    /// filters
    ///
    /// A type with no configured patterns includes every resource.
    pub fn resource_included(&self, mor_type: MorType, name: &str) -> bool {
        match self.resource_include.get(&mor_type) {
            None => true,
            Some(regexes) if regexes.is_empty() => true,
            Some(regexes) => regexes.iter().any(|r| r.is_match(name)),
        }
    }

    /// Whether the user asked for per-instance collection of this metric on
    /// this resource type
    ///
    /// Absent patterns mean aggregate-only collection.
    pub fn per_instance_requested(&self, mor_type: MorType, metric_name: &str) -> bool {
        self.per_instance
            .get(&mor_type)
            .is_some_and(|regexes| regexes.iter().any(|r| r.is_match(metric_name)))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration filters.
    use super::*;

    /// Validates `CollectionConfig::compile_filters` behavior for the
    /// validation scenario.
    ///
    /// Assertions:
    /// - Confirms an empty instance key is rejected.
    /// - Confirms an invalid pattern is rejected with a Config error.
    #[test]
    fn test_compile_filters_validation() {
        let config = CollectionConfig::default();
        assert!(matches!(config.compile_filters(), Err(CheckError::Config(_))));

        let mut config = CollectionConfig { instance_key: "vc1".to_string(), ..Default::default() };
        config.resource_filters.insert(MorType::VirtualMachine, vec!["[".to_string()]);
        assert!(matches!(config.compile_filters(), Err(CheckError::Config(_))));
    }

    /// Validates `CompiledFilters::resource_included` behavior for the
    /// include semantics scenario.
    ///
    /// Assertions:
    /// - Confirms a type with no patterns includes every name.
    /// - Confirms patterns restrict inclusion to matching names.
    #[test]
    fn test_resource_include_semantics() {
        let mut config = CollectionConfig { instance_key: "vc1".to_string(), ..Default::default() };
        config.resource_filters.insert(MorType::VirtualMachine, vec!["^prod-".to_string()]);
        let filters = config.compile_filters().unwrap();

        assert!(filters.resource_included(MorType::VirtualMachine, "prod-web-1"));
        assert!(!filters.resource_included(MorType::VirtualMachine, "dev-web-1"));
        // No patterns configured for hosts
        assert!(filters.resource_included(MorType::HostSystem, "anything"));
    }

    /// Validates `CompiledFilters::per_instance_requested` behavior for the
    /// default-off scenario.
    ///
    /// Assertions:
    /// - Confirms per-instance collection defaults to off.
    /// - Confirms a matching pattern turns it on for that type only.
    #[test]
    fn test_per_instance_defaults_off() {
        let mut config = CollectionConfig { instance_key: "vc1".to_string(), ..Default::default() };
        config
            .collect_per_instance_filters
            .insert(MorType::VirtualMachine, vec!["cpu\\..*".to_string()]);
        let filters = config.compile_filters().unwrap();

        assert!(filters.per_instance_requested(MorType::VirtualMachine, "cpu.usage.avg"));
        assert!(!filters.per_instance_requested(MorType::VirtualMachine, "mem.usage.avg"));
        assert!(!filters.per_instance_requested(MorType::HostSystem, "cpu.usage.avg"));
    }
}
