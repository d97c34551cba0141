//! Per-connection counter metadata store

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::debug;
use vcmon_domain::{CheckError, CounterId, CounterMetadata, InstanceKey, Result};

use super::CounterTable;

#[derive(Debug, Default)]
struct InstanceCounters {
    metadata: CounterTable,
    metric_ids: Vec<CounterId>,
}

/// Thread-safe map from counter id to metadata, one table per instance key
///
/// Counter ids are connection-scoped, so each monitored endpoint gets its
/// own table; the store additionally tracks the subset of counter ids the
/// check has chosen to actually collect. A single coarse lock serializes
/// all access - metadata changes far less often than it is read.
///
/// Lookup failures are deliberately split in two: an uninitialized instance
/// key is a caller bug ([`CheckError::CacheNotInitialized`]), while an
/// unknown counter id on a known key is an expected, recoverable condition
/// ([`CheckError::MetadataNotFound`]).
#[derive(Debug, Default)]
pub struct CounterStore {
    instances: Mutex<HashMap<InstanceKey, InstanceCounters>>,
}

impl CounterStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty storage for a new instance key
    ///
    /// Idempotent: re-initializing an existing key keeps its content.
    pub fn init_instance(&self, key: &InstanceKey) {
        let mut instances = self.instances.lock();
        if !instances.contains_key(key) {
            debug!(instance = %key, "initializing counter storage");
            instances.insert(key.clone(), InstanceCounters::default());
        }
    }

    /// Whether metadata for `counter_id` is present under `key`
    ///
    /// # Errors
    /// Returns [`CheckError::CacheNotInitialized`] when `key` itself was
    /// never initialized - distinct from `Ok(false)` for a known key with
    /// an unknown id.
    pub fn contains(&self, key: &InstanceKey, counter_id: CounterId) -> Result<bool> {
        let instances = self.instances.lock();
        let entry = instances
            .get(key)
            .ok_or_else(|| CheckError::CacheNotInitialized(key.clone()))?;
        Ok(entry.metadata.contains_key(&counter_id))
    }

    /// Replace the metadata table for `key`
    ///
    /// # Errors
    /// Returns [`CheckError::CacheNotInitialized`] for an unknown key.
    pub fn set_metadata(&self, key: &InstanceKey, table: CounterTable) -> Result<()> {
        let mut instances = self.instances.lock();
        let entry = instances
            .get_mut(key)
            .ok_or_else(|| CheckError::CacheNotInitialized(key.clone()))?;
        entry.metadata = table;
        Ok(())
    }

    /// Look up metadata for one counter id
    ///
    /// # Errors
    /// Returns [`CheckError::CacheNotInitialized`] for an unknown key, and
    /// [`CheckError::MetadataNotFound`] for an absent id - never a generic
    /// lookup error, so callers can choose to skip a metric rather than
    /// fail the whole collection.
    pub fn get_metadata(&self, key: &InstanceKey, counter_id: CounterId) -> Result<CounterMetadata> {
        let instances = self.instances.lock();
        let entry = instances
            .get(key)
            .ok_or_else(|| CheckError::CacheNotInitialized(key.clone()))?;
        entry
            .metadata
            .get(&counter_id)
            .cloned()
            .ok_or(CheckError::MetadataNotFound(counter_id))
    }

    /// Replace the list of counter ids selected for collection
    ///
    /// # Errors
    /// Returns [`CheckError::CacheNotInitialized`] for an unknown key.
    pub fn set_metric_ids(&self, key: &InstanceKey, ids: Vec<CounterId>) -> Result<()> {
        let mut instances = self.instances.lock();
        let entry = instances
            .get_mut(key)
            .ok_or_else(|| CheckError::CacheNotInitialized(key.clone()))?;
        entry.metric_ids = ids;
        Ok(())
    }

    /// Get the list of counter ids selected for collection
    ///
    /// # Errors
    /// Returns [`CheckError::CacheNotInitialized`] for an unknown key.
    pub fn get_metric_ids(&self, key: &InstanceKey) -> Result<Vec<CounterId>> {
        let instances = self.instances.lock();
        let entry = instances
            .get(key)
            .ok_or_else(|| CheckError::CacheNotInitialized(key.clone()))?;
        Ok(entry.metric_ids.clone())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::counters.
    use vcmon_domain::RollupType;

    use super::*;

    fn metadata(name: &str) -> CounterMetadata {
        CounterMetadata { name: name.to_string(), unit: "percent".to_string(), rollup: RollupType::Average }
    }

    /// Validates `CounterStore::get_metadata` behavior for the round-trip
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms stored metadata is returned exactly as stored.
    /// - Confirms an id that was never stored raises `MetadataNotFound`,
    ///   not a generic error.
    #[test]
    fn test_metadata_round_trip_and_not_found() {
        let store = CounterStore::new();
        let key = InstanceKey::new("vc1");
        store.init_instance(&key);

        let mut table = CounterTable::new();
        table.insert(CounterId(100), metadata("cpu.usage.avg"));
        store.set_metadata(&key, table).unwrap();

        assert_eq!(store.get_metadata(&key, CounterId(100)).unwrap(), metadata("cpu.usage.avg"));
        assert!(matches!(
            store.get_metadata(&key, CounterId(999)),
            Err(CheckError::MetadataNotFound(CounterId(999)))
        ));
    }

    /// Validates `CounterStore::contains` behavior for the empty instance
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms no false positives right after `init_instance`.
    /// - Confirms an uninitialized key raises `CacheNotInitialized`.
    #[test]
    fn test_contains_contract() {
        let store = CounterStore::new();
        let key = InstanceKey::new("vc1");
        store.init_instance(&key);

        assert!(!store.contains(&key, CounterId(1)).unwrap());

        let unknown = InstanceKey::new("never-initialized");
        assert!(matches!(
            store.contains(&unknown, CounterId(1)),
            Err(CheckError::CacheNotInitialized(_))
        ));
    }

    /// Validates `CounterStore::init_instance` behavior for the idempotency
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms re-initializing a key keeps previously stored metadata.
    #[test]
    fn test_init_instance_idempotent() {
        let store = CounterStore::new();
        let key = InstanceKey::new("vc1");
        store.init_instance(&key);

        let mut table = CounterTable::new();
        table.insert(CounterId(7), metadata("mem.usage.avg"));
        store.set_metadata(&key, table).unwrap();

        store.init_instance(&key);
        assert!(store.contains(&key, CounterId(7)).unwrap());
    }

    /// Validates `CounterStore` metric id tracking.
    ///
    /// Assertions:
    /// - Confirms metric ids round-trip through the store.
    /// - Confirms an uninitialized key raises `CacheNotInitialized`.
    #[test]
    fn test_metric_ids() {
        let store = CounterStore::new();
        let key = InstanceKey::new("vc1");
        store.init_instance(&key);

        store.set_metric_ids(&key, vec![CounterId(1), CounterId(2)]).unwrap();
        assert_eq!(store.get_metric_ids(&key).unwrap(), vec![CounterId(1), CounterId(2)]);

        let unknown = InstanceKey::new("other");
        assert!(matches!(
            store.get_metric_ids(&unknown),
            Err(CheckError::CacheNotInitialized(_))
        ));
    }
}
