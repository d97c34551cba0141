//! Counter metadata cache, TTL-gated per resource type

use std::collections::HashMap;
use std::time::Duration;

use vcmon_common::{Clock, SystemClock, TtlCache};
use vcmon_domain::{CounterId, CounterMetadata, MorType};

/// One logical metadata table: counter id -> metadata
pub type CounterTable = HashMap<CounterId, CounterMetadata>;

/// Staging area exposed by [`MetricsMetadataCache::refresh`]
///
/// Holds one metadata table per resource type; replaced wholesale on each
/// successful refresh.
#[derive(Debug, Clone, Default)]
pub struct TypeTables {
    tables: HashMap<MorType, CounterTable>,
}

impl TypeTables {
    /// Install the metadata table for one resource type
    pub fn set_metadata(&mut self, mor_type: MorType, table: CounterTable) {
        self.tables.insert(mor_type, table);
    }

    /// Borrow the table for one resource type, if present
    pub fn get_metadata(&self, mor_type: MorType) -> Option<&CounterTable> {
        self.tables.get(&mor_type)
    }
}

/// TTL-gated cache of per-resource-type counter definitions
///
/// Refreshed when the connection's available counter set might have
/// changed, or when the TTL elapses. Readers copy tables out; the refresh
/// path replaces all tables as a unit.
pub struct MetricsMetadataCache<C = SystemClock>
where
    C: Clock,
{
    cache: TtlCache<TypeTables, C>,
}

impl MetricsMetadataCache<SystemClock> {
    /// Create a cache with the given time-to-live
    pub fn new(ttl: Duration) -> Self {
        Self { cache: TtlCache::new(ttl) }
    }
}

impl<C> MetricsMetadataCache<C>
where
    C: Clock,
{
    /// Create a cache with a custom clock (useful for testing)
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self { cache: TtlCache::with_clock(ttl, clock) }
    }

    /// Whether the metadata must be refreshed before being trusted
    pub fn is_expired(&self) -> bool {
        self.cache.is_expired()
    }

    /// Refresh all tables through a staged update scope
    ///
    /// # Errors
    /// Propagates the scope's error; previously committed tables are left
    /// untouched in that case.
    pub fn refresh<R, E>(&self, op: impl FnOnce(&mut TypeTables) -> Result<R, E>) -> Result<R, E> {
        self.cache.update(op)
    }

    /// Copy out the metadata table for one resource type
    ///
    /// Returns an empty table when the type has none - a valid state right
    /// after a refresh that discovered no counters for it.
    pub fn get_metadata(&self, mor_type: MorType) -> CounterTable {
        self.cache.read(|tables| tables.get_metadata(mor_type).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::metadata.
    use vcmon_common::MockClock;
    use vcmon_domain::RollupType;

    use super::*;

    fn table_with(name: &str) -> CounterTable {
        let mut table = CounterTable::new();
        table.insert(
            CounterId(1),
            CounterMetadata {
                name: name.to_string(),
                unit: "percent".to_string(),
                rollup: RollupType::Average,
            },
        );
        table
    }

    /// Validates `MetricsMetadataCache` refresh and lookup behavior.
    ///
    /// Assertions:
    /// - Confirms a fresh cache starts expired.
    /// - Confirms committed tables are readable per resource type.
    /// - Confirms a type without a table yields an empty one.
    #[test]
    fn test_refresh_and_get() {
        let cache = MetricsMetadataCache::new(Duration::from_secs(600));
        assert!(cache.is_expired());

        cache
            .refresh(|tables| {
                tables.set_metadata(MorType::VirtualMachine, table_with("cpu.usage.avg"));
                Ok::<_, std::convert::Infallible>(())
            })
            .unwrap();

        assert!(!cache.is_expired());
        assert_eq!(cache.get_metadata(MorType::VirtualMachine).len(), 1);
        assert!(cache.get_metadata(MorType::Datastore).is_empty());
    }

    /// Validates `MetricsMetadataCache` expiry against the mock clock.
    ///
    /// Assertions:
    /// - Confirms the cache expires once the ttl elapses.
    #[test]
    fn test_ttl_expiry() {
        let clock = MockClock::new();
        let cache = MetricsMetadataCache::with_clock(Duration::from_secs(600), clock.clone());

        cache
            .refresh(|tables| {
                tables.set_metadata(MorType::HostSystem, table_with("mem.usage.avg"));
                Ok::<_, std::convert::Infallible>(())
            })
            .unwrap();
        assert!(!cache.is_expired());

        clock.advance_secs(600);
        assert!(cache.is_expired());
    }
}
