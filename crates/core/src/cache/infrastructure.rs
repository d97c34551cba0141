//! Infrastructure topology cache, TTL-gated

use std::collections::HashMap;
use std::time::Duration;

use vcmon_common::{Clock, SystemClock, TtlCache};
use vcmon_domain::{Mor, MorProperties, MorType};

/// One snapshot of the object topology: resolved properties per MOR plus a
/// reverse index from resource type to the MORs of that type
///
/// The reverse index makes per-type iteration O(type-filtered) instead of a
/// scan over the whole inventory; both maps are kept in sync by the single
/// insert path.
#[derive(Debug, Clone, Default)]
pub struct InfrastructureSnapshot {
    props: HashMap<Mor, MorProperties>,
    by_type: HashMap<MorType, Vec<Mor>>,
}

impl InfrastructureSnapshot {
    /// Record one resource and its resolved properties
    pub fn insert(&mut self, mor: Mor, props: MorProperties) {
        if self.props.insert(mor.clone(), props).is_none() {
            self.by_type.entry(mor.mor_type).or_default().push(mor);
        }
    }

    /// Known MORs of one resource type
    pub fn get_mors(&self, mor_type: MorType) -> &[Mor] {
        self.by_type.get(&mor_type).map_or(&[], Vec::as_slice)
    }

    /// Resolved properties of one MOR
    pub fn get_mor_props(&self, mor: &Mor) -> Option<&MorProperties> {
        self.props.get(mor)
    }

    /// Iterate over every resource in the snapshot
    pub fn iter(&self) -> impl Iterator<Item = (&Mor, &MorProperties)> {
        self.props.iter()
    }

    /// Number of resources in the snapshot
    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Whether the snapshot holds no resources
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

/// TTL-gated cache of the object-topology snapshot
///
/// The snapshot is replaced wholesale on each successful refresh; a failed
/// refresh leaves the previous topology readable. Zero discovered MORs is
/// a valid fresh state, not an error.
pub struct InfrastructureCache<C = SystemClock>
where
    C: Clock,
{
    cache: TtlCache<InfrastructureSnapshot, C>,
}

impl InfrastructureCache<SystemClock> {
    /// Create a cache with the given time-to-live
    pub fn new(ttl: Duration) -> Self {
        Self { cache: TtlCache::new(ttl) }
    }
}

impl<C> InfrastructureCache<C>
where
    C: Clock,
{
    /// Create a cache with a custom clock (useful for testing)
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self { cache: TtlCache::with_clock(ttl, clock) }
    }

    /// Whether the topology must be refreshed before being trusted
    pub fn is_expired(&self) -> bool {
        self.cache.is_expired()
    }

    /// Refresh the snapshot through a staged update scope
    ///
    /// # Errors
    /// Propagates the scope's error; the previous snapshot stays committed
    /// in that case.
    pub fn refresh<R, E>(
        &self,
        op: impl FnOnce(&mut InfrastructureSnapshot) -> Result<R, E>,
    ) -> Result<R, E> {
        self.cache.update(op)
    }

    /// Copy out the known MORs of one resource type
    pub fn get_mors(&self, mor_type: MorType) -> Vec<Mor> {
        self.cache.read(|snapshot| snapshot.get_mors(mor_type).to_vec())
    }

    /// Copy out the resolved properties of one MOR
    pub fn get_mor_props(&self, mor: &Mor) -> Option<MorProperties> {
        self.cache.read(|snapshot| snapshot.get_mor_props(mor).cloned())
    }

    /// Copy out the whole committed snapshot
    ///
    /// Collection workers and external-tag publication take one copy and
    /// read it without holding any cache lock across I/O.
    pub fn snapshot(&self) -> InfrastructureSnapshot {
        self.cache.read(Clone::clone)
    }
}
