//! TTL cache with atomic, all-or-nothing refresh
//!
//! The container starts expired, is refreshed through a staged update
//! scope, and answers expiry questions against a monotonic [`Clock`].
//! Readers and the refresh path never observe a half-written state.

use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::debug;

use crate::time::{Clock, SystemClock};

/// Committed cache state: content plus the instant it was last refreshed.
#[derive(Debug)]
struct CacheState<T> {
    content: T,
    last_refresh: Option<Instant>,
}

/// Thread-safe, expiry-tracked container with atomic refresh
///
/// # Type Parameters
/// - `T`: Content type (must be `Default`, the staging seed for a refresh)
/// - `C`: Clock type for expiry decisions (defaults to [`SystemClock`])
///
/// # Contract
/// - A fresh cache is always expired.
/// - [`TtlCache::update`] exposes a mutable staging area seeded with
///   `T::default()` and commits it, together with a refreshed timestamp,
///   only if the scope returns `Ok`. On `Err` the previously committed
///   content and timestamp are left exactly as they were and the error
///   propagates.
/// - Empty content after a successful refresh is a valid fresh state, not
///   an error.
pub struct TtlCache<T, C = SystemClock>
where
    C: Clock,
{
    state: RwLock<CacheState<T>>,
    ttl: Duration,
    clock: C,
}

impl<T> TtlCache<T, SystemClock>
where
    T: Default,
{
    /// Create a new cache with the given time-to-live using the system clock
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<T, C> TtlCache<T, C>
where
    T: Default,
    C: Clock,
{
    /// Create a new cache with a custom clock (useful for testing)
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            state: RwLock::new(CacheState { content: T::default(), last_refresh: None }),
            ttl,
            clock,
        }
    }

    /// Whether the content must be refreshed before being trusted
    ///
    /// `true` when the cache has never been successfully refreshed, or when
    /// `ttl` has elapsed since the last successful refresh.
    pub fn is_expired(&self) -> bool {
        let state = self.state.read();
        match state.last_refresh {
            None => true,
            Some(at) => self.clock.now().saturating_duration_since(at) >= self.ttl,
        }
    }

    /// Refresh the content through a staged update scope
    ///
    /// The closure receives a mutable staging area seeded with
    /// `T::default()`; the previous content stays committed and readable
    /// until the closure returns `Ok`. The write lock is taken only for the
    /// final swap, so concurrent readers are never blocked while the new
    /// content is being built.
    ///
    /// # Errors
    /// Propagates whatever error the update scope returns; the cache is
    /// left untouched in that case.
    pub fn update<R, E>(&self, op: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let mut staged = T::default();
        let out = op(&mut staged)?;

        let mut state = self.state.write();
        state.content = staged;
        state.last_refresh = Some(self.clock.now());
        debug!("cache content committed");
        Ok(out)
    }

    /// Read the committed content
    ///
    /// Callers copy out whatever they need inside the closure; the read
    /// lock must not be held across I/O.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let state = self.state.read();
        f(&state.content)
    }
}

impl<T, C> std::fmt::Debug for TtlCache<T, C>
where
    C: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("ttl", &self.ttl)
            .field("expired", &self.state.read().last_refresh.is_none())
            .finish()
    }
}
