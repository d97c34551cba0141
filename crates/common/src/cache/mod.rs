//! Expiry-tracked cache container
//!
//! Provides [`TtlCache`], a thread-safe container whose content is only
//! ever replaced as a unit: a refresh either commits in full together with
//! a new timestamp, or leaves the previous content untouched.

mod ttl;

pub use ttl::TtlCache;
