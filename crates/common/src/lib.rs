//! # vcmon Common
//!
//! Generic, domain-free utilities shared across the workspace.
//!
//! This crate contains:
//! - Clock abstraction for monotonic, testable time (`time`)
//! - Expiry-tracked cache container with atomic refresh (`cache`)
//!
//! ## Architecture Principles
//! - No dependencies on other vcmon crates
//! - No knowledge of the monitored system or its vocabulary
//! - Deterministic under test via `MockClock`

pub mod cache;
pub mod time;

pub use cache::TtlCache;
pub use time::{Clock, MockClock, SystemClock};
