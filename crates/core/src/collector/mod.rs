//! Collection orchestration
//!
//! One [`Collector`] per monitored endpoint drives a check run: refresh
//! the two TTL caches when expired, partition resources by collection
//! tier, fan the per-resource work out to a bounded worker pool, aggregate
//! the results, and publish samples, service check, and external host
//! tags through the sink.

pub mod ports;
mod runner;
mod tags;

pub use runner::{Collector, RunSummary};
