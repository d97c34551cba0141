//! Port interfaces for the orchestrator's external collaborators
//!
//! The remote inventory/performance API and the metric sink are reached
//! exclusively through these traits; the engine never implements a wire
//! protocol or a submission pipeline itself.

use std::collections::HashMap;

use async_trait::async_trait;
use vcmon_domain::{
    CounterId, CounterMetadata, MetricSubmission, Mor, MorProperties, PerfSample, Result,
    ServiceCheckStatus,
};

/// External host-tag payload: `(hostname, {source: tags})` pairs
pub type ExternalTags = Vec<(String, HashMap<String, Vec<String>>)>;

/// Trait for the remote inventory/performance API
///
/// All three operations are black-box, potentially-failing remote calls;
/// the orchestrator wraps each in its own timeout.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// Enumerate every managed object with its resolved properties
    async fn enumerate_resources(&self) -> Result<Vec<(Mor, MorProperties)>>;

    /// List the performance counters available on this connection
    ///
    /// Counter ids are connection-scoped and must not be reused across
    /// reconnects.
    async fn list_counters(&self) -> Result<Vec<(CounterId, CounterMetadata)>>;

    /// Fetch the latest samples for one resource and a set of counters
    ///
    /// `interval_secs` selects the realtime sampling interval; `None`
    /// queries the historical rollups.
    async fn query_samples(
        &self,
        mor: &Mor,
        counter_ids: &[CounterId],
        interval_secs: Option<u64>,
    ) -> Result<Vec<PerfSample>>;
}

/// Trait for the metric-submission sink
///
/// Submission is in-memory aggregation on the embedding agent's side, so
/// these calls are synchronous and cheap.
pub trait MetricSink: Send + Sync {
    /// Submit one gauge point
    fn gauge(&self, name: &str, value: f64, hostname: Option<&str>, tags: &[String]);

    /// Submit one service check status
    fn service_check(
        &self,
        name: &str,
        status: ServiceCheckStatus,
        tags: &[String],
        message: Option<&str>,
    );

    /// Publish the external host-tag payload
    fn set_external_tags(&self, tags: ExternalTags);
}

/// Convenience: submit a batch of prepared gauges
pub(crate) fn submit_all(sink: &dyn MetricSink, submissions: &[MetricSubmission]) {
    for sub in submissions {
        sink.gauge(&sub.name, sub.value, sub.hostname.as_deref(), &sub.tags);
    }
}
