//! Mock port implementations for collector integration tests
//!
//! Provides an in-memory inventory API with failure injection and a
//! recording metric sink, enabling deterministic end-to-end runs without
//! any remote endpoint.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use vcmon_core::collector::ports::ExternalTags;
use vcmon_core::{InventoryApi, MetricSink};
use vcmon_domain::{
    CheckError, CounterId, CounterMetadata, Mor, MorId, MorProperties, PerfSample,
    Result as DomainResult, RollupType, ServiceCheckStatus,
};

/// Build one counter definition for seeding the mock API.
pub fn counter(id: i64, name: &str, unit: &str, rollup: RollupType) -> (CounterId, CounterMetadata) {
    (CounterId(id), CounterMetadata { name: name.to_string(), unit: unit.to_string(), rollup })
}

/// Build one raw sample for seeding the mock API.
pub fn sample(counter_id: i64, instance: Option<&str>, value: f64) -> PerfSample {
    PerfSample {
        counter_id: CounterId(counter_id),
        instance: instance.map(str::to_string),
        value,
    }
}

/// In-memory mock for `InventoryApi`.
///
/// Serves a fixed topology, counter list, and per-resource sample sets.
/// Individual resources and whole refresh calls can be made to fail.
#[derive(Default)]
pub struct MockInventoryApi {
    resources: Vec<(Mor, MorProperties)>,
    counters: Vec<(CounterId, CounterMetadata)>,
    samples: HashMap<MorId, Vec<PerfSample>>,
    failing: HashSet<MorId>,
    hanging: HashSet<MorId>,
    fail_enumerate: bool,
    fail_list_counters: bool,
    unfiltered_queries: bool,
}

impl MockInventoryApi {
    /// Create an empty mock; seed it with the `with_` helpers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one resource to the served topology.
    pub fn with_resource(mut self, mor: Mor, props: MorProperties) -> Self {
        self.resources.push((mor, props));
        self
    }

    /// Add one counter definition to the served counter list.
    pub fn with_counter(mut self, entry: (CounterId, CounterMetadata)) -> Self {
        self.counters.push(entry);
        self
    }

    /// Serve the given samples for one resource.
    pub fn with_samples(mut self, mor: &Mor, samples: Vec<PerfSample>) -> Self {
        self.samples.insert(mor.id.clone(), samples);
        self
    }

    /// Make sample queries for one resource fail.
    pub fn with_failing_resource(mut self, mor: &Mor) -> Self {
        self.failing.insert(mor.id.clone());
        self
    }

    /// Make sample queries for one resource never return.
    pub fn with_hanging_resource(mut self, mor: &Mor) -> Self {
        self.hanging.insert(mor.id.clone());
        self
    }

    /// Serve seeded samples as-is, ignoring the requested counter ids.
    ///
    /// Models a server answering with counter ids the caller never asked
    /// for.
    pub fn with_unfiltered_query_results(mut self) -> Self {
        self.unfiltered_queries = true;
        self
    }

    /// Make topology enumeration fail outright.
    pub fn with_enumerate_failure(mut self) -> Self {
        self.fail_enumerate = true;
        self
    }

    /// Make counter listing fail outright.
    pub fn with_list_counters_failure(mut self) -> Self {
        self.fail_list_counters = true;
        self
    }
}

#[async_trait]
impl InventoryApi for MockInventoryApi {
    async fn enumerate_resources(&self) -> DomainResult<Vec<(Mor, MorProperties)>> {
        if self.fail_enumerate {
            return Err(CheckError::Connectivity("endpoint unreachable".to_string()));
        }
        Ok(self.resources.clone())
    }

    async fn list_counters(&self) -> DomainResult<Vec<(CounterId, CounterMetadata)>> {
        if self.fail_list_counters {
            return Err(CheckError::Connectivity("endpoint unreachable".to_string()));
        }
        Ok(self.counters.clone())
    }

    async fn query_samples(
        &self,
        mor: &Mor,
        counter_ids: &[CounterId],
        _interval_secs: Option<u64>,
    ) -> DomainResult<Vec<PerfSample>> {
        if self.hanging.contains(&mor.id) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(&mor.id) {
            return Err(CheckError::CollectionFailed {
                mor: mor.to_string(),
                reason: "query rejected by server".to_string(),
            });
        }
        let seeded = self.samples.get(&mor.id).cloned().unwrap_or_default();
        if self.unfiltered_queries {
            return Ok(seeded);
        }
        let requested: HashSet<CounterId> = counter_ids.iter().copied().collect();
        Ok(seeded.into_iter().filter(|s| requested.contains(&s.counter_id)).collect())
    }
}

/// One recorded gauge submission.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeCall {
    pub name: String,
    pub value: f64,
    pub hostname: Option<String>,
    pub tags: Vec<String>,
}

/// One recorded service check submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCheckCall {
    pub name: String,
    pub status: ServiceCheckStatus,
    pub tags: Vec<String>,
    pub message: Option<String>,
}

/// Recording mock for `MetricSink`.
///
/// Captures every submission for later assertions.
#[derive(Default)]
pub struct RecordingSink {
    gauges: Mutex<Vec<GaugeCall>>,
    service_checks: Mutex<Vec<ServiceCheckCall>>,
    external_tags: Mutex<Vec<ExternalTags>>,
}

impl RecordingSink {
    /// Create an empty recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded gauges, in submission order.
    pub fn gauges(&self) -> Vec<GaugeCall> {
        self.gauges.lock().clone()
    }

    /// Recorded gauges matching one metric name.
    pub fn gauges_named(&self, name: &str) -> Vec<GaugeCall> {
        self.gauges.lock().iter().filter(|g| g.name == name).cloned().collect()
    }

    /// All recorded service checks, in submission order.
    pub fn service_checks(&self) -> Vec<ServiceCheckCall> {
        self.service_checks.lock().clone()
    }

    /// All recorded external-tag payloads, in submission order.
    pub fn external_tags(&self) -> Vec<ExternalTags> {
        self.external_tags.lock().clone()
    }
}

impl MetricSink for RecordingSink {
    fn gauge(&self, name: &str, value: f64, hostname: Option<&str>, tags: &[String]) {
        self.gauges.lock().push(GaugeCall {
            name: name.to_string(),
            value,
            hostname: hostname.map(str::to_string),
            tags: tags.to_vec(),
        });
    }

    fn service_check(
        &self,
        name: &str,
        status: ServiceCheckStatus,
        tags: &[String],
        message: Option<&str>,
    ) {
        self.service_checks.lock().push(ServiceCheckCall {
            name: name.to_string(),
            status,
            tags: tags.to_vec(),
            message: message.map(str::to_string),
        });
    }

    fn set_external_tags(&self, tags: ExternalTags) {
        self.external_tags.lock().push(tags);
    }
}
