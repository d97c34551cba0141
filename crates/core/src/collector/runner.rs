//! Collection orchestrator - drives one check run end to end

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};
use vcmon_domain::constants::{
    METRIC_PREFIX, REALTIME_INTERVAL_SECS, SERVICE_CHECK_NAME, SOURCE_TYPE,
};
use vcmon_domain::{
    CheckError, CollectionConfig, CompiledFilters, CounterId, InstanceKey, MetricSubmission, Mor,
    MorProperties, MorType, PowerState, Result, ServiceCheckStatus,
};

use super::ports::{submit_all, ExternalTags, InventoryApi, MetricSink};
use super::tags::{build_topology_index, resolve_tags};
use crate::cache::{CounterStore, CounterTable, InfrastructureCache, MetricsMetadataCache};
use crate::{metrics, resolution};

/// Outcome of one check run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Resources whose collection task succeeded
    pub resources_collected: usize,
    /// Resources whose collection task failed or timed out
    pub resources_failed: usize,
    /// Gauge points forwarded to the sink
    pub samples_submitted: usize,
}

/// One unit of fan-out work: a resource, its properties, and the sampling
/// interval of its collection tier
struct ResourceTask {
    mor: Mor,
    props: MorProperties,
    interval_secs: Option<u64>,
}

/// Context shared by collection workers to avoid too many arguments
struct TaskContext {
    api: Arc<dyn InventoryApi>,
    counters: Arc<CounterStore>,
    metadata: Arc<MetricsMetadataCache>,
    filters: Arc<CompiledFilters>,
    key: InstanceKey,
    custom_tags: Vec<String>,
    call_timeout: Duration,
}

struct FanOutOutcome {
    results: Vec<(Mor, Result<Vec<MetricSubmission>>)>,
    abandoned: usize,
}

/// Collection orchestrator for one monitored endpoint
///
/// Owns the per-connection caches and drives the per-run state machine:
/// refresh expired caches, partition resources by tier, fan out to the
/// worker pool, join under the run timeout, publish.
///
/// Caches are created here, live for the process lifetime of the check,
/// are mutated exclusively by the refresh path, and are read concurrently
/// by collection workers.
pub struct Collector {
    api: Arc<dyn InventoryApi>,
    sink: Arc<dyn MetricSink>,
    config: CollectionConfig,
    filters: Arc<CompiledFilters>,
    key: InstanceKey,
    infrastructure: Arc<InfrastructureCache>,
    metadata: Arc<MetricsMetadataCache>,
    counters: Arc<CounterStore>,
}

impl Collector {
    /// Create a collector for one monitored endpoint
    ///
    /// Compiles the user's filters and initializes the per-connection
    /// caches.
    ///
    /// # Errors
    /// Returns [`CheckError::Config`] when the configuration is invalid
    /// (missing instance key, malformed filter pattern).
    pub fn new(
        config: CollectionConfig,
        api: Arc<dyn InventoryApi>,
        sink: Arc<dyn MetricSink>,
    ) -> Result<Self> {
        let filters = Arc::new(config.compile_filters()?);
        let key = InstanceKey::new(config.instance_key.clone());

        let infrastructure =
            Arc::new(InfrastructureCache::new(Duration::from_secs(config.infrastructure_ttl_secs)));
        let metadata =
            Arc::new(MetricsMetadataCache::new(Duration::from_secs(config.metadata_ttl_secs)));
        let counters = Arc::new(CounterStore::new());
        counters.init_instance(&key);

        Ok(Self { api, sink, config, filters, key, infrastructure, metadata, counters })
    }

    /// Execute one check run
    ///
    /// # Errors
    /// Returns [`CheckError::Connectivity`] when the topology or metadata
    /// refresh fails outright - the only condition that aborts a run.
    /// Per-resource failures are aggregated into the summary instead.
    #[instrument(skip(self), fields(instance = %self.key))]
    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        let check_tags = self.check_tags();

        if self.infrastructure.is_expired() {
            debug!("infrastructure cache expired, refreshing");
            if let Err(e) = self.refresh_infrastructure().await {
                error!(error = %e, "infrastructure refresh failed");
                self.sink.service_check(
                    SERVICE_CHECK_NAME,
                    ServiceCheckStatus::Critical,
                    &check_tags,
                    Some(&e.to_string()),
                );
                return Err(e);
            }
        }

        if self.metadata.is_expired() {
            debug!("metadata cache expired, refreshing");
            if let Err(e) = self.refresh_metadata().await {
                error!(error = %e, "metadata refresh failed");
                self.sink.service_check(
                    SERVICE_CHECK_NAME,
                    ServiceCheckStatus::Critical,
                    &check_tags,
                    Some(&e.to_string()),
                );
                return Err(e);
            }
        }

        let snapshot = self.infrastructure.snapshot();
        let vm_count = snapshot.get_mors(MorType::VirtualMachine).len();
        let tasks = self.partition(&snapshot);
        debug!(resources = tasks.len(), "fanning out collection tasks");

        let outcome = self.fan_out(tasks).await;
        let summary = self.submit_results(outcome);

        self.sink.gauge(
            &format!("{METRIC_PREFIX}vm.count"),
            vm_count as f64,
            None,
            &check_tags,
        );
        self.sink.service_check(SERVICE_CHECK_NAME, ServiceCheckStatus::Ok, &check_tags, None);
        self.publish_external_tags(&snapshot);

        info!(
            collected = summary.resources_collected,
            failed = summary.resources_failed,
            samples = summary.samples_submitted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "check run complete"
        );
        Ok(summary)
    }

    /// Tags attached to the service check and run-level gauges
    fn check_tags(&self) -> Vec<String> {
        let mut tags = vec![format!("vcenter_server:{}", self.key)];
        tags.extend(self.config.custom_tags.iter().cloned());
        tags
    }

    /// Re-enumerate the topology and commit it wholesale
    ///
    /// Powered-off VMs and name-filtered resources are dropped before the
    /// commit; each kept resource gets its tag list resolved from the
    /// parent chain of the full (unfiltered) enumeration.
    async fn refresh_infrastructure(&self) -> Result<()> {
        let call_timeout = Duration::from_secs(self.config.call_timeout_secs);
        let resources = timeout(call_timeout, self.api.enumerate_resources())
            .await
            .map_err(|_| {
                CheckError::Connectivity(format!(
                    "timed out enumerating resources after {}s",
                    self.config.call_timeout_secs
                ))
            })?
            .map_err(fatalize)?;

        info!(resources = resources.len(), "refreshing infrastructure cache");
        let index = build_topology_index(&resources);
        let filters = Arc::clone(&self.filters);

        self.infrastructure.refresh(|snapshot| {
            for (mor, mut props) in resources {
                if mor.mor_type == MorType::VirtualMachine
                    && props.power_state == Some(PowerState::PoweredOff)
                {
                    debug!(resource = %mor, "skipping powered-off VM");
                    continue;
                }
                if !filters.resource_included(mor.mor_type, &props.name) {
                    debug!(resource = %mor, name = %props.name, "resource excluded by filters");
                    continue;
                }
                props.tags = resolve_tags(&mor, &props, &index);
                snapshot.insert(mor, props);
            }
            Ok::<_, CheckError>(())
        })
    }

    /// Re-fetch counter definitions and commit the per-type tables
    ///
    /// Also installs the connection-wide metadata table and the selected
    /// counter ids into the counter store - counter ids are not portable
    /// across connections, so the whole table is replaced every time.
    async fn refresh_metadata(&self) -> Result<()> {
        let call_timeout = Duration::from_secs(self.config.call_timeout_secs);
        let counters = timeout(call_timeout, self.api.list_counters())
            .await
            .map_err(|_| {
                CheckError::Connectivity(format!(
                    "timed out listing performance counters after {}s",
                    self.config.call_timeout_secs
                ))
            })?
            .map_err(fatalize)?;

        info!(counters = counters.len(), "refreshing metrics metadata cache");
        self.metadata.refresh(|tables| {
            for mor_type in MorType::ALL {
                let table: CounterTable = counters
                    .iter()
                    .filter(|(_, md)| metrics::is_metric_allowed(mor_type, &md.name))
                    .map(|(id, md)| (*id, md.clone()))
                    .collect();
                tables.set_metadata(mor_type, table);
            }
            Ok::<_, CheckError>(())
        })?;

        let mut full_table = CounterTable::new();
        let mut metric_ids: Vec<CounterId> = Vec::new();
        for (id, md) in counters {
            if MorType::ALL.iter().any(|t| metrics::is_metric_allowed(*t, &md.name)) {
                metric_ids.push(id);
                full_table.insert(id, md);
            }
        }
        self.counters.set_metadata(&self.key, full_table)?;
        self.counters.set_metric_ids(&self.key, metric_ids)?;
        Ok(())
    }

    /// Partition known resources into collection tasks by tier
    fn partition(&self, snapshot: &crate::cache::InfrastructureSnapshot) -> Vec<ResourceTask> {
        let mut tasks = Vec::new();
        for mor_type in MorType::ALL {
            if mor_type.is_historical() && !self.config.collect_historical {
                continue;
            }
            let interval_secs = mor_type.is_realtime().then_some(REALTIME_INTERVAL_SECS);
            for mor in snapshot.get_mors(mor_type) {
                if let Some(props) = snapshot.get_mor_props(mor) {
                    tasks.push(ResourceTask {
                        mor: mor.clone(),
                        props: props.clone(),
                        interval_secs,
                    });
                }
            }
        }
        tasks
    }

    /// Submit one task per resource to the bounded worker pool and join
    /// under the run-level timeout
    ///
    /// Tasks still pending at the deadline are aborted and counted as
    /// failed-but-non-fatal; whatever completed is kept.
    async fn fan_out(&self, tasks: Vec<ResourceTask>) -> FanOutOutcome {
        let context = Arc::new(TaskContext {
            api: Arc::clone(&self.api),
            counters: Arc::clone(&self.counters),
            metadata: Arc::clone(&self.metadata),
            filters: Arc::clone(&self.filters),
            key: self.key.clone(),
            custom_tags: self.config.custom_tags.clone(),
            call_timeout: Duration::from_secs(self.config.call_timeout_secs),
        });
        let semaphore = Arc::new(Semaphore::new(self.config.pool_size.max(1)));

        let mut join_set: JoinSet<(Mor, Result<Vec<MetricSubmission>>)> = JoinSet::new();
        for task in tasks {
            let context = Arc::clone(&context);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let mor = task.mor.clone();
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (
                        mor,
                        Err(CheckError::CollectionFailed {
                            mor: task.mor.to_string(),
                            reason: "worker pool closed".to_string(),
                        }),
                    );
                };
                let result = collect_resource(&context, &task).await;
                (mor, result)
            });
        }

        let mut results = Vec::new();
        let run_timeout = Duration::from_secs(self.config.run_timeout_secs);
        let joined = timeout(run_timeout, async {
            while let Some(next) = join_set.join_next().await {
                match next {
                    Ok(entry) => results.push(entry),
                    Err(e) => warn!(error = %e, "collection task aborted unexpectedly"),
                }
            }
        })
        .await;

        let mut abandoned = 0;
        if joined.is_err() {
            abandoned = join_set.len();
            warn!(abandoned, "run timeout elapsed, abandoning in-flight collection tasks");
            join_set.abort_all();
            while join_set.join_next().await.is_some() {}
        }

        FanOutOutcome { results, abandoned }
    }

    /// Forward successful samples to the sink and aggregate failures
    fn submit_results(&self, outcome: FanOutOutcome) -> RunSummary {
        let mut summary =
            RunSummary { resources_failed: outcome.abandoned, ..RunSummary::default() };
        for (mor, result) in outcome.results {
            match result {
                Ok(submissions) => {
                    summary.resources_collected += 1;
                    summary.samples_submitted += submissions.len();
                    submit_all(self.sink.as_ref(), &submissions);
                }
                Err(e) => {
                    // Deliberately debug-level: transient per-resource
                    // glitches must not page anyone.
                    debug!(resource = %mor, error = %e, "skipping resource after collection failure");
                    summary.resources_failed += 1;
                }
            }
        }
        summary
    }

    /// Derive the external host-tag payload from the committed snapshot
    fn publish_external_tags(&self, snapshot: &crate::cache::InfrastructureSnapshot) {
        let payload: ExternalTags = snapshot
            .iter()
            .filter_map(|(_, props)| {
                props.hostname.as_ref().map(|hostname| {
                    let tags: Vec<String> = props
                        .tags
                        .iter()
                        .filter(|tag| !self.host_tag_excluded(tag))
                        .cloned()
                        .collect();
                    (hostname.clone(), HashMap::from([(SOURCE_TYPE.to_string(), tags)]))
                })
            })
            .collect();

        debug!(hosts = payload.len(), "publishing external host tags");
        self.sink.set_external_tags(payload);
    }

    fn host_tag_excluded(&self, tag: &str) -> bool {
        let key = tag.split(':').next().unwrap_or(tag);
        self.config.excluded_host_tags.iter().any(|excluded| excluded == key)
    }
}

/// Escalate a refresh-path error to the fatal connectivity class
fn fatalize(e: CheckError) -> CheckError {
    match e {
        CheckError::Connectivity(_) => e,
        other => CheckError::Connectivity(other.to_string()),
    }
}

/// Collect the samples for one resource
///
/// Runs on the worker pool: copies what it needs from the caches, queries
/// the remote API under the per-call timeout, and converts raw samples
/// into tagged submissions. Failures are typed and resource-scoped; they
/// never take down sibling tasks.
async fn collect_resource(
    context: &TaskContext,
    task: &ResourceTask,
) -> Result<Vec<MetricSubmission>> {
    let mor_type = task.mor.mor_type;
    let type_table = context.metadata.get_metadata(mor_type);
    if type_table.is_empty() {
        debug!(resource = %task.mor, "no counters known for this resource type");
        return Ok(Vec::new());
    }

    // CacheNotInitialized propagates: it is a caller bug, not a runtime
    // condition.
    let metric_ids = context.counters.get_metric_ids(&context.key)?;
    let wanted: Vec<CounterId> =
        metric_ids.into_iter().filter(|id| type_table.contains_key(id)).collect();
    if wanted.is_empty() {
        debug!(resource = %task.mor, "no applicable counters for resource");
        return Ok(Vec::new());
    }

    let samples = timeout(
        context.call_timeout,
        context.api.query_samples(&task.mor, &wanted, task.interval_secs),
    )
    .await
    .map_err(|_| CheckError::CollectionFailed {
        mor: task.mor.to_string(),
        reason: format!("sample query timed out after {:?}", context.call_timeout),
    })?
    .map_err(|e| CheckError::CollectionFailed {
        mor: task.mor.to_string(),
        reason: e.to_string(),
    })?;

    let mut submissions = Vec::with_capacity(samples.len());
    for sample in samples {
        let metadata = match context.counters.get_metadata(&context.key, sample.counter_id) {
            Ok(metadata) => metadata,
            Err(CheckError::MetadataNotFound(id)) => {
                debug!(resource = %task.mor, counter_id = %id, "skipping sample with unknown counter id");
                continue;
            }
            Err(e) => return Err(e),
        };

        let mut tags = Vec::new();
        if let Some(instance) = &sample.instance {
            if !resolution::should_collect_per_instance(&context.filters, &metadata.name, mor_type)
            {
                continue;
            }
            tags.push(format!("{}:{instance}", resolution::mapped_instance_tag(&metadata.name)));
        }
        if task.props.hostname.is_none() {
            tags.extend(task.props.tags.iter().cloned());
        }
        tags.extend(context.custom_tags.iter().cloned());

        submissions.push(MetricSubmission {
            name: format!("{METRIC_PREFIX}{}", metadata.name),
            value: transform_value(&metadata.unit, sample.value),
            hostname: task.props.hostname.clone(),
            tags,
        });
    }
    Ok(submissions)
}

/// Apply the pre-reporting transformation for a counter's unit
///
/// Percent counters arrive as hundredths of a percent.
fn transform_value(unit: &str, value: f64) -> f64 {
    if unit == "percent" {
        value / 100.0
    } else {
        value
    }
}
