//! Static per-resource-type metric tables
//!
//! For each resource type this module lists the performance counters the
//! integration collects, together with whether the remote API can report
//! them once per sub-component (per core, per disk, per NIC, ...). Only
//! the realtime tier exposes per-instance data; historical resources are
//! aggregate-only by construction.
//!
//! Counter names are the dotted form including the rollup suffix, exactly
//! as the metadata refresh resolves them (e.g. `cpu.usage.avg`).

use std::collections::HashMap;

use lazy_static::lazy_static;
use vcmon_domain::MorType;

/// One collectable counter: name plus per-instance capability
#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    /// Dotted metric name with rollup suffix
    pub name: &'static str,
    /// Whether the remote API can report this metric per sub-component on
    /// this resource type
    pub per_instance: bool,
}

const fn spec(name: &'static str, per_instance: bool) -> MetricSpec {
    MetricSpec { name, per_instance }
}

static VM_METRICS: &[MetricSpec] = &[
    spec("cpu.usage.avg", true),
    spec("cpu.usagemhz.avg", true),
    spec("cpu.ready.sum", true),
    spec("cpu.costop.sum", true),
    spec("cpu.maxlimited.sum", true),
    spec("mem.usage.avg", false),
    spec("mem.active.avg", false),
    spec("mem.vmmemctl.avg", false),
    spec("mem.swapped.avg", false),
    spec("disk.read.avg", true),
    spec("disk.write.avg", true),
    spec("disk.commandsAveraged.avg", true),
    spec("net.usage.avg", true),
    spec("net.received.avg", true),
    spec("net.transmitted.avg", true),
    spec("virtualDisk.read.avg", true),
    spec("virtualDisk.write.avg", true),
    spec("virtualDisk.totalReadLatency.avg", true),
    spec("virtualDisk.totalWriteLatency.avg", true),
    spec("sys.uptime.latest", false),
];

static HOST_METRICS: &[MetricSpec] = &[
    spec("cpu.usage.avg", true),
    spec("cpu.usagemhz.avg", false),
    spec("cpu.coreUtilization.avg", true),
    spec("cpu.ready.sum", false),
    spec("mem.usage.avg", false),
    spec("mem.consumed.avg", false),
    spec("mem.vmmemctl.avg", false),
    spec("disk.read.avg", true),
    spec("disk.write.avg", true),
    spec("disk.deviceLatency.avg", true),
    spec("disk.queueLatency.avg", true),
    spec("net.usage.avg", true),
    spec("net.received.avg", true),
    spec("net.transmitted.avg", true),
    spec("datastore.numberReadAveraged.avg", true),
    spec("datastore.numberWriteAveraged.avg", true),
    spec("sys.uptime.latest", false),
];

static CLUSTER_METRICS: &[MetricSpec] = &[
    spec("cpu.usage.avg", false),
    spec("cpu.usagemhz.avg", false),
    spec("mem.usage.avg", false),
    spec("mem.consumed.avg", false),
    spec("vmop.numVMotion.latest", false),
    spec("vmop.numSVMotion.latest", false),
];

static DATASTORE_METRICS: &[MetricSpec] = &[
    spec("disk.used.latest", false),
    spec("disk.provisioned.latest", false),
    spec("disk.capacity.latest", false),
    spec("datastore.numberReadAveraged.avg", false),
    spec("datastore.numberWriteAveraged.avg", false),
];

static DATACENTER_METRICS: &[MetricSpec] = &[
    spec("vmop.numVMotion.latest", false),
    spec("vmop.numSVMotion.latest", false),
    spec("vmop.numClone.latest", false),
    spec("vmop.numCreate.latest", false),
    spec("vmop.numDestroy.latest", false),
];

lazy_static! {
    /// Availability lookup: (resource type, metric name) -> per-instance
    static ref AVAILABILITY: HashMap<(MorType, &'static str), bool> = {
        let mut map = HashMap::new();
        for mor_type in MorType::ALL {
            for spec in allowed_metrics(mor_type) {
                map.insert((mor_type, spec.name), spec.per_instance);
            }
        }
        map
    };
}

/// The counters collected for one resource type
pub fn allowed_metrics(mor_type: MorType) -> &'static [MetricSpec] {
    match mor_type {
        MorType::VirtualMachine => VM_METRICS,
        MorType::HostSystem => HOST_METRICS,
        MorType::ClusterComputeResource => CLUSTER_METRICS,
        MorType::Datastore => DATASTORE_METRICS,
        MorType::Datacenter => DATACENTER_METRICS,
    }
}

/// Whether this metric is collected at all on this resource type
pub fn is_metric_allowed(mor_type: MorType, metric_name: &str) -> bool {
    AVAILABILITY.contains_key(&(mor_type, metric_name))
}

/// Per-instance capability of one (metric, resource type) pair
///
/// Unknown metrics are not per-instance capable.
pub(crate) fn per_instance_available(mor_type: MorType, metric_name: &str) -> bool {
    AVAILABILITY.get(&(mor_type, metric_name)).copied().unwrap_or(false)
}
