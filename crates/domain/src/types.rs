//! Common data types used throughout the application

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of a managed object on the remote server
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MorId(pub String);

impl MorId {
    /// Create an id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw id
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resource type of a managed object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MorType {
    /// Virtual machine
    VirtualMachine,
    /// Hypervisor host
    HostSystem,
    /// Compute cluster
    ClusterComputeResource,
    /// Datastore
    Datastore,
    /// Datacenter
    Datacenter,
}

impl MorType {
    /// All resource types, in discovery order
    pub const ALL: [Self; 5] = [
        Self::VirtualMachine,
        Self::HostSystem,
        Self::ClusterComputeResource,
        Self::Datastore,
        Self::Datacenter,
    ];

    /// Whether this type is collected at the realtime tier
    ///
    /// Realtime resources expose short-retention, per-instance-capable
    /// samples; everything else only has aggregated historical rollups.
    pub fn is_realtime(self) -> bool {
        matches!(self, Self::VirtualMachine | Self::HostSystem)
    }

    /// Whether this type is collected at the historical tier
    pub fn is_historical(self) -> bool {
        !self.is_realtime()
    }

    /// Short name used in tag values (e.g. `vsphere_type:vm`)
    pub fn tag_value(self) -> &'static str {
        match self {
            Self::VirtualMachine => "vm",
            Self::HostSystem => "host",
            Self::ClusterComputeResource => "cluster",
            Self::Datastore => "datastore",
            Self::Datacenter => "datacenter",
        }
    }
}

impl fmt::Display for MorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag_value())
    }
}

/// Reference to one managed object: opaque id plus resource type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mor {
    /// Opaque object id
    pub id: MorId,
    /// Resource type
    pub mor_type: MorType,
}

impl Mor {
    /// Create a reference from an id and a type
    pub fn new(id: impl Into<String>, mor_type: MorType) -> Self {
        Self { id: MorId::new(id), mor_type }
    }
}

impl fmt::Display for Mor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mor_type, self.id)
    }
}

/// Power state of a virtual machine or host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    /// Powered on
    PoweredOn,
    /// Powered off
    PoweredOff,
    /// Suspended
    Suspended,
}

/// Resolved properties of a managed object
///
/// Owned by the infrastructure cache and replaced wholesale on each
/// successful refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorProperties {
    /// Object name as reported by the server
    pub name: String,
    /// Hostname to submit metrics under; `None` for resources that are not
    /// hosts (datastores, datacenters, clusters)
    pub hostname: Option<String>,
    /// Parent object in the inventory tree, if any
    pub parent: Option<MorId>,
    /// Runtime power state, when the resource has one
    pub power_state: Option<PowerState>,
    /// Resolved tags for this resource
    pub tags: Vec<String>,
}

/// Opaque, connection-scoped performance counter id
///
/// NOT stable across reconnects: the same logical counter can come back
/// under a different id after the connection is re-established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CounterId(pub i64);

impl fmt::Display for CounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Rollup/aggregation kind of a performance counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollupType {
    /// Average over the interval
    Average,
    /// Maximum over the interval
    Maximum,
    /// Minimum over the interval
    Minimum,
    /// Sum over the interval
    Summation,
    /// Latest observed value
    Latest,
}

/// Metadata resolved for one performance counter id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterMetadata {
    /// Dotted metric name including the rollup suffix (e.g. `cpu.usage.avg`)
    pub name: String,
    /// Unit reported by the server (e.g. `percent`, `kiloBytes`)
    pub unit: String,
    /// Rollup kind
    pub rollup: RollupType,
}

/// Identifies one monitored endpoint (one vCenter connection) within a
/// single check process
///
/// All per-connection state is scoped by this key so one process can
/// monitor multiple endpoints without cross-contamination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceKey(pub String);

impl InstanceKey {
    /// Create a key from anything string-like
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the raw key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One raw performance sample fetched from the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerfSample {
    /// Counter the sample belongs to
    pub counter_id: CounterId,
    /// Sub-component the sample was reported for (disk, NIC, core, ...);
    /// `None` for the resource-wide aggregate
    pub instance: Option<String>,
    /// Sample value
    pub value: f64,
}

/// One fully tagged gauge ready for the metric sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSubmission {
    /// Full metric name, prefix included
    pub name: String,
    /// Gauge value, unit transformation already applied
    pub value: f64,
    /// Hostname to attach the point to, when the resource has one
    pub hostname: Option<String>,
    /// Tags to submit with the point
    pub tags: Vec<String>,
}

/// Status reported through the service check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCheckStatus {
    /// Connectivity is healthy
    Ok,
    /// Topology or metadata could not be refreshed at all
    Critical,
}

#[cfg(test)]
mod tests {
    //! Unit tests for domain types.
    use super::*;

    /// Validates `MorType` tier helpers for every resource type.
    ///
    /// Assertions:
    /// - Confirms VMs and hosts are realtime.
    /// - Confirms clusters, datastores and datacenters are historical.
    /// - Ensures the two tiers are mutually exclusive.
    #[test]
    fn test_mor_type_tiers() {
        for mor_type in MorType::ALL {
            assert_ne!(mor_type.is_realtime(), mor_type.is_historical());
        }
        assert!(MorType::VirtualMachine.is_realtime());
        assert!(MorType::HostSystem.is_realtime());
        assert!(MorType::ClusterComputeResource.is_historical());
        assert!(MorType::Datastore.is_historical());
        assert!(MorType::Datacenter.is_historical());
    }

    /// Validates `Mor` display formatting for log readability.
    ///
    /// Assertions:
    /// - Confirms the rendered form is `type:id`.
    #[test]
    fn test_mor_display() {
        let mor = Mor::new("vm-42", MorType::VirtualMachine);
        assert_eq!(mor.to_string(), "vm:vm-42");
    }
}
