//! Resource tag resolution from the inventory tree
//!
//! Every resource carries its own type tag plus one tag per named ancestor
//! (host, cluster, datacenter), so a VM ends up taggable by the host it
//! runs on and the cluster that host belongs to.

use std::collections::{HashMap, HashSet};

use vcmon_domain::{Mor, MorId, MorProperties, MorType};

/// Minimal view of one inventory node used for parent-chain walks
#[derive(Debug, Clone)]
pub(crate) struct TopologyNode {
    mor_type: MorType,
    name: String,
    parent: Option<MorId>,
}

/// Build the id -> node index over one enumeration result
pub(crate) fn build_topology_index(
    resources: &[(Mor, MorProperties)],
) -> HashMap<MorId, TopologyNode> {
    resources
        .iter()
        .map(|(mor, props)| {
            (
                mor.id.clone(),
                TopologyNode {
                    mor_type: mor.mor_type,
                    name: props.name.clone(),
                    parent: props.parent.clone(),
                },
            )
        })
        .collect()
}

fn parent_tag_key(mor_type: MorType) -> Option<&'static str> {
    match mor_type {
        MorType::HostSystem => Some("vsphere_host"),
        MorType::ClusterComputeResource => Some("vsphere_cluster"),
        MorType::Datacenter => Some("vsphere_datacenter"),
        MorType::Datastore => Some("vsphere_datastore"),
        MorType::VirtualMachine => None,
    }
}

/// Resolve the tag list for one resource
///
/// Ancestor tags come first, root-most ancestor leading; the resource's
/// own `vsphere_type` tag closes the list. The walk is guarded against
/// parent cycles and dangling parent ids (a parent can be missing when the
/// enumeration raced a topology change).
pub(crate) fn resolve_tags(
    mor: &Mor,
    props: &MorProperties,
    index: &HashMap<MorId, TopologyNode>,
) -> Vec<String> {
    let mut chain = Vec::new();
    let mut seen: HashSet<MorId> = HashSet::new();
    let mut cursor = props.parent.clone();

    while let Some(parent_id) = cursor {
        if !seen.insert(parent_id.clone()) {
            break;
        }
        let Some(node) = index.get(&parent_id) else { break };
        if let Some(key) = parent_tag_key(node.mor_type) {
            chain.push(format!("{key}:{}", node.name));
        }
        cursor = node.parent.clone();
    }
    chain.reverse();

    let mut tags = chain;
    if mor.mor_type == MorType::Datastore {
        tags.push(format!("vsphere_datastore:{}", props.name));
    }
    tags.push(format!("vsphere_type:{}", mor.mor_type.tag_value()));
    tags
}
