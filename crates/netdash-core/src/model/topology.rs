// ── Topology graph ──
//
// Links come from the backend as flat records. The graph view needs
// device nodes, pseudo-nodes for neighbors the inventory does not know,
// and edges between them.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::device::Device;
use super::entity_id::EntityId;
use super::health::Health;

/// One discovered adjacency (LLDP/CDP style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyLink {
    pub id: EntityId,
    pub src_device_id: EntityId,
    #[serde(default)]
    pub src_interface: Option<String>,
    #[serde(default)]
    pub dst_device_id: Option<EntityId>,
    #[serde(default)]
    pub dst_interface: Option<String>,
    #[serde(default)]
    pub dst_hostname: Option<String>,
    #[serde(default, deserialize_with = "super::timestamp::deserialize")]
    pub last_seen: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NodeKind {
    Device,
    Neighbor,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyNode {
    pub id: EntityId,
    pub label: String,
    pub kind: NodeKind,
    pub status: Option<Health>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyEdge {
    pub id: EntityId,
    pub source: EntityId,
    pub target: EntityId,
    pub source_interface: Option<String>,
    pub target_interface: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Topology {
    pub nodes: Vec<TopologyNode>,
    pub edges: Vec<TopologyEdge>,
}

impl Topology {
    /// Assemble the graph.
    ///
    /// Every device becomes a node. A link with no known destination gets a
    /// neighbor pseudo-node whose id is the negated link id (or
    /// `neighbor:{id}` for text ids). Edges whose source device is unknown
    /// are dropped.
    pub fn build<'a>(
        devices: impl IntoIterator<Item = &'a Device>,
        links: impl IntoIterator<Item = &'a TopologyLink>,
    ) -> Self {
        let mut nodes: Vec<TopologyNode> = devices
            .into_iter()
            .map(|d| TopologyNode {
                id: d.id.clone(),
                label: d.hostname.clone(),
                kind: NodeKind::Device,
                status: Some(d.status.clone()),
                ip_address: Some(d.ip_address.clone()),
            })
            .collect();
        let mut known: HashSet<EntityId> = nodes.iter().map(|n| n.id.clone()).collect();
        let mut edges = Vec::new();

        for link in links {
            let target = if let Some(dst) = &link.dst_device_id {
                dst.clone()
            } else {
                let pseudo = neighbor_id(&link.id);
                if known.insert(pseudo.clone()) {
                    nodes.push(TopologyNode {
                        id: pseudo.clone(),
                        label: link
                            .dst_hostname
                            .clone()
                            .unwrap_or_else(|| format!("unknown-{}", link.id)),
                        kind: NodeKind::Neighbor,
                        status: None,
                        ip_address: None,
                    });
                }
                pseudo
            };

            if known.contains(&link.src_device_id) {
                edges.push(TopologyEdge {
                    id: link.id.clone(),
                    source: link.src_device_id.clone(),
                    target,
                    source_interface: link.src_interface.clone(),
                    target_interface: link.dst_interface.clone(),
                });
            }
        }

        Self { nodes, edges }
    }

    pub fn node(&self, id: &EntityId) -> Option<&TopologyNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }
}

fn neighbor_id(link_id: &EntityId) -> EntityId {
    match link_id {
        EntityId::Numeric(n) => EntityId::Numeric(-n),
        EntityId::Text(s) => EntityId::Text(format!("neighbor:{s}")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn device(id: i64, hostname: &str) -> Device {
        serde_json::from_value(json!({
            "id": id, "hostname": hostname, "ipAddress": format!("10.0.0.{id}"), "status": "up"
        }))
        .unwrap()
    }

    fn link(value: serde_json::Value) -> TopologyLink {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn unknown_neighbors_become_pseudo_nodes() {
        let devices = [device(1, "core"), device(2, "access")];
        let links = [
            link(json!({ "id": 10, "srcDeviceId": 1, "dstDeviceId": 2, "srcInterface": "Gi1/0/1" })),
            link(json!({ "id": 11, "srcDeviceId": 1, "dstHostname": "ap-lobby" })),
            link(json!({ "id": 12, "srcDeviceId": 2 })),
        ];

        let graph = Topology::build(&devices, &links);

        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(graph.node(&EntityId::Numeric(-11)).unwrap().label, "ap-lobby");
        assert_eq!(graph.node(&EntityId::Numeric(-12)).unwrap().label, "unknown-12");
        assert_eq!(graph.edges.len(), 3);
        assert_eq!(graph.edges[1].target, EntityId::Numeric(-11));
    }

    #[test]
    fn edges_from_unknown_sources_are_dropped() {
        let devices = [device(1, "core")];
        let links = [link(json!({ "id": 5, "srcDeviceId": 99, "dstDeviceId": 1 }))];

        let graph = Topology::build(&devices, &links);

        assert!(graph.edges.is_empty());
        assert_eq!(graph.nodes.len(), 1);
    }
}
