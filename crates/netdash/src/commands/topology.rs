//! `netdash topology`: device adjacency, one row per link.

use tabled::Tabled;

use netdash_api::HttpBackend;
use netdash_core::model::NodeKind;
use netdash_core::{EntityId, Inventory, Topology, TopologyEdge};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, or_dash};

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Link")]
    id: String,
    #[tabled(rename = "From")]
    source: String,
    #[tabled(rename = "Port")]
    source_interface: String,
    #[tabled(rename = "To")]
    target: String,
    #[tabled(rename = "Port")]
    target_interface: String,
}

fn node_label(topology: &Topology, id: &EntityId) -> String {
    match topology.node(id) {
        Some(node) if node.kind == NodeKind::Neighbor => format!("{} (neighbor)", node.label),
        Some(node) => node.label.clone(),
        None => id.to_string(),
    }
}

fn row(topology: &Topology, edge: &TopologyEdge) -> LinkRow {
    LinkRow {
        id: edge.id.to_string(),
        source: node_label(topology, &edge.source),
        source_interface: or_dash(edge.source_interface.as_deref()),
        target: node_label(topology, &edge.target),
        target_interface: or_dash(edge.target_interface.as_deref()),
    }
}

pub async fn handle(inventory: &Inventory<HttpBackend>, global: &GlobalOpts) -> Result<(), CliError> {
    let topology = inventory.fetch_topology().await?;

    let out = match global.output {
        // The edge list alone loses node labels; structured formats get the whole graph.
        OutputFormat::Table | OutputFormat::Plain => output::render_list(
            &global.output,
            &topology.edges,
            |e| row(&topology, e),
            |e| format!("{} {}", e.source, e.target),
        )?,
        _ => output::render_single(&global.output, &topology, |_| String::new(), |_| String::new())?,
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
