//! `netdash interfaces <device>`: interface summary and table.

use serde::Serialize;
use tabled::Tabled;

use netdash_api::HttpBackend;
use netdash_core::aggregate::{GroupCounts, InterfaceSummary};
use netdash_core::{Inventory, NetworkInterface, classify, short_identifier};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, field, or_dash};

use super::util;

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Speed (Mbps)")]
    speed: String,
    #[tabled(rename = "In err")]
    input_errors: u64,
    #[tabled(rename = "Out err")]
    output_errors: u64,
    #[tabled(rename = "CRC")]
    crc_errors: u64,
}

impl From<&NetworkInterface> for InterfaceRow {
    fn from(iface: &NetworkInterface) -> Self {
        let class = classify(iface.name());
        let category = if class.is_physical {
            class.category.to_string()
        } else {
            "excluded".into()
        };
        Self {
            name: iface.name().to_owned(),
            port: short_identifier(iface.name()),
            category,
            status: iface.status.to_string(),
            speed: or_dash(iface.speed_mbps().map(|m| format!("{m:.0}"))),
            input_errors: iface.input_errors_or_zero(),
            output_errors: iface.output_errors_or_zero(),
            crc_errors: iface.crc_errors_or_zero(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InterfaceReport<'a> {
    summary: InterfaceSummary,
    interfaces: &'a [NetworkInterface],
}

fn counts(group: GroupCounts) -> String {
    format!("{} ({} up, {} down)", group.total, group.up, group.down)
}

fn detail(report: &InterfaceReport<'_>, color: bool) -> String {
    let s = &report.summary;
    let mut lines = vec![
        field("Physical", counts(s.physical), color),
        field("  VLAN", counts(s.vlan), color),
        field("  Stack", counts(s.stack), color),
        field("  Regular", counts(s.regular), color),
        field("Error rate", format!("{:.1}%", s.error_rate * 100.0), color),
    ];
    if !report.interfaces.is_empty() {
        let rows: Vec<InterfaceRow> = report.interfaces.iter().map(InterfaceRow::from).collect();
        lines.push(String::new());
        lines.push(output::render_table(&rows));
    }
    lines.join("\n")
}

pub async fn handle(
    inventory: &Inventory<HttpBackend>,
    device: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let device_id = util::parse_id(device)?;
    let interfaces = inventory.interfaces(&device_id).await?;
    let summary = inventory.interface_summary(&device_id).await?;

    let report = InterfaceReport {
        summary,
        interfaces: &interfaces,
    };
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| detail(r, color),
        |r| {
            r.interfaces
                .iter()
                .map(|i| i.name().to_owned())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
