//! Device command handlers.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use netdash_api::HttpBackend;
use netdash_core::{
    CoreError, Device, DeviceFilter, DeviceStats, EntityId, EntityKind, Inventory, RefreshMode,
    Resource,
};

use crate::cli::{DeviceListArgs, DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, field, health_label, or_dash};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Site")]
    site: String,
}

impl From<&Arc<Device>> for DeviceRow {
    fn from(d: &Arc<Device>) -> Self {
        Self {
            id: d.id.to_string(),
            hostname: d.label().to_owned(),
            ip: d.ip_address.clone(),
            dtype: or_dash(d.device_type.as_deref()),
            status: d.status.to_string(),
            site: or_dash(d.site_id.as_ref()),
        }
    }
}

/// A device with its latest usage sample, when the backend has one.
#[derive(Serialize)]
struct DeviceView<'a> {
    #[serde(flatten)]
    device: &'a Device,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<DeviceStats>,
}

fn detail(view: &DeviceView<'_>, color: bool) -> String {
    let d = view.device;
    let mut lines = vec![
        field("ID", &d.id, color),
        field("Hostname", d.label(), color),
        field("IP", &d.ip_address, color),
        field("Status", health_label(&d.status, color), color),
        field("Type", or_dash(d.device_type.as_deref()), color),
        field("Site", or_dash(d.site_id.as_ref()), color),
        field("Vendor", or_dash(d.vendor.as_deref()), color),
        field("Model", or_dash(d.model.as_deref()), color),
        field("OS", or_dash(d.os_version.as_deref()), color),
    ];
    if let Some(ref version) = d.snmp_version {
        let community = if d.has_snmp_community() { "set" } else { "none" };
        lines.push(field("SNMP", format!("{version} (community {community})"), color));
    }
    if d.ssh_enabled {
        lines.push(field("SSH port", d.ssh_port.unwrap_or(22), color));
    }
    if let Some(created) = d.created_at {
        lines.push(field("Created", created.format("%Y-%m-%d %H:%M UTC"), color));
    }
    if let Some(stats) = view.stats.as_ref().filter(|s| !s.is_empty()) {
        lines.push(field("CPU", or_dash(stats.cpu_percent.map(|v| format!("{v}%"))), color));
        lines.push(field("Memory", or_dash(stats.memory_percent.map(|v| format!("{v}%"))), color));
        lines.push(field("Uptime", or_dash(stats.uptime_label().as_deref()), color));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    inventory: &Inventory<HttpBackend>,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        None => list(inventory, &args.list, global).await,

        Some(DevicesCommand::Get { id }) => {
            let id = util::parse_id(&id)?;
            inventory
                .refresh(Resource::Devices, RefreshMode::Foreground)
                .await?;
            let device = inventory.device(&id)?;
            let view = DeviceView {
                device: &device,
                stats: latest_stats(inventory, &id).await,
            };
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &view,
                |v| detail(v, color),
                |v| v.device.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        Some(DevicesCommand::Delete { id }) => {
            let id = util::parse_id(&id)?;
            inventory
                .refresh(Resource::Devices, RefreshMode::Foreground)
                .await?;
            // Unknown ids fail here rather than as a backend 404.
            inventory.device(&id)?;
            inventory.delete(EntityKind::Device, &id).await?;
            if !global.quiet {
                eprintln!("Device {id} deleted");
            }
            Ok(())
        }
    }
}

/// Stats are supplementary: a backend without the endpoint, or with a
/// broken one, still gets its device shown.
async fn latest_stats(inventory: &Inventory<HttpBackend>, id: &EntityId) -> Option<DeviceStats> {
    match inventory.device_stats(id).await {
        Ok(stats) => stats,
        Err(CoreError::NotFound { .. }) => None,
        Err(e) => {
            warn!(device = %id, error = %e, "device stats unavailable");
            None
        }
    }
}

async fn list(
    inventory: &Inventory<HttpBackend>,
    args: &DeviceListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(ref path) = args.mac_changes {
        inventory.record_mac_changes(util::read_mac_changes(path)?);
    }
    inventory
        .refresh(Resource::Devices, RefreshMode::Foreground)
        .await?;

    let mac_changes = inventory.store().mac_changes();
    let mut filter = DeviceFilter::new(args.filter).with_mac_changes(mac_changes.iter());
    if let Some(ref text) = args.search {
        filter = filter.search(text.as_str());
    }

    let devices = inventory.devices();
    let shown: Vec<Arc<Device>> = filter.apply(devices.iter()).into_iter().cloned().collect();
    let out = output::render_list(
        &global.output,
        &shown,
        |d| DeviceRow::from(d),
        |d| d.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
