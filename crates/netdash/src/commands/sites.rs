//! Site command handlers.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::json;
use tabled::Tabled;

use netdash_api::HttpBackend;
use netdash_core::aggregate::{devices_by_type, site_device_count};
use netdash_core::{Device, EntityKind, Inventory, RefreshMode, Resource, Site};

use crate::cli::{GlobalOpts, SitesArgs, SitesCommand};
use crate::error::CliError;
use crate::output::{self, field, or_dash};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Devices")]
    devices: usize,
}

/// Site list entry: the site plus its device count.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteEntry {
    #[serde(flatten)]
    site: Arc<Site>,
    device_count: usize,
}

impl From<&SiteEntry> for SiteRow {
    fn from(entry: &SiteEntry) -> Self {
        Self {
            id: entry.site.id.to_string(),
            name: entry.site.site_name.clone(),
            location: or_dash(entry.site.location.as_deref()),
            devices: entry.device_count,
        }
    }
}

#[derive(Tabled)]
struct GroupedDeviceRow {
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// One site with its devices grouped by type.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteView<'a> {
    site: &'a Site,
    devices_by_type: IndexMap<String, Vec<&'a Device>>,
}

fn site_detail(view: &SiteView<'_>, color: bool) -> String {
    let site = view.site;
    let mut lines = vec![
        field("ID", &site.id, color),
        field("Name", &site.site_name, color),
        field("Location", or_dash(site.location.as_deref()), color),
        field("Description", or_dash(site.description.as_deref()), color),
    ];

    let rows: Vec<GroupedDeviceRow> = view
        .devices_by_type
        .iter()
        .flat_map(|(dtype, devices)| {
            devices.iter().map(move |d| GroupedDeviceRow {
                dtype: dtype.clone(),
                id: d.id.to_string(),
                hostname: d.label().to_owned(),
                ip: d.ip_address.clone(),
                status: d.status.to_string(),
            })
        })
        .collect();

    if rows.is_empty() {
        lines.push(field("Devices", "none", color));
    } else {
        lines.push(String::new());
        lines.push(output::render_table(&rows));
    }
    lines.join("\n")
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn handle(
    inventory: &Inventory<HttpBackend>,
    args: SitesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        None => {
            let (sites, devices) = tokio::join!(
                inventory.refresh(Resource::Sites, RefreshMode::Foreground),
                inventory.refresh(Resource::Devices, RefreshMode::Foreground),
            );
            sites?;
            devices?;

            let devices = inventory.devices();
            let entries: Vec<SiteEntry> = inventory
                .sites()
                .iter()
                .map(|site| SiteEntry {
                    device_count: site_device_count(devices.iter().map(Arc::as_ref), &site.id),
                    site: Arc::clone(site),
                })
                .collect();

            let out = output::render_list(
                &global.output,
                &entries,
                |e| SiteRow::from(e),
                |e| e.site.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        Some(SitesCommand::Create {
            name,
            location,
            description,
        }) => {
            let payload = json!({
                "siteName": name,
                "location": location,
                "description": description,
            });
            let id = inventory.create(EntityKind::Site, payload).await?;
            if global.quiet {
                return Ok(());
            }
            let site = inventory.site(&id)?;
            let out = output::render_single(
                &global.output,
                &site,
                |s| format!("Site {} created ({})", s.site_name, s.id),
                |s| s.id.to_string(),
            )?;
            output::print_output(&out, false);
            Ok(())
        }

        Some(SitesCommand::Delete { id }) => {
            let id = util::parse_id(&id)?;
            inventory
                .refresh(Resource::Sites, RefreshMode::Foreground)
                .await?;
            inventory.site(&id)?;
            inventory.delete(EntityKind::Site, &id).await?;
            if !global.quiet {
                eprintln!("Site {id} deleted");
            }
            Ok(())
        }
    }
}

/// `netdash site <id>`
pub async fn show(
    inventory: &Inventory<HttpBackend>,
    id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let id = util::parse_id(id)?;
    let (sites, devices) = tokio::join!(
        inventory.refresh(Resource::Sites, RefreshMode::Foreground),
        inventory.refresh(Resource::Devices, RefreshMode::Foreground),
    );
    sites?;
    devices?;

    let site = inventory.site(&id)?;
    let devices = inventory.devices();
    let view = SiteView {
        site: &site,
        devices_by_type: devices_by_type(
            devices.iter().map(Arc::as_ref).filter(|d| d.belongs_to(&id)),
        ),
    };

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &view,
        |v| site_detail(v, color),
        |v| {
            v.devices_by_type
                .values()
                .flatten()
                .map(|d| d.id.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        },
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
