//! `netdash summary`: dashboard counters.

use netdash_api::HttpBackend;
use netdash_core::{DeviceAggregates, Health, Inventory, RefreshMode};

use crate::cli::{GlobalOpts, SummaryArgs};
use crate::error::CliError;
use crate::output::{self, field, paint};

use super::util;

fn detail(agg: &DeviceAggregates, color: bool) -> String {
    let h = &agg.health;
    let a = &agg.alerts;
    let mut lines = vec![
        field("Devices", h.total, color),
        field(
            &format!("  {}", Health::Online),
            format!("{} ({}%)", paint(h.online, &Health::Online, color), h.online_percent),
            color,
        ),
        field(
            &format!("  {}", Health::Offline),
            paint(h.offline, &Health::Offline, color),
            color,
        ),
        field(
            &format!("  {}", Health::Warning),
            paint(h.warning, &Health::Warning, color),
            color,
        ),
    ];
    if h.other > 0 {
        lines.push(field("  other", h.other, color));
    }
    lines.push(field("MAC changes", agg.mac_changes, color));
    lines.push(field(
        "Alerts",
        format!(
            "{} active ({} critical, {} warning), {} other",
            a.active, a.critical, a.warning, a.other
        ),
        color,
    ));
    lines.join("\n")
}

pub async fn handle(
    inventory: &Inventory<HttpBackend>,
    args: SummaryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(ref path) = args.mac_changes {
        inventory.record_mac_changes(util::read_mac_changes(path)?);
    }
    inventory.refresh_all(RefreshMode::Foreground).await?;

    let aggregates = inventory.device_aggregates();
    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &aggregates,
        |agg| detail(agg, color),
        |agg| format!("{}/{}", agg.health.online, agg.health.total),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
