//! `netdash alerts`: all alerts, or those of one device.

use std::sync::Arc;

use tabled::Tabled;

use netdash_api::HttpBackend;
use netdash_core::{Alert, Inventory, RefreshMode, Resource};

use crate::cli::{AlertsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Message")]
    message: String,
    #[tabled(rename = "Raised")]
    raised: String,
    #[tabled(rename = "Resolved")]
    resolved: String,
}

impl From<&Arc<Alert>> for AlertRow {
    fn from(a: &Arc<Alert>) -> Self {
        Self {
            id: a.id.to_string(),
            severity: a.severity.as_str().to_owned(),
            device: or_dash(a.device_id.as_ref()),
            message: a.message.clone(),
            raised: or_dash(a.created_at.map(|t| t.format("%Y-%m-%d %H:%M"))),
            resolved: or_dash(a.resolved_at.map(|t| t.format("%Y-%m-%d %H:%M"))),
        }
    }
}

pub async fn handle(
    inventory: &Inventory<HttpBackend>,
    args: AlertsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut alerts: Vec<Arc<Alert>> = match args.device {
        Some(ref device) => {
            let device_id = util::parse_id(device)?;
            inventory
                .device_alerts(&device_id)
                .await?
                .into_iter()
                .map(Arc::new)
                .collect()
        }
        None => {
            inventory
                .refresh(Resource::Alerts, RefreshMode::Foreground)
                .await?;
            inventory.alerts().iter().cloned().collect()
        }
    };
    if args.active {
        alerts.retain(|a| !a.is_resolved());
    }

    let out = output::render_list(
        &global.output,
        &alerts,
        |a| AlertRow::from(a),
        |a| a.id.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
