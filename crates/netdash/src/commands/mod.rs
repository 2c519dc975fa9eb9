//! Command dispatch.

pub mod alerts;
pub mod config_cmd;
pub mod devices;
pub mod interfaces;
pub mod sites;
pub mod summary;
pub mod topology;
pub mod util;

use netdash_api::HttpBackend;
use netdash_core::Inventory;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn dispatch(
    cmd: Command,
    inventory: &Inventory<HttpBackend>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(inventory, args, global).await,
        Command::Sites(args) => sites::handle(inventory, args, global).await,
        Command::Site { id } => sites::show(inventory, &id, global).await,
        Command::Summary(args) => summary::handle(inventory, args, global).await,
        Command::Interfaces { device } => interfaces::handle(inventory, &device, global).await,
        Command::Topology => topology::handle(inventory, global).await,
        Command::Alerts(args) => alerts::handle(inventory, args, global).await,
        Command::Health => {
            let body = inventory.health_check().await?;
            let out = output::render_single(
                &global.output,
                &body,
                |b| serde_json::to_string_pretty(b).unwrap_or_default(),
                |b| b.get("status").and_then(|s| s.as_str()).unwrap_or("ok").to_owned(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        Command::Config(_) => Err(CliError::Internal(
            "config commands run without a backend".into(),
        )),
    }
}
