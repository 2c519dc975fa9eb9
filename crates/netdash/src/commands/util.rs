//! Shared helpers for command handlers.

use std::path::Path;

use netdash_core::{EntityId, MacChangeLog};

use crate::error::CliError;

/// Read and parse a JSON file.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&contents)?;
    Ok(value)
}

/// Load a recorded MAC change log, normalizing its field names.
pub fn read_mac_changes(path: &Path) -> Result<Vec<MacChangeLog>, CliError> {
    let raw = netdash_core::normalize_keys(read_json_file(path)?);
    Ok(serde_json::from_value(raw)?)
}

/// Parse an id argument. Numeric strings become numeric ids.
pub fn parse_id(raw: &str) -> Result<EntityId, CliError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::Validation {
            field: "id".into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(EntityId::from(trimmed))
}
