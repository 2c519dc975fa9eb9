// ── Site domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use super::{Entity, EntityKind};
use crate::error::CoreError;

const MIN_NAME_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: EntityId,
    pub site_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "super::timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Entity for Site {
    const KIND: EntityKind = EntityKind::Site;

    fn entity_id(&self) -> &EntityId {
        &self.id
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.site_name.trim().chars().count() < MIN_NAME_LEN {
            return Err(CoreError::Validation {
                field: "siteName".into(),
                reason: format!("must be at least {MIN_NAME_LEN} characters"),
            });
        }
        Ok(())
    }
}
