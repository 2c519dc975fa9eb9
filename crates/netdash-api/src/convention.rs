// Backend conventions: how a given REST service spells its routes and
// field names. Each `HttpBackend` carries exactly one convention.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resource::ResourcePath;

/// Whether collection and item routes end in `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathStyle {
    TrailingSlash,
    Bare,
}

/// How the backend spells multi-word field names on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldCasing {
    Snake,
    Camel,
}

/// Path-suffix and field-casing policy of one backend service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConvention {
    pub path_style: PathStyle,
    pub field_casing: FieldCasing,
}

impl BackendConvention {
    /// snake_case fields, routes end in `/` (the FastAPI service).
    pub const SNAKE_SLASHED: Self = Self {
        path_style: PathStyle::TrailingSlash,
        field_casing: FieldCasing::Snake,
    };

    /// camelCase fields, routes without trailing `/`.
    pub const CAMEL_BARE: Self = Self {
        path_style: PathStyle::Bare,
        field_casing: FieldCasing::Camel,
    };

    /// Render a resource path according to this backend's suffix policy.
    pub fn format_path(&self, path: &ResourcePath) -> String {
        let bare = path.to_string();
        match self.path_style {
            PathStyle::TrailingSlash => format!("{bare}/"),
            PathStyle::Bare => bare,
        }
    }

    /// Re-case an outgoing request body into the backend's field spelling.
    ///
    /// Incoming bodies are never touched here; canonicalizing responses is
    /// the core's job.
    pub fn encode_body(&self, body: &Value) -> Value {
        match self.field_casing {
            FieldCasing::Camel => body.clone(),
            FieldCasing::Snake => snake_keys(body),
        }
    }
}

impl FromStr for BackendConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "snake" | "snake-slashed" | "fastapi" => Ok(Self::SNAKE_SLASHED),
            "camel" | "camel-bare" => Ok(Self::CAMEL_BARE),
            other => Err(format!("expected 'snake' or 'camel', got '{other}'")),
        }
    }
}

/// `siteName` → `site_name`. Keys already in snake_case are unchanged.
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (i, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn snake_keys(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(snake_keys).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (to_snake_case(k), snake_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}
