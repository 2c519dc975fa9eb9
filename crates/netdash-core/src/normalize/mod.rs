// ── Normalization ──
//
// Two total, pure transforms applied to every decoded body before it
// reaches the store: field names to camelCase, status words to `Health`.

pub mod keys;
pub mod status;

pub use keys::{normalize_key, normalize_keys};
pub use status::normalize_status;
