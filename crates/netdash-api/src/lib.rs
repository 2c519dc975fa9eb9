// netdash-api: HTTP transport adapters for the inventory backends.
//
// Two independently-evolved services sit behind the dashboard: one with
// snake_case fields and trailing-slash routes, one with camelCase fields
// and bare routes. Each is reached through an `HttpBackend` carrying its
// `BackendConvention`; the core only sees the `Backend` trait.

pub mod backend;
pub mod client;
pub mod convention;
pub mod error;
pub mod resource;
pub mod transport;

pub use backend::Backend;
pub use client::HttpBackend;
pub use convention::{BackendConvention, FieldCasing, PathStyle};
pub use error::Error;
pub use resource::ResourcePath;
pub use transport::{TlsMode, TransportConfig};
