// ── Transport adapter contract ──
//
// The core never builds URLs or inspects field casing. It talks to a
// `Backend`, which hands back decoded JSON bodies for a resource path.

use std::future::Future;

use serde_json::Value;

use crate::error::Error;
use crate::resource::ResourcePath;

/// One inventory backend, as seen by `netdash-core`.
///
/// Implementations own the path-suffix and field-casing policy of their
/// service. Responses are returned decoded but otherwise untouched; the
/// core canonicalizes field names and status vocabularies itself.
pub trait Backend: Send + Sync + 'static {
    /// `GET` a resource.
    fn fetch(&self, path: &ResourcePath) -> impl Future<Output = Result<Value, Error>> + Send;

    /// `POST` a new entity to a collection resource.
    fn create(
        &self,
        path: &ResourcePath,
        body: &Value,
    ) -> impl Future<Output = Result<Value, Error>> + Send;

    /// `PUT` a replacement for a single entity.
    fn update(
        &self,
        path: &ResourcePath,
        body: &Value,
    ) -> impl Future<Output = Result<Value, Error>> + Send;

    /// `DELETE` a single entity. Returns the confirmation body (`Null` when empty).
    fn delete(&self, path: &ResourcePath) -> impl Future<Output = Result<Value, Error>> + Send;
}
