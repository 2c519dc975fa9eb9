// HTTP backend adapter
//
// Wraps `reqwest::Client` with convention-aware URL construction and
// JSON body handling. One `HttpBackend` talks to exactly one service;
// the convention decides trailing slashes and outgoing field casing.

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::backend::Backend;
use crate::convention::BackendConvention;
use crate::error::Error;
use crate::resource::ResourcePath;
use crate::transport::TransportConfig;

const BODY_PREVIEW: usize = 200;

/// Raw HTTP client for one inventory backend.
///
/// All methods return the decoded JSON body. Non-success statuses become
/// [`Error::Status`]; bodies that are not JSON become [`Error::Decode`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
    convention: BackendConvention,
}

impl HttpBackend {
    /// Create a backend from a `TransportConfig`.
    ///
    /// `base_url` is the service root (e.g. `http://127.0.0.1:8000` or
    /// `https://inventory.example.net/api`).
    pub fn new(
        base_url: Url,
        convention: BackendConvention,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, convention))
    }

    /// Create a backend with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, convention: BackendConvention) -> Self {
        Self {
            http,
            base_url,
            convention,
        }
    }

    /// The service root URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The path/casing convention of this service.
    pub fn convention(&self) -> BackendConvention {
        self.convention
    }

    /// Build the full URL for a resource, applying the suffix policy.
    pub fn url_for(&self, path: &ResourcePath) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let full = format!("{base}{}", self.convention.format_path(path));
        Ok(Url::parse(&full)?)
    }

    /// `GET /health` on the service.
    pub async fn health_check(&self) -> Result<Value, Error> {
        self.fetch(&ResourcePath::Health).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn send(
        &self,
        method: Method,
        path: &ResourcePath,
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let url = self.url_for(path)?;
        debug!(%method, %url, "backend request");

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            builder = builder.json(&self.convention.encode_body(body));
        }
        let resp = builder.send().await.map_err(Error::Transport)?;

        parse_body(path, resp).await
    }
}

/// Check the status, then decode the body as JSON.
///
/// An empty success body decodes to `Value::Null` (delete confirmations
/// from the camelCase service carry no payload).
async fn parse_body(path: &ResourcePath, resp: reqwest::Response) -> Result<Value, Error> {
    let status = resp.status();
    let body = resp.text().await.map_err(Error::Transport)?;

    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            path: path.to_string(),
            body: preview(&body).to_owned(),
        });
    }

    if body.trim().is_empty() {
        trace!(%path, "empty response body");
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|e| Error::Decode {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

impl Backend for HttpBackend {
    async fn fetch(&self, path: &ResourcePath) -> Result<Value, Error> {
        self.send(Method::GET, path, None).await
    }

    async fn create(&self, path: &ResourcePath, body: &Value) -> Result<Value, Error> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn update(&self, path: &ResourcePath, body: &Value) -> Result<Value, Error> {
        self.send(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &ResourcePath) -> Result<Value, Error> {
        self.send(Method::DELETE, path, None).await
    }
}
