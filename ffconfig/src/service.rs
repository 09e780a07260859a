//! Transport to the media server's configuration endpoints.
//!
//! [`ConfigService`] is the only way the form engine reaches the network.
//! [`HttpService`] talks to a running server; [`MemoryService`] serves
//! canned documents for tests and offline use.

use std::{cell::RefCell, fs, path::Path, time::Duration};

use reqwest::header::CONTENT_TYPE;

use crate::error::TransportError;

pub const SCHEMA_PATH: &str = "/config.xml";
pub const STATS_PATH: &str = "/xml-rpc?method=stats";
pub const VALUES_PATH: &str = "/xml-rpc?method=config";
pub const UPDATE_PATH: &str = "/xml-rpc?method=updateconfig";

/// Reply body the server sends for a successful update.
pub const UPDATE_OK: &str = "<results><status>200</status></results>";

/// The four requests the form engine makes.
///
/// Each returns the raw response body; parsing belongs to the caller.
#[allow(async_fn_in_trait)]
pub trait ConfigService {
    async fn fetch_schema(&self) -> Result<String, TransportError>;
    async fn fetch_stats(&self) -> Result<String, TransportError>;
    async fn fetch_values(&self) -> Result<String, TransportError>;
    /// POST an encoded `updateconfig` body.
    async fn update_config(&self, body: &str) -> Result<String, TransportError>;
}

/// [`ConfigService`] over HTTP.
pub struct HttpService {
    base: String,
    client: reqwest::Client,
    password: Option<String>,
}

impl HttpService {
    /// Create a service for the server at `base` (e.g. `http://host:3689`).
    ///
    /// Requests have no timeout unless `timeout` is given.
    pub fn new(base: impl Into<String>, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let base = base.into().trim_end_matches('/').to_string();
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| TransportError::Request {
            url: base.clone(),
            source,
        })?;
        Ok(Self {
            base,
            client,
            password: None,
        })
    }

    /// Authenticate with the server's admin password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.password {
            Some(password) => request.basic_auth("admin", Some(password)),
            None => request,
        }
    }

    async fn get(&self, path: &str) -> Result<String, TransportError> {
        let url = self.url(path);
        debug!("GET {url}");
        let response = self
            .authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;
        Self::body(url, response).await
    }

    async fn body(url: String, response: reqwest::Response) -> Result<String, TransportError> {
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url,
                status: status.as_u16(),
            });
        }
        response
            .text()
            .await
            .map_err(|source| TransportError::Request { url, source })
    }
}

impl ConfigService for HttpService {
    async fn fetch_schema(&self) -> Result<String, TransportError> {
        self.get(SCHEMA_PATH).await
    }

    async fn fetch_stats(&self) -> Result<String, TransportError> {
        self.get(STATS_PATH).await
    }

    async fn fetch_values(&self) -> Result<String, TransportError> {
        self.get(VALUES_PATH).await
    }

    async fn update_config(&self, body: &str) -> Result<String, TransportError> {
        let url = self.url(UPDATE_PATH);
        debug!("POST {url} ({} bytes)", body.len());
        let response = self
            .authorize(self.client.post(&url))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: url.clone(),
                source,
            })?;
        Self::body(url, response).await
    }
}

/// [`ConfigService`] serving fixed documents and recording updates.
#[derive(Debug, Default)]
pub struct MemoryService {
    pub schema: Option<String>,
    pub stats: Option<String>,
    pub values: Option<String>,
    /// Reply to every update; `None` makes updates fail.
    pub update_reply: Option<String>,
    updates: RefCell<Vec<String>>,
}

impl MemoryService {
    pub fn new(
        schema: impl Into<String>,
        stats: impl Into<String>,
        values: impl Into<String>,
    ) -> Self {
        Self {
            schema: Some(schema.into()),
            stats: Some(stats.into()),
            values: Some(values.into()),
            update_reply: Some(UPDATE_OK.to_string()),
            updates: RefCell::new(Vec::new()),
        }
    }

    /// Load `config.xml`, `stats.xml` and `values.xml` from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref();
        Ok(Self::new(
            fs::read_to_string(dir.join("config.xml"))?,
            fs::read_to_string(dir.join("stats.xml"))?,
            fs::read_to_string(dir.join("values.xml"))?,
        ))
    }

    pub fn with_update_reply(mut self, reply: Option<&str>) -> Self {
        self.update_reply = reply.map(str::to_string);
        self
    }

    /// Bodies of every update received so far.
    pub fn updates(&self) -> Vec<String> {
        self.updates.borrow().clone()
    }

    fn reply(doc: &Option<String>, path: &str) -> Result<String, TransportError> {
        doc.clone()
            .ok_or_else(|| TransportError::Unavailable(path.to_string()))
    }
}

impl ConfigService for MemoryService {
    async fn fetch_schema(&self) -> Result<String, TransportError> {
        Self::reply(&self.schema, SCHEMA_PATH)
    }

    async fn fetch_stats(&self) -> Result<String, TransportError> {
        Self::reply(&self.stats, STATS_PATH)
    }

    async fn fetch_values(&self) -> Result<String, TransportError> {
        Self::reply(&self.values, VALUES_PATH)
    }

    async fn update_config(&self, body: &str) -> Result<String, TransportError> {
        self.updates.borrow_mut().push(body.to_string());
        Self::reply(&self.update_reply, UPDATE_PATH)
    }
}
