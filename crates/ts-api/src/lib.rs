//! REST client for the timesheet backend.
//!
//! Implements [`EntryStore`] over HTTP/JSON:
//! - `POST   {base}/entries` creates an entry
//! - `GET    {base}/entries` lists entries, filters as query parameters
//! - `PUT    {base}/entries/{id}` applies a patch
//! - `DELETE {base}/entries/{id}` removes an entry

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use ts_core::{EntryFilter, EntryId, EntryPatch, EntryStore, StoreError, TimeEntry};

/// Default request timeout for API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Where the backend listens when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// API client errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// The configured base URL is unusable.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Returns true for a 404 from the backend.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }

    /// Converts into the store error the core understands.
    ///
    /// `id` is the entry the request addressed, if any; a 404 for it
    /// becomes [`StoreError::NotFound`].
    pub fn into_store_error(self, id: Option<&EntryId>) -> StoreError {
        match id {
            Some(id) if self.is_not_found() => StoreError::NotFound(id.clone()),
            _ => StoreError::Backend(Box::new(self)),
        }
    }
}

/// Timesheet backend client.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute `http(s)` URL, or
    /// if the HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::ClientBuild)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `POST /entries`
    pub async fn create(&self, entry: &TimeEntry) -> Result<TimeEntry, ApiError> {
        let request = self.request(Method::POST, &["entries"]).json(entry);
        read_json(request).await
    }

    /// `GET /entries`
    pub async fn list(&self, filter: Option<&EntryFilter>) -> Result<Vec<TimeEntry>, ApiError> {
        let mut request = self.request(Method::GET, &["entries"]);
        if let Some(filter) = filter {
            request = request.query(&filter.query_pairs());
        }
        read_json(request).await
    }

    /// `PUT /entries/{id}`
    pub async fn update(&self, id: &EntryId, patch: &EntryPatch) -> Result<TimeEntry, ApiError> {
        let request = self
            .request(Method::PUT, &["entries", id.as_str()])
            .json(patch);
        read_json(request).await
    }

    /// `DELETE /entries/{id}`
    pub async fn delete(&self, id: &EntryId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &["entries", id.as_str()]);
        send(request).await.map(drop)
    }

    fn request(&self, method: Method, segments: &[&str]) -> reqwest::RequestBuilder {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        debug!(%method, %url, "api request");
        self.http.request(method, url)
    }
}

#[async_trait]
impl EntryStore for ApiClient {
    async fn create_entry(&self, entry: &TimeEntry) -> Result<TimeEntry, StoreError> {
        self.create(entry)
            .await
            .map_err(|err| err.into_store_error(None))
    }

    async fn list_entries(
        &self,
        filter: Option<&EntryFilter>,
    ) -> Result<Vec<TimeEntry>, StoreError> {
        self.list(filter)
            .await
            .map_err(|err| err.into_store_error(None))
    }

    async fn update_entry(
        &self,
        id: &EntryId,
        patch: &EntryPatch,
    ) -> Result<TimeEntry, StoreError> {
        self.update(id, patch)
            .await
            .map_err(|err| err.into_store_error(Some(id)))
    }

    async fn delete_entry(&self, id: &EntryId) -> Result<(), StoreError> {
        self.delete(id)
            .await
            .map_err(|err| err.into_store_error(Some(id)))
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let invalid = |reason: &str| ApiError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(&err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base"));
    }
    Ok(url)
}

/// Sends the request and returns the body of a 2xx response.
async fn send(request: reqwest::RequestBuilder) -> Result<String, ApiError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let message = match parse_api_error(&body) {
            Some(message) => message,
            None if body.trim().is_empty() => status.to_string(),
            None => body,
        };
        return Err(ApiError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(body)
}

async fn read_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, ApiError> {
    let body = send(request).await?;
    serde_json::from_str(&body).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

/// Extracts the message from a `{"error": "..."}` body.
fn parse_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| payload.error)
}
