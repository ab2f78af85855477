pub mod fixture;
pub mod http;
pub mod models;

use models::Envelope;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Where the dashboard reads its data from — a live server or canned routes.
#[derive(Debug, Clone)]
pub enum Backend {
    Http(http::HttpConfig),
    Fixture(fixture::FixtureStore),
}

impl Backend {
    pub fn http(base_url: String) -> Self {
        Backend::Http(http::HttpConfig::new(base_url))
    }

    pub async fn get(&self, locator: &str) -> Result<serde_json::Value, FetchError> {
        match self {
            Backend::Http(config) => http::get_json(config, locator).await,
            Backend::Fixture(store) => store.get(locator).await,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("API error: {status}")]
    Status { status: u16 },
    #[error("Parse error: {0}")]
    Malformed(String),
}

impl Serialize for FetchError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// The only component that performs I/O. Failures never reach callers:
/// collections degrade to an empty envelope, single resources to `None`.
#[derive(Debug, Clone)]
pub struct Fetcher {
    backend: Backend,
}

impl Fetcher {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub async fn try_fetch<T: DeserializeOwned>(&self, locator: &str) -> Result<T, FetchError> {
        let value = self.backend.get(locator).await?;
        serde_json::from_value(value).map_err(|e| FetchError::Malformed(e.to_string()))
    }

    /// Bulk path: a failed read yields an empty collection.
    pub async fn fetch_collection<T: DeserializeOwned>(&self, locator: &str) -> Envelope<T> {
        match self.try_fetch(locator).await {
            Ok(envelope) => envelope,
            Err(e) => {
                log::warn!("Fetch failed for {}: {}", locator, e);
                Envelope::empty()
            }
        }
    }

    /// Enrichment path: a failed read yields `None` and the caller picks the fallback.
    pub async fn fetch_optional<T: DeserializeOwned>(&self, locator: &str) -> Option<T> {
        match self.try_fetch(locator).await {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Fetch failed for {}: {}", locator, e);
                None
            }
        }
    }
}
