//! HTTP client for the school backend.
//!
//! One [`ApiClient`] is built at startup and shared through managed state.
//! Endpoint wrappers live in [`medications`] and [`students`]; every wrapper
//! takes the caller's [`AuthSession`] explicitly. There is no ambient token:
//! a missing session is caught before any request is built.

pub mod error;
pub mod medications;
pub mod students;

pub use error::{ApiError, CommandError, ErrorKind};

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config;
use crate::models::session::AuthSession;

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config::REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config() -> Self {
        Self::new(&config::api_base_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str, session: &AuthSession) -> reqwest::RequestBuilder {
        self.http.get(self.url(path)).bearer_auth(&session.token)
    }

    pub(crate) fn post(&self, path: &str, session: &AuthSession) -> reqwest::RequestBuilder {
        self.http.post(self.url(path)).bearer_auth(&session.token)
    }

    pub(crate) fn put(&self, path: &str, session: &AuthSession) -> reqwest::RequestBuilder {
        self.http.put(self.url(path)).bearer_auth(&session.token)
    }

    pub(crate) fn delete(&self, path: &str, session: &AuthSession) -> reqwest::RequestBuilder {
        self.http.delete(self.url(path)).bearer_auth(&session.token)
    }

    /// Send a built request and classify anything that is not a 2xx.
    pub(crate) async fn send_checked(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| error::classify_transport(e, &self.base_url))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error::classify_status(status.as_u16(), body))
    }

    /// Probe the backend root. Any HTTP answer counts as reachable; only
    /// transport-level failures do not.
    pub async fn probe(&self) -> bool {
        self.http
            .get(&self.base_url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }
}

/// Parse a checked response body, folding decode failures into a typed error.
pub(crate) async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::ResponseParsing(e.to_string()))
}
