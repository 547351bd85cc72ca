//! HTTP client for the public user listing
//!
//! Issues `GET {base}/users?limit=..&skip=..` and hands back the body
//! untouched, after checking it is a JSON object.

use async_trait::async_trait;
use hyper::body::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::{PageRequest, UpstreamError, UserSource};
use crate::config::UpstreamConfig;

/// reqwest-backed user source
#[derive(Debug, Clone)]
pub struct HttpUserSource {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl HttpUserSource {
    /// Create a new source from configuration
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        debug!(?config, "from_config: called");
        Self::new(&config.base_url, config.timeout())
    }

    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = Client::builder().timeout(timeout).build().map_err(UpstreamError::Network)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn users_url(&self) -> String {
        format!("{}/users", self.base_url)
    }
}

#[async_trait]
impl UserSource for HttpUserSource {
    async fn fetch_raw(&self, request: PageRequest) -> Result<Bytes, UpstreamError> {
        debug!(?request, base_url = %self.base_url, "HttpUserSource::fetch_raw: called");

        let response = self
            .http
            .get(self.users_url())
            .query(&[("limit", request.limit), ("skip", request.skip)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    debug!("HttpUserSource::fetch_raw: request timed out");
                    UpstreamError::Timeout(self.timeout)
                } else {
                    UpstreamError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Upstream returned error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                UpstreamError::Timeout(self.timeout)
            } else {
                UpstreamError::Network(e)
            }
        })?;
        // Parsed only to check the shape; the original bytes are returned
        let value: serde_json::Value = serde_json::from_slice(&body)?;
        if !value.is_object() {
            debug!("HttpUserSource::fetch_raw: body is not a JSON object");
            return Err(UpstreamError::InvalidResponse("expected a JSON object".to_string()));
        }

        debug!(bytes = body.len(), "HttpUserSource::fetch_raw: page received");
        Ok(body)
    }
}
