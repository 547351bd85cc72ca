//! UserSource trait definition

use async_trait::async_trait;
use hyper::body::Bytes;
use tracing::debug;

use super::{PageRequest, UpstreamError, UserPage};

/// Anything that can serve a page of the user listing
///
/// The proxy handler relays the raw body byte for byte; the explorer decodes
/// it into typed records.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Fetch one page and return the body exactly as received
    ///
    /// Implementations only hand back bodies that are a JSON object.
    async fn fetch_raw(&self, request: PageRequest) -> Result<Bytes, UpstreamError>;

    /// Fetch one page and decode it
    async fn fetch_page(&self, request: PageRequest) -> Result<UserPage, UpstreamError> {
        debug!(?request, "UserSource::fetch_page: called");
        let raw = self.fetch_raw(request).await?;
        Ok(serde_json::from_slice(&raw)?)
    }
}
