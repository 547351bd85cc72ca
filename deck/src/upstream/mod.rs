//! Upstream user listing
//!
//! Fetches `(limit, skip)` pages from the public user API. The proxy server
//! and the explorer both go through the `UserSource` trait, so tests can swap
//! in an in-memory source.

use std::sync::Arc;

use tracing::debug;

mod error;
mod http;
pub mod source;
mod types;

pub use error::{USER_MESSAGE, UpstreamError};
pub use http::HttpUserSource;
pub use source::UserSource;
pub use types::{Address, Company, DEFAULT_LIMIT, DEFAULT_SKIP, PageRequest, User, UserPage};

use crate::config::UpstreamConfig;

/// Build the user source once at startup
pub fn create_source(config: &UpstreamConfig) -> Result<Arc<dyn UserSource>, UpstreamError> {
    debug!(base_url = %config.base_url, "create_source: called");
    Ok(Arc::new(HttpUserSource::from_config(config)?))
}
