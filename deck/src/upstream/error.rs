//! Upstream error types

use std::time::Duration;
use thiserror::Error;

/// Message shown to users when a page cannot be loaded
pub const USER_MESSAGE: &str = "Failed to fetch data. Please try again later.";

/// Errors that can occur while fetching a page from the upstream listing
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Upstream returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl UpstreamError {
    /// Check if a manual retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Status { status, .. } => *status >= 500 || *status == 429 || *status == 408,
            UpstreamError::Network(_) => true,
            UpstreamError::Timeout(_) => true,
            UpstreamError::InvalidResponse(_) => false,
            UpstreamError::Json(_) => false,
        }
    }

    /// Text for the explorer error banner
    pub fn user_message(&self) -> &'static str {
        USER_MESSAGE
    }
}
