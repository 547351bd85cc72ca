//! Sorter error types

use thiserror::Error;

use super::Location;

/// Errors raised by board transitions
///
/// These indicate a stale or duplicate UI event, never a real fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SorterError {
    #[error("Invalid transition: item '{id}' is not in {expected:?}")]
    InvalidTransition { id: String, expected: Location },

    #[error("Return deadline for item '{id}' is out of range")]
    DeadlineOutOfRange { id: String },
}
