//! Shared error types for the services crate.

use thiserror::Error;

use gesture_core::model::GestureId;
use gesture_core::{CaptureError, InvalidTransition};
use storage::repository::StorageError;

/// Errors emitted by `PracticeSession` and `PracticeService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PracticeError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("gesture not found: {0}")]
    GestureNotFound(GestureId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PracticeError {
    /// The capture failure to show the user, if this is one.
    #[must_use]
    pub fn capture(&self) -> Option<&CaptureError> {
        match self {
            PracticeError::Capture(err) => Some(err),
            _ => None,
        }
    }
}
