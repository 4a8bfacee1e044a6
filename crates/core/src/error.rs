use thiserror::Error;

/// An operation the current practice state does not allow.
///
/// The UI disables the matching controls; these still get rejected here.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidTransition {
    #[error("camera is not active")]
    CameraNotActive,
    #[error("camera is already starting or active")]
    CameraBusy,
    #[error("detection is already running")]
    DetectionRunning,
    #[error("practice already completed")]
    AlreadyCompleted,
}
