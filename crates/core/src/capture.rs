//! Camera capture vocabulary shared by hosts, the capture handle, and the UI.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

//
// ─── CONSTRAINTS ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    User,
    Environment,
}

impl FacingMode {
    /// Value of the `facingMode` media constraint.
    #[must_use]
    pub fn as_constraint(self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

/// Requested capture configuration. Practice always asks for 640x480, user-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub facing: FacingMode,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 640,
            ideal_height: 480,
            facing: FacingMode::User,
        }
    }
}

//
// ─── HOST ENVIRONMENT ──────────────────────────────────────────────────────────
//

/// What the host reports before any device access is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEnvironment {
    pub capture_supported: bool,
    pub secure_context: bool,
    pub hostname: String,
}

impl HostEnvironment {
    /// A secure origin, or a local host which browsers treat as trustworthy.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure_context || is_local_host(&self.hostname)
    }

    /// Checks performed before opening a device, in order.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Unsupported` when capture is missing and
    /// `CaptureError::InsecureContext` for non-secure, non-local origins.
    pub fn check(&self) -> Result<(), CaptureError> {
        if !self.capture_supported {
            return Err(CaptureError::Unsupported);
        }
        if !self.is_secure() {
            return Err(CaptureError::InsecureContext);
        }
        Ok(())
    }
}

fn is_local_host(hostname: &str) -> bool {
    matches!(
        hostname.trim().to_ascii_lowercase().as_str(),
        "localhost" | "127.0.0.1" | "::1" | "[::1]"
    )
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CaptureError {
    #[error("camera capture is not supported by this host")]
    Unsupported,

    #[error("camera access requires a secure context")]
    InsecureContext,

    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device found")]
    DeviceNotFound,

    #[error("camera device not supported")]
    DeviceNotSupported,

    #[error("camera error: {0}")]
    Unknown(String),
}

impl CaptureError {
    /// Map a host (DOM) error name to the taxonomy.
    #[must_use]
    pub fn from_dom_error(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" => CaptureError::PermissionDenied,
            "NotFoundError" | "DevicesNotFoundError" => CaptureError::DeviceNotFound,
            "NotSupportedError" => CaptureError::DeviceNotSupported,
            _ if message.contains("HTTPS") => CaptureError::InsecureContext,
            _ => CaptureError::Unknown(message.to_owned()),
        }
    }

    /// Blocking message shown to the user; each kind names the action that fixes it.
    #[must_use]
    pub fn user_message(&self) -> String {
        let detail = match self {
            CaptureError::Unsupported => {
                "This browser does not support camera capture. Try a different browser."
            }
            CaptureError::InsecureContext => {
                "Camera access requires a secure connection (HTTPS). Open the app over HTTPS or from localhost."
            }
            CaptureError::PermissionDenied => {
                "Please allow camera permissions and try again. You may need to click the camera icon in your browser's address bar."
            }
            CaptureError::DeviceNotFound => {
                "No camera found on this device. Connect a camera and try again."
            }
            CaptureError::DeviceNotSupported => {
                "Camera is not supported in this browser. Try another camera or browser."
            }
            CaptureError::Unknown(_) => "Please check your camera settings and try again.",
        };
        format!("Unable to access camera. {detail}")
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CaptureState {
    #[default]
    Idle,
    Acquiring,
    Active,
    Failed(CaptureError),
}

impl CaptureState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, CaptureState::Active)
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, CaptureState::Acquiring)
    }

    #[must_use]
    pub fn failure(&self) -> Option<&CaptureError> {
        match self {
            CaptureState::Failed(err) => Some(err),
            _ => None,
        }
    }
}

//
// ─── STREAM DATA ───────────────────────────────────────────────────────────────
//

/// Dimensions and track count of an open stream.
///
/// The overlay surface is sized from `width`/`height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub track_count: usize,
}

/// A single captured frame, available to detectors that inspect video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<[u8]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(supported: bool, secure: bool, host: &str) -> HostEnvironment {
        HostEnvironment {
            capture_supported: supported,
            secure_context: secure,
            hostname: host.into(),
        }
    }

    #[test]
    fn unsupported_is_checked_before_secure_context() {
        assert_eq!(
            env(false, false, "example.com").check(),
            Err(CaptureError::Unsupported)
        );
    }

    #[test]
    fn plain_http_remote_host_is_insecure() {
        assert_eq!(
            env(true, false, "example.com").check(),
            Err(CaptureError::InsecureContext)
        );
    }

    #[test]
    fn localhost_is_allowed_without_https() {
        assert!(env(true, false, "localhost").check().is_ok());
        assert!(env(true, false, "127.0.0.1").check().is_ok());
        assert!(env(true, true, "example.com").check().is_ok());
    }

    #[test]
    fn dom_errors_map_to_taxonomy() {
        assert_eq!(
            CaptureError::from_dom_error("NotAllowedError", ""),
            CaptureError::PermissionDenied
        );
        assert_eq!(
            CaptureError::from_dom_error("NotFoundError", ""),
            CaptureError::DeviceNotFound
        );
        assert_eq!(
            CaptureError::from_dom_error("NotSupportedError", ""),
            CaptureError::DeviceNotSupported
        );
        assert_eq!(
            CaptureError::from_dom_error("AbortError", "device busy"),
            CaptureError::Unknown("device busy".into())
        );
    }

    #[test]
    fn every_error_has_a_distinct_message() {
        let errors = [
            CaptureError::Unsupported,
            CaptureError::InsecureContext,
            CaptureError::PermissionDenied,
            CaptureError::DeviceNotFound,
            CaptureError::DeviceNotSupported,
            CaptureError::Unknown("x".into()),
        ];
        let mut messages: Vec<String> = errors.iter().map(CaptureError::user_message).collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), errors.len());
        assert!(CaptureError::PermissionDenied.user_message().contains("allow camera"));
        assert!(CaptureError::DeviceNotFound.user_message().contains("Connect a camera"));
    }

    #[test]
    fn failed_state_carries_its_error() {
        let state = CaptureState::Failed(CaptureError::PermissionDenied);
        assert!(!state.is_active());
        assert!(!state.is_busy());
        assert_eq!(state.failure(), Some(&CaptureError::PermissionDenied));
        assert!(CaptureState::Acquiring.is_busy());
    }
}
