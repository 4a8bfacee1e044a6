#![forbid(unsafe_code)]

pub mod capture;
pub mod cursor;
pub mod detection;
pub mod error;
pub mod model;
pub mod time;

pub use capture::{
    CaptureConstraints, CaptureError, CaptureState, FacingMode, HostEnvironment, StreamInfo,
    VideoFrame,
};
pub use cursor::{InstructionCursor, StepStatus};
pub use detection::{DetectionSnapshot, DetectionState, clamp_progress};
pub use error::InvalidTransition;
pub use time::Clock;
