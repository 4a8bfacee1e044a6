#![forbid(unsafe_code)]

pub mod capture;
pub mod completion;
pub mod detection;
pub mod error;
pub mod practice;
pub mod practice_service;

pub use gesture_core::Clock;

pub use capture::{
    CaptureHost, CaptureStream, FrameFeed, MediaCaptureHandle, RenderSurface,
    SimulatedCaptureHost, SimulatedSurface,
};
pub use completion::{CompletionReceiver, CompletionRecorder, CompletionSender, completion_channel};
pub use detection::{
    DetectionRunner, DetectionStep, Detector, DetectorFactory, SimulatedDetector,
    SimulatedDetectorFactory,
};
pub use error::PracticeError;
pub use practice::{PracticeSession, PracticeSnapshot};
pub use practice_service::PracticeService;
