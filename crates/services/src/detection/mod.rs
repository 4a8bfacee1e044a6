//! Progress-driven gesture detection: the detector seam and the tick runner.

mod detector;
mod runner;

pub use detector::{
    DetectionStep, Detector, DetectorFactory, SimulatedDetector, SimulatedDetectorFactory,
};
pub use runner::DetectionRunner;
