//! Camera acquisition seams and the handle that owns the active stream.
//!
//! Hosts are single-threaded (a webview, a test double), so these traits use
//! `?Send` futures.

mod handle;
mod simulated;

use async_trait::async_trait;
use gesture_core::capture::{
    CaptureConstraints, CaptureError, HostEnvironment, StreamInfo, VideoFrame,
};
use tokio::sync::watch;

pub use handle::MediaCaptureHandle;
pub use simulated::{SimulatedCaptureHost, SimulatedSurface, SimulatedSurfaceProbe};

/// Latest frame published by a stream, if the host can expose frames.
pub type FrameFeed = watch::Receiver<Option<VideoFrame>>;

/// Platform capability to open capture devices.
#[async_trait(?Send)]
pub trait CaptureHost {
    /// Capability and origin probe, run before any device access.
    async fn environment(&self) -> HostEnvironment;

    /// Request a device matching `constraints`.
    ///
    /// # Errors
    ///
    /// Returns the mapped `CaptureError` when the device is denied or missing.
    async fn open(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn CaptureStream>, CaptureError>;
}

/// An open camera stream. Dropping it without `stop_tracks` leaks the device.
pub trait CaptureStream {
    fn info(&self) -> StreamInfo;

    /// Stop every track. Must tolerate being called more than once.
    fn stop_tracks(&mut self);

    fn frames(&self) -> Option<FrameFeed> {
        None
    }
}

/// Visible element the stream renders into, plus its annotation overlay.
#[async_trait(?Send)]
pub trait RenderSurface {
    fn bind(&mut self, stream: &dyn CaptureStream);

    /// Resolves once the bound stream can render.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError` if the surface reports a playback error.
    async fn wait_ready(&mut self) -> Result<(), CaptureError>;

    fn unbind(&mut self);
}
