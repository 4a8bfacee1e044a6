use std::fmt;
use std::time::Duration;

use gesture_core::capture::{CaptureConstraints, CaptureError, CaptureState, StreamInfo};
use gesture_core::model::PracticeSettings;
use tracing::{debug, info, warn};

use super::{CaptureHost, CaptureStream, FrameFeed, RenderSurface};

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Owns at most one camera stream and its binding to a render surface.
///
/// The stream is released on `release()` and on drop, whatever state the
/// handle is in.
pub struct MediaCaptureHandle {
    host: Box<dyn CaptureHost>,
    surface: Box<dyn RenderSurface>,
    constraints: CaptureConstraints,
    ready_timeout: Duration,
    state: CaptureState,
    stream: Option<Box<dyn CaptureStream>>,
}

impl MediaCaptureHandle {
    #[must_use]
    pub fn new(
        host: Box<dyn CaptureHost>,
        surface: Box<dyn RenderSurface>,
        settings: &PracticeSettings,
    ) -> Self {
        Self {
            host,
            surface,
            constraints: *settings.constraints(),
            ready_timeout: settings.ready_timeout(),
            state: CaptureState::Idle,
            stream: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Info about the owned stream, if any.
    #[must_use]
    pub fn stream_info(&self) -> Option<StreamInfo> {
        self.stream.as_ref().map(|stream| stream.info())
    }

    #[must_use]
    pub fn frames(&self) -> Option<FrameFeed> {
        self.stream.as_ref().and_then(|stream| stream.frames())
    }

    /// Open the camera and bind it to the render surface.
    ///
    /// Always leaves the handle `Active` or `Failed`. If the surface never
    /// reports ready within the timeout, the handle becomes `Active` anyway
    /// while it still owns the stream.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Unsupported` / `InsecureContext` before touching
    /// the device, or the host/surface error otherwise.
    pub async fn acquire(&mut self) -> Result<StreamInfo, CaptureError> {
        if let (CaptureState::Active, Some(info)) = (&self.state, self.stream_info()) {
            return Ok(info);
        }
        // A cancelled acquire can leave a bound stream behind.
        self.release();
        self.state = CaptureState::Acquiring;
        debug!(constraints = ?self.constraints, "acquiring camera");

        let environment = self.host.environment().await;
        if let Err(err) = environment.check() {
            return Err(self.fail(err));
        }

        let opened = self.host.open(&self.constraints).await;
        let stream = match opened {
            Ok(stream) => stream,
            Err(err) => return Err(self.fail(err)),
        };
        self.surface.bind(stream.as_ref());
        let info = stream.info();
        self.stream = Some(stream);

        let ready = tokio::time::timeout(self.ready_timeout, self.surface.wait_ready()).await;
        match ready {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                self.release();
                return Err(self.fail(err));
            }
            // The stream is still owned here; only the ready signal is missing.
            Err(_) => {
                warn!(
                    timeout_ms = self.ready_timeout.as_millis(),
                    "camera ready signal timed out; treating stream as active"
                );
            }
        }

        self.state = CaptureState::Active;
        info!(
            width = info.width,
            height = info.height,
            tracks = info.track_count,
            "camera active"
        );
        Ok(info)
    }

    /// Stop all tracks, unbind the surface, and return to `Idle`. Idempotent.
    pub fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
            self.surface.unbind();
            debug!("camera released");
        }
        self.state = CaptureState::Idle;
    }

    fn fail(&mut self, err: CaptureError) -> CaptureError {
        debug!(error = %err, "camera acquisition failed");
        self.state = CaptureState::Failed(err.clone());
        err
    }
}

impl Drop for MediaCaptureHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for MediaCaptureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaCaptureHandle")
            .field("state", &self.state)
            .field("constraints", &self.constraints)
            .field("ready_timeout", &self.ready_timeout)
            .field("has_stream", &self.stream.is_some())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{SimulatedCaptureHost, SimulatedSurface};

    fn handle(host: &SimulatedCaptureHost, surface: SimulatedSurface) -> MediaCaptureHandle {
        MediaCaptureHandle::new(
            Box::new(host.clone()),
            Box::new(surface),
            &PracticeSettings::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_binds_and_activates() {
        let host = SimulatedCaptureHost::new();
        let surface = SimulatedSurface::new();
        let probe = surface.probe();
        let mut handle = handle(&host, surface);

        let info = handle.acquire().await.unwrap();

        assert_eq!((info.width, info.height), (640, 480));
        assert!(handle.is_active());
        assert!(probe.is_bound());
        assert_eq!(host.open_streams(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unsupported_host_fails_before_opening() {
        let host = SimulatedCaptureHost::new().unsupported();
        let mut handle = handle(&host, SimulatedSurface::new());

        let err = handle.acquire().await.unwrap_err();

        assert_eq!(err, CaptureError::Unsupported);
        assert_eq!(handle.state(), &CaptureState::Failed(CaptureError::Unsupported));
        assert_eq!(host.open_attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn insecure_origin_fails_before_opening() {
        let host = SimulatedCaptureHost::new().insecure("example.com");
        let mut handle = handle(&host, SimulatedSurface::new());

        assert_eq!(handle.acquire().await.unwrap_err(), CaptureError::InsecureContext);
        assert_eq!(host.open_attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_ready_signal_times_out_to_active() {
        let host = SimulatedCaptureHost::new();
        let mut handle = handle(&host, SimulatedSurface::new().never_ready());

        let started = tokio::time::Instant::now();
        handle.acquire().await.unwrap();

        assert!(handle.is_active());
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn surface_error_releases_stream() {
        let host = SimulatedCaptureHost::new();
        let surface = SimulatedSurface::new().failing(CaptureError::Unknown("decode".into()));
        let probe = surface.probe();
        let mut handle = handle(&host, surface);

        let err = handle.acquire().await.unwrap_err();

        assert_eq!(err, CaptureError::Unknown("decode".into()));
        assert!(handle.state().failure().is_some());
        assert_eq!(host.open_streams(), 0);
        assert!(!probe.is_bound());
    }

    #[tokio::test(start_paused = true)]
    async fn release_is_idempotent() {
        let host = SimulatedCaptureHost::new();
        let mut handle = handle(&host, SimulatedSurface::new());

        handle.release();
        assert_eq!(handle.state(), &CaptureState::Idle);

        handle.acquire().await.unwrap();
        handle.release();
        handle.release();
        assert_eq!(handle.state(), &CaptureState::Idle);
        assert_eq!(host.open_streams(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_releases_active_stream() {
        let host = SimulatedCaptureHost::new();
        let mut handle = handle(&host, SimulatedSurface::new());
        handle.acquire().await.unwrap();
        assert_eq!(host.open_streams(), 1);

        drop(handle);
        assert_eq!(host.open_streams(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_acquire_can_be_retried() {
        let host = SimulatedCaptureHost::new().failing_once(CaptureError::PermissionDenied);
        let surface = SimulatedSurface::new();
        let probe = surface.probe();
        let mut handle = handle(&host, surface);

        assert_eq!(handle.acquire().await.unwrap_err(), CaptureError::PermissionDenied);
        assert_eq!(probe.bind_count(), 0);
        handle.acquire().await.unwrap();
        assert!(handle.is_active());
        assert_eq!(probe.bind_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn active_acquire_returns_current_stream() {
        let host = SimulatedCaptureHost::new();
        let surface = SimulatedSurface::new().ready_after(Duration::from_millis(300));
        let probe = surface.probe();
        let mut handle = handle(&host, surface);

        let first = handle.acquire().await.unwrap();
        let second = handle.acquire().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(host.open_attempts(), 1);
        assert_eq!(probe.bind_count(), 1);
    }
}
