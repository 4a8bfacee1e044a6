//! In-process capture host for tests and the desktop `--simulated-camera` mode.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use gesture_core::capture::{
    CaptureConstraints, CaptureError, HostEnvironment, StreamInfo, VideoFrame,
};
use tokio::sync::watch;

use super::{CaptureHost, CaptureStream, FrameFeed, RenderSurface};

#[derive(Debug)]
struct HostConfig {
    environment: HostEnvironment,
    failure: Option<CaptureError>,
    queued_failures: VecDeque<CaptureError>,
    publish_frames: bool,
}

/// Fake camera host. Clones share configuration and counters.
#[derive(Debug, Clone)]
pub struct SimulatedCaptureHost {
    config: Arc<Mutex<HostConfig>>,
    open_attempts: Arc<AtomicUsize>,
    open_streams: Arc<AtomicUsize>,
}

impl Default for SimulatedCaptureHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCaptureHost {
    /// A capable host on `localhost`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Arc::new(Mutex::new(HostConfig {
                environment: HostEnvironment {
                    capture_supported: true,
                    secure_context: true,
                    hostname: "localhost".into(),
                },
                failure: None,
                queued_failures: VecDeque::new(),
                publish_frames: false,
            })),
            open_attempts: Arc::new(AtomicUsize::new(0)),
            open_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn unsupported(self) -> Self {
        self.configure(|config| config.environment.capture_supported = false)
    }

    /// Plain-http origin served from `hostname`.
    #[must_use]
    pub fn insecure(self, hostname: &str) -> Self {
        self.configure(|config| {
            config.environment.secure_context = false;
            config.environment.hostname = hostname.to_owned();
        })
    }

    /// Every `open` fails with `err`.
    #[must_use]
    pub fn failing(self, err: CaptureError) -> Self {
        self.configure(|config| config.failure = Some(err))
    }

    /// The next `open` fails with `err`; later calls succeed.
    #[must_use]
    pub fn failing_once(self, err: CaptureError) -> Self {
        self.configure(|config| config.queued_failures.push_back(err))
    }

    /// Streams publish a blank frame on their frame feed.
    #[must_use]
    pub fn with_frames(self) -> Self {
        self.configure(|config| config.publish_frames = true)
    }

    #[must_use]
    pub fn open_attempts(&self) -> usize {
        self.open_attempts.load(Ordering::SeqCst)
    }

    /// Streams opened and not yet stopped.
    #[must_use]
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }

    fn configure(self, apply: impl FnOnce(&mut HostConfig)) -> Self {
        apply(&mut self.config.lock().unwrap_or_else(PoisonError::into_inner));
        self
    }
}

#[async_trait(?Send)]
impl CaptureHost for SimulatedCaptureHost {
    async fn environment(&self) -> HostEnvironment {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .environment
            .clone()
    }

    async fn open(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn CaptureStream>, CaptureError> {
        self.open_attempts.fetch_add(1, Ordering::SeqCst);
        let publish_frames = {
            let mut config = self.config.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(err) = config.queued_failures.pop_front() {
                return Err(err);
            }
            if let Some(err) = config.failure.clone() {
                return Err(err);
            }
            config.publish_frames
        };

        let info = StreamInfo {
            width: constraints.ideal_width,
            height: constraints.ideal_height,
            track_count: 1,
        };
        let frame_len = if publish_frames {
            frame_len(info.width, info.height)
        } else {
            None
        };
        let frames = frame_len.map(|len| {
            watch::channel(Some(VideoFrame {
                width: info.width,
                height: info.height,
                pixels: vec![0_u8; len].into(),
            }))
        });
        self.open_streams.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimulatedStream {
            info,
            live: true,
            open_streams: Arc::clone(&self.open_streams),
            frames,
        }))
    }
}

/// Byte length of a blank single-channel frame, `None` if it does not fit.
fn frame_len(width: u32, height: u32) -> Option<usize> {
    usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)
}

struct SimulatedStream {
    info: StreamInfo,
    live: bool,
    open_streams: Arc<AtomicUsize>,
    frames: Option<(watch::Sender<Option<VideoFrame>>, FrameFeed)>,
}

impl CaptureStream for SimulatedStream {
    fn info(&self) -> StreamInfo {
        self.info
    }

    fn stop_tracks(&mut self) {
        if self.live {
            self.live = false;
            self.open_streams.fetch_sub(1, Ordering::SeqCst);
            if let Some((tx, _)) = &self.frames {
                tx.send_replace(None);
            }
        }
    }

    fn frames(&self) -> Option<FrameFeed> {
        self.frames.as_ref().map(|(_, rx)| rx.clone())
    }
}

//
// ─── SURFACE ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
enum Readiness {
    Immediate,
    After(Duration),
    Never,
    Fail(CaptureError),
}

/// Fake render surface with configurable ready behaviour.
#[derive(Debug)]
pub struct SimulatedSurface {
    readiness: Readiness,
    probe: SimulatedSurfaceProbe,
}

/// Observes a `SimulatedSurface` after it has been boxed into a handle.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSurfaceProbe {
    bound: Arc<AtomicBool>,
    binds: Arc<AtomicUsize>,
}

impl SimulatedSurfaceProbe {
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn bind_count(&self) -> usize {
        self.binds.load(Ordering::SeqCst)
    }
}

impl Default for SimulatedSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSurface {
    #[must_use]
    pub fn new() -> Self {
        Self {
            readiness: Readiness::Immediate,
            probe: SimulatedSurfaceProbe::default(),
        }
    }

    #[must_use]
    pub fn ready_after(mut self, delay: Duration) -> Self {
        self.readiness = Readiness::After(delay);
        self
    }

    /// Never fires the ready signal, as some hosts do.
    #[must_use]
    pub fn never_ready(mut self) -> Self {
        self.readiness = Readiness::Never;
        self
    }

    #[must_use]
    pub fn failing(mut self, err: CaptureError) -> Self {
        self.readiness = Readiness::Fail(err);
        self
    }

    #[must_use]
    pub fn probe(&self) -> SimulatedSurfaceProbe {
        self.probe.clone()
    }
}

#[async_trait(?Send)]
impl RenderSurface for SimulatedSurface {
    fn bind(&mut self, _stream: &dyn CaptureStream) {
        self.probe.bound.store(true, Ordering::SeqCst);
        self.probe.binds.fetch_add(1, Ordering::SeqCst);
    }

    async fn wait_ready(&mut self) -> Result<(), CaptureError> {
        match self.readiness.clone() {
            Readiness::Immediate => Ok(()),
            Readiness::After(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Readiness::Never => std::future::pending().await,
            Readiness::Fail(err) => Err(err),
        }
    }

    fn unbind(&mut self) {
        self.probe.bound.store(false, Ordering::SeqCst);
    }
}
