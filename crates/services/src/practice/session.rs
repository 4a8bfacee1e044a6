use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gesture_core::model::{Gesture, PracticeCompletion, PracticeSettings};
use gesture_core::{Clock, DetectionSnapshot, InstructionCursor, InvalidTransition, StreamInfo};
use tokio::sync::watch;
use tracing::{debug, info};

use super::PracticeSnapshot;
use crate::capture::MediaCaptureHandle;
use crate::completion::CompletionSender;
use crate::detection::{DetectionRunner, DetectorFactory, SimulatedDetectorFactory};
use crate::error::PracticeError;

/// Sticky completion flag. `epoch` moves on every `reset_practice`, so a run
/// that finishes after a reset cannot mark the new attempt completed.
#[derive(Debug, Default)]
struct Outcome {
    epoch: u64,
    completed: bool,
    reported: bool,
}

#[derive(Debug, Clone, Default)]
struct SharedOutcome(Arc<Mutex<Outcome>>);

impl SharedOutcome {
    fn lock(&self) -> MutexGuard<'_, Outcome> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    fn is_completed(&self) -> bool {
        self.lock().completed
    }

    /// Returns false when `epoch` is stale or the attempt was already reported.
    fn complete(&self, epoch: u64) -> bool {
        let mut outcome = self.lock();
        if outcome.epoch != epoch || outcome.reported {
            return false;
        }
        outcome.completed = true;
        outcome.reported = true;
        true
    }

    /// Record completion without reporting it; the run's callback still does.
    fn latch(&self) {
        self.lock().completed = true;
    }

    fn clear(&self) {
        let mut outcome = self.lock();
        outcome.epoch += 1;
        outcome.completed = false;
        outcome.reported = false;
    }
}

/// One practice screen: a gesture, its camera, step cursor, and detection run.
///
/// `completed` survives step changes; only `reset_practice` clears it.
/// Dropping the session tears it down: the tick task stops and the camera is
/// released.
pub struct PracticeSession {
    gesture: Gesture,
    camera: MediaCaptureHandle,
    cursor: InstructionCursor,
    detection: DetectionRunner,
    hints_visible: bool,
    outcome: SharedOutcome,
    detectors: Arc<dyn DetectorFactory>,
    completions: Option<CompletionSender>,
    clock: Clock,
}

impl PracticeSession {
    #[must_use]
    pub fn new(gesture: Gesture, camera: MediaCaptureHandle, settings: &PracticeSettings) -> Self {
        Self {
            cursor: InstructionCursor::new(gesture.step_count()),
            detection: DetectionRunner::new(settings.tick_interval()),
            detectors: Arc::new(SimulatedDetectorFactory::new(settings)),
            hints_visible: false,
            outcome: SharedOutcome::default(),
            completions: None,
            clock: Clock::default(),
            gesture,
            camera,
        }
    }

    #[must_use]
    pub fn with_detector(mut self, detectors: Arc<dyn DetectorFactory>) -> Self {
        self.detectors = detectors;
        self
    }

    #[must_use]
    pub fn with_completions(mut self, completions: CompletionSender) -> Self {
        self.completions = Some(completions);
        self
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    //
    // ─── CAMERA ────────────────────────────────────────────────────────────────
    //

    /// Turn the camera on.
    ///
    /// # Errors
    ///
    /// `InvalidTransition::CameraBusy` while active, otherwise the capture
    /// failure (the camera is left `Failed` and may be retried).
    ///
    /// An in-flight start holds `&mut self`, so an `Acquiring` camera seen here
    /// belongs to a cancelled start and is acquired afresh.
    pub async fn start_camera(&mut self) -> Result<StreamInfo, PracticeError> {
        if self.camera.is_active() {
            debug!(state = ?self.camera.state(), "start_camera rejected");
            return Err(InvalidTransition::CameraBusy.into());
        }
        Ok(self.camera.acquire().await?)
    }

    /// Turn the camera off. Detection and the current step are unaffected.
    pub fn stop_camera(&mut self) {
        self.camera.release();
    }

    //
    // ─── DETECTION ─────────────────────────────────────────────────────────────
    //

    /// Start a detection run on the live camera.
    ///
    /// # Errors
    ///
    /// `CameraNotActive` without a live camera, `AlreadyCompleted` until
    /// `reset_practice`, or the runner's rejection while running.
    pub fn start_detection(&mut self) -> Result<(), PracticeError> {
        if !self.camera.is_active() {
            debug!("start_detection rejected: camera not active");
            return Err(InvalidTransition::CameraNotActive.into());
        }
        if self.completed() {
            debug!("start_detection rejected: already completed");
            return Err(InvalidTransition::AlreadyCompleted.into());
        }
        let completions = self.completions.clone();
        let gesture = self.gesture.clone();
        let clock = self.clock;
        let outcome = self.outcome.clone();
        let epoch = outcome.epoch();
        let run = self.detection.start(
            self.detectors.create(),
            self.camera.frames(),
            move || {
                if !outcome.complete(epoch) {
                    debug!("completion from a reset attempt dropped");
                    return;
                }
                let completion = PracticeCompletion::for_gesture(&gesture, clock.now());
                info!(
                    gesture = %completion.gesture_id,
                    points = completion.points_awarded,
                    "practice completed"
                );
                if let Some(completions) = completions {
                    // A closed channel means nobody records completions.
                    let _ = completions.send(completion);
                }
            },
        )?;
        debug!(run, gesture = %self.gesture.id(), "detection run started");
        Ok(())
    }

    /// Clear detection and completion, and return to the first step.
    pub fn reset_practice(&mut self) {
        self.detection.reset();
        self.outcome.clear();
        self.cursor.reset();
    }

    /// True once a run reached 100, until `reset_practice`.
    #[must_use]
    pub fn completed(&self) -> bool {
        // A finished run counts before its completion callback lands.
        self.outcome.is_completed() || self.detection.snapshot().is_completed()
    }

    #[must_use]
    pub fn detection_updates(&self) -> watch::Receiver<DetectionSnapshot> {
        self.detection.subscribe()
    }

    //
    // ─── STEPS & HINTS ─────────────────────────────────────────────────────────
    //

    /// Move to the next step. Changing step abandons detection progress but
    /// keeps `completed`.
    pub fn next_step(&mut self) -> bool {
        let moved = self.cursor.next();
        if moved {
            self.abandon_detection();
        }
        moved
    }

    /// Move to the previous step. Changing step abandons detection progress but
    /// keeps `completed`.
    pub fn previous_step(&mut self) -> bool {
        let moved = self.cursor.previous();
        if moved {
            self.abandon_detection();
        }
        moved
    }

    fn abandon_detection(&mut self) {
        // A finished run may not have reported yet; keep it counted.
        if self.detection.snapshot().is_completed() {
            self.outcome.latch();
        }
        self.detection.reset();
    }

    /// Returns the new visibility.
    pub fn toggle_hints(&mut self) -> bool {
        self.hints_visible = !self.hints_visible;
        self.hints_visible
    }

    #[must_use]
    pub fn snapshot(&self) -> PracticeSnapshot {
        let detection = self.detection.snapshot();
        PracticeSnapshot {
            gesture_id: self.gesture.id().clone(),
            cursor: self.cursor,
            instruction: self
                .gesture
                .instruction(self.cursor.index())
                .unwrap_or_default()
                .to_owned(),
            camera: self.camera.state().clone(),
            detection,
            hints_visible: self.hints_visible,
            completed: self.outcome.is_completed() || detection.is_completed(),
        }
    }

    /// Stop detection, then release the camera. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.detection.reset();
        self.camera.release();
    }
}

impl Drop for PracticeSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for PracticeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PracticeSession")
            .field("gesture", self.gesture.id())
            .field("camera", &self.camera)
            .field("cursor", &self.cursor)
            .field("detection", &self.detection)
            .field("hints_visible", &self.hints_visible)
            .field("completed", &self.completed())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use gesture_core::CaptureState;
    use gesture_core::time::fixed_clock;
    use storage::starter_catalog;

    use std::time::Duration;

    use super::*;
    use crate::capture::{SimulatedCaptureHost, SimulatedSurface};
    use crate::completion::completion_channel;
    use crate::detection::{DetectionStep, Detector};

    struct Fixed(f64);

    impl Detector for Fixed {
        fn advance(&mut self, _frame: Option<&gesture_core::VideoFrame>) -> DetectionStep {
            DetectionStep::Advance(self.0)
        }
    }

    fn session(host: &SimulatedCaptureHost) -> PracticeSession {
        session_with(host, SimulatedSurface::new(), 10.0)
    }

    fn session_with(
        host: &SimulatedCaptureHost,
        surface: SimulatedSurface,
        gain: f64,
    ) -> PracticeSession {
        let settings = PracticeSettings::default();
        let gesture = starter_catalog().remove(0);
        let camera = MediaCaptureHandle::new(Box::new(host.clone()), Box::new(surface), &settings);
        let detectors: Arc<dyn DetectorFactory> =
            Arc::new(move || Box::new(Fixed(gain)) as Box<dyn Detector>);
        PracticeSession::new(gesture, camera, &settings)
            .with_detector(detectors)
            .with_clock(fixed_clock())
    }

    #[tokio::test(start_paused = true)]
    async fn detection_requires_active_camera() {
        let host = SimulatedCaptureHost::new();
        let mut session = session(&host);

        let err = session.start_detection().unwrap_err();
        assert!(matches!(
            err,
            PracticeError::InvalidTransition(InvalidTransition::CameraNotActive)
        ));
        assert!(!session.snapshot().detection.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_camera_is_rejected_while_active() {
        let host = SimulatedCaptureHost::new();
        let mut session = session(&host);
        session.start_camera().await.unwrap();

        let err = session.start_camera().await.unwrap_err();
        assert!(matches!(
            err,
            PracticeError::InvalidTransition(InvalidTransition::CameraBusy)
        ));
        assert_eq!(host.open_attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn changing_step_resets_detection() {
        let host = SimulatedCaptureHost::new();
        let mut session = session(&host);
        session.start_camera().await.unwrap();
        session.start_detection().unwrap();
        let mut updates = session.detection_updates();
        updates.wait_for(|s| s.progress >= 20.0).await.unwrap();

        assert!(session.next_step());
        let snapshot = session.snapshot();
        assert_eq!(snapshot.step_index(), 1);
        assert_eq!(snapshot.detection.progress, 0.0);
        assert!(!snapshot.detection.is_running());
        assert!(snapshot.camera.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn stepping_past_the_ends_keeps_detection() {
        let host = SimulatedCaptureHost::new();
        let mut session = session(&host);
        session.start_camera().await.unwrap();
        session.start_detection().unwrap();

        assert!(!session.previous_step());
        assert!(session.snapshot().detection.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_camera_leaves_detection_and_step() {
        let host = SimulatedCaptureHost::new();
        let mut session = session(&host);
        session.start_camera().await.unwrap();
        session.next_step();
        session.start_detection().unwrap();

        session.stop_camera();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.camera, CaptureState::Idle);
        assert_eq!(snapshot.step_index(), 1);
        assert!(snapshot.detection.is_running());
        assert_eq!(host.open_streams(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn completion_survives_step_change_until_reset() {
        let host = SimulatedCaptureHost::new();
        let (tx, mut rx) = completion_channel();
        let mut session = session_with(&host, SimulatedSurface::new(), 60.0).with_completions(tx);
        session.start_camera().await.unwrap();
        session.start_detection().unwrap();
        let mut updates = session.detection_updates();
        updates.wait_for(DetectionSnapshot::is_completed).await.unwrap();

        assert!(session.next_step());
        assert!(session.completed());
        assert!(session.snapshot().completed);
        assert!(!session.snapshot().can_start_detection());
        assert!(matches!(
            session.start_detection(),
            Err(PracticeError::InvalidTransition(InvalidTransition::AlreadyCompleted))
        ));
        assert!(session.previous_step());
        assert!(session.completed());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());

        session.reset_practice();
        assert!(!session.completed());
        session.start_detection().unwrap();
        updates.wait_for(DetectionSnapshot::is_completed).await.unwrap();
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_camera_start_can_be_retried() {
        let host = SimulatedCaptureHost::new();
        let mut session = session_with(&host, SimulatedSurface::new().never_ready(), 10.0);

        let cancelled =
            tokio::time::timeout(Duration::from_millis(100), session.start_camera()).await;
        assert!(cancelled.is_err());
        assert!(session.snapshot().camera.is_busy());

        session.start_camera().await.unwrap();
        assert!(session.snapshot().camera.is_active());
        assert_eq!(host.open_attempts(), 2);
        assert_eq!(host.open_streams(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hints_toggle() {
        let mut session = session(&SimulatedCaptureHost::new());
        assert!(!session.snapshot().hints_visible);
        assert!(session.toggle_hints());
        assert!(!session.toggle_hints());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_releases_camera() {
        let host = SimulatedCaptureHost::new();
        let mut session = session(&host);
        session.start_camera().await.unwrap();
        session.start_detection().unwrap();
        assert_eq!(host.open_streams(), 1);

        drop(session);
        assert_eq!(host.open_streams(), 0);
    }
}
