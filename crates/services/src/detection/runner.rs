use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use gesture_core::detection::{DetectionSnapshot, DetectionState, FULL_PROGRESS, clamp_progress};
use gesture_core::InvalidTransition;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{DetectionStep, Detector};
use crate::capture::FrameFeed;

struct Inner {
    snapshot: Mutex<DetectionSnapshot>,
    updates: watch::Sender<DetectionSnapshot>,
}

enum Applied {
    Continue,
    Completed,
    Stopped,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, DetectionSnapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, snapshot: DetectionSnapshot) {
        self.updates.send_replace(snapshot);
    }

    /// Apply one tick for `run`. Ticks from a superseded run are dropped.
    fn apply(&self, run: u64, step: DetectionStep) -> Applied {
        let mut current = self.lock();
        if current.run != run || current.state != DetectionState::Running {
            return Applied::Stopped;
        }
        let applied = match step {
            DetectionStep::Advance(delta) => {
                current.progress = clamp_progress(current.progress + delta.max(0.0));
                if current.progress >= FULL_PROGRESS {
                    current.progress = FULL_PROGRESS;
                    current.state = DetectionState::Completed;
                    Applied::Completed
                } else {
                    Applied::Continue
                }
            }
            DetectionStep::Failed(reason) => {
                warn!(run, %reason, "detection failed");
                current.state = DetectionState::Idle;
                current.progress = 0.0;
                Applied::Stopped
            }
        };
        self.publish(*current);
        applied
    }
}

/// Drives a detector on a fixed tick until progress reaches 100.
///
/// Progress only grows within a run. `reset` is atomic with respect to ticks:
/// no delta from the cancelled run lands after it returns.
pub struct DetectionRunner {
    tick: Duration,
    inner: Arc<Inner>,
    task: Option<JoinHandle<()>>,
}

impl DetectionRunner {
    #[must_use]
    pub fn new(tick: Duration) -> Self {
        let (updates, _) = watch::channel(DetectionSnapshot::default());
        Self {
            tick,
            inner: Arc::new(Inner {
                snapshot: Mutex::new(DetectionSnapshot::default()),
                updates,
            }),
            task: None,
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> DetectionSnapshot {
        *self.inner.lock()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DetectionSnapshot> {
        self.inner.updates.subscribe()
    }

    /// Begin a run. `on_complete` fires once if this run reaches 100.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// `DetectionRunning` while a run is in progress, `AlreadyCompleted` after
    /// completion until `reset`.
    pub fn start(
        &mut self,
        detector: Box<dyn Detector>,
        frames: Option<FrameFeed>,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> Result<u64, InvalidTransition> {
        let run = {
            let mut current = self.inner.lock();
            match current.state {
                DetectionState::Running => return Err(InvalidTransition::DetectionRunning),
                DetectionState::Completed => return Err(InvalidTransition::AlreadyCompleted),
                DetectionState::Idle => {}
            }
            current.run += 1;
            current.state = DetectionState::Running;
            current.progress = 0.0;
            self.inner.publish(*current);
            current.run
        };
        self.abort_task();
        debug!(run, tick_ms = self.tick.as_millis(), "detection started");

        let inner = Arc::clone(&self.inner);
        let tick = self.tick;
        self.task = Some(tokio::spawn(drive(
            inner,
            run,
            tick,
            detector,
            frames,
            Box::new(on_complete),
        )));
        Ok(run)
    }

    /// Back to idle with zero progress, from any state.
    pub fn reset(&mut self) {
        {
            let mut current = self.inner.lock();
            current.run += 1;
            current.state = DetectionState::Idle;
            current.progress = 0.0;
            self.inner.publish(*current);
        }
        self.abort_task();
    }

    fn abort_task(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for DetectionRunner {
    fn drop(&mut self) {
        self.abort_task();
    }
}

impl std::fmt::Debug for DetectionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionRunner")
            .field("tick", &self.tick)
            .field("snapshot", &self.snapshot())
            .finish_non_exhaustive()
    }
}

async fn drive(
    inner: Arc<Inner>,
    run: u64,
    tick: Duration,
    mut detector: Box<dyn Detector>,
    frames: Option<FrameFeed>,
    on_complete: Box<dyn FnOnce() + Send>,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        interval.tick().await;
        let frame = frames.as_ref().and_then(|feed| feed.borrow().clone());
        match inner.apply(run, detector.advance(frame.as_ref())) {
            Applied::Continue => {}
            Applied::Completed => {
                info!(run, "gesture detected");
                on_complete();
                return;
            }
            Applied::Stopped => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const TICK: Duration = Duration::from_millis(200);

    struct Scripted(VecDeque<DetectionStep>);

    impl Scripted {
        fn gains(gains: &[f64]) -> Box<dyn Detector> {
            Box::new(Self(
                gains.iter().copied().map(DetectionStep::Advance).collect(),
            ))
        }
    }

    impl Detector for Scripted {
        fn advance(&mut self, _frame: Option<&gesture_core::VideoFrame>) -> DetectionStep {
            self.0.pop_front().unwrap_or(DetectionStep::Advance(0.0))
        }
    }

    async fn wait_for(
        rx: &mut watch::Receiver<DetectionSnapshot>,
        done: impl Fn(&DetectionSnapshot) -> bool,
    ) -> DetectionSnapshot {
        let snapshot = rx.wait_for(|s| done(s)).await.unwrap();
        *snapshot
    }

    #[tokio::test(start_paused = true)]
    async fn three_large_ticks_complete_at_exactly_100() {
        let mut runner = DetectionRunner::new(TICK);
        let completions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completions);
        let mut rx = runner.subscribe();

        runner
            .start(Scripted::gains(&[40.0, 40.0, 40.0, 40.0]), None, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        let done = wait_for(&mut rx, DetectionSnapshot::is_completed).await;

        assert_eq!(done.progress, 100.0);
        assert_eq!(done.reported_progress(), 100);
        tokio::time::sleep(TICK * 5).await;
        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert_eq!(runner.snapshot().progress, 100.0);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_lands_one_interval_after_start() {
        let mut runner = DetectionRunner::new(TICK);
        let started = Instant::now();
        let mut rx = runner.subscribe();
        runner.start(Scripted::gains(&[10.0]), None, || {}).unwrap();

        wait_for(&mut rx, |s| s.progress > 0.0).await;
        assert!(started.elapsed() >= TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn negative_gain_does_not_lower_progress() {
        let mut runner = DetectionRunner::new(TICK);
        let mut rx = runner.subscribe();
        runner
            .start(Scripted::gains(&[30.0, -50.0, 10.0]), None, || {})
            .unwrap();

        wait_for(&mut rx, |s| s.progress >= 40.0).await;
        assert_eq!(runner.snapshot().progress, 40.0);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_progress() {
        let mut runner = DetectionRunner::new(TICK);
        let completions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&completions);
        let mut rx = runner.subscribe();
        runner
            .start(Scripted::gains(&[10.0; 20]), None, move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        wait_for(&mut rx, |s| s.progress >= 20.0).await;

        runner.reset();
        tokio::time::sleep(TICK * 20).await;

        let snapshot = runner.snapshot();
        assert_eq!(snapshot.state, DetectionState::Idle);
        assert_eq!(snapshot.progress, 0.0);
        assert_eq!(completions.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_run_cannot_touch_new_run() {
        let mut runner = DetectionRunner::new(TICK);
        let first = runner.start(Scripted::gains(&[50.0; 5]), None, || {}).unwrap();
        runner.reset();
        let second = runner.start(Scripted::gains(&[1.0; 5]), None, || {}).unwrap();
        assert!(second > first);

        tokio::time::sleep(TICK * 2 + Duration::from_millis(10)).await;
        assert!(runner.snapshot().progress <= 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_rejected_while_running_or_completed() {
        let mut runner = DetectionRunner::new(TICK);
        let mut rx = runner.subscribe();
        runner.start(Scripted::gains(&[60.0, 60.0]), None, || {}).unwrap();
        assert_eq!(
            runner.start(Scripted::gains(&[]), None, || {}),
            Err(InvalidTransition::DetectionRunning)
        );

        wait_for(&mut rx, DetectionSnapshot::is_completed).await;
        assert_eq!(
            runner.start(Scripted::gains(&[]), None, || {}),
            Err(InvalidTransition::AlreadyCompleted)
        );

        runner.reset();
        assert!(runner.start(Scripted::gains(&[]), None, || {}).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn failed_detector_returns_to_idle() {
        let mut runner = DetectionRunner::new(TICK);
        let mut rx = runner.subscribe();
        let detector = Box::new(Scripted(VecDeque::from([
            DetectionStep::Advance(25.0),
            DetectionStep::Failed("lost hand".into()),
        ])));
        runner.start(detector, None, || {}).unwrap();

        let snapshot = wait_for(&mut rx, |s| s.state == DetectionState::Idle).await;
        assert_eq!(snapshot.progress, 0.0);
        assert!(runner.start(Scripted::gains(&[]), None, || {}).is_ok());
    }
}
