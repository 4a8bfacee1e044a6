/// Upper bound of detection progress.
pub const FULL_PROGRESS: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DetectionState {
    #[default]
    Idle,
    Running,
    Completed,
}

/// Point-in-time view of a detection run.
///
/// `run` increments on every start and reset, so observers can tell runs apart.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DetectionSnapshot {
    pub run: u64,
    pub state: DetectionState,
    pub progress: f64,
}

impl DetectionSnapshot {
    /// Progress as shown to the user: rounded whole percent.
    #[must_use]
    pub fn reported_progress(&self) -> u8 {
        clamp_progress(self.progress).round() as u8
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == DetectionState::Running
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == DetectionState::Completed
    }
}

/// Clamp into `[0, 100]`; NaN counts as no progress.
#[must_use]
pub fn clamp_progress(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, FULL_PROGRESS)
}
