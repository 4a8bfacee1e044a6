use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::CaptureConstraints;

/// Default delay between detection ticks.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 200;
/// Default bound on how long a stream may wait for its ready signal.
pub const DEFAULT_READY_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MIN_DELTA: f64 = 5.0;
pub const DEFAULT_MAX_DELTA: f64 = 20.0;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PracticeSettingsError {
    #[error("tick interval must be > 0 ms")]
    InvalidTickInterval,

    #[error("ready timeout must be > 0 ms")]
    InvalidReadyTimeout,

    #[error("detection delta range must satisfy 0 < min < max <= 100 (got {min}..{max})")]
    InvalidDeltaRange { min: f64, max: f64 },
}

/// Timing and detector tuning for a practice session.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeSettings {
    tick_interval: Duration,
    ready_timeout: Duration,
    min_delta: f64,
    max_delta: f64,
    constraints: CaptureConstraints,
}

/// Raw settings as read from flags or the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeSettingsDraft {
    pub tick_interval_ms: u64,
    pub ready_timeout_ms: u64,
    pub min_delta: f64,
    pub max_delta: f64,
    #[serde(default)]
    pub constraints: CaptureConstraints,
}

impl Default for PracticeSettingsDraft {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
            min_delta: DEFAULT_MIN_DELTA,
            max_delta: DEFAULT_MAX_DELTA,
            constraints: CaptureConstraints::default(),
        }
    }
}

impl PracticeSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the draft into usable settings.
    ///
    /// # Errors
    ///
    /// Returns `PracticeSettingsError` for zero durations or an empty/out of
    /// range delta interval.
    pub fn validate(self) -> Result<PracticeSettings, PracticeSettingsError> {
        if self.tick_interval_ms == 0 {
            return Err(PracticeSettingsError::InvalidTickInterval);
        }
        if self.ready_timeout_ms == 0 {
            return Err(PracticeSettingsError::InvalidReadyTimeout);
        }
        let range_ok = self.min_delta.is_finite()
            && self.max_delta.is_finite()
            && self.min_delta > 0.0
            && self.min_delta < self.max_delta
            && self.max_delta <= 100.0;
        if !range_ok {
            return Err(PracticeSettingsError::InvalidDeltaRange {
                min: self.min_delta,
                max: self.max_delta,
            });
        }

        Ok(PracticeSettings {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            ready_timeout: Duration::from_millis(self.ready_timeout_ms),
            min_delta: self.min_delta,
            max_delta: self.max_delta,
            constraints: self.constraints,
        })
    }
}

impl PracticeSettings {
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    #[must_use]
    pub fn ready_timeout(&self) -> Duration {
        self.ready_timeout
    }

    #[must_use]
    pub fn min_delta(&self) -> f64 {
        self.min_delta
    }

    #[must_use]
    pub fn max_delta(&self) -> f64 {
        self.max_delta
    }

    #[must_use]
    pub fn constraints(&self) -> &CaptureConstraints {
        &self.constraints
    }
}

impl Default for PracticeSettings {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            ready_timeout: Duration::from_millis(DEFAULT_READY_TIMEOUT_MS),
            min_delta: DEFAULT_MIN_DELTA,
            max_delta: DEFAULT_MAX_DELTA,
            constraints: CaptureConstraints::default(),
        }
    }
}
