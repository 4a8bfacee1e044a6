use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use gesture_core::capture::VideoFrame;
use gesture_core::model::PracticeSettings;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Outcome of one detection tick.
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionStep {
    /// Progress gained this tick, in percentage points.
    Advance(f64),
    /// The detector gave up; the run returns to idle.
    Failed(String),
}

/// Source of per-tick progress. A real recognizer would inspect `frame`.
pub trait Detector: Send {
    fn advance(&mut self, frame: Option<&VideoFrame>) -> DetectionStep;
}

/// Builds a fresh detector for every run.
pub trait DetectorFactory: Send + Sync {
    fn create(&self) -> Box<dyn Detector>;
}

impl<F> DetectorFactory for F
where
    F: Fn() -> Box<dyn Detector> + Send + Sync,
{
    fn create(&self) -> Box<dyn Detector> {
        self()
    }
}

//
// ─── SIMULATED ─────────────────────────────────────────────────────────────────
//

/// Stand-in recognizer: a uniform random gain in `[min_delta, max_delta)` per
/// tick, independent of the video.
pub struct SimulatedDetector {
    rng: StdRng,
    min_delta: f64,
    max_delta: f64,
}

impl SimulatedDetector {
    #[must_use]
    pub fn new(min_delta: f64, max_delta: f64) -> Self {
        Self::with_rng(StdRng::from_os_rng(), min_delta, max_delta)
    }

    /// Reproducible sequence for tests and demos.
    #[must_use]
    pub fn seeded(seed: u64, min_delta: f64, max_delta: f64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), min_delta, max_delta)
    }

    fn with_rng(rng: StdRng, min_delta: f64, max_delta: f64) -> Self {
        Self {
            rng,
            min_delta,
            max_delta,
        }
    }
}

impl Detector for SimulatedDetector {
    fn advance(&mut self, _frame: Option<&VideoFrame>) -> DetectionStep {
        if self.min_delta >= self.max_delta {
            return DetectionStep::Advance(self.min_delta);
        }
        DetectionStep::Advance(self.rng.random_range(self.min_delta..self.max_delta))
    }
}

impl fmt::Debug for SimulatedDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedDetector")
            .field("min_delta", &self.min_delta)
            .field("max_delta", &self.max_delta)
            .finish_non_exhaustive()
    }
}

/// Factory for `SimulatedDetector`s. When seeded, run `n` uses `seed + n`.
#[derive(Debug)]
pub struct SimulatedDetectorFactory {
    min_delta: f64,
    max_delta: f64,
    seed: Option<AtomicU64>,
}

impl SimulatedDetectorFactory {
    #[must_use]
    pub fn new(settings: &PracticeSettings) -> Self {
        Self {
            min_delta: settings.min_delta(),
            max_delta: settings.max_delta(),
            seed: None,
        }
    }

    #[must_use]
    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(AtomicU64::new(seed));
        self
    }
}

impl DetectorFactory for SimulatedDetectorFactory {
    fn create(&self) -> Box<dyn Detector> {
        let detector = match &self.seed {
            Some(next) => SimulatedDetector::seeded(
                next.fetch_add(1, Ordering::Relaxed),
                self.min_delta,
                self.max_delta,
            ),
            None => SimulatedDetector::new(self.min_delta, self.max_delta),
        };
        Box::new(detector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gain(step: DetectionStep) -> f64 {
        match step {
            DetectionStep::Advance(delta) => delta,
            DetectionStep::Failed(reason) => panic!("unexpected failure: {reason}"),
        }
    }

    #[test]
    fn simulated_gain_stays_in_range() {
        let mut detector = SimulatedDetector::new(5.0, 20.0);
        for _ in 0..500 {
            let delta = gain(detector.advance(None));
            assert!((5.0..20.0).contains(&delta), "delta {delta}");
        }
    }

    #[test]
    fn seeded_detectors_repeat() {
        let mut a = SimulatedDetector::seeded(7, 5.0, 20.0);
        let mut b = SimulatedDetector::seeded(7, 5.0, 20.0);
        for _ in 0..10 {
            assert_eq!(a.advance(None), b.advance(None));
        }
    }

    #[test]
    fn seeded_factory_varies_between_runs() {
        let factory = SimulatedDetectorFactory::new(&PracticeSettings::default()).seeded(1);
        let first: Vec<f64> = {
            let mut d = factory.create();
            (0..5).map(|_| gain(d.advance(None))).collect()
        };
        let second: Vec<f64> = {
            let mut d = factory.create();
            (0..5).map(|_| gain(d.advance(None))).collect()
        };
        assert_ne!(first, second);
    }

    #[test]
    fn closures_are_factories() {
        let factory = || Box::new(SimulatedDetector::seeded(3, 10.0, 11.0)) as Box<dyn Detector>;
        let mut detector = DetectorFactory::create(&factory);
        let delta = gain(detector.advance(None));
        assert!((10.0..11.0).contains(&delta));
    }
}
