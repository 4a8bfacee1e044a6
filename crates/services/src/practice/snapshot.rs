use gesture_core::model::GestureId;
use gesture_core::{CaptureState, DetectionSnapshot, InstructionCursor};

/// Everything the practice screen renders, read in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeSnapshot {
    pub gesture_id: GestureId,
    pub cursor: InstructionCursor,
    pub instruction: String,
    pub camera: CaptureState,
    pub detection: DetectionSnapshot,
    pub hints_visible: bool,
    pub completed: bool,
}

impl PracticeSnapshot {
    #[must_use]
    pub fn step_index(&self) -> usize {
        self.cursor.index()
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.cursor.step_count()
    }

    /// Detection can start only with a live camera and an idle run.
    #[must_use]
    pub fn can_start_detection(&self) -> bool {
        self.camera.is_active() && !self.detection.is_running() && !self.completed
    }
}
