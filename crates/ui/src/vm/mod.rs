mod gesture_vm;
mod practice_vm;

pub use gesture_vm::{GestureCardVm, map_gesture_card};
pub use practice_vm::{CameraPanel, PRACTICE_TIPS, PracticeVm, StepVm, map_practice};
