mod completion;
mod gesture;
mod ids;
mod settings;

pub use ids::{GestureId, ParseIdError};

pub use completion::PracticeCompletion;
pub use gesture::{Difficulty, Gesture, GestureDraft, GestureError};
pub use settings::{
    DEFAULT_MAX_DELTA, DEFAULT_MIN_DELTA, DEFAULT_READY_TIMEOUT_MS, DEFAULT_TICK_INTERVAL_MS,
    PracticeSettings, PracticeSettingsDraft, PracticeSettingsError,
};
