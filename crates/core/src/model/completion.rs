use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Gesture, GestureId};

/// Emitted once when a practice run reaches full detection progress.
///
/// Unlock and leveling rules belong to whoever consumes the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeCompletion {
    pub gesture_id: GestureId,
    pub points_awarded: u32,
    pub completed_at: DateTime<Utc>,
}

impl PracticeCompletion {
    #[must_use]
    pub fn for_gesture(gesture: &Gesture, completed_at: DateTime<Utc>) -> Self {
        Self {
            gesture_id: gesture.id().clone(),
            points_awarded: gesture.points(),
            completed_at,
        }
    }
}
