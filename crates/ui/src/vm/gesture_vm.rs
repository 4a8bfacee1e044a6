use gesture_core::model::Gesture;

/// One row of the gesture picker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GestureCardVm {
    pub id: String,
    pub name: String,
    pub category: String,
    pub difficulty_label: &'static str,
    pub points_label: String,
    pub locked: bool,
}

#[must_use]
pub fn map_gesture_card(gesture: &Gesture) -> GestureCardVm {
    GestureCardVm {
        id: gesture.id().as_str().to_string(),
        name: gesture.name().to_string(),
        category: gesture.category().to_string(),
        difficulty_label: gesture.difficulty().label(),
        points_label: format!("{} pts", gesture.points()),
        locked: !gesture.is_unlocked(),
    }
}
