use gesture_core::model::{Difficulty, Gesture};
use gesture_core::{CaptureState, StepStatus};
use services::PracticeSnapshot;

pub const PRACTICE_TIPS: [&str; 4] = [
    "Make sure you have good lighting",
    "Position yourself clearly in the camera frame",
    "Follow the instructions step by step",
    "Hold the gesture for a few seconds",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraPanel {
    Inactive,
    Starting,
    Live,
    Analyzing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepVm {
    pub marker: String,
    pub text: String,
    pub status: StepStatus,
}

impl StepVm {
    #[must_use]
    pub fn class(&self) -> &'static str {
        match self.status {
            StepStatus::Done => "practice-step practice-step--done",
            StepStatus::Current => "practice-step practice-step--current",
            StepStatus::Upcoming => "practice-step",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PracticeVm {
    pub title: String,
    pub difficulty_label: &'static str,
    pub difficulty_class: &'static str,
    pub image_url: String,
    pub name: String,
    pub description: String,
    pub steps: Vec<StepVm>,
    pub can_previous: bool,
    pub can_next: bool,
    pub hints_visible: bool,
    pub key_points: Vec<String>,
    pub panel: CameraPanel,
    pub camera_button_label: &'static str,
    pub camera_button_disabled: bool,
    pub camera_active: bool,
    pub camera_error: Option<String>,
    pub progress: u8,
    pub progress_label: String,
    pub detect_button_label: &'static str,
    pub detect_button_disabled: bool,
    pub completed: bool,
    pub completion_message: String,
}

/// Map a session snapshot to what the practice page renders.
///
/// `camera_pending` covers the window where the session is busy acquiring and
/// its snapshot cannot be read.
#[must_use]
pub fn map_practice(
    gesture: &Gesture,
    snapshot: &PracticeSnapshot,
    camera_pending: bool,
) -> PracticeVm {
    let steps = gesture
        .instructions()
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let status = snapshot.cursor.step_status(index);
            let marker = if status == StepStatus::Done {
                "✓".to_string()
            } else {
                (index + 1).to_string()
            };
            StepVm {
                marker,
                text: text.clone(),
                status,
            }
        })
        .collect();

    let starting = camera_pending || snapshot.camera.is_busy();
    let camera_active = snapshot.camera.is_active() && !starting;
    let detecting = snapshot.detection.is_running();
    let panel = if starting {
        CameraPanel::Starting
    } else if camera_active && detecting {
        CameraPanel::Analyzing
    } else if camera_active {
        CameraPanel::Live
    } else {
        CameraPanel::Inactive
    };
    let camera_button_label = match panel {
        CameraPanel::Starting => "Starting Camera...",
        CameraPanel::Live | CameraPanel::Analyzing => "Stop Camera",
        CameraPanel::Inactive => "Start Camera",
    };
    let camera_error = match &snapshot.camera {
        CaptureState::Failed(err) if !starting => Some(err.user_message()),
        _ => None,
    };
    let progress = snapshot.detection.reported_progress();

    PracticeVm {
        title: format!("Learning: {}", gesture.name()),
        difficulty_label: gesture.difficulty().label(),
        difficulty_class: difficulty_class(gesture),
        image_url: gesture.image_url().to_string(),
        name: gesture.name().to_string(),
        description: gesture.description().to_string(),
        steps,
        can_previous: !snapshot.cursor.is_first(),
        can_next: !snapshot.cursor.is_last(),
        hints_visible: snapshot.hints_visible,
        key_points: gesture.key_points().to_vec(),
        panel,
        camera_button_label,
        camera_button_disabled: starting,
        camera_active,
        camera_error,
        progress,
        progress_label: format!("{progress}%"),
        detect_button_label: if detecting { "Detecting..." } else { "Start Detection" },
        detect_button_disabled: !camera_active || detecting || snapshot.completed,
        completed: snapshot.completed,
        completion_message: format!(
            "You've successfully performed the \"{}\" gesture!",
            gesture.name()
        ),
    }
}

fn difficulty_class(gesture: &Gesture) -> &'static str {
    match gesture.difficulty() {
        Difficulty::Easy => "badge badge--easy",
        Difficulty::Medium => "badge badge--medium",
        Difficulty::Hard => "badge badge--hard",
    }
}
