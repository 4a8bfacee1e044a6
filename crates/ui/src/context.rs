use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use gesture_core::model::GestureId;
use services::PracticeService;

pub trait UiApp: Send + Sync {
    fn practice(&self) -> Arc<PracticeService>;
    fn initial_gesture(&self) -> Option<GestureId>;
    fn simulated_camera(&self) -> bool;
}

#[derive(Clone)]
pub struct AppContext {
    practice: Arc<PracticeService>,
    initial_gesture: Option<GestureId>,
    open_initial_gesture_once: Arc<AtomicBool>,
    simulated_camera: bool,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        let initial_gesture = app.initial_gesture();
        Self {
            practice: app.practice(),
            open_initial_gesture_once: Arc::new(AtomicBool::new(initial_gesture.is_some())),
            initial_gesture,
            simulated_camera: app.simulated_camera(),
        }
    }

    #[must_use]
    pub fn practice(&self) -> Arc<PracticeService> {
        Arc::clone(&self.practice)
    }

    /// The gesture requested on the command line, handed out once.
    #[must_use]
    pub fn take_initial_gesture(&self) -> Option<GestureId> {
        if self.open_initial_gesture_once.swap(false, Ordering::AcqRel) {
            self.initial_gesture.clone()
        } else {
            None
        }
    }

    /// Use the in-process camera instead of the webview's `getUserMedia`.
    #[must_use]
    pub fn simulated_camera(&self) -> bool {
        self.simulated_camera
    }
}

// This context is provided by the application composition root (e.g. `crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
