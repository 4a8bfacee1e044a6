use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_router::use_navigator;
use gesture_core::model::{Gesture, GestureId};
use gesture_core::DetectionSnapshot;
use services::{
    CaptureHost, PracticeError, PracticeSession, PracticeSnapshot, RenderSurface,
    SimulatedCaptureHost, SimulatedSurface,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::capture::{OVERLAY_ID, VIDEO_ID, WebviewCaptureHost, WebviewSurface};
use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{CameraPanel, PRACTICE_TIPS, PracticeVm, map_practice};

type SharedSession = Rc<Mutex<PracticeSession>>;
type SessionSlot = Rc<RefCell<Option<SharedSession>>>;

#[derive(Clone)]
struct Loaded {
    gesture: Gesture,
    session: SharedSession,
}

fn capture_seams(simulated: bool) -> (Box<dyn CaptureHost>, Box<dyn RenderSurface>) {
    if simulated {
        (
            Box::new(SimulatedCaptureHost::new()),
            Box::new(SimulatedSurface::new()),
        )
    } else {
        (Box::new(WebviewCaptureHost), Box::new(WebviewSurface))
    }
}

/// Refresh the rendered snapshot. While an acquire holds the session, only the
/// detection part is patched in.
fn refresh(
    session: &SharedSession,
    mut snapshot: Signal<Option<PracticeSnapshot>>,
    detection: Option<DetectionSnapshot>,
) {
    if let Ok(guard) = session.try_lock() {
        snapshot.set(Some(guard.snapshot()));
    } else if let Some(detection) = detection {
        snapshot.with_mut(|current| {
            if let Some(current) = current.as_mut() {
                current.detection = detection;
                // Only a reset clears completion, and a reset needs the session.
                current.completed |= detection.is_completed();
            }
        });
    }
}

/// Wait for the session, apply `action`, and return the resulting snapshot.
///
/// The session lock is FIFO, so queued actions run in click order once a
/// pending camera start lets go.
async fn apply_queued(
    session: SharedSession,
    action: impl FnOnce(&mut PracticeSession),
) -> PracticeSnapshot {
    let mut guard = session.lock().await;
    action(&mut guard);
    guard.snapshot()
}

/// Run a synchronous session action, then refresh. While the camera is being
/// acquired the action is queued behind it.
fn with_session(
    slot: &SessionSlot,
    mut snapshot: Signal<Option<PracticeSnapshot>>,
    action: impl FnOnce(&mut PracticeSession) + 'static,
) {
    let Some(session) = slot.borrow().clone() else {
        return;
    };
    if let Ok(mut guard) = session.try_lock() {
        action(&mut guard);
        snapshot.set(Some(guard.snapshot()));
        return;
    }
    debug!("practice session busy; action queued");
    spawn(async move {
        let next = apply_queued(session, action).await;
        snapshot.set(Some(next));
    });
}

#[component]
pub fn PracticeView(gesture_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let snapshot = use_signal(|| None::<PracticeSnapshot>);
    let camera_pending = use_signal(|| false);
    let slot: SessionSlot = use_hook(|| Rc::new(RefCell::new(None)));

    let service = ctx.practice();
    let simulated = ctx.simulated_camera();
    let id = GestureId::new(gesture_id);
    let slot_for_resource = Rc::clone(&slot);
    let resource = use_resource(move || {
        let service = service.clone();
        let id = id.clone();
        let slot = Rc::clone(&slot_for_resource);
        async move {
            let (host, surface) = capture_seams(simulated);
            let session = service
                .open_session(&id, host, surface)
                .await
                .map_err(|err| match err {
                    PracticeError::GestureNotFound(_) => ViewError::NotFound,
                    _ => ViewError::Unknown,
                })?;
            let mut snapshot = snapshot;
            snapshot.set(Some(session.snapshot()));
            let loaded = Loaded {
                gesture: session.gesture().clone(),
                session: Rc::new(Mutex::new(session)),
            };
            slot.replace(Some(Rc::clone(&loaded.session)));
            Ok::<_, ViewError>(loaded)
        }
    });

    // Progress ticks arrive on the session's watch channel.
    use_effect(move || {
        let Some(Ok(loaded)) = resource.read().as_ref().cloned() else {
            return;
        };
        spawn(async move {
            let mut updates = loaded.session.lock().await.detection_updates();
            while updates.changed().await.is_ok() {
                let detection = *updates.borrow_and_update();
                refresh(&loaded.session, snapshot, Some(detection));
            }
        });
    });

    let slot_for_drop = Rc::clone(&slot);
    use_drop(move || {
        let session = slot_for_drop.borrow_mut().take();
        if let Some(session) = session {
            match session.try_lock() {
                Ok(mut guard) => guard.teardown(),
                // The pending acquire is cancelled with this scope; drop tears down.
                Err(_) => debug!("practice session busy at teardown"),
            }
        }
    });

    let state = view_state_from_resource(resource);
    rsx! {
        div { class: "page practice-page",
            header { class: "view-header practice-header",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_: MouseEvent| {
                        navigator.push(Route::Home {});
                    },
                    "Back to Dashboard"
                }
            }
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
                ViewState::Ready(loaded) => {
                    match snapshot() {
                        None => rsx! {
                            p { "Loading..." }
                        },
                        Some(current) => {
                            let vm = map_practice(&loaded.gesture, &current, camera_pending());
                            rsx! {
                                PracticeBody {
                                    vm,
                                    slot: SlotProp(Rc::clone(&slot)),
                                    snapshot,
                                    camera_pending,
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Props wrapper so the session slot can be passed to child components.
#[derive(Clone)]
struct SlotProp(SessionSlot);

impl PartialEq for SlotProp {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[component]
fn PracticeBody(
    vm: PracticeVm,
    slot: SlotProp,
    snapshot: Signal<Option<PracticeSnapshot>>,
    camera_pending: Signal<bool>,
) -> Element {
    let navigator = use_navigator();
    let slot = slot.0;

    let on_hints = {
        let slot = Rc::clone(&slot);
        move |_: MouseEvent| {
            with_session(&slot, snapshot, |session| {
                session.toggle_hints();
            });
        }
    };
    let on_reset = {
        let slot = Rc::clone(&slot);
        move |_: MouseEvent| with_session(&slot, snapshot, PracticeSession::reset_practice)
    };
    let on_previous = {
        let slot = Rc::clone(&slot);
        move |_: MouseEvent| {
            with_session(&slot, snapshot, |session| {
                session.previous_step();
            });
        }
    };
    let on_next = {
        let slot = Rc::clone(&slot);
        move |_: MouseEvent| {
            with_session(&slot, snapshot, |session| {
                session.next_step();
            });
        }
    };
    let on_camera = {
        let slot = Rc::clone(&slot);
        let active = vm.camera_active;
        move |_: MouseEvent| {
            if active {
                with_session(&slot, snapshot, PracticeSession::stop_camera);
                return;
            }
            let Some(session) = slot.borrow().clone() else {
                return;
            };
            let mut camera_pending = camera_pending;
            camera_pending.set(true);
            spawn(async move {
                let mut guard = session.lock().await;
                if let Err(err) = guard.start_camera().await {
                    debug!(error = %err, "camera did not start");
                }
                drop(guard);
                camera_pending.set(false);
                refresh(&session, snapshot, None);
            });
        }
    };
    let on_detect = {
        let slot = Rc::clone(&slot);
        move |_: MouseEvent| {
            with_session(&slot, snapshot, |session| {
                if let Err(err) = session.start_detection() {
                    debug!(error = %err, "detection did not start");
                }
            });
        }
    };

    let camera_button_class = if vm.camera_active {
        "btn btn-secondary btn-wide"
    } else {
        "btn btn-primary btn-wide"
    };
    let video_class = if vm.camera_active {
        "practice-video"
    } else {
        "practice-video practice-video--hidden"
    };

    rsx! {
        div { class: "practice-title",
            h1 { "{vm.title}" }
            span { class: vm.difficulty_class, "{vm.difficulty_label}" }
            button {
                class: "btn btn-secondary",
                r#type: "button",
                onclick: on_hints,
                "Hints"
            }
        }

        if vm.completed {
            div { class: "card practice-success",
                h2 { "Excellent Work! 🎉" }
                p { "{vm.completion_message}" }
                div { class: "practice-success-actions",
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: on_reset,
                        "Practice Again"
                    }
                    button {
                        class: "btn btn-primary",
                        r#type: "button",
                        onclick: move |_: MouseEvent| {
                            navigator.push(Route::Home {});
                        },
                        "Continue Learning"
                    }
                }
            }
        }

        div { class: "practice-grid",
            div { class: "practice-column",
                div { class: "card",
                    h3 { "Gesture Example" }
                    img { class: "practice-image", src: "{vm.image_url}", alt: "{vm.name}" }
                    p { "{vm.description}" }
                }

                div { class: "card",
                    h3 { "Step-by-Step Instructions" }
                    ol { class: "practice-steps",
                        for step in vm.steps.iter() {
                            li { class: step.class(),
                                span { class: "practice-step-marker", "{step.marker}" }
                                p { "{step.text}" }
                            }
                        }
                    }
                    div { class: "practice-step-nav",
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            disabled: !vm.can_previous,
                            onclick: on_previous,
                            "Previous Step"
                        }
                        button {
                            class: "btn btn-secondary",
                            r#type: "button",
                            disabled: !vm.can_next,
                            onclick: on_next,
                            "Next Step"
                        }
                    }
                }

                if vm.hints_visible {
                    div { class: "card practice-hints",
                        h3 { "Key Points" }
                        ul {
                            for point in vm.key_points.iter() {
                                li { "{point}" }
                            }
                        }
                    }
                }
            }

            div { class: "practice-column",
                div { class: "card",
                    h3 { "Practice with Camera" }
                    div { class: "practice-camera",
                        video {
                            id: VIDEO_ID,
                            class: video_class,
                            autoplay: true,
                            playsinline: true,
                            muted: true,
                        }
                        canvas { id: OVERLAY_ID, class: "practice-overlay" }
                        match vm.panel {
                            CameraPanel::Analyzing => rsx! {
                                div { class: "practice-camera-status practice-camera-status--overlay",
                                    p { "Analyzing your gesture..." }
                                }
                            },
                            CameraPanel::Starting => rsx! {
                                div { class: "practice-camera-status",
                                    p { "Starting camera..." }
                                    p { class: "muted", "Please allow camera access if prompted" }
                                }
                            },
                            CameraPanel::Inactive => rsx! {
                                div { class: "practice-camera-status",
                                    p { "Camera not active" }
                                    p { class: "muted", "Click \"Start Camera\" to begin practice" }
                                }
                            },
                            CameraPanel::Live => rsx! {},
                        }
                    }

                    if let Some(message) = vm.camera_error.as_ref() {
                        p { class: "practice-error", "{message}" }
                    }

                    button {
                        class: camera_button_class,
                        r#type: "button",
                        disabled: vm.camera_button_disabled,
                        onclick: on_camera,
                        "{vm.camera_button_label}"
                    }

                    if vm.camera_active {
                        div { class: "practice-progress",
                            div { class: "practice-progress-label",
                                span { "Detection Progress" }
                                span { "{vm.progress_label}" }
                            }
                            progress { max: "100", value: "{vm.progress}" }
                        }
                        button {
                            class: "btn btn-primary btn-wide",
                            r#type: "button",
                            disabled: vm.detect_button_disabled,
                            onclick: on_detect,
                            "{vm.detect_button_label}"
                        }
                    }
                }

                div { class: "card",
                    h3 { "Practice Tips" }
                    ul { class: "practice-tips",
                        for tip in PRACTICE_TIPS {
                            li { "{tip}" }
                        }
                    }
                }
            }
        }
    }
}
