use dioxus::prelude::*;
use dioxus_router::use_navigator;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{GestureCardVm, map_gesture_card};

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let initial_gesture = use_hook(|| ctx.take_initial_gesture());

    use_effect(move || {
        if let Some(id) = initial_gesture.as_ref() {
            navigator.push(Route::Practice {
                gesture_id: id.as_str().to_string(),
            });
        }
    });

    let service = ctx.practice();
    let resource = use_resource(move || {
        let service = service.clone();
        async move {
            let gestures = service
                .list_gestures()
                .await
                .map_err(|_| ViewError::Unknown)?;
            Ok::<_, ViewError>(gestures.iter().map(map_gesture_card).collect::<Vec<_>>())
        }
    });

    rsx! {
        div { class: "page home-page",
            header { class: "view-header",
                h2 { class: "view-title", "Gestures" }
                p { class: "view-subtitle", "Pick a gesture to practice with your camera." }
            }
            match view_state_from_resource(resource) {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| {
                            let mut resource = resource;
                            resource.restart();
                        },
                        "Retry"
                    }
                },
                ViewState::Ready(cards) => rsx! {
                    ul { class: "gesture-list",
                        for card in cards {
                            GestureRow { key: "{card.id}", card }
                        }
                    }
                },
            }
        }
    }
}

#[component]
fn GestureRow(card: GestureCardVm) -> Element {
    let navigator = use_navigator();
    let gesture_id = card.id.clone();
    let row_class = if card.locked {
        "gesture-row gesture-row--locked"
    } else {
        "gesture-row"
    };

    rsx! {
        li { class: row_class,
            div { class: "gesture-row-text",
                h4 { class: "gesture-row-name", "{card.name}" }
                span { class: "gesture-row-meta", "{card.category} · {card.difficulty_label} · {card.points_label}" }
            }
            button {
                class: "btn btn-primary",
                r#type: "button",
                disabled: card.locked,
                onclick: move |_| {
                    navigator.push(Route::Practice {
                        gesture_id: gesture_id.clone(),
                    });
                },
                "Practice"
            }
        }
    }
}
