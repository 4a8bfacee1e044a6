use gesture_core::model::{GestureId, PracticeCompletion};
use gesture_core::time::fixed_now;
use storage::{CompletionRepository, GestureCatalog, Storage, parse_catalog_json, starter_catalog};

#[tokio::test]
async fn in_memory_storage_serves_starter_catalog() {
    let storage = Storage::in_memory();

    let listed = storage.gestures.list_gestures().await.expect("list");
    let names: Vec<_> = listed.iter().map(|g| g.name()).collect();
    assert_eq!(names, ["Hello", "Thank You", "Please", "Yes", "No", "Love"]);

    let hello = storage
        .gestures
        .get_gesture(&GestureId::new("hello"))
        .await
        .expect("hello");
    assert_eq!(hello.instruction(2), Some("Wave gently from side to side"));
}

#[tokio::test]
async fn json_catalog_round_trips_through_storage() {
    let raw = serde_json::to_string(&starter_catalog()).expect("serialize");
    let parsed = parse_catalog_json(&raw).expect("parse");
    let storage = Storage::from_catalog(parsed);

    let yes = storage
        .gestures
        .get_gesture(&GestureId::new("yes"))
        .await
        .expect("yes");
    assert!(!yes.is_unlocked());
    assert_eq!(yes.key_points().len(), 3);
}

#[tokio::test]
async fn completions_are_listed_in_order() {
    let storage = Storage::in_memory();
    let catalog = starter_catalog();

    for gesture in &catalog[..2] {
        let completion = PracticeCompletion::for_gesture(gesture, fixed_now());
        storage
            .completions
            .append_completion(&completion)
            .await
            .expect("append");
    }

    let completions = storage.completions.list_completions().await.expect("list");
    let ids: Vec<_> = completions.iter().map(|c| c.gesture_id.as_str()).collect();
    assert_eq!(ids, ["hello", "thank-you"]);
    assert_eq!(completions[0].points_awarded, 10);
}
