//! Built-in BSL starter gestures and JSON catalog loading.

use gesture_core::model::{Difficulty, Gesture, GestureDraft, GestureError, GestureId};

use crate::repository::StorageError;

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    difficulty: Difficulty,
    category: &'static str,
    image_url: &'static str,
    instructions: [&'static str; 3],
    key_points: [&'static str; 3],
    unlocked: bool,
    points: u32,
}

const SEEDS: [Seed; 6] = [
    Seed {
        id: "hello",
        name: "Hello",
        description: "A friendly greeting gesture",
        difficulty: Difficulty::Easy,
        category: "Greetings",
        image_url: "https://images.unsplash.com/photo-1559027615-cd4628902d4a?w=400&h=300&fit=crop",
        instructions: [
            "Raise your dominant hand to shoulder height",
            "Keep your palm facing outward",
            "Wave gently from side to side",
        ],
        key_points: ["Open palm", "Shoulder height", "Gentle wave motion"],
        unlocked: true,
        points: 10,
    },
    Seed {
        id: "thank-you",
        name: "Thank You",
        description: "Express gratitude with this gesture",
        difficulty: Difficulty::Easy,
        category: "Greetings",
        image_url: "https://images.unsplash.com/photo-1582213782179-e0d53f98f2ca?w=400&h=300&fit=crop",
        instructions: [
            "Place your fingertips on your chin",
            "Move your hand forward and down",
            "End with palm facing up",
        ],
        key_points: ["Start at chin", "Forward motion", "Palm up finish"],
        unlocked: true,
        points: 10,
    },
    Seed {
        id: "please",
        name: "Please",
        description: "A polite request gesture",
        difficulty: Difficulty::Easy,
        category: "Greetings",
        image_url: "https://images.unsplash.com/photo-1573496359142-b8d87734a5a2?w=400&h=300&fit=crop",
        instructions: [
            "Place your flat hand on your chest",
            "Make small circular motions",
            "Keep your palm against your chest",
        ],
        key_points: ["Flat hand", "Chest placement", "Circular motion"],
        unlocked: true,
        points: 10,
    },
    Seed {
        id: "yes",
        name: "Yes",
        description: "Affirmative response gesture",
        difficulty: Difficulty::Medium,
        category: "Responses",
        image_url: "https://images.unsplash.com/photo-1571019613454-1cb2f99b2d8b?w=400&h=300&fit=crop",
        instructions: [
            "Make a fist with your dominant hand",
            "Nod your fist up and down",
            "Keep the motion clear and deliberate",
        ],
        key_points: ["Closed fist", "Nodding motion", "Clear movement"],
        unlocked: false,
        points: 15,
    },
    Seed {
        id: "no",
        name: "No",
        description: "Negative response gesture",
        difficulty: Difficulty::Medium,
        category: "Responses",
        image_url: "https://images.unsplash.com/photo-1594736797933-d0401ba2fe65?w=400&h=300&fit=crop",
        instructions: [
            "Extend your index and middle fingers",
            "Tap them against your thumb",
            "Repeat the tapping motion",
        ],
        key_points: ["Two fingers extended", "Thumb contact", "Tapping rhythm"],
        unlocked: false,
        points: 15,
    },
    Seed {
        id: "love",
        name: "Love",
        description: "Express affection with this gesture",
        difficulty: Difficulty::Hard,
        category: "Emotions",
        image_url: "https://images.unsplash.com/photo-1518199266791-5375a83190b7?w=400&h=300&fit=crop",
        instructions: [
            "Cross both arms over your chest",
            "Hug yourself gently",
            "Show a warm expression",
        ],
        key_points: ["Crossed arms", "Self-hug", "Warm expression"],
        unlocked: false,
        points: 25,
    },
];

impl Seed {
    fn build(&self) -> Result<Gesture, GestureError> {
        GestureDraft {
            id: GestureId::new(self.id),
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            difficulty: self.difficulty,
            category: self.category.to_owned(),
            video_url: None,
            image_url: self.image_url.to_owned(),
            instructions: self.instructions.iter().map(|s| (*s).to_owned()).collect(),
            key_points: self.key_points.iter().map(|s| (*s).to_owned()).collect(),
            unlocked: self.unlocked,
            completed: false,
            points: self.points,
        }
        .validate()
    }
}

/// The six starter gestures, in dashboard order.
#[must_use]
pub fn starter_catalog() -> Vec<Gesture> {
    SEEDS.iter().filter_map(|seed| seed.build().ok()).collect()
}

/// Parse a JSON array of gestures.
///
/// # Errors
///
/// Returns `StorageError::Serialization` on malformed JSON or any gesture that
/// fails validation.
pub fn parse_catalog_json(raw: &str) -> Result<Vec<Gesture>, StorageError> {
    serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
}
