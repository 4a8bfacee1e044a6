use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::GestureId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GestureError {
    #[error("gesture id cannot be empty")]
    EmptyId,

    #[error("gesture name cannot be empty")]
    EmptyName,

    #[error("gesture must have at least one instruction")]
    NoInstructions,

    #[error("instruction {index} is blank")]
    BlankInstruction { index: usize },
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Lowercase label shown on the practice header badge.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── GESTURE ───────────────────────────────────────────────────────────────────
//

/// Unvalidated gesture as supplied by a catalog source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureDraft {
    pub id: GestureId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub image_url: String,
    pub instructions: Vec<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub unlocked: bool,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub points: u32,
}

impl GestureDraft {
    /// Validate the draft into an immutable `Gesture`.
    ///
    /// # Errors
    ///
    /// Returns `GestureError` if the id or name is empty, or if the instruction
    /// list is empty or contains a blank step.
    pub fn validate(self) -> Result<Gesture, GestureError> {
        if self.id.is_empty() {
            return Err(GestureError::EmptyId);
        }
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(GestureError::EmptyName);
        }
        if self.instructions.is_empty() {
            return Err(GestureError::NoInstructions);
        }
        if let Some(index) = self
            .instructions
            .iter()
            .position(|step| step.trim().is_empty())
        {
            return Err(GestureError::BlankInstruction { index });
        }

        Ok(Gesture {
            id: self.id,
            name,
            description: self.description,
            difficulty: self.difficulty,
            category: self.category,
            video_url: self.video_url.filter(|url| !url.trim().is_empty()),
            image_url: self.image_url,
            instructions: self.instructions,
            key_points: self.key_points,
            unlocked: self.unlocked,
            completed: self.completed,
            points: self.points,
        })
    }
}

/// A single learnable gesture.
///
/// Invariant: `instructions` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GestureDraft", into = "GestureDraft")]
pub struct Gesture {
    id: GestureId,
    name: String,
    description: String,
    difficulty: Difficulty,
    category: String,
    video_url: Option<String>,
    image_url: String,
    instructions: Vec<String>,
    key_points: Vec<String>,
    unlocked: bool,
    completed: bool,
    points: u32,
}

impl TryFrom<GestureDraft> for Gesture {
    type Error = GestureError;

    fn try_from(draft: GestureDraft) -> Result<Self, Self::Error> {
        draft.validate()
    }
}

impl From<Gesture> for GestureDraft {
    fn from(gesture: Gesture) -> Self {
        Self {
            id: gesture.id,
            name: gesture.name,
            description: gesture.description,
            difficulty: gesture.difficulty,
            category: gesture.category,
            video_url: gesture.video_url,
            image_url: gesture.image_url,
            instructions: gesture.instructions,
            key_points: gesture.key_points,
            unlocked: gesture.unlocked,
            completed: gesture.completed,
            points: gesture.points,
        }
    }
}

impl Gesture {
    #[must_use]
    pub fn id(&self) -> &GestureId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn video_url(&self) -> Option<&str> {
        self.video_url.as_deref()
    }

    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    #[must_use]
    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    /// Number of instruction steps; always at least 1.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.instructions.len()
    }

    #[must_use]
    pub fn instruction(&self, index: usize) -> Option<&str> {
        self.instructions.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn key_points(&self) -> &[String] {
        &self.key_points
    }

    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
