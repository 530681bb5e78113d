//! Exercise catalog entry referenced by workout sets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body part targeted by an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Chest,
    Back,
    Legs,
    Shoulders,
    Arms,
    Core,
    FullBody,
    Other,
}

impl BodyPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyPart::Chest => "chest",
            BodyPart::Back => "back",
            BodyPart::Legs => "legs",
            BodyPart::Shoulders => "shoulders",
            BodyPart::Arms => "arms",
            BodyPart::Core => "core",
            BodyPart::FullBody => "full_body",
            BodyPart::Other => "other",
        }
    }

    /// Parse the stored representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "chest" => Some(BodyPart::Chest),
            "back" => Some(BodyPart::Back),
            "legs" => Some(BodyPart::Legs),
            "shoulders" => Some(BodyPart::Shoulders),
            "arms" => Some(BodyPart::Arms),
            "core" => Some(BodyPart::Core),
            "full_body" => Some(BodyPart::FullBody),
            "other" => Some(BodyPart::Other),
            _ => None,
        }
    }
}

/// An exercise from the catalog.
///
/// Sets only hold its id; the catalog itself is managed elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Unique identifier
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Targeted body part
    pub body_part: Option<BodyPart>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Exercise {
    /// Create a new exercise with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            body_part: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the targeted body part.
    pub fn with_body_part(mut self, body_part: BodyPart) -> Self {
        self.body_part = Some(body_part);
        self
    }
}
