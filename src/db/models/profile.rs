//! Display profiles. Exactly one profile is active at a time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PROFILE_MODES: [&str; 5] = ["study", "relax", "exam", "work", "custom"];
pub const PROFILE_THEMES: [&str; 3] = ["pastel", "gruvbox", "catppuccin"];
pub const PROFILE_MOODS: [&str; 3] = ["focus", "cozy", "zen"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    pub mode: String,
    pub theme: Option<String>,
    pub mood: Option<String>,
    pub font_scale: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProfile {
    pub name: String,
    pub mode: String,
    pub theme: String,
    pub mood: String,
    pub font_scale: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub mode: Option<String>,
    pub theme: Option<String>,
    pub mood: Option<String>,
    pub font_scale: Option<f64>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.mode.is_none()
            && self.theme.is_none()
            && self.mood.is_none()
            && self.font_scale.is_none()
    }
}

/// Result of a delete request; the guard rules live in the repository so they
/// are checked on the same connection that performs the delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileDeletion {
    Deleted,
    NotFound,
    LastProfile,
    ActiveProfile,
}
