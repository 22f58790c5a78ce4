//! MoodAnalysis type produced by the mood extractor.

use serde::{Deserialize, Serialize};

/// Mood used when the vision response carries none.
pub const DEFAULT_MOOD: &str = "chill";

/// Genre hints used when the vision response carries no usable list.
pub const DEFAULT_GENRE_HINTS: [&str; 2] = ["ambient", "indie"];

/// Description used when the vision response carries none.
pub const DEFAULT_DESCRIPTION: &str = "Perfect for this moment.";

/// Normalized mood/genre/description record for one image.
///
/// Immutable once produced. `mood` and `description` are never empty and
/// `genre_hints` always holds at least one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodAnalysis {
    /// Short mood phrase, typically 2-4 words (e.g. "calm sunset").
    pub mood: String,
    /// Ordered genre hints; the first one names the generated track ids.
    pub genre_hints: Vec<String>,
    /// One sentence describing the scene for the user.
    pub description: String,
}

impl MoodAnalysis {
    /// Builds an analysis, substituting defaults for any blank field.
    pub fn new(mood: impl Into<String>, genre_hints: Vec<String>, description: impl Into<String>) -> Self {
        let mood = mood.into();
        let description = description.into();
        let genre_hints: Vec<String> = genre_hints
            .into_iter()
            .map(|hint| hint.trim().to_string())
            .filter(|hint| !hint.is_empty())
            .collect();

        Self {
            mood: non_blank_or(mood, DEFAULT_MOOD),
            genre_hints: if genre_hints.is_empty() {
                default_genre_hints()
            } else {
                genre_hints
            },
            description: non_blank_or(description, DEFAULT_DESCRIPTION),
        }
    }

    /// Returns the all-default analysis with the given description.
    pub fn fallback(description: impl Into<String>) -> Self {
        Self::new(DEFAULT_MOOD, default_genre_hints(), description)
    }

    /// Returns the first genre hint.
    pub fn primary_genre(&self) -> &str {
        self.genre_hints
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_GENRE_HINTS[0])
    }

    /// Returns true if the non-empty invariants hold.
    pub fn is_well_formed(&self) -> bool {
        !self.mood.trim().is_empty()
            && !self.description.trim().is_empty()
            && !self.genre_hints.is_empty()
            && self.genre_hints.iter().all(|h| !h.trim().is_empty())
    }
}

/// Returns the default genre hints as owned strings.
pub fn default_genre_hints() -> Vec<String> {
    DEFAULT_GENRE_HINTS.iter().map(|s| s.to_string()).collect()
}

fn non_blank_or(value: String, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}
