//! Instruction prompt sent alongside the image.

use crate::config::Locale;

/// Fixed curator instruction requesting a strict JSON object.
pub const MOOD_PROMPT: &str = r#"You are a music curator. Look at this image and respond in JSON only, no markdown, with this exact structure:
{
  "mood": "short mood in 2-4 words (e.g. calm sunset, rainy cafe)",
  "genreHints": ["genre1", "genre2", "genre3"],
  "description": "One short sentence describing the scene/vibe for the user (same language as the user's likely locale - support Korean or English)"
}
Describe the mood, atmosphere, and suggest 2-3 music genres that would fit."#;

/// Builds the prompt, adding a language preference when one is known.
pub fn mood_prompt(locale: Option<Locale>) -> String {
    match locale {
        Some(Locale::Ko) => format!("{}\nWrite the description in Korean.", MOOD_PROMPT),
        Some(Locale::En) => format!("{}\nWrite the description in English.", MOOD_PROMPT),
        None => MOOD_PROMPT.to_string(),
    }
}
