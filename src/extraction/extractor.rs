//! Mood extraction stage.
//!
//! Validates the image, checks the injected credentials, asks the vision
//! service for a mood description and normalizes the reply.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{Locale, VisionConfig};
use crate::error::{PipelineError, Result};
use crate::generation::MoodSource;
use crate::types::{ImageInput, MoodAnalysis};

use super::parse::parse_mood_response;
use super::prompt::mood_prompt;
use super::vision::{GeminiClient, VisionClient};

/// Extracts a [`MoodAnalysis`] from an image via a vision service.
#[derive(Clone)]
pub struct MoodExtractor {
    client: Arc<dyn VisionClient>,
    api_key: Option<String>,
    locale: Option<Locale>,
}

impl MoodExtractor {
    /// Creates an extractor talking to Gemini with the given settings.
    pub fn from_config(config: &VisionConfig) -> Result<Self> {
        let client = GeminiClient::new(config)?;
        Ok(Self::with_client(Arc::new(client), config.api_key.clone()).with_locale(config.locale))
    }

    /// Creates an extractor over any vision client.
    pub fn with_client(client: Arc<dyn VisionClient>, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            locale: None,
        }
    }

    /// Sets the preferred description language.
    pub fn with_locale(mut self, locale: Option<Locale>) -> Self {
        self.locale = locale;
        self
    }

    /// Returns true if credentials were injected.
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    /// Extracts the mood of `image`.
    ///
    /// Fails with `InvalidInput` for an empty payload (before any network
    /// call), `ConfigurationError` without credentials and `ServiceError`
    /// when the upstream call fails. A malformed reply is not an error.
    pub async fn extract(&self, image: &ImageInput) -> Result<MoodAnalysis> {
        image.validate()?;

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(PipelineError::missing_credentials)?;

        let prompt = mood_prompt(self.locale);
        let raw = self.client.generate(api_key, image, &prompt).await?;
        let analysis = parse_mood_response(&raw);

        tracing::info!(
            mood = %analysis.mood,
            genre_hints = ?analysis.genre_hints,
            "Mood extracted"
        );

        Ok(analysis)
    }
}

#[async_trait]
impl MoodSource for MoodExtractor {
    async fn analyze(&self, image: &ImageInput) -> Result<MoodAnalysis> {
        self.extract(image).await
    }
}
