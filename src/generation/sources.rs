//! Stage backends driven by the pipeline.
//!
//! Each stage is a trait so the pipeline can run in-process or against the
//! HTTP boundaries of another instance.

use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{RemoteMoodSource, RemoteTrackSource};
use crate::config::AppConfig;
use crate::error::Result;
use crate::extraction::MoodExtractor;
use crate::playlist::{PlaylistSelector, TrackPool};
use crate::types::{ImageInput, MoodAnalysis, PlaylistResult};

/// First stage: image to mood.
#[async_trait]
pub trait MoodSource: Send + Sync {
    async fn analyze(&self, image: &ImageInput) -> Result<MoodAnalysis>;
}

/// Second stage: mood to tracks.
#[async_trait]
pub trait TrackSource: Send + Sync {
    async fn select(&self, analysis: &MoodAnalysis) -> Result<PlaylistResult>;
}

/// In-process track selection. Never fails.
#[derive(Debug, Clone, Default)]
pub struct LocalTrackSource {
    selector: PlaylistSelector,
}

impl LocalTrackSource {
    pub fn new(selector: PlaylistSelector) -> Self {
        Self { selector }
    }

    pub fn selector(&self) -> &PlaylistSelector {
        &self.selector
    }
}

#[async_trait]
impl TrackSource for LocalTrackSource {
    async fn select(&self, analysis: &MoodAnalysis) -> Result<PlaylistResult> {
        Ok(self
            .selector
            .select_for_mood(Some(&analysis.mood), &analysis.genre_hints))
    }
}

/// Builds the stage sources for `config`.
///
/// With a remote URL both stages call that service; otherwise extraction
/// calls the vision service directly and selection runs in-process.
pub fn sources_from_config(config: &AppConfig) -> Result<(Arc<dyn MoodSource>, Arc<dyn TrackSource>)> {
    if let Some(ref url) = config.remote_url {
        tracing::info!(url = %url, "Using remote stage sources");
        let timeout = config.vision.timeout();
        return Ok((
            Arc::new(RemoteMoodSource::new(url, timeout)?),
            Arc::new(RemoteTrackSource::new(url, timeout)?),
        ));
    }

    let selector = PlaylistSelector::new(TrackPool::reference(), config.max_tracks)
        .with_seed_policy(config.seed_policy);
    Ok((
        Arc::new(MoodExtractor::from_config(&config.vision)?),
        Arc::new(LocalTrackSource::new(selector)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::SeedPolicy;

    #[tokio::test]
    async fn local_source_names_tracks_after_primary_genre() {
        let source = LocalTrackSource::default();
        let analysis = MoodAnalysis::new("rainy cafe", vec!["jazz".to_string()], "Rain.");

        let playlist = source.select(&analysis).await.unwrap();
        assert_eq!(playlist.len(), 8);
        assert_eq!(playlist.tracks()[7].id, "mock-jazz-7");
    }

    #[tokio::test]
    async fn sources_build_for_both_modes() {
        assert!(sources_from_config(&AppConfig::default()).is_ok());

        let remote = AppConfig {
            remote_url: Some("http://127.0.0.1:5780".to_string()),
            ..AppConfig::default()
        };
        assert!(sources_from_config(&remote).is_ok());
    }

    #[tokio::test]
    async fn local_source_honours_mood_seed() {
        let selector = PlaylistSelector::new(TrackPool::reference(), 5)
            .with_seed_policy(SeedPolicy::FromMood);
        let source = LocalTrackSource::new(selector);
        let analysis = MoodAnalysis::new("neon night", vec!["synthwave".to_string()], "Lights.");

        let first = source.select(&analysis).await.unwrap();
        let second = source.select(&analysis).await.unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(first, second);
    }
}
