//! End-to-end pipeline runs against a local vision service.
//!
//! Each test drives one photo from `Idle` to a settled state with the real
//! Gemini client and the reference track pool.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;

use photo_playlist::error::{ErrorCode, Result};
use photo_playlist::extraction::MoodExtractor;
use photo_playlist::generation::{GenerationPipeline, LocalTrackSource, PipelineState, Stage, TrackSource};
use photo_playlist::presenter::ResultPresenter;
use photo_playlist::types::{ImageInput, MoodAnalysis, PlaylistResult};

use common::{sunset_answer, sunset_image, FakeVision, TEST_API_KEY};

/// Local selection that counts how often it runs.
#[derive(Default)]
struct CountingTracks {
    inner: LocalTrackSource,
    calls: AtomicUsize,
}

#[async_trait]
impl TrackSource for CountingTracks {
    async fn select(&self, analysis: &MoodAnalysis) -> Result<PlaylistResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.select(analysis).await
    }
}

fn pipeline_for(vision: &FakeVision) -> (GenerationPipeline, Arc<CountingTracks>) {
    let extractor = MoodExtractor::from_config(&vision.config()).unwrap();
    let tracks = Arc::new(CountingTracks::default());
    let pipeline = GenerationPipeline::spawn(Arc::new(extractor), tracks.clone());
    (pipeline, tracks)
}

fn stages(rx: &mut tokio::sync::broadcast::Receiver<PipelineState>) -> Vec<Stage> {
    let mut seen = Vec::new();
    while let Ok(state) = rx.try_recv() {
        seen.push(state.stage());
    }
    seen
}

#[tokio::test]
async fn sunset_photo_becomes_ambient_playlist() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    let (pipeline, tracks) = pipeline_for(&vision);
    let mut transitions = pipeline.subscribe();

    let state = pipeline.run(sunset_image()).await.unwrap();

    assert_eq!(state.stage(), Stage::Ready);
    assert_eq!(stages(&mut transitions), vec![Stage::Analyzing, Stage::Generating, Stage::Ready]);
    assert_eq!(vision.calls(), 1);
    assert_eq!(vision.last_key().as_deref(), Some(TEST_API_KEY));
    assert_eq!(tracks.calls.load(Ordering::SeqCst), 1);

    let analysis = state.analysis().unwrap();
    assert_eq!(analysis.mood, "calm sunset");
    assert_eq!(analysis.genre_hints, vec!["ambient", "chillwave"]);

    let playlist = state.playlist().unwrap();
    assert_eq!(playlist.len(), 8);
    for (i, track) in playlist.tracks().iter().enumerate() {
        assert_eq!(track.id, format!("mock-ambient-{}", i));
        assert!(track.preview_url.is_none());
    }

    let card = ResultPresenter::require_card(&state).unwrap();
    assert_eq!(card.mood, "calm sunset");
    assert_eq!(card.entries.len(), 8);
    assert!(card.render_text().contains("1. "));
}

#[tokio::test]
async fn upstream_error_fails_without_selection() {
    let vision = FakeVision::failing(StatusCode::INTERNAL_SERVER_ERROR, "backend overloaded").await;
    let (pipeline, tracks) = pipeline_for(&vision);
    let mut transitions = pipeline.subscribe();

    let state = pipeline.run(sunset_image()).await.unwrap();

    assert_eq!(stages(&mut transitions), vec![Stage::Analyzing, Stage::Failed]);
    let failure = state.failure().unwrap();
    assert_eq!(failure.code, ErrorCode::ServiceError);
    assert!(failure.message.contains("backend overloaded"), "{}", failure.message);
    assert_eq!(vision.calls(), 1);
    assert_eq!(tracks.calls.load(Ordering::SeqCst), 0);
    assert!(ResultPresenter::card(&state).is_none());
}

#[tokio::test]
async fn prose_answer_falls_back_and_still_completes() {
    let prose = "A quiet evening by the sea, soft and golden.";
    let vision = FakeVision::replying(prose).await;
    let (pipeline, _tracks) = pipeline_for(&vision);
    let mut transitions = pipeline.subscribe();

    let state = pipeline.run(sunset_image()).await.unwrap();

    assert_eq!(stages(&mut transitions), vec![Stage::Analyzing, Stage::Generating, Stage::Ready]);
    let analysis = state.analysis().unwrap();
    assert_eq!(analysis.mood, "chill");
    assert_eq!(analysis.genre_hints, vec!["ambient", "indie"]);
    assert_eq!(analysis.description, prose);
    assert_eq!(state.playlist().unwrap().tracks()[0].id, "mock-ambient-0");
}

#[tokio::test]
async fn empty_image_fails_before_any_network_call() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    let (pipeline, tracks) = pipeline_for(&vision);

    let state = pipeline.run(ImageInput::new(Vec::new(), "image/jpeg")).await.unwrap();

    assert_eq!(state.failure().map(|f| f.code), Some(ErrorCode::InvalidInput));
    assert_eq!(vision.calls(), 0);
    assert_eq!(tracks.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_run_can_be_retried_and_reset() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    let (pipeline, _tracks) = pipeline_for(&vision);

    let failed = pipeline.run(ImageInput::new(Vec::new(), "image/jpeg")).await.unwrap();
    assert_eq!(failed.stage(), Stage::Failed);

    let ready = pipeline.run(sunset_image()).await.unwrap();
    assert_eq!(ready.stage(), Stage::Ready);

    // A ready pipeline ignores new photos until it is reset.
    assert!(!pipeline.select_image(sunset_image()).await.unwrap());
    assert_eq!(pipeline.state().stage(), Stage::Ready);

    pipeline.reset().await.unwrap();
    assert_eq!(pipeline.state(), PipelineState::Idle);
    assert_eq!(vision.calls(), 1);
}

#[tokio::test]
async fn missing_key_is_a_configuration_error() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    let mut config = vision.config();
    config.api_key = None;
    let extractor = MoodExtractor::from_config(&config).unwrap();
    let pipeline = GenerationPipeline::spawn(Arc::new(extractor), Arc::new(LocalTrackSource::default()));

    let state = pipeline.run(sunset_image()).await.unwrap();

    assert_eq!(state.failure().map(|f| f.code), Some(ErrorCode::ConfigurationError));
    assert_eq!(vision.calls(), 0);
}
