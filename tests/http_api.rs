//! Integration tests for the HTTP boundaries.
//!
//! Covers `/api/analyze-image`, `/api/playlist` and `/health` through the
//! router, then runs the remote stage sources against a served instance.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use photo_playlist::api::{build_router, AppState, RemoteMoodSource, RemoteTrackSource};
use photo_playlist::error::ErrorCode;
use photo_playlist::extraction::MoodExtractor;
use photo_playlist::generation::{GenerationPipeline, MoodSource, Stage, TrackSource};
use photo_playlist::playlist::PlaylistSelector;
use photo_playlist::types::{ImageInput, MoodAnalysis};

use common::{sunset_answer, sunset_image, FakeVision};

fn router_for(vision: &FakeVision, with_key: bool) -> Router {
    let mut config = vision.config();
    if !with_key {
        config.api_key = None;
    }
    let extractor = MoodExtractor::from_config(&config).unwrap();
    let state = AppState::new(Arc::new(extractor), PlaylistSelector::default(), with_key);
    build_router(state)
}

/// Sends a request and returns the status and JSON body.
async fn make_request(app: &Router, method: Method, path: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(path);
    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    let request = request
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn analyze_returns_mood_analysis() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    let app = router_for(&vision, true);
    let body = json!({ "imageBase64": sunset_image().to_base64(), "mimeType": "image/jpeg" }).to_string();

    let (status, json) = make_request(&app, Method::POST, "/api/analyze-image", Some(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mood"], "calm sunset");
    assert_eq!(json["genreHints"], json!(["ambient", "chillwave"]));
    assert_eq!(json["description"], "Warm light fading over still water.");
    assert_eq!(vision.calls(), 1);
}

#[tokio::test]
async fn analyze_accepts_data_urls() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    let app = router_for(&vision, true);
    let payload = format!("data:image/jpeg;base64,{}", sunset_image().to_base64());
    let body = json!({ "imageBase64": payload }).to_string();

    let (status, _) = make_request(&app, Method::POST, "/api/analyze-image", Some(&body)).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn analyze_without_image_is_bad_request() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    // The payload check comes before the credential check.
    let app = router_for(&vision, false);

    let (status, json) = make_request(&app, Method::POST, "/api/analyze-image", Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json, json!({ "error": "imageBase64 is required" }));

    let (status, _) =
        make_request(&app, Method::POST, "/api/analyze-image", Some(r#"{"imageBase64":"  "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(vision.calls(), 0);
}

#[tokio::test]
async fn analyze_without_key_is_server_error() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    let app = router_for(&vision, false);
    let body = json!({ "imageBase64": sunset_image().to_base64() }).to_string();

    let (status, json) = make_request(&app, Method::POST, "/api/analyze-image", Some(&body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("API key"));
    assert_eq!(vision.calls(), 0);
}

#[tokio::test]
async fn analyze_upstream_failure_is_server_error() {
    let vision = FakeVision::failing(StatusCode::FORBIDDEN, "API key not valid").await;
    let app = router_for(&vision, true);
    let body = json!({ "imageBase64": sunset_image().to_base64() }).to_string();

    let (status, json) = make_request(&app, Method::POST, "/api/analyze-image", Some(&body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("API key not valid"));
}

#[tokio::test]
async fn malformed_json_is_server_error() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    let app = router_for(&vision, true);

    let (status, json) = make_request(&app, Method::POST, "/api/analyze-image", Some("{not json")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].is_string());

    let (status, _) = make_request(&app, Method::POST, "/api/playlist", Some("[1,")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn playlist_draws_from_primary_genre() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    let app = router_for(&vision, true);
    let body = json!({ "mood": "calm sunset", "genreHints": ["ambient", "chillwave"] }).to_string();

    let (status, json) = make_request(&app, Method::POST, "/api/playlist", Some(&body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mood"], "calm sunset");
    assert_eq!(json["genreHints"], json!(["ambient", "chillwave"]));
    let tracks = json["tracks"].as_array().unwrap();
    assert_eq!(tracks.len(), 8);
    for (i, track) in tracks.iter().enumerate() {
        assert_eq!(track["id"], format!("mock-ambient-{}", i));
        assert!(track["previewUrl"].is_null());
        assert!(track["name"].is_string());
        assert!(track["artist"].is_string());
    }
}

#[tokio::test]
async fn playlist_defaults_missing_fields() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    let app = router_for(&vision, true);

    let (status, json) = make_request(&app, Method::POST, "/api/playlist", Some("{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mood"], "chill");
    assert_eq!(json["genreHints"], json!(["ambient", "indie", "chill"]));

    let (_, json) =
        make_request(&app, Method::POST, "/api/playlist", Some(r#"{"genreHints":"jazz"}"#)).await;
    assert_eq!(json["genreHints"], json!(["ambient", "indie", "chill"]));
    assert_eq!(json["tracks"][0]["id"], "mock-ambient-0");
}

#[tokio::test]
async fn health_reports_vision_configuration() {
    let vision = FakeVision::replying(&sunset_answer()).await;

    let (status, json) = make_request(&router_for(&vision, true), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "photo-playlist");
    assert_eq!(json["vision_configured"], true);

    let (_, json) = make_request(&router_for(&vision, false), Method::GET, "/health", None).await;
    assert_eq!(json["vision_configured"], false);
}

#[tokio::test]
async fn remote_sources_drive_a_pipeline() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    let addr = common::serve(router_for(&vision, true)).await;
    let base = format!("http://{}/", addr);

    let mood = Arc::new(RemoteMoodSource::new(&base, Duration::from_secs(5)).unwrap());
    let tracks = Arc::new(RemoteTrackSource::new(&base, Duration::from_secs(5)).unwrap());
    let pipeline = GenerationPipeline::spawn(mood, tracks);

    let state = pipeline.run(sunset_image()).await.unwrap();

    assert_eq!(state.stage(), Stage::Ready);
    assert_eq!(state.analysis().unwrap().mood, "calm sunset");
    let playlist = state.playlist().unwrap();
    assert_eq!(playlist.len(), 8);
    assert_eq!(playlist.tracks()[0].id, "mock-ambient-0");
}

#[tokio::test]
async fn remote_mood_source_maps_errors() {
    let vision = FakeVision::failing(StatusCode::INTERNAL_SERVER_ERROR, "backend overloaded").await;
    let addr = common::serve(router_for(&vision, true)).await;
    let source = RemoteMoodSource::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();

    let err = source.analyze(&sunset_image()).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ServiceError);
    assert!(err.message.contains("backend overloaded"), "{}", err.message);

    let err = source.analyze(&ImageInput::new(Vec::new(), "image/jpeg")).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidInput);
}

#[tokio::test]
async fn unreachable_remote_fails_selection_after_analysis() {
    let vision = FakeVision::replying(&sunset_answer()).await;
    let addr = common::serve(router_for(&vision, true)).await;

    // Bind and drop a listener to get a port nothing listens on.
    let dead = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };

    let mood = Arc::new(RemoteMoodSource::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap());
    let tracks = RemoteTrackSource::new(&format!("http://{}", dead), Duration::from_secs(2)).unwrap();

    let analysis = MoodAnalysis::new("calm sunset", vec!["ambient".to_string()], "Warm.");
    let err = tracks.select(&analysis).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::ServiceError);
    assert!(err.message.starts_with("Playlist failed"), "{}", err.message);

    let pipeline = GenerationPipeline::spawn(mood, Arc::new(tracks));
    let mut transitions = pipeline.subscribe();
    let state = pipeline.run(sunset_image()).await.unwrap();

    assert_eq!(state.failure().map(|f| f.code), Some(ErrorCode::ServiceError));
    let mut stages = Vec::new();
    while let Ok(s) = transitions.try_recv() {
        stages.push(s.stage());
    }
    assert_eq!(stages, vec![Stage::Analyzing, Stage::Generating, Stage::Failed]);
}
