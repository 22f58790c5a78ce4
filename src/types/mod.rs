//! Core types for the photo-playlist daemon.
//!
//! This module re-exports all the core data types used throughout the daemon:
//! - [`ImageInput`]: The image payload selected by the user
//! - [`MoodAnalysis`]: Mood, genre hints and description extracted from an image
//! - [`Track`] / [`PlaylistResult`]: The selected playlist

mod analysis;
mod image;
mod track;

pub use analysis::{
    default_genre_hints, MoodAnalysis, DEFAULT_DESCRIPTION, DEFAULT_GENRE_HINTS, DEFAULT_MOOD,
};
pub use image::{compute_preview_reference, ImageInput, ImagePreview, DEFAULT_MIME_TYPE};
pub use track::{compute_track_id, PlaylistResult, Track, MAX_PLAYLIST_TRACKS};
