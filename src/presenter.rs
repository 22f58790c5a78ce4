//! Result presentation.
//!
//! Builds the shareable playlist card from a `Ready` state and exposes the
//! play/export actions the surrounding UI triggers.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::generation::PipelineState;
use crate::types::{ImagePreview, Track, MAX_PLAYLIST_TRACKS};

/// File name of the exported card data.
pub const CARD_JSON_FILE: &str = "playlist.json";

/// File name of the exported plain-text card.
pub const CARD_TEXT_FILE: &str = "playlist.txt";

/// One numbered line of a playlist card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardEntry {
    /// Position in the card, starting at 1.
    pub number: usize,
    #[serde(flatten)]
    pub track: Track,
}

/// Rendered result of a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistCard {
    pub preview: ImagePreview,
    pub mood: String,
    pub description: String,
    pub genre_hints: Vec<String>,
    pub entries: Vec<CardEntry>,
}

impl PlaylistCard {
    /// Renders the card as plain text.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        writeln!(out, "{}", self.mood).ok();
        writeln!(out, "{}", self.description).ok();
        writeln!(out).ok();
        for entry in &self.entries {
            write!(out, "{}. {} - {}", entry.number, entry.track.name, entry.track.artist).ok();
            if let Some(album) = &entry.track.album {
                write!(out, " ({})", album).ok();
            }
            writeln!(out).ok();
        }
        out
    }
}

/// Builds cards from pipeline states.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultPresenter;

impl ResultPresenter {
    /// Returns the card for a `Ready` state, None for any other state.
    pub fn card(state: &PipelineState) -> Option<PlaylistCard> {
        let PipelineState::Ready {
            preview,
            analysis,
            playlist,
        } = state
        else {
            return None;
        };

        let entries = playlist
            .tracks()
            .iter()
            .take(MAX_PLAYLIST_TRACKS)
            .enumerate()
            .map(|(i, track)| CardEntry {
                number: i + 1,
                track: track.clone(),
            })
            .collect();

        Some(PlaylistCard {
            preview: preview.clone(),
            mood: analysis.mood.clone(),
            description: analysis.description.clone(),
            genre_hints: analysis.genre_hints.clone(),
            entries,
        })
    }

    /// Like [`card`](Self::card) but fails with `NoResult` outside `Ready`.
    pub fn require_card(state: &PipelineState) -> Result<PlaylistCard> {
        Self::card(state).ok_or_else(PipelineError::no_result)
    }
}

/// What a play request resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PlayOutcome {
    /// Preview audio exists for this track.
    Preview {
        #[serde(rename = "trackId")]
        track_id: String,
        url: String,
    },
    /// No track on the card has preview audio.
    Unavailable { message: String },
}

/// Paths written by an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedCard {
    pub json_path: PathBuf,
    pub text_path: PathBuf,
}

/// Side-effecting actions offered on a finished card.
pub trait CardActions: Send + Sync {
    fn play(&self, card: &PlaylistCard) -> PlayOutcome;
    fn export(&self, card: &PlaylistCard, dir: &Path) -> Result<ExportedCard>;
}

/// Plays preview URLs when present and exports cards to disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCardActions;

impl CardActions for FileCardActions {
    fn play(&self, card: &PlaylistCard) -> PlayOutcome {
        card.entries
            .iter()
            .find_map(|entry| {
                entry.track.preview_url.as_ref().map(|url| PlayOutcome::Preview {
                    track_id: entry.track.id.clone(),
                    url: url.clone(),
                })
            })
            .unwrap_or_else(|| PlayOutcome::Unavailable {
                message: "No preview audio is available for this playlist".to_string(),
            })
    }

    fn export(&self, card: &PlaylistCard, dir: &Path) -> Result<ExportedCard> {
        fs::create_dir_all(dir)
            .map_err(|e| PipelineError::export_failed(format!("{}: {}", dir.display(), e)))?;

        let json = serde_json::to_string_pretty(card)
            .map_err(|e| PipelineError::export_failed(e.to_string()))?;
        let json_path = dir.join(CARD_JSON_FILE);
        fs::write(&json_path, json)
            .map_err(|e| PipelineError::export_failed(format!("{}: {}", json_path.display(), e)))?;

        let text_path = dir.join(CARD_TEXT_FILE);
        fs::write(&text_path, card.render_text())
            .map_err(|e| PipelineError::export_failed(format!("{}: {}", text_path.display(), e)))?;

        tracing::info!(dir = %dir.display(), tracks = card.entries.len(), "Exported playlist card");

        Ok(ExportedCard {
            json_path,
            text_path,
        })
    }
}
