//! Track and PlaylistResult types.
//!
//! A Track is one entry of a generated playlist. Track ids are only unique
//! within one result: they embed the run's primary genre and the track's
//! position in the output.

use serde::{Deserialize, Serialize};

/// Upper bound on the number of tracks in a playlist.
pub const MAX_PLAYLIST_TRACKS: usize = 8;

/// A selected track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// `mock-{primary genre}-{position}`, unique within one result.
    pub id: String,

    /// Track title.
    pub name: String,

    /// Performing artist.
    pub artist: String,

    /// Album title, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,

    /// Preview audio URL. Always serialized; `null` for pool tracks.
    #[serde(default)]
    pub preview_url: Option<String>,
}

/// Computes the id of the track at `position` of a selection run.
pub fn compute_track_id(primary_genre: &str, position: usize) -> String {
    format!("mock-{}-{}", primary_genre, position)
}

/// Ordered tracks of one finished selection, at most [`MAX_PLAYLIST_TRACKS`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistResult(Vec<Track>);

impl PlaylistResult {
    /// Wraps a track list, truncating it to [`MAX_PLAYLIST_TRACKS`].
    pub fn new(mut tracks: Vec<Track>) -> Self {
        tracks.truncate(MAX_PLAYLIST_TRACKS);
        Self(tracks)
    }

    /// Returns the tracks in order.
    pub fn tracks(&self) -> &[Track] {
        &self.0
    }

    /// Returns the number of tracks.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the result holds no tracks.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the result, returning its tracks.
    pub fn into_tracks(self) -> Vec<Track> {
        self.0
    }

    /// Validates that track ids are unique within the result.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        let mut seen = std::collections::HashSet::new();
        for track in &self.0 {
            if !seen.insert(track.id.as_str()) {
                return Some(format!("Duplicate track id: {}", track.id));
            }
        }
        None
    }
}
