//! Track selection from the reference pool.
//!
//! Shuffles the whole pool uniformly and keeps a prefix of at most the
//! configured maximum, naming every track after the primary genre hint.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::types::{compute_track_id, PlaylistResult, Track, MAX_PLAYLIST_TRACKS};

use super::pool::TrackPool;

/// Hints substituted when the caller passes none.
pub const DEFAULT_SELECTION_HINTS: [&str; 3] = ["ambient", "indie", "chill"];

/// Source of randomness for the shuffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Fresh thread-local randomness on every call.
    #[default]
    Random,
    /// Seed derived from the mood string; the same mood yields the same order.
    FromMood,
}

/// Selects a bounded, shuffled subset of the track pool.
#[derive(Debug, Clone)]
pub struct PlaylistSelector {
    pool: TrackPool,
    max_tracks: usize,
    seed_policy: SeedPolicy,
}

impl PlaylistSelector {
    /// Creates a selector over `pool` returning at most `max_tracks` tracks.
    ///
    /// `max_tracks` is clamped to `1..=MAX_PLAYLIST_TRACKS`.
    pub fn new(pool: TrackPool, max_tracks: usize) -> Self {
        Self {
            pool,
            max_tracks: max_tracks.clamp(1, MAX_PLAYLIST_TRACKS),
            seed_policy: SeedPolicy::Random,
        }
    }

    /// Sets the seed policy.
    pub fn with_seed_policy(mut self, seed_policy: SeedPolicy) -> Self {
        self.seed_policy = seed_policy;
        self
    }

    /// Returns the configured maximum.
    pub fn max_tracks(&self) -> usize {
        self.max_tracks
    }

    /// Returns the configured seed policy.
    pub fn seed_policy(&self) -> SeedPolicy {
        self.seed_policy
    }

    /// Returns the number of tracks every selection produces.
    pub fn result_len(&self) -> usize {
        self.max_tracks.min(self.pool.len())
    }

    /// Selects tracks using fresh randomness.
    pub fn select(&self, genre_hints: &[String]) -> PlaylistResult {
        self.select_with_rng(genre_hints, &mut rand::thread_rng())
    }

    /// Selects tracks honouring the seed policy for the given mood.
    pub fn select_for_mood(&self, mood: Option<&str>, genre_hints: &[String]) -> PlaylistResult {
        match (self.seed_policy, mood) {
            (SeedPolicy::FromMood, Some(mood)) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed_for_mood(mood));
                self.select_with_rng(genre_hints, &mut rng)
            }
            _ => self.select(genre_hints),
        }
    }

    /// Selects tracks with an explicit randomness source.
    pub fn select_with_rng<R: Rng + ?Sized>(&self, genre_hints: &[String], rng: &mut R) -> PlaylistResult {
        let hints = effective_hints(genre_hints);
        let primary = hints[0].as_str();

        let mut order: Vec<usize> = (0..self.pool.len()).collect();
        order.shuffle(rng);

        let entries = self.pool.entries();
        let tracks = order
            .into_iter()
            .take(self.result_len())
            .enumerate()
            .map(|(position, index)| {
                let entry = &entries[index];
                Track {
                    id: compute_track_id(primary, position),
                    name: entry.name.to_string(),
                    artist: entry.artist.to_string(),
                    album: entry.album.map(str::to_string),
                    preview_url: None,
                }
            })
            .collect();

        tracing::debug!(
            primary_genre = primary,
            pool_size = self.pool.len(),
            max_tracks = self.max_tracks,
            "Selected tracks from pool"
        );

        PlaylistResult::new(tracks)
    }
}

impl Default for PlaylistSelector {
    fn default() -> Self {
        Self::new(TrackPool::reference(), MAX_PLAYLIST_TRACKS)
    }
}

/// Returns the hints selection actually runs with.
///
/// An empty list becomes [`DEFAULT_SELECTION_HINTS`].
pub fn effective_hints(genre_hints: &[String]) -> Vec<String> {
    if genre_hints.is_empty() {
        DEFAULT_SELECTION_HINTS.iter().map(|s| s.to_string()).collect()
    } else {
        genre_hints.to_vec()
    }
}

/// Derives a shuffle seed from a mood string.
///
/// Case and surrounding whitespace are ignored.
pub fn seed_for_mood(mood: &str) -> u64 {
    let normalized = mood.trim().to_lowercase();
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
