//! Playlist selection.
//!
//! Provides the reference track pool and the selector that draws a
//! bounded, shuffled playlist from it.

pub mod pool;
pub mod selector;

// Re-export commonly used types
pub use pool::{PoolEntry, TrackPool, REFERENCE_TRACKS};
pub use selector::{
    effective_hints, seed_for_mood, PlaylistSelector, SeedPolicy, DEFAULT_SELECTION_HINTS,
};
