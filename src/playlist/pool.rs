//! Reference track pool.
//!
//! Stands in for a real catalog search: a fixed list of candidate tracks
//! that the selector shuffles from.

/// A candidate track in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolEntry {
    pub name: &'static str,
    pub artist: &'static str,
    pub album: Option<&'static str>,
}

const fn entry(name: &'static str, artist: &'static str, album: &'static str) -> PoolEntry {
    PoolEntry {
        name,
        artist,
        album: Some(album),
    }
}

/// The built-in reference catalog.
pub const REFERENCE_TRACKS: [PoolEntry; 12] = [
    entry("Blinding Lights", "The Weeknd", "After Hours"),
    entry("Shape of You", "Ed Sheeran", "÷"),
    entry("Someone Like You", "Adele", "21"),
    entry("Levitating", "Dua Lipa", "Future Nostalgia"),
    entry("Starboy", "The Weeknd", "Starboy"),
    entry("Watermelon Sugar", "Harry Styles", "Fine Line"),
    entry("Drivers License", "Olivia Rodrigo", "SOUR"),
    entry("Good 4 U", "Olivia Rodrigo", "SOUR"),
    entry("Heat Waves", "Glass Animals", "Dreamland"),
    entry("As It Was", "Harry Styles", "Harry's House"),
    entry("Flowers", "Miley Cyrus", "Endless Summer Vacation"),
    entry("Anti-Hero", "Taylor Swift", "Midnights"),
];

/// Read-only pool of candidate tracks.
#[derive(Debug, Clone, Copy)]
pub struct TrackPool {
    entries: &'static [PoolEntry],
}

impl TrackPool {
    /// Returns the built-in reference pool.
    pub fn reference() -> Self {
        Self {
            entries: &REFERENCE_TRACKS,
        }
    }

    /// Creates a pool over a custom static list.
    pub fn from_static(entries: &'static [PoolEntry]) -> Self {
        Self { entries }
    }

    /// Returns all entries in catalog order.
    pub fn entries(&self) -> &'static [PoolEntry] {
        self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the pool holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TrackPool {
    fn default() -> Self {
        Self::reference()
    }
}
