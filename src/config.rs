//! Daemon configuration module.
//!
//! Contains the runtime configuration for the photo-playlist daemon:
//! vision service credentials and endpoint, selection limits, the HTTP bind
//! address and the remote-boundary switch.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::playlist::SeedPolicy;
use crate::types::MAX_PLAYLIST_TRACKS;

/// Default Gemini model used for mood extraction.
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.0-flash";

/// Default Gemini REST endpoint.
pub const DEFAULT_VISION_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default vision request timeout in seconds.
pub const DEFAULT_VISION_TIMEOUT_SECS: u64 = 30;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5780";

/// Language the description should be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ko,
    En,
}

impl Locale {
    /// Returns the string representation of the locale.
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ko => "ko",
            Locale::En => "en",
        }
    }

    /// Parses a locale from a string such as `ko`, `en-US` or `korean`.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        let primary = lower.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "ko" | "kr" | "korean" => Some(Locale::Ko),
            "en" | "english" => Some(Locale::En),
            _ => None,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Vision service settings injected into the mood extractor.
#[derive(Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// API key for the vision service. None means extraction is misconfigured.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Model identifier, e.g. "gemini-2.0-flash".
    pub model: String,

    /// Base URL of the generateContent REST API.
    pub endpoint: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Preferred description language, if any.
    pub locale: Option<Locale>,
}

impl VisionConfig {
    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns true if an API key is present.
    pub fn has_credentials(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_VISION_MODEL.to_string(),
            endpoint: DEFAULT_VISION_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_VISION_TIMEOUT_SECS,
            locale: None,
        }
    }
}

impl std::fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("locale", &self.locale)
            .finish()
    }
}

/// Runtime configuration for the daemon.
///
/// This configuration is typically loaded from environment variables at
/// startup and then overridden by command-line arguments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Vision service settings.
    pub vision: VisionConfig,

    /// Maximum number of tracks per playlist (1-8).
    pub max_tracks: usize,

    /// Shuffle seed policy for track selection.
    pub seed_policy: SeedPolicy,

    /// Address the HTTP service binds to.
    pub bind_addr: SocketAddr,

    /// Base URL of a remote photo-playlist HTTP service. When set, the
    /// pipeline calls the remote boundaries instead of running the stages
    /// in-process.
    pub remote_url: Option<String>,

    /// Directory for exported playlist cards.
    /// If None, uses the platform-specific default cache location.
    pub export_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Creates a new AppConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an AppConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `GEMINI_API_KEY` - Vision API key (falls back to `CURSOR_API_KEY`)
    /// - `PLAYLIST_VISION_MODEL` - Vision model identifier
    /// - `PLAYLIST_VISION_ENDPOINT` - Vision REST base URL
    /// - `PLAYLIST_VISION_TIMEOUT_SECS` - Request timeout (1-300)
    /// - `PLAYLIST_LOCALE` - Description language (ko, en)
    /// - `PLAYLIST_MAX_TRACKS` - Tracks per playlist (1-8)
    /// - `PLAYLIST_SEED_FROM_MOOD` - Reproducible selection per mood (true/false)
    /// - `PLAYLIST_BIND` - HTTP bind address
    /// - `PLAYLIST_REMOTE_URL` - Remote service base URL
    /// - `PLAYLIST_EXPORT_DIR` - Export directory for playlist cards
    ///
    /// Falls back to defaults for unset or invalid variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.vision.api_key = lookup("GEMINI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .or_else(|| lookup("CURSOR_API_KEY").filter(|k| !k.trim().is_empty()));

        if let Some(model) = lookup("PLAYLIST_VISION_MODEL") {
            if !model.trim().is_empty() {
                config.vision.model = model.trim().to_string();
            }
        }

        if let Some(endpoint) = lookup("PLAYLIST_VISION_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                config.vision.endpoint = endpoint.trim().trim_end_matches('/').to_string();
            }
        }

        if let Some(timeout_str) = lookup("PLAYLIST_VISION_TIMEOUT_SECS") {
            if let Ok(timeout) = timeout_str.trim().parse::<u64>() {
                if (1..=300).contains(&timeout) {
                    config.vision.timeout_secs = timeout;
                }
            }
        }

        if let Some(locale_str) = lookup("PLAYLIST_LOCALE") {
            config.vision.locale = Locale::parse(&locale_str);
        }

        if let Some(max_str) = lookup("PLAYLIST_MAX_TRACKS") {
            if let Ok(max) = max_str.trim().parse::<usize>() {
                if (1..=MAX_PLAYLIST_TRACKS).contains(&max) {
                    config.max_tracks = max;
                }
            }
        }

        if let Some(flag) = lookup("PLAYLIST_SEED_FROM_MOOD") {
            if parse_flag(&flag) {
                config.seed_policy = SeedPolicy::FromMood;
            }
        }

        if let Some(bind) = lookup("PLAYLIST_BIND") {
            if let Ok(addr) = bind.trim().parse::<SocketAddr>() {
                config.bind_addr = addr;
            }
        }

        if let Some(url) = lookup("PLAYLIST_REMOTE_URL") {
            if !url.trim().is_empty() {
                config.remote_url = Some(url.trim().trim_end_matches('/').to_string());
            }
        }

        if let Some(dir) = lookup("PLAYLIST_EXPORT_DIR") {
            if !dir.trim().is_empty() {
                config.export_dir = Some(PathBuf::from(dir));
            }
        }

        config
    }

    /// Returns the effective export directory, using platform defaults if not specified.
    pub fn effective_export_dir(&self) -> PathBuf {
        if let Some(ref path) = self.export_dir {
            path.clone()
        } else {
            default_export_dir()
        }
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    /// A missing API key is not a validation failure: it surfaces per
    /// request as a configuration error.
    pub fn validate(&self) -> Option<String> {
        if !(1..=MAX_PLAYLIST_TRACKS).contains(&self.max_tracks) {
            return Some(format!(
                "max_tracks must be between 1 and {}, got {}",
                MAX_PLAYLIST_TRACKS, self.max_tracks
            ));
        }

        if self.vision.timeout_secs == 0 || self.vision.timeout_secs > 300 {
            return Some(format!(
                "vision timeout must be between 1 and 300 seconds, got {}",
                self.vision.timeout_secs
            ));
        }

        if self.vision.model.trim().is_empty() {
            return Some("vision model cannot be empty".to_string());
        }

        if let Some(ref url) = self.remote_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Some(format!("remote url must be http(s): {}", url));
            }
        }

        None
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vision: VisionConfig::default(),
            max_tracks: MAX_PLAYLIST_TRACKS,
            seed_policy: SeedPolicy::Random,
            bind_addr: DEFAULT_BIND_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 5780))),
            remote_url: None,
            export_dir: None,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Returns the platform-specific default export path.
///
/// Uses the `directories` crate to find appropriate locations:
/// - macOS: ~/Library/Caches/photo-playlist/cards
/// - Linux: ~/.cache/photo-playlist/cards
/// - Windows: C:\Users\<user>\AppData\Local\photo-playlist\cache\cards
fn default_export_dir() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "photo-playlist") {
        proj_dirs.cache_dir().join("cards")
    } else {
        // Fallback to current directory
        PathBuf::from("./cards")
    }
}
