//! Command-line interface.
//!
//! Selects one of three modes: a one-shot run on a single image, the HTTP
//! service, or the JSON-RPC daemon. Flags override the environment
//! configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{AppConfig, Locale};
use crate::playlist::SeedPolicy;
use crate::types::MAX_PLAYLIST_TRACKS;

/// photo-playlist: turn a photo into a themed playlist
#[derive(Parser, Debug)]
#[command(name = "photo-playlist")]
#[command(about = "Turns a photo into a mood-matched playlist card")]
#[command(version)]
pub struct Cli {
    /// Image file to turn into a playlist (one-shot mode)
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Directory to export the resulting card into (one-shot mode)
    #[arg(short, long, requires = "image")]
    pub export: Option<PathBuf>,

    /// Serve the HTTP boundaries (/api/analyze-image, /api/playlist)
    #[arg(long)]
    pub serve: bool,

    /// Run in daemon mode (JSON-RPC over stdio)
    #[arg(long)]
    pub daemon: bool,

    /// Base URL of a remote photo-playlist service to run the stages against
    #[arg(long)]
    pub remote: Option<String>,

    /// HTTP bind address for --serve
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Language of the mood description (ko, en)
    #[arg(long, value_parser = parse_locale)]
    pub locale: Option<Locale>,

    /// Maximum number of tracks per playlist
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=MAX_PLAYLIST_TRACKS as i64))]
    pub max_tracks: Option<u8>,

    /// Derive the shuffle from the mood so the same mood yields the same playlist
    #[arg(long)]
    pub seed_from_mood: bool,
}

fn parse_locale(s: &str) -> Result<Locale, String> {
    Locale::parse(s).ok_or_else(|| format!("unsupported locale '{}' (expected ko or en)", s))
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Returns true if running a single image.
    pub fn is_cli_mode(&self) -> bool {
        !self.daemon && !self.serve && self.image.is_some()
    }

    /// Returns true if running in daemon mode.
    pub fn is_daemon_mode(&self) -> bool {
        self.daemon
    }

    /// Returns true if serving HTTP.
    pub fn is_serve_mode(&self) -> bool {
        !self.daemon && self.serve
    }

    /// Applies flag overrides on top of `config`.
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(ref url) = self.remote {
            config.remote_url = Some(url.trim_end_matches('/').to_string());
        }
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(locale) = self.locale {
            config.vision.locale = Some(locale);
        }
        if let Some(max) = self.max_tracks {
            config.max_tracks = max as usize;
        }
        if self.seed_from_mood {
            config.seed_policy = SeedPolicy::FromMood;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("photo-playlist").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn mode_detection() {
        let cli = parse(&["--image", "sunset.jpg"]);
        assert!(cli.is_cli_mode());
        assert!(!cli.is_daemon_mode());
        assert!(!cli.is_serve_mode());

        let cli = parse(&["--daemon"]);
        assert!(cli.is_daemon_mode());
        assert!(!cli.is_cli_mode());

        let cli = parse(&["--serve"]);
        assert!(cli.is_serve_mode());

        let cli = parse(&[]);
        assert!(!cli.is_cli_mode() && !cli.is_daemon_mode() && !cli.is_serve_mode());
    }

    #[test]
    fn flags_override_config() {
        let cli = parse(&[
            "--remote",
            "http://localhost:5780/",
            "--bind",
            "0.0.0.0:9000",
            "--locale",
            "ko",
            "--max-tracks",
            "4",
            "--seed-from-mood",
        ]);
        let config = cli.apply(AppConfig::default());
        assert_eq!(config.remote_url.as_deref(), Some("http://localhost:5780"));
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.vision.locale, Some(Locale::Ko));
        assert_eq!(config.max_tracks, 4);
        assert_eq!(config.seed_policy, SeedPolicy::FromMood);
        assert!(config.validate().is_none());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let args = ["photo-playlist", "--max-tracks", "9"];
        assert!(Cli::try_parse_from(args).is_err());
        let args = ["photo-playlist", "--locale", "fr"];
        assert!(Cli::try_parse_from(args).is_err());
        let args = ["photo-playlist", "--export", "out"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
