use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::constants::{DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_MEDIA_BASE_URL};
use crate::models::MediaKind;
use crate::utils::GalleryError;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaConfig {
    /// Prefix for the path fragments stored on reports.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaybackConfig {
    /// `probe` or `gstreamer`.
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default = "default_true")]
    pub autoplay_audio: bool,

    /// Videos reached from the inline gallery / thumbnails.
    #[serde(default)]
    pub autoplay_video_inline: bool,

    /// Videos shown in the full-screen player.
    #[serde(default = "default_true")]
    pub autoplay_video_fullscreen: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::from_path(&config_path)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        config.validate()?;
        info!("Config loaded successfully");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<(), GalleryError> {
        if url::Url::parse(&self.media.base_url).is_err() {
            return Err(GalleryError::Configuration(format!(
                "media.base_url is not an absolute URL: {}",
                self.media.base_url
            )));
        }
        if self.network.acquire_timeout_secs == 0 {
            return Err(GalleryError::Configuration(
                "network.acquire_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.network.acquire_timeout_secs)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("newsroom-gallery").join("config.toml"))
    }
}

impl PlaybackConfig {
    /// Whether a freshly acquired handle for `kind` starts playing on its own.
    pub fn should_autoplay(&self, kind: MediaKind, fullscreen: bool) -> bool {
        match kind {
            MediaKind::Image => false,
            MediaKind::Audio => self.autoplay_audio,
            MediaKind::Video if fullscreen => self.autoplay_video_fullscreen,
            MediaKind::Video => self.autoplay_video_inline,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            autoplay_audio: default_true(),
            autoplay_video_inline: false,
            autoplay_video_fullscreen: default_true(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            acquire_timeout_secs: default_acquire_timeout(),
        }
    }
}

// Default value functions
fn default_base_url() -> String { DEFAULT_MEDIA_BASE_URL.to_string() }
fn default_backend() -> String { "probe".to_string() }
fn default_true() -> bool { true }
fn default_acquire_timeout() -> u64 { DEFAULT_ACQUIRE_TIMEOUT_SECS }
