use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use super::probe_player::ProbeBackend;
use super::traits::MediaBackend;
use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerBackend {
    Probe,
    GStreamer,
}

impl From<&str> for PlayerBackend {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "gstreamer" | "gst" => PlayerBackend::GStreamer,
            _ => PlayerBackend::Probe, // Default to the headless probe
        }
    }
}

/// Build the backend named in the config.
///
/// Asking for GStreamer in a build without the `gstreamer` feature falls back
/// to the probe backend.
pub fn create_backend(config: &Config) -> Result<Arc<dyn MediaBackend>> {
    let timeout = config.acquire_timeout();

    match PlayerBackend::from(config.playback.backend.as_str()) {
        PlayerBackend::Probe => {
            info!("Creating probe playback backend");
            Ok(Arc::new(ProbeBackend::new(timeout)?))
        }
        #[cfg(feature = "gstreamer")]
        PlayerBackend::GStreamer => {
            info!("Creating GStreamer playback backend");
            Ok(Arc::new(super::gstreamer_player::GStreamerBackend::new(timeout)?))
        }
        #[cfg(not(feature = "gstreamer"))]
        PlayerBackend::GStreamer => {
            tracing::warn!("Built without the gstreamer feature, using the probe backend");
            Ok(Arc::new(ProbeBackend::new(timeout)?))
        }
    }
}
