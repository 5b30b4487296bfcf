use serde::Serialize;
use std::fmt;

use super::traits::Decoder;
use crate::models::{MediaItem, MediaKind};

/// Lifecycle phase of the single playback resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PlaybackPhase {
    #[default]
    Idle,
    Binding,
    BoundPaused,
    BoundPlaying,
    Releasing,
}

impl PlaybackPhase {
    pub fn is_bound(&self) -> bool {
        matches!(self, Self::BoundPaused | Self::BoundPlaying)
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Binding => "binding",
            Self::BoundPaused => "paused",
            Self::BoundPlaying => "playing",
            Self::Releasing => "releasing",
        }
    }
}

impl fmt::Display for PlaybackPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// The one decoder slot of a gallery. Owned by the playback controller and
/// only ever lent out read-only.
#[derive(Default)]
pub struct PlaybackResource {
    pub(super) item: Option<MediaItem>,
    pub(super) decoder: Option<Box<dyn Decoder>>,
    pub(super) phase: PlaybackPhase,
}

impl PlaybackResource {
    /// Item that is bound, or being bound while acquisition is in flight.
    pub fn item(&self) -> Option<&MediaItem> {
        self.item.as_ref()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::BoundPlaying
    }

    pub fn is_loading(&self) -> bool {
        self.phase == PlaybackPhase::Binding
    }

    pub fn has_active_handle(&self) -> bool {
        self.decoder.is_some()
    }

    /// True when `item` is an audio clip already bound to the same locator.
    pub(super) fn holds_same_audio(&self, item: &MediaItem) -> bool {
        item.kind == MediaKind::Audio && self.phase.is_bound() && self.item.as_ref() == Some(item)
    }

    pub(super) fn holds(&self, item: &MediaItem) -> bool {
        self.phase.is_bound() && self.item.as_ref() == Some(item)
    }
}

impl fmt::Debug for PlaybackResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackResource")
            .field("item", &self.item)
            .field("has_decoder", &self.decoder.is_some())
            .field("phase", &self.phase)
            .finish()
    }
}
