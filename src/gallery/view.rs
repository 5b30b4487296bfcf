//! Read-only projections of gallery state for whatever renders it.

use serde::Serialize;
use std::fmt;

use super::navigator::GalleryNavigator;
use crate::constants::MAX_CARD_TILES;
use crate::models::MediaItem;
use crate::player::{PlaybackPhase, PlaybackResource};

/// Snapshot of everything a viewer shows for the gallery.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GalleryView {
    pub visible: bool,
    pub current_item: Option<MediaItem>,
    pub index: usize,
    pub len: usize,
    /// "i / n", 1-based.
    pub position: String,
    pub caption: String,
    pub is_loading: bool,
    pub is_playing: bool,
    pub phase: PlaybackPhase,
    pub has_active_handle: bool,
    pub can_go_next: bool,
    pub can_go_prev: bool,
    pub load_error: Option<String>,
}

impl GalleryView {
    pub fn project(
        navigator: &GalleryNavigator,
        resource: &PlaybackResource,
        load_error: Option<&str>,
    ) -> Self {
        let playback = Self {
            phase: resource.phase(),
            is_loading: resource.is_loading(),
            is_playing: resource.is_playing(),
            has_active_handle: resource.has_active_handle(),
            ..Self::default()
        };

        let (Some(index), Some(item)) = (navigator.current_index(), navigator.current()) else {
            return playback;
        };
        let len = navigator.len();

        Self {
            visible: true,
            current_item: Some(item.clone()),
            index,
            len,
            position: format!("{} / {}", index + 1, len),
            caption: format!("Media {}", index + 1),
            can_go_next: len > 1,
            can_go_prev: len > 1,
            load_error: load_error.map(str::to_string),
            ..playback
        }
    }
}

impl fmt::Display for GalleryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(item) = self.current_item.as_ref().filter(|_| self.visible) else {
            return write!(f, "[gallery closed] playback: {}", self.phase);
        };

        write!(f, "[{}] {} {}", self.position, item.kind, item.locator)?;
        if item.kind.needs_decoder() {
            write!(f, " ({})", self.phase)?;
        }
        if let Some(error) = &self.load_error {
            write!(f, " - failed to load: {}", error)?;
        }
        Ok(())
    }
}

/// Thumbnail arrangement for a report card, driven only by media count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "layout")]
pub enum ThumbnailLayout {
    None,
    Single,
    Double,
    Triple,
    /// Four tiles; `overflow` items are summarized on the last one.
    Grid { overflow: usize },
}

impl ThumbnailLayout {
    pub fn for_count(count: usize) -> Self {
        match count {
            0 => Self::None,
            1 => Self::Single,
            2 => Self::Double,
            3 => Self::Triple,
            n => Self::Grid {
                overflow: n - MAX_CARD_TILES,
            },
        }
    }

    pub fn tiles(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Single => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Grid { .. } => MAX_CARD_TILES,
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Self::None => "media-none",
            Self::Single => "media-single",
            Self::Double => "media-double",
            Self::Triple => "media-triple",
            Self::Grid { .. } => "media-grid",
        }
    }

    /// Badge for the last tile, e.g. "+3".
    pub fn overflow_label(&self) -> Option<String> {
        match self {
            Self::Grid { overflow } if *overflow > 0 => Some(format!("+{}", overflow)),
            _ => None,
        }
    }
}

/// User intents a viewer can raise while the gallery is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryIntent {
    Next,
    Previous,
    TogglePlayPause,
    Close,
}

impl GalleryIntent {
    /// Keyboard mapping of the full-screen viewer. Other keys are ignored.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" => Some(Self::Next),
            "ArrowLeft" => Some(Self::Previous),
            "Escape" => Some(Self::Close),
            " " | "Space" | "Spacebar" => Some(Self::TogglePlayPause),
            _ => None,
        }
    }
}
