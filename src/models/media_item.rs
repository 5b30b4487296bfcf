use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::constants::{AUDIO_MIME, IMAGE_MIME, VIDEO_MIME};

/// What kind of media an item is. Downstream logic matches on this
/// exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
}

impl MediaKind {
    /// MIME type the report clients attach to this kind of element.
    pub fn mime(&self) -> &'static str {
        match self {
            MediaKind::Image => IMAGE_MIME,
            MediaKind::Audio => AUDIO_MIME,
            MediaKind::Video => VIDEO_MIME,
        }
    }

    /// Whether showing this kind needs a live decoder.
    pub fn needs_decoder(&self) -> bool {
        !matches!(self, MediaKind::Image)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
            MediaKind::Video => "video",
        };
        f.write_str(name)
    }
}

/// Absolute address of a media resource in the object store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator(Url);

impl Locator {
    /// Parse an absolute URL. Relative references are rejected.
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        Url::parse(raw).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Locator {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Immutable gallery entry. Identity is structural: two items are the same
/// item exactly when kind and locator match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub locator: Locator,
}

impl MediaItem {
    pub fn new(kind: MediaKind, locator: Locator) -> Self {
        Self { kind, locator }
    }

    pub fn image(locator: Locator) -> Self {
        Self::new(MediaKind::Image, locator)
    }

    pub fn audio(locator: Locator) -> Self {
        Self::new(MediaKind::Audio, locator)
    }

    pub fn video(locator: Locator) -> Self {
        Self::new(MediaKind::Video, locator)
    }

    /// Drag-and-drop download payload, `"<mime>:<url>"`.
    pub fn download_hint(&self) -> String {
        format!("{}:{}", self.kind.mime(), self.locator)
    }
}

impl fmt::Display for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.locator)
    }
}
