//! Normalization of the report `files` payload into an ordered gallery
//! sequence.
//!
//! The server sends three independent path lists. The gallery walks one
//! flat list in a fixed order: images, then audios, then videos.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::media_item::{Locator, MediaItem, MediaKind};
use crate::utils::GalleryError;

/// Raw media payload as attached to a report.
///
/// Every list may be missing, `null` or contain junk; none of that is an
/// error at this stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaPayload {
    /// Standalone cover picture from older report revisions. Already absolute.
    #[serde(
        default,
        alias = "imageUrl",
        deserialize_with = "lenient_cover",
        skip_serializing_if = "Option::is_none"
    )]
    pub image: Option<String>,

    #[serde(default, deserialize_with = "lenient_paths")]
    pub images: Vec<String>,

    #[serde(default, deserialize_with = "lenient_paths")]
    pub audios: Vec<String>,

    #[serde(default, deserialize_with = "lenient_paths")]
    pub videos: Vec<String>,
}

/// Accepts a missing or `null` list and drops non-string entries.
fn lenient_paths<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let paths = match raw {
        Some(Value::Array(values)) => values
            .into_iter()
            .filter_map(|value| match value {
                Value::String(path) => Some(path),
                other => {
                    warn!(entry = %other, "Skipping non-string media path");
                    None
                }
            })
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            warn!(field = %other, "Media list is not an array, treating as empty");
            Vec::new()
        }
    };
    Ok(paths)
}

/// Accepts a missing, `null` or non-string cover.
fn lenient_cover<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(cover_string))
}

fn cover_string(value: Value) -> Option<String> {
    match value {
        Value::String(cover) => Some(cover),
        Value::Null => None,
        other => {
            warn!(cover = %other, "Cover image is not a string, ignoring it");
            None
        }
    }
}

/// Remove `image` / `imageUrl` from an object, preferring `image`.
fn take_cover(value: &mut Value) -> Option<String> {
    let object = value.as_object_mut()?;
    let image = object.remove("image").and_then(cover_string);
    let image_url = object.remove("imageUrl").and_then(cover_string);
    image.or(image_url)
}

impl MediaPayload {
    /// Parse either a bare `files` object or a whole report carrying one.
    ///
    /// For a report, the cover fields may live on the report itself while
    /// the lists live under `files`. A `files` value that is `null` or not
    /// an object counts as no media; the report cover still applies.
    pub fn from_json(json: &str) -> Result<Self, GalleryError> {
        let mut value: Value = serde_json::from_str(json)?;
        let report_cover = take_cover(&mut value);

        let nested = value.as_object_mut().and_then(|report| report.remove("files"));
        let mut files = nested.unwrap_or(value);
        let files_cover = take_cover(&mut files);

        let mut payload = match files {
            Value::Object(_) => serde_json::from_value(files)?,
            Value::Null => Self::default(),
            other => {
                warn!(files = %other, "Media payload is not an object, treating as empty");
                Self::default()
            }
        };
        payload.image = files_cover.or(report_cover);
        Ok(payload)
    }

    /// Read a payload or report from disk.
    pub fn from_file(path: &Path) -> Result<Self, GalleryError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Resolve every fragment against `base_url` and flatten into gallery
    /// order. Returns `None` when nothing usable is left, so the caller can
    /// skip opening the gallery.
    pub fn normalize(&self, base_url: &str) -> Option<MediaSequence> {
        let cover = self
            .image
            .iter()
            .filter_map(|raw| resolve_absolute(raw))
            .map(MediaItem::image);

        let groups = [
            (MediaKind::Image, &self.images),
            (MediaKind::Audio, &self.audios),
            (MediaKind::Video, &self.videos),
        ];
        let resolved = groups.into_iter().flat_map(move |(kind, fragments)| {
            fragments
                .iter()
                .filter_map(move |fragment| resolve(base_url, fragment))
                .map(move |locator| MediaItem::new(kind, locator))
        });

        let items: Vec<MediaItem> = cover.chain(resolved).collect();
        debug!(count = items.len(), "Normalized media payload");

        MediaSequence::new(items).ok()
    }
}

fn is_absolute(raw: &str) -> bool {
    raw.starts_with("http://") || raw.starts_with("https://")
}

fn resolve_absolute(raw: &str) -> Option<Locator> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Locator::parse(raw) {
        Ok(locator) => Some(locator),
        Err(e) => {
            warn!(raw, error = %e, "Skipping unparsable media locator");
            None
        }
    }
}

/// `base_url + fragment`, the same plain concatenation the clients use.
/// Fragments that are already absolute URLs pass through untouched.
fn resolve(base_url: &str, fragment: &str) -> Option<Locator> {
    let fragment = fragment.trim();
    if fragment.is_empty() {
        warn!("Skipping blank media path");
        return None;
    }
    if is_absolute(fragment) {
        return resolve_absolute(fragment);
    }
    resolve_absolute(&format!("{}{}", base_url, fragment))
}

/// Ordered, non-empty list of gallery items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSequence {
    items: Vec<MediaItem>,
}

impl MediaSequence {
    /// Rejects an empty list; the gallery never opens without media.
    pub fn new(items: Vec<MediaItem>) -> Result<Self, GalleryError> {
        if items.is_empty() {
            return Err(GalleryError::EmptyMedia);
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    // Always false; kept for clippy's len-without-is-empty lint.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaItem> {
        self.items.iter()
    }

    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }
}
