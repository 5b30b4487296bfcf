//! Media gallery for newsroom report viewers, with a single playback
//! resource shared by every audio and video item of a report.

pub mod config;
pub mod constants;
pub mod gallery;
pub mod models;
pub mod player;
pub mod utils;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use gallery::{
    GalleryHandle, GalleryIntent, GalleryNavigator, GallerySession, GalleryView, OpenOptions,
    ThumbnailLayout,
};
pub use models::{Locator, MediaItem, MediaKind, MediaPayload, MediaSequence};
pub use player::{Decoder, MediaBackend, PlaybackController, PlaybackPhase, create_backend};
pub use utils::GalleryError;
