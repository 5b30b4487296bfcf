mod media_item;
mod payload;

pub use media_item::{Locator, MediaItem, MediaKind};
pub use payload::{MediaPayload, MediaSequence};
