mod navigator;
mod session;
mod view;

pub use navigator::GalleryNavigator;
pub use session::{GalleryHandle, GallerySession, OpenOptions};
pub use view::{GalleryIntent, GalleryView, ThumbnailLayout};
