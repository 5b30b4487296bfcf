pub mod errors;

pub use errors::GalleryError;
