use thiserror::Error;

/// Errors surfaced to the hosting view by the gallery boundary.
///
/// Acquisition and release failures never appear here: the former become a
/// per-item `load_error` on the view, the latter are logged and swallowed.
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Report has no media to show")]
    EmptyMedia,

    #[error("Gallery session is no longer running")]
    SessionClosed,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),
}
