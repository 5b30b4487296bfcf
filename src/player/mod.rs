pub mod controller;
pub mod factory;
#[cfg(feature = "gstreamer")]
pub mod gstreamer_player;
pub mod probe_player;
pub mod traits;
pub mod types;

pub use controller::{AcquisitionOutcome, PlaybackController, SettledAcquisition};
pub use factory::{PlayerBackend, create_backend};
#[cfg(feature = "gstreamer")]
pub use gstreamer_player::GStreamerBackend;
pub use probe_player::ProbeBackend;
pub use traits::{Decoder, MediaBackend};
pub use types::{PlaybackPhase, PlaybackResource};
