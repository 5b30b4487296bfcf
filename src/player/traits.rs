use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Locator, MediaItem};

/// Source of playback handles. Only the playback controller calls this.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Open a decoder for `item` and leave it prerolled but paused.
    ///
    /// The future may be dropped at any await point when the acquisition is
    /// superseded; implementations must not leak a player in that case.
    async fn acquire(&self, item: &MediaItem) -> Result<Box<dyn Decoder>>;
}

/// One live decoder/player instance bound to a single locator.
#[async_trait]
pub trait Decoder: Send {
    fn locator(&self) -> &Locator;
    async fn play(&mut self) -> Result<()>;
    async fn pause(&mut self) -> Result<()>;
    /// Stop output and free the underlying player. Calling it twice is a no-op.
    async fn unload(&mut self) -> Result<()>;
}
