use anyhow::{Result, anyhow};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::traits::{Decoder, MediaBackend};
use super::types::{PlaybackPhase, PlaybackResource};
use crate::models::{MediaItem, MediaKind};

type AcquireResult = Result<Box<dyn Decoder>>;

/// Acquisition running in the background for the newest retarget.
struct PendingAcquisition {
    generation: u64,
    item: MediaItem,
    autoplay: bool,
    token: CancellationToken,
    task: JoinHandle<Option<AcquireResult>>,
}

/// Raw result of a finished acquisition task, not yet applied to the resource.
pub struct SettledAcquisition(std::result::Result<Option<AcquireResult>, JoinError>);

/// What happened to an acquisition once it was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionOutcome {
    Bound {
        generation: u64,
        item: MediaItem,
    },
    Failed {
        generation: u64,
        item: MediaItem,
        error: String,
    },
    /// Superseded, cancelled or arrived after teardown. Any decoder it
    /// produced has already been unloaded.
    Discarded {
        generation: u64,
    },
}

/// Owns the gallery's single playback resource and drives its lifecycle:
/// `Idle -> Binding -> BoundPaused/BoundPlaying -> Releasing -> Idle`.
///
/// Every retarget bumps a generation counter. An acquisition is only bound
/// if its generation is still the newest one; anything older is unloaded on
/// arrival. The previous handle is always unloaded, and any in-flight
/// acquisition cancelled and joined, before the next acquisition starts.
pub struct PlaybackController {
    backend: Arc<dyn MediaBackend>,
    acquire_timeout: Duration,
    resource: PlaybackResource,
    generation: u64,
    pending: Option<PendingAcquisition>,
    inert: bool,
}

impl PlaybackController {
    pub fn new(backend: Arc<dyn MediaBackend>, acquire_timeout: Duration) -> Self {
        debug!(backend = backend.name(), "Creating playback controller");
        Self {
            backend,
            acquire_timeout,
            resource: PlaybackResource::default(),
            generation: 0,
            pending: None,
            inert: false,
        }
    }

    pub fn resource(&self) -> &PlaybackResource {
        &self.resource
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_inert(&self) -> bool {
        self.inert
    }

    /// Rebind the resource to the gallery's new current item.
    pub async fn retarget(&mut self, item: &MediaItem, should_autoplay: bool) {
        if self.inert {
            trace!(item = %item, "Ignoring retarget after teardown");
            return;
        }

        match item.kind {
            MediaKind::Image => {
                self.generation += 1;
                self.release_all().await;
            }
            MediaKind::Audio => {
                if self.resource.holds_same_audio(item) {
                    debug!(item = %item, "Same audio clip already bound, keeping it");
                    return;
                }
                if self.pending_item() == Some(item) {
                    debug!(item = %item, "Same audio clip already binding, keeping it");
                    return;
                }
                self.generation += 1;
                self.release_all().await;
                self.begin_acquisition(item.clone(), should_autoplay);
            }
            MediaKind::Video => {
                if self.resource.holds(item) {
                    debug!(item = %item, should_autoplay, "Reusing bound video handle");
                    self.set_playing(should_autoplay).await;
                    return;
                }
                if let Some(pending) = self.pending.as_mut()
                    && pending.item == *item
                {
                    pending.autoplay = should_autoplay;
                    return;
                }
                self.generation += 1;
                self.release_all().await;
                self.begin_acquisition(item.clone(), should_autoplay);
            }
        }
    }

    /// Flip between playing and paused on the bound handle. Does nothing
    /// while idle, binding or showing an image.
    pub async fn toggle_play_pause(&mut self) {
        if self.inert {
            return;
        }
        match self.resource.phase {
            PlaybackPhase::BoundPlaying => self.set_playing(false).await,
            PlaybackPhase::BoundPaused => self.set_playing(true).await,
            phase => trace!(%phase, "Toggle ignored, nothing bound"),
        }
    }

    /// Cancel any in-flight acquisition and unload the bound handle. Safe to
    /// call in any state, any number of times.
    pub async fn release(&mut self) {
        if self.inert {
            return;
        }
        self.generation += 1;
        self.release_all().await;
    }

    /// Final release. The controller ignores every later command.
    pub async fn teardown(&mut self) {
        if self.inert {
            debug!("Playback controller already torn down");
            return;
        }
        self.inert = true;
        self.generation += 1;
        self.release_all().await;
        info!("Playback controller torn down");
    }

    /// Wait until the in-flight acquisition task finishes. Pends forever when
    /// nothing is in flight. Cancel-safe: the task stays owned by the
    /// controller until [`Self::complete_acquisition`] applies its result.
    pub async fn wait_acquisition(&mut self) -> SettledAcquisition {
        match self.pending.as_mut() {
            Some(pending) => SettledAcquisition((&mut pending.task).await),
            None => std::future::pending().await,
        }
    }

    /// Bind a finished acquisition if it is still current, otherwise unload
    /// whatever it produced.
    pub async fn complete_acquisition(&mut self, settled: SettledAcquisition) -> AcquisitionOutcome {
        let Some(pending) = self.pending.take() else {
            return AcquisitionOutcome::Discarded {
                generation: self.generation,
            };
        };
        let PendingAcquisition {
            generation,
            item,
            autoplay,
            ..
        } = pending;

        let result = match settled.0 {
            Ok(Some(result)) => result,
            Ok(None) => {
                trace!(generation, "Acquisition was cancelled");
                self.reset_if_current(generation);
                return AcquisitionOutcome::Discarded { generation };
            }
            Err(e) => Err(anyhow!("Acquisition task failed: {}", e)),
        };

        if generation != self.generation || self.inert {
            if let Ok(mut decoder) = result {
                debug!(generation, current = self.generation, item = %item, "Unloading stale acquisition");
                unload_quietly(decoder.as_mut()).await;
            }
            return AcquisitionOutcome::Discarded { generation };
        }

        let mut decoder = match result {
            Ok(decoder) => decoder,
            Err(e) => return self.fail(generation, item, e),
        };

        let mut phase = PlaybackPhase::BoundPaused;
        if autoplay {
            if let Err(e) = decoder.play().await {
                unload_quietly(decoder.as_mut()).await;
                return self.fail(generation, item, e);
            }
            phase = PlaybackPhase::BoundPlaying;
        }

        info!(generation, item = %item, %phase, "Playback handle bound");
        self.resource.decoder = Some(decoder);
        self.resource.item = Some(item.clone());
        self.resource.phase = phase;
        AcquisitionOutcome::Bound { generation, item }
    }

    fn pending_item(&self) -> Option<&MediaItem> {
        self.pending.as_ref().map(|pending| &pending.item)
    }

    fn begin_acquisition(&mut self, item: MediaItem, autoplay: bool) {
        let generation = self.generation;
        let token = CancellationToken::new();
        let task_token = token.clone();
        let backend = Arc::clone(&self.backend);
        let timeout = self.acquire_timeout;
        let task_item = item.clone();

        debug!(generation, item = %item, autoplay, "Acquiring playback handle");

        let task = tokio::spawn(async move {
            let locator = task_item.locator.clone();
            tokio::select! {
                biased;
                _ = task_token.cancelled() => None,
                result = tokio::time::timeout(timeout, backend.acquire(&task_item)) => Some(
                    result.unwrap_or_else(|_| {
                        Err(anyhow!("Timed out after {:?} acquiring {}", timeout, locator))
                    }),
                ),
            }
        });

        self.resource.item = Some(item.clone());
        self.resource.phase = PlaybackPhase::Binding;
        self.pending = Some(PendingAcquisition {
            generation,
            item,
            autoplay,
            token,
            task,
        });
    }

    fn fail(&mut self, generation: u64, item: MediaItem, error: anyhow::Error) -> AcquisitionOutcome {
        warn!(generation, item = %item, error = %error, "Failed to acquire playback handle");
        self.reset_if_current(generation);
        AcquisitionOutcome::Failed {
            generation,
            item,
            error: format!("{:#}", error),
        }
    }

    fn reset_if_current(&mut self, generation: u64) {
        if generation == self.generation && self.resource.decoder.is_none() {
            self.resource.item = None;
            self.resource.phase = PlaybackPhase::Idle;
        }
    }

    async fn set_playing(&mut self, playing: bool) {
        let Some(decoder) = self.resource.decoder.as_mut() else {
            return;
        };
        let result = match (playing, self.resource.phase) {
            (true, PlaybackPhase::BoundPaused) => decoder.play().await,
            (false, PlaybackPhase::BoundPlaying) => decoder.pause().await,
            _ => return,
        };
        match result {
            Ok(()) => {
                self.resource.phase = if playing {
                    PlaybackPhase::BoundPlaying
                } else {
                    PlaybackPhase::BoundPaused
                };
                trace!(playing, "Playback state changed");
            }
            Err(e) => warn!(playing, error = %e, "Failed to change playback state"),
        }
    }

    async fn release_all(&mut self) {
        self.cancel_pending().await;

        if let Some(mut decoder) = self.resource.decoder.take() {
            self.resource.phase = PlaybackPhase::Releasing;
            debug!(locator = %decoder.locator(), "Releasing playback handle");
            unload_quietly(decoder.as_mut()).await;
        }
        self.resource.item = None;
        self.resource.phase = PlaybackPhase::Idle;
    }

    async fn cancel_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        debug!(generation = pending.generation, item = %pending.item, "Cancelling in-flight acquisition");
        pending.token.cancel();

        match pending.task.await {
            // Finished just before the cancel landed; never bind it.
            Ok(Some(Ok(mut decoder))) => unload_quietly(decoder.as_mut()).await,
            Ok(Some(Err(e))) => trace!(error = %e, "Cancelled acquisition had already failed"),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Acquisition task ended abnormally"),
        }
    }
}

async fn unload_quietly(decoder: &mut dyn Decoder) {
    if let Err(e) = decoder.unload().await {
        debug!(locator = %decoder.locator(), error = %e, "Ignoring release failure");
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
            pending.task.abort();
        }
    }
}
