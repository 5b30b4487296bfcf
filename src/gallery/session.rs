use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::navigator::GalleryNavigator;
use super::view::{GalleryIntent, GalleryView};
use crate::config::{Config, PlaybackConfig};
use crate::models::{MediaKind, MediaPayload, MediaSequence};
use crate::player::{AcquisitionOutcome, MediaBackend, PlaybackController};
use crate::utils::GalleryError;

/// How to open the gallery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenOptions {
    /// Clamped into the sequence.
    pub initial_index: usize,
    /// Full-screen viewer rather than the inline one. Only changes the
    /// video autoplay policy.
    pub fullscreen: bool,
}

/// Commands accepted by the gallery session
#[derive(Debug)]
enum GalleryCommand {
    Open {
        sequence: MediaSequence,
        options: OpenOptions,
    },
    Next,
    Previous,
    Select {
        index: usize,
    },
    TogglePlayPause,
    SetFullscreen {
        enabled: bool,
    },
    Close,
    Teardown,
    GetView,
}

struct Envelope {
    command: GalleryCommand,
    respond_to: oneshot::Sender<GalleryView>,
}

/// Event loop owning one gallery: its position and its single playback
/// resource. Commands are applied strictly one at a time, interleaved with
/// completions of in-flight acquisitions.
pub struct GallerySession {
    navigator: GalleryNavigator,
    controller: PlaybackController,
    playback: PlaybackConfig,
    fullscreen: bool,
    load_errors: HashMap<usize, String>,
    torn_down: bool,
    receiver: mpsc::UnboundedReceiver<Envelope>,
    view_tx: watch::Sender<GalleryView>,
}

impl GallerySession {
    pub fn new(backend: Arc<dyn MediaBackend>, config: &Config) -> (GalleryHandle, Self) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(GalleryView::default());

        let session = Self {
            navigator: GalleryNavigator::new(),
            controller: PlaybackController::new(backend, config.acquire_timeout()),
            playback: config.playback.clone(),
            fullscreen: false,
            load_errors: HashMap::new(),
            torn_down: false,
            receiver,
            view_tx,
        };

        (GalleryHandle { sender, view_rx }, session)
    }

    /// Create a session and run it on the current runtime.
    pub fn spawn(backend: Arc<dyn MediaBackend>, config: &Config) -> (GalleryHandle, JoinHandle<()>) {
        let (handle, session) = Self::new(backend, config);
        (handle, tokio::spawn(session.run()))
    }

    /// Run the session event loop until every handle is dropped.
    pub async fn run(mut self) {
        debug!("Gallery session event loop started");

        loop {
            tokio::select! {
                envelope = self.receiver.recv() => {
                    let Some(Envelope { command, respond_to }) = envelope else {
                        break;
                    };
                    self.handle_command(command).await;
                    let _ = respond_to.send(self.publish());
                }
                settled = self.controller.wait_acquisition() => {
                    let outcome = self.controller.complete_acquisition(settled).await;
                    self.on_acquisition(outcome);
                    self.publish();
                }
            }
        }

        if !self.torn_down {
            info!("Every gallery handle dropped, tearing down");
            self.teardown().await;
        }
        debug!("Gallery session event loop stopped");
    }

    async fn handle_command(&mut self, command: GalleryCommand) {
        if self.torn_down {
            trace!(?command, "Ignoring command after teardown");
            return;
        }
        trace!(?command, "Handling gallery command");

        match command {
            GalleryCommand::Open { sequence, options } => self.open(sequence, options).await,
            GalleryCommand::Next => {
                if self.navigator.next().is_some() {
                    self.retarget_current().await;
                }
            }
            GalleryCommand::Previous => {
                if self.navigator.previous().is_some() {
                    self.retarget_current().await;
                }
            }
            GalleryCommand::Select { index } => {
                if self.navigator.select(index).is_some() {
                    self.retarget_current().await;
                }
            }
            GalleryCommand::TogglePlayPause => {
                if self.navigator.is_visible() {
                    self.controller.toggle_play_pause().await;
                }
            }
            GalleryCommand::SetFullscreen { enabled } => self.set_fullscreen(enabled).await,
            GalleryCommand::Close => self.close().await,
            GalleryCommand::Teardown => self.teardown().await,
            GalleryCommand::GetView => {}
        }
    }

    async fn open(&mut self, sequence: MediaSequence, options: OpenOptions) {
        if self.navigator.is_visible() {
            debug!("Gallery reopened, releasing previous media");
            self.controller.release().await;
        }
        self.load_errors.clear();
        self.fullscreen = options.fullscreen;
        self.navigator.open(sequence, options.initial_index);

        info!(
            count = self.navigator.len(),
            index = ?self.navigator.current_index(),
            fullscreen = self.fullscreen,
            "Gallery opened"
        );
        self.retarget_current().await;
    }

    async fn set_fullscreen(&mut self, enabled: bool) {
        if self.fullscreen == enabled {
            return;
        }
        self.fullscreen = enabled;
        debug!(enabled, "Fullscreen toggled");

        if self
            .navigator
            .current()
            .is_some_and(|item| item.kind == MediaKind::Video)
        {
            self.retarget_current().await;
        }
    }

    async fn close(&mut self) {
        self.controller.release().await;
        self.navigator.close();
        self.load_errors.clear();
        self.fullscreen = false;
        info!("Gallery closed");
    }

    async fn teardown(&mut self) {
        self.controller.teardown().await;
        self.navigator.close();
        self.load_errors.clear();
        self.torn_down = true;
    }

    async fn retarget_current(&mut self) {
        let (Some(index), Some(item)) = (self.navigator.current_index(), self.navigator.current().cloned())
        else {
            return;
        };
        let autoplay = self.playback.should_autoplay(item.kind, self.fullscreen);
        trace!(index, item = %item, autoplay, "Retargeting playback");

        self.controller.retarget(&item, autoplay).await;

        // A fresh attempt supersedes the last failure for this slot.
        if self.controller.resource().is_loading() {
            self.load_errors.remove(&index);
        }
    }

    fn on_acquisition(&mut self, outcome: AcquisitionOutcome) {
        match outcome {
            AcquisitionOutcome::Bound { generation, item } => {
                debug!(generation, item = %item, "Gallery media ready");
            }
            AcquisitionOutcome::Failed { item, error, .. } => {
                if let Some(index) = self.navigator.current_index()
                    && self.navigator.current() == Some(&item)
                {
                    warn!(index, item = %item, "Gallery media failed to load");
                    self.load_errors.insert(index, error);
                }
            }
            AcquisitionOutcome::Discarded { generation } => {
                trace!(generation, "Acquisition discarded");
            }
        }
    }

    fn publish(&self) -> GalleryView {
        let load_error = self
            .navigator
            .current_index()
            .and_then(|index| self.load_errors.get(&index))
            .map(String::as_str);
        let view = GalleryView::project(&self.navigator, self.controller.resource(), load_error);

        self.view_tx.send_if_modified(|current| {
            if *current == view {
                return false;
            }
            *current = view.clone();
            true
        });
        view
    }
}

/// Cloneable front end of a [`GallerySession`]. Every command resolves to
/// the view right after it was applied.
#[derive(Clone)]
pub struct GalleryHandle {
    sender: mpsc::UnboundedSender<Envelope>,
    view_rx: watch::Receiver<GalleryView>,
}

impl fmt::Debug for GalleryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GalleryHandle")
            .field("sender", &"<UnboundedSender>")
            .field("view", &*self.view_rx.borrow())
            .finish()
    }
}

impl GalleryHandle {
    /// Normalize `payload` and open the gallery on it. An empty payload is
    /// rejected before the session sees anything.
    pub async fn open(
        &self,
        payload: &MediaPayload,
        base_url: &str,
        options: OpenOptions,
    ) -> Result<GalleryView, GalleryError> {
        let sequence = payload.normalize(base_url).ok_or(GalleryError::EmptyMedia)?;
        self.open_sequence(sequence, options).await
    }

    pub async fn open_sequence(
        &self,
        sequence: MediaSequence,
        options: OpenOptions,
    ) -> Result<GalleryView, GalleryError> {
        self.send(GalleryCommand::Open { sequence, options }).await
    }

    pub async fn next(&self) -> Result<GalleryView, GalleryError> {
        self.send(GalleryCommand::Next).await
    }

    pub async fn previous(&self) -> Result<GalleryView, GalleryError> {
        self.send(GalleryCommand::Previous).await
    }

    /// Jump to a thumbnail.
    pub async fn select(&self, index: usize) -> Result<GalleryView, GalleryError> {
        self.send(GalleryCommand::Select { index }).await
    }

    pub async fn toggle_play_pause(&self) -> Result<GalleryView, GalleryError> {
        self.send(GalleryCommand::TogglePlayPause).await
    }

    pub async fn set_fullscreen(&self, enabled: bool) -> Result<GalleryView, GalleryError> {
        self.send(GalleryCommand::SetFullscreen { enabled }).await
    }

    pub async fn close(&self) -> Result<GalleryView, GalleryError> {
        self.send(GalleryCommand::Close).await
    }

    /// Release everything for good. Later commands answer with the closed view.
    pub async fn teardown(&self) -> Result<GalleryView, GalleryError> {
        self.send(GalleryCommand::Teardown).await
    }

    pub async fn view(&self) -> Result<GalleryView, GalleryError> {
        self.send(GalleryCommand::GetView).await
    }

    /// Last published view, without a round trip.
    pub fn current_view(&self) -> GalleryView {
        self.view_rx.borrow().clone()
    }

    /// Receive every published view, including changes caused by
    /// acquisitions finishing in the background.
    pub fn subscribe(&self) -> watch::Receiver<GalleryView> {
        self.view_rx.clone()
    }

    pub async fn dispatch(&self, intent: GalleryIntent) -> Result<GalleryView, GalleryError> {
        match intent {
            GalleryIntent::Next => self.next().await,
            GalleryIntent::Previous => self.previous().await,
            GalleryIntent::TogglePlayPause => self.toggle_play_pause().await,
            GalleryIntent::Close => self.close().await,
        }
    }

    /// Apply a key from the full-screen viewer. Unmapped keys change nothing.
    pub async fn handle_key(&self, key: &str) -> Result<GalleryView, GalleryError> {
        match GalleryIntent::from_key(key) {
            Some(intent) => self.dispatch(intent).await,
            None => {
                trace!(key, "Ignoring unmapped key");
                self.view().await
            }
        }
    }

    async fn send(&self, command: GalleryCommand) -> Result<GalleryView, GalleryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(Envelope {
                command,
                respond_to,
            })
            .map_err(|_| GalleryError::SessionClosed)?;
        response.await.map_err(|_| GalleryError::SessionClosed)
    }
}
