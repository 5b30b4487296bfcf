use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use gstreamer as gst;
use gstreamer::prelude::*;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

use super::traits::{Decoder, MediaBackend};
use crate::models::{Locator, MediaItem, MediaKind};

/// `playbin` backed decoders. One pipeline per handle.
pub struct GStreamerBackend {
    preroll_timeout: Duration,
}

impl GStreamerBackend {
    pub fn new(preroll_timeout: Duration) -> Result<Self> {
        debug!("Initializing GStreamer backend");
        gst::init().map_err(|e| anyhow!("Failed to initialize GStreamer: {}", e))?;

        if gst::ElementFactory::find("playbin").is_none() {
            bail!("GStreamer playbin element is missing - install gst-plugins-base");
        }

        Ok(Self { preroll_timeout })
    }
}

#[async_trait]
impl MediaBackend for GStreamerBackend {
    fn name(&self) -> &'static str {
        "gstreamer"
    }

    async fn acquire(&self, item: &MediaItem) -> Result<Box<dyn Decoder>> {
        info!("Loading media: {}", item.locator);
        let item = item.clone();
        let timeout = self.preroll_timeout;

        // Prerolling blocks on the pipeline's state change, keep it off the
        // event loop. If this future is dropped the decoder built here is
        // dropped too, which sets the pipeline back to Null.
        let decoder = tokio::task::spawn_blocking(move || GStreamerDecoder::preroll(item, timeout))
            .await
            .context("Preroll task failed")??;

        Ok(Box::new(decoder))
    }
}

pub struct GStreamerDecoder {
    locator: Locator,
    playbin: gst::Element,
    unloaded: bool,
}

impl GStreamerDecoder {
    fn preroll(item: MediaItem, timeout: Duration) -> Result<Self> {
        trace!("Creating playbin for {}", item.locator);
        let playbin = gst::ElementFactory::make("playbin")
            .property("uri", item.locator.as_str())
            .build()
            .context("Failed to create playbin element")?;

        let flags = match item.kind {
            MediaKind::Audio => "audio+soft-volume",
            MediaKind::Video => "audio+video+soft-volume",
            MediaKind::Image => bail!("Images are rendered without a decoder"),
        };
        playbin.set_property_from_str("flags", flags);

        // From here on Drop resets the pipeline, including on early return.
        let decoder = Self {
            locator: item.locator,
            playbin,
            unloaded: false,
        };

        decoder
            .playbin
            .set_state(gst::State::Paused)
            .context("Failed to start preroll")?;

        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        let (result, state, _) = decoder
            .playbin
            .state(gst::ClockTime::from_mseconds(millis));

        if let Some(bus) = decoder.playbin.bus() {
            while let Some(msg) = bus.pop_filtered(&[gst::MessageType::Error, gst::MessageType::Warning]) {
                match msg.view() {
                    gst::MessageView::Error(err) => {
                        error!("Bus error during preroll: {} ({:?})", err.error(), err.debug());
                        bail!("Preroll failed: {}", err.error());
                    }
                    gst::MessageView::Warning(w) => {
                        warn!("Bus warning during preroll: {} ({:?})", w.error(), w.debug());
                    }
                    _ => {}
                }
            }
        }

        match result {
            Ok(gst::StateChangeSuccess::Success) | Ok(gst::StateChangeSuccess::NoPreroll) => {
                debug!(?state, "Pipeline prerolled for {}", decoder.locator);
                Ok(decoder)
            }
            Ok(gst::StateChangeSuccess::Async) => {
                bail!("Preroll of {} did not finish within {:?}", decoder.locator, timeout)
            }
            Err(e) => bail!("Preroll of {} failed: {:?}", decoder.locator, e),
        }
    }

    fn set_state(&self, state: gst::State) -> Result<()> {
        if self.unloaded {
            bail!("Pipeline for {} was already unloaded", self.locator);
        }
        self.playbin
            .set_state(state)
            .with_context(|| format!("Failed to set pipeline to {:?}", state))?;
        Ok(())
    }
}

#[async_trait]
impl Decoder for GStreamerDecoder {
    fn locator(&self) -> &Locator {
        &self.locator
    }

    async fn play(&mut self) -> Result<()> {
        debug!("Starting playback of {}", self.locator);
        self.set_state(gst::State::Playing)
    }

    async fn pause(&mut self) -> Result<()> {
        debug!("Pausing playback of {}", self.locator);
        self.set_state(gst::State::Paused)
    }

    async fn unload(&mut self) -> Result<()> {
        if self.unloaded {
            return Ok(());
        }
        self.unloaded = true;
        self.playbin
            .set_state(gst::State::Null)
            .context("Failed to set playbin to null state")?;
        debug!("Pipeline for {} unloaded", self.locator);
        Ok(())
    }
}

impl Drop for GStreamerDecoder {
    fn drop(&mut self) {
        if !self.unloaded {
            let _ = self.playbin.set_state(gst::State::Null);
        }
    }
}
