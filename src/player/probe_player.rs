use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, trace};

use super::traits::{Decoder, MediaBackend};
use crate::models::{Locator, MediaItem};

/// Headless backend: acquisition checks that the media store actually serves
/// the locator, and the handle only tracks play/pause. Used for CI runs and
/// for hosts without a media stack.
pub struct ProbeBackend {
    client: Client,
}

impl ProbeBackend {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("newsroom-gallery/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MediaBackend for ProbeBackend {
    fn name(&self) -> &'static str {
        "probe"
    }

    async fn acquire(&self, item: &MediaItem) -> Result<Box<dyn Decoder>> {
        debug!("Probing {}", item.locator);

        let response = self
            .client
            .head(item.locator.url().clone())
            .send()
            .await
            .with_context(|| format!("Failed to reach {}", item.locator))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Media store answered {} for {}", status, item.locator);
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok());
        trace!(?content_type, "Probe succeeded");

        Ok(Box::new(ProbeDecoder {
            locator: item.locator.clone(),
            playing: false,
            loaded: true,
        }))
    }
}

pub struct ProbeDecoder {
    locator: Locator,
    playing: bool,
    loaded: bool,
}

#[async_trait]
impl Decoder for ProbeDecoder {
    fn locator(&self) -> &Locator {
        &self.locator
    }

    async fn play(&mut self) -> Result<()> {
        if !self.loaded {
            bail!("Handle for {} was already unloaded", self.locator);
        }
        self.playing = true;
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        if !self.loaded {
            bail!("Handle for {} was already unloaded", self.locator);
        }
        self.playing = false;
        Ok(())
    }

    async fn unload(&mut self) -> Result<()> {
        trace!(locator = %self.locator, was_playing = self.playing, "Unloading probe handle");
        self.playing = false;
        self.loaded = false;
        Ok(())
    }
}
