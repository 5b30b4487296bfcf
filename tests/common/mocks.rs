use anyhow::{Result, bail};
use async_trait::async_trait;
use newsroom_gallery::{Decoder, Locator, MediaBackend, MediaItem};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Ledger {
    started: Mutex<HashMap<String, usize>>,
    failing: Mutex<HashSet<String>>,
    hanging: Mutex<HashSet<String>>,
    delays: Mutex<HashMap<String, Duration>>,
    live: AtomicUsize,
    max_live: AtomicUsize,
    releases: AtomicUsize,
    leaked: AtomicUsize,
}

/// Backend whose acquisitions can be delayed, failed or hung per locator.
/// Tracks how many decoders exist at any moment.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    ledger: Arc<Ledger>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, locator: &str) -> &Self {
        self.ledger.failing.lock().unwrap().insert(locator.to_string());
        self
    }

    pub fn hang(&self, locator: &str) -> &Self {
        self.ledger.hanging.lock().unwrap().insert(locator.to_string());
        self
    }

    pub fn delay(&self, locator: &str, delay: Duration) -> &Self {
        self.ledger.delays.lock().unwrap().insert(locator.to_string(), delay);
        self
    }

    pub fn started(&self, locator: &str) -> usize {
        self.ledger
            .started
            .lock()
            .unwrap()
            .get(locator)
            .copied()
            .unwrap_or(0)
    }

    pub fn live(&self) -> usize {
        self.ledger.live.load(Ordering::SeqCst)
    }

    pub fn max_live(&self) -> usize {
        self.ledger.max_live.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.ledger.releases.load(Ordering::SeqCst)
    }

    pub fn leaked(&self) -> usize {
        self.ledger.leaked.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn acquire(&self, item: &MediaItem) -> Result<Box<dyn Decoder>> {
        let locator = item.locator.as_str().to_string();
        *self
            .ledger
            .started
            .lock()
            .unwrap()
            .entry(locator.clone())
            .or_insert(0) += 1;

        let delay = self.ledger.delays.lock().unwrap().get(&locator).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let hanging = self.ledger.hanging.lock().unwrap().contains(&locator);
        if hanging {
            std::future::pending::<()>().await;
        }

        if self.ledger.failing.lock().unwrap().contains(&locator) {
            bail!("404 Not Found for {}", locator);
        }

        let live = self.ledger.live.fetch_add(1, Ordering::SeqCst) + 1;
        self.ledger.max_live.fetch_max(live, Ordering::SeqCst);

        Ok(Box::new(ScriptedDecoder {
            locator: item.locator.clone(),
            ledger: Arc::clone(&self.ledger),
            unloaded: false,
        }))
    }
}

struct ScriptedDecoder {
    locator: Locator,
    ledger: Arc<Ledger>,
    unloaded: bool,
}

#[async_trait]
impl Decoder for ScriptedDecoder {
    fn locator(&self) -> &Locator {
        &self.locator
    }

    async fn play(&mut self) -> Result<()> {
        if self.unloaded {
            bail!("Decoder already unloaded");
        }
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        if self.unloaded {
            bail!("Decoder already unloaded");
        }
        Ok(())
    }

    async fn unload(&mut self) -> Result<()> {
        if !self.unloaded {
            self.unloaded = true;
            self.ledger.live.fetch_sub(1, Ordering::SeqCst);
            self.ledger.releases.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

impl Drop for ScriptedDecoder {
    fn drop(&mut self) {
        if !self.unloaded {
            self.ledger.live.fetch_sub(1, Ordering::SeqCst);
            self.ledger.leaked.fetch_add(1, Ordering::SeqCst);
        }
    }
}
