#![cfg(test)]

/// Common test utilities
pub mod common {
    use std::future::Future;
    use std::time::Duration;
    use tokio::time::sleep;

    /// Wait for an async condition to become true
    pub async fn wait_for_async<F, Fut>(mut condition: F, max_wait: Duration) -> bool
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        let start = std::time::Instant::now();

        while start.elapsed() < max_wait {
            if condition().await {
                return true;
            }
            sleep(Duration::from_millis(10)).await;
        }

        false
    }
}

/// Scriptable playback backend that counts every decoder it hands out
pub mod mock_backend {
    use crate::models::{Locator, MediaItem};
    use crate::player::{Decoder, MediaBackend};
    use anyhow::{Context, Result, bail};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::Semaphore;

    struct MockState {
        started: Mutex<HashMap<String, usize>>,
        failing: Mutex<HashSet<String>>,
        stuck: Mutex<HashSet<String>>,
        gated: Mutex<HashSet<String>>,
        gate: Semaphore,
        completed: AtomicUsize,
        live: AtomicUsize,
        max_live: AtomicUsize,
        releases: AtomicUsize,
        leaked: AtomicUsize,
        plays: AtomicUsize,
        pauses: AtomicUsize,
    }

    impl Default for MockState {
        fn default() -> Self {
            Self {
                started: Mutex::default(),
                failing: Mutex::default(),
                stuck: Mutex::default(),
                gated: Mutex::default(),
                gate: Semaphore::new(0),
                completed: AtomicUsize::new(0),
                live: AtomicUsize::new(0),
                max_live: AtomicUsize::new(0),
                releases: AtomicUsize::new(0),
                leaked: AtomicUsize::new(0),
                plays: AtomicUsize::new(0),
                pauses: AtomicUsize::new(0),
            }
        }
    }

    impl MockState {
        fn decoder_created(&self) {
            self.completed.fetch_add(1, Ordering::SeqCst);
            let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_live.fetch_max(live, Ordering::SeqCst);
        }
    }

    #[derive(Clone, Default)]
    pub struct MockBackend {
        state: Arc<MockState>,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every acquisition of `locator` fails.
        pub fn fail(&self, locator: &str) {
            self.state.failing.lock().unwrap().insert(locator.to_string());
        }

        /// Decoders for `locator` report an error from every unload.
        pub fn fail_unload(&self, locator: &str) {
            self.state.stuck.lock().unwrap().insert(locator.to_string());
        }

        /// Acquisitions of `locator` block until [`Self::open_gate`] is called.
        pub fn gate(&self, locator: &str) {
            self.state.gated.lock().unwrap().insert(locator.to_string());
        }

        pub fn open_gate(&self, permits: usize) {
            self.state.gate.add_permits(permits);
        }

        pub fn started(&self, locator: &str) -> usize {
            self.state
                .started
                .lock()
                .unwrap()
                .get(locator)
                .copied()
                .unwrap_or(0)
        }

        pub fn total_started(&self) -> usize {
            self.state.started.lock().unwrap().values().sum()
        }

        pub fn completed(&self) -> usize {
            self.state.completed.load(Ordering::SeqCst)
        }

        pub fn live(&self) -> usize {
            self.state.live.load(Ordering::SeqCst)
        }

        pub fn max_live(&self) -> usize {
            self.state.max_live.load(Ordering::SeqCst)
        }

        pub fn releases(&self) -> usize {
            self.state.releases.load(Ordering::SeqCst)
        }

        /// Decoders dropped without ever being unloaded.
        pub fn leaked(&self) -> usize {
            self.state.leaked.load(Ordering::SeqCst)
        }

        pub fn plays(&self) -> usize {
            self.state.plays.load(Ordering::SeqCst)
        }

        pub fn pauses(&self) -> usize {
            self.state.pauses.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MediaBackend for MockBackend {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn acquire(&self, item: &MediaItem) -> Result<Box<dyn Decoder>> {
            let locator = item.locator.as_str().to_string();
            *self
                .state
                .started
                .lock()
                .unwrap()
                .entry(locator.clone())
                .or_insert(0) += 1;

            let gated = self.state.gated.lock().unwrap().contains(&locator);
            if gated {
                let permit = self.state.gate.acquire().await.context("Gate closed")?;
                permit.forget();
            }

            tokio::task::yield_now().await;

            if self.state.failing.lock().unwrap().contains(&locator) {
                bail!("Unreachable locator {}", locator);
            }

            self.state.decoder_created();
            Ok(Box::new(MockDecoder {
                locator: item.locator.clone(),
                state: Arc::clone(&self.state),
                unloaded: false,
            }))
        }
    }

    struct MockDecoder {
        locator: Locator,
        state: Arc<MockState>,
        unloaded: bool,
    }

    #[async_trait]
    impl Decoder for MockDecoder {
        fn locator(&self) -> &Locator {
            &self.locator
        }

        async fn play(&mut self) -> Result<()> {
            if self.unloaded {
                bail!("Decoder already unloaded");
            }
            self.state.plays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn pause(&mut self) -> Result<()> {
            if self.unloaded {
                bail!("Decoder already unloaded");
            }
            self.state.pauses.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn unload(&mut self) -> Result<()> {
            if self.unloaded {
                return Ok(());
            }
            tokio::task::yield_now().await;
            if self.state.stuck.lock().unwrap().contains(self.locator.as_str()) {
                bail!("Decoder for {} refused to unload", self.locator);
            }
            self.unloaded = true;
            self.state.live.fetch_sub(1, Ordering::SeqCst);
            self.state.releases.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl Drop for MockDecoder {
        fn drop(&mut self) {
            if !self.unloaded {
                self.state.live.fetch_sub(1, Ordering::SeqCst);
                self.state.leaked.fetch_add(1, Ordering::SeqCst);
            }
        }
    }
}
