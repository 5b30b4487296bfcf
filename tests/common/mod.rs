#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

use newsroom_gallery::{Config, GalleryHandle, GallerySession, GalleryView};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use mocks::ScriptedBackend;

pub struct TestGallery {
    pub handle: GalleryHandle,
    pub backend: ScriptedBackend,
    pub session: JoinHandle<()>,
}

impl TestGallery {
    pub fn start(backend: ScriptedBackend) -> Self {
        Self::with_config(backend, &Config::default())
    }

    pub fn with_config(backend: ScriptedBackend, config: &Config) -> Self {
        let (handle, session) = GallerySession::spawn(Arc::new(backend.clone()), config);
        Self {
            handle,
            backend,
            session,
        }
    }

    /// Wait until a published view satisfies `predicate`.
    pub async fn wait_for(&self, predicate: impl FnMut(&GalleryView) -> bool) -> GalleryView {
        let mut views = self.handle.subscribe();
        let view = tokio::time::timeout(Duration::from_secs(5), views.wait_for(predicate))
            .await
            .expect("Timed out waiting for gallery view")
            .expect("Gallery session stopped")
            .clone();
        view
    }
}
