//! Position tracking over an open media sequence.
//!
//! The navigator is pure bookkeeping: it never touches decoders. The session
//! retargets playback after every move it reports.

use crate::models::{MediaItem, MediaSequence};

#[derive(Debug, Clone, PartialEq, Eq)]
struct GalleryState {
    sequence: MediaSequence,
    current_index: usize,
}

/// Current position in the gallery, or nothing while the gallery is closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryNavigator {
    state: Option<GalleryState>,
}

impl GalleryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `sequence` starting at `initial_index`, clamped into range.
    /// `MediaSequence` is never empty, so the index is always valid.
    pub fn open(&mut self, sequence: MediaSequence, initial_index: usize) -> &MediaItem {
        let current_index = initial_index.min(sequence.len() - 1);
        let state = self.state.insert(GalleryState {
            sequence,
            current_index,
        });
        &state.sequence.items()[state.current_index]
    }

    pub fn close(&mut self) {
        self.state = None;
    }

    pub fn is_visible(&self) -> bool {
        self.state.is_some()
    }

    /// Advance with wraparound. `None` while closed.
    pub fn next(&mut self) -> Option<&MediaItem> {
        self.step(|index, len| (index + 1) % len)
    }

    /// Step back with wraparound. `None` while closed.
    pub fn previous(&mut self) -> Option<&MediaItem> {
        self.step(|index, len| (index + len - 1) % len)
    }

    /// Jump straight to `index`, clamped into range.
    pub fn select(&mut self, index: usize) -> Option<&MediaItem> {
        self.step(|_, len| index.min(len - 1))
    }

    pub fn current(&self) -> Option<&MediaItem> {
        self.state
            .as_ref()
            .and_then(|state| state.sequence.get(state.current_index))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.state.as_ref().map(|state| state.current_index)
    }

    /// Number of items, 0 while closed.
    pub fn len(&self) -> usize {
        self.state.as_ref().map_or(0, |state| state.sequence.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sequence(&self) -> Option<&MediaSequence> {
        self.state.as_ref().map(|state| &state.sequence)
    }

    fn step(&mut self, advance: impl FnOnce(usize, usize) -> usize) -> Option<&MediaItem> {
        let state = self.state.as_mut()?;
        state.current_index = advance(state.current_index, state.sequence.len());
        state.sequence.get(state.current_index)
    }
}
