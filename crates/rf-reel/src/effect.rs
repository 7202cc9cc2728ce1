//! Stop feedback effect seam
//!
//! The reel plays a feedback effect (particles, flash, sound) when it settles.
//! Rendering lives in the presentation layer; the controller only needs to
//! tell it when to clear and when to fire.

use parking_lot::Mutex;
use std::sync::Arc;

/// Feedback played when the reel settles on an item
pub trait StopEffect: Send {
    /// Stop emitting and clear anything still visible. Called on spin start.
    fn reset(&mut self);

    /// Clear and play from the beginning. Called on settle.
    fn play(&mut self);
}

/// Effect that only counts calls. Useful for headless hosts and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountingEffect {
    pub resets: u32,
    pub plays: u32,
}

impl StopEffect for CountingEffect {
    fn reset(&mut self) {
        self.resets += 1;
    }

    fn play(&mut self) {
        self.plays += 1;
    }
}

/// Shared handle, so the host can keep observing an effect it handed over
impl<T: StopEffect> StopEffect for Arc<Mutex<T>> {
    fn reset(&mut self) {
        self.lock().reset();
    }

    fn play(&mut self) {
        self.lock().play();
    }
}
