//! Reel Motion Controller
//!
//! Per-frame simulation of one reel:
//! 1. Spin-up toward `max_speed` at `acceleration`
//! 2. On stop request, slow toward zero at `deceleration`
//! 3. Once slow enough, snap the nearest item onto the center line with an
//!    eased correction
//! 4. Settle: zero everything, fire the stop effect, report `SpinStopped`
//!
//! Alignment and speed update never run in the same frame.

use parking_lot::Mutex;
use rf_signal::{Signal, SignalBus, SubscriptionId, names};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::MotionConfig;
use crate::effect::StopEffect;
use crate::motion::{MotionPhase, MotionState};
use crate::track::{ItemGeometry, ReelTrack, Viewport};

/// Read-only view of the reel for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelSnapshot {
    pub phase: MotionPhase,
    pub speed: f32,
    pub target_speed: f32,
    pub center_line: f32,
    /// Item offsets in slot order
    pub offsets: Vec<f32>,
    /// Slot currently nearest the center line
    pub centered: Option<usize>,
}

/// Drives a [`ReelTrack`] frame by frame
pub struct ReelMotionController {
    config: MotionConfig,
    track: ReelTrack,
    motion: MotionState,
    effect: Option<Box<dyn StopEffect>>,
    /// Completed stop sequences
    stops: u64,
}

impl ReelMotionController {
    /// Create a controller over an already built track
    pub fn new(config: MotionConfig, track: ReelTrack) -> Self {
        Self {
            config,
            track,
            motion: MotionState::at_rest(),
            effect: None,
            stops: 0,
        }
    }

    /// Build the track from layout geometry and wrap it
    pub fn from_geometry(
        config: MotionConfig,
        items: &[ItemGeometry],
        viewport: Option<Viewport>,
    ) -> Self {
        Self::new(config, ReelTrack::new(items, viewport))
    }

    /// Attach a stop feedback effect
    pub fn with_effect(mut self, effect: impl StopEffect + 'static) -> Self {
        self.effect = Some(Box::new(effect));
        self
    }

    pub fn set_effect(&mut self, effect: Option<Box<dyn StopEffect>>) {
        self.effect = effect;
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn track(&self) -> &ReelTrack {
        &self.track
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn phase(&self) -> MotionPhase {
        self.motion.phase()
    }

    pub fn speed(&self) -> f32 {
        self.motion.speed
    }

    pub fn is_spinning(&self) -> bool {
        self.motion.spinning
    }

    pub fn is_aligning(&self) -> bool {
        self.motion.aligning
    }

    /// Number of stop sequences completed so far
    pub fn completed_stops(&self) -> u64 {
        self.stops
    }

    pub fn snapshot(&self) -> ReelSnapshot {
        ReelSnapshot {
            phase: self.motion.phase(),
            speed: self.motion.speed,
            target_speed: self.motion.target_speed,
            center_line: self.track.center_line(),
            offsets: self.track.offsets().collect(),
            centered: self.track.nearest_to_center(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SIGNAL HANDLERS
    // ═══════════════════════════════════════════════════════════════════════

    /// Begin (or re-arm) spinning toward max speed
    pub fn start_spin(&mut self) {
        if self.track.is_empty() {
            return;
        }

        self.motion.stop_requested = false;
        self.motion.aligning = false;
        self.motion.spinning = true;
        self.motion.target_speed = self.config.max_speed;

        if let Some(effect) = self.effect.as_mut() {
            effect.reset();
        }

        log::debug!("reel: spin start (speed {:.1})", self.motion.speed);
    }

    /// Ask the reel to come to rest.
    ///
    /// A reel that is not spinning answers with `SpinStopped` right away so
    /// a waiting lifecycle is never left hanging.
    pub fn request_stop(&mut self) -> Option<Signal> {
        if !self.motion.spinning {
            log::debug!("reel: stop requested while idle, acknowledging");
            return Some(Signal::SpinStopped);
        }

        self.motion.stop_requested = true;
        self.motion.target_speed = 0.0;
        log::debug!("reel: stop requested at speed {:.1}", self.motion.speed);
        None
    }

    // ═══════════════════════════════════════════════════════════════════════
    // FRAME UPDATE
    // ═══════════════════════════════════════════════════════════════════════

    /// Advance the simulation by `dt` seconds.
    ///
    /// Returns `SpinStopped` on the frame the reel settles.
    pub fn update(&mut self, dt: f32) -> Option<Signal> {
        if self.track.is_empty() {
            return None;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if self.motion.aligning {
            return self.update_alignment(dt);
        }

        if !self.motion.spinning && self.motion.speed <= 0.0 {
            return None;
        }

        self.motion
            .step_speed(self.config.acceleration, self.config.deceleration, dt);

        if self.motion.speed > 0.0 {
            self.track.advance(self.motion.speed * dt);
        }

        if self.motion.stop_requested && self.motion.speed <= self.config.stop_speed_threshold {
            return self.begin_alignment();
        }

        None
    }

    fn begin_alignment(&mut self) -> Option<Signal> {
        let total = self
            .track
            .nearest_to_center()
            .and_then(|index| self.track.correction_for(index))
            .unwrap_or(0.0);

        self.motion.begin_alignment(total);
        log::debug!(
            "reel: aligning {:.2} units at speed {:.1}",
            total,
            self.motion.speed
        );

        if total.abs() <= self.config.align_epsilon {
            return Some(self.settle());
        }
        None
    }

    fn update_alignment(&mut self, dt: f32) -> Option<Signal> {
        self.motion.align_elapsed += dt;
        let t = (self.motion.align_elapsed / self.config.align_duration).clamp(0.0, 1.0);
        let target_applied = self.motion.align_total * self.config.align_easing.evaluate(t);
        let delta = target_applied - self.motion.align_applied;
        self.motion.align_applied = target_applied;

        if delta != 0.0 {
            self.track.shift(delta);
            self.track.recycle();
        }

        if t >= 1.0 {
            return Some(self.settle());
        }
        None
    }

    fn settle(&mut self) -> Signal {
        self.motion.reset();
        self.stops += 1;

        if let Some(effect) = self.effect.as_mut() {
            effect.play();
        }

        log::debug!(
            "reel: settled on slot {:?} (stop #{})",
            self.track.nearest_to_center(),
            self.stops
        );
        Signal::SpinStopped
    }

    // ═══════════════════════════════════════════════════════════════════════
    // BUS WIRING
    // ═══════════════════════════════════════════════════════════════════════

    /// Subscribe a shared controller to the spin request signals.
    ///
    /// The controller lock is released before any answer is published, so
    /// the answer may re-enter other subscribers freely.
    pub fn attach(controller: &Arc<Mutex<Self>>, bus: &SignalBus) -> [SubscriptionId; 2] {
        let start = Arc::clone(controller);
        let start_id = bus.subscribe(names::SPIN_START_REQUESTED, move |_, _| {
            start.lock().start_spin();
        });

        let stop = Arc::clone(controller);
        let stop_id = bus.subscribe(names::SPIN_STOP_REQUESTED, move |bus, _| {
            let answer = stop.lock().request_stop();
            if let Some(signal) = answer {
                bus.publish(&signal);
            }
        });

        [start_id, stop_id]
    }

    /// Run one frame on a shared controller and publish its answer
    pub fn tick_shared(controller: &Arc<Mutex<Self>>, bus: &SignalBus, dt: f32) {
        let answer = controller.lock().update(dt);
        if let Some(signal) = answer {
            bus.publish(&signal);
        }
    }
}

impl std::fmt::Debug for ReelMotionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReelMotionController")
            .field("config", &self.config)
            .field("track", &self.track)
            .field("motion", &self.motion)
            .field("has_effect", &self.effect.is_some())
            .field("stops", &self.stops)
            .finish()
    }
}
