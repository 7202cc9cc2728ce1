//! SpinRig — bus, lifecycle and reel wired to one frame clock
//!
//! The rig stands in for the engine: it owns the clock, forwards button
//! presses to the bus and ticks the lifecycle before the reel on every frame.

use chrono::Utc;
use parking_lot::Mutex;
use rf_lifecycle::{LifecyclePhase, PhaseObserver, SpinLifecycle};
use rf_reel::{CountingEffect, ItemGeometry, ReelMotionController, ReelSnapshot};
use rf_signal::{ButtonState, Signal, SignalBus, buttons, names};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::RigConfig;
use crate::trace::{SpinTrace, TraceKind};
use crate::{SimError, SimResult};

/// Default frame step (60 fps)
pub const DEFAULT_FRAME_STEP: f32 = 1.0 / 60.0;

/// Slack added on top of the computed worst-case settle time
const SETTLE_SLACK_SECS: f64 = 5.0;

/// Summary of one simulated Start → Stop → settle round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinReport {
    /// 1-based index of the completed round
    pub spin_index: u64,
    pub started_at: f64,
    pub stop_pressed_at: f64,
    /// When the reel began snapping; `None` if it settled without easing
    pub align_started_at: Option<f64>,
    pub settled_at: f64,
    /// Slot left on the center line
    pub centered: Option<usize>,
    /// Distance between that slot's center and the center line
    pub center_error: Option<f32>,
}

impl SpinReport {
    /// Time from Start press to Stop press
    pub fn spin_secs(&self) -> f64 {
        self.stop_pressed_at - self.started_at
    }

    /// Time from Stop press to the lifecycle returning to Idle
    pub fn settle_secs(&self) -> f64 {
        self.settled_at - self.stop_pressed_at
    }
}

/// Headless host around one lifecycle and one reel
pub struct SpinRig {
    config: RigConfig,
    bus: Arc<SignalBus>,
    lifecycle: Arc<Mutex<SpinLifecycle>>,
    reel: Arc<Mutex<ReelMotionController>>,
    effect: Arc<Mutex<CountingEffect>>,
    clock: Arc<Mutex<f64>>,
    trace: Arc<Mutex<SpinTrace>>,
    frames: u64,
}

impl SpinRig {
    /// Validate `config` and build a rig over its synthetic layout
    pub fn new(config: RigConfig) -> SimResult<Self> {
        config.validate()?;
        let geometry = config.layout.item_geometry();
        Ok(Self::with_geometry(config, &geometry))
    }

    /// Build a rig over explicit item geometry; the layout item count is ignored
    pub fn with_geometry(config: RigConfig, items: &[ItemGeometry]) -> Self {
        let bus = Arc::new(SignalBus::new());
        let clock = Arc::new(Mutex::new(0.0_f64));
        let trace = Arc::new(Mutex::new(SpinTrace::new(format!(
            "rig-{}",
            Utc::now().format("%Y%m%d-%H%M%S")
        ))));
        let effect = Arc::new(Mutex::new(CountingEffect::default()));

        // Recorders go first so each signal is logged before anyone reacts to it
        for name in [
            names::BUTTON_PRESSED,
            names::SPIN_START_REQUESTED,
            names::SPIN_STOP_REQUESTED,
            names::SPIN_STOPPED,
        ] {
            let clock = Arc::clone(&clock);
            let trace = Arc::clone(&trace);
            bus.subscribe(name, move |_, signal| {
                let time = *clock.lock();
                trace.lock().push(
                    time,
                    TraceKind::Signal {
                        signal: signal.clone(),
                    },
                );
            });
        }

        let reel = ReelMotionController::from_geometry(
            config.motion.clone(),
            items,
            config.layout.viewport,
        )
        .with_effect(Arc::clone(&effect));
        let reel = Arc::new(Mutex::new(reel));
        ReelMotionController::attach(&reel, &bus);

        let mut lifecycle = SpinLifecycle::new(config.lifecycle.clone());
        lifecycle.set_observer(Some(phase_recorder(&clock, &trace)));
        let lifecycle = Arc::new(Mutex::new(lifecycle));
        SpinLifecycle::attach(&lifecycle, &bus);

        log::info!(
            "rig: {} items, min spin {:.2}s, max speed {:.0}",
            items.len(),
            config.lifecycle.min_spin_secs,
            config.motion.max_speed
        );
        SpinLifecycle::start_shared(&lifecycle, &bus);

        Self {
            config,
            bus,
            lifecycle,
            reel,
            effect,
            clock,
            trace,
            frames: 0,
        }
    }

    pub fn config(&self) -> &RigConfig {
        &self.config
    }

    pub fn bus(&self) -> &Arc<SignalBus> {
        &self.bus
    }

    /// Current rig time in seconds
    pub fn time(&self) -> f64 {
        *self.clock.lock()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.lifecycle.lock().phase()
    }

    pub fn buttons(&self) -> ButtonState {
        self.lifecycle.lock().buttons()
    }

    pub fn completed_spins(&self) -> u64 {
        self.lifecycle.lock().completed_spins()
    }

    pub fn reel_snapshot(&self) -> ReelSnapshot {
        self.reel.lock().snapshot()
    }

    /// How many times the stop effect has played
    pub fn effect_plays(&self) -> u32 {
        self.effect.lock().plays
    }

    /// Copy of everything recorded so far
    pub fn trace(&self) -> SpinTrace {
        self.trace.lock().clone()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // INPUT & CLOCK
    // ═══════════════════════════════════════════════════════════════════════

    /// Publish a button press on the bus
    pub fn press(&self, button: &str) {
        self.bus.publish(&Signal::button(button));
    }

    pub fn press_start(&self) {
        self.press(buttons::START);
    }

    pub fn press_stop(&self) {
        self.press(buttons::STOP);
    }

    /// Advance one frame: lifecycle timers first, then reel motion
    pub fn tick(&mut self, dt: f32) {
        let time = {
            let mut clock = self.clock.lock();
            *clock += f64::from(dt);
            *clock
        };
        self.frames += 1;

        SpinLifecycle::tick_shared(&self.lifecycle, &self.bus, dt);

        let (was_aligning, stops_before) = {
            let reel = self.reel.lock();
            (reel.is_aligning(), reel.completed_stops())
        };
        ReelMotionController::tick_shared(&self.reel, &self.bus, dt);

        let (aligning, speed, stops, centered) = {
            let reel = self.reel.lock();
            (
                reel.is_aligning(),
                reel.speed(),
                reel.completed_stops(),
                reel.track().nearest_to_center(),
            )
        };

        let mut trace = self.trace.lock();
        if aligning && !was_aligning {
            trace.push(time, TraceKind::AlignStart { speed });
        }
        if stops > stops_before {
            trace.push(time, TraceKind::Settled { centered });
        }
    }

    /// Tick for `secs` worth of frames
    pub fn run_for(&mut self, secs: f64, dt: f32) -> SimResult<()> {
        check_step(dt)?;
        let frames = (secs.max(0.0) / f64::from(dt)).round() as u64;
        for _ in 0..frames {
            self.tick(dt);
        }
        Ok(())
    }

    /// Tick until `done` holds; returns the time waited
    pub fn run_until(
        &mut self,
        mut done: impl FnMut(&Self) -> bool,
        timeout_secs: f64,
        dt: f32,
    ) -> SimResult<f64> {
        check_step(dt)?;
        let start = self.time();
        loop {
            let waited = self.time() - start;
            if done(self) {
                return Ok(waited);
            }
            if waited >= timeout_secs {
                return Err(SimError::Timeout {
                    phase: self.phase().name().to_string(),
                    waited_secs: waited,
                });
            }
            self.tick(dt);
        }
    }

    /// Play one full round: press Start, hold, press Stop, wait for Idle.
    ///
    /// `hold_secs` counts from the Start press. The Stop press waits for
    /// Running regardless, so holds shorter than the minimum spin time are
    /// stretched to it.
    pub fn simulate_spin(&mut self, hold_secs: f64, dt: f32) -> SimResult<SpinReport> {
        check_step(dt)?;
        let settle_timeout = self.settle_timeout();
        if self.phase() != LifecyclePhase::Idle {
            self.run_until(|rig| rig.phase() == LifecyclePhase::Idle, settle_timeout, dt)?;
        }

        let started_at = self.time();
        self.press_start();

        let dwell = f64::from(self.config.lifecycle.min_spin_secs);
        self.run_until(
            |rig| rig.phase() == LifecyclePhase::Running,
            dwell + 1.0,
            dt,
        )?;
        let held = self.time() - started_at;
        if hold_secs > held {
            self.run_for(hold_secs - held, dt)?;
        }

        let stop_pressed_at = self.time();
        self.press_stop();
        self.run_until(|rig| rig.phase() == LifecyclePhase::Idle, settle_timeout, dt)?;
        let settled_at = self.time();

        let align_started_at = self
            .trace
            .lock()
            .first_after(stop_pressed_at, |kind| {
                matches!(kind, TraceKind::AlignStart { .. })
            });

        let (centered, center_error) = {
            let reel = self.reel.lock();
            let track = reel.track();
            let centered = track.nearest_to_center();
            let error = centered
                .and_then(|index| track.item_center(index))
                .map(|center| center - track.center_line());
            (centered, error)
        };

        let report = SpinReport {
            spin_index: self.completed_spins(),
            started_at,
            stop_pressed_at,
            align_started_at,
            settled_at,
            centered,
            center_error,
        };
        log::info!(
            "rig: spin #{} held {:.2}s, settled {:.2}s after stop on slot {:?}",
            report.spin_index,
            report.spin_secs(),
            report.settle_secs(),
            report.centered
        );
        Ok(report)
    }

    /// Worst case for the reel to come down from max speed and snap
    fn settle_timeout(&self) -> f64 {
        let motion = &self.config.motion;
        f64::from(motion.slow_down_time(motion.max_speed) + motion.align_duration)
            + SETTLE_SLACK_SECS
    }
}

impl std::fmt::Debug for SpinRig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpinRig")
            .field("time", &self.time())
            .field("frames", &self.frames)
            .field("lifecycle", &*self.lifecycle.lock())
            .field("reel", &*self.reel.lock())
            .finish()
    }
}

fn check_step(dt: f32) -> SimResult<()> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidFrameStep(dt))
    }
}

/// Observer that writes phase entries into the trace
fn phase_recorder(clock: &Arc<Mutex<f64>>, trace: &Arc<Mutex<SpinTrace>>) -> PhaseObserver {
    let clock = Arc::clone(clock);
    let trace = Arc::clone(trace);
    Box::new(move |phase: LifecyclePhase, buttons: ButtonState| {
        log::debug!(
            "rig: {} (start={}, stop={})",
            phase.name(),
            buttons.start_enabled,
            buttons.stop_enabled
        );
        let time = *clock.lock();
        trace.lock().push(time, TraceKind::Phase { phase, buttons });
    })
}
