//! SpinLifecycle — the running state machine
//!
//! Every entry point returns the signals the machine wants fired. The new
//! phase is committed before anything is returned, so a signal that comes
//! straight back (a reel acknowledging a stop while idle, say) finds the
//! machine already in its new phase.

use parking_lot::Mutex;
use rf_signal::{ButtonState, Signal, SignalBus, SubscriptionId, names};
use std::sync::Arc;

use crate::config::LifecycleConfig;
use crate::phase::{LifecycleEvent, LifecyclePhase, transition};
use crate::scheduler::OneShotScheduler;

/// Called on every phase entry with the new phase and its button flags
pub type PhaseObserver = Box<dyn FnMut(LifecyclePhase, ButtonState) + Send>;

/// Spin lifecycle state machine
pub struct SpinLifecycle {
    config: LifecycleConfig,
    phase: LifecyclePhase,
    buttons: ButtonState,
    scheduler: OneShotScheduler,
    started: bool,
    /// Completed Idle → … → Idle rounds
    spins: u64,
    observer: Option<PhaseObserver>,
}

impl SpinLifecycle {
    pub fn new(config: LifecycleConfig) -> Self {
        Self {
            config,
            phase: LifecyclePhase::Boot,
            buttons: ButtonState::default(),
            scheduler: OneShotScheduler::new(),
            started: false,
            spins: 0,
            observer: None,
        }
    }

    /// Register the model writer notified on every phase entry
    pub fn set_observer(&mut self, observer: Option<PhaseObserver>) {
        self.observer = observer;
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Button flags written on the most recent phase entry
    pub fn buttons(&self) -> ButtonState {
        self.buttons
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Completed spin rounds (Stopping → Idle transitions)
    pub fn completed_spins(&self) -> u64 {
        self.spins
    }

    /// Seconds left before Accelerating hands over to Running
    pub fn dwell_remaining(&self) -> Option<f32> {
        self.scheduler.remaining()
    }

    /// Enter Boot (and from there Idle). Only the first call has an effect.
    pub fn start(&mut self) -> Vec<Signal> {
        let mut out = Vec::new();
        if self.started {
            return out;
        }
        self.started = true;
        self.enter(LifecyclePhase::Boot, &mut out);
        out
    }

    /// Feed an inbound bus signal
    pub fn handle(&mut self, signal: &Signal) -> Vec<Signal> {
        match LifecycleEvent::from_signal(signal) {
            Some(event) => self.fire(event),
            None => Vec::new(),
        }
    }

    /// Feed a button press by name
    pub fn press(&mut self, button: &str) -> Vec<Signal> {
        self.fire(LifecycleEvent::Button(button.to_string()))
    }

    /// Advance the frame clock; fires the dwell transition when due
    pub fn tick(&mut self, dt: f32) -> Vec<Signal> {
        match self.scheduler.advance(dt) {
            Some((owner, event)) if owner == self.phase => self.fire(event),
            Some((owner, _)) => {
                log::warn!(
                    "lifecycle: dropping timer armed by {} while in {}",
                    owner.name(),
                    self.phase.name()
                );
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    fn fire(&mut self, event: LifecycleEvent) -> Vec<Signal> {
        let mut out = Vec::new();
        if !self.started {
            log::debug!("lifecycle: {:?} before start, ignored", event);
            return out;
        }

        match transition(self.phase, &event) {
            Some(next) => self.change(next, &mut out),
            None => log::trace!("lifecycle: {:?} ignored in {}", event, self.phase.name()),
        }
        out
    }

    fn change(&mut self, next: LifecyclePhase, out: &mut Vec<Signal>) {
        log::debug!("lifecycle: {} -> {}", self.phase.name(), next.name());
        self.scheduler.cancel();
        if self.phase == LifecyclePhase::Stopping && next == LifecyclePhase::Idle {
            self.spins += 1;
        }
        self.enter(next, out);
    }

    fn enter(&mut self, phase: LifecyclePhase, out: &mut Vec<Signal>) {
        self.phase = phase;

        let action = phase.enter_action();
        self.buttons = action.buttons;
        if let Some(observer) = self.observer.as_mut() {
            observer(phase, action.buttons);
        }

        if action.schedule_dwell {
            self.scheduler.schedule(
                phase,
                self.config.min_spin_secs,
                LifecycleEvent::DwellElapsed,
            );
        }

        if let Some(signal) = action.emit {
            out.push(signal);
        }

        if let Some(next) = phase.follow_up() {
            self.change(next, out);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // BUS WIRING
    // ═══════════════════════════════════════════════════════════════════════

    /// Subscribe a shared lifecycle to button presses and reel stops.
    ///
    /// Signals the machine returns are published after its lock is released.
    pub fn attach(lifecycle: &Arc<Mutex<Self>>, bus: &SignalBus) -> [SubscriptionId; 2] {
        let on_button = Arc::clone(lifecycle);
        let button_id = bus.subscribe(names::BUTTON_PRESSED, move |bus, signal| {
            let out = on_button.lock().handle(signal);
            bus.publish_all(out);
        });

        let on_stopped = Arc::clone(lifecycle);
        let stopped_id = bus.subscribe(names::SPIN_STOPPED, move |bus, signal| {
            let out = on_stopped.lock().handle(signal);
            bus.publish_all(out);
        });

        [button_id, stopped_id]
    }

    /// Start a shared lifecycle and publish its entry signals
    pub fn start_shared(lifecycle: &Arc<Mutex<Self>>, bus: &SignalBus) {
        let out = lifecycle.lock().start();
        bus.publish_all(out);
    }

    /// Advance a shared lifecycle and publish what it returns
    pub fn tick_shared(lifecycle: &Arc<Mutex<Self>>, bus: &SignalBus, dt: f32) {
        let out = lifecycle.lock().tick(dt);
        bus.publish_all(out);
    }
}

impl Default for SpinLifecycle {
    fn default() -> Self {
        Self::new(LifecycleConfig::default())
    }
}

impl std::fmt::Debug for SpinLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpinLifecycle")
            .field("phase", &self.phase)
            .field("buttons", &self.buttons)
            .field("scheduler", &self.scheduler)
            .field("started", &self.started)
            .field("spins", &self.spins)
            .finish()
    }
}
