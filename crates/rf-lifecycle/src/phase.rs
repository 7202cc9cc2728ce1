//! Lifecycle phases and the pure transition function

use rf_signal::{ButtonState, Signal, buttons};
use serde::{Deserialize, Serialize};

/// One discrete state of the spin lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// Initial state, leaves immediately
    #[default]
    Boot,
    /// Waiting for the start button
    Idle,
    /// Reel spinning up; stop locked until the minimum dwell passes
    Accelerating,
    /// Reel at speed; waiting for the stop button
    Running,
    /// Waiting for the reel to settle
    Stopping,
}

/// Inputs that can move the lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A named UI button was pressed
    Button(String),
    /// The Accelerating dwell timer fired
    DwellElapsed,
    /// The reel reported it has settled
    SpinStopped,
}

impl LifecycleEvent {
    /// Map an inbound bus signal; outbound-only signals map to `None`
    pub fn from_signal(signal: &Signal) -> Option<Self> {
        match signal {
            Signal::ButtonPressed { name } => Some(Self::Button(name.clone())),
            Signal::SpinStopped => Some(Self::SpinStopped),
            Signal::SpinStartRequested | Signal::SpinStopRequested => None,
        }
    }
}

/// What a phase does on entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnterAction {
    /// Button flags written to the model
    pub buttons: ButtonState,
    /// Signal fired to the reel
    pub emit: Option<Signal>,
    /// Whether the dwell timer is armed
    pub schedule_dwell: bool,
}

impl LifecyclePhase {
    pub const ALL: [LifecyclePhase; 5] = [
        LifecyclePhase::Boot,
        LifecyclePhase::Idle,
        LifecyclePhase::Accelerating,
        LifecyclePhase::Running,
        LifecyclePhase::Stopping,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Boot => "Boot",
            Self::Idle => "Idle",
            Self::Accelerating => "Accelerating",
            Self::Running => "Running",
            Self::Stopping => "Stopping",
        }
    }

    /// Button enablement, a pure function of phase
    pub fn buttons(&self) -> ButtonState {
        match self {
            Self::Boot | Self::Idle => ButtonState::new(true, false),
            Self::Accelerating | Self::Stopping => ButtonState::new(false, false),
            Self::Running => ButtonState::new(false, true),
        }
    }

    /// Entry action of this phase
    pub fn enter_action(&self) -> EnterAction {
        let emit = match self {
            Self::Accelerating => Some(Signal::SpinStartRequested),
            Self::Stopping => Some(Signal::SpinStopRequested),
            _ => None,
        };
        EnterAction {
            buttons: self.buttons(),
            emit,
            schedule_dwell: matches!(self, Self::Accelerating),
        }
    }

    /// Eventless transition taken right after entry
    pub fn follow_up(&self) -> Option<LifecyclePhase> {
        match self {
            Self::Boot => Some(Self::Idle),
            _ => None,
        }
    }
}

/// Pure transition function.
///
/// Returns `None` when the event is ignored in `phase`. Button presses are
/// never queued: a press in a phase that does not react to it is dropped.
pub fn transition(phase: LifecyclePhase, event: &LifecycleEvent) -> Option<LifecyclePhase> {
    use LifecyclePhase::*;

    match (phase, event) {
        (Idle, LifecycleEvent::Button(name)) if name == buttons::START => Some(Accelerating),
        (Accelerating, LifecycleEvent::DwellElapsed) => Some(Running),
        (Running, LifecycleEvent::Button(name)) if name == buttons::STOP => Some(Stopping),
        (Stopping, LifecycleEvent::SpinStopped) => Some(Idle),
        _ => None,
    }
}
