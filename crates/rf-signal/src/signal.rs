//! Signal — the messages exchanged between lifecycle and reel

use serde::{Deserialize, Serialize};

/// Wire names of every signal, used as bus subscription keys
pub mod names {
    /// A UI button was pressed (carries the button name)
    pub const BUTTON_PRESSED: &str = "OnBtn";
    /// Lifecycle asks the reel to spin up
    pub const SPIN_START_REQUESTED: &str = "ReelSpinStartRequested";
    /// Lifecycle asks the reel to come to rest
    pub const SPIN_STOP_REQUESTED: &str = "ReelSpinStopRequested";
    /// Reel has settled on a centered item
    pub const SPIN_STOPPED: &str = "ReelSpinStopped";
}

/// Button names carried by [`Signal::ButtonPressed`]
pub mod buttons {
    pub const START: &str = "Start";
    pub const STOP: &str = "Stop";
}

/// Model field names written on every lifecycle phase entry
pub mod fields {
    pub const START_ENABLED: &str = "BtnStartEnable";
    pub const STOP_ENABLED: &str = "BtnStopEnable";
}

/// A signal fired on the bus
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// Button press from the presentation layer
    ButtonPressed {
        /// Button identifier, compared against [`buttons`]
        name: String,
    },
    SpinStartRequested,
    SpinStopRequested,
    SpinStopped,
}

impl Signal {
    /// Convenience constructor for a button press
    pub fn button(name: impl Into<String>) -> Self {
        Self::ButtonPressed { name: name.into() }
    }

    /// Bus name this signal is addressed to
    pub fn name(&self) -> &'static str {
        match self {
            Self::ButtonPressed { .. } => names::BUTTON_PRESSED,
            Self::SpinStartRequested => names::SPIN_START_REQUESTED,
            Self::SpinStopRequested => names::SPIN_STOP_REQUESTED,
            Self::SpinStopped => names::SPIN_STOPPED,
        }
    }

    /// Button name, if this is a button press
    pub fn button_name(&self) -> Option<&str> {
        match self {
            Self::ButtonPressed { name } => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Externally visible button enablement, written on every phase entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ButtonState {
    #[serde(rename = "BtnStartEnable")]
    pub start_enabled: bool,
    #[serde(rename = "BtnStopEnable")]
    pub stop_enabled: bool,
}

impl ButtonState {
    pub const fn new(start_enabled: bool, stop_enabled: bool) -> Self {
        Self {
            start_enabled,
            stop_enabled,
        }
    }

    /// Look up a flag by its model field name
    pub fn field(&self, name: &str) -> Option<bool> {
        match name {
            fields::START_ENABLED => Some(self.start_enabled),
            fields::STOP_ENABLED => Some(self.stop_enabled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_names() {
        assert_eq!(Signal::button(buttons::START).name(), names::BUTTON_PRESSED);
        assert_eq!(Signal::SpinStartRequested.name(), names::SPIN_START_REQUESTED);
        assert_eq!(Signal::SpinStopRequested.name(), names::SPIN_STOP_REQUESTED);
        assert_eq!(Signal::SpinStopped.name(), names::SPIN_STOPPED);
    }

    #[test]
    fn test_button_name() {
        assert_eq!(Signal::button("Stop").button_name(), Some("Stop"));
        assert_eq!(Signal::SpinStopped.button_name(), None);
    }

    #[test]
    fn test_button_state_fields() {
        let state = ButtonState::new(true, false);
        assert_eq!(state.field(fields::START_ENABLED), Some(true));
        assert_eq!(state.field(fields::STOP_ENABLED), Some(false));
        assert_eq!(state.field("Unknown"), None);
    }
}
