//! Motion configuration

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::{ReelError, ReelResult};

/// Speed limits, rates and alignment timing for one reel
///
/// Distances are in content units, times in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Cruise speed while spinning (units/s)
    #[serde(default = "default_max_speed")]
    pub max_speed: f32,
    /// Spin-up rate (units/s²)
    #[serde(default = "default_acceleration")]
    pub acceleration: f32,
    /// Slow-down rate (units/s²), expected to exceed `acceleration`
    #[serde(default = "default_deceleration")]
    pub deceleration: f32,
    /// Alignment begins once a stopping reel is at or below this speed
    #[serde(default = "default_stop_speed_threshold")]
    pub stop_speed_threshold: f32,
    /// Length of the snap-to-center phase (s)
    #[serde(default = "default_align_duration")]
    pub align_duration: f32,
    /// Corrections at or below this magnitude settle without animating
    #[serde(default = "default_align_epsilon")]
    pub align_epsilon: f32,
    /// Curve used for the snap-to-center phase
    #[serde(default)]
    pub align_easing: Easing,
}

fn default_max_speed() -> f32 {
    1500.0
}
fn default_acceleration() -> f32 {
    900.0
}
fn default_deceleration() -> f32 {
    2000.0
}
fn default_stop_speed_threshold() -> f32 {
    45.0
}
fn default_align_duration() -> f32 {
    0.32
}
fn default_align_epsilon() -> f32 {
    0.5
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_speed: default_max_speed(),
            acceleration: default_acceleration(),
            deceleration: default_deceleration(),
            stop_speed_threshold: default_stop_speed_threshold(),
            align_duration: default_align_duration(),
            align_epsilon: default_align_epsilon(),
            align_easing: Easing::default(),
        }
    }
}

impl MotionConfig {
    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> ReelResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> ReelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every value is usable by the simulation
    pub fn validate(&self) -> ReelResult<()> {
        let positive = [
            ("max_speed", self.max_speed),
            ("acceleration", self.acceleration),
            ("deceleration", self.deceleration),
            ("align_duration", self.align_duration),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ReelError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }

        let non_negative = [
            ("stop_speed_threshold", self.stop_speed_threshold),
            ("align_epsilon", self.align_epsilon),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ReelError::InvalidConfig(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }

        if self.stop_speed_threshold >= self.max_speed {
            return Err(ReelError::InvalidConfig(format!(
                "stop_speed_threshold ({}) must be below max_speed ({})",
                self.stop_speed_threshold, self.max_speed
            )));
        }

        if self.deceleration <= self.acceleration {
            log::warn!(
                "deceleration ({}) does not exceed acceleration ({}); stops will feel sluggish",
                self.deceleration,
                self.acceleration
            );
        }

        Ok(())
    }

    /// Time to reach `max_speed` from rest (s)
    pub fn spin_up_time(&self) -> f32 {
        self.max_speed / self.acceleration
    }

    /// Time for a reel at `speed` to decay to the alignment threshold (s)
    pub fn slow_down_time(&self, speed: f32) -> f32 {
        ((speed - self.stop_speed_threshold) / self.deceleration).max(0.0)
    }
}
