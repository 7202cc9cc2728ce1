//! Easing curves for the snap-to-center phase

use serde::{Deserialize, Serialize};

/// Easing curve applied to the alignment correction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// y = t
    Linear,
    /// Hermite smoothstep (slow start and end)
    SmoothStep,
    /// y = 1 - (1 - t)^3 (fast start, soft landing)
    #[default]
    CubicOut,
}

impl Easing {
    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "Linear",
            Easing::SmoothStep => "SmoothStep",
            Easing::CubicOut => "CubicOut",
        }
    }

    /// Evaluate curve at position t (0.0 - 1.0)
    ///
    /// Input is clamped; every curve maps 0 to 0 and 1 to 1.
    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
            Easing::CubicOut => {
                let u = 1.0 - t;
                1.0 - u * u * u
            }
        }
    }
}
