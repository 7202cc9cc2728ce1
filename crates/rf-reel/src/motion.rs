//! Motion state — speed, phase flags and alignment progress

use serde::{Deserialize, Serialize};

/// Coarse phase derived from the motion flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPhase {
    /// Settled, nothing moves
    #[default]
    Rest,
    /// Spinning toward (or at) cruise speed
    Spinning,
    /// Stop requested, slowing toward the alignment threshold
    Decelerating,
    /// Snapping the nearest item onto the center line
    Aligning,
    /// Coasting down with no spin and no pending stop
    Coasting,
}

/// Transient motion scalars owned by the controller
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionState {
    /// Current scroll speed (units/s, never negative)
    pub speed: f32,
    /// Speed the reel is moving toward
    pub target_speed: f32,
    /// Accepting acceleration toward max speed
    pub spinning: bool,
    /// Decelerating toward zero pending alignment
    pub stop_requested: bool,
    /// Executing the snap phase
    pub aligning: bool,
    /// Time spent in the current alignment (s)
    pub align_elapsed: f32,
    /// Full correction the alignment must apply
    pub align_total: f32,
    /// Correction already applied
    pub align_applied: f32,
}

impl MotionState {
    /// Fully stopped, non-aligning state
    pub fn at_rest() -> Self {
        Self::default()
    }

    /// Back to rest, as on every settle
    pub fn reset(&mut self) {
        *self = Self::at_rest();
    }

    /// Settled: no spin, no alignment, no residual speed
    pub fn is_at_rest(&self) -> bool {
        !self.spinning && !self.aligning && self.speed <= 0.0
    }

    pub fn phase(&self) -> MotionPhase {
        if self.aligning {
            MotionPhase::Aligning
        } else if self.stop_requested {
            MotionPhase::Decelerating
        } else if self.spinning {
            MotionPhase::Spinning
        } else if self.speed > 0.0 {
            MotionPhase::Coasting
        } else {
            MotionPhase::Rest
        }
    }

    /// Step `speed` toward `target_speed` without overshooting.
    ///
    /// Rising speed uses `acceleration`, falling speed uses `deceleration`.
    pub fn step_speed(&mut self, acceleration: f32, deceleration: f32, dt: f32) {
        let rate = if self.target_speed > self.speed {
            acceleration
        } else {
            deceleration
        };
        self.speed = move_towards(self.speed, self.target_speed, rate * dt);
    }

    /// Arm a new alignment of `total` units
    pub fn begin_alignment(&mut self, total: f32) {
        self.stop_requested = false;
        self.aligning = true;
        self.align_total = total;
        self.align_applied = 0.0;
        self.align_elapsed = 0.0;
    }
}

/// Move `current` toward `target` by at most `max_delta`
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + max_delta.copysign(diff)
    }
}
