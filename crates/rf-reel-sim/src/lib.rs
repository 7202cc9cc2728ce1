//! # rf-reel-sim — Headless host for the reel spin core
//!
//! Plays the part of the game engine: owns the signal bus, drives a frame
//! clock, feeds button presses and records what happens.
//!
//! ## Architecture
//!
//! ```text
//!  press("Start"/"Stop")          tick(dt)
//!          │                         │
//!          v                         v
//!     ┌─────────┐   OnBtn    ┌──────────────┐
//!     │ SpinRig │ ─────────▶ │ SpinLifecycle│──┐ ReelSpinStartRequested
//!     └─────────┘            └──────────────┘  │ ReelSpinStopRequested
//!          │                        ▲          v
//!          │                        │   ┌──────────────────────┐
//!          │       ReelSpinStopped  └───│ ReelMotionController │
//!          │                            └──────────────────────┘
//!          v
//!     SpinTrace (signals, phase entries, settles on the frame clock)
//! ```

pub mod config;
pub mod rig;
pub mod trace;

pub use config::*;
pub use rig::*;
pub use trace::*;

use rf_lifecycle::LifecycleError;
use rf_reel::ReelError;
use thiserror::Error;

/// Rig error types
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Reel error: {0}")]
    Reel(#[from] ReelError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Frame step must be positive and finite, got {0}")]
    InvalidFrameStep(f32),

    #[error("Timed out after {waited_secs:.2}s waiting in {phase}")]
    Timeout { phase: String, waited_secs: f64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;
