//! # rf-reel — Reel Motion Controller
//!
//! Frame-stepped simulation of a single vertically scrolling slot reel.
//!
//! ## Architecture
//!
//! ```text
//! ReelMotionController
//!     │
//!     ├── ReelTrack    (item arena, step/extent, center line, wrap threshold)
//!     ├── MotionState  (speed, spin/stop/align flags, alignment progress)
//!     ├── MotionConfig (speed limits, rates, alignment timing)
//!     └── StopEffect   (optional feedback handle)
//!           │
//!           v
//!     update(dt) → Option<Signal::SpinStopped>
//! ```
//!
//! The controller knows nothing about the spin lifecycle. It reacts to
//! `SpinStartRequested` / `SpinStopRequested` and answers with `SpinStopped`
//! once the reel has snapped onto a centered item.

pub mod config;
pub mod controller;
pub mod easing;
pub mod effect;
pub mod motion;
pub mod track;

pub use config::*;
pub use controller::*;
pub use easing::*;
pub use effect::*;
pub use motion::*;
pub use track::*;

use thiserror::Error;

/// Reel error types
#[derive(Debug, Error)]
pub enum ReelError {
    #[error("Invalid motion config: {0}")]
    InvalidConfig(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type ReelResult<T> = Result<T, ReelError>;
