//! # rf-lifecycle — Spin lifecycle state machine
//!
//! Owns the authoritative spin/stop protocol and the button enablement
//! policy.
//!
//! ```text
//! Boot ─▶ Idle ──"Start"──▶ Accelerating ──min dwell──▶ Running
//!          ▲                                              │
//!          └──── SpinStopped ◀──── Stopping ◀────"Stop"───┘
//! ```
//!
//! - **Accelerating** is timed: the stop button stays disabled until the
//!   minimum spin time has passed, so a premature stop cannot race the timer.
//! - **Stopping** is event-driven: it waits for the reel's own `SpinStopped`
//!   rather than guessing how long deceleration and alignment take.

pub mod config;
pub mod machine;
pub mod phase;
pub mod scheduler;

pub use config::*;
pub use machine::*;
pub use phase::*;
pub use scheduler::*;

use thiserror::Error;

/// Lifecycle error types
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Invalid lifecycle config: {0}")]
    InvalidConfig(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type LifecycleResult<T> = Result<T, LifecycleError>;
