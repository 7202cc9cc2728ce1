//! # rf-signal — Reel spin signal vocabulary
//!
//! The lifecycle state machine and the reel motion controller never call each
//! other. They are correlated only through a handful of named signals that are
//! fired on a [`SignalBus`] and delivered synchronously to every subscriber.
//!
//! ## Flow
//!
//! ```text
//! ButtonPressed("Start") ─▶ Lifecycle ─▶ SpinStartRequested ─▶ Reel
//! ButtonPressed("Stop")  ─▶ Lifecycle ─▶ SpinStopRequested  ─▶ Reel
//!                           Lifecycle ◀─ SpinStopped        ◀─ Reel
//! ```

pub mod bus;
pub mod signal;

pub use bus::*;
pub use signal::*;
