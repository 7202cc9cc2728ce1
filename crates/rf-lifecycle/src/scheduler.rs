//! One-shot scheduler on the frame clock
//!
//! Holds at most one pending delayed event. Time only moves when the host
//! calls [`OneShotScheduler::advance`]; nothing runs on another thread.

use crate::phase::{LifecycleEvent, LifecyclePhase};

#[derive(Debug, Clone, PartialEq)]
struct Pending {
    /// Phase that armed the timer; the event is only valid there
    owner: LifecyclePhase,
    remaining: f32,
    event: LifecycleEvent,
}

/// Single pending delayed event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OneShotScheduler {
    pending: Option<Pending>,
}

impl OneShotScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `event` to fire after `delay` seconds, replacing any pending one
    pub fn schedule(&mut self, owner: LifecyclePhase, delay: f32, event: LifecycleEvent) {
        self.pending = Some(Pending {
            owner,
            remaining: delay.max(0.0),
            event,
        });
    }

    /// Drop the pending event, if any
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Seconds until the pending event fires
    pub fn remaining(&self) -> Option<f32> {
        self.pending.as_ref().map(|p| p.remaining)
    }

    /// Phase that armed the pending event
    pub fn owner(&self) -> Option<LifecyclePhase> {
        self.pending.as_ref().map(|p| p.owner)
    }

    /// Move the clock forward by `dt`; returns the event once it is due
    pub fn advance(&mut self, dt: f32) -> Option<(LifecyclePhase, LifecycleEvent)> {
        let pending = self.pending.as_mut()?;
        pending.remaining -= dt.max(0.0);
        if pending.remaining > 0.0 {
            return None;
        }
        self.pending.take().map(|p| (p.owner, p.event))
    }
}
