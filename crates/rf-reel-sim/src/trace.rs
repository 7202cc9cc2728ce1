//! SpinTrace — timeline of everything the rig observed
//!
//! A trace captures signals on the bus, lifecycle phase entries and reel
//! settles, stamped with the rig's frame clock.

use chrono::{DateTime, Utc};
use rf_lifecycle::LifecyclePhase;
use rf_signal::{ButtonState, Signal};
use serde::{Deserialize, Serialize};

/// What happened at a trace point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceKind {
    /// A signal was published on the bus
    Signal { signal: Signal },
    /// The lifecycle entered a phase
    Phase {
        phase: LifecyclePhase,
        buttons: ButtonState,
    },
    /// The reel began its snap-to-center phase
    AlignStart { speed: f32 },
    /// The reel settled
    Settled {
        /// Slot on the center line
        centered: Option<usize>,
    },
}

/// One timestamped trace point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Rig clock in seconds
    pub time_secs: f64,
    #[serde(flatten)]
    pub kind: TraceKind,
}

/// A complete trace of one rig session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinTrace {
    /// Identifier for this trace
    pub trace_id: String,

    /// All events in chronological order
    pub events: Vec<TraceEvent>,

    /// When recording began
    pub recorded_at: DateTime<Utc>,
}

impl SpinTrace {
    /// Create a new empty trace
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            events: Vec::new(),
            recorded_at: Utc::now(),
        }
    }

    /// Add an event to the trace
    pub fn push(&mut self, time_secs: f64, kind: TraceKind) {
        self.events.push(TraceEvent { time_secs, kind });
    }

    /// Get total duration in seconds
    pub fn duration_secs(&self) -> f64 {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => last.time_secs - first.time_secs,
            _ => 0.0,
        }
    }

    /// Published signals, in order
    pub fn signals(&self) -> impl Iterator<Item = (f64, &Signal)> + '_ {
        self.events.iter().filter_map(|e| match &e.kind {
            TraceKind::Signal { signal } => Some((e.time_secs, signal)),
            _ => None,
        })
    }

    /// Phase entries with their button flags, in order
    pub fn phases(&self) -> impl Iterator<Item = (f64, LifecyclePhase, ButtonState)> + '_ {
        self.events.iter().filter_map(|e| match e.kind {
            TraceKind::Phase { phase, buttons } => Some((e.time_secs, phase, buttons)),
            _ => None,
        })
    }

    /// How many times `signal` was published
    pub fn count_signal(&self, signal: &Signal) -> usize {
        self.signals().filter(|(_, s)| *s == signal).count()
    }

    /// Time of the first event matching `pred` at or after `from`
    pub fn first_after(&self, from: f64, pred: impl Fn(&TraceKind) -> bool) -> Option<f64> {
        self.events
            .iter()
            .find(|e| e.time_secs >= from && pred(&e.kind))
            .map(|e| e.time_secs)
    }

    /// Drop all recorded events
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Export as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Import from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
