#![forbid(unsafe_code)]

//! Bounded JSONL trace records for gesture decisions.
//!
//! Every decided gesture can be recorded as one [`GestureRecord`], and every
//! finished transition as one [`TransitionRecord`]; the host drains them
//! later as newline-delimited JSON. The log is a bounded ring: when full, the
//! oldest records are dropped. This is debugging/replay tooling, never
//! control flow.

use serde::Serialize;

use crate::controller::Verdict;
use crate::gesture::{Direction, Gesture, InputResolution};

/// Default record capacity. Old records are dropped past this.
pub const DEFAULT_TRACE_CAPACITY: usize = 2048;

/// One decided gesture, flattened for JSONL.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GestureRecord {
    /// Host clock, ms.
    pub at_ms: f64,
    pub direction: Direction,
    pub resolution: InputResolution,
    /// Absolute raw input delta.
    pub magnitude: f64,
    /// Panel the visitor was on when the gesture was decided.
    pub current_index: usize,
    /// `release` / `suppress` / `step`.
    pub verdict: &'static str,
    /// Step target, when the verdict was a step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_index: Option<usize>,
    /// Chosen duration, when the verdict was a step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    /// Controller state name after the decision.
    pub state: &'static str,
}

impl GestureRecord {
    /// Build a record from a decided gesture.
    #[must_use]
    pub fn new(
        at_ms: f64,
        gesture: Gesture,
        current_index: usize,
        verdict: &Verdict,
        state_name: &'static str,
    ) -> Self {
        let (target_index, duration_ms) = match verdict {
            Verdict::Step(plan) => (Some(plan.target_index), Some(plan.duration_ms)),
            _ => (None, None),
        };
        Self {
            at_ms,
            direction: gesture.direction,
            resolution: gesture.resolution,
            magnitude: gesture.magnitude,
            current_index,
            verdict: verdict.name(),
            target_index,
            duration_ms,
            state: state_name,
        }
    }
}

/// One finished transition.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransitionRecord {
    /// Host clock, ms.
    pub at_ms: f64,
    /// Always `"transition_complete"`; distinguishes record kinds in the
    /// drained stream.
    pub event: &'static str,
    /// Panel the transition landed on.
    pub target_index: usize,
}

impl TransitionRecord {
    #[must_use]
    pub fn new(at_ms: f64, target_index: usize) -> Self {
        Self {
            at_ms,
            event: "transition_complete",
            target_index,
        }
    }
}

/// Either record kind, serialized flat (no wrapper object).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TraceRecord {
    Gesture(GestureRecord),
    Transition(TransitionRecord),
}

impl From<GestureRecord> for TraceRecord {
    fn from(record: GestureRecord) -> Self {
        Self::Gesture(record)
    }
}

impl From<TransitionRecord> for TraceRecord {
    fn from(record: TransitionRecord) -> Self {
        Self::Transition(record)
    }
}

/// Bounded in-memory trace log.
#[derive(Debug, Clone)]
pub struct TraceLog {
    records: Vec<TraceRecord>,
    capacity: usize,
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TRACE_CAPACITY)
    }
}

impl TraceLog {
    /// Create a log holding at most `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Number of records currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a record, dropping the oldest past capacity.
    pub fn push(&mut self, record: impl Into<TraceRecord>) {
        let record = record.into();
        if self.records.len() >= self.capacity {
            let overflow = self.records.len() - self.capacity + 1;
            self.records.drain(..overflow);
        }
        self.records.push(record);
    }

    /// Drain all records as newline-delimited JSON (one record per line).
    ///
    /// Serialization of a record cannot normally fail; a record that does
    /// fail is skipped rather than corrupting the stream.
    pub fn drain_jsonl(&mut self) -> String {
        let mut out = String::new();
        for record in self.records.drain(..) {
            if let Ok(line) = serde_json::to_string(&record) {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
