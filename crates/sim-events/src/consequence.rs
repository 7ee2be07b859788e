//! Deferred effects (`spec.md` §4.5).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Tagged payload for a deferred effect. Opaque `data` fields are
/// `serde_json::Value` so the consequence queue itself (in `sim-core`)
/// never needs to know the concrete shape a producer chose to stash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConsequenceKind {
    /// A new event should be spawned at resolution time (e.g. a hunter
    /// arriving at a target's location).
    SpawnEvent { event_hint: String },
    /// A settlement's mood/supply/prosperity should shift.
    SettlementChange {
        settlement_id: String,
        mood_delta: i32,
    },
    /// Two actors' relationship should shift.
    RelationshipShift {
        from_id: String,
        to_id: String,
        delta: f32,
    },
    /// Generic catch-all for consequence types not worth a dedicated
    /// variant; `data` carries whatever the producing subsystem needs.
    Generic {
        label: String,
        #[serde(default)]
        data: serde_json::Value,
    },
}

/// A single deferred effect awaiting resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consequence {
    /// Monotone id, unique within the world.
    pub id: String,
    /// 1 (lowest) .. 9 (highest). Higher resolves first within the same hour.
    pub priority: u8,
    /// Counts down to zero; decremented by elapsed turns since last process.
    pub turns_until_resolution: i64,
    /// What produced this consequence, for diagnostics.
    pub trigger_event: String,
    pub kind: ConsequenceKind,
}

impl Consequence {
    pub fn new(
        id: impl Into<String>,
        priority: u8,
        turns_until_resolution: i64,
        trigger_event: impl Into<String>,
        kind: ConsequenceKind,
    ) -> Self {
        Self {
            id: id.into(),
            priority: priority.clamp(1, 9),
            turns_until_resolution,
            trigger_event: trigger_event.into(),
            kind,
        }
    }

    /// Decrements the countdown by the number of turns elapsed, never below 0.
    pub fn advance(&mut self, turns_elapsed: i64) {
        self.turns_until_resolution = (self.turns_until_resolution - turns_elapsed).max(0);
    }

    pub fn is_due(&self) -> bool {
        self.turns_until_resolution <= 0
    }
}

/// Orders consequences priority-then-FIFO, matching `spec.md` §4.5: "applied
/// in priority-then-FIFO order within the same hour tick." FIFO is preserved
/// by the caller keeping insertion order and using a stable sort on this key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ResolutionOrder {
    /// Negated so that a `u8` max-heap ordering via `Ord` sorts highest
    /// priority first when used with a stable ascending sort.
    neg_priority: i8,
    sequence: u64,
}

impl ResolutionOrder {
    pub fn new(priority: u8, sequence: u64) -> Self {
        Self {
            neg_priority: -(priority as i8),
            sequence,
        }
    }
}

impl Consequence {
    pub fn resolution_order(&self, sequence: u64) -> ResolutionOrder {
        ResolutionOrder::new(self.priority, sequence)
    }
}

/// Helper for callers that want `Ord`-free priority comparison.
pub fn higher_priority_first(a: &Consequence, b: &Consequence) -> Ordering {
    b.priority.cmp(&a.priority)
}
