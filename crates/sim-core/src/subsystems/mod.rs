//! Per-cadence subsystem dispatch (`spec.md` §4.2, §4.7-§4.12).
//!
//! Every subsystem tick has the shape
//! `fn(&mut World, &mut WorldRng, WorldTime, ...) -> Vec<LogEntry>`: it must
//! never panic on a malformed precondition, and skips the offending item
//! with a `system`/`warn` log instead (`spec.md` §7).

pub mod day;
pub mod hour;
pub mod tick_complete;
pub mod turn;

use sim_events::{LogEntry, WorldTime};

/// Wraps a fallible subsystem step so a caught precondition violation
/// becomes a `system`/`warn` log rather than aborting the tick, per the
/// `InvariantViolation` policy in [`crate::error`].
pub fn run_guarded<T>(
    result: Result<T, String>,
    now: WorldTime,
    seed: &str,
    logs: &mut Vec<LogEntry>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(reason) => {
            logs.push(invariant_warning(&reason, now, seed));
            None
        }
    }
}

/// The standard shape for a skipped-item warning (`spec.md` §4.6, §7).
pub fn invariant_warning(reason: &str, now: WorldTime, seed: &str) -> LogEntry {
    LogEntry::system_warn(reason.to_string(), now, now, seed.to_string())
}
