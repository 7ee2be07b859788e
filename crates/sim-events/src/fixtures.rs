//! Builders for tests in this crate and downstream (`sim-core`, `director`).
//! Gated behind `cfg(test)` or the `test-fixtures` feature, matching the
//! teacher crate's own `fixtures` module.

use crate::{LogCategory, LogEntry, StoryThread, StoryType, WorldTime};

/// A log entry at a fixed, easy-to-reason-about world time, for tests that
/// don't care about timestamps.
pub fn log_entry(category: LogCategory, summary: &str) -> LogEntry {
    let wt = WorldTime::parse("2024-01-01T00:00:00Z").unwrap();
    LogEntry::new(category, summary, wt, wt, "test-seed")
}

pub fn town_log(summary: &str, location: &str, actors: &[&str]) -> LogEntry {
    log_entry(LogCategory::Town, summary)
        .with_location(location)
        .with_actors(actors.iter().map(|s| s.to_string()).collect())
}

pub fn story_thread(id: &str, story_type: StoryType, actors: &[&str]) -> StoryThread {
    let wt = WorldTime::parse("2024-01-01T00:00:00Z").unwrap();
    StoryThread::new(
        id,
        story_type,
        format!("test thread {id}"),
        "a test thread",
        actors.iter().map(|s| s.to_string()).collect(),
        None,
        wt,
    )
}
