//! The narrative log stream: the simulator's externally visible product.
//!
//! Distinct from `tracing` diagnostics emitted by the kernel itself (see
//! `sim-core::error`); a `LogEntry` is an in-world happening, one per line of
//! the append-only log file described in `spec.md` §6.

use serde::{Deserialize, Serialize};

use crate::WorldTime;

/// Coarse category of a log entry, per `spec.md` §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    Town,
    Road,
    Dungeon,
    Faction,
    Weather,
    System,
}

/// Severity of a `system`-category entry. Mirrors `spec.md` §4.6's
/// "`level=warn`" wording for unexpected-condition logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    #[default]
    Info,
    Warn,
}

/// A single append-only narrative log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub category: LogCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<LogLevel>,
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actors: Vec<String>,
    pub world_time: WorldTime,
    pub real_time: WorldTime,
    pub seed: String,
}

impl LogEntry {
    /// Creates a new entry stamped with the given world/real time and seed.
    /// `real_time` is the wall-clock instant mapped through the scheduler's
    /// real-time formula (§4.2); in batch mode it equals `world_time`.
    pub fn new(
        category: LogCategory,
        summary: impl Into<String>,
        world_time: WorldTime,
        real_time: WorldTime,
        seed: impl Into<String>,
    ) -> Self {
        Self {
            category,
            level: None,
            summary: summary.into(),
            details: String::new(),
            location: None,
            actors: Vec::new(),
            world_time,
            real_time,
            seed: seed.into(),
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_actors(mut self, actors: Vec<String>) -> Self {
        self.actors = actors;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    /// A `system`/`warn` entry, the standard shape subsystems emit when they
    /// skip an item due to a violated precondition (`spec.md` §4.6, §7).
    pub fn system_warn(
        summary: impl Into<String>,
        world_time: WorldTime,
        real_time: WorldTime,
        seed: impl Into<String>,
    ) -> Self {
        Self::new(LogCategory::System, summary, world_time, real_time, seed)
            .with_level(LogLevel::Warn)
    }

    /// True for the two categories explicitly excluded from story
    /// classification / consequence analysis (`spec.md` §4.4).
    pub fn feeds_narrative_pipeline(&self) -> bool {
        !matches!(self.category, LogCategory::System | LogCategory::Weather)
    }
}
