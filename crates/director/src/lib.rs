//! Narrative director: classifies log entries into story threads, advances
//! them beat by beat, and derives witness memories, faction attitude shifts,
//! and deferred consequences from significant world events.

pub mod analyzer;
pub mod classifier;
pub mod threads;
pub mod world_events;

pub use analyzer::analyze_consequences;
pub use classifier::Classifier;
pub use threads::{advance_story_threads, prune_resolved_threads};
pub use world_events::{process_world_event, ProcessedEvent, Witness, WitnessMemory, WorldEventKind};
