//! The append-only narrative log sink (`spec.md` §4.6, §6).
//!
//! Every [`LogEntry`] a subsystem produces passes through here on its way
//! to disk; entries that feed the narrative pipeline (§4.4) are also
//! classified into story threads and scanned for deferred consequences
//! before being written out.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use director::Classifier;
use rand::Rng;
use sim_events::{Consequence, LogEntry, StoryThread};
use std::collections::HashMap;

use crate::error::KernelError;

/// Appends narrative log entries to a JSONL file, one object per line, and
/// feeds the subset that's narratively significant into the story
/// classifier and consequence analyzer.
pub struct EventLogSink {
    path: PathBuf,
    classifier: Classifier,
}

impl EventLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), classifier: Classifier::default() }
    }

    /// Appends `entry` to the log file, classifying it into `story_threads`
    /// and deriving consequences into `next_consequence` first when the
    /// entry feeds the narrative pipeline (`spec.md` §4.4).
    pub fn record(
        &self,
        entry: LogEntry,
        story_threads: &mut HashMap<String, StoryThread>,
        rng: &mut impl Rng,
        next_id: &mut impl FnMut() -> String,
    ) -> Result<Vec<Consequence>, KernelError> {
        let mut consequences = Vec::new();

        if entry.feeds_narrative_pipeline() {
            let settlement_id = entry.location.clone();
            if let Some(thread) = self.classifier.classify_and_spawn(&entry, story_threads, rng, || next_id()) {
                story_threads.insert(thread.id.clone(), thread);
            }
            consequences.extend(director::analyze_consequences(
                &entry,
                settlement_id.as_deref(),
                rng,
                next_id,
            ));
        }

        self.append_line(&entry)?;
        Ok(consequences)
    }

    fn append_line(&self, entry: &LogEntry) -> Result<(), KernelError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let write_once = |path: &Path| -> Result<(), KernelError> {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer(&mut writer, entry).map_err(KernelError::Schema)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            Ok(())
        };
        write_once(&self.path).or_else(|_| write_once(&self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use sim_events::fixtures::town_log;
    use std::fs;

    #[test]
    fn record_appends_jsonl_and_returns_consequences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let sink = EventLogSink::new(&path);
        let mut threads = HashMap::new();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut n = 0u64;
        let entry = town_log("A fierce battle rages near the walls", "Rivermouth", &["Alric"]);
        let consequences = sink
            .record(entry, &mut threads, &mut rng, &mut (|| { n += 1; format!("c{n}") }))
            .unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(contents.contains("battle"));
        let _ = consequences;
    }

    #[test]
    fn system_entries_skip_the_narrative_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let sink = EventLogSink::new(&path);
        let mut threads = HashMap::new();
        let mut rng = SmallRng::seed_from_u64(7);
        let mut n = 0u64;
        let entry = sim_events::LogEntry::system_warn(
            "dangling id skipped",
            sim_events::WorldTime::parse("2024-01-01T00:00:00Z").unwrap(),
            sim_events::WorldTime::parse("2024-01-01T00:00:00Z").unwrap(),
            "seed",
        );
        let consequences = sink
            .record(entry, &mut threads, &mut rng, &mut (|| { n += 1; format!("c{n}") }))
            .unwrap();
        assert!(consequences.is_empty());
        assert!(threads.is_empty());
    }
}
