//! World Event Processor (`spec.md` §4.9).
//!
//! Converts a significant, already-logged event into updates other parts
//! of the kernel can't derive on their own: witness memories, faction
//! reputation, and (optionally) a new story thread. Pure function of its
//! inputs plus the shared rng, same shape as the teacher's tension/event
//! scoring pipeline, generalized to the spec's actual event taxonomy.

use rand::Rng;
use sim_events::{LogEntry, MemoryCategory};

/// The kind of significant event, for the caller to pick witness/reputation
/// weighting. Kept separate from `StoryType` since not every world event
/// becomes a story (`spec.md` §4.9 is a superset of §4.11's inputs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEventKind {
    Death,
    Battle,
    Raid,
    Betrayal,
    Rescue,
    Wedding,
    Scandal,
}

impl WorldEventKind {
    pub fn base_intensity(self) -> f32 {
        match self {
            WorldEventKind::Death => 8.0,
            WorldEventKind::Battle => 6.0,
            WorldEventKind::Raid => 5.0,
            WorldEventKind::Betrayal => 7.0,
            WorldEventKind::Rescue => 6.0,
            WorldEventKind::Wedding => 3.0,
            WorldEventKind::Scandal => 4.0,
        }
    }

    pub fn memory_category(self) -> MemoryCategory {
        use MemoryCategory::*;
        match self {
            WorldEventKind::Death => Witnessed,
            WorldEventKind::Battle => Witnessed,
            WorldEventKind::Raid => Witnessed,
            WorldEventKind::Betrayal => Betrayed,
            WorldEventKind::Rescue => WasSaved,
            WorldEventKind::Wedding => Honored,
            WorldEventKind::Scandal => Witnessed,
        }
    }
}

/// A witness to process: how proximate they were (0.0 distant, 1.0
/// co-located), used to scale memory intensity.
pub struct Witness<'a> {
    pub npc_id: &'a str,
    pub proximity: f32,
}

/// One witness's memory, ready for the caller to turn into its own
/// `Npc::memories` entry — `director` doesn't depend on `sim-core`'s
/// `World`/`Npc` types, so it hands back plain data instead of a memory
/// record.
pub struct WitnessMemory {
    pub npc_id: String,
    pub category: MemoryCategory,
    pub target_id: Option<String>,
    pub intensity: f32,
    pub recorded_at: sim_events::WorldTime,
}

pub struct ProcessedEvent {
    pub memories: Vec<WitnessMemory>,
    pub attitude_deltas: Vec<(String, i32)>,
}

/// Central function (`spec.md` §4.9): produces witness memory entries and
/// faction attitude deltas for a significant event. The caller (a
/// subsystem or the event log sink) is responsible for applying these to
/// the world and for deciding whether to also spawn a story thread via the
/// classifier — that decision already runs through [`crate::classifier`]
/// independently, per spec.
pub fn process_world_event(
    kind: WorldEventKind,
    entry: &LogEntry,
    witnesses: &[Witness],
    affected_factions: &[(String, bool)],
    _rng: &mut impl Rng,
) -> ProcessedEvent {
    let base = kind.base_intensity();
    let memories = witnesses
        .iter()
        .map(|w| WitnessMemory {
            npc_id: w.npc_id.to_string(),
            category: kind.memory_category(),
            target_id: entry.actors.first().cloned(),
            intensity: (base * w.proximity).max(0.5),
            recorded_at: entry.world_time,
        })
        .collect();

    let attitude_deltas = affected_factions
        .iter()
        .map(|(faction_id, witnessed)| {
            let magnitude = if *witnessed { 1 } else { 0 };
            let delta = match kind {
                WorldEventKind::Raid | WorldEventKind::Betrayal | WorldEventKind::Scandal => -magnitude,
                WorldEventKind::Rescue | WorldEventKind::Wedding => magnitude,
                WorldEventKind::Death | WorldEventKind::Battle => -magnitude / 2,
            };
            (faction_id.clone(), delta)
        })
        .collect();

    ProcessedEvent { memories, attitude_deltas }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use sim_events::fixtures::town_log;

    #[test]
    fn closer_witnesses_get_higher_intensity_memories() {
        let entry = town_log("Alric slays Beda in the square", "Rivermouth", &["Alric", "Beda"]);
        let witnesses = vec![
            Witness { npc_id: "n1", proximity: 1.0 },
            Witness { npc_id: "n2", proximity: 0.1 },
        ];
        let mut rng = SmallRng::seed_from_u64(1);
        let processed = process_world_event(WorldEventKind::Death, &entry, &witnesses, &[], &mut rng);
        assert_eq!(processed.memories.len(), 2);
        assert!(processed.memories[0].intensity > processed.memories[1].intensity);
    }

    #[test]
    fn betrayal_lowers_witnessing_faction_attitude() {
        let entry = town_log("Corin betrays his sworn lord", "Oakford", &["Corin"]);
        let mut rng = SmallRng::seed_from_u64(1);
        let processed = process_world_event(
            WorldEventKind::Betrayal,
            &entry,
            &[],
            &[("f1".to_string(), true)],
            &mut rng,
        );
        assert_eq!(processed.attitude_deltas, vec![("f1".to_string(), -1)]);
    }
}
