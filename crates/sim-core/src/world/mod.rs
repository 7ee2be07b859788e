//! The World document (`spec.md` §3): a single mutable struct owning every
//! entity, referenced elsewhere only by string id. Subsystems borrow it
//! mutably for the duration of one tick and release it before the next
//! subsystem runs (`spec.md` §3, "Ownership semantics").

pub mod army;
pub mod faction;
pub mod geography;
pub mod npc;
pub mod party;
pub mod settlement;
pub mod subdocs;

use army::{Antagonist, Army, Stronghold};
use faction::Faction;
use geography::Geography;
use npc::Npc;
use party::Party;
use serde::{Deserialize, Serialize};
use settlement::Settlement;
use sim_events::{Consequence, StoryThread, WorldTime};
use std::collections::HashMap;
use subdocs::{Calendar, Dynasty, Ecology, Guilds, LegendaryState, Naval, Retainers, Treasure};

/// Every field carries `#[serde(default)]` so an older snapshot missing a
/// field (one added by a later subsystem) deserializes instead of refusing
/// to start; `normalize` then repairs cross-cutting invariants a per-field
/// default can't express (`spec.md` §4.3, "migrate older snapshots by
/// filling missing fields").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    #[serde(default)]
    pub seed: String,
    #[serde(default = "default_archetype")]
    pub archetype: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,

    #[serde(default)]
    pub start_world_time: WorldTime,
    #[serde(default)]
    pub last_tick_at: WorldTime,
    #[serde(default)]
    pub last_real_tick_at: WorldTime,

    #[serde(default)]
    pub geography: Geography,
    #[serde(default)]
    pub settlements: HashMap<String, Settlement>,
    #[serde(default)]
    pub parties: HashMap<String, Party>,
    #[serde(default)]
    pub npcs: HashMap<String, Npc>,
    #[serde(default)]
    pub factions: HashMap<String, Faction>,
    #[serde(default)]
    pub armies: HashMap<String, Army>,
    #[serde(default)]
    pub strongholds: HashMap<String, Stronghold>,
    #[serde(default)]
    pub antagonists: HashMap<String, Antagonist>,

    #[serde(default)]
    pub story_threads: HashMap<String, StoryThread>,
    #[serde(default)]
    pub consequence_queue: Vec<Consequence>,

    #[serde(default)]
    pub ecology: Ecology,
    #[serde(default)]
    pub dynasty: Dynasty,
    #[serde(default)]
    pub guilds: Guilds,
    #[serde(default)]
    pub retainers: Retainers,
    #[serde(default)]
    pub treasure: Treasure,
    #[serde(default)]
    pub naval: Naval,
    #[serde(default)]
    pub calendar: Calendar,
    #[serde(default)]
    pub legendary_state: LegendaryState,
}

fn default_archetype() -> String {
    "frontier-marches".to_string()
}

fn default_width() -> u32 {
    64
}

fn default_height() -> u32 {
    48
}

impl Default for World {
    fn default() -> Self {
        World::seed_new("", WorldTime::from_minutes(0))
    }
}

impl World {
    /// Seeds a brand-new world. Called once when no `world.json` exists
    /// (`spec.md` §2, "World ... created once at seed").
    pub fn seed_new(seed: impl Into<String>, start_world_time: WorldTime) -> Self {
        World {
            seed: seed.into(),
            archetype: "frontier-marches".to_string(),
            width: 64,
            height: 48,
            start_world_time,
            last_tick_at: start_world_time,
            last_real_tick_at: start_world_time,
            geography: Geography::default(),
            settlements: HashMap::new(),
            parties: HashMap::new(),
            npcs: HashMap::new(),
            factions: HashMap::new(),
            armies: HashMap::new(),
            strongholds: HashMap::new(),
            antagonists: HashMap::new(),
            story_threads: HashMap::new(),
            consequence_queue: Vec::new(),
            ecology: Ecology::default(),
            dynasty: Dynasty::default(),
            guilds: Guilds::default(),
            retainers: Retainers::default(),
            treasure: Treasure::default(),
            naval: Naval::default(),
            calendar: Calendar::default(),
            legendary_state: LegendaryState::default(),
        }
    }

    /// Fills any field an older snapshot might be missing, so migration is
    /// default-filling rather than a distinct code path (`spec.md` §4.3).
    /// Every field already carries its own `#[serde(default)]`, so a
    /// missing field deserializes rather than refusing to load; this pass
    /// only needs to repair cross-cutting invariants a per-field default
    /// can't express — e.g. a `seed` left empty by a pre-seed snapshot, or
    /// a dangling id a default-filled field might now point at.
    pub fn normalize(&mut self, fallback_seed: &str) {
        if self.seed.is_empty() {
            self.seed = fallback_seed.to_string();
        }
        self.heal_dangling_references();
    }

    /// Drops references to ids that no longer resolve rather than leaving
    /// them dangling (`spec.md` §3, invariant 1).
    fn heal_dangling_references(&mut self) {
        for army in self.armies.values_mut() {
            army.clamp_invariants();
        }
        let parties = &self.parties;
        let npcs = &self.npcs;
        self.retainers.roster.retain(|_, r| {
            r.employer_id
                .as_ref()
                .map(|e| parties.contains_key(e) || npcs.contains_key(e))
                .unwrap_or(true)
        });
    }

    pub fn settlement_by_name(&self, name: &str) -> Option<&Settlement> {
        self.settlements.values().find(|s| s.name == name)
    }

    pub fn npc(&self, id: &str) -> Option<&Npc> {
        self.npcs.get(id)
    }

    pub fn npc_mut(&mut self, id: &str) -> Option<&mut Npc> {
        self.npcs.get_mut(id)
    }

    pub fn unresolved_story_thread_count(&self) -> usize {
        self.story_threads.values().filter(|t| !t.resolved).count()
    }
}
