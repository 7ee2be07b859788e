//! NPCs: the carrier of agendas, memories, relationships, and (for
//! name-level characters) dynasty fields (`spec.md` §3, §4.7, §4.9).

use serde::{Deserialize, Serialize};
pub use sim_events::MemoryCategory;
use sim_events::WorldTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgendaKind {
    Revenge,
    Ambition,
    Protection,
    Greed,
    Research,
    Nexus,
    Stronghold,
    Romance,
    Betrayal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agenda {
    pub kind: AgendaKind,
    pub target_id: Option<String>,
    pub priority: i32,
    pub progress: u8,
    pub description: String,
}

impl Agenda {
    pub fn new(kind: AgendaKind, description: impl Into<String>, priority: i32) -> Self {
        Self { kind, target_id: None, priority, progress: 0, description: description.into() }
    }

    pub fn with_target(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = Some(target_id.into());
        self
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 100
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub category: MemoryCategory,
    pub target_id: Option<String>,
    pub intensity: f32,
    pub acted: bool,
    pub recorded_at: WorldTime,
}

impl Memory {
    pub fn decay(&mut self, hours: f32) {
        self.intensity = (self.intensity - 0.01 * hours).max(0.0);
    }

    pub fn is_faded(&self) -> bool {
        self.intensity < 1.0
    }

    pub fn surfaces(&self) -> bool {
        !self.acted && self.intensity >= 5.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub other_id: String,
    pub kind: String,
    pub strength: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NpcTraits {
    pub background: Option<String>,
    pub motivation: Option<String>,
    pub quirks: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DynastyFields {
    pub birth_date: Option<WorldTime>,
    pub parent_ids: Vec<String>,
    pub spouse_id: Option<String>,
    pub widowed: bool,
    pub children_ids: Vec<String>,
    pub titles: Vec<String>,
    pub health: i8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Npc {
    pub id: String,
    pub name: String,
    pub role: String,
    pub home_settlement_id: Option<String>,
    pub location: String,
    pub reputation: i32,
    pub fame: u32,
    pub alive: bool,
    pub level: u32,
    pub agendas: Vec<Agenda>,
    pub memories: Vec<Memory>,
    pub relationships: Vec<Relationship>,
    pub traits: NpcTraits,
    pub dynasty: Option<DynastyFields>,
    pub died_at: Option<WorldTime>,
    /// Spells learned via a `research` agenda (`spec.md` §4.7). The pools
    /// themselves are a BECMI-style static lookup table, out of scope
    /// (`spec.md` §1) beyond this bare per-role list.
    #[serde(default)]
    pub known_spells: Vec<String>,
}

impl Npc {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: role.into(),
            home_settlement_id: None,
            location: location.into(),
            reputation: 0,
            fame: 0,
            alive: true,
            level: 1,
            agendas: Vec::new(),
            memories: Vec::new(),
            relationships: Vec::new(),
            traits: NpcTraits::default(),
            dynasty: None,
            died_at: None,
            known_spells: Vec::new(),
        }
    }

    /// The single highest-priority agenda, if any — the one §4.7 says
    /// fires on this NPC's hourly activation roll.
    pub fn top_agenda_mut(&mut self) -> Option<&mut Agenda> {
        self.agendas.iter_mut().max_by_key(|a| a.priority)
    }

    pub fn kill(&mut self, at: WorldTime) {
        self.alive = false;
        self.died_at = Some(at);
        if let Some(dyn_fields) = self.dynasty.as_mut() {
            dyn_fields.health = 0;
        }
    }

    pub fn widow_spouse_of(&mut self) {
        if let Some(d) = self.dynasty.as_mut() {
            d.widowed = true;
        }
    }

    pub fn add_memory(&mut self, memory: Memory) {
        self.memories.push(memory);
    }

    pub fn decay_memories(&mut self, hours: f32) {
        for m in self.memories.iter_mut() {
            m.decay(hours);
        }
        self.memories.retain(|m| !m.is_faded());
    }

    pub fn surfacing_memories(&self) -> impl Iterator<Item = &Memory> {
        self.memories.iter().filter(|m| m.surfaces())
    }
}
