//! The per-subsystem sub-documents that round out the World: ecology,
//! dynasty, guilds, retainers, treasure, naval, calendar, and legendary
//! state (`spec.md` §3, final table row).

use serde::{Deserialize, Serialize};
use sim_events::WorldTime;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Population {
    pub species: String,
    pub dungeon_id: String,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Migration {
    pub species: String,
    pub from_hex: String,
    pub to_hex: String,
    pub started_at: WorldTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    pub species_a: String,
    pub species_b: String,
    pub dungeon_id: String,
    pub intensity: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ecology {
    pub populations: Vec<Population>,
    pub migrations: Vec<Migration>,
    pub disputes: Vec<Dispute>,
    pub extinctions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bloodline {
    pub id: String,
    pub name: String,
    pub seat_settlement_id: Option<String>,
    pub member_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marriage {
    pub npc_a_id: String,
    pub npc_b_id: String,
    pub married_at: WorldTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pregnancy {
    pub mother_id: String,
    pub father_id: Option<String>,
    pub conceived_at: WorldTime,
    pub due_date: WorldTime,
}

impl Pregnancy {
    /// Invariant 3 (`spec.md` §8): `dueDate = conceivedAt + 270 world-days`.
    pub fn new(mother_id: impl Into<String>, father_id: Option<String>, conceived_at: WorldTime) -> Self {
        const DAY_TURNS: i64 = sim_events::DAY_TURNS;
        Self {
            mother_id: mother_id.into(),
            father_id,
            conceived_at,
            due_date: conceived_at.advance_turns(DAY_TURNS * 270),
        }
    }

    pub fn satisfies_due_date_invariant(&self) -> bool {
        self.due_date == self.conceived_at.advance_turns(sim_events::DAY_TURNS * 270)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessionCrisis {
    pub bloodline_id: String,
    pub claimant_ids: Vec<String>,
    pub opened_at: WorldTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Courtship {
    pub suitor_id: String,
    pub target_id: String,
    pub progress: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Burial {
    pub npc_id: String,
    pub buried_at: WorldTime,
    pub site: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dynasty {
    pub bloodlines: HashMap<String, Bloodline>,
    pub marriages: Vec<Marriage>,
    pub pregnancies: Vec<Pregnancy>,
    pub succession_crises: Vec<SuccessionCrisis>,
    pub courtships: Vec<Courtship>,
    pub burials: Vec<Burial>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guild {
    pub id: String,
    pub name: String,
    pub settlement_id: String,
    pub specialty: String,
    pub member_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Guilds {
    pub guilds: HashMap<String, Guild>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetainerType {
    Steward,
    Bodyguard,
    Scout,
    Sage,
    Chaplain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Retainer {
    pub id: String,
    pub name: String,
    pub retainer_type: RetainerType,
    pub employer_id: Option<String>,
    pub hired_once: bool,
}

impl Retainer {
    /// Invariant 4 (`spec.md` §8): `employerId` either empty or an existing
    /// employer; hired at most once.
    pub fn hire(&mut self, employer_id: impl Into<String>) -> bool {
        if self.hired_once {
            return false;
        }
        self.employer_id = Some(employer_id.into());
        self.hired_once = true;
        true
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Retainers {
    pub roster: HashMap<String, Retainer>,
    pub pending_hire_candidates: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hoard {
    pub id: String,
    pub location: String,
    pub value: i64,
    pub guarded_by_dungeon_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CirculatingItem {
    pub id: String,
    pub name: String,
    pub holder_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Treasure {
    pub hoards: HashMap<String, Hoard>,
    pub extractions_total: i64,
    pub circulating_items: HashMap<String, CirculatingItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub location: String,
    pub route_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub from_port_id: String,
    pub to_port_id: String,
    pub danger: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pirate {
    pub id: String,
    pub name: String,
    pub route_id: Option<String>,
    pub strength: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wreck {
    pub id: String,
    pub ship_name: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistantLand {
    pub id: String,
    pub name: String,
    pub mention_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistantFigure {
    pub id: String,
    pub name: String,
    pub alive: bool,
    pub mention_count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Naval {
    pub ships: HashMap<String, Ship>,
    pub routes: HashMap<String, Route>,
    pub pirates: HashMap<String, Pirate>,
    pub wrecks: Vec<Wreck>,
    pub ports: Vec<String>,
    pub distant_lands: Vec<DistantLand>,
    pub distant_figures: Vec<DistantFigure>,
}

impl Naval {
    /// `spec.md` §4.12: distant-lands <= 50 (keep highest mention count),
    /// distant-figures <= 100 (alive-first, then by mention count).
    pub fn prune_distant_catalog(&mut self) {
        self.distant_lands.sort_by(|a, b| b.mention_count.cmp(&a.mention_count));
        self.distant_lands.truncate(50);

        self.distant_figures
            .sort_by(|a, b| b.alive.cmp(&a.alive).then(b.mention_count.cmp(&a.mention_count)));
        self.distant_figures.truncate(100);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherKind {
    Clear,
    Rain,
    Storm,
    Snow,
    Fog,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calendar {
    pub current_weather: WeatherKind,
    pub active_holiday: Option<String>,
}

impl Default for Calendar {
    fn default() -> Self {
        Self { current_weather: WeatherKind::Clear, active_holiday: None }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LegendaryState {
    pub last_spike_at: Option<WorldTime>,
    pub spike_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pregnancy_due_date_is_270_days_after_conception() {
        let conceived = WorldTime::parse("2024-01-01T00:00:00Z").unwrap();
        let p = Pregnancy::new("m1", Some("f1".into()), conceived);
        assert!(p.satisfies_due_date_invariant());
    }

    #[test]
    fn retainer_can_only_be_hired_once() {
        let mut r = Retainer { id: "r1".into(), name: "Olwen".into(), retainer_type: RetainerType::Scout, employer_id: None, hired_once: false };
        assert!(r.hire("p1"));
        assert!(!r.hire("p2"));
        assert_eq!(r.employer_id.as_deref(), Some("p1"));
    }

    #[test]
    fn distant_catalog_prunes_to_caps() {
        let mut naval = Naval::default();
        for i in 0..60 {
            naval.distant_lands.push(DistantLand { id: format!("l{i}"), name: format!("Land {i}"), mention_count: i });
        }
        naval.prune_distant_catalog();
        assert_eq!(naval.distant_lands.len(), 50);
        assert_eq!(naval.distant_lands[0].mention_count, 59);
    }
}
