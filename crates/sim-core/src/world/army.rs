//! Armies, strongholds, and antagonists (`spec.md` §3).

use serde::{Deserialize, Serialize};
use sim_events::WorldTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmyStatus {
    Idle,
    Marching,
    Besieging,
    Diseased,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Army {
    pub id: String,
    pub owner_id: String,
    pub location: String,
    pub strength: i64,
    pub quality: u8,
    pub morale: u8,
    pub status: ArmyStatus,
    pub supplies: u32,
    pub supply_line_from: Option<String>,
    pub is_mercenary: bool,
    /// Settlement the army is marching toward, set when `status` becomes
    /// `Marching` (`spec.md` §4.6, "army raising & marching").
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub miles_remaining: f32,
}

impl Army {
    /// Invariant 5 (`spec.md` §8): `strength >= 0`, `morale in [0, 12]`.
    pub fn clamp_invariants(&mut self) {
        self.strength = self.strength.max(0);
        self.morale = self.morale.min(12);
    }

    pub fn satisfies_invariants(&self) -> bool {
        self.strength >= 0 && self.morale <= 12
    }

    pub fn begin_march(&mut self, destination: impl Into<String>, miles: f32) {
        self.status = ArmyStatus::Marching;
        self.destination = Some(destination.into());
        self.miles_remaining = miles;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrongholdType {
    Keep,
    Tower,
    Abbey,
    Hall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stronghold {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub location: String,
    pub stronghold_type: StrongholdType,
    pub level: u32,
    pub staff: u32,
    pub construction_finished: bool,
    pub treasury: i64,
    pub population: u32,
    pub tax_rate: f32,
}

impl Stronghold {
    /// Reassigns ownership on the owner's death (`spec.md` §3:
    /// "inheritance on owner death").
    pub fn inherit(&mut self, heir_id: impl Into<String>) {
        self.owner_id = heir_id.into();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Antagonist {
    pub id: String,
    pub name: String,
    pub epithet: String,
    pub antagonist_type: String,
    pub territory: Option<String>,
    pub threat: u8,
    pub alive: bool,
    pub followers: u32,
    pub last_seen: WorldTime,
}

impl Antagonist {
    pub fn mark_seen(&mut self, at: WorldTime) {
        self.last_seen = at;
    }

    pub fn kill(&mut self, at: WorldTime) {
        self.alive = false;
        self.last_seen = at;
    }
}
