//! Adventuring parties: members, travel, and the lazily-created deep-state
//! that party agency (`spec.md` §4.7) reads and writes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyMember {
    pub name: String,
    pub class: String,
    pub level: u32,
    pub hp: i32,
    pub max_hp: i32,
}

impl PartyMember {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyStatus {
    Idle,
    Travel,
    Resting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Travel {
    pub from: String,
    pub to: String,
    pub miles_remaining: f32,
    pub terrain_speed_modifier: f32,
}

/// A party's quest log entry. Opaque to the kernel beyond its kind and
/// progress; subsystems interpret `kind` to decide what "done" means.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestLogEntry {
    pub kind: String,
    pub target_id: Option<String>,
    pub progress: u8,
}

/// Deep per-party state, created lazily the first time a party needs it
/// (`spec.md` §3: "deep-state created lazily").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartyDeepState {
    pub vendetta_target_id: Option<String>,
    pub quest_log: Vec<QuestLogEntry>,
    pub kill_list: Vec<String>,
    pub morale: i8,
    pub resources: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub id: String,
    pub name: String,
    pub members: Vec<PartyMember>,
    pub location: String,
    pub status: PartyStatus,
    pub travel: Option<Travel>,
    pub fatigue: u8,
    pub wounded: bool,
    pub rest_hours_remaining: u32,
    pub fame: u32,
    pub xp: u64,
    pub goal: Option<String>,
    pub deep_state: Option<PartyDeepState>,
}

impl Party {
    pub fn new(id: impl Into<String>, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            members: Vec::new(),
            location: location.into(),
            status: PartyStatus::Idle,
            travel: None,
            fatigue: 0,
            wounded: false,
            rest_hours_remaining: 0,
            fame: 0,
            xp: 0,
            goal: None,
            deep_state: None,
        }
    }

    pub fn deep_state_mut(&mut self) -> &mut PartyDeepState {
        self.deep_state.get_or_insert_with(PartyDeepState::default)
    }

    pub fn living_members(&self) -> impl Iterator<Item = &PartyMember> {
        self.members.iter().filter(|m| m.is_alive())
    }

    pub fn is_wiped_out(&self) -> bool {
        self.members.iter().all(|m| !m.is_alive())
    }

    pub fn total_strength(&self) -> i64 {
        self.living_members().map(|m| m.level as i64 * 10 + m.hp as i64).sum()
    }

    pub fn begin_travel(&mut self, to: impl Into<String>, miles: f32, terrain_speed_modifier: f32) {
        self.status = PartyStatus::Travel;
        self.travel = Some(Travel {
            from: self.location.clone(),
            to: to.into(),
            miles_remaining: miles,
            terrain_speed_modifier,
        });
    }

    /// Advances travel by `miles_per_hour`, returning the arrival
    /// destination if travel completed this call.
    pub fn advance_travel(&mut self, miles_per_hour: f32) -> Option<String> {
        let Some(travel) = self.travel.as_mut() else { return None };
        travel.miles_remaining -= miles_per_hour * travel.terrain_speed_modifier;
        if travel.miles_remaining <= 0.0 {
            let dest = travel.to.clone();
            self.location = dest.clone();
            self.travel = None;
            self.status = PartyStatus::Idle;
            Some(dest)
        } else {
            None
        }
    }
}
