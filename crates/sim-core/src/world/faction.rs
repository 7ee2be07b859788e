//! Factions and their in-flight operations (`spec.md` §3, §4.7).

use serde::{Deserialize, Serialize};
use sim_events::WorldTime;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    Trade,
    Martial,
    Pious,
    Arcane,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Raid,
    Expansion,
    Conquest,
    ResourceGrab,
    TradeEmbargo,
    Crusade,
    Propaganda,
    Assassination,
    MarriageAlliance,
    Inquisition,
    Blockade,
    Relief,
}

impl OperationKind {
    /// Which foci are allowed to spawn this kind, per `spec.md` §4.7:
    /// "pious → crusade/inquisition, martial → blockade/assassination,
    /// trade → embargo/relief".
    pub fn spawnable_by(self, focus: Focus) -> bool {
        use Focus::*;
        use OperationKind::*;
        match self {
            Crusade | Inquisition => focus == Pious,
            Blockade | Assassination => focus == Martial,
            TradeEmbargo | Relief => focus == Trade,
            Raid | Expansion | Conquest | ResourceGrab | Propaganda | MarriageAlliance => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub id: String,
    pub kind: OperationKind,
    pub target_settlement_id: Option<String>,
    pub target_faction_id: Option<String>,
    pub success_chance: f32,
    pub completes_at: WorldTime,
    pub secret: bool,
    pub reserved_resources: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactionDeepState {
    pub power: i32,
    pub morale: i8,
    pub territory: Vec<String>,
    pub allies: Vec<String>,
    pub enemies: Vec<String>,
    pub casus_belli: HashMap<String, String>,
    pub resource_needs: HashMap<String, i32>,
    pub active_operations: Vec<Operation>,
    pub recent_wins: Vec<String>,
    pub recent_losses: Vec<String>,
}

impl FactionDeepState {
    /// `spec.md` §4.7: "the engine MUST preserve the invariant that a
    /// faction holds at most one in-flight operation of each type."
    pub fn has_inflight(&self, kind: OperationKind) -> bool {
        self.active_operations.iter().any(|op| op.kind == kind)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faction {
    pub id: String,
    pub name: String,
    pub focus: Focus,
    pub wealth: i64,
    /// Attitude per settlement id, -3..3.
    pub attitude: HashMap<String, i8>,
    pub deep_state: FactionDeepState,
}

impl Faction {
    pub fn new(id: impl Into<String>, name: impl Into<String>, focus: Focus, wealth: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            focus,
            wealth,
            attitude: HashMap::new(),
            deep_state: FactionDeepState::default(),
        }
    }

    pub fn adjust_attitude(&mut self, settlement_id: &str, delta: i32) {
        let entry = self.attitude.entry(settlement_id.to_string()).or_insert(0);
        *entry = (*entry as i32 + delta).clamp(-3, 3) as i8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawnable_by_enforces_focus_gating() {
        assert!(OperationKind::Crusade.spawnable_by(Focus::Pious));
        assert!(!OperationKind::Crusade.spawnable_by(Focus::Trade));
        assert!(OperationKind::Blockade.spawnable_by(Focus::Martial));
        assert!(!OperationKind::Blockade.spawnable_by(Focus::Arcane));
    }

    #[test]
    fn at_most_one_inflight_operation_per_kind() {
        let mut f = Faction::new("f1", "The Iron Concord", Focus::Martial, 1000);
        f.deep_state.active_operations.push(Operation {
            id: "op1".into(),
            kind: OperationKind::Raid,
            target_settlement_id: Some("s1".into()),
            target_faction_id: None,
            success_chance: 0.5,
            completes_at: WorldTime::parse("2024-01-02T00:00:00Z").unwrap(),
            secret: false,
            reserved_resources: 10,
        });
        assert!(f.deep_state.has_inflight(OperationKind::Raid));
        assert!(!f.deep_state.has_inflight(OperationKind::Conquest));
    }

    #[test]
    fn attitude_clamps_to_bounds() {
        let mut f = Faction::new("f1", "The Iron Concord", Focus::Trade, 1000);
        f.adjust_attitude("s1", -100);
        assert_eq!(f.attitude["s1"], -3);
        f.adjust_attitude("s1", 100);
        assert_eq!(f.attitude["s1"], 3);
    }
}
