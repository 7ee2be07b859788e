//! Settlements: the market and mood substrate that town/trade/domain ticks
//! mutate (`spec.md` §3).

use crate::world::geography::HexCoord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementType {
    Village,
    Town,
    City,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Good {
    Grain,
    Timber,
    Ore,
    Cloth,
    Spice,
    Arms,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettlementFlags {
    pub is_port: bool,
    pub contested: bool,
    pub controlled_by: Option<String>,
    pub disease: bool,
    pub prosperity: i8,
    pub safety: i8,
    pub unrest: i8,
    pub ruler: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    pub id: String,
    pub name: String,
    pub coord: HexCoord,
    pub population: u32,
    pub settlement_type: SettlementType,
    /// Supply per good, range -3..4 per `spec.md` §3.
    pub supply: HashMap<Good, i8>,
    /// Mood, range -5..5.
    pub mood: i8,
    pub price_trend: HashMap<Good, i8>,
    pub flags: SettlementFlags,
}

impl Settlement {
    pub fn new(id: impl Into<String>, name: impl Into<String>, coord: HexCoord, settlement_type: SettlementType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coord,
            population: match settlement_type {
                SettlementType::Village => 200,
                SettlementType::Town => 1500,
                SettlementType::City => 8000,
            },
            settlement_type,
            supply: HashMap::new(),
            mood: 0,
            price_trend: HashMap::new(),
            flags: SettlementFlags::default(),
        }
    }

    pub fn adjust_mood(&mut self, delta: i32) {
        self.mood = (self.mood as i32 + delta).clamp(-5, 5) as i8;
    }

    pub fn adjust_supply(&mut self, good: Good, delta: i32) {
        let entry = self.supply.entry(good).or_insert(0);
        *entry = (*entry as i32 + delta).clamp(-3, 4) as i8;
    }

    pub fn is_ruled(&self) -> bool {
        self.flags.ruler.is_some()
    }
}
