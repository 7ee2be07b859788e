//! Static and near-static geography: the hex grid, nexuses, and dungeons
//! (`spec.md` §3, `HexTile`/`Nexus`/`Dungeon` rows).

use serde::{Deserialize, Serialize};
use sim_events::WorldTime;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Plains,
    Forest,
    Hills,
    Mountains,
    Swamp,
    Desert,
    Coast,
    Water,
}

/// Axial hex coordinate. Immutable once placed (`spec.md` §3: "immutable
/// after creation").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Hex (axial) distance, used by travel and proximity-weighted memory
    /// intensity in the World Event Processor.
    pub fn distance(self, other: HexCoord) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = ((self.q + self.r) - (other.q + other.r)).abs();
        (dq + dr + ds) / 2
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HexTile {
    pub coord: HexCoord,
    pub terrain: Terrain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerType {
    Arcane,
    Divine,
    Primal,
    Shadow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nexus {
    pub id: String,
    pub name: String,
    pub coord: HexCoord,
    pub power_type: PowerType,
    pub intensity: u8,
    pub current_owner_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dungeon {
    pub id: String,
    pub name: String,
    pub coord: HexCoord,
    pub depth: u32,
    pub danger: u8,
    pub rooms: Vec<DungeonRoom>,
    pub explored_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Empty,
    Lair,
    Treasure,
    Trap,
    Shrine,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonRoom {
    pub index: u32,
    pub kind: RoomKind,
    pub explored: bool,
}

impl Dungeon {
    pub fn unexplored_room(&self) -> Option<usize> {
        self.rooms.iter().position(|r| !r.explored)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caravan {
    pub id: String,
    pub from_settlement_id: String,
    pub to_settlement_id: String,
    pub miles_remaining: f32,
    pub goods: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rumor {
    pub id: String,
    pub text: String,
    pub origin_settlement_id: Option<String>,
    pub heard_at: WorldTime,
    pub credibility: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mercenary {
    pub id: String,
    pub name: String,
    pub strength: u32,
    pub cost_per_hour: u32,
    pub employer_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Geography {
    pub hex_grid: Vec<HexTile>,
    pub nexuses: HashMap<String, Nexus>,
    pub dungeons: HashMap<String, Dungeon>,
    pub caravans: HashMap<String, Caravan>,
    pub rumors: HashMap<String, Rumor>,
    pub mercenaries: HashMap<String, Mercenary>,
}

impl Geography {
    pub fn tile_at(&self, coord: HexCoord) -> Option<&HexTile> {
        self.hex_grid.iter().find(|t| t.coord == coord)
    }
}
