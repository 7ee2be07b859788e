//! Dungeon exploration (`spec.md` §4.8), the one subsystem that runs every
//! turn rather than on the hour/day cadence — dungeons explore a room at a
//! time whenever a party is present to push forward.

use sim_events::{LogCategory, LogEntry, WorldTime};

use crate::rng::WorldRng;
use crate::world::geography::RoomKind;
use crate::world::World;

const EXPLORE_CHANCE: f64 = 0.3;

pub fn tick(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    let occupied_dungeons: Vec<String> = world
        .parties
        .values()
        .filter(|p| p.status == crate::world::party::PartyStatus::Idle)
        .map(|p| p.location.clone())
        .filter(|loc| world.geography.dungeons.contains_key(loc))
        .collect();

    for dungeon_id in occupied_dungeons {
        if !rng.chance(EXPLORE_CHANCE) {
            continue;
        }
        let Some(dungeon) = world.geography.dungeons.get_mut(&dungeon_id) else { continue };
        let Some(idx) = dungeon.unexplored_room() else { continue };
        dungeon.rooms[idx].explored = true;
        dungeon.explored_count += 1;
        let kind = dungeon.rooms[idx].kind;
        let name = dungeon.name.clone();

        let summary = match kind {
            RoomKind::Empty => format!("a party finds an empty chamber deep in {name}"),
            RoomKind::Lair => format!("a party stumbles into a lair within {name}"),
            RoomKind::Treasure => format!("a party uncovers treasure within {name}"),
            RoomKind::Trap => format!("a party narrowly survives a trap within {name}"),
            RoomKind::Shrine => format!("a party discovers a shrine within {name}"),
        };
        logs.push(
            LogEntry::new(LogCategory::Dungeon, summary, now, now, world.seed.clone())
                .with_location(dungeon_id),
        );
    }

    logs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::geography::{Dungeon, DungeonRoom, HexCoord};
    use crate::world::party::Party;

    fn wt() -> WorldTime {
        WorldTime::parse("2024-01-01T00:00:00Z").unwrap()
    }

    #[test]
    fn occupied_dungeon_eventually_explores_a_room() {
        let mut world = World::seed_new("alpha", wt());
        world.geography.dungeons.insert(
            "d1".into(),
            Dungeon {
                id: "d1".into(),
                name: "Under-Hollow".into(),
                coord: HexCoord::new(0, 0),
                depth: 1,
                danger: 2,
                rooms: vec![DungeonRoom { index: 0, kind: RoomKind::Lair, explored: false }],
                explored_count: 0,
            },
        );
        world.parties.insert("p1".into(), Party::new("p1", "The Bold", "d1"));

        let mut rng = WorldRng::from_seed("turn-explore-1");
        let mut explored = false;
        for _ in 0..30 {
            let now = wt();
            turn_once(&mut world, &mut rng, now, &mut explored);
        }
        assert!(explored);
    }

    fn turn_once(world: &mut World, rng: &mut WorldRng, now: WorldTime, explored: &mut bool) {
        tick(world, rng, now);
        if world.geography.dungeons["d1"].explored_count > 0 {
            *explored = true;
        }
    }
}
