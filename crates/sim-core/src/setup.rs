//! World seeding (`spec.md` §4.3: "World ... created once at seed").
//!
//! Populates a brand-new [`World`] with a handful of settlements, factions,
//! and npcs so the simulation has somewhere to start, and returns the
//! opening log entries scenario A expects: a `system` entry announcing the
//! archetype, followed by one `town` entry per seeded settlement.

use sim_events::{LogCategory, LogEntry, WorldTime};

use crate::rng::WorldRng;
use crate::world::faction::{Faction, Focus};
use crate::world::geography::HexCoord;
use crate::world::npc::Npc;
use crate::world::settlement::{Settlement, SettlementType};
use crate::world::World;

const SETTLEMENT_SEEDS: &[(&str, &str, SettlementType, i32, i32)] = &[
    ("s_rivermouth", "Rivermouth", SettlementType::Town, 0, 0),
    ("s_oakford", "Oakford", SettlementType::Village, 4, -1),
    ("s_highgate", "Highgate", SettlementType::City, -3, 5),
];

const FACTION_SEEDS: &[(&str, &str, Focus, i64)] = &[
    ("f_iron_concord", "The Iron Concord", Focus::Martial, 5000),
    ("f_silver_hand", "The Silver Hand", Focus::Pious, 3000),
    ("f_gilded_ledger", "The Gilded Ledger", Focus::Trade, 8000),
];

/// Seeds a brand-new world and returns the opening log entries.
pub fn seed_world(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = vec![LogEntry::new(
        LogCategory::System,
        format!("The chronicle begins: {}", world.archetype),
        now,
        now,
        world.seed.clone(),
    )];

    for (id, name, kind, q, r) in SETTLEMENT_SEEDS {
        let settlement = Settlement::new(*id, *name, HexCoord::new(*q, *r), *kind);
        logs.push(
            LogEntry::new(
                LogCategory::Town,
                format!("{name} stirs to life"),
                now,
                now,
                world.seed.clone(),
            )
            .with_location(id.to_string()),
        );
        world.settlements.insert(id.to_string(), settlement);
    }

    for (id, name, focus, wealth) in FACTION_SEEDS {
        world.factions.insert(id.to_string(), Faction::new(*id, *name, *focus, *wealth));
    }

    seed_founding_npcs(world, rng, now);

    logs
}

fn seed_founding_npcs(world: &mut World, rng: &mut WorldRng, _now: WorldTime) {
    let founders = [
        ("Alric", "hunter", "Rivermouth"),
        ("Beda", "merchant", "Rivermouth"),
        ("Corin", "smith", "Oakford"),
        ("Dessa", "priestess", "Highgate"),
    ];
    for (name, role, location) in founders {
        let id = rng.uid("npc");
        world.npcs.insert(id.clone(), Npc::new(id, name, role, location));
    }
}
