//! Daily subsystem dispatch (`spec.md` §4.2): weather, town beats, domain
//! taxation, legendary spikes, trade caravan spawning, and daily travel
//! spawning for idle parties.

use sim_events::{LogCategory, LogEntry, WorldTime};

use crate::rng::WorldRng;
use crate::world::party::PartyStatus;
use crate::world::subdocs::WeatherKind;
use crate::world::World;

const LEGENDARY_SPIKE_CHANCE: f64 = 0.03;
const LEGENDARY_SPIKE_COOLDOWN_DAYS: i64 = 14;

pub fn tick(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();

    roll_weather(world, rng);
    logs.extend(town_beats(world, rng, now));
    logs.extend(domain_taxation(world, now));
    logs.extend(legendary_spikes(world, rng, now));
    logs.extend(caravan_spawning(world, rng, now));
    logs.extend(daily_travel_spawning(world, rng, now));
    logs.extend(naval_daily(world, rng, now));

    logs
}

fn roll_weather(world: &mut World, rng: &mut WorldRng) {
    let roll = rng.next();
    world.calendar.current_weather = if roll < 0.5 {
        WeatherKind::Clear
    } else if roll < 0.7 {
        WeatherKind::Rain
    } else if roll < 0.85 {
        WeatherKind::Fog
    } else if roll < 0.95 {
        WeatherKind::Snow
    } else {
        WeatherKind::Storm
    };
}

/// A settlement's mood drifts toward neutral, and occasionally a town beat
/// (market day, brawl, gossip) fires as flavor (`spec.md` §3, `mood`).
fn town_beats(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    for settlement in world.settlements.values_mut() {
        if settlement.mood > 0 {
            settlement.mood -= 1;
        } else if settlement.mood < 0 {
            settlement.mood += 1;
        }
        if rng.chance(0.1) {
            logs.push(
                LogEntry::new(
                    LogCategory::Town,
                    format!("{} stirs with the business of an ordinary day", settlement.name),
                    now,
                    now,
                    world.seed.clone(),
                )
                .with_location(settlement.id.clone()),
            );
        }
    }
    logs
}

/// Factions with controlled settlements collect tax from them daily.
fn domain_taxation(world: &mut World, _now: WorldTime) -> Vec<LogEntry> {
    for settlement in world.settlements.values() {
        let Some(owner_id) = settlement.flags.controlled_by.clone() else { continue };
        let tax = (settlement.population / 100).max(1) as i64;
        if let Some(faction) = world.factions.get_mut(&owner_id) {
            faction.wealth += tax;
        }
    }
    Vec::new()
}

/// `spec.md` §4.12-adjacent: rare "legendary" beats, gated by a cooldown so
/// they stay rare even across a long-running world.
fn legendary_spikes(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let on_cooldown = world
        .legendary_state
        .last_spike_at
        .map(|last| now.turns_since(last) < LEGENDARY_SPIKE_COOLDOWN_DAYS * sim_events::DAY_TURNS)
        .unwrap_or(false);
    if on_cooldown || !rng.chance(LEGENDARY_SPIKE_CHANCE) {
        return Vec::new();
    }

    world.legendary_state.last_spike_at = Some(now);
    world.legendary_state.spike_count += 1;

    let famed = world.npcs.values().filter(|n| n.alive).max_by_key(|n| n.fame);
    let Some(npc) = famed else { return Vec::new() };
    vec![LogEntry::new(
        LogCategory::Town,
        format!("tales of {} spread far beyond the marches", npc.name),
        now,
        now,
        world.seed.clone(),
    )
    .with_actors(vec![npc.name.clone()])]
}

const CARAVAN_SPAWN_CHANCE: f64 = 0.2;
const CARAVAN_GOODS: &[&str] = &["grain", "timber", "ore", "cloth", "spice", "arms"];

/// `spec.md` §4.6 "daily travel spawning": a new trade caravan occasionally
/// sets out between two settlements, its distance in miles following the
/// hex distance between them.
fn caravan_spawning(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut settlement_ids: Vec<String> = world.settlements.keys().cloned().collect();
    if settlement_ids.len() < 2 || !rng.chance(CARAVAN_SPAWN_CHANCE) {
        return Vec::new();
    }
    rng.shuffle(&mut settlement_ids);
    let (from_id, to_id) = (settlement_ids[0].clone(), settlement_ids[1].clone());
    let from = &world.settlements[&from_id];
    let to = &world.settlements[&to_id];
    let miles = (from.coord.distance(to.coord) as f32 * 8.0).max(20.0);
    let goods = CARAVAN_GOODS[rng.int(CARAVAN_GOODS.len() as u32) as usize];
    let from_name = from.name.clone();
    let to_name = to.name.clone();

    let caravan_id = rng.uid("caravan");
    world.geography.caravans.insert(
        caravan_id.clone(),
        crate::world::geography::Caravan {
            id: caravan_id,
            from_settlement_id: from_id,
            to_settlement_id: to_id,
            miles_remaining: miles,
            goods: goods.to_string(),
        },
    );

    vec![LogEntry::new(
        LogCategory::Road,
        format!("a caravan of {goods} sets out from {from_name} bound for {to_name}"),
        now,
        now,
        world.seed.clone(),
    )
    .with_location(from_name)]
}

const TRAVEL_SPAWN_CHANCE: f64 = 0.1;

/// `spec.md` §4.6 "daily travel spawning": an idle party with no quest
/// log or vendetta keeping it in town occasionally wanders to another
/// settlement.
fn daily_travel_spawning(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    let settlement_ids: Vec<String> = world.settlements.keys().cloned().collect();
    if settlement_ids.len() < 2 {
        return logs;
    }

    let party_ids: Vec<String> = world.parties.keys().cloned().collect();
    for party_id in party_ids {
        let party = &world.parties[&party_id];
        if party.status != PartyStatus::Idle || party.is_wiped_out() {
            continue;
        }
        let has_purpose = party
            .deep_state
            .as_ref()
            .map(|d| d.vendetta_target_id.is_some() || d.quest_log.iter().any(|q| q.progress < 100))
            .unwrap_or(false);
        if has_purpose || !rng.chance(TRAVEL_SPAWN_CHANCE) {
            continue;
        }

        let current_location = party.location.clone();
        let Some(destination) = settlement_ids
            .iter()
            .map(|id| world.settlements[id].name.clone())
            .find(|name| *name != current_location)
        else {
            continue;
        };
        let party = world.parties.get_mut(&party_id).unwrap();
        let party_name = party.name.clone();
        party.begin_travel(destination.clone(), 15.0 + rng.next() as f32 * 20.0, 1.0);
        logs.push(
            LogEntry::new(LogCategory::Road, format!("{party_name} sets out for {destination}"), now, now, world.seed.clone())
                .with_location(current_location)
                .with_actors(vec![party_name]),
        );
    }
    logs
}

fn naval_daily(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    for land in world.naval.distant_lands.iter_mut() {
        if rng.chance(0.02) {
            land.mention_count += 1;
        }
    }
    if rng.chance(0.01) {
        if let Some(land) = world.naval.distant_lands.first() {
            logs.push(LogEntry::new(
                LogCategory::Road,
                format!("sailors swap rumors of {}", land.name),
                now,
                now,
                world.seed.clone(),
            ));
        }
    }
    logs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wt() -> WorldTime {
        WorldTime::parse("2024-01-01T00:00:00Z").unwrap()
    }

    #[test]
    fn domain_taxation_pays_controlling_faction() {
        use crate::world::faction::{Faction, Focus};
        use crate::world::geography::HexCoord;
        use crate::world::settlement::{Settlement, SettlementType};

        let mut world = World::seed_new("alpha", wt());
        let mut settlement = Settlement::new("s1", "Rivermouth", HexCoord::new(0, 0), SettlementType::Town);
        settlement.flags.controlled_by = Some("f1".into());
        world.settlements.insert("s1".into(), settlement);
        world.factions.insert("f1".into(), Faction::new("f1", "The Iron Concord", Focus::Martial, 0));

        let mut rng = WorldRng::from_seed("day-tax-1");
        tick(&mut world, &mut rng, wt());
        assert!(world.factions["f1"].wealth > 0);
    }

    #[test]
    fn caravan_spawning_eventually_populates_geography() {
        use crate::world::geography::HexCoord;
        use crate::world::settlement::{Settlement, SettlementType};

        let mut world = World::seed_new("alpha", wt());
        world.settlements.insert("s1".into(), Settlement::new("s1", "Rivermouth", HexCoord::new(0, 0), SettlementType::Town));
        world.settlements.insert("s2".into(), Settlement::new("s2", "Oakford", HexCoord::new(3, 1), SettlementType::Village));

        let mut rng = WorldRng::from_seed("day-caravan-1");
        for day in 0..20 {
            let now = wt().advance_turns(day * sim_events::DAY_TURNS);
            tick(&mut world, &mut rng, now);
            if !world.geography.caravans.is_empty() {
                break;
            }
        }
        assert!(!world.geography.caravans.is_empty());
        let caravan = world.geography.caravans.values().next().unwrap();
        assert_ne!(caravan.from_settlement_id, caravan.to_settlement_id);
        assert!(caravan.miles_remaining > 0.0);
    }

    #[test]
    fn daily_travel_spawning_sends_a_purposeless_idle_party_on_the_road() {
        use crate::world::geography::HexCoord;
        use crate::world::party::Party;
        use crate::world::settlement::{Settlement, SettlementType};

        let mut world = World::seed_new("alpha", wt());
        world.settlements.insert("s1".into(), Settlement::new("s1", "Rivermouth", HexCoord::new(0, 0), SettlementType::Town));
        world.settlements.insert("s2".into(), Settlement::new("s2", "Oakford", HexCoord::new(3, 1), SettlementType::Village));
        world.parties.insert("p1".into(), Party::new("p1", "The Idle Few", "Rivermouth"));

        let mut rng = WorldRng::from_seed("day-travel-1");
        let mut started = false;
        for day in 0..30 {
            let now = wt().advance_turns(day * sim_events::DAY_TURNS);
            tick(&mut world, &mut rng, now);
            if world.parties["p1"].travel.is_some() {
                started = true;
                break;
            }
        }
        assert!(started, "expected the idle party to eventually set out on the road");
    }

    #[test]
    fn legendary_spike_respects_cooldown() {
        let mut world = World::seed_new("alpha", wt());
        world.npcs.insert("n1".into(), crate::world::npc::Npc::new("n1", "Alric", "hero", "Rivermouth"));
        world.npcs.get_mut("n1").unwrap().fame = 9000;
        world.legendary_state.last_spike_at = Some(wt());

        let mut rng = WorldRng::from_seed("day-legendary-1");
        for day in 0..5 {
            let now = wt().advance_turns(day * sim_events::DAY_TURNS);
            tick(&mut world, &mut rng, now);
        }
        assert_eq!(world.legendary_state.spike_count, 0);
    }
}
