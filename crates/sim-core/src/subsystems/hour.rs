//! Hourly subsystem dispatch (`spec.md` §4.2, §4.7-§4.10): travel and
//! caravans, agency for NPCs/parties/factions, spellcasting, nexus income,
//! level-ups, army raising & marching, ruins resettlement, disease,
//! mercenary upkeep, diplomacy, retainer hiring, guilds, ecology, dynasty
//! courtship, treasure extraction, naval traffic, and finally the
//! consequence drain.

use sim_events::{Consequence, ConsequenceKind, LogCategory, LogEntry, WorldTime};

use crate::agency::{faction_ops, npc_agency, party_agency};
use crate::consequences;
use crate::event_log::EventLogSink;
use crate::error::KernelError;
use crate::rng::WorldRng;
use crate::world::army::ArmyStatus;
use crate::world::World;

pub fn tick(
    world: &mut World,
    rng: &mut WorldRng,
    now: WorldTime,
    event_log: &EventLogSink,
    next_id: &mut impl FnMut() -> String,
) -> Result<Vec<LogEntry>, KernelError> {
    let mut logs = Vec::new();

    logs.extend(advance_travel(world, now));
    logs.extend(advance_caravans(world, rng, now));
    logs.extend(npc_agency::tick(world, rng, now));
    logs.extend(party_agency::tick(world, rng, now));
    logs.extend(faction_ops::tick(world, rng, now));
    logs.extend(spellcasting(world, rng, now));
    logs.extend(nexus_income(world, now));
    logs.extend(level_ups(world, now));
    logs.extend(army_raising(world, rng, now));
    logs.extend(army_marching(world, rng, now));
    logs.extend(ruins_resettlement(world, rng, now));
    logs.extend(disease_spread(world, rng, now));
    mercenary_upkeep(world);
    logs.extend(diplomacy(world, rng, now));
    logs.extend(retainer_hiring(world, rng, now));
    logs.extend(guild_activity(world, rng, now));
    logs.extend(ecology_migration(world, rng, now));
    logs.extend(dynasty_courtship(world, rng, now));
    logs.extend(treasure_extraction(world, rng, now));
    logs.extend(naval_traffic(world, rng, now));

    let thread_consequences =
        director::advance_story_threads(&mut world.story_threads, rng.as_rand(), now, next_id);
    world.consequence_queue.extend(thread_consequences);

    let due = consequences::advance_and_drain(&mut world.consequence_queue, sim_events::HOUR_TURNS);
    logs.extend(resolve_consequences(world, due, now));

    for entry in std::mem::take(&mut logs) {
        let new_consequences = event_log.record(entry.clone(), &mut world.story_threads, rng.as_rand(), next_id)?;
        world.consequence_queue.extend(new_consequences);
        logs.push(entry);
    }

    Ok(logs)
}

fn advance_travel(world: &mut World, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    for party in world.parties.values_mut() {
        if let Some(dest) = party.advance_travel(3.0) {
            logs.push(
                LogEntry::new(
                    LogCategory::Road,
                    format!("{} arrives at {}", party.name, dest),
                    now,
                    now,
                    world.seed.clone(),
                )
                .with_location(dest)
                .with_actors(vec![party.name.clone()]),
            );
        }
    }
    logs
}

fn advance_caravans(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    let mut arrived = Vec::new();
    for (id, caravan) in world.geography.caravans.iter_mut() {
        caravan.miles_remaining -= 4.0;
        if caravan.miles_remaining <= 0.0 {
            arrived.push(id.clone());
        }
    }
    for id in arrived {
        if let Some(caravan) = world.geography.caravans.remove(&id) {
            if let Some(dest) = world.settlements.get_mut(&caravan.to_settlement_id) {
                dest.adjust_supply(crate::world::settlement::Good::Grain, 1);
            }
            let mut entry = LogEntry::new(
                LogCategory::Road,
                format!("a caravan bearing {} reaches its destination", caravan.goods),
                now,
                now,
                world.seed.clone(),
            )
            .with_location(caravan.to_settlement_id.clone());
            if rng.chance(0.05) {
                entry = entry.with_details("bandits were sighted along the route but did not strike");
            }
            logs.push(entry);
        }
    }
    logs
}

/// `spec.md` §4.6 "spellcasting": alive casters with a learned spell
/// occasionally cast it, producing a small, flavor-named effect keyed off
/// the spell's name rather than a full effects table (`spec.md` §1 keeps
/// the spell-effects table itself out of scope).
const SPELLCAST_CHANCE: f64 = 0.05;

fn spellcasting(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    let caster_ids: Vec<String> = world
        .npcs
        .iter()
        .filter(|(_, n)| n.alive && !n.known_spells.is_empty())
        .map(|(id, _)| id.clone())
        .collect();

    for npc_id in caster_ids {
        if !rng.chance(SPELLCAST_CHANCE) {
            continue;
        }
        let npc = &world.npcs[&npc_id];
        let spell = npc.known_spells[rng.int(npc.known_spells.len() as u32) as usize].clone();
        let caster_name = npc.name.clone();
        let location = npc.location.clone();

        if spell.contains("cure") {
            if let Some(party) = world.parties.values_mut().find(|p| p.location == location) {
                if let Some(member) = party.members.iter_mut().find(|m| m.is_alive() && m.hp < m.max_hp) {
                    member.hp = (member.hp + 8).min(member.max_hp);
                }
            }
        } else if spell.contains("bless") || spell.contains("protection") {
            if let Some(settlement) = world.settlements.values_mut().find(|s| s.name == location) {
                settlement.flags.safety = (settlement.flags.safety + 1).min(5);
            }
        } else if let Some(settlement) = world.settlements.values_mut().find(|s| s.name == location) {
            settlement.flags.unrest = (settlement.flags.unrest + 1).min(5);
        }

        logs.push(
            LogEntry::new(LogCategory::Town, format!("{caster_name} casts {spell}"), now, now, world.seed.clone())
                .with_location(location)
                .with_actors(vec![caster_name]),
        );
    }
    logs
}

/// `spec.md` §4.6 "army raising & marching": a martially-focused faction
/// with enough wealth occasionally raises a new army at one of its
/// territory settlements.
const ARMY_RAISE_CHANCE: f64 = 0.015;
const ARMY_RAISE_COST: i64 = 300;
/// `spec.md` §4.6: armies march the same way caravans travel — a fixed
/// daily pace counted down in miles.
const ARMY_MARCH_MILES_PER_HOUR: f32 = 3.0;

fn army_raising(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    let faction_ids: Vec<String> = world.factions.keys().cloned().collect();
    for faction_id in faction_ids {
        let faction = &world.factions[&faction_id];
        if faction.focus != crate::world::faction::Focus::Martial || faction.wealth < ARMY_RAISE_COST {
            continue;
        }
        if faction.deep_state.territory.is_empty() || !rng.chance(ARMY_RAISE_CHANCE) {
            continue;
        }
        let location = faction.deep_state.territory[rng.int(faction.deep_state.territory.len() as u32) as usize].clone();
        let faction_name = faction.name.clone();
        let faction = world.factions.get_mut(&faction_id).unwrap();
        faction.wealth -= ARMY_RAISE_COST;

        let army_id = rng.uid("army");
        world.armies.insert(
            army_id.clone(),
            crate::world::army::Army {
                id: army_id,
                owner_id: faction_id.clone(),
                location: location.clone(),
                strength: 50 + rng.int(50) as i64,
                quality: 3 + rng.int(3) as u8,
                morale: 8,
                status: ArmyStatus::Idle,
                supplies: 100,
                supply_line_from: Some(location.clone()),
                is_mercenary: false,
                destination: None,
                miles_remaining: 0.0,
            },
        );
        logs.push(
            LogEntry::new(
                LogCategory::Faction,
                format!("{faction_name} musters a new army"),
                now,
                now,
                world.seed.clone(),
            )
            .with_location(location)
            .with_actors(vec![faction_name]),
        );
    }
    logs
}

/// Idle armies belonging to a faction with an in-flight operation against a
/// settlement outside its territory march on it; marching armies close the
/// distance and, on arrival at a settlement they don't yet hold, besiege it.
fn army_marching(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();

    let idle_armies: Vec<(String, String, String)> = world
        .armies
        .values()
        .filter(|a| a.status == ArmyStatus::Idle)
        .map(|a| (a.id.clone(), a.owner_id.clone(), a.location.clone()))
        .collect();

    let mut dispatches = Vec::new();
    for (army_id, owner_id, location) in idle_armies {
        let Some(faction) = world.factions.get(&owner_id) else { continue };
        let Some(target) = faction.deep_state.active_operations.iter().find_map(|op| op.target_settlement_id.clone())
        else {
            continue;
        };
        if target != location {
            dispatches.push((army_id, target));
        }
    }
    for (army_id, destination) in dispatches {
        let miles = 15.0 + rng.next() as f32 * 15.0;
        world.armies.get_mut(&army_id).unwrap().begin_march(destination, miles);
    }

    let arrived: Vec<String> = world
        .armies
        .iter_mut()
        .filter(|(_, a)| a.status == ArmyStatus::Marching)
        .filter_map(|(id, army)| {
            army.miles_remaining -= ARMY_MARCH_MILES_PER_HOUR;
            (army.miles_remaining <= 0.0).then(|| id.clone())
        })
        .collect();

    for army_id in arrived {
        let army = world.armies.get_mut(&army_id).unwrap();
        let destination = army.destination.take().unwrap_or_default();
        army.location = destination.clone();
        let owner_id = army.owner_id.clone();

        let contested = world
            .settlements
            .values()
            .find(|s| s.id == destination)
            .map(|s| s.flags.controlled_by.as_deref() != Some(owner_id.as_str()))
            .unwrap_or(false);
        let army = world.armies.get_mut(&army_id).unwrap();
        army.status = if contested { ArmyStatus::Besieging } else { ArmyStatus::Idle };

        if contested {
            if let Some(settlement) = world.settlements.values_mut().find(|s| s.id == destination) {
                settlement.flags.safety = (settlement.flags.safety - 1).max(-5);
                logs.push(
                    LogEntry::new(
                        LogCategory::Faction,
                        "an army lays siege to a settlement".to_string(),
                        now,
                        now,
                        world.seed.clone(),
                    )
                    .with_location(settlement.id.clone()),
                );
            }
        }
    }

    logs
}

/// `spec.md` §4.6 "ruins resettlement": a depopulated settlement is a ruin;
/// it occasionally draws settlers back.
fn ruins_resettlement(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    for settlement in world.settlements.values_mut() {
        if settlement.population == 0 && rng.chance(0.01) {
            settlement.population = 20;
            settlement.flags.unrest = 0;
            settlement.flags.disease = false;
            logs.push(
                LogEntry::new(
                    LogCategory::Town,
                    format!("settlers return to the ruins of {}", settlement.name),
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

/// `spec.md` §4.7 "nexus": a bound nexus pays its owner in fame each hour.
fn nexus_income(world: &mut World, _now: WorldTime) -> Vec<LogEntry> {
    for nexus in world.geography.nexuses.values() {
        let Some(owner_id) = nexus.current_owner_id.clone() else { continue };
        let income = nexus.intensity as u32;
        if let Some(npc) = world.npcs.get_mut(&owner_id) {
            npc.fame += income;
        }
    }
    Vec::new()
}

/// NPCs level up once fame clears a level-scaled threshold.
fn level_ups(world: &mut World, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    for npc in world.npcs.values_mut() {
        if !npc.alive {
            continue;
        }
        let threshold = npc.level * 100;
        if npc.fame >= threshold && npc.level < 20 {
            npc.level += 1;
            logs.push(
                LogEntry::new(
                    LogCategory::Town,
                    format!("{} grows in renown, reaching level {}", npc.name, npc.level),
                    now,
                    now,
                    world.seed.clone(),
                )
                .with_actors(vec![npc.name.clone()]),
            );
        }
    }
    logs
}

fn disease_spread(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    for settlement in world.settlements.values_mut() {
        if settlement.flags.disease {
            if rng.chance(0.02) {
                settlement.flags.disease = false;
                logs.push(
                    LogEntry::new(
                        LogCategory::Town,
                        format!("the sickness in {} finally breaks", settlement.name),
                        now,
                        now,
                        world.seed.clone(),
                    )
                    .with_location(settlement.id.clone()),
                );
            } else {
                settlement.population = settlement.population.saturating_sub(1);
                settlement.flags.safety = (settlement.flags.safety - 1).max(-5);
            }
        } else if settlement.flags.unrest >= 4 && rng.chance(0.01) {
            settlement.flags.disease = true;
            logs.push(
                LogEntry::new(
                    LogCategory::Town,
                    format!("disease breaks out in crowded, unruly {}", settlement.name),
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

/// `spec.md` §4.6 "diplomacy": a pair of factions occasionally shifts
/// toward alliance or enmity, driven by whether they agree about the
/// settlements both have an attitude toward. A faction is never both ally
/// and enemy of the same other faction at once.
const DIPLOMACY_CHANCE: f64 = 0.01;

fn diplomacy(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    let faction_ids: Vec<String> = world.factions.keys().cloned().collect();
    if faction_ids.len() < 2 || !rng.chance(DIPLOMACY_CHANCE) {
        return logs;
    }

    let mut shuffled = faction_ids;
    rng.shuffle(&mut shuffled);
    let (a_id, b_id) = (shuffled[0].clone(), shuffled[1].clone());

    let a = &world.factions[&a_id];
    let b = &world.factions[&b_id];
    let shared_settlements: Vec<&String> = a.attitude.keys().filter(|id| b.attitude.contains_key(*id)).collect();
    let agreement: i32 = shared_settlements
        .iter()
        .map(|id| {
            let da = a.attitude[*id] as i32;
            let db = b.attitude[*id] as i32;
            if (da > 0) == (db > 0) { 1 } else { -1 }
        })
        .sum();

    let a_name = a.name.clone();
    let b_name = b.name.clone();

    if agreement > 0 {
        let a = world.factions.get_mut(&a_id).unwrap();
        if !a.deep_state.allies.contains(&b_id) {
            a.deep_state.enemies.retain(|id| id != &b_id);
            a.deep_state.allies.push(b_id.clone());
            let b = world.factions.get_mut(&b_id).unwrap();
            b.deep_state.enemies.retain(|id| id != &a_id);
            if !b.deep_state.allies.contains(&a_id) {
                b.deep_state.allies.push(a_id.clone());
            }
            logs.push(LogEntry::new(
                LogCategory::Faction,
                format!("{a_name} and {b_name} draw closer together"),
                now,
                now,
                world.seed.clone(),
            ));
        }
    } else if agreement < 0 {
        let a = world.factions.get_mut(&a_id).unwrap();
        if !a.deep_state.enemies.contains(&b_id) {
            a.deep_state.allies.retain(|id| id != &b_id);
            a.deep_state.enemies.push(b_id.clone());
            a.deep_state.casus_belli.entry(b_id.clone()).or_insert_with(|| "rival interests".to_string());
            let b = world.factions.get_mut(&b_id).unwrap();
            b.deep_state.allies.retain(|id| id != &a_id);
            if !b.deep_state.enemies.contains(&a_id) {
                b.deep_state.enemies.push(a_id.clone());
            }
            logs.push(LogEntry::new(
                LogCategory::Faction,
                format!("relations between {a_name} and {b_name} sour"),
                now,
                now,
                world.seed.clone(),
            ));
        }
    }

    logs
}

/// `spec.md` §4.6 "guilds": a guild occasionally recruits an eligible NPC
/// at its home settlement.
const GUILD_RECRUIT_CHANCE: f64 = 0.02;

fn guild_activity(world: &mut World, rng: &mut WorldRng, _now: WorldTime) -> Vec<LogEntry> {
    let guild_ids: Vec<String> = world.guilds.guilds.keys().cloned().collect();
    for guild_id in guild_ids {
        if !rng.chance(GUILD_RECRUIT_CHANCE) {
            continue;
        }
        let guild = &world.guilds.guilds[&guild_id];
        let settlement_name = world.settlements.get(&guild.settlement_id).map(|s| s.name.clone());
        let Some(settlement_name) = settlement_name else { continue };
        let member_ids = guild.member_ids.clone();
        let recruit = world
            .npcs
            .iter()
            .find(|(id, n)| n.alive && n.location == settlement_name && !member_ids.contains(id))
            .map(|(id, _)| id.clone());
        if let Some(recruit_id) = recruit {
            world.guilds.guilds.get_mut(&guild_id).unwrap().member_ids.push(recruit_id);
        }
    }
    Vec::new()
}

fn mercenary_upkeep(world: &mut World) {
    for merc in world.geography.mercenaries.values_mut() {
        let Some(employer_id) = merc.employer_id.clone() else { continue };
        let cost = merc.cost_per_hour as i64;
        if let Some(faction) = world.factions.get_mut(&employer_id) {
            faction.wealth -= cost;
            if faction.wealth < 0 {
                faction.wealth = 0;
                merc.employer_id = None;
            }
        }
    }
}

fn retainer_hiring(world: &mut World, rng: &mut WorldRng, _now: WorldTime) -> Vec<LogEntry> {
    let candidates = std::mem::take(&mut world.retainers.pending_hire_candidates);
    let mut remaining = Vec::new();
    for candidate_id in candidates {
        let hired = world
            .parties
            .keys()
            .next()
            .cloned()
            .filter(|_| rng.chance(0.1));
        match hired {
            Some(employer_id) => {
                if let Some(retainer) = world.retainers.roster.get_mut(&candidate_id) {
                    retainer.hire(employer_id);
                }
            }
            None => remaining.push(candidate_id),
        }
    }
    world.retainers.pending_hire_candidates = remaining;
    Vec::new()
}

fn ecology_migration(world: &mut World, rng: &mut WorldRng, _now: WorldTime) -> Vec<LogEntry> {
    for population in world.ecology.populations.iter_mut() {
        if rng.chance(0.05) {
            population.count = population.count.saturating_add(1);
        }
    }
    Vec::new()
}

fn dynasty_courtship(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    let mut completed = Vec::new();
    for (i, courtship) in world.dynasty.courtships.iter_mut().enumerate() {
        courtship.progress = courtship.progress.saturating_add(rng.int(5) as u8 + 1).min(100);
        if courtship.progress >= 100 {
            completed.push(i);
        }
    }
    for i in completed.into_iter().rev() {
        let courtship = world.dynasty.courtships.remove(i);
        world.dynasty.marriages.push(crate::world::subdocs::Marriage {
            npc_a_id: courtship.suitor_id.clone(),
            npc_b_id: courtship.target_id.clone(),
            married_at: now,
        });
        logs.push(LogEntry::new(
            LogCategory::Town,
            "a long courtship ends in marriage".to_string(),
            now,
            now,
            world.seed.clone(),
        ));
    }
    logs
}

fn treasure_extraction(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    for hoard in world.treasure.hoards.values() {
        if hoard.guarded_by_dungeon_id.is_none() && rng.chance(0.01) {
            world.treasure.extractions_total += hoard.value;
            logs.push(
                LogEntry::new(
                    LogCategory::Road,
                    "an unguarded hoard is found and carried off".to_string(),
                    now,
                    now,
                    world.seed.clone(),
                )
                .with_location(hoard.location.clone()),
            );
        }
    }
    logs
}

fn naval_traffic(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    for ship in world.naval.ships.values() {
        let Some(route_id) = ship.route_id.as_deref() else { continue };
        let Some(route) = world.naval.routes.get(route_id) else { continue };
        if rng.chance(route.danger as f64 / 100.0) {
            logs.push(
                LogEntry::new(
                    LogCategory::Road,
                    format!("{} is beset by pirates at sea", ship.name),
                    now,
                    now,
                    world.seed.clone(),
                )
                .with_actors(vec![ship.name.clone()]),
            );
        }
    }
    logs
}

fn resolve_consequences(world: &mut World, due: Vec<Consequence>, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    for consequence in due {
        match consequence.kind {
            ConsequenceKind::SpawnEvent { event_hint } => {
                logs.push(LogEntry::new(LogCategory::Road, event_hint, now, now, world.seed.clone()));
            }
            ConsequenceKind::SettlementChange { settlement_id, mood_delta } => {
                if let Some(s) = world.settlements.get_mut(&settlement_id) {
                    s.adjust_mood(mood_delta);
                }
            }
            ConsequenceKind::RelationshipShift { from_id, to_id, delta } => {
                if let Some(npc) = world.npcs.get_mut(&from_id) {
                    if let Some(rel) = npc.relationships.iter_mut().find(|r| r.other_id == to_id) {
                        rel.strength = (rel.strength + delta).clamp(-1.0, 1.0);
                    } else {
                        npc.relationships.push(crate::world::npc::Relationship {
                            other_id: to_id,
                            kind: "rivalry".to_string(),
                            strength: delta.clamp(-1.0, 1.0),
                        });
                    }
                }
            }
            ConsequenceKind::Generic { .. } => {}
        }
    }
    logs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::faction::{Faction, Focus};
    use crate::world::geography::HexCoord;
    use crate::world::npc::Npc;
    use crate::world::party::{Party, PartyMember};
    use crate::world::settlement::{Settlement, SettlementType};
    use crate::world::subdocs::Guild;

    fn wt() -> WorldTime {
        WorldTime::parse("2024-01-01T00:00:00Z").unwrap()
    }

    #[test]
    fn spellcasting_caster_eventually_casts_a_known_spell() {
        let mut world = World::seed_new("alpha", wt());
        let mut npc = Npc::new("n1", "Mireth", "mage", "Rivermouth");
        npc.known_spells.push("bless".to_string());
        world.npcs.insert("n1".into(), npc);
        world.settlements.insert(
            "s1".into(),
            Settlement::new("s1", "Rivermouth", HexCoord::new(0, 0), SettlementType::Town),
        );

        let mut rng = WorldRng::from_seed("hour-spell-1");
        let mut cast = false;
        for hour in 0..80 {
            let now = wt().advance_turns(hour * sim_events::HOUR_TURNS);
            let logs = spellcasting(&mut world, &mut rng, now);
            if logs.iter().any(|l| l.summary.contains("casts bless")) {
                cast = true;
                break;
            }
        }
        assert!(cast, "expected the caster to eventually cast its known spell");
        assert!(world.settlements["s1"].flags.safety > 0);
    }

    #[test]
    fn army_raising_eventually_musters_a_new_army_for_a_wealthy_martial_faction() {
        let mut world = World::seed_new("alpha", wt());
        let mut faction = Faction::new("f1", "The Iron Concord", Focus::Martial, 10_000);
        faction.deep_state.territory.push("Rivermouth".to_string());
        world.factions.insert("f1".into(), faction);

        let mut rng = WorldRng::from_seed("hour-army-raise-1");
        let mut raised = false;
        for hour in 0..200 {
            let now = wt().advance_turns(hour * sim_events::HOUR_TURNS);
            army_raising(&mut world, &mut rng, now);
            if !world.armies.is_empty() {
                raised = true;
                break;
            }
        }
        assert!(raised, "expected a new army to eventually be raised");
        assert_eq!(world.armies.values().next().unwrap().owner_id, "f1");
        assert!(world.factions["f1"].wealth < 10_000);
    }

    #[test]
    fn army_marching_dispatches_toward_an_operation_target_and_besieges_on_arrival() {
        let mut world = World::seed_new("alpha", wt());
        let mut faction = Faction::new("f1", "The Iron Concord", Focus::Martial, 0);
        faction.deep_state.active_operations.push(crate::world::faction::Operation {
            id: "op1".into(),
            kind: crate::world::faction::OperationKind::Conquest,
            target_settlement_id: Some("Oakford".to_string()),
            target_faction_id: None,
            success_chance: 0.5,
            completes_at: wt(),
            secret: false,
            reserved_resources: 0,
        });
        world.factions.insert("f1".into(), faction);
        let mut target = Settlement::new("s2", "Oakford", HexCoord::new(3, 1), SettlementType::Town);
        target.flags.controlled_by = Some("f2".to_string());
        world.settlements.insert("s2".into(), target);
        world.armies.insert(
            "a1".into(),
            crate::world::army::Army {
                id: "a1".into(),
                owner_id: "f1".into(),
                location: "Rivermouth".into(),
                strength: 80,
                quality: 4,
                morale: 8,
                status: ArmyStatus::Idle,
                supplies: 100,
                supply_line_from: None,
                is_mercenary: false,
                destination: None,
                miles_remaining: 0.0,
            },
        );

        let mut rng = WorldRng::from_seed("hour-army-march-1");
        let mut besieged = false;
        for hour in 0..50 {
            let now = wt().advance_turns(hour * sim_events::HOUR_TURNS);
            army_marching(&mut world, &mut rng, now);
            if world.armies["a1"].status == ArmyStatus::Besieging {
                besieged = true;
                break;
            }
        }
        assert!(besieged, "expected the army to reach Oakford and besiege it");
        assert_eq!(world.armies["a1"].location, "Oakford");
    }

    #[test]
    fn ruins_resettlement_eventually_repopulates_a_ruin() {
        let mut world = World::seed_new("alpha", wt());
        let mut ruin = Settlement::new("s1", "Lost Hollow", HexCoord::new(0, 0), SettlementType::Village);
        ruin.population = 0;
        ruin.flags.unrest = 4;
        world.settlements.insert("s1".into(), ruin);

        let mut rng = WorldRng::from_seed("hour-ruins-1");
        let mut resettled = false;
        for hour in 0..400 {
            let now = wt().advance_turns(hour * sim_events::HOUR_TURNS);
            ruins_resettlement(&mut world, &mut rng, now);
            if world.settlements["s1"].population > 0 {
                resettled = true;
                break;
            }
        }
        assert!(resettled, "expected the ruin to eventually resettle");
        assert_eq!(world.settlements["s1"].flags.unrest, 0);
    }

    #[test]
    fn diplomacy_eventually_shifts_agreeing_factions_into_alliance() {
        let mut world = World::seed_new("alpha", wt());
        let mut a = Faction::new("f1", "The Iron Concord", Focus::Martial, 0);
        a.attitude.insert("s1".into(), 2);
        let mut b = Faction::new("f2", "The Quiet Company", Focus::Trade, 0);
        b.attitude.insert("s1".into(), 3);
        world.factions.insert("f1".into(), a);
        world.factions.insert("f2".into(), b);

        let mut rng = WorldRng::from_seed("hour-diplomacy-1");
        let mut allied = false;
        for hour in 0..400 {
            let now = wt().advance_turns(hour * sim_events::HOUR_TURNS);
            diplomacy(&mut world, &mut rng, now);
            if world.factions["f1"].deep_state.allies.contains(&"f2".to_string()) {
                allied = true;
                break;
            }
        }
        assert!(allied, "expected the two agreeing factions to eventually ally");
        assert!(world.factions["f2"].deep_state.allies.contains(&"f1".to_string()));
        assert!(!world.factions["f1"].deep_state.enemies.contains(&"f2".to_string()));
    }

    #[test]
    fn guild_activity_eventually_recruits_a_colocated_npc() {
        let mut world = World::seed_new("alpha", wt());
        world.guilds.guilds.insert(
            "g1".into(),
            Guild {
                id: "g1".into(),
                name: "The Steady Hand".into(),
                settlement_id: "s1".into(),
                specialty: "smithing".into(),
                member_ids: Vec::new(),
            },
        );
        world.settlements.insert(
            "s1".into(),
            Settlement::new("s1", "Rivermouth", HexCoord::new(0, 0), SettlementType::Town),
        );
        world.npcs.insert("n1".into(), Npc::new("n1", "Tamsin", "smith", "Rivermouth"));

        let mut rng = WorldRng::from_seed("hour-guild-1");
        let mut recruited = false;
        for hour in 0..200 {
            let now = wt().advance_turns(hour * sim_events::HOUR_TURNS);
            guild_activity(&mut world, &mut rng, now);
            if world.guilds.guilds["g1"].member_ids.contains(&"n1".to_string()) {
                recruited = true;
                break;
            }
        }
        assert!(recruited, "expected the guild to eventually recruit the colocated npc");
    }

    fn member(name: &str) -> PartyMember {
        PartyMember { name: name.into(), class: "fighter".into(), level: 3, hp: 20, max_hp: 20 }
    }

    #[test]
    fn spellcasting_cure_spell_heals_a_colocated_wounded_party_member() {
        let mut world = World::seed_new("alpha", wt());
        let mut npc = Npc::new("n1", "Brother Aldous", "cleric", "Rivermouth");
        npc.known_spells.push("cure light wounds".to_string());
        world.npcs.insert("n1".into(), npc);
        let mut party = Party::new("p1", "The Bold", "Rivermouth");
        let mut wounded = member("Alric");
        wounded.hp = 5;
        party.members.push(wounded);
        world.parties.insert("p1".into(), party);

        let mut rng = WorldRng::from_seed("hour-cure-1");
        let mut healed = false;
        for hour in 0..80 {
            let now = wt().advance_turns(hour * sim_events::HOUR_TURNS);
            spellcasting(&mut world, &mut rng, now);
            if world.parties["p1"].members[0].hp > 5 {
                healed = true;
                break;
            }
        }
        assert!(healed, "expected the cleric to eventually cure the wounded member");
    }
}
