//! Party agency (`spec.md` §4.7, "Party agency").
//!
//! Each idle, non-resting party pursues its vendetta, advances quest-log
//! entries, and weighs confrontation against nearby antagonists.

use sim_events::{LogCategory, LogEntry, WorldTime};

use crate::rng::WorldRng;
use crate::world::party::PartyStatus;
use crate::world::World;

const ACT_CHANCE: f64 = 0.25;

pub fn tick(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    let party_ids: Vec<String> = world.parties.keys().cloned().collect();

    for party_id in party_ids {
        let Some(party) = world.parties.get(&party_id) else { continue };
        if party.status != PartyStatus::Idle || party.is_wiped_out() {
            continue;
        }
        if !rng.chance(ACT_CHANCE) {
            continue;
        }

        if let Some(entries) = pursue_vendetta(world, rng, now, &party_id) {
            logs.extend(entries);
            continue;
        }
        if let Some(entry) = confront_nearby_antagonist(world, rng, now, &party_id) {
            logs.push(entry);
            continue;
        }
        advance_quest_log(world, &party_id);
    }

    logs
}

/// Travels toward, or confronts, the party's `vendetta_target_id` if one is
/// set. `spec.md` §4.7: "travel or confront". Returns `None` if the party has
/// no vendetta target (its turn is free for other agency); `Some` (possibly
/// empty) if the turn was spent pursuing it.
fn pursue_vendetta(world: &mut World, rng: &mut WorldRng, now: WorldTime, party_id: &str) -> Option<Vec<LogEntry>> {
    let party = world.parties.get(party_id)?;
    let target_id = party.deep_state.as_ref().and_then(|d| d.vendetta_target_id.clone())?;
    let target = world.npcs.get(&target_id)?;
    if !target.alive {
        world.parties.get_mut(party_id).unwrap().deep_state_mut().vendetta_target_id = None;
        return Some(Vec::new());
    }

    let target_location = target.location.clone();
    let party_location = party.location.clone();
    if party_location == target_location {
        Some(confront_vendetta_target(world, rng, now, party_id, &target_id).into_iter().collect())
    } else {
        let party = world.parties.get_mut(party_id).unwrap();
        if party.travel.is_none() {
            party.begin_travel(target_location, 20.0 + rng.next() as f32 * 10.0, 1.0);
        }
        Some(Vec::new())
    }
}

/// Resolves a vendetta confrontation by comparing the party's strength
/// against the target's level and fame, mirroring the weighing
/// [`confront_nearby_antagonist`] does against a monster threat rating.
fn confront_vendetta_target(
    world: &mut World,
    rng: &mut WorldRng,
    now: WorldTime,
    party_id: &str,
    target_id: &str,
) -> Option<LogEntry> {
    let party = world.parties.get(party_id)?;
    let location = party.location.clone();
    let morale = party.deep_state.as_ref().map(|d| d.morale as i32).unwrap_or(0);
    let party_power = party.total_strength() + party.fame as i64 + morale as i64;

    let target = world.npcs.get(target_id)?;
    let target_power = target.level as i64 * 10 + target.fame as i64;

    let tie_break = rng.next();
    let party_wins = (party_power as f64) + tie_break * 5.0 > target_power as f64;

    let party_name = world.parties[party_id].name.clone();
    let target_name = world.npcs[target_id].name.clone();

    if party_wins {
        world.npcs.get_mut(target_id).unwrap().kill(now);
        let party = world.parties.get_mut(party_id).unwrap();
        party.fame += 20;
        party.deep_state_mut().morale = (party.deep_state_mut().morale + 2).min(10);
        party.deep_state_mut().kill_list.push(target_id.to_string());
        party.deep_state_mut().vendetta_target_id = None;
        Some(
            LogEntry::new(
                LogCategory::Road,
                format!("{party_name} hunts down {target_name} at last"),
                now,
                now,
                world.seed.clone(),
            )
            .with_location(location)
            .with_actors(vec![party_name, target_name]),
        )
    } else {
        let party = world.parties.get_mut(party_id).unwrap();
        party.deep_state_mut().morale = (party.deep_state_mut().morale - 3).max(-10);
        let deaths = casualties(party, rng);
        Some(
            LogEntry::new(
                LogCategory::Road,
                format!("{party_name} fails to bring down {target_name}, losing {deaths} members"),
                now,
                now,
                world.seed.clone(),
            )
            .with_location(location)
            .with_actors(vec![party_name, target_name]),
        )
    }
}

/// Fight-or-flee against a co-located living antagonist, weighing the
/// party's fame+morale against the antagonist's threat (`spec.md` §4.7).
fn confront_nearby_antagonist(world: &mut World, rng: &mut WorldRng, now: WorldTime, party_id: &str) -> Option<LogEntry> {
    let party = world.parties.get(party_id)?;
    let location = party.location.clone();
    let antagonist_id = world
        .antagonists
        .values()
        .find(|a| a.alive && a.territory.as_deref() == Some(location.as_str()))
        .map(|a| a.id.clone())?;

    let party = world.parties.get(party_id)?;
    let morale = party.deep_state.as_ref().map(|d| d.morale as i32).unwrap_or(0);
    let party_power = party.total_strength() + party.fame as i64 + morale as i64;
    let antagonist = &world.antagonists[&antagonist_id];
    let threat_power = antagonist.threat as i64 * 10 + antagonist.followers as i64;

    let will_fight = party_power >= threat_power || rng.chance(0.3);
    if !will_fight {
        return None;
    }

    let tie_break = rng.next();
    let party_wins = (party_power as f64) + tie_break * 5.0 > threat_power as f64;

    let party_name = world.parties[party_id].name.clone();
    let antagonist_name = world.antagonists[&antagonist_id].name.clone();

    if party_wins {
        world.antagonists.get_mut(&antagonist_id).unwrap().kill(now);
        let party = world.parties.get_mut(party_id).unwrap();
        party.fame += 20;
        party.deep_state_mut().morale = (party.deep_state_mut().morale + 2).min(10);
        party.deep_state_mut().kill_list.push(antagonist_id.clone());
        Some(
            LogEntry::new(
                LogCategory::Road,
                format!("{party_name} brings down {antagonist_name}"),
                now,
                now,
                world.seed.clone(),
            )
            .with_location(location)
            .with_actors(vec![party_name]),
        )
    } else {
        let party = world.parties.get_mut(party_id).unwrap();
        party.deep_state_mut().morale = (party.deep_state_mut().morale - 3).max(-10);
        let deaths = casualties(party, rng);
        Some(
            LogEntry::new(
                LogCategory::Road,
                format!("{party_name} is routed by {antagonist_name}, losing {deaths} members"),
                now,
                now,
                world.seed.clone(),
            )
            .with_location(location)
            .with_actors(vec![party_name]),
        )
    }
}

fn casualties(party: &mut crate::world::party::Party, rng: &mut WorldRng) -> usize {
    let mut deaths = 0;
    for member in party.members.iter_mut() {
        if member.is_alive() && rng.chance(0.3) {
            member.hp = 0;
            deaths += 1;
        }
    }
    deaths
}

fn advance_quest_log(world: &mut World, party_id: &str) {
    let Some(party) = world.parties.get_mut(party_id) else { return };
    if let Some(deep_state) = party.deep_state.as_mut() {
        if let Some(entry) = deep_state.quest_log.iter_mut().find(|q| q.progress < 100) {
            entry.progress = entry.progress.saturating_add(5).min(100);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::army::Antagonist;
    use crate::world::party::{Party, PartyDeepState, PartyMember};

    fn wt() -> WorldTime {
        WorldTime::parse("2024-01-01T00:00:00Z").unwrap()
    }

    fn member(name: &str) -> PartyMember {
        PartyMember { name: name.into(), class: "fighter".into(), level: 8, hp: 40, max_hp: 40 }
    }

    #[test]
    fn strong_party_defeats_weak_antagonist() {
        let mut world = World::seed_new("alpha", wt());
        let mut party = Party::new("p1", "The Bold", "Rivermouth");
        party.members.push(member("Alric"));
        party.members.push(member("Beda"));
        party.fame = 50;
        party.deep_state = Some(PartyDeepState { morale: 5, ..Default::default() });
        world.parties.insert("p1".into(), party);
        world.antagonists.insert(
            "ant1".into(),
            Antagonist {
                id: "ant1".into(),
                name: "The Ditch Ghoul".into(),
                epithet: "the lesser".into(),
                antagonist_type: "undead".into(),
                territory: Some("Rivermouth".into()),
                threat: 1,
                alive: true,
                followers: 0,
                last_seen: wt(),
            },
        );

        let mut rng = WorldRng::from_seed("party-fight-1");
        let mut won = false;
        for hour in 0..20 {
            let now = wt().advance_turns(hour * sim_events::HOUR_TURNS);
            tick(&mut world, &mut rng, now);
            if !world.antagonists["ant1"].alive {
                won = true;
                break;
            }
        }
        assert!(won);
        assert!(world.parties["p1"].deep_state.as_ref().unwrap().kill_list.contains(&"ant1".to_string()));
    }

    #[test]
    fn vendetta_confrontation_kills_a_colocated_weak_target() {
        let mut world = World::seed_new("alpha", wt());
        let mut target = crate::world::npc::Npc::new("n1", "Grudge Target", "smith", "Rivermouth");
        target.level = 1;
        world.npcs.insert("n1".into(), target);

        let mut party = Party::new("p1", "The Bold", "Rivermouth");
        party.members.push(member("Alric"));
        party.members.push(member("Beda"));
        party.fame = 50;
        party.deep_state = Some(PartyDeepState { vendetta_target_id: Some("n1".into()), morale: 5, ..Default::default() });
        world.parties.insert("p1".into(), party);

        let mut rng = WorldRng::from_seed("vendetta-confront-1");
        let mut resolved = false;
        for hour in 0..20 {
            let now = wt().advance_turns(hour * sim_events::HOUR_TURNS);
            tick(&mut world, &mut rng, now);
            if !world.npcs["n1"].alive {
                resolved = true;
                break;
            }
        }
        assert!(resolved, "expected the vendetta confrontation to kill the target within 20 activations");
        assert!(world.parties["p1"].deep_state.as_ref().unwrap().kill_list.contains(&"n1".to_string()));
        assert!(world.parties["p1"].deep_state.as_ref().unwrap().vendetta_target_id.is_none());
    }

    #[test]
    fn vendetta_travel_begins_toward_distant_target() {
        let mut world = World::seed_new("alpha", wt());
        let mut npc = crate::world::npc::Npc::new("n1", "Grudge Target", "smith", "Oakford");
        npc.alive = true;
        world.npcs.insert("n1".into(), npc);

        let mut party = Party::new("p1", "The Bold", "Rivermouth");
        party.deep_state = Some(PartyDeepState { vendetta_target_id: Some("n1".into()), ..Default::default() });
        world.parties.insert("p1".into(), party);

        let mut rng = WorldRng::from_seed("vendetta-1");
        let mut started = false;
        for hour in 0..10 {
            let now = wt().advance_turns(hour * sim_events::HOUR_TURNS);
            tick(&mut world, &mut rng, now);
            if world.parties["p1"].travel.is_some() {
                started = true;
                break;
            }
        }
        assert!(started);
    }
}
