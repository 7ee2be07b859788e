//! Faction operations (`spec.md` §4.7, "Faction operations").
//!
//! Each hour, past-due operations resolve and focus-gated spawning is
//! considered, preserving the "at most one in-flight operation per kind"
//! invariant (`FactionDeepState::has_inflight`) and the "resources reserved
//! at spawn are not returned on failure" policy.

use sim_events::{Consequence, ConsequenceKind, LogCategory, LogEntry, WorldTime};

use crate::rng::WorldRng;
use crate::world::faction::{Operation, OperationKind};
use crate::world::settlement::Good;
use crate::world::World;

const SPAWN_CHANCE: f64 = 0.1;
const OPERATION_DURATION_TURNS: i64 = 4 * 6; // ~4 hours

pub fn tick(world: &mut World, rng: &mut WorldRng, now: WorldTime) -> Vec<LogEntry> {
    let mut logs = Vec::new();
    let faction_ids: Vec<String> = world.factions.keys().cloned().collect();

    for faction_id in &faction_ids {
        logs.extend(resolve_due_operations(world, rng, now, faction_id));
    }
    for faction_id in &faction_ids {
        if let Some(entry) = maybe_spawn_operation(world, rng, now, faction_id) {
            logs.push(entry);
        }
    }

    logs
}

fn resolve_due_operations(world: &mut World, rng: &mut WorldRng, now: WorldTime, faction_id: &str) -> Vec<LogEntry> {
    let Some(faction) = world.factions.get(faction_id) else { return Vec::new() };
    let due: Vec<Operation> = faction
        .deep_state
        .active_operations
        .iter()
        .filter(|op| op.completes_at <= now)
        .cloned()
        .collect();
    if due.is_empty() {
        return Vec::new();
    }

    world
        .factions
        .get_mut(faction_id)
        .unwrap()
        .deep_state
        .active_operations
        .retain(|op| op.completes_at > now);

    due.into_iter()
        .filter_map(|op| resolve_operation(world, rng, now, faction_id, &op))
        .collect()
}

fn resolve_operation(world: &mut World, rng: &mut WorldRng, now: WorldTime, faction_id: &str, op: &Operation) -> Option<LogEntry> {
    let succeeded = rng.chance(op.success_chance as f64);
    let faction_name = world.factions.get(faction_id)?.name.clone();

    let (summary, location) = match op.kind {
        OperationKind::Raid => {
            if succeeded {
                if let Some(s) = op.target_settlement_id.as_deref().and_then(|id| world.settlements.get_mut(id)) {
                    s.adjust_supply(Good::Grain, -2);
                    s.flags.safety = (s.flags.safety - 1).max(-5);
                }
                (format!("{faction_name} raids and plunders the countryside"), op.target_settlement_id.clone())
            } else {
                (format!("{faction_name}'s raiders are driven off"), op.target_settlement_id.clone())
            }
        }
        OperationKind::Expansion => {
            if succeeded {
                world.factions.get_mut(faction_id)?.deep_state.power += 5;
            }
            (format!("{faction_name} pushes its borders outward"), None)
        }
        OperationKind::Conquest => {
            if succeeded {
                if let Some(settlement_id) = op.target_settlement_id.clone() {
                    if let Some(s) = world.settlements.get_mut(&settlement_id) {
                        s.flags.controlled_by = Some(faction_id.to_string());
                        s.flags.contested = false;
                    }
                    let territory = &mut world.factions.get_mut(faction_id)?.deep_state.territory;
                    if !territory.contains(&settlement_id) {
                        territory.push(settlement_id.clone());
                    }
                    world.consequence_queue.push(Consequence::new(
                        rng.uid("cq"),
                        4,
                        sim_events::HOUR_TURNS * 6,
                        format!("{faction_name} conquers a settlement its people resent"),
                        ConsequenceKind::SettlementChange { settlement_id, mood_delta: -2 },
                    ));
                }
                (format!("{faction_name} seizes control of a settlement"), op.target_settlement_id.clone())
            } else {
                (format!("{faction_name}'s bid for conquest collapses"), op.target_settlement_id.clone())
            }
        }
        OperationKind::ResourceGrab => {
            if succeeded {
                world.factions.get_mut(faction_id)?.wealth += 200;
            }
            (format!("{faction_name} secures a windfall of resources"), op.target_settlement_id.clone())
        }
        OperationKind::TradeEmbargo => {
            if succeeded {
                if let Some(target) = op.target_faction_id.as_deref() {
                    if let Some(enemy) = world.factions.get_mut(target) {
                        enemy.wealth = (enemy.wealth - 150).max(0);
                    }
                }
            }
            (format!("{faction_name} enforces a trade embargo"), None)
        }
        OperationKind::Crusade => {
            if succeeded {
                world.factions.get_mut(faction_id)?.deep_state.recent_wins.push(op.id.clone());
            }
            (format!("{faction_name} marches on its crusade"), op.target_settlement_id.clone())
        }
        OperationKind::Propaganda => {
            if succeeded {
                if let Some(id) = op.target_settlement_id.as_deref() {
                    world.factions.get_mut(faction_id)?.adjust_attitude(id, 1);
                }
            }
            (format!("{faction_name} spreads word of its deeds"), op.target_settlement_id.clone())
        }
        OperationKind::Assassination => {
            let summary = if succeeded {
                format!("{faction_name} strikes in the shadows, and a rival falls silent")
            } else {
                format!("an assassin in {faction_name}'s service is caught and exposed")
            };
            (summary, op.target_settlement_id.clone())
        }
        OperationKind::MarriageAlliance => {
            if succeeded {
                if let Some(target) = op.target_faction_id.clone() {
                    let f = world.factions.get_mut(faction_id)?;
                    if !f.deep_state.allies.contains(&target) {
                        f.deep_state.allies.push(target);
                    }
                }
            }
            (format!("{faction_name} brokers a marriage alliance"), None)
        }
        OperationKind::Inquisition => {
            if succeeded {
                if let Some(id) = op.target_settlement_id.as_deref() {
                    if let Some(s) = world.settlements.get_mut(id) {
                        s.flags.unrest = (s.flags.unrest - 1).max(-5);
                    }
                }
            }
            (format!("{faction_name}'s inquisitors root out heresy"), op.target_settlement_id.clone())
        }
        OperationKind::Blockade => {
            if succeeded {
                if let Some(id) = op.target_settlement_id.as_deref() {
                    if let Some(s) = world.settlements.get_mut(id) {
                        s.flags.prosperity = (s.flags.prosperity - 2).max(-5);
                    }
                }
            }
            (format!("{faction_name} blockades the approaches to a settlement"), op.target_settlement_id.clone())
        }
        OperationKind::Relief => {
            if succeeded {
                if let Some(id) = op.target_settlement_id.as_deref() {
                    if let Some(s) = world.settlements.get_mut(id) {
                        s.adjust_supply(Good::Grain, 3);
                        s.flags.unrest = (s.flags.unrest - 1).max(-5);
                    }
                }
            }
            (format!("{faction_name} delivers relief supplies"), op.target_settlement_id.clone())
        }
    };

    let mut entry = LogEntry::new(LogCategory::Faction, summary, now, now, world.seed.clone())
        .with_actors(vec![faction_name]);
    if let Some(loc) = location {
        entry = entry.with_location(loc);
    }
    Some(entry)
}

fn maybe_spawn_operation(world: &mut World, rng: &mut WorldRng, now: WorldTime, faction_id: &str) -> Option<LogEntry> {
    if !rng.chance(SPAWN_CHANCE) {
        return None;
    }
    let faction = world.factions.get(faction_id)?;
    let focus = faction.focus;
    let candidates: Vec<OperationKind> = all_operation_kinds()
        .into_iter()
        .filter(|k| k.spawnable_by(focus) && !faction.deep_state.has_inflight(*k))
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let kind = *rng.pick(&candidates).ok()?;
    let target_settlement_id = pick_target_settlement(world, rng, faction_id, kind);
    let target_faction_id = pick_target_faction(world, rng, faction_id, kind);
    let reserved_resources = 50;

    let faction = world.factions.get_mut(faction_id)?;
    if faction.wealth < reserved_resources as i64 {
        return None;
    }
    faction.wealth -= reserved_resources as i64;
    let faction_name = faction.name.clone();
    let op = Operation {
        id: rng.uid("op"),
        kind,
        target_settlement_id: target_settlement_id.clone(),
        target_faction_id,
        success_chance: 0.5 + rng.next() as f32 * 0.3,
        completes_at: now.advance_turns(OPERATION_DURATION_TURNS),
        secret: matches!(kind, OperationKind::Assassination | OperationKind::Inquisition),
        reserved_resources,
    };
    faction.deep_state.active_operations.push(op);

    let mut entry = LogEntry::new(
        LogCategory::Faction,
        format!("{faction_name} commits resources to a new {} operation", operation_label(kind)),
        now,
        now,
        world.seed.clone(),
    )
    .with_actors(vec![faction_name]);
    if let Some(loc) = target_settlement_id {
        entry = entry.with_location(loc);
    }
    Some(entry)
}

fn pick_target_settlement(world: &World, rng: &mut WorldRng, faction_id: &str, kind: OperationKind) -> Option<String> {
    if matches!(kind, OperationKind::MarriageAlliance | OperationKind::TradeEmbargo) {
        return None;
    }
    let candidates: Vec<String> = world
        .settlements
        .values()
        .filter(|s| s.flags.controlled_by.as_deref() != Some(faction_id))
        .map(|s| s.id.clone())
        .collect();
    rng.pick(&candidates).ok().cloned()
}

fn pick_target_faction(world: &World, rng: &mut WorldRng, faction_id: &str, kind: OperationKind) -> Option<String> {
    if !matches!(kind, OperationKind::TradeEmbargo | OperationKind::MarriageAlliance) {
        return None;
    }
    let candidates: Vec<String> = world.factions.keys().filter(|id| id.as_str() != faction_id).cloned().collect();
    rng.pick(&candidates).ok().cloned()
}

fn all_operation_kinds() -> [OperationKind; 12] {
    use OperationKind::*;
    [
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
    ]
}

fn operation_label(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Raid => "raid",
        OperationKind::Expansion => "expansion",
        OperationKind::Conquest => "conquest",
        OperationKind::ResourceGrab => "resource-grab",
        OperationKind::TradeEmbargo => "trade-embargo",
        OperationKind::Crusade => "crusade",
        OperationKind::Propaganda => "propaganda",
        OperationKind::Assassination => "assassination",
        OperationKind::MarriageAlliance => "marriage-alliance",
        OperationKind::Inquisition => "inquisition",
        OperationKind::Blockade => "blockade",
        OperationKind::Relief => "relief",
    }
}
