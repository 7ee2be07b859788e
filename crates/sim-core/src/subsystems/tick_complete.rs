//! End-of-tick pruning and the snapshot write (`spec.md` §4.12).
//!
//! Runs once per turn, after every other subsystem for that turn has had
//! its chance to mutate the world, so pruning always sees the tick's final
//! state.

use sim_events::WorldTime;

use crate::error::KernelError;
use crate::store::WorldStore;
use crate::world::World;

/// World-days a dead antagonist or an insignificant dead NPC is kept
/// around before pruning (`spec.md` §3: "pruned 90d after death").
const DEATH_PRUNE_DAYS: i64 = 90;
/// An NPC below this fame, with this few memories or fewer, counts as
/// "insignificant" and is eligible for post-death pruning.
const INSIGNIFICANT_FAME: u32 = 10;
const INSIGNIFICANT_MEMORY_COUNT: usize = 5;

/// Caps on unbounded-growth collections (`spec.md` §4.12): resolved story
/// threads retire 30 world-days after resolution, the naval distant-lands
/// catalog keeps the 50 highest-mentioned entries, dead antagonists and
/// insignificant dead NPCs are pruned 90 world-days after death — unless
/// still referenced by an unresolved story thread, which always wins.
pub fn prune(world: &mut World, now: WorldTime) {
    director::prune_resolved_threads(&mut world.story_threads, now);
    world.naval.prune_distant_catalog();
    prune_dead_antagonists(world, now);
    prune_insignificant_dead_npcs(world, now);
}

fn referenced_by_unresolved_thread(world: &World, name: &str) -> bool {
    world.story_threads.values().any(|t| !t.resolved && t.involves_actor(name))
}

fn prune_dead_antagonists(world: &mut World, now: WorldTime) {
    let keep: Vec<String> = world
        .antagonists
        .values()
        .filter(|a| {
            a.alive
                || now.turns_since(a.last_seen) < DEATH_PRUNE_DAYS * sim_events::DAY_TURNS
                || referenced_by_unresolved_thread(world, &a.name)
        })
        .map(|a| a.id.clone())
        .collect();
    world.antagonists.retain(|id, _| keep.contains(id));
}

fn prune_insignificant_dead_npcs(world: &mut World, now: WorldTime) {
    let keep: Vec<String> = world
        .npcs
        .values()
        .filter(|n| {
            n.alive
                || n.fame > INSIGNIFICANT_FAME
                || n.memories.len() > INSIGNIFICANT_MEMORY_COUNT
                || n.died_at
                    .map(|died_at| now.turns_since(died_at) < DEATH_PRUNE_DAYS * sim_events::DAY_TURNS)
                    .unwrap_or(true)
                || referenced_by_unresolved_thread(world, &n.name)
        })
        .map(|n| n.id.clone())
        .collect();
    world.npcs.retain(|id, _| keep.contains(id));
}

/// Persists the pruned world via [`WorldStore`], per `spec.md` §4.3's
/// atomic-write contract.
pub fn snapshot(world: &World, store: &mut WorldStore) -> Result<(), KernelError> {
    store.save(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_events::{StoryThread, StoryType};

    fn wt() -> WorldTime {
        WorldTime::parse("2024-01-01T00:00:00Z").unwrap()
    }

    #[test]
    fn prune_retires_old_resolved_threads() {
        let mut world = World::seed_new("alpha", wt());
        let mut thread = StoryThread::new(
            "t1",
            StoryType::Feud,
            "The Marsh Feud",
            "Two houses quarrel",
            vec!["Alric".into()],
            Some("Rivermouth".into()),
            wt(),
        );
        thread.resolve(wt(), "settled");
        world.story_threads.insert("t1".into(), thread);

        prune(&mut world, wt().advance_turns(sim_events::DAY_TURNS * 31));
        assert!(world.story_threads.is_empty());
    }

    #[test]
    fn prune_drops_a_long_dead_antagonist_but_keeps_a_recent_one() {
        use crate::world::army::Antagonist;

        let mut world = World::seed_new("alpha", wt());
        let old = Antagonist {
            id: "ant_old".into(),
            name: "The Flayed King".into(),
            epithet: "tyrant".into(),
            antagonist_type: "warlord".into(),
            territory: Some("the Marches".into()),
            threat: 8,
            alive: false,
            followers: 0,
            last_seen: wt(),
        };
        let recent = Antagonist {
            id: "ant_recent".into(),
            name: "The Red Widow".into(),
            epithet: "warlord".into(),
            antagonist_type: "bandit".into(),
            territory: Some("the Fens".into()),
            threat: 6,
            alive: false,
            followers: 0,
            last_seen: wt().advance_turns(sim_events::DAY_TURNS * 10),
        };
        world.antagonists.insert("ant_old".into(), old);
        world.antagonists.insert("ant_recent".into(), recent);

        prune(&mut world, wt().advance_turns(sim_events::DAY_TURNS * 91));

        assert!(!world.antagonists.contains_key("ant_old"));
        assert!(world.antagonists.contains_key("ant_recent"));
    }

    #[test]
    fn prune_keeps_an_insignificant_dead_npc_referenced_by_an_unresolved_thread() {
        use crate::world::npc::Npc;

        let mut world = World::seed_new("alpha", wt());
        let mut dead = Npc::new("npc_a", "Alric", "hunter", "Rivermouth");
        dead.alive = false;
        dead.died_at = Some(wt());
        world.npcs.insert("npc_a".into(), dead);

        let thread = StoryThread::new(
            "t1",
            StoryType::Vendetta,
            "The Alric Vendetta",
            "A grudge festers",
            vec!["Alric".into()],
            Some("Rivermouth".into()),
            wt(),
        );
        world.story_threads.insert("t1".into(), thread);

        prune(&mut world, wt().advance_turns(sim_events::DAY_TURNS * 200));
        assert!(world.npcs.contains_key("npc_a"));
    }

    #[test]
    fn snapshot_round_trips_through_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = WorldStore::new(dir.path().join("world.json"));
        let world = World::seed_new("alpha", wt());
        snapshot(&world, &mut store).unwrap();
        let reloaded = store.load("fallback").unwrap().unwrap();
        assert_eq!(reloaded.seed, "alpha");
    }
}
