//! Batch runner (`spec.md` §4.2, §5): drives the exact same tick sequence
//! as the real-time loop, but back to back with no wall-clock gating.
//! Used both for catch-up after a long-offline load and for pure
//! batch-mode runs (`SIM_BATCH_DAYS`, no `main.rs` sleep loop at all).

use sim_events::{LogEntry, WorldTime};

use crate::clock::Scheduler;
use crate::error::KernelError;
use crate::event_log::EventLogSink;
use crate::rng::WorldRng;
use crate::store::WorldStore;
use crate::subsystems::{day, hour, tick_complete, turn};
use crate::world::World;

/// Runs exactly `days` world-days of ticks, turn by turn, dispatching the
/// hour/day cadences as the scheduler reports them. Snapshots once at the
/// end via `store`, not every turn, since a batch run owns the world for
/// its whole duration and a mid-batch crash simply re-runs the batch.
pub fn run_days(
    world: &mut World,
    rng: &mut WorldRng,
    scheduler: &mut Scheduler,
    event_log: &EventLogSink,
    store: &mut WorldStore,
    days: i64,
    next_id: &mut impl FnMut() -> String,
) -> Result<Vec<LogEntry>, KernelError> {
    let mut logs = Vec::new();
    let total_turns = days * sim_events::DAY_TURNS;

    for _ in 0..total_turns {
        let (now, boundaries) = scheduler.advance_one_turn();

        logs.extend(turn::tick(world, rng, now));

        if boundaries.hour {
            logs.extend(hour::tick(world, rng, now, event_log, next_id)?);
        }
        if boundaries.day {
            logs.extend(day::tick(world, rng, now));
        }

        tick_complete::prune(world, now);
        world.last_tick_at = now;
    }

    tick_complete::snapshot(world, store)?;
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wt() -> WorldTime {
        WorldTime::parse("2024-01-01T00:00:00Z").unwrap()
    }

    #[test]
    fn batch_run_is_deterministic_for_a_fixed_seed() {
        let run = || {
            let start = wt();
            let mut world = World::seed_new("alpha", start);
            crate::setup::seed_world(&mut world, &mut WorldRng::from_seed("alpha"), start);
            let mut rng = WorldRng::from_seed("alpha-run");
            let mut scheduler = Scheduler::new(start);
            let dir = tempfile::tempdir().unwrap();
            let event_log = EventLogSink::new(dir.path().join("events.jsonl"));
            let mut store = WorldStore::new(dir.path().join("world.json"));
            let mut n = 0u64;
            let logs = run_days(&mut world, &mut rng, &mut scheduler, &event_log, &mut store, 2, &mut (|| {
                n += 1;
                format!("c{n}")
            }))
            .unwrap();
            (world.npcs.len(), logs.len())
        };

        let a = run();
        let b = run();
        assert_eq!(a, b);
    }
}
