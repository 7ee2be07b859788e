//! The `chronicle` binary (`spec.md` §6): loads or seeds the world, catches
//! up any offline time, then runs the real-time tick loop until a SIGINT or
//! SIGTERM asks it to snapshot and exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sim_core::batch;
use sim_core::clock::Scheduler;
use sim_core::setup;
use sim_core::store::WorldStore;
use sim_core::subsystems::{day, hour, tick_complete, turn};
use sim_core::world::World;
use sim_core::{Config, EventLogSink, KernelError, WorldRng};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run().await {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            tracing::error!(error = %err, "chronicle exited");
            std::process::exit(err.exit_code());
        }
    }
}

async fn run() -> Result<(), KernelError> {
    let config = Config::from_env();
    let mut rng = WorldRng::from_seed(&config.seed);
    let mut store = WorldStore::new(config.world_path());
    let event_log = EventLogSink::new(config.event_log_path());
    let mut id_seq = 0u64;
    let mut next_id = move || {
        id_seq += 1;
        format!("cq_{id_seq:08}")
    };

    let mut world = match store.load(&config.seed)? {
        Some(mut world) => {
            if let Some(forced) = &config.force_seed {
                rng.reseed(forced);
                tracing::warn!(seed = %forced, "FORCE_SEED applied to existing world");
            }
            world
        }
        None => {
            let mut world = World::seed_new(&config.seed, config.start_world_time);
            let opening = setup::seed_world(&mut world, &mut rng, config.start_world_time);
            for entry in opening {
                tracing::info!(summary = %entry.summary, "chronicle");
            }
            world
        }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
            shutdown.store(true, Ordering::SeqCst);
        });
    }

    catch_up_if_behind(&mut world, &mut rng, &event_log, &mut store, &config, &mut next_id)?;

    if config.batch_days > 0 {
        let mut scheduler = Scheduler::new(world.last_tick_at);
        let logs = batch::run_days(
            &mut world,
            &mut rng,
            &mut scheduler,
            &event_log,
            &mut store,
            config.batch_days as i64,
            &mut next_id,
        )?;
        for entry in logs {
            tracing::info!(summary = %entry.summary, "chronicle");
        }
        return Ok(());
    }

    let mut scheduler = Scheduler::new(world.last_tick_at);
    while !shutdown.load(Ordering::SeqCst) {
        tokio::time::sleep(config.time_scale).await;
        let (now, boundaries) = scheduler.advance_one_turn();

        for entry in turn::tick(&mut world, &mut rng, now) {
            tracing::info!(summary = %entry.summary, "chronicle");
        }
        if boundaries.hour {
            for entry in hour::tick(&mut world, &mut rng, now, &event_log, &mut next_id)? {
                tracing::info!(summary = %entry.summary, "chronicle");
            }
        }
        if boundaries.day {
            for entry in day::tick(&mut world, &mut rng, now) {
                tracing::info!(summary = %entry.summary, "chronicle");
            }
        }
        tick_complete::prune(&mut world, now);
        world.last_tick_at = now;
        world.last_real_tick_at = now;
        tick_complete::snapshot(&world, &mut store)?;
    }

    tick_complete::snapshot(&world, &mut store)?;
    Ok(())
}

/// Runs a bounded catch-up batch if the persisted world is behind the
/// configured start time by more than one day, capped at
/// `max_catch_up_days` regardless of how far behind it actually is
/// (`spec.md` §8, "catch-up cap").
fn catch_up_if_behind(
    world: &mut World,
    rng: &mut WorldRng,
    event_log: &EventLogSink,
    store: &mut WorldStore,
    config: &Config,
    next_id: &mut impl FnMut() -> String,
) -> Result<(), KernelError> {
    if !config.catch_up_enabled {
        return Ok(());
    }
    let behind_days = (config.start_world_time.turns_since(world.last_tick_at)) / sim_events::DAY_TURNS;
    if behind_days <= 0 {
        return Ok(());
    }
    let days = behind_days.min(config.max_catch_up_days);
    let mut scheduler = Scheduler::new(world.last_tick_at);
    batch::run_days(world, rng, &mut scheduler, event_log, store, days, next_id)?;
    Ok(())
}
