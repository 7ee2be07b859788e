//! Environment-driven configuration (`spec.md` §6, "Configuration").
//!
//! No config files, no CLI flags — every knob is an env var with a sane
//! default, read once at startup. This mirrors the teacher crate's own
//! `Config::from_env` idiom, just with the new variable names.

use sim_events::WorldTime;
use std::time::Duration;

/// Default world-seconds per real-time turn tick when `SIM_TIME_SCALE` is
/// unset. One turn (10 world-minutes) every 2 real seconds.
const DEFAULT_TIME_SCALE: f64 = 2.0;

const DEFAULT_BATCH_DAYS: u32 = 0;
const DEFAULT_CATCH_UP_SPEED: f64 = 0.05;
const MAX_CATCH_UP_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct Config {
    /// `SIM_SEED` — the textual seed for [`crate::rng::WorldRng`]. Defaults
    /// to a fixed string so a bare `cargo run` is still deterministic.
    pub seed: String,

    /// `FORCE_SEED` — if set, overrides `seed` for an existing world at
    /// load time and is logged as a `system` entry (`spec.md` §4.3).
    pub force_seed: Option<String>,

    /// `SIM_START_WORLD_TIME` — the world time a brand-new world begins at.
    pub start_world_time: WorldTime,

    /// `SIM_TIME_SCALE` — real seconds per world turn in the real-time loop.
    pub time_scale: Duration,

    /// `SIM_LOG_DIR` — directory for `world.json` and the JSONL event log.
    pub log_dir: String,

    /// `SIM_CATCH_UP` — whether to run a catch-up batch on load when the
    /// persisted world is behind wall-clock time.
    pub catch_up_enabled: bool,

    /// `SIM_CATCH_UP_SPEED` — real seconds per world turn while catching up
    /// (normally much smaller than `time_scale`).
    pub catch_up_speed: Duration,

    /// `SIM_BATCH_DAYS` — when greater than zero, batch mode: simulate
    /// exactly this many world-days with no wall-clock gating, snapshot
    /// once, and exit (`spec.md` §6, §11, scenario A). Zero (the default)
    /// means "no batch mode" — run catch-up, if any, then the real-time
    /// loop.
    pub batch_days: u32,

    /// Hard ceiling on catch-up distance regardless of `SIM_CATCH_UP`,
    /// per `spec.md` §8 ("catch-up cap").
    pub max_catch_up_days: i64,
}

impl Config {
    pub fn from_env() -> Self {
        let seed = env_string("SIM_SEED", "chronicle-default-seed");
        let force_seed = std::env::var("FORCE_SEED").ok().filter(|s| !s.is_empty());
        let start_world_time = std::env::var("SIM_START_WORLD_TIME")
            .ok()
            .and_then(|s| WorldTime::parse(&s).ok())
            .unwrap_or_else(|| WorldTime::parse("2024-01-01T00:00:00Z").unwrap());
        let time_scale = Duration::from_secs_f64(env_f64("SIM_TIME_SCALE", DEFAULT_TIME_SCALE));
        let log_dir = env_string("SIM_LOG_DIR", "./world-data");
        let catch_up_enabled = env_bool("SIM_CATCH_UP", true);
        let catch_up_speed =
            Duration::from_secs_f64(env_f64("SIM_CATCH_UP_SPEED", DEFAULT_CATCH_UP_SPEED));
        let batch_days = env_u32("SIM_BATCH_DAYS", DEFAULT_BATCH_DAYS);

        Config {
            seed,
            force_seed,
            start_world_time,
            time_scale,
            log_dir,
            catch_up_enabled,
            catch_up_speed,
            batch_days,
            max_catch_up_days: MAX_CATCH_UP_DAYS,
        }
    }

    pub fn world_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.log_dir).join("world.json")
    }

    pub fn event_log_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.log_dir).join("events.jsonl")
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"),
        Err(_) => default,
    }
}
