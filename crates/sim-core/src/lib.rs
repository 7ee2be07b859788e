//! The chronicle simulator's kernel: a deterministic, seed-driven world
//! that advances in fixed turns, persists as a single JSON document, and
//! emits an append-only narrative log (`spec.md` §1-§7).

pub mod agency;
pub mod batch;
pub mod clock;
pub mod config;
pub mod consequences;
pub mod error;
pub mod event_log;
pub mod rng;
pub mod setup;
pub mod store;
pub mod subsystems;
pub mod world;

pub use clock::Scheduler;
pub use config::Config;
pub use error::KernelError;
pub use event_log::EventLogSink;
pub use rng::WorldRng;
pub use store::WorldStore;
pub use world::World;
