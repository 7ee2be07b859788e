//! Tick scheduler (`spec.md` §4.2).
//!
//! Drives world time forward one turn at a time and decides, for each turn,
//! which cadence boundaries (hour, day) also fire. Two callers use the same
//! [`Scheduler`]: the real-time loop in `main.rs` (one turn per
//! `Config::time_scale` real seconds) and the catch-up/batch runner in
//! `batch.rs` (as many turns as needed, back to back, no sleeping).

use sim_events::WorldTime;

/// Which cadence boundaries a turn advance crossed, in firing order.
/// A single call to [`Scheduler::advance_one_turn`] can cross at most one of
/// each kind, since a turn is the smallest unit of advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickBoundaries {
    pub turn: bool,
    pub hour: bool,
    pub day: bool,
}

impl TickBoundaries {
    fn for_time(t: WorldTime) -> Self {
        TickBoundaries {
            turn: true,
            hour: t.is_hour_boundary(),
            day: t.is_day_boundary(),
        }
    }
}

/// Advances world time one turn at a time and reports which subsystem
/// cadences should run. Holds no subsystem state itself — callers own the
/// `World` and run subsystems in response to the boundaries reported here.
pub struct Scheduler {
    current: WorldTime,
}

impl Scheduler {
    pub fn new(start: WorldTime) -> Self {
        Self { current: start }
    }

    pub fn current_world_time(&self) -> WorldTime {
        self.current
    }

    /// Advances by exactly one turn, returning the new time and which
    /// cadences fired at it.
    pub fn advance_one_turn(&mut self) -> (WorldTime, TickBoundaries) {
        self.current = self.current.advance_turns(1);
        (self.current, TickBoundaries::for_time(self.current))
    }

    /// How many whole turns lie between `self.current` and `target`.
    pub fn turns_until(&self, target: WorldTime) -> i64 {
        target.turns_since(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_events::{DAY_TURNS, HOUR_TURNS};

    #[test]
    fn every_advance_fires_turn() {
        let mut sched = Scheduler::new(WorldTime::parse("2024-01-01T00:00:00Z").unwrap());
        let (_, b) = sched.advance_one_turn();
        assert!(b.turn);
    }

    #[test]
    fn hour_boundary_fires_every_hour_turns() {
        let mut sched = Scheduler::new(WorldTime::parse("2024-01-01T00:00:00Z").unwrap());
        let mut hour_fires = 0;
        for _ in 0..HOUR_TURNS {
            let (_, b) = sched.advance_one_turn();
            if b.hour {
                hour_fires += 1;
            }
        }
        assert_eq!(hour_fires, 1);
    }

    #[test]
    fn day_boundary_fires_once_per_day_turns() {
        let mut sched = Scheduler::new(WorldTime::parse("2024-01-01T00:00:00Z").unwrap());
        let mut day_fires = 0;
        for _ in 0..DAY_TURNS {
            let (_, b) = sched.advance_one_turn();
            if b.day {
                day_fires += 1;
            }
        }
        assert_eq!(day_fires, 1);
    }

    #[test]
    fn turns_until_reflects_target_distance() {
        let sched = Scheduler::new(WorldTime::parse("2024-01-01T00:00:00Z").unwrap());
        let target = sched.current_world_time().advance_turns(42);
        assert_eq!(sched.turns_until(target), 42);
    }
}
