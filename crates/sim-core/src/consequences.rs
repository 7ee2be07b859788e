//! The consequence queue (`spec.md` §4.5): owns the world's pending
//! deferred effects, advances their countdowns, and drains due ones in
//! priority-then-FIFO order with a bounded-fairness cap per hour tick.

use sim_events::{higher_priority_first, Consequence};

/// Number of due consequences resolved per hour tick at most, so a burst of
/// triggers in one hour can't starve every other subsystem's turn budget
/// (`spec.md` §4.5, "bounded fairness").
pub const MAX_RESOLUTIONS_PER_HOUR: usize = 32;

/// Advances every consequence's countdown by the elapsed turns, then drains
/// up to [`MAX_RESOLUTIONS_PER_HOUR`] due ones in priority-then-FIFO order,
/// returning them for the caller to apply. Consequences left over (beyond
/// the cap) remain queued and are retried on the next hour tick.
pub fn advance_and_drain(queue: &mut Vec<Consequence>, turns_elapsed: i64) -> Vec<Consequence> {
    for c in queue.iter_mut() {
        c.advance(turns_elapsed);
    }

    let mut due_indices: Vec<usize> = queue
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_due())
        .map(|(i, _)| i)
        .collect();
    due_indices.sort_by(|&a, &b| higher_priority_first(&queue[a], &queue[b]));
    due_indices.truncate(MAX_RESOLUTIONS_PER_HOUR);

    let mut taken: Vec<usize> = due_indices;
    taken.sort_unstable();
    taken.reverse();

    let mut drained = Vec::with_capacity(taken.len());
    for idx in taken {
        drained.push(queue.remove(idx));
    }
    drained.reverse();
    drained
}

#[cfg(test)]
mod tests {
    use super::*;
    use sim_events::ConsequenceKind;

    fn generic(id: &str, priority: u8, turns: i64) -> Consequence {
        Consequence::new(id, priority, turns, "test", ConsequenceKind::Generic {
            label: "t".into(),
            data: serde_json::Value::Null,
        })
    }

    #[test]
    fn drains_only_due_consequences_in_priority_order() {
        let mut queue = vec![generic("a", 2, 0), generic("b", 9, 0), generic("c", 5, 5)];
        let drained = advance_and_drain(&mut queue, 1);
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].id, "b");
        assert_eq!(drained[1].id, "a");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].id, "c");
        assert_eq!(queue[0].turns_until_resolution, 4);
    }

    #[test]
    fn caps_resolutions_per_hour_and_retains_overflow() {
        let mut queue: Vec<Consequence> = (0..40).map(|i| generic(&format!("c{i}"), 5, 0)).collect();
        let drained = advance_and_drain(&mut queue, 0);
        assert_eq!(drained.len(), MAX_RESOLUTIONS_PER_HOUR);
        assert_eq!(queue.len(), 40 - MAX_RESOLUTIONS_PER_HOUR);
    }

    #[test]
    fn preserves_fifo_among_equal_priority() {
        let mut queue = vec![generic("first", 5, 0), generic("second", 5, 0)];
        let drained = advance_and_drain(&mut queue, 0);
        assert_eq!(drained[0].id, "first");
        assert_eq!(drained[1].id, "second");
    }
}
