//! Story Thread Engine (`spec.md` §4.8).
//!
//! Advances every unresolved thread once an hour with small probability:
//! computes a contextual beat, bumps tension, and resolves threads that
//! reach maximum tension (or roll resolution while in climax). This is a
//! direct generalization of the teacher's `ThreadTracker`/`NarrativeThread`
//! tension-to-thread pipeline onto the closed `StoryThread` state machine.

use rand::Rng;
use sim_events::{Consequence, ConsequenceKind, StoryFamily, StoryPhase, StoryThread, WorldTime};
use std::collections::HashMap;

/// Probability a given thread advances on any one hour tick.
const BEAT_CHANCE: f64 = 0.15;
/// Probability a climaxing thread resolves on a tick it doesn't hit max
/// tension outright.
const CLIMAX_RESOLVE_CHANCE: f64 = 0.2;

fn progression_template(family: StoryFamily) -> &'static str {
    match family {
        StoryFamily::Conflict => "{hunter} presses the conflict with {target} further",
        StoryFamily::Discovery => "{hunter} uncovers another piece of the mystery",
        StoryFamily::Social => "{hunter}'s standing with {target} shifts once more",
        StoryFamily::Survival => "the hardship bearing down on {hunter} worsens",
        StoryFamily::Intrigue => "{hunter} moves a step closer to the plot's completion",
        StoryFamily::Supernatural => "the omens around {hunter} grow harder to ignore",
    }
}

fn fill_beat(template: &str, thread: &StoryThread) -> String {
    let hunter = thread.actors.first().cloned().unwrap_or_else(|| "someone".to_string());
    let target = thread.actors.get(1).cloned().unwrap_or_else(|| "another".to_string());
    let mut text = template.replace("{hunter}", &hunter).replace("{target}", &target);
    if let Some(theme) = thread.context.themes.first() {
        text.push_str(&format!(", driven by {theme}"));
    }
    text
}

/// Advances all unresolved threads for one hour tick. Returns the
/// `settlement-change` consequences enqueued by any thread that resolved
/// this tick; the caller (the consequence queue owner) is responsible for
/// inserting them.
pub fn advance_story_threads(
    threads: &mut HashMap<String, StoryThread>,
    rng: &mut impl Rng,
    now: WorldTime,
    next_consequence_id: &mut impl FnMut() -> String,
) -> Vec<Consequence> {
    let mut spawned_consequences = Vec::new();

    for thread in threads.values_mut() {
        if thread.resolved {
            continue;
        }
        if !rng.gen_bool(BEAT_CHANCE) {
            continue;
        }

        let template = progression_template(thread.story_type.family());
        let beat_text = fill_beat(template, thread);
        thread.add_beat(now, beat_text, 1);

        let should_resolve = thread.tension >= 10
            || (thread.phase == StoryPhase::Climax && rng.gen_bool(CLIMAX_RESOLVE_CHANCE));

        if should_resolve {
            if let Some(consequence) = resolve_thread(thread, now, rng, next_consequence_id) {
                spawned_consequences.push(consequence);
            }
        }
    }

    spawned_consequences
}

fn resolve_thread(
    thread: &mut StoryThread,
    now: WorldTime,
    rng: &mut impl Rng,
    next_consequence_id: &mut impl FnMut() -> String,
) -> Option<Consequence> {
    if thread.potential_outcomes.is_empty() {
        thread.resolve(now, "the matter settles itself, quietly");
        return None;
    }
    let idx = rng.gen_range(0..thread.potential_outcomes.len());
    let outcome = thread.potential_outcomes[idx].clone_ish();
    thread.resolve(now, outcome.description.clone());

    let settlement_id = thread.context.key_locations.first().cloned()?;
    let mood_delta = (outcome.sentiment * 5.0).round() as i32;

    Some(Consequence::new(
        next_consequence_id(),
        5,
        6,
        thread.id.clone(),
        ConsequenceKind::SettlementChange { settlement_id, mood_delta },
    ))
}

trait CloneIsh {
    fn clone_ish(&self) -> Self;
}

impl CloneIsh for sim_events::PotentialOutcome {
    fn clone_ish(&self) -> Self {
        sim_events::PotentialOutcome { description: self.description.clone(), sentiment: self.sentiment }
    }
}

/// `spec.md` §4.12: resolved threads are retired 30 world-days after
/// resolution.
pub fn prune_resolved_threads(threads: &mut HashMap<String, StoryThread>, now: WorldTime) {
    const THIRTY_DAYS_TURNS: i64 = sim_events::DAY_TURNS * 30;
    threads.retain(|_, t| {
        if !t.resolved {
            return true;
        }
        now.turns_since(t.last_updated) < THIRTY_DAYS_TURNS
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use sim_events::{PotentialOutcome, StoryType};

    fn t(s: &str) -> WorldTime {
        WorldTime::parse(s).unwrap()
    }

    fn sample_thread() -> StoryThread {
        let mut thread = StoryThread::new(
            "t1",
            StoryType::Feud,
            "The Marsh Feud",
            "Two houses quarrel",
            vec!["Alric".into(), "Beda".into()],
            Some("Rivermouth".into()),
            t("2024-01-01T00:00:00Z"),
        );
        thread.context.key_locations = vec!["s1".into()];
        thread.potential_outcomes = vec![
            PotentialOutcome { description: "the feud ends in bloodshed".into(), sentiment: -0.8 },
        ];
        thread
    }

    #[test]
    fn advances_with_enough_attempts() {
        let mut threads = HashMap::new();
        let thread = sample_thread();
        threads.insert(thread.id.clone(), thread);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut counter = 0u64;
        let mut next_id = move || { counter += 1; format!("c{counter}") };

        let mut total_beats = 0;
        for hour in 0..200 {
            let now = t("2024-01-01T00:00:00Z").advance_turns(hour * sim_events::HOUR_TURNS);
            advance_story_threads(&mut threads, &mut rng, now, &mut next_id);
            total_beats = threads["t1"].beats.len();
        }
        assert!(total_beats > 0);
    }

    #[test]
    fn resolving_thread_enqueues_settlement_change() {
        let mut threads = HashMap::new();
        let mut thread = sample_thread();
        thread.tension = 9;
        thread.phase = StoryPhase::Climax;
        threads.insert(thread.id.clone(), thread);

        let mut rng = SmallRng::seed_from_u64(42);
        let mut counter = 0u64;
        let mut next_id = move || { counter += 1; format!("c{counter}") };

        let mut resolved_consequence = None;
        for hour in 0..500 {
            let now = t("2024-01-01T00:00:00Z").advance_turns(hour * sim_events::HOUR_TURNS);
            let mut produced = advance_story_threads(&mut threads, &mut rng, now, &mut next_id);
            if !produced.is_empty() {
                resolved_consequence = produced.pop();
                break;
            }
        }
        assert!(resolved_consequence.is_some());
        assert!(threads["t1"].resolved);
    }

    #[test]
    fn prune_removes_old_resolved_threads_only() {
        let mut threads = HashMap::new();
        let mut old = sample_thread();
        old.resolve(t("2024-01-01T00:00:00Z"), "done");
        threads.insert("old".to_string(), old);

        let mut recent = sample_thread();
        recent.id = "recent".to_string();
        recent.resolve(t("2024-02-01T00:00:00Z"), "done");
        threads.insert("recent".to_string(), recent);

        prune_resolved_threads(&mut threads, t("2024-03-01T00:00:00Z"));
        assert!(!threads.contains_key("old"));
        assert!(threads.contains_key("recent"));
    }
}
