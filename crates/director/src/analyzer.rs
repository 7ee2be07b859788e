//! Consequence Analyzer (`spec.md` §4.10).
//!
//! Keyword-weighted over a log entry's summary/details; explicitly
//! probabilistic and seeded via the shared rng, same contract as the
//! Story Classifier it sits beside.

use rand::Rng;
use sim_events::{Consequence, ConsequenceKind, LogEntry};

struct SettlementRule {
    keywords: &'static [&'static str],
    mood_delta: i32,
    weight: f64,
}

fn settlement_rules() -> &'static [SettlementRule] {
    &[
        SettlementRule { keywords: &["battle", "siege", "raid"], mood_delta: -2, weight: 0.8 },
        SettlementRule { keywords: &["wedding", "marries", "festival"], mood_delta: 2, weight: 0.8 },
        SettlementRule { keywords: &["scandal", "disgrace"], mood_delta: -1, weight: 0.6 },
        SettlementRule { keywords: &["plague", "famine"], mood_delta: -3, weight: 0.9 },
    ]
}

struct RelationshipRule {
    keywords: &'static [&'static str],
    delta: f32,
}

fn relationship_rules() -> &'static [RelationshipRule] {
    &[
        RelationshipRule { keywords: &["betray", "traitor"], delta: -0.6 },
        RelationshipRule { keywords: &["rescue", "saved"], delta: 0.6 },
        RelationshipRule { keywords: &["courtship", "romance"], delta: 0.4 },
    ]
}

/// Given a log entry, chooses zero or more consequences to enqueue
/// (`spec.md` §4.10). `settlement_id` is the id of the settlement named in
/// `entry.location`, if any is known to the caller.
pub fn analyze_consequences(
    entry: &LogEntry,
    settlement_id: Option<&str>,
    rng: &mut impl Rng,
    next_id: &mut impl FnMut() -> String,
) -> Vec<Consequence> {
    let haystack = format!("{} {}", entry.summary, entry.details).to_lowercase();
    let mut out = Vec::new();

    if let Some(settlement_id) = settlement_id {
        if let Some(rule) = settlement_rules().iter().find(|r| r.keywords.iter().any(|kw| haystack.contains(kw))) {
            if rng.gen_bool(rule.weight) {
                out.push(Consequence::new(
                    next_id(),
                    4,
                    0,
                    entry.summary.clone(),
                    ConsequenceKind::SettlementChange {
                        settlement_id: settlement_id.to_string(),
                        mood_delta: rule.mood_delta,
                    },
                ));
            }
        }
    }

    if entry.actors.len() >= 2 {
        if let Some(rule) = relationship_rules().iter().find(|r| r.keywords.iter().any(|kw| haystack.contains(kw))) {
            out.push(Consequence::new(
                next_id(),
                3,
                0,
                entry.summary.clone(),
                ConsequenceKind::RelationshipShift {
                    from_id: entry.actors[0].clone(),
                    to_id: entry.actors[1].clone(),
                    delta: rule.delta,
                },
            ));
        }
    }

    if haystack.contains("hunter") || haystack.contains("pursuit") {
        let delay_turns = 12 + rng.gen_range(0..=24);
        out.push(Consequence::new(
            next_id(),
            5,
            delay_turns,
            entry.summary.clone(),
            ConsequenceKind::SpawnEvent { event_hint: "hunter-arrives".to_string() },
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use sim_events::fixtures::town_log;

    #[test]
    fn battle_near_settlement_lowers_mood_with_high_probability() {
        let entry = town_log("A fierce battle rages near the walls", "Rivermouth", &[]);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut n = 0u64;
        let consequences = analyze_consequences(&entry, Some("s1"), &mut rng, &mut (|| { n += 1; format!("c{n}") }));
        assert!(consequences.iter().any(|c| matches!(
            c.kind,
            ConsequenceKind::SettlementChange { ref settlement_id, mood_delta } if settlement_id == "s1" && mood_delta < 0
        )));
    }

    #[test]
    fn betrayal_between_two_actors_shifts_relationship() {
        let entry = town_log("Corin feels betrayed by Mira", "Oakford", &["Corin", "Mira"]);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut n = 0u64;
        let consequences = analyze_consequences(&entry, None, &mut rng, &mut (|| { n += 1; format!("c{n}") }));
        assert!(consequences.iter().any(|c| matches!(
            c.kind,
            ConsequenceKind::RelationshipShift { ref from_id, ref to_id, delta } if from_id == "Corin" && to_id == "Mira" && delta < 0.0
        )));
    }

    #[test]
    fn no_keywords_produces_no_consequences() {
        let entry = town_log("The market opens as usual", "Rivermouth", &[]);
        let mut rng = SmallRng::seed_from_u64(3);
        let mut n = 0u64;
        let consequences = analyze_consequences(&entry, Some("s1"), &mut rng, &mut (|| { n += 1; format!("c{n}") }));
        assert!(consequences.is_empty());
    }
}
