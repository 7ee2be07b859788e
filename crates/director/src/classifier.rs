//! Story Classifier (`spec.md` §4.11).
//!
//! Maps a log entry's keywords onto one of the closed `StoryType` variants,
//! merges into an existing thread when one with overlapping actors already
//! covers the same ground, and otherwise spawns a new thread from a
//! template keyed on the chosen type.

use rand::Rng;
use sim_events::{LogEntry, StoryContext, StoryThread, StoryType, WorldTime};
use std::collections::HashMap;

const DEFAULT_THREAD_CAP: usize = 8;

pub struct Classifier {
    pub thread_cap: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self { thread_cap: DEFAULT_THREAD_CAP }
    }
}

/// One keyword-weighted rule: if any keyword appears (case-insensitively)
/// in the entry's summary or details, the entry maps to `story_type`.
struct Rule {
    keywords: &'static [&'static str],
    story_type: StoryType,
}

fn rules() -> &'static [Rule] {
    use StoryType::*;
    &[
        Rule { keywords: &["theft", "stolen", "robbed"], story_type: Heist },
        Rule { keywords: &["conspiracy", "plot", "scheme"], story_type: Conspiracy },
        Rule { keywords: &["betray", "traitor", "defect"], story_type: Defection },
        Rule { keywords: &["blackmail", "extort"], story_type: Blackmail },
        Rule { keywords: &["coup", "overthrow"], story_type: Coup },
        Rule { keywords: &["forge", "forgery", "counterfeit"], story_type: Forgery },
        Rule { keywords: &["secret pact", "secret alliance"], story_type: SecretAlliance },
        Rule { keywords: &["raid", "ambush"], story_type: ArmedRaid },
        Rule { keywords: &["siege", "besieg"], story_type: Siege },
        Rule { keywords: &["rebel", "uprising", "revolt"], story_type: Rebellion },
        Rule { keywords: &["vendetta", "blood feud"], story_type: Vendetta },
        Rule { keywords: &["border dispute", "border clash"], story_type: Border },
        Rule { keywords: &["succession war", "war of succession"], story_type: WarOfSuccession },
        Rule { keywords: &["duel", "challenge"], story_type: Duel },
        Rule { keywords: &["feud", "rivalry"], story_type: Feud },
        Rule { keywords: &["ruin", "excavat"], story_type: LostRuins },
        Rule { keywords: &["relic", "artifact"], story_type: AncientArtifact },
        Rule { keywords: &["uncharted dungeon", "unexplored depths"], story_type: UnchartedDungeon },
        Rule { keywords: &["lore", "forgotten tome"], story_type: ForgottenLore },
        Rule { keywords: &["nexus awaken", "ley line"], story_type: NexusAwakening },
        Rule { keywords: &["monster nest", "lair discovered"], story_type: MonsterNest },
        Rule { keywords: &["buried treasure", "hoard found"], story_type: BuriedTreasure },
        Rule { keywords: &["prophecy", "foretold"], story_type: Prophecy },
        Rule { keywords: &["wedding", "marries", "marriage"], story_type: Marriage },
        Rule { keywords: &["scandal", "disgrace"], story_type: Scandal },
        Rule { keywords: &["succession", "heir", "inherit"], story_type: Inheritance },
        Rule { keywords: &["guild rivalry"], story_type: GuildRivalry },
        Rule { keywords: &["patron", "sponsorship"], story_type: Patronage },
        Rule { keywords: &["exile", "banish"], story_type: Exile },
        Rule { keywords: &["reconcile", "reconciliation"], story_type: Reconciliation },
        Rule { keywords: &["courtship", "romance", "suitor"], story_type: Courtship },
        Rule { keywords: &["famine", "starv"], story_type: Famine },
        Rule { keywords: &["plague", "pestilence"], story_type: Plague },
        Rule { keywords: &["migrat"], story_type: Migration },
        Rule { keywords: &["harsh winter", "bitter cold"], story_type: HarshWinter },
        Rule { keywords: &["bandit"], story_type: BanditMenace },
        Rule { keywords: &["shipwreck", "castaway"], story_type: ShipwreckSurvivors },
        Rule { keywords: &["spy", "espionage", "infiltrat"], story_type: Espionage },
        Rule { keywords: &["haunt", "ghost", "specter"], story_type: Haunting },
        Rule { keywords: &["curse", "cursed"], story_type: Curse },
        Rule { keywords: &["demonic pact", "pact with"], story_type: DemonicPact },
        Rule { keywords: &["omen", "portent"], story_type: DivineOmen },
        Rule { keywords: &["possess"], story_type: Possession },
        Rule { keywords: &["ritual gone wrong", "botched ritual"], story_type: RitualGoneWrong },
        Rule { keywords: &["awakening", "stirs to life"], story_type: Awakening },
    ]
}

fn title_templates() -> HashMap<StoryType, &'static str> {
    use StoryType::*;
    HashMap::from([
        (Heist, "The {hunter} Theft of {location}"),
        (Conspiracy, "The {hunter} Conspiracy"),
        (Defection, "The Betrayal of {hunter}"),
        (Blackmail, "The {location} Blackmail"),
        (Coup, "The {location} Coup"),
        (Forgery, "The {hunter} Forgery"),
        (SecretAlliance, "The {hunter} Pact"),
        (ArmedRaid, "The Raid on {location}"),
        (Siege, "The Siege of {location}"),
        (Rebellion, "The {location} Uprising"),
        (Vendetta, "The {hunter} Vendetta"),
        (Border, "The {location} Border Dispute"),
        (WarOfSuccession, "The {location} War of Succession"),
        (Duel, "The Duel of {hunter} and {target}"),
        (Feud, "The {hunter} Feud"),
        (LostRuins, "The Lost Ruins of {location}"),
        (AncientArtifact, "The Hunt for the {location} Relic"),
        (UnchartedDungeon, "The Uncharted Depths of {location}"),
        (ForgottenLore, "The Forgotten Lore of {location}"),
        (NexusAwakening, "The Awakening at {location}"),
        (MonsterNest, "The Nest Beneath {location}"),
        (BuriedTreasure, "The Buried Treasure of {location}"),
        (Prophecy, "The {hunter} Prophecy"),
        (Marriage, "The Wedding of {hunter}"),
        (Scandal, "The {location} Scandal"),
        (Inheritance, "The {location} Succession"),
        (GuildRivalry, "The {location} Guild Rivalry"),
        (Patronage, "The Patronage of {hunter}"),
        (Exile, "The Exile of {hunter}"),
        (Reconciliation, "The Reconciliation of {hunter} and {target}"),
        (Courtship, "The Courtship of {hunter}"),
        (Famine, "The {location} Famine"),
        (Plague, "The {location} Plague"),
        (Migration, "The {location} Migration"),
        (HarshWinter, "The Harsh Winter of {location}"),
        (BanditMenace, "The Bandits of {location}"),
        (ShipwreckSurvivors, "The Wreck off {location}"),
        (Espionage, "The {hunter} Affair"),
        (Haunting, "The Haunting of {location}"),
        (Curse, "The Curse of {hunter}"),
        (DemonicPact, "The {hunter} Pact"),
        (DivineOmen, "The {location} Omen"),
        (Possession, "The Possession of {hunter}"),
        (RitualGoneWrong, "The {hunter} Ritual"),
        (Awakening, "The Awakening of {location}"),
    ])
}

fn themes_for(story_type: StoryType) -> Vec<String> {
    use sim_events::StoryFamily::*;
    let family = story_type.family();
    match family {
        Conflict => vec!["power".into(), "violence".into()],
        Discovery => vec!["curiosity".into(), "greed".into()],
        Social => vec!["loyalty".into(), "status".into()],
        Survival => vec!["scarcity".into(), "desperation".into()],
        Intrigue => vec!["secrecy".into(), "ambition".into()],
        Supernatural => vec!["fate".into(), "dread".into()],
    }
}

impl Classifier {
    pub fn classify(&self, entry: &LogEntry) -> Option<StoryType> {
        let haystack = format!("{} {}", entry.summary, entry.details).to_lowercase();
        rules()
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| haystack.contains(kw)))
            .map(|rule| rule.story_type)
    }

    /// Returns a newly-spawned thread, or `None` if the entry doesn't
    /// classify, the cap is reached, or it was merged into an existing
    /// thread as a beat instead (`existing` is mutated in that case).
    pub fn classify_and_spawn(
        &self,
        entry: &LogEntry,
        existing: &mut HashMap<String, StoryThread>,
        rng: &mut impl Rng,
        next_id: impl FnOnce() -> String,
    ) -> Option<StoryThread> {
        let story_type = self.classify(entry)?;

        if let Some(similar) = existing
            .values_mut()
            .find(|t| !t.resolved && t.story_type == story_type && shares_actor(t, entry))
        {
            similar.add_beat(entry.world_time, format!("Further developments: {}", entry.summary), 1);
            return None;
        }

        if existing.values().filter(|t| !t.resolved).count() >= self.thread_cap {
            return None;
        }

        let id = next_id();
        let title = render_title(story_type, entry);
        let summary = entry.summary.clone();
        let thread = StoryThread::new(
            id,
            story_type,
            title,
            summary,
            entry.actors.clone(),
            entry.location.clone(),
            entry.world_time,
        );
        let mut thread = thread;
        thread.context = StoryContext {
            themes: themes_for(story_type),
            motivations: default_motivations(&thread),
            relationships: Vec::new(),
            key_locations: entry.location.clone().into_iter().collect(),
        };
        thread.potential_outcomes = default_outcomes(story_type, rng);
        Some(thread)
    }
}

fn shares_actor(thread: &StoryThread, entry: &LogEntry) -> bool {
    entry.actors.iter().any(|a| thread.involves_actor(a))
}

fn render_title(story_type: StoryType, entry: &LogEntry) -> String {
    let templates = title_templates();
    let template = templates.get(&story_type).copied().unwrap_or("The {location} Tale");
    let hunter = entry.actors.first().cloned().unwrap_or_else(|| "Unknown".to_string());
    let target = entry.actors.get(1).cloned().unwrap_or_else(|| "Unknown".to_string());
    let location = entry.location.clone().unwrap_or_else(|| "the Marches".to_string());

    let filled = template
        .replace("{hunter}", &hunter)
        .replace("{target}", &target)
        .replace("{location}", &location);

    collapse_the_the(&filled)
}

/// "The The X" → "The X", per `spec.md` §4.11's explicit title-collapse
/// rule when a substituted name already begins with "The".
fn collapse_the_the(title: &str) -> String {
    if let Some(rest) = title.strip_prefix("The The ") {
        format!("The {rest}")
    } else {
        title.to_string()
    }
}

fn default_motivations(thread: &StoryThread) -> std::collections::HashMap<String, String> {
    let pool = ["survival", "honor", "wealth", "love", "fear", "revenge"];
    thread
        .actors
        .iter()
        .enumerate()
        .map(|(i, actor)| (actor.clone(), pool[i % pool.len()].to_string()))
        .collect()
}

fn default_outcomes(story_type: StoryType, rng: &mut impl Rng) -> Vec<sim_events::PotentialOutcome> {
    use sim_events::PotentialOutcome;
    let base = match story_type.family() {
        sim_events::StoryFamily::Conflict => vec![
            ("one side is crushed", -0.6),
            ("an uneasy truce holds", 0.0),
            ("the underdog triumphs", 0.4),
        ],
        sim_events::StoryFamily::Discovery => vec![
            ("the find is lost again", -0.3),
            ("the discovery brings modest reward", 0.3),
            ("the discovery reshapes the region", 0.7),
        ],
        sim_events::StoryFamily::Social => vec![
            ("the bond is broken", -0.5),
            ("things return to normal", 0.0),
            ("the bond deepens", 0.5),
        ],
        sim_events::StoryFamily::Survival => vec![
            ("many perish", -0.8),
            ("the community endures, scarred", -0.1),
            ("relief arrives in time", 0.4),
        ],
        sim_events::StoryFamily::Intrigue => vec![
            ("the plot succeeds unseen", -0.4),
            ("the plot is exposed", 0.2),
            ("the plotter is ruined", 0.5),
        ],
        sim_events::StoryFamily::Supernatural => vec![
            ("the dread spreads", -0.6),
            ("the omen fades, unresolved", 0.0),
            ("the mystery is laid to rest", 0.5),
        ],
    };
    let _ = rng.gen::<f32>();
    base.into_iter()
        .map(|(desc, sentiment)| PotentialOutcome { description: desc.to_string(), sentiment })
        .collect()
}
