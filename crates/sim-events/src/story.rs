//! Story threads: ongoing narratives inferred from the log stream
//! (`spec.md` §3, §4.8, §4.11).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::WorldTime;

/// Family grouping for [`StoryType`], used by the classifier to pick
/// thematically appropriate context (`spec.md` §4.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryFamily {
    Conflict,
    Discovery,
    Social,
    Survival,
    Intrigue,
    Supernatural,
}

/// Closed enum of narrative thread types, ~45 kinds across six families
/// (`spec.md` §3). Each variant belongs to exactly one family, reported by
/// [`StoryType::family`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryType {
    // conflict
    Feud,
    Siege,
    Rebellion,
    Vendetta,
    Border,
    ArmedRaid,
    Duel,
    WarOfSuccession,
    // discovery
    LostRuins,
    AncientArtifact,
    UnchartedDungeon,
    ForgottenLore,
    NexusAwakening,
    MonsterNest,
    BuriedTreasure,
    // social
    Courtship,
    Marriage,
    Scandal,
    Inheritance,
    GuildRivalry,
    Patronage,
    Exile,
    Reconciliation,
    // survival
    Famine,
    Plague,
    Migration,
    HarshWinter,
    BanditMenace,
    ShipwreckSurvivors,
    // intrigue
    Conspiracy,
    Heist,
    Espionage,
    Blackmail,
    Defection,
    Coup,
    SecretAlliance,
    Forgery,
    // supernatural
    Curse,
    Haunting,
    Prophecy,
    DemonicPact,
    DivineOmen,
    Possession,
    RitualGoneWrong,
    Awakening,
}

impl StoryType {
    pub fn family(self) -> StoryFamily {
        use StoryType::*;
        match self {
            Feud | Siege | Rebellion | Vendetta | Border | ArmedRaid | Duel | WarOfSuccession => {
                StoryFamily::Conflict
            }
            LostRuins | AncientArtifact | UnchartedDungeon | ForgottenLore | NexusAwakening
            | MonsterNest | BuriedTreasure => StoryFamily::Discovery,
            Courtship | Marriage | Scandal | Inheritance | GuildRivalry | Patronage | Exile
            | Reconciliation => StoryFamily::Social,
            Famine | Plague | Migration | HarshWinter | BanditMenace | ShipwreckSurvivors => {
                StoryFamily::Survival
            }
            Conspiracy | Heist | Espionage | Blackmail | Defection | Coup | SecretAlliance
            | Forgery => StoryFamily::Intrigue,
            Curse | Haunting | Prophecy | DemonicPact | DivineOmen | Possession
            | RitualGoneWrong | Awakening => StoryFamily::Supernatural,
        }
    }
}

/// Phase of a story thread's lifecycle (`spec.md` §3, §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoryPhase {
    #[default]
    Inciting,
    Rising,
    Climax,
    Resolution,
    Aftermath,
}

impl StoryPhase {
    /// True for the two terminal phases (`spec.md` §4.8).
    pub fn is_terminal(self) -> bool {
        matches!(self, StoryPhase::Resolution | StoryPhase::Aftermath)
    }

    /// Advances phase given a tension level, per the thresholds in
    /// `spec.md` §4.8 (>=5 inciting->rising, >=8 rising->climax).
    pub fn advance_for_tension(self, tension: u8) -> Self {
        match self {
            StoryPhase::Inciting if tension >= 5 => StoryPhase::Rising,
            StoryPhase::Rising if tension >= 8 => StoryPhase::Climax,
            other => other,
        }
    }
}

/// A single time-ordered narrative beat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryBeat {
    pub at: WorldTime,
    pub text: String,
}

/// A possible resolution, with a rough sentiment used to size the
/// consequence enqueued when it's chosen (`spec.md` §4.8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotentialOutcome {
    pub description: String,
    /// -1.0 (catastrophic) .. 1.0 (triumphant); magnitude scales the
    /// `settlement-change` consequence enqueued on resolution.
    pub sentiment: f32,
}

/// Supplementary, optional narrative context attached at spawn time
/// (`spec.md` §3: "optional context {relationships, keyLocations, themes,
/// motivations}").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryContext {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub motivations: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_locations: Vec<String>,
}

/// Free-form branch bookkeeping the classifier/engine can use to steer future
/// beats (e.g. "the hunter has committed to pursuit"). Kept as a string map
/// rather than a closed enum since branch state is producer-defined.
pub type BranchingState = HashMap<String, String>;

/// An ongoing narrative thread (`spec.md` §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryThread {
    pub id: String,
    pub story_type: StoryType,
    pub title: String,
    pub summary: String,
    pub phase: StoryPhase,
    /// 0..10.
    pub tension: u8,
    pub actors: Vec<String>,
    pub location: Option<String>,
    pub started_at: WorldTime,
    pub last_updated: WorldTime,
    pub beats: Vec<StoryBeat>,
    pub potential_outcomes: Vec<PotentialOutcome>,
    pub resolved: bool,
    pub resolution: Option<String>,
    #[serde(default)]
    pub context: StoryContext,
    #[serde(default)]
    pub branching_state: BranchingState,
}

impl StoryThread {
    pub fn new(
        id: impl Into<String>,
        story_type: StoryType,
        title: impl Into<String>,
        summary: impl Into<String>,
        actors: Vec<String>,
        location: Option<String>,
        started_at: WorldTime,
    ) -> Self {
        Self {
            id: id.into(),
            story_type,
            title: title.into(),
            summary: summary.into(),
            phase: StoryPhase::Inciting,
            tension: 1,
            actors,
            location,
            started_at,
            last_updated: started_at,
            beats: Vec::new(),
            potential_outcomes: Vec::new(),
            resolved: false,
            resolution: None,
            context: StoryContext::default(),
            branching_state: BranchingState::new(),
        }
    }

    pub fn involves_actor(&self, actor: &str) -> bool {
        self.actors.iter().any(|a| a == actor)
    }

    pub fn add_actor(&mut self, actor: impl Into<String>) {
        let actor = actor.into();
        if !self.actors.iter().any(|a| *a == actor) {
            self.actors.push(actor);
        }
    }

    /// Appends a beat, bumps tension, advances last-updated, and advances
    /// phase past its tension threshold if crossed (`spec.md` §4.8).
    pub fn add_beat(&mut self, at: WorldTime, text: impl Into<String>, tension_delta: i8) {
        self.beats.push(StoryBeat { at, text: text.into() });
        self.last_updated = at;
        let new_tension = (self.tension as i16 + tension_delta as i16).clamp(0, 10) as u8;
        self.tension = new_tension;
        self.phase = self.phase.advance_for_tension(self.tension);
    }

    /// Resolves the thread with the given outcome description, moving it to
    /// the `resolution` phase (`spec.md` §4.8; aftermath is entered on the
    /// next beat/tick, pruning acts on resolved threads regardless).
    pub fn resolve(&mut self, at: WorldTime, resolution: impl Into<String>) {
        self.phase = StoryPhase::Resolution;
        self.resolved = true;
        self.resolution = Some(resolution.into());
        self.last_updated = at;
    }

    pub fn is_active(&self) -> bool {
        !self.resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> WorldTime {
        WorldTime::parse(s).unwrap()
    }

    #[test]
    fn every_story_type_maps_to_a_family() {
        use StoryType::*;
        assert_eq!(Feud.family(), StoryFamily::Conflict);
        assert_eq!(LostRuins.family(), StoryFamily::Discovery);
        assert_eq!(Courtship.family(), StoryFamily::Social);
        assert_eq!(Famine.family(), StoryFamily::Survival);
        assert_eq!(Conspiracy.family(), StoryFamily::Intrigue);
        assert_eq!(Curse.family(), StoryFamily::Supernatural);
    }

    #[test]
    fn phase_transitions_follow_tension_thresholds() {
        assert_eq!(StoryPhase::Inciting.advance_for_tension(4), StoryPhase::Inciting);
        assert_eq!(StoryPhase::Inciting.advance_for_tension(5), StoryPhase::Rising);
        assert_eq!(StoryPhase::Rising.advance_for_tension(7), StoryPhase::Rising);
        assert_eq!(StoryPhase::Rising.advance_for_tension(8), StoryPhase::Climax);
    }

    #[test]
    fn add_beat_clamps_tension_and_advances_phase() {
        let mut thread = StoryThread::new(
            "thread_00001",
            StoryType::Heist,
            "Theft reported in Rivermouth",
            "Alric is suspected of theft",
            vec!["Alric".into()],
            Some("Rivermouth".into()),
            t("2024-01-01T00:00:00Z"),
        );
        assert_eq!(thread.phase, StoryPhase::Inciting);
        for _ in 0..6 {
            thread.add_beat(t("2024-01-02T00:00:00Z"), "things escalate", 1);
        }
        assert_eq!(thread.tension, 7);
        assert_eq!(thread.phase, StoryPhase::Rising);
    }

    #[test]
    fn resolve_sets_terminal_state() {
        let mut thread = StoryThread::new(
            "thread_00002",
            StoryType::Feud,
            "title",
            "summary",
            vec![],
            None,
            t("2024-01-01T00:00:00Z"),
        );
        thread.resolve(t("2024-01-05T00:00:00Z"), "The feud ends in bloodshed");
        assert!(thread.resolved);
        assert!(thread.phase.is_terminal());
        assert_eq!(thread.resolution.as_deref(), Some("The feud ends in bloodshed"));
    }
}
