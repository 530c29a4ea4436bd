//! Matchup loading and configuration.
//!
//! A matchup names the two entrants of a battle and, optionally, the
//! ruleset to fight under. Matchups are RON files unless the extension is
//! `.json`.

use std::fs;
use std::path::{Path, PathBuf};

use arena_core::combatant::{Combatant, Entrant, EquippedSkill, Personality};
use arena_core::components::{EffectTarget, Element, SkillCategory, StatBlock};
use arena_core::data::{Accuracy, Effect, Skill};
use arena_core::ruleset::Ruleset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ruleset_loader::{load_ruleset, relative_to, DataFormat, RulesetLoadError};

/// Error type for matchup operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Matchup file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read matchup file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON or JSON.
    #[error("Failed to parse matchup '{path}': {message}")]
    ParseError {
        /// Offending path.
        path: String,
        /// Parser message.
        message: String,
    },
    /// The referenced ruleset could not be loaded.
    #[error("Failed to load matchup ruleset: {0}")]
    Ruleset(#[from] RulesetLoadError),
}

/// A complete matchup.
///
/// # Example RON
///
/// ```ron
/// Matchup(
///     name: "Ember vs Tide",
///     ruleset: Some("standard.ron"),
///     player: (combatant: (id: "ember", name: "Ember", base: (hp: 120, attack: 22, defense: 12, speed: 14))),
///     opponent: (combatant: (id: "tide", name: "Tide", base: (hp: 130, attack: 18, defense: 15, speed: 11))),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    /// Matchup name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Ruleset file, relative to the matchup file. `None` uses the standard ruleset.
    #[serde(default)]
    pub ruleset: Option<PathBuf>,
    /// Player side.
    pub player: Entrant,
    /// Opponent side.
    pub opponent: Entrant,
}

impl Matchup {
    /// Load a matchup from a RON or JSON file.
    ///
    /// A relative `ruleset` path is rewritten to be relative to the
    /// matchup file's directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = fs::read_to_string(path)?;
        let mut matchup: Matchup = DataFormat::from_path(path).parse(&contents).map_err(
            |message| ScenarioError::ParseError {
                path: path.display().to_string(),
                message,
            },
        )?;
        if let Some(ruleset) = matchup.ruleset.take() {
            matchup.ruleset = Some(relative_to(path, &ruleset));
        }
        Ok(matchup)
    }

    /// Load from a RON string (useful for embedded matchups).
    pub fn from_ron_str(src: &str) -> Result<Self, ScenarioError> {
        DataFormat::Ron
            .parse(src)
            .map_err(|message| ScenarioError::ParseError {
                path: "<inline>".to_string(),
                message,
            })
    }

    /// Load the ruleset this matchup names, or the standard ruleset.
    pub fn load_ruleset(&self) -> Result<Ruleset, ScenarioError> {
        match &self.ruleset {
            Some(path) => Ok(load_ruleset(path)?),
            None => Ok(Ruleset::default()),
        }
    }

    /// Check every equipped skill on both sides against `ruleset`.
    ///
    /// Each issue is prefixed with the combatant id. Skills that apply an
    /// unknown status still run; the status is skipped at combat time.
    #[must_use]
    pub fn skill_issues(&self, ruleset: &Ruleset) -> Vec<String> {
        [&self.player, &self.opponent]
            .into_iter()
            .flat_map(move |entrant| {
                let id = &entrant.combatant.id;
                entrant
                    .combatant
                    .skills
                    .iter()
                    .flat_map(move |slot| ruleset.validate_skill(&slot.skill))
                    .map(move |issue| format!("{id}: {issue}"))
            })
            .collect()
    }

    /// A built-in fire-against-water exhibition, used when no matchup file is given.
    #[must_use]
    pub fn exhibition() -> Self {
        let ember = Combatant::new("ember", "Emberfang", StatBlock::new(120, 40, 22, 12, 14, 10))
            .with_elements(&[Element::Fire])
            .with_personality(Personality::neutral().with_preference(SkillCategory::Attack, 180))
            .with_skill(EquippedSkill::new(attack_skill(
                "flame_fang",
                "Flame Fang",
                Element::Fire,
                8,
                40,
                Some(("burn", 20)),
            )))
            .with_skill(EquippedSkill::new(attack_skill(
                "ember_bite",
                "Ember Bite",
                Element::Fire,
                4,
                28,
                None,
            )));

        let tide = Combatant::new("tide", "Tidewarden", StatBlock::new(135, 50, 18, 15, 11, 5))
            .with_elements(&[Element::Water])
            .with_personality(Personality::neutral().with_preference(SkillCategory::Support, 150))
            .with_skill(EquippedSkill::new(attack_skill(
                "tidal_crash",
                "Tidal Crash",
                Element::Water,
                12,
                55,
                None,
            )))
            .with_skill(EquippedSkill::new(Skill {
                id: "mend".to_string(),
                name: "Mend".to_string(),
                element: Element::Light,
                category: SkillCategory::Support,
                mp_cost: 10,
                accuracy: Accuracy::AlwaysHits,
                priority: 0,
                effects: vec![Effect::Heal {
                    percent: 30,
                    target: EffectTarget::User,
                }],
            }));

        Self {
            name: "Exhibition".to_string(),
            description: "Emberfang against Tidewarden under the standard rules".to_string(),
            ruleset: None,
            player: Entrant::new(ember),
            opponent: Entrant::new(tide),
        }
    }
}

fn attack_skill(
    id: &str,
    name: &str,
    element: Element,
    mp_cost: i32,
    power: i32,
    status: Option<(&str, u32)>,
) -> Skill {
    let mut effects = vec![Effect::Damage {
        power,
        target: EffectTarget::Opponent,
    }];
    if let Some((status_id, chance)) = status {
        effects.push(Effect::ApplyStatus {
            status_id: status_id.to_string(),
            chance,
            target: EffectTarget::Opponent,
        });
    }
    Skill {
        id: id.to_string(),
        name: name.to_string(),
        element,
        category: SkillCategory::Attack,
        mp_cost,
        accuracy: Accuracy::Percent(95),
        priority: 0,
        effects,
    }
}
