//! Skill and effect definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{EffectTarget, Element, ModStat, SkillCategory};

/// Default chance for chance-gated effects (always fires).
const fn default_chance() -> u32 {
    100
}

/// How likely a skill is to connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accuracy {
    /// Base hit chance in percent, before accuracy/evasion adjustments.
    Percent(u32),
    /// Never rolls; always connects.
    AlwaysHits,
}

impl Default for Accuracy {
    fn default() -> Self {
        Accuracy::Percent(100)
    }
}

/// A single stat shift carried by a [`Effect::StatChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatDelta {
    /// Stat to shift.
    pub stat: ModStat,
    /// Signed amount added to the temporary modifier.
    pub amount: i32,
}

/// One step of a skill's resolution.
///
/// Effects run in list order. Each variant carries exactly the fields it
/// needs; nothing is validated again at combat time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Deal damage scaled by attack/defense.
    Damage {
        /// Base power.
        power: i32,
        /// Who takes the hit.
        #[serde(default)]
        target: EffectTarget,
    },
    /// Attach a status effect from the ruleset catalog.
    ApplyStatus {
        /// Template id.
        status_id: String,
        /// Chance in percent.
        #[serde(default = "default_chance")]
        chance: u32,
        /// Who receives the status.
        #[serde(default)]
        target: EffectTarget,
    },
    /// Shift temporary stat modifiers.
    StatChange {
        /// One or more stat shifts applied together.
        changes: Vec<StatDelta>,
        /// Chance in percent.
        #[serde(default = "default_chance")]
        chance: u32,
        /// Who is modified.
        #[serde(default)]
        target: EffectTarget,
    },
    /// Restore a percentage of the target's max hp.
    Heal {
        /// Percent of effective max hp.
        percent: u32,
        /// Who is healed.
        #[serde(default = "heal_target")]
        target: EffectTarget,
    },
    /// Restore a percentage of the damage dealt so far this action to the performer.
    Leech {
        /// Percent of damage dealt.
        percent: u32,
    },
    /// Scripted behavior selected by id.
    Special {
        /// Logic identifier (e.g. `"recoil"`).
        logic_id: String,
        /// Integer parameters for the logic.
        #[serde(default)]
        params: BTreeMap<String, i64>,
    },
}

const fn heal_target() -> EffectTarget {
    EffectTarget::User
}

/// Known special effect logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialLogic {
    /// Performer takes `recoil_percent`% of the damage dealt this action.
    Recoil {
        /// Fraction of dealt damage reflected, in percent.
        recoil_percent: u32,
    },
    /// A logic id this build does not implement.
    Unrecognized(String),
}

impl SpecialLogic {
    /// Interpret a `Special` effect's id and parameters.
    #[must_use]
    pub fn parse(logic_id: &str, params: &BTreeMap<String, i64>) -> Self {
        match logic_id {
            "recoil" => {
                let recoil_percent = params
                    .get("recoil_percent")
                    .copied()
                    .unwrap_or(0)
                    .clamp(0, i64::from(u32::MAX)) as u32;
                SpecialLogic::Recoil { recoil_percent }
            }
            other => SpecialLogic::Unrecognized(other.to_string()),
        }
    }
}

/// Data-driven skill definition.
///
/// # Example RON
///
/// ```ron
/// Skill(
///     id: "flame_fang",
///     name: "Flame Fang",
///     element: Fire,
///     category: Attack,
///     mp_cost: 8,
///     accuracy: Percent(95),
///     effects: [
///         Damage(power: 40),
///         ApplyStatus(status_id: "burn", chance: 20),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    /// Unique identifier.
    pub id: String,
    /// Display name used in the battle log.
    pub name: String,
    /// Element of the skill's damage.
    #[serde(default)]
    pub element: Element,
    /// Category consulted by personality weighting.
    #[serde(default)]
    pub category: SkillCategory,
    /// Magic points spent per use.
    #[serde(default)]
    pub mp_cost: i32,
    /// Hit chance.
    #[serde(default)]
    pub accuracy: Accuracy,
    /// Priority hint. Carried for presentation; turn order is speed-based.
    #[serde(default)]
    pub priority: i32,
    /// Ordered effect list.
    pub effects: Vec<Effect>,
}

impl Skill {
    /// Whether any effect deals damage.
    #[must_use]
    pub fn deals_damage(&self) -> bool {
        self.effects
            .iter()
            .any(|e| matches!(e, Effect::Damage { .. }))
    }

    /// Status ids this skill can apply.
    pub fn status_ids(&self) -> impl Iterator<Item = &str> {
        self.effects.iter().filter_map(|e| match e {
            Effect::ApplyStatus { status_id, .. } => Some(status_id.as_str()),
            _ => None,
        })
    }

    /// Validate the skill in isolation.
    ///
    /// Returns a list of data defects; an empty list means the skill is clean.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.mp_cost < 0 {
            errors.push(format!("Skill '{}' has negative mp cost", self.id));
        }
        if let Accuracy::Percent(p) = self.accuracy {
            if p > 100 {
                errors.push(format!("Skill '{}' accuracy {} exceeds 100", self.id, p));
            }
        }
        if self.effects.is_empty() {
            errors.push(format!("Skill '{}' has no effects", self.id));
        }

        for effect in &self.effects {
            match effect {
                Effect::Damage { power, .. } if *power < 0 => {
                    errors.push(format!("Skill '{}' has negative damage power", self.id));
                }
                Effect::ApplyStatus { chance, .. } | Effect::StatChange { chance, .. }
                    if *chance > 100 =>
                {
                    errors.push(format!("Skill '{}' effect chance {} exceeds 100", self.id, chance));
                }
                Effect::StatChange { changes, .. } if changes.is_empty() => {
                    errors.push(format!("Skill '{}' has an empty stat change", self.id));
                }
                Effect::Special { logic_id, params } => {
                    if let SpecialLogic::Unrecognized(id) = SpecialLogic::parse(logic_id, params) {
                        errors.push(format!(
                            "Skill '{}' uses unrecognized special logic '{}'",
                            self.id, id
                        ));
                    }
                }
                _ => {}
            }
        }

        errors
    }
}
