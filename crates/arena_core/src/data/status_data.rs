//! Status effect templates.

use serde::{Deserialize, Serialize};

use crate::components::StatDeltas;

/// Duration used when a template's duration cannot be sampled.
///
/// Large enough to outlast any battle.
pub const PERSISTENT_DURATION: u32 = 999;

/// How many owner turns a status lasts once applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationSpec {
    /// Exactly this many turns.
    Turns(u32),
    /// Uniformly sampled from `min..=max` at application time.
    Range {
        /// Lower bound, inclusive.
        min: u32,
        /// Upper bound, inclusive.
        max: u32,
    },
    /// Lasts until the battle ends.
    Persistent,
}

impl Default for DurationSpec {
    fn default() -> Self {
        DurationSpec::Persistent
    }
}

impl DurationSpec {
    /// Whether this spec can be sampled as written.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        match self {
            DurationSpec::Range { min, max } => *min <= *max,
            DurationSpec::Turns(_) | DurationSpec::Persistent => true,
        }
    }
}

/// Read-only status effect definition shared by every battle.
///
/// # Example RON
///
/// ```ron
/// StatusTemplate(
///     id: "poison",
///     name: "Poisoned",
///     hp_per_turn: Some(-5),
///     duration: Range(min: 2, max: 4),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTemplate {
    /// Unique identifier referenced by skills.
    pub id: String,
    /// Display name used in the battle log.
    pub name: String,
    /// Hp change applied at the start of each owner turn.
    #[serde(default)]
    pub hp_per_turn: Option<i32>,
    /// Mp change applied at the start of each owner turn.
    #[serde(default)]
    pub mp_per_turn: Option<i32>,
    /// Chance in percent that the owner loses its action.
    #[serde(default)]
    pub skip_turn_chance: Option<u32>,
    /// Stat deltas folded into effective stats while active.
    #[serde(default)]
    pub stat_deltas: StatDeltas,
    /// Duration specification.
    #[serde(default)]
    pub duration: DurationSpec,
}

impl StatusTemplate {
    /// Validate the template in isolation.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.duration.is_well_formed() {
            errors.push(format!(
                "Status '{}' has an inverted duration range {:?}",
                self.id, self.duration
            ));
        }
        if let Some(chance) = self.skip_turn_chance {
            if chance > 100 {
                errors.push(format!(
                    "Status '{}' skip chance {} exceeds 100",
                    self.id, chance
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_template() {
        let src = r#"
            StatusTemplate(
                id: "poison",
                name: "Poisoned",
                hp_per_turn: Some(-5),
                duration: Range(min: 2, max: 4),
            )
        "#;
        let template: StatusTemplate = ron::from_str(src).unwrap();
        assert_eq!(template.hp_per_turn, Some(-5));
        assert_eq!(template.skip_turn_chance, None);
        assert!(template.stat_deltas.is_zero());
        assert_eq!(template.duration, DurationSpec::Range { min: 2, max: 4 });
        assert!(template.validate().is_empty());
    }

    #[test]
    fn test_inverted_range_flagged() {
        let template = StatusTemplate {
            id: "odd".to_string(),
            name: "Odd".to_string(),
            hp_per_turn: None,
            mp_per_turn: None,
            skip_turn_chance: Some(120),
            stat_deltas: StatDeltas::default(),
            duration: DurationSpec::Range { min: 5, max: 2 },
        };
        assert!(!template.duration.is_well_formed());
        assert_eq!(template.validate().len(), 2);
    }
}
