//! Ruleset data: elemental chart, status catalog and tunables.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::status_data::StatusTemplate;
use crate::components::Element;

/// One cell of the elemental advantage chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChartEntry {
    /// Element of the incoming skill.
    pub attacker: Element,
    /// One of the defender's elements.
    pub defender: Element,
    /// Damage multiplier in percent (`200` doubles, `50` halves).
    pub percent: u32,
}

/// Largest multiplier percent a chart cell or the crit multiplier may carry.
pub const MAX_MULTIPLIER_PERCENT: u32 = 1000;

/// Numeric knobs of the battle rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Turn cap. Battles reaching it without a knockout are draws.
    pub max_turns: u32,
    /// Critical hit damage multiplier in percent.
    pub crit_multiplier_percent: u32,
    /// Hard ceiling on effective crit chance.
    pub crit_cap: i32,
    /// Power of the parameterless basic attack.
    pub basic_attack_power: i32,
    /// Base accuracy of the basic attack, in percent.
    pub basic_attack_accuracy: u32,
    /// Chance in percent that a combatant consults its skills instead of
    /// falling back to the basic attack.
    pub skill_choice_percent: u32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            max_turns: 30,
            crit_multiplier_percent: 150,
            crit_cap: 50,
            basic_attack_power: 15,
            basic_attack_accuracy: 100,
            skill_choice_percent: 50,
        }
    }
}

/// Complete ruleset definition as loaded from a data file.
///
/// # Example RON
///
/// ```ron
/// RulesetData(
///     name: "standard",
///     elemental_chart: [
///         (attacker: Fire, defender: Wood, percent: 200),
///         (attacker: Water, defender: Fire, percent: 200),
///     ],
///     statuses: [
///         (id: "stun", name: "Stunned", skip_turn_chance: Some(100), duration: Turns(1)),
///     ],
///     tunables: (max_turns: 30),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesetData {
    /// Ruleset name, for logs.
    pub name: String,
    /// Elemental advantage entries. Absent pairs are neutral.
    #[serde(default)]
    pub elemental_chart: Vec<ChartEntry>,
    /// Status effect catalog.
    #[serde(default)]
    pub statuses: Vec<StatusTemplate>,
    /// Numeric rules.
    #[serde(default)]
    pub tunables: Tunables,
}

impl RulesetData {
    /// Validate internal consistency.
    ///
    /// Checks for:
    /// - A turn cap of at least one
    /// - Duplicate status ids
    /// - Duplicate chart cells
    /// - Chart and crit multipliers above [`MAX_MULTIPLIER_PERCENT`]
    /// - Malformed status templates
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.tunables.max_turns == 0 {
            errors.push("Ruleset turn cap must be at least 1".to_string());
        }
        if self.tunables.crit_multiplier_percent > MAX_MULTIPLIER_PERCENT {
            errors.push(format!(
                "Crit multiplier {}% exceeds {}%",
                self.tunables.crit_multiplier_percent, MAX_MULTIPLIER_PERCENT
            ));
        }

        let mut seen = BTreeSet::new();
        for status in &self.statuses {
            if !seen.insert(status.id.as_str()) {
                errors.push(format!("Duplicate status id '{}'", status.id));
            }
            errors.extend(status.validate());
        }

        let mut cells = BTreeSet::new();
        for entry in &self.elemental_chart {
            if !cells.insert((entry.attacker, entry.defender)) {
                errors.push(format!(
                    "Duplicate chart entry {} -> {}",
                    entry.attacker, entry.defender
                ));
            }
            if entry.percent > MAX_MULTIPLIER_PERCENT {
                errors.push(format!(
                    "Chart entry {} -> {} multiplier {}% exceeds {}%",
                    entry.attacker, entry.defender, entry.percent, MAX_MULTIPLIER_PERCENT
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DurationSpec;

    #[test]
    fn test_parse_ruleset_with_defaults() {
        let src = r#"
            RulesetData(
                name: "mini",
                elemental_chart: [
                    (attacker: Fire, defender: Wood, percent: 200),
                ],
                statuses: [
                    (id: "stun", name: "Stunned", skip_turn_chance: Some(100), duration: Turns(1)),
                ],
                tunables: (max_turns: 12),
            )
        "#;
        let data: RulesetData = ron::from_str(src).unwrap();
        assert_eq!(data.tunables.max_turns, 12);
        assert_eq!(data.tunables.crit_multiplier_percent, 150);
        assert_eq!(data.statuses[0].duration, DurationSpec::Turns(1));
        assert!(data.validate().is_empty());
    }

    #[test]
    fn test_validate_catches_zero_turn_cap_and_duplicates() {
        let mut data = RulesetData {
            name: "broken".to_string(),
            elemental_chart: vec![
                ChartEntry {
                    attacker: Element::Fire,
                    defender: Element::Ice,
                    percent: 200,
                },
                ChartEntry {
                    attacker: Element::Fire,
                    defender: Element::Ice,
                    percent: 150,
                },
            ],
            statuses: Vec::new(),
            tunables: Tunables::default(),
        };
        data.tunables.max_turns = 0;

        let errors = data.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("turn cap")));
    }

    #[test]
    fn test_validate_flags_oversized_multipliers() {
        let mut data = RulesetData {
            name: "huge".to_string(),
            elemental_chart: vec![ChartEntry {
                attacker: Element::Neutral,
                defender: Element::Wood,
                percent: 100_000,
            }],
            statuses: Vec::new(),
            tunables: Tunables::default(),
        };
        data.tunables.crit_multiplier_percent = 3_000_000_000;

        let errors = data.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|e| e.contains("Crit multiplier")));
        assert!(errors.iter().any(|e| e.contains("Neutral -> Wood")));
    }
}
