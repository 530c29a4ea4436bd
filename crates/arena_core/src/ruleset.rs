//! Immutable runtime ruleset.
//!
//! A [`Ruleset`] is built once from [`RulesetData`] and then shared
//! read-only by any number of concurrently running battles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::components::{Element, StatDeltas};
use crate::data::{ChartEntry, DurationSpec, RulesetData, Skill, StatusTemplate, Tunables};
use crate::error::{GameError, Result};
use crate::math::{percent, Fixed};

/// Elemental advantage lookup.
///
/// Serializes as a list of [`ChartEntry`] so it survives JSON as well as bincode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ChartEntry>", into = "Vec<ChartEntry>")]
pub struct ElementChart {
    cells: BTreeMap<(Element, Element), u32>,
}

impl From<Vec<ChartEntry>> for ElementChart {
    fn from(entries: Vec<ChartEntry>) -> Self {
        Self::from_entries(&entries)
    }
}

impl From<ElementChart> for Vec<ChartEntry> {
    fn from(chart: ElementChart) -> Self {
        chart.entries().collect()
    }
}

impl ElementChart {
    /// Build a chart from data entries. Later duplicates win.
    #[must_use]
    pub fn from_entries(entries: &[ChartEntry]) -> Self {
        let cells = entries
            .iter()
            .map(|e| ((e.attacker, e.defender), e.percent))
            .collect();
        Self { cells }
    }

    /// Multiplier percent for one attacker/defender pair (100 when absent).
    #[must_use]
    pub fn percent_for(&self, attacker: Element, defender: Element) -> u32 {
        self.cells.get(&(attacker, defender)).copied().unwrap_or(100)
    }

    /// Damage multiplier against a (possibly multi-element) defender.
    ///
    /// The product of the per-element lookups, saturating; an empty
    /// defender list is neutral.
    #[must_use]
    pub fn multiplier(&self, attacker: Element, defenders: &[Element]) -> Fixed {
        defenders.iter().fold(Fixed::ONE, |acc, d| {
            acc.saturating_mul(percent(self.percent_for(attacker, *d)))
        })
    }

    /// Iterate cells as data entries, in (attacker, defender) order.
    pub fn entries(&self) -> impl Iterator<Item = ChartEntry> + '_ {
        self.cells
            .iter()
            .map(|(&(attacker, defender), &percent)| ChartEntry {
                attacker,
                defender,
                percent,
            })
    }

    /// Number of non-neutral cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the chart is entirely neutral.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Read-only bundle driving one or many simulations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruleset {
    name: String,
    chart: ElementChart,
    statuses: BTreeMap<String, StatusTemplate>,
    tunables: Tunables,
}

impl Ruleset {
    /// Build a ruleset from loaded data.
    ///
    /// Fatal problems (turn cap below one, duplicate status ids) are errors.
    /// Non-fatal data defects are logged and tolerated.
    pub fn from_data(data: RulesetData) -> Result<Self> {
        if data.tunables.max_turns == 0 {
            return Err(GameError::InvalidRuleset(format!(
                "ruleset '{}' sets max_turns to 0",
                data.name
            )));
        }

        let mut statuses = BTreeMap::new();
        for template in data.statuses {
            for issue in template.validate() {
                warn!(ruleset = %data.name, "{issue}");
            }
            let id = template.id.clone();
            if statuses.insert(id.clone(), template).is_some() {
                return Err(GameError::InvalidRuleset(format!(
                    "ruleset '{}' defines status '{}' twice",
                    data.name, id
                )));
            }
        }

        Ok(Self {
            chart: ElementChart::from_entries(&data.elemental_chart),
            name: data.name,
            statuses,
            tunables: data.tunables,
        })
    }

    /// Ruleset name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Elemental advantage chart.
    #[must_use]
    pub fn chart(&self) -> &ElementChart {
        &self.chart
    }

    /// Numeric rules.
    #[must_use]
    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    /// Turn cap, never below one.
    #[must_use]
    pub fn max_turns(&self) -> u32 {
        self.tunables.max_turns.max(1)
    }

    /// Critical hit multiplier.
    #[must_use]
    pub fn crit_multiplier(&self) -> Fixed {
        percent(self.tunables.crit_multiplier_percent)
    }

    /// Look up a status template.
    #[must_use]
    pub fn status(&self, id: &str) -> Option<&StatusTemplate> {
        self.statuses.get(id)
    }

    /// Iterate the status catalog in id order.
    pub fn statuses(&self) -> impl Iterator<Item = &StatusTemplate> {
        self.statuses.values()
    }

    /// Check a skill against this ruleset.
    ///
    /// Returns the skill's own defects plus any status ids the catalog lacks.
    #[must_use]
    pub fn validate_skill(&self, skill: &Skill) -> Vec<String> {
        let mut errors = skill.validate();
        for id in skill.status_ids() {
            if self.status(id).is_none() {
                errors.push(format!(
                    "Skill '{}' applies unknown status '{}'",
                    skill.id, id
                ));
            }
        }
        errors
    }

    /// Export back to data form.
    #[must_use]
    pub fn to_data(&self) -> RulesetData {
        RulesetData {
            name: self.name.clone(),
            elemental_chart: self.chart.entries().collect(),
            statuses: self.statuses.values().cloned().collect(),
            tunables: self.tunables,
        }
    }
}

impl Default for Ruleset {
    /// The built-in standard ruleset.
    fn default() -> Self {
        let data = standard_ruleset_data();
        let statuses = data
            .statuses
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();
        Self {
            chart: ElementChart::from_entries(&data.elemental_chart),
            name: data.name,
            statuses,
            tunables: data.tunables,
        }
    }
}

fn entry(attacker: Element, defender: Element, percent: u32) -> ChartEntry {
    ChartEntry {
        attacker,
        defender,
        percent,
    }
}

fn template(
    id: &str,
    name: &str,
    hp_per_turn: Option<i32>,
    skip_turn_chance: Option<u32>,
    stat_deltas: StatDeltas,
    duration: DurationSpec,
) -> StatusTemplate {
    StatusTemplate {
        id: id.to_string(),
        name: name.to_string(),
        hp_per_turn,
        mp_per_turn: None,
        skip_turn_chance,
        stat_deltas,
        duration,
    }
}

/// Data for the built-in standard ruleset.
#[must_use]
pub fn standard_ruleset_data() -> RulesetData {
    use Element::*;

    let elemental_chart = vec![
        entry(Fire, Wood, 200),
        entry(Fire, Ice, 200),
        entry(Fire, Metal, 150),
        entry(Fire, Water, 50),
        entry(Fire, Earth, 50),
        entry(Water, Fire, 200),
        entry(Water, Earth, 150),
        entry(Water, Wood, 50),
        entry(Water, Electric, 50),
        entry(Earth, Electric, 200),
        entry(Earth, Fire, 150),
        entry(Earth, Wind, 50),
        entry(Wind, Wood, 150),
        entry(Wind, Earth, 150),
        entry(Wind, Metal, 50),
        entry(Wood, Water, 200),
        entry(Wood, Earth, 150),
        entry(Wood, Fire, 50),
        entry(Metal, Ice, 150),
        entry(Metal, Wood, 150),
        entry(Metal, Fire, 50),
        entry(Electric, Water, 200),
        entry(Electric, Wind, 150),
        entry(Electric, Earth, 50),
        entry(Ice, Wind, 150),
        entry(Ice, Wood, 150),
        entry(Ice, Fire, 50),
        entry(Light, Dark, 200),
        entry(Dark, Light, 200),
        entry(Poison, Wood, 150),
        entry(Poison, Metal, 50),
    ];

    let statuses = vec![
        template(
            "poison",
            "Poisoned",
            Some(-5),
            None,
            StatDeltas::default(),
            DurationSpec::Range { min: 2, max: 4 },
        ),
        template(
            "burn",
            "Burned",
            Some(-4),
            None,
            StatDeltas {
                attack: -3,
                ..StatDeltas::default()
            },
            DurationSpec::Turns(3),
        ),
        template(
            "stun",
            "Stunned",
            None,
            Some(100),
            StatDeltas::default(),
            DurationSpec::Turns(1),
        ),
        template(
            "sleep",
            "Asleep",
            None,
            Some(75),
            StatDeltas {
                evasion: -10,
                ..StatDeltas::default()
            },
            DurationSpec::Range { min: 1, max: 3 },
        ),
        template(
            "weaken",
            "Weakened",
            None,
            None,
            StatDeltas {
                attack: -5,
                defense: -3,
                ..StatDeltas::default()
            },
            DurationSpec::Turns(3),
        ),
        template(
            "fortify",
            "Fortified",
            None,
            None,
            StatDeltas {
                defense: 8,
                ..StatDeltas::default()
            },
            DurationSpec::Turns(3),
        ),
        template(
            "haste",
            "Hasted",
            None,
            None,
            StatDeltas {
                speed: 10,
                ..StatDeltas::default()
            },
            DurationSpec::Turns(2),
        ),
        template(
            "blind",
            "Blinded",
            None,
            None,
            StatDeltas {
                accuracy: -30,
                ..StatDeltas::default()
            },
            DurationSpec::Range { min: 2, max: 3 },
        ),
    ];

    RulesetData {
        name: "standard".to_string(),
        elemental_chart,
        statuses,
        tunables: Tunables::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_pair_is_neutral() {
        let chart = ElementChart::default();
        assert_eq!(chart.percent_for(Element::Fire, Element::Water), 100);
        assert_eq!(chart.multiplier(Element::Fire, &[Element::Water]), Fixed::ONE);
    }

    #[test]
    fn test_multi_element_multiplier_is_product() {
        let chart = ElementChart::from_entries(&[
            entry(Element::Fire, Element::Wood, 200),
            entry(Element::Fire, Element::Water, 50),
        ]);

        assert_eq!(
            chart.multiplier(Element::Fire, &[Element::Wood]),
            Fixed::from_num(2)
        );
        // 2.0 * 0.5 * 1.0 (Light absent)
        assert_eq!(
            chart.multiplier(Element::Fire, &[Element::Wood, Element::Water, Element::Light]),
            Fixed::ONE
        );
        assert_eq!(chart.multiplier(Element::Fire, &[]), Fixed::ONE);
    }

    #[test]
    fn test_oversized_chart_saturates() {
        let defenders = [Element::Wood, Element::Ice, Element::Metal, Element::Water];
        let entries: Vec<ChartEntry> = defenders
            .iter()
            .map(|d| entry(Element::Neutral, *d, 100_000))
            .collect();
        let chart = ElementChart::from_entries(&entries);

        assert_eq!(chart.multiplier(Element::Neutral, &defenders), Fixed::MAX);
    }

    #[test]
    fn test_oversized_crit_multiplier_does_not_panic() {
        let mut data = standard_ruleset_data();
        data.tunables.crit_multiplier_percent = 3_000_000_000;
        assert!(!data.validate().is_empty());

        let ruleset = Ruleset::from_data(data).unwrap();
        assert!(ruleset.crit_multiplier() > Fixed::from_num(20_000_000));
    }

    #[test]
    fn test_zero_turn_cap_rejected() {
        let mut data = standard_ruleset_data();
        data.tunables.max_turns = 0;
        assert!(matches!(
            Ruleset::from_data(data),
            Err(GameError::InvalidRuleset(_))
        ));
    }

    #[test]
    fn test_duplicate_status_rejected() {
        let mut data = standard_ruleset_data();
        let dup = data.statuses[0].clone();
        data.statuses.push(dup);
        assert!(Ruleset::from_data(data).is_err());
    }

    #[test]
    fn test_default_matches_standard_data() {
        let built = Ruleset::from_data(standard_ruleset_data()).unwrap();
        assert_eq!(built, Ruleset::default());
        assert!(standard_ruleset_data().validate().is_empty());
        assert_eq!(built.max_turns(), 30);
        assert_eq!(built.crit_multiplier(), Fixed::from_num(1.5));
    }

    #[test]
    fn test_validate_skill_reports_unknown_status() {
        use crate::components::{EffectTarget, SkillCategory};
        use crate::data::{Accuracy, Effect};

        let ruleset = Ruleset::default();
        let skill = Skill {
            id: "hex".to_string(),
            name: "Hex".to_string(),
            element: Element::Dark,
            category: SkillCategory::Utility,
            mp_cost: 5,
            accuracy: Accuracy::AlwaysHits,
            priority: 0,
            effects: vec![Effect::ApplyStatus {
                status_id: "curse".to_string(),
                chance: 100,
                target: EffectTarget::Opponent,
            }],
        };
        let errors = ruleset.validate_skill(&skill);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("curse"));
    }

    #[test]
    fn test_round_trip_to_data() {
        let ruleset = Ruleset::default();
        let rebuilt = Ruleset::from_data(ruleset.to_data()).unwrap();
        assert_eq!(ruleset, rebuilt);
    }
}
