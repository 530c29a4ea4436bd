//! Leveled-skill projection.
//!
//! Skill definitions are authored at level 1. [`project`] derives the
//! level-N version in one place; every caller (affordability checks,
//! effect resolution, logs) sees the same numbers.

use crate::data::{Effect, Skill, StatDelta};
use crate::math::scale_percent;

/// Power and heal growth per level above 1, in percent.
pub const POWER_GROWTH_PERCENT: u32 = 10;

/// Mp cost growth per level above 1, in percent.
pub const COST_GROWTH_PERCENT: u32 = 5;

/// Stat-change amount growth per level above 1, in percent.
pub const AMOUNT_GROWTH_PERCENT: u32 = 10;

fn factor(level: u32, growth: u32) -> u32 {
    let steps = level.max(1) - 1;
    100u32.saturating_add(steps.saturating_mul(growth))
}

/// Project a level-1 skill definition to `level`.
///
/// Levels below 1 are treated as 1, which returns the skill unchanged.
#[must_use]
pub fn project(skill: &Skill, level: u32) -> Skill {
    if level <= 1 {
        return skill.clone();
    }

    let power = factor(level, POWER_GROWTH_PERCENT);
    let cost = factor(level, COST_GROWTH_PERCENT);
    let amount = factor(level, AMOUNT_GROWTH_PERCENT);

    let effects = skill
        .effects
        .iter()
        .map(|effect| match effect {
            Effect::Damage { power: p, target } => Effect::Damage {
                power: scale_percent(*p, power),
                target: *target,
            },
            Effect::Heal { percent, target } => Effect::Heal {
                percent: scale_percent(i32::try_from(*percent).unwrap_or(i32::MAX), power).max(0)
                    as u32,
                target: *target,
            },
            Effect::StatChange {
                changes,
                chance,
                target,
            } => Effect::StatChange {
                changes: changes
                    .iter()
                    .map(|c| StatDelta {
                        stat: c.stat,
                        amount: scale_percent(c.amount, amount),
                    })
                    .collect(),
                chance: *chance,
                target: *target,
            },
            other => other.clone(),
        })
        .collect();

    Skill {
        mp_cost: scale_percent(skill.mp_cost, cost),
        effects,
        ..skill.clone()
    }
}
