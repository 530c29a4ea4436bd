//! Damage math and per-action rolls.
//!
//! This module implements:
//! - The attack/defense damage formula with a defense floor of 1
//! - Elemental and critical multipliers
//! - Accuracy and crit rolls against an injected RNG
//!
//! All fractional math is fixed-point, so a seeded battle yields the
//! same numbers on every platform.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::Accuracy;
use crate::math::{floor_to_i32, Fixed};

/// Minimum defense used in damage math.
pub const MIN_DEFENSE: i32 = 1;

/// Minimum raw damage before multipliers.
pub const MIN_RAW_DAMAGE: i32 = 1;

/// Defense as used by the damage formula, never below [`MIN_DEFENSE`].
#[must_use]
pub const fn effective_defense(defense: i32) -> i32 {
    if defense < MIN_DEFENSE {
        MIN_DEFENSE
    } else {
        defense
    }
}

/// Raw damage before elemental and crit multipliers.
///
/// `max(1, power * (attack / max(1, defense)) * 0.5 + attack * 0.1)`
#[must_use]
pub fn raw_damage(power: i32, attack: i32, defense: i32) -> Fixed {
    let attack = Fixed::from_num(attack);
    let ratio = attack / Fixed::from_num(effective_defense(defense));
    let scaled = Fixed::from_num(power).saturating_mul(ratio) / 2;
    let bonus = attack / 10;
    scaled
        .saturating_add(bonus)
        .max(Fixed::from_num(MIN_RAW_DAMAGE))
}

/// Apply multipliers to raw damage and floor the result.
#[must_use]
pub fn final_damage(raw: Fixed, elemental: Fixed, crit: Option<Fixed>) -> i32 {
    let mut damage = raw.saturating_mul(elemental);
    if let Some(multiplier) = crit {
        damage = damage.saturating_mul(multiplier);
    }
    floor_to_i32(damage)
}

/// How the elemental multiplier reads in the battle log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effectiveness {
    /// Multiplier above 1.0.
    Devastating,
    /// Multiplier exactly 1.0.
    Neutral,
    /// Multiplier below 1.0.
    Weak,
}

impl Effectiveness {
    /// Classify an elemental multiplier.
    #[must_use]
    pub fn from_multiplier(multiplier: Fixed) -> Self {
        if multiplier > Fixed::ONE {
            Effectiveness::Devastating
        } else if multiplier < Fixed::ONE {
            Effectiveness::Weak
        } else {
            Effectiveness::Neutral
        }
    }

    /// Log commentary, if any.
    #[must_use]
    pub const fn commentary(self) -> Option<&'static str> {
        match self {
            Effectiveness::Devastating => Some("The effect was devastating!"),
            Effectiveness::Weak => Some("The effect was weak..."),
            Effectiveness::Neutral => None,
        }
    }
}

/// Roll a percent chance.
///
/// Chances of 0 and 100 or more are decided without consuming a number.
pub fn roll_percent<R: Rng>(rng: &mut R, chance: u32) -> bool {
    match chance {
        0 => false,
        c if c >= 100 => true,
        c => rng.gen_range(0..100) < c,
    }
}

/// Hit chance in percent, or `None` for skills that always hit.
///
/// `skill accuracy + performer accuracy - target evasion`, clamped to `0..=100`.
#[must_use]
pub fn hit_chance(accuracy: Accuracy, performer_accuracy: i32, target_evasion: i32) -> Option<u32> {
    match accuracy {
        Accuracy::AlwaysHits => None,
        Accuracy::Percent(base) => {
            let chance = i64::from(base) + i64::from(performer_accuracy) - i64::from(target_evasion);
            Some(chance.clamp(0, 100) as u32)
        }
    }
}

/// Roll whether an action connects.
pub fn roll_hit<R: Rng>(
    rng: &mut R,
    accuracy: Accuracy,
    performer_accuracy: i32,
    target_evasion: i32,
) -> bool {
    hit_chance(accuracy, performer_accuracy, target_evasion)
        .map_or(true, |chance| roll_percent(rng, chance))
}

/// Roll whether an action is a critical hit.
pub fn roll_crit<R: Rng>(rng: &mut R, crit: i32) -> bool {
    roll_percent(rng, crit.max(0) as u32)
}
