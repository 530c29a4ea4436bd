//! Shared value types for combatants, skills and rulesets.
//!
//! Everything here is plain data. Enumerations are closed: unknown
//! element, category or rarity names are rejected when data is loaded.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Classification enums
// ============================================================================

/// Elemental affinity of a monster or a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Element {
    /// No affinity. Never appears in the advantage chart by default.
    #[default]
    Neutral,
    /// Fire.
    Fire,
    /// Water.
    Water,
    /// Earth.
    Earth,
    /// Wind.
    Wind,
    /// Wood.
    Wood,
    /// Metal.
    Metal,
    /// Electric.
    Electric,
    /// Ice.
    Ice,
    /// Light.
    Light,
    /// Dark.
    Dark,
    /// Poison.
    Poison,
}

impl Element {
    /// All elements in declaration order.
    pub const ALL: [Element; 12] = [
        Element::Neutral,
        Element::Fire,
        Element::Water,
        Element::Earth,
        Element::Wind,
        Element::Wood,
        Element::Metal,
        Element::Electric,
        Element::Ice,
        Element::Light,
        Element::Dark,
        Element::Poison,
    ];
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Skill category. Personalities weight action selection per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum SkillCategory {
    /// Direct physical offense.
    #[default]
    Attack,
    /// Elemental or magical offense.
    Magic,
    /// Guarding and damage mitigation.
    Defense,
    /// Healing and buffs. Favored at low hp.
    Support,
    /// Debuffs and tricks. Mildly favored at low hp.
    Utility,
}

/// Rarity tier of a monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Rarity {
    /// Common.
    #[default]
    Common,
    /// Uncommon.
    Uncommon,
    /// Rare.
    Rare,
    /// Epic.
    Epic,
    /// Legendary.
    Legendary,
}

/// Stats that can be shifted by temporary modifiers and status effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModStat {
    /// Attack.
    Attack,
    /// Defense.
    Defense,
    /// Speed.
    Speed,
    /// Critical hit chance (percent).
    Crit,
    /// Accuracy bonus (percent points).
    Accuracy,
    /// Evasion bonus (percent points).
    Evasion,
}

impl fmt::Display for ModStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModStat::Attack => "attack",
            ModStat::Defense => "defense",
            ModStat::Speed => "speed",
            ModStat::Crit => "crit",
            ModStat::Accuracy => "accuracy",
            ModStat::Evasion => "evasion",
        };
        f.write_str(name)
    }
}

/// Who an effect lands on, relative to the performer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EffectTarget {
    /// The combatant using the skill.
    User,
    /// The opposing combatant.
    #[default]
    Opponent,
}

// ============================================================================
// Stat blocks
// ============================================================================

/// A full set of persisted stats.
///
/// Used for base stats, cultivation gains and title buffs alike; missing
/// fields in data files default to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    /// Maximum hit points.
    pub hp: i32,
    /// Maximum magic points.
    pub mp: i32,
    /// Attack.
    pub attack: i32,
    /// Defense.
    pub defense: i32,
    /// Speed.
    pub speed: i32,
    /// Critical hit chance (percent).
    pub crit: i32,
}

impl StatBlock {
    /// Create a stat block.
    #[must_use]
    pub const fn new(hp: i32, mp: i32, attack: i32, defense: i32, speed: i32, crit: i32) -> Self {
        Self {
            hp,
            mp,
            attack,
            defense,
            speed,
            crit,
        }
    }
}

impl std::ops::Add for StatBlock {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            hp: self.hp.saturating_add(rhs.hp),
            mp: self.mp.saturating_add(rhs.mp),
            attack: self.attack.saturating_add(rhs.attack),
            defense: self.defense.saturating_add(rhs.defense),
            speed: self.speed.saturating_add(rhs.speed),
            crit: self.crit.saturating_add(rhs.crit),
        }
    }
}

/// Additive deltas over the modifiable stats.
///
/// Serves both as a combatant's temporary in-battle modifiers and as
/// a status template's stat deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatDeltas {
    /// Attack delta.
    pub attack: i32,
    /// Defense delta.
    pub defense: i32,
    /// Speed delta.
    pub speed: i32,
    /// Crit delta.
    pub crit: i32,
    /// Accuracy delta.
    pub accuracy: i32,
    /// Evasion delta.
    pub evasion: i32,
}

impl StatDeltas {
    /// Read one stat.
    #[must_use]
    pub const fn get(&self, stat: ModStat) -> i32 {
        match stat {
            ModStat::Attack => self.attack,
            ModStat::Defense => self.defense,
            ModStat::Speed => self.speed,
            ModStat::Crit => self.crit,
            ModStat::Accuracy => self.accuracy,
            ModStat::Evasion => self.evasion,
        }
    }

    /// Accumulate `amount` into one stat.
    pub fn accumulate(&mut self, stat: ModStat, amount: i32) {
        let slot = match stat {
            ModStat::Attack => &mut self.attack,
            ModStat::Defense => &mut self.defense,
            ModStat::Speed => &mut self.speed,
            ModStat::Crit => &mut self.crit,
            ModStat::Accuracy => &mut self.accuracy,
            ModStat::Evasion => &mut self.evasion,
        };
        *slot = slot.saturating_add(amount);
    }

    /// Whether every delta is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_block_addition() {
        let base = StatBlock::new(100, 30, 20, 10, 8, 5);
        let gains = StatBlock::new(10, 0, 2, 1, 0, 0);
        let total = base + gains;
        assert_eq!(total, StatBlock::new(110, 30, 22, 11, 8, 5));
    }

    #[test]
    fn test_stat_deltas_accumulate() {
        let mut deltas = StatDeltas::default();
        assert!(deltas.is_zero());

        deltas.accumulate(ModStat::Attack, 5);
        deltas.accumulate(ModStat::Attack, -2);
        deltas.accumulate(ModStat::Evasion, 10);

        assert_eq!(deltas.get(ModStat::Attack), 3);
        assert_eq!(deltas.get(ModStat::Evasion), 10);
        assert_eq!(deltas.get(ModStat::Speed), 0);
        assert!(!deltas.is_zero());
    }

    #[test]
    fn test_unknown_element_rejected() {
        let parsed: Result<Element, _> = ron::from_str("Plasma");
        assert!(parsed.is_err());
        let parsed: Element = ron::from_str("Fire").unwrap();
        assert_eq!(parsed, Element::Fire);
    }
}
