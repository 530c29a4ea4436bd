//! Combatant snapshots and in-battle working state.
//!
//! Callers hand the simulator an [`Entrant`] per side. The simulator
//! clones it into a private working copy, so nothing here is ever
//! mutated behind the caller's back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::{Element, Rarity, SkillCategory, StatBlock, StatDeltas};
use crate::data::Skill;

/// Personality: a name plus per-category action preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    /// Personality name (e.g. "Reckless").
    pub name: String,
    /// Preference weight per category in percent (`100` = weight 1.0).
    #[serde(default)]
    pub skill_preferences: BTreeMap<SkillCategory, u32>,
}

/// Weight applied to categories a personality does not mention.
pub const DEFAULT_PREFERENCE_PERCENT: u32 = 100;

impl Personality {
    /// A personality with no preferences.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            name: "Neutral".to_string(),
            skill_preferences: BTreeMap::new(),
        }
    }

    /// Builder method to set one preference.
    #[must_use]
    pub fn with_preference(mut self, category: SkillCategory, percent: u32) -> Self {
        self.skill_preferences.insert(category, percent);
        self
    }

    /// Preference weight for a category, in percent.
    #[must_use]
    pub fn preference(&self, category: SkillCategory) -> u32 {
        self.skill_preferences
            .get(&category)
            .copied()
            .unwrap_or(DEFAULT_PREFERENCE_PERCENT)
    }
}

impl Default for Personality {
    fn default() -> Self {
        Self::neutral()
    }
}

/// A skill slot with its training level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedSkill {
    /// Skill definition at level 1.
    pub skill: Skill,
    /// Skill level; values below 1 behave as 1.
    #[serde(default = "default_level")]
    pub level: u32,
}

const fn default_level() -> u32 {
    1
}

impl EquippedSkill {
    /// Equip a skill at level 1.
    #[must_use]
    pub fn new(skill: Skill) -> Self {
        Self { skill, level: 1 }
    }

    /// Builder method to set the level.
    #[must_use]
    pub fn at_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }
}

/// A status effect currently attached to a combatant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActiveStatus {
    /// Template id.
    pub id: String,
    /// Display name copied from the template.
    pub name: String,
    /// Owner turn-starts left, including the next one.
    pub remaining: u32,
}

/// Win/loss tally carried through a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Tally {
    /// Battles won.
    pub wins: u32,
    /// Battles lost.
    pub losses: u32,
}

/// One monster as it enters, fights and leaves a battle.
///
/// # Example RON
///
/// ```ron
/// Combatant(
///     id: "m-001",
///     name: "Emberfang",
///     elements: [Fire],
///     base: (hp: 120, mp: 40, attack: 22, defense: 12, speed: 14, crit: 10),
///     skills: [(skill: (id: "bite", name: "Bite", effects: [Damage(power: 30)]))],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    /// Persistent identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Elemental affinities; multi-element monsters list several.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Rarity tier.
    #[serde(default)]
    pub rarity: Rarity,
    /// Monster level.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Action preferences.
    #[serde(default)]
    pub personality: Personality,
    /// Base stats.
    pub base: StatBlock,
    /// Permanent growth earned outside battle.
    #[serde(default)]
    pub cultivation: StatBlock,
    /// Temporary in-battle modifiers. Reset at the start of every battle.
    #[serde(default)]
    pub modifiers: StatDeltas,
    /// Current hp; `None` means full.
    #[serde(default)]
    pub current_hp: Option<i32>,
    /// Current mp; `None` means full.
    #[serde(default)]
    pub current_mp: Option<i32>,
    /// Equipped skills.
    #[serde(default)]
    pub skills: Vec<EquippedSkill>,
    /// Statuses carried into (or acquired during) battle.
    #[serde(default)]
    pub statuses: Vec<ActiveStatus>,
    /// Career record.
    #[serde(default)]
    pub record: Tally,
}

impl Combatant {
    /// Create a combatant with the given base stats and nothing else.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, base: StatBlock) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            elements: Vec::new(),
            rarity: Rarity::Common,
            level: 1,
            personality: Personality::neutral(),
            base,
            cultivation: StatBlock::default(),
            modifiers: StatDeltas::default(),
            current_hp: None,
            current_mp: None,
            skills: Vec::new(),
            statuses: Vec::new(),
            record: Tally::default(),
        }
    }

    /// Builder method to set elements.
    #[must_use]
    pub fn with_elements(mut self, elements: &[Element]) -> Self {
        self.elements = elements.to_vec();
        self
    }

    /// Builder method to equip a skill.
    #[must_use]
    pub fn with_skill(mut self, skill: EquippedSkill) -> Self {
        self.skills.push(skill);
        self
    }

    /// Builder method to set the personality.
    #[must_use]
    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    /// Builder method to set the current hp.
    #[must_use]
    pub fn with_hp(mut self, hp: i32) -> Self {
        self.current_hp = Some(hp);
        self
    }

    /// Builder method to set the current mp.
    #[must_use]
    pub fn with_mp(mut self, mp: i32) -> Self {
        self.current_mp = Some(mp);
        self
    }

    /// Current hp (zero if never set and max is zero).
    #[must_use]
    pub fn hp(&self) -> i32 {
        self.current_hp.unwrap_or(0)
    }

    /// Current mp.
    #[must_use]
    pub fn mp(&self) -> i32 {
        self.current_mp.unwrap_or(0)
    }

    /// Whether this combatant is knocked out.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.hp() <= 0
    }

    /// Whether a status with this id is active.
    #[must_use]
    pub fn has_status(&self, id: &str) -> bool {
        self.statuses.iter().any(|s| s.id == id)
    }

    /// Comma separated active status ids, or `none`.
    #[must_use]
    pub fn condition(&self) -> String {
        if self.statuses.is_empty() {
            "none".to_string()
        } else {
            self.statuses
                .iter()
                .map(|s| s.id.as_str())
                .collect::<Vec<_>>()
                .join(",")
        }
    }
}

/// Title bonus equipped by the owning player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleBuff {
    /// Title name.
    pub name: String,
    /// Stat bonus granted to the owner's monsters.
    #[serde(default)]
    pub bonus: StatBlock,
}

/// What the simulator needs to know about a combatant's owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerContext {
    /// Owner account id.
    #[serde(default)]
    pub owner_id: String,
    /// Equipped title, if any.
    #[serde(default)]
    pub title: Option<TitleBuff>,
}

impl OwnerContext {
    /// Title stat bonus, or zeros.
    #[must_use]
    pub fn title_bonus(&self) -> StatBlock {
        self.title.as_ref().map(|t| t.bonus).unwrap_or_default()
    }
}

/// One side's input to a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    /// The monster.
    pub combatant: Combatant,
    /// Its owner.
    #[serde(default)]
    pub owner: OwnerContext,
}

impl Entrant {
    /// An entrant without an owner title.
    #[must_use]
    pub fn new(combatant: Combatant) -> Self {
        Self {
            combatant,
            owner: OwnerContext::default(),
        }
    }

    /// Builder method to set the owner context.
    #[must_use]
    pub fn with_owner(mut self, owner: OwnerContext) -> Self {
        self.owner = owner;
        self
    }
}
