//! Test fixtures and helpers.
//!
//! Pre-built combatants, skills and rulesets for consistent testing.

use std::collections::BTreeMap;

use arena_core::combatant::{Combatant, Entrant, EquippedSkill, OwnerContext, Personality, TitleBuff};
use arena_core::components::{EffectTarget, Element, ModStat, Rarity, SkillCategory, StatBlock};
use arena_core::data::{
    Accuracy, DurationSpec, Effect, RulesetData, Skill, StatDelta, StatusTemplate,
};
use arena_core::ruleset::{standard_ruleset_data, Ruleset};
use fixed::types::I32F32;
use serde::de::DeserializeOwned;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Parse a RON snippet, panicking with the parse error on failure.
///
/// # Panics
///
/// Panics if `src` is not valid RON for `T`.
#[must_use]
pub fn from_ron<T: DeserializeOwned>(src: &str) -> T {
    match ron::from_str(src) {
        Ok(value) => value,
        Err(err) => panic!("fixture RON failed to parse: {err}"),
    }
}

/// The built-in standard ruleset.
#[must_use]
pub fn standard_ruleset() -> Ruleset {
    Ruleset::default()
}

/// The standard ruleset with a different turn cap.
///
/// # Panics
///
/// Panics if `max_turns` is zero.
#[must_use]
pub fn ruleset_with_turns(max_turns: u32) -> Ruleset {
    let mut data = standard_ruleset_data();
    data.tunables.max_turns = max_turns;
    Ruleset::from_data(data).unwrap_or_else(|err| panic!("fixture ruleset rejected: {err}"))
}

/// A ruleset with no elemental chart and only the given statuses.
///
/// # Panics
///
/// Panics if two statuses share an id.
#[must_use]
pub fn bare_ruleset(statuses: Vec<StatusTemplate>) -> Ruleset {
    let data = RulesetData {
        name: "fixture".to_string(),
        elemental_chart: Vec::new(),
        statuses,
        tunables: Default::default(),
    };
    Ruleset::from_data(data).unwrap_or_else(|err| panic!("fixture ruleset rejected: {err}"))
}

/// A status that changes hp every turn for a fixed number of turns.
#[must_use]
pub fn drain_status(id: &str, hp_per_turn: i32, turns: u32) -> StatusTemplate {
    StatusTemplate {
        id: id.to_string(),
        name: id.to_string(),
        hp_per_turn: Some(hp_per_turn),
        mp_per_turn: None,
        skip_turn_chance: None,
        stat_deltas: Default::default(),
        duration: DurationSpec::Turns(turns),
    }
}

/// A single-target damage effect.
#[must_use]
pub fn strike(power: i32) -> Effect {
    Effect::Damage {
        power,
        target: EffectTarget::Opponent,
    }
}

/// Build a skill.
#[must_use]
pub fn skill(
    id: &str,
    element: Element,
    category: SkillCategory,
    mp_cost: i32,
    effects: Vec<Effect>,
) -> Skill {
    Skill {
        id: id.to_string(),
        name: title_case(id),
        element,
        category,
        mp_cost,
        accuracy: Accuracy::Percent(95),
        priority: 0,
        effects,
    }
}

fn title_case(id: &str) -> String {
    id.split('_')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A varied skill catalog covering every effect kind.
#[must_use]
pub fn sample_skills() -> Vec<Skill> {
    let mut recoil = BTreeMap::new();
    recoil.insert("recoil_percent".to_string(), 25);

    vec![
        skill(
            "flame_fang",
            Element::Fire,
            SkillCategory::Attack,
            8,
            vec![
                strike(40),
                Effect::ApplyStatus {
                    status_id: "burn".to_string(),
                    chance: 20,
                    target: EffectTarget::Opponent,
                },
            ],
        ),
        skill("tidal_crash", Element::Water, SkillCategory::Magic, 12, vec![strike(55)]),
        skill(
            "mend",
            Element::Light,
            SkillCategory::Support,
            10,
            vec![Effect::Heal {
                percent: 30,
                target: EffectTarget::User,
            }],
        ),
        skill(
            "war_cry",
            Element::Neutral,
            SkillCategory::Defense,
            6,
            vec![Effect::StatChange {
                changes: vec![
                    StatDelta {
                        stat: ModStat::Attack,
                        amount: 5,
                    },
                    StatDelta {
                        stat: ModStat::Defense,
                        amount: 3,
                    },
                ],
                chance: 100,
                target: EffectTarget::User,
            }],
        ),
        skill(
            "venom_spit",
            Element::Poison,
            SkillCategory::Attack,
            5,
            vec![
                strike(20),
                Effect::ApplyStatus {
                    status_id: "poison".to_string(),
                    chance: 50,
                    target: EffectTarget::Opponent,
                },
            ],
        ),
        skill(
            "reckless_charge",
            Element::Earth,
            SkillCategory::Attack,
            4,
            vec![
                strike(70),
                Effect::Special {
                    logic_id: "recoil".to_string(),
                    params: recoil,
                },
            ],
        ),
        skill(
            "blinding_flash",
            Element::Light,
            SkillCategory::Utility,
            7,
            vec![Effect::ApplyStatus {
                status_id: "blind".to_string(),
                chance: 80,
                target: EffectTarget::Opponent,
            }],
        ),
        skill(
            "leech_bite",
            Element::Dark,
            SkillCategory::Attack,
            6,
            vec![strike(30), Effect::Leech { percent: 50 }],
        ),
    ]
}

fn equipped(ids: &[&str]) -> Vec<EquippedSkill> {
    sample_skills()
        .into_iter()
        .filter(|s| ids.contains(&s.id.as_str()))
        .map(EquippedSkill::new)
        .collect()
}

/// A plain combatant with no skills.
#[must_use]
pub fn basic_fighter(id: &str, hp: i32, attack: i32, defense: i32, speed: i32) -> Combatant {
    Combatant::new(id, title_case(id), StatBlock::new(hp, 0, attack, defense, speed, 0))
}

/// Sturdy physical attacker.
#[must_use]
pub fn brawler(id: &str) -> Combatant {
    let mut c = Combatant::new(id, "Brawler", StatBlock::new(140, 30, 24, 14, 10, 10))
        .with_elements(&[Element::Earth])
        .with_personality(
            Personality::neutral()
                .with_preference(SkillCategory::Attack, 200)
                .with_preference(SkillCategory::Support, 50),
        );
    c.rarity = Rarity::Uncommon;
    c.skills = equipped(&["reckless_charge", "war_cry", "leech_bite"]);
    c
}

/// Fragile magic user with healing.
#[must_use]
pub fn caster(id: &str) -> Combatant {
    let mut c = Combatant::new(id, "Caster", StatBlock::new(95, 60, 18, 9, 14, 15))
        .with_elements(&[Element::Water, Element::Light])
        .with_personality(
            Personality::neutral()
                .with_preference(SkillCategory::Magic, 200)
                .with_preference(SkillCategory::Support, 150),
        );
    c.rarity = Rarity::Rare;
    c.skills = equipped(&["tidal_crash", "mend", "blinding_flash"]);
    c
}

/// Fast poisoner.
#[must_use]
pub fn skirmisher(id: &str) -> Combatant {
    let mut c = Combatant::new(id, "Skirmisher", StatBlock::new(105, 40, 20, 10, 18, 20))
        .with_elements(&[Element::Poison]);
    c.skills = equipped(&["venom_spit", "flame_fang"]);
    c
}

/// An owner context with a title bonus.
#[must_use]
pub fn titled_owner(owner_id: &str, bonus: StatBlock) -> OwnerContext {
    OwnerContext {
        owner_id: owner_id.to_string(),
        title: Some(TitleBuff {
            name: "Champion".to_string(),
            bonus,
        }),
    }
}

/// Wrap a combatant as an entrant without owner title.
#[must_use]
pub fn entrant(combatant: Combatant) -> Entrant {
    Entrant::new(combatant)
}
