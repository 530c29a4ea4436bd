//! Personality-weighted action selection.
//!
//! A combatant either reaches for one of its skills or falls back to a
//! basic attack. When it reaches for a skill, each affordable skill gets
//! a weight from the personality's preference for its category, boosted
//! for support and utility skills when the combatant is in trouble.

use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::combat::roll_percent;
use crate::combatant::Combatant;
use crate::components::{EffectTarget, Element, SkillCategory};
use crate::data::{Accuracy, Effect, Skill};
use crate::leveling::project;
use crate::ruleset::Ruleset;
use crate::stats::EffectiveStats;

/// Id of the basic attack.
pub const BASIC_ATTACK_ID: &str = "basic_attack";

/// Hp ratio (in percent) below which the combatant counts as in trouble.
pub const LOW_HP_PERCENT: i64 = 40;

/// The parameterless attack every combatant can always use.
#[must_use]
pub fn basic_attack(ruleset: &Ruleset) -> Skill {
    let tunables = ruleset.tunables();
    Skill {
        id: BASIC_ATTACK_ID.to_string(),
        name: "Basic Attack".to_string(),
        element: Element::Neutral,
        category: SkillCategory::Attack,
        mp_cost: 0,
        accuracy: Accuracy::Percent(tunables.basic_attack_accuracy),
        priority: 0,
        effects: vec![Effect::Damage {
            power: tunables.basic_attack_power,
            target: EffectTarget::Opponent,
        }],
    }
}

/// Situational multiplier in percent for a category.
#[must_use]
pub fn situational_percent(category: SkillCategory, stats: &EffectiveStats) -> u32 {
    let in_trouble = i64::from(stats.hp) * 100 < i64::from(stats.max_hp) * LOW_HP_PERCENT;
    match category {
        SkillCategory::Support if in_trouble => 250,
        SkillCategory::Utility if in_trouble => 150,
        _ => 100,
    }
}

/// Pool weight for a skill.
///
/// `preference × situational × 10`, with both factors stored as percents.
#[must_use]
pub fn pool_weight(combatant: &Combatant, skill: &Skill, stats: &EffectiveStats) -> u64 {
    let preference = u64::from(combatant.personality.preference(skill.category));
    let situational = u64::from(situational_percent(skill.category, stats));
    preference * situational / 1000
}

/// Skills the combatant can pay for right now, already projected to their level.
#[must_use]
pub fn affordable_skills(combatant: &Combatant, stats: &EffectiveStats) -> Vec<Skill> {
    combatant
        .skills
        .iter()
        .map(|equipped| project(&equipped.skill, equipped.level))
        .filter(|skill| skill.mp_cost <= stats.mp)
        .collect()
}

/// Choose the skill `performer` uses this action.
///
/// The returned skill is leveled and affordable; the caller pays its cost.
pub fn choose<R: Rng>(
    performer: &Combatant,
    stats: &EffectiveStats,
    ruleset: &Ruleset,
    rng: &mut R,
) -> Skill {
    let candidates = affordable_skills(performer, stats);
    if candidates.is_empty() {
        return basic_attack(ruleset);
    }
    if !roll_percent(rng, ruleset.tunables().skill_choice_percent) {
        return basic_attack(ruleset);
    }

    let weights: Vec<u64> = candidates
        .iter()
        .map(|skill| pool_weight(performer, skill, stats))
        .collect();

    match WeightedIndex::new(&weights) {
        Ok(index) => candidates[index.sample(rng)].clone(),
        Err(err) => {
            tracing::debug!(combatant = %performer.id, %err, "Empty skill pool, choosing uniformly");
            candidates
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| basic_attack(ruleset))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{EquippedSkill, OwnerContext, Personality};
    use crate::components::StatBlock;
    use crate::stats::effective_stats;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn skill(id: &str, category: SkillCategory, mp_cost: i32) -> Skill {
        Skill {
            id: id.to_string(),
            name: id.to_string(),
            element: Element::Neutral,
            category,
            mp_cost,
            accuracy: Accuracy::AlwaysHits,
            priority: 0,
            effects: vec![Effect::Heal {
                percent: 10,
                target: EffectTarget::User,
            }],
        }
    }

    fn caster(mp: i32) -> Combatant {
        Combatant::new("c", "Caster", StatBlock::new(100, 50, 10, 10, 10, 0))
            .with_hp(100)
            .with_mp(mp)
            .with_skill(EquippedSkill::new(skill("mend", SkillCategory::Support, 10)))
            .with_skill(EquippedSkill::new(skill("jab", SkillCategory::Attack, 30)))
    }

    fn stats_of(c: &Combatant) -> EffectiveStats {
        effective_stats(c, &OwnerContext::default(), &Ruleset::default())
    }

    #[test]
    fn test_basic_attack_from_tunables() {
        let attack = basic_attack(&Ruleset::default());
        assert_eq!(attack.mp_cost, 0);
        assert_eq!(attack.accuracy, Accuracy::Percent(100));
        assert_eq!(
            attack.effects,
            vec![Effect::Damage {
                power: 15,
                target: EffectTarget::Opponent
            }]
        );
    }

    #[test]
    fn test_no_mp_means_basic_attack() {
        let ruleset = Ruleset::default();
        let c = caster(0);
        let stats = stats_of(&c);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(choose(&c, &stats, &ruleset, &mut rng).id, BASIC_ATTACK_ID);
        }
    }

    #[test]
    fn test_affordability_uses_leveled_cost() {
        let mut c = caster(20);
        // mend at level 5 costs 10 * 1.2 = 12, still affordable
        c.skills[0].level = 5;
        let names: Vec<_> = affordable_skills(&c, &stats_of(&c))
            .into_iter()
            .map(|s| (s.id, s.mp_cost))
            .collect();
        assert_eq!(names, vec![("mend".to_string(), 12)]);
    }

    #[test]
    fn test_low_hp_boosts_support() {
        let healthy = caster(50);
        let hurt = caster(50).with_hp(39);
        let mend = &healthy.skills[0].skill;

        assert_eq!(pool_weight(&healthy, mend, &stats_of(&healthy)), 10);
        assert_eq!(pool_weight(&hurt, mend, &stats_of(&hurt)), 25);

        let jab = &healthy.skills[1].skill;
        assert_eq!(pool_weight(&hurt, jab, &stats_of(&hurt)), 10);
    }

    #[test]
    fn test_zero_weights_fall_back_to_uniform() {
        let ruleset = Ruleset::default();
        let c = caster(50).with_personality(
            Personality::neutral()
                .with_preference(SkillCategory::Support, 0)
                .with_preference(SkillCategory::Attack, 0),
        );
        let stats = stats_of(&c);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut seen_skill = false;
        for _ in 0..50 {
            let chosen = choose(&c, &stats, &ruleset, &mut rng);
            seen_skill |= chosen.id != BASIC_ATTACK_ID;
        }
        assert!(seen_skill);
    }

    #[test]
    fn test_preference_steers_choice() {
        let ruleset = Ruleset::default();
        let c = caster(50).with_personality(
            Personality::neutral().with_preference(SkillCategory::Attack, 0),
        );
        let stats = stats_of(&c);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            assert_ne!(choose(&c, &stats, &ruleset, &mut rng).id, "jab");
        }
    }
}
