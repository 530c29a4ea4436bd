//! Skill effect resolution.
//!
//! One action is one skill use: an accuracy roll gates the whole effect
//! list, a crit roll flags the action, then every effect runs in order
//! against the performer or its opponent.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{final_damage, raw_damage, roll_crit, roll_hit, roll_percent, Effectiveness};
use crate::combatant::{Combatant, OwnerContext};
use crate::components::EffectTarget;
use crate::data::{Effect, Skill, SpecialLogic, StatDelta};
use crate::math::scale_percent;
use crate::ruleset::Ruleset;
use crate::stats::effective_stats;
use crate::status::activate;

/// A combatant together with the owner context its stats depend on.
#[derive(Debug)]
pub struct Fighter<'a> {
    /// Working copy, mutated in place.
    pub combatant: &'a mut Combatant,
    /// Owner context.
    pub owner: &'a OwnerContext,
}

impl<'a> Fighter<'a> {
    /// Pair a combatant with its owner.
    pub fn new(combatant: &'a mut Combatant, owner: &'a OwnerContext) -> Self {
        Self { combatant, owner }
    }
}

/// What happened during one action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Performer display name.
    pub performer: String,
    /// Skill id.
    pub skill_id: String,
    /// Skill display name.
    pub skill_name: String,
    /// Whether the accuracy roll succeeded.
    pub hit: bool,
    /// Whether the action was a critical hit.
    pub crit: bool,
    /// Total damage dealt by damage effects.
    pub damage_dealt: i32,
    /// Damage the performer took from its own skill.
    pub self_damage: i32,
    /// Hp restored by heal and leech effects.
    pub healed: i32,
    /// Status ids newly attached by this action.
    pub statuses_applied: Vec<String>,
    /// Elemental reading of the first damage effect.
    pub effectiveness: Option<Effectiveness>,
    /// Per-effect narrative fragments.
    pub notes: Vec<String>,
}

impl ActionOutcome {
    /// One narrative line for the battle log.
    #[must_use]
    pub fn narrate(&self) -> String {
        let mut line = format!("{} used {}!", self.performer, self.skill_name);
        if !self.hit {
            line.push_str(" But it missed!");
            return line;
        }
        if self.crit {
            line.push_str(" Critical hit!");
        }
        for note in &self.notes {
            line.push(' ');
            line.push_str(note);
        }
        if let Some(comment) = self.effectiveness.and_then(Effectiveness::commentary) {
            line.push(' ');
            line.push_str(comment);
        }
        line
    }
}

/// Resolve one action: roll accuracy and crit, then apply every effect.
///
/// `skill` must already be leveled and paid for.
pub fn resolve_action<'a, R: Rng>(
    performer: &mut Fighter<'a>,
    opponent: &mut Fighter<'a>,
    skill: &Skill,
    ruleset: &Ruleset,
    rng: &mut R,
) -> ActionOutcome {
    let mut outcome = ActionOutcome {
        performer: performer.combatant.name.clone(),
        skill_id: skill.id.clone(),
        skill_name: skill.name.clone(),
        ..ActionOutcome::default()
    };

    let attacker = effective_stats(performer.combatant, performer.owner, ruleset);
    let defender = effective_stats(opponent.combatant, opponent.owner, ruleset);

    outcome.hit = roll_hit(rng, skill.accuracy, attacker.accuracy, defender.evasion);
    if !outcome.hit {
        tracing::debug!(performer = %outcome.performer, skill = %skill.id, "Action missed");
        return outcome;
    }
    outcome.crit = skill.deals_damage() && roll_crit(rng, attacker.crit);

    for effect in &skill.effects {
        apply_effect(effect, performer, opponent, skill, ruleset, rng, &mut outcome);
    }

    tracing::debug!(
        performer = %outcome.performer,
        skill = %skill.id,
        damage = outcome.damage_dealt,
        crit = outcome.crit,
        "Action resolved"
    );
    outcome
}

fn select<'s, 'a>(
    target: EffectTarget,
    performer: &'s mut Fighter<'a>,
    opponent: &'s mut Fighter<'a>,
) -> &'s mut Fighter<'a> {
    match target {
        EffectTarget::User => performer,
        EffectTarget::Opponent => opponent,
    }
}

fn apply_effect<'a, R: Rng>(
    effect: &Effect,
    performer: &mut Fighter<'a>,
    opponent: &mut Fighter<'a>,
    skill: &Skill,
    ruleset: &Ruleset,
    rng: &mut R,
    outcome: &mut ActionOutcome,
) {
    match effect {
        Effect::Damage { power, target } => {
            let attacker = effective_stats(performer.combatant, performer.owner, ruleset);
            let recipient = select(*target, performer, opponent);
            let defender = effective_stats(recipient.combatant, recipient.owner, ruleset);

            let raw = raw_damage(*power, attacker.attack, defender.defense);
            let elemental = ruleset
                .chart()
                .multiplier(skill.element, &recipient.combatant.elements);
            let crit = outcome.crit.then(|| ruleset.crit_multiplier());
            let damage = final_damage(raw, elemental, crit);

            let hp = recipient.combatant.hp();
            recipient.combatant.current_hp = Some(hp.saturating_sub(damage).max(0));
            outcome.damage_dealt = outcome.damage_dealt.saturating_add(damage);
            if outcome.effectiveness.is_none() {
                outcome.effectiveness = Some(Effectiveness::from_multiplier(elemental));
            }
            outcome
                .notes
                .push(format!("{} takes {} damage.", recipient.combatant.name, damage));
        }
        Effect::ApplyStatus {
            status_id,
            chance,
            target,
        } => {
            if !roll_percent(rng, *chance) {
                return;
            }
            let Some(template) = ruleset.status(status_id) else {
                tracing::warn!(skill = %skill.id, status = %status_id, "Skill applies unknown status");
                return;
            };
            let recipient = select(*target, performer, opponent);
            if recipient.combatant.has_status(status_id) {
                outcome.notes.push(format!(
                    "{} is already {}.",
                    recipient.combatant.name, template.name
                ));
                return;
            }
            recipient.combatant.statuses.push(activate(template, rng));
            outcome.statuses_applied.push(status_id.clone());
            outcome.notes.push(format!(
                "{} is now {}!",
                recipient.combatant.name, template.name
            ));
        }
        Effect::StatChange {
            changes,
            chance,
            target,
        } => {
            if !roll_percent(rng, *chance) {
                return;
            }
            let recipient = select(*target, performer, opponent);
            for StatDelta { stat, amount } in changes {
                recipient.combatant.modifiers.accumulate(*stat, *amount);
                let verb = if *amount < 0 { "fell" } else { "rose" };
                outcome.notes.push(format!(
                    "{}'s {} {} by {}.",
                    recipient.combatant.name,
                    stat,
                    verb,
                    amount.unsigned_abs()
                ));
            }
        }
        Effect::Heal { percent, target } => {
            let recipient = select(*target, performer, opponent);
            let max_hp = effective_stats(recipient.combatant, recipient.owner, ruleset).max_hp;
            let restored = restore_hp(recipient, scale_percent(max_hp, *percent), ruleset);
            outcome.healed = outcome.healed.saturating_add(restored);
            outcome.notes.push(format!(
                "{} recovers {} hp.",
                recipient.combatant.name, restored
            ));
        }
        Effect::Leech { percent } => {
            let restored = restore_hp(performer, scale_percent(outcome.damage_dealt, *percent), ruleset);
            outcome.healed = outcome.healed.saturating_add(restored);
            if restored > 0 {
                outcome.notes.push(format!(
                    "{} drains {} hp.",
                    performer.combatant.name, restored
                ));
            }
        }
        Effect::Special { logic_id, params } => match SpecialLogic::parse(logic_id, params) {
            SpecialLogic::Recoil { recoil_percent } => {
                let recoil = scale_percent(outcome.damage_dealt, recoil_percent).max(0);
                let hp = performer.combatant.hp();
                performer.combatant.current_hp = Some(hp.saturating_sub(recoil).max(0));
                outcome.self_damage = outcome.self_damage.saturating_add(recoil);
                if recoil > 0 {
                    outcome.notes.push(format!(
                        "{} is hurt by recoil for {} damage.",
                        performer.combatant.name, recoil
                    ));
                }
            }
            SpecialLogic::Unrecognized(id) => {
                tracing::warn!(skill = %skill.id, logic = %id, "Unrecognized special effect");
                outcome
                    .notes
                    .push(format!("{} has an unrecognized special effect '{}'.", skill.name, id));
            }
        },
    }
}

/// Add hp up to the effective maximum; returns the amount actually restored.
fn restore_hp(fighter: &mut Fighter<'_>, amount: i32, ruleset: &Ruleset) -> i32 {
    let max_hp = effective_stats(fighter.combatant, fighter.owner, ruleset).max_hp;
    let before = fighter.combatant.hp();
    let after = before.saturating_add(amount.max(0)).min(max_hp).max(before);
    fighter.combatant.current_hp = Some(after);
    after - before
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::components::{Element, ModStat, SkillCategory, StatBlock};
    use crate::data::Accuracy;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn skill(element: Element, effects: Vec<Effect>) -> Skill {
        Skill {
            id: "test".to_string(),
            name: "Test Move".to_string(),
            element,
            category: SkillCategory::Attack,
            mp_cost: 0,
            accuracy: Accuracy::AlwaysHits,
            priority: 0,
            effects,
        }
    }

    fn damage(power: i32) -> Effect {
        Effect::Damage {
            power,
            target: EffectTarget::Opponent,
        }
    }

    fn attacker() -> Combatant {
        Combatant::new("a", "Attacker", StatBlock::new(100, 20, 20, 10, 10, 0)).with_hp(100)
    }

    fn defender() -> Combatant {
        Combatant::new("d", "Defender", StatBlock::new(100, 20, 10, 10, 5, 0)).with_hp(100)
    }

    fn run(a: &mut Combatant, d: &mut Combatant, skill: &Skill, seed: u64) -> ActionOutcome {
        let owner = OwnerContext::default();
        let ruleset = Ruleset::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        resolve_action(
            &mut Fighter::new(a, &owner),
            &mut Fighter::new(d, &owner),
            skill,
            &ruleset,
            &mut rng,
        )
    }

    #[test]
    fn test_plain_damage() {
        let (mut a, mut d) = (attacker(), defender());
        let outcome = run(&mut a, &mut d, &skill(Element::Neutral, vec![damage(15)]), 1);
        assert!(outcome.hit);
        assert_eq!(outcome.damage_dealt, 17);
        assert_eq!(d.hp(), 83);
        assert_eq!(outcome.effectiveness, Some(Effectiveness::Neutral));
        assert_eq!(
            outcome.narrate(),
            "Attacker used Test Move! Defender takes 17 damage."
        );
    }

    #[test]
    fn test_elemental_advantage() {
        let (mut a, mut d) = (attacker(), defender().with_elements(&[Element::Wood]));
        let outcome = run(&mut a, &mut d, &skill(Element::Fire, vec![damage(15)]), 1);
        assert_eq!(outcome.damage_dealt, 34);
        assert!(outcome.narrate().ends_with("The effect was devastating!"));
    }

    #[test]
    fn test_miss_skips_every_effect() {
        let (mut a, mut d) = (attacker(), defender());
        let mut s = skill(Element::Neutral, vec![damage(15)]);
        s.accuracy = Accuracy::Percent(0);
        let outcome = run(&mut a, &mut d, &s, 1);
        assert!(!outcome.hit);
        assert_eq!(d.hp(), 100);
        assert!(outcome.narrate().ends_with("But it missed!"));
    }

    #[test]
    fn test_recoil_uses_damage_this_action() {
        let mut params = BTreeMap::new();
        params.insert("recoil_percent".to_string(), 50);
        let s = skill(
            Element::Neutral,
            vec![
                damage(15),
                Effect::Special {
                    logic_id: "recoil".to_string(),
                    params,
                },
            ],
        );
        let (mut a, mut d) = (attacker(), defender());
        let outcome = run(&mut a, &mut d, &s, 1);
        assert_eq!(outcome.self_damage, 8);
        assert_eq!(a.hp(), 92);
    }

    #[test]
    fn test_unknown_special_is_noop() {
        let s = skill(
            Element::Neutral,
            vec![Effect::Special {
                logic_id: "summon".to_string(),
                params: BTreeMap::new(),
            }],
        );
        let (mut a, mut d) = (attacker(), defender());
        let outcome = run(&mut a, &mut d, &s, 1);
        assert_eq!((a.hp(), d.hp()), (100, 100));
        assert!(outcome.notes[0].contains("unrecognized special effect 'summon'"));
    }

    #[test]
    fn test_status_not_stacked() {
        let s = skill(
            Element::Neutral,
            vec![Effect::ApplyStatus {
                status_id: "poison".to_string(),
                chance: 100,
                target: EffectTarget::Opponent,
            }],
        );
        let (mut a, mut d) = (attacker(), defender());
        let first = run(&mut a, &mut d, &s, 1);
        let second = run(&mut a, &mut d, &s, 2);
        assert_eq!(first.statuses_applied, vec!["poison".to_string()]);
        assert!(second.statuses_applied.is_empty());
        assert_eq!(d.statuses.len(), 1);
        assert!((2..=4).contains(&d.statuses[0].remaining));
    }

    #[test]
    fn test_stat_change_targets_user() {
        let s = skill(
            Element::Neutral,
            vec![Effect::StatChange {
                changes: vec![
                    StatDelta {
                        stat: ModStat::Defense,
                        amount: 5,
                    },
                    StatDelta {
                        stat: ModStat::Speed,
                        amount: -2,
                    },
                ],
                chance: 100,
                target: EffectTarget::User,
            }],
        );
        let (mut a, mut d) = (attacker(), defender());
        let outcome = run(&mut a, &mut d, &s, 1);
        assert_eq!(a.modifiers.defense, 5);
        assert_eq!(a.modifiers.speed, -2);
        assert!(d.modifiers.is_zero());
        assert_eq!(outcome.notes[1], "Attacker's speed fell by 2.");
    }

    #[test]
    fn test_heal_and_leech_capped() {
        let s = skill(
            Element::Neutral,
            vec![
                damage(15),
                Effect::Leech { percent: 100 },
                Effect::Heal {
                    percent: 50,
                    target: EffectTarget::User,
                },
            ],
        );
        let mut a = attacker().with_hp(70);
        let mut d = defender();
        let outcome = run(&mut a, &mut d, &s, 1);
        // leech restores 17 (87), heal restores the remaining 13
        assert_eq!(a.hp(), 100);
        assert_eq!(outcome.healed, 30);
    }

    #[test]
    fn test_crit_applies_multiplier() {
        let mut a = attacker();
        a.base.crit = 100;
        // crit is capped at 50, so scan seeds until one crits
        let outcome = (0..64)
            .map(|seed| run(&mut a, &mut defender(), &skill(Element::Neutral, vec![damage(15)]), seed))
            .find(|o| o.crit)
            .unwrap();
        assert_eq!(outcome.damage_dealt, 25);
        assert!(outcome.narrate().contains("Critical hit!"));
    }
}
