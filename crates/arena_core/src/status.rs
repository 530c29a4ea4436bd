//! Status effect lifecycle.
//!
//! Statuses tick at the start of their owner's turn, in the order they
//! were applied. Each tick may skip the owner's action, drain or restore
//! hp/mp, and then counts the status down by one.

use rand::Rng;

use crate::combat::roll_percent;
use crate::combatant::{ActiveStatus, Combatant, OwnerContext};
use crate::data::{DurationSpec, StatusTemplate, PERSISTENT_DURATION};
use crate::ruleset::Ruleset;
use crate::stats::max_pools;

/// Result of one start-of-turn status pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTick {
    /// Whether any status took the owner's action this turn.
    pub skip_turn: bool,
    /// Narrative lines, in processing order.
    pub lines: Vec<String>,
}

/// Sample how long a freshly applied status lasts.
///
/// Ranges are sampled once, inclusive. An inverted range cannot be
/// sampled and falls back to [`PERSISTENT_DURATION`].
pub fn sample_duration<R: Rng>(spec: DurationSpec, rng: &mut R) -> u32 {
    match spec {
        DurationSpec::Turns(turns) => turns,
        DurationSpec::Range { min, max } if min <= max => rng.gen_range(min..=max),
        DurationSpec::Range { min, max } => {
            tracing::warn!(min, max, "Inverted status duration range, treating as persistent");
            PERSISTENT_DURATION
        }
        DurationSpec::Persistent => PERSISTENT_DURATION,
    }
}

/// Instantiate a template on a combatant.
pub fn activate<R: Rng>(template: &StatusTemplate, rng: &mut R) -> ActiveStatus {
    ActiveStatus {
        id: template.id.clone(),
        name: template.name.clone(),
        remaining: sample_duration(template.duration, rng),
    }
}

/// Advance every status on `combatant` by one owner turn.
///
/// Per status: skip roll, hp delta, mp delta, then countdown. Hp and mp
/// are kept within `0..=max`. A status whose template is missing from
/// the ruleset does nothing but still counts down.
pub fn start_of_turn<R: Rng>(
    combatant: &mut Combatant,
    owner: &OwnerContext,
    ruleset: &Ruleset,
    rng: &mut R,
) -> StatusTick {
    let (max_hp, max_mp) = max_pools(combatant, owner);
    let mut tick = StatusTick::default();
    let mut kept = Vec::with_capacity(combatant.statuses.len());

    for mut status in std::mem::take(&mut combatant.statuses) {
        match ruleset.status(&status.id) {
            Some(template) => {
                if let Some(chance) = template.skip_turn_chance {
                    if roll_percent(rng, chance) {
                        tick.skip_turn = true;
                        tick.lines.push(format!(
                            "{} is {} and cannot act!",
                            combatant.name, status.name
                        ));
                    }
                }

                if let Some(delta) = template.hp_per_turn.filter(|d| *d != 0) {
                    let before = combatant.hp();
                    let after = before.saturating_add(delta).clamp(0, max_hp);
                    combatant.current_hp = Some(after);
                    tick.lines.push(describe_change(
                        &combatant.name,
                        &status.name,
                        after - before,
                        "hp",
                    ));
                }

                if let Some(delta) = template.mp_per_turn.filter(|d| *d != 0) {
                    let before = combatant.mp();
                    let after = before.saturating_add(delta).clamp(0, max_mp);
                    combatant.current_mp = Some(after);
                    tick.lines.push(describe_change(
                        &combatant.name,
                        &status.name,
                        after - before,
                        "mp",
                    ));
                }
            }
            None => {
                tracing::warn!(status = %status.id, combatant = %combatant.id, "Unknown status template");
            }
        }

        if status.remaining > 1 {
            status.remaining -= 1;
            kept.push(status);
        } else {
            tick.lines
                .push(format!("{} is no longer {}.", combatant.name, status.name));
        }
    }

    combatant.statuses = kept;
    tick
}

fn describe_change(who: &str, cause: &str, delta: i32, pool: &str) -> String {
    if delta < 0 {
        format!("{who} loses {} {pool} from being {cause}.", -delta)
    } else {
        format!("{who} recovers {delta} {pool} from being {cause}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{StatBlock, StatDeltas};
    use crate::data::RulesetData;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn drain_template(id: &str, hp: i32, duration: DurationSpec) -> StatusTemplate {
        StatusTemplate {
            id: id.to_string(),
            name: id.to_string(),
            hp_per_turn: Some(hp),
            mp_per_turn: None,
            skip_turn_chance: None,
            stat_deltas: StatDeltas::default(),
            duration,
        }
    }

    fn ruleset_with(statuses: Vec<StatusTemplate>) -> Ruleset {
        Ruleset::from_data(RulesetData {
            name: "test".to_string(),
            elemental_chart: Vec::new(),
            statuses,
            tunables: Default::default(),
        })
        .unwrap()
    }

    fn victim() -> Combatant {
        Combatant::new("v", "Victim", StatBlock::new(50, 10, 10, 10, 10, 0))
            .with_hp(20)
            .with_mp(10)
    }

    #[test]
    fn test_poison_ticks_then_expires() {
        let ruleset = ruleset_with(vec![drain_template("poison", -5, DurationSpec::Turns(2))]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut c = victim();
        c.statuses
            .push(activate(ruleset.status("poison").unwrap(), &mut rng));

        let first = start_of_turn(&mut c, &OwnerContext::default(), &ruleset, &mut rng);
        assert!(!first.skip_turn);
        assert_eq!(c.hp(), 15);
        assert_eq!(c.statuses[0].remaining, 1);

        let second = start_of_turn(&mut c, &OwnerContext::default(), &ruleset, &mut rng);
        assert_eq!(c.hp(), 10);
        assert!(c.statuses.is_empty());
        assert_eq!(second.lines.last().unwrap(), "Victim is no longer poison.");
    }

    #[test]
    fn test_drain_cannot_go_below_zero() {
        let ruleset = ruleset_with(vec![drain_template("acid", -50, DurationSpec::Turns(3))]);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut c = victim();
        c.statuses.push(ActiveStatus {
            id: "acid".to_string(),
            name: "Corroded".to_string(),
            remaining: 3,
        });
        start_of_turn(&mut c, &OwnerContext::default(), &ruleset, &mut rng);
        assert_eq!(c.hp(), 0);
        assert!(c.is_defeated());
    }

    #[test]
    fn test_regen_capped_at_max() {
        let ruleset = ruleset_with(vec![drain_template("regen", 100, DurationSpec::Turns(3))]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut c = victim();
        c.statuses.push(ActiveStatus {
            id: "regen".to_string(),
            name: "Regenerating".to_string(),
            remaining: 3,
        });
        start_of_turn(&mut c, &OwnerContext::default(), &ruleset, &mut rng);
        assert_eq!(c.hp(), 50);
    }

    #[test]
    fn test_certain_skip_sets_flag() {
        let ruleset = Ruleset::default();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut c = victim();
        c.statuses
            .push(activate(ruleset.status("stun").unwrap(), &mut rng));

        let tick = start_of_turn(&mut c, &OwnerContext::default(), &ruleset, &mut rng);
        assert!(tick.skip_turn);
        assert!(c.statuses.is_empty());
    }

    #[test]
    fn test_unknown_status_counts_down() {
        let ruleset = Ruleset::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut c = victim();
        c.statuses.push(ActiveStatus {
            id: "mystery".to_string(),
            name: "Mystified".to_string(),
            remaining: 2,
        });
        let tick = start_of_turn(&mut c, &OwnerContext::default(), &ruleset, &mut rng);
        assert!(!tick.skip_turn);
        assert_eq!(c.hp(), 20);
        assert_eq!(c.statuses[0].remaining, 1);
    }

    #[test]
    fn test_insertion_order_is_processing_order() {
        let ruleset = ruleset_with(vec![
            drain_template("a", -1, DurationSpec::Turns(1)),
            drain_template("b", -2, DurationSpec::Turns(1)),
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut c = victim();
        for id in ["b", "a"] {
            c.statuses
                .push(activate(ruleset.status(id).unwrap(), &mut rng));
        }
        let tick = start_of_turn(&mut c, &OwnerContext::default(), &ruleset, &mut rng);
        assert_eq!(
            tick.lines,
            vec![
                "Victim loses 2 hp from being b.",
                "Victim is no longer b.",
                "Victim loses 1 hp from being a.",
                "Victim is no longer a.",
            ]
        );
    }

    #[test]
    fn test_sample_duration() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(sample_duration(DurationSpec::Turns(3), &mut rng), 3);
        assert_eq!(
            sample_duration(DurationSpec::Persistent, &mut rng),
            PERSISTENT_DURATION
        );
        assert_eq!(
            sample_duration(DurationSpec::Range { min: 4, max: 2 }, &mut rng),
            PERSISTENT_DURATION
        );
        for _ in 0..50 {
            let d = sample_duration(DurationSpec::Range { min: 2, max: 4 }, &mut rng);
            assert!((2..=4).contains(&d));
        }
    }
}
