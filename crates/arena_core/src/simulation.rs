//! Core battle loop.
//!
//! A [`Simulator`] borrows a read-only [`Ruleset`] and resolves complete
//! battles between two [`Entrant`]s. Each run works on private clones of
//! the entrants, so one simulator (or one ruleset) can serve any number
//! of battles on any number of threads.
//!
//! # Determinism
//!
//! All randomness comes from the injected RNG:
//! - No floating-point math (uses fixed-point via [`crate::math::Fixed`])
//! - No system randomness
//! - Fixed processing order (player before opponent on ties)
//! - Same inputs and seed always produce the same log
//!
//! # Example
//!
//! ```
//! use arena_core::combatant::{Combatant, Entrant};
//! use arena_core::components::StatBlock;
//! use arena_core::ruleset::Ruleset;
//! use arena_core::simulation::Simulator;
//!
//! let ruleset = Ruleset::default();
//! let a = Entrant::new(Combatant::new("a", "Ash", StatBlock::new(60, 0, 20, 10, 10, 0)));
//! let b = Entrant::new(Combatant::new("b", "Birch", StatBlock::new(60, 0, 20, 10, 5, 0)));
//!
//! let result = Simulator::new(&ruleset).run_seeded(&a, &b, 42);
//! assert_eq!(result.winner_id, "a");
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::combatant::{Combatant, Entrant, OwnerContext};
use crate::components::StatDeltas;
use crate::log::{BattleLog, Side};
use crate::outcome::{evaluate, finalize, BattleResult, FinalState};
use crate::resolver::{resolve_action, Fighter};
use crate::ruleset::Ruleset;
use crate::selector::choose;
use crate::stats::{effective_stats, max_pools};
use crate::status::start_of_turn;

/// RNG used for seeded battles.
pub type BattleRng = ChaCha8Rng;

/// Create the RNG for a seeded battle.
#[must_use]
pub fn battle_rng(seed: u64) -> BattleRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// One side's working state for the duration of a battle.
#[derive(Debug, Clone)]
struct Corner {
    side: Side,
    combatant: Combatant,
    owner: OwnerContext,
    skip_turn: bool,
}

impl Corner {
    /// Clone an entrant into fresh working state.
    ///
    /// Temporary modifiers start at zero and hp/mp are clamped into range.
    fn enter(side: Side, entrant: &Entrant) -> Self {
        let mut combatant = entrant.combatant.clone();
        combatant.modifiers = StatDeltas::default();
        let (max_hp, max_mp) = max_pools(&combatant, &entrant.owner);
        combatant.current_hp = Some(combatant.current_hp.unwrap_or(max_hp).clamp(0, max_hp));
        combatant.current_mp = Some(combatant.current_mp.unwrap_or(max_mp).clamp(0, max_mp));
        Self {
            side,
            combatant,
            owner: entrant.owner.clone(),
            skip_turn: false,
        }
    }

    fn pools(&self) -> (i32, i32) {
        max_pools(&self.combatant, &self.owner)
    }

    fn is_defeated(&self) -> bool {
        self.combatant.is_defeated()
    }

    fn final_state(&self) -> FinalState {
        let (max_hp, max_mp) = self.pools();
        FinalState::capture(&self.combatant, max_hp, max_mp)
    }
}

/// Runs battles under one ruleset.
#[derive(Debug, Clone, Copy)]
pub struct Simulator<'r> {
    ruleset: &'r Ruleset,
}

impl<'r> Simulator<'r> {
    /// Create a simulator bound to a ruleset.
    #[must_use]
    pub const fn new(ruleset: &'r Ruleset) -> Self {
        Self { ruleset }
    }

    /// Ruleset in use.
    #[must_use]
    pub const fn ruleset(&self) -> &'r Ruleset {
        self.ruleset
    }

    /// Run a battle with a fresh RNG seeded from `seed`.
    #[must_use]
    pub fn run_seeded(&self, player: &Entrant, opponent: &Entrant, seed: u64) -> BattleResult {
        self.run(player, opponent, &mut battle_rng(seed))
    }

    /// Run a complete battle.
    ///
    /// The entrants are never modified; the result carries everything a
    /// caller may want to persist.
    pub fn run<R: Rng>(&self, player: &Entrant, opponent: &Entrant, rng: &mut R) -> BattleResult {
        let mut p = Corner::enter(Side::Player, player);
        let mut o = Corner::enter(Side::Opponent, opponent);
        let mut log = BattleLog::new();
        let max_turns = self.ruleset.max_turns();
        let mut turns = 0;

        while turns < max_turns {
            if p.is_defeated() || o.is_defeated() {
                break;
            }
            turns += 1;
            self.play_turn(turns, &mut p, &mut o, &mut log, rng);
        }

        let outcome = evaluate(&p.combatant, &o.combatant);
        let result = finalize(p.final_state(), o.final_state(), log, outcome, turns);
        tracing::debug!(
            turns,
            winner = %result.winner_id,
            outcome = ?result.outcome,
            "Battle finished"
        );
        result
    }

    fn play_turn<R: Rng>(
        &self,
        turn: u32,
        p: &mut Corner,
        o: &mut Corner,
        log: &mut BattleLog,
        rng: &mut R,
    ) {
        tracing::debug!(
            turn,
            player_hp = p.combatant.hp(),
            opponent_hp = o.combatant.hp(),
            "Turn start"
        );

        log.turn_header(turn);
        for corner in [&*p, &*o] {
            let (max_hp, max_mp) = corner.pools();
            log.snapshot(corner.side, &corner.combatant, max_hp, max_mp);
        }

        for corner in [&mut *p, &mut *o] {
            let tick = start_of_turn(&mut corner.combatant, &corner.owner, self.ruleset, rng);
            corner.skip_turn = tick.skip_turn;
            log.extend(tick.lines);
        }
        for corner in [&*p, &*o] {
            if corner.is_defeated() {
                log.push(format!("{} collapsed!", corner.combatant.name));
            }
        }
        if p.is_defeated() || o.is_defeated() {
            return;
        }

        let p_speed = effective_stats(&p.combatant, &p.owner, self.ruleset).speed;
        let o_speed = effective_stats(&o.combatant, &o.owner, self.ruleset).speed;
        let order = if o_speed > p_speed {
            [Side::Opponent, Side::Player]
        } else {
            [Side::Player, Side::Opponent]
        };

        for side in order {
            match side {
                Side::Player => self.take_action(p, o, log, rng),
                Side::Opponent => self.take_action(o, p, log, rng),
            }
        }
    }

    fn take_action<R: Rng>(
        &self,
        actor: &mut Corner,
        foe: &mut Corner,
        log: &mut BattleLog,
        rng: &mut R,
    ) {
        if actor.is_defeated() || foe.is_defeated() || actor.skip_turn {
            return;
        }

        let stats = effective_stats(&actor.combatant, &actor.owner, self.ruleset);
        let skill = choose(&actor.combatant, &stats, self.ruleset, rng);
        actor.combatant.current_mp = Some((stats.mp - skill.mp_cost).max(0));

        let outcome = resolve_action(
            &mut Fighter::new(&mut actor.combatant, &actor.owner),
            &mut Fighter::new(&mut foe.combatant, &foe.owner),
            &skill,
            self.ruleset,
            rng,
        );
        log.push(outcome.narrate());

        for corner in [&*foe, &*actor] {
            if corner.is_defeated() {
                log.push(format!("{} was knocked out!", corner.combatant.name));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::ActiveStatus;
    use crate::components::StatBlock;
    use crate::data::{DurationSpec, RulesetData, StatusTemplate};
    use crate::log::{parse_sentinel, Sentinel};
    use crate::outcome::{Outcome, DRAW_SENTINEL};

    fn fighter(id: &str, hp: i32, attack: i32, defense: i32, speed: i32) -> Entrant {
        Entrant::new(Combatant::new(
            id,
            id.to_uppercase(),
            StatBlock::new(hp, 0, attack, defense, speed, 0),
        ))
    }

    fn status_ruleset(template: StatusTemplate) -> Ruleset {
        Ruleset::from_data(RulesetData {
            name: "status".to_string(),
            elemental_chart: Vec::new(),
            statuses: vec![template],
            tunables: Default::default(),
        })
        .unwrap()
    }

    fn template(id: &str, name: &str, hp_per_turn: Option<i32>, skip: Option<u32>) -> StatusTemplate {
        StatusTemplate {
            id: id.to_string(),
            name: name.to_string(),
            hp_per_turn,
            mp_per_turn: None,
            skip_turn_chance: skip,
            stat_deltas: StatDeltas::default(),
            duration: DurationSpec::Turns(3),
        }
    }

    fn afflict(entrant: &mut Entrant, id: &str, name: &str, remaining: u32) {
        entrant.combatant.statuses.push(ActiveStatus {
            id: id.to_string(),
            name: name.to_string(),
            remaining,
        });
    }

    #[test]
    fn test_faster_side_acts_first() {
        let ruleset = Ruleset::default();
        let a = fighter("a", 100, 20, 10, 10);
        let b = fighter("b", 100, 20, 10, 5);
        let result = Simulator::new(&ruleset).run_seeded(&b, &a, 1);

        let first_action = result
            .log
            .iter()
            .find(|l| l.contains(" used "))
            .unwrap();
        assert_eq!(first_action, "A used Basic Attack! B takes 17 damage.");
    }

    #[test]
    fn test_snapshot_precedes_actions() {
        let ruleset = Ruleset::default();
        let result = Simulator::new(&ruleset).run_seeded(
            &fighter("a", 100, 20, 10, 10),
            &fighter("b", 100, 20, 10, 5),
            3,
        );
        assert_eq!(result.log[0], "--- Turn 1 ---");
        assert_eq!(
            parse_sentinel(&result.log[1]),
            Some(Sentinel::Hp {
                side: Side::Player,
                current: 100,
                max: 100
            })
        );
        assert_eq!(result.log[6], "@@OpponentCondition:none");
        assert!(result.log[7].contains(" used "));
    }

    #[test]
    fn test_stunned_side_loses_its_action() {
        let ruleset = status_ruleset(template("stun", "Stunned", None, Some(100)));
        let mut a = fighter("a", 200, 20, 10, 10);
        afflict(&mut a, "stun", "Stunned", 1);
        let b = fighter("b", 200, 20, 10, 5);
        let result = Simulator::new(&ruleset).run_seeded(&a, &b, 4);

        let turn_two = result
            .log
            .iter()
            .position(|l| l == "--- Turn 2 ---")
            .unwrap();
        let turn_one = &result.log[..turn_two];
        assert_eq!(turn_one[7], "A is Stunned and cannot act!");
        assert_eq!(turn_one[8], "A is no longer Stunned.");
        assert!(!turn_one.iter().any(|l| l.starts_with("A used ")));
        assert!(turn_one[9].starts_with("B used "));

        // the stun lasted one turn
        assert!(result.log[turn_two..].iter().any(|l| l.starts_with("A used ")));
    }

    #[test]
    fn test_drain_death_ends_battle_before_actions() {
        let ruleset = status_ruleset(template("poison", "Poisoned", Some(-5), None));
        let mut a = fighter("a", 100, 20, 10, 10);
        a.combatant.current_hp = Some(5);
        afflict(&mut a, "poison", "Poisoned", 3);
        let b = fighter("b", 100, 20, 10, 5);
        let result = Simulator::new(&ruleset).run_seeded(&a, &b, 2);

        assert_eq!(result.log[0], "--- Turn 1 ---");
        assert!(result.log[1..=6].iter().all(|l| parse_sentinel(l).is_some()));
        assert_eq!(
            result.log[7..],
            [
                "A loses 5 hp from being Poisoned.",
                "A collapsed!",
                "@@BattleEnd:b",
            ]
        );
        assert!(!result.log.iter().any(|l| l.contains(" used ")));
        assert_eq!(result.turns, 1);
        assert_eq!(result.outcome, Outcome::Knockout);
        assert_eq!(result.winner_id, "b");
        assert_eq!(result.opponent.hp, 100);
    }

    #[test]
    fn test_knockout_ends_battle() {
        let ruleset = Ruleset::default();
        let result = Simulator::new(&ruleset).run_seeded(
            &fighter("a", 100, 20, 10, 10),
            &fighter("b", 17, 20, 10, 5),
            7,
        );
        assert_eq!(result.outcome, Outcome::Knockout);
        assert_eq!(result.winner_id, "a");
        assert_eq!(result.loser_id, "b");
        assert_eq!(result.turns, 1);
        assert_eq!(result.opponent.hp, 0);
        // b died before its action
        assert_eq!(result.player.hp, 100);
        assert_eq!(result.log.last().unwrap(), "@@BattleEnd:a");
    }

    #[test]
    fn test_turn_cap_is_draw() {
        let mut data = crate::ruleset::standard_ruleset_data();
        data.tunables.max_turns = 3;
        let ruleset = Ruleset::from_data(data).unwrap();
        let result = Simulator::new(&ruleset).run_seeded(
            &fighter("a", 1000, 5, 50, 10),
            &fighter("b", 1000, 5, 50, 10),
            11,
        );
        assert_eq!(result.turns, 3);
        assert_eq!(result.outcome, Outcome::TurnLimit);
        assert_eq!(result.winner_id, DRAW_SENTINEL);
        assert_eq!(result.loser_id, DRAW_SENTINEL);
    }

    #[test]
    fn test_entrants_untouched() {
        let ruleset = Ruleset::default();
        let a = fighter("a", 100, 20, 10, 10);
        let b = fighter("b", 30, 20, 10, 5);
        let (a0, b0) = (a.clone(), b.clone());
        let _ = Simulator::new(&ruleset).run_seeded(&a, &b, 5);
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }

    #[test]
    fn test_same_seed_same_result() {
        let ruleset = Ruleset::default();
        let a = fighter("a", 80, 18, 9, 10);
        let b = fighter("b", 80, 18, 9, 10);
        let sim = Simulator::new(&ruleset);
        let first = sim.run_seeded(&a, &b, 99);
        let second = sim.run_seeded(&a, &b, 99);
        assert_eq!(first, second);
        assert_eq!(first.state_hash(), second.state_hash());
    }

    #[test]
    fn test_already_defeated_entrant() {
        let ruleset = Ruleset::default();
        let mut b = fighter("b", 50, 20, 10, 5);
        b.combatant.current_hp = Some(0);
        let result = Simulator::new(&ruleset).run_seeded(&fighter("a", 50, 20, 10, 10), &b, 1);
        assert_eq!(result.turns, 0);
        assert_eq!(result.winner_id, "a");
    }
}
