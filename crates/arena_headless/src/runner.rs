//! Guarded battle execution.
//!
//! The simulation core never fails on bad data, but a batch of thousands
//! of battles must survive a bug in any one of them. Everything that runs
//! a battle on behalf of the CLI goes through [`run_guarded`], which turns
//! a panic into an aborted draw and a logged error.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use arena_core::combatant::Entrant;
use arena_core::outcome::BattleResult;
use arena_core::ruleset::Ruleset;
use arena_core::simulation::Simulator;

use crate::scenario::Matchup;

/// Run one seeded battle, recovering from a panic inside the simulation.
#[must_use]
pub fn run_guarded(ruleset: &Ruleset, player: &Entrant, opponent: &Entrant, seed: u64) -> BattleResult {
    guarded(player, opponent, seed, || {
        Simulator::new(ruleset).run_seeded(player, opponent, seed)
    })
}

/// Run the matchup once and log the result.
#[must_use]
pub fn run_matchup(matchup: &Matchup, ruleset: &Ruleset, seed: u64) -> BattleResult {
    let result = run_guarded(ruleset, &matchup.player, &matchup.opponent, seed);
    tracing::info!(
        matchup = %matchup.name,
        seed,
        winner = %result.winner_id,
        outcome = ?result.outcome,
        turns = result.turns,
        "Battle complete"
    );
    result
}

fn guarded<F>(player: &Entrant, opponent: &Entrant, seed: u64, battle: F) -> BattleResult
where
    F: FnOnce() -> BattleResult,
{
    match panic::catch_unwind(AssertUnwindSafe(battle)) {
        Ok(result) => result,
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::error!(
                player = %player.combatant.id,
                opponent = %opponent.combatant.id,
                seed,
                reason = %reason,
                "Battle simulation panicked"
            );
            BattleResult::aborted(player, opponent, &reason)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_core::outcome::{Outcome, DRAW_SENTINEL};
    use arena_test_utils::fixtures::{basic_fighter, entrant};

    #[test]
    fn test_guarded_passes_result_through() {
        let ruleset = Ruleset::default();
        let a = entrant(basic_fighter("a", 100, 20, 10, 10));
        let b = entrant(basic_fighter("b", 17, 20, 10, 5));

        let guarded = run_guarded(&ruleset, &a, &b, 7);
        let direct = Simulator::new(&ruleset).run_seeded(&a, &b, 7);
        assert_eq!(guarded, direct);
    }

    #[test]
    fn test_panic_becomes_aborted_draw() {
        let a = entrant(basic_fighter("a", 100, 20, 10, 10));
        let b = entrant(basic_fighter("b", 100, 20, 10, 5));

        let result = guarded(&a, &b, 3, || panic!("resolver exploded"));
        assert_eq!(result.outcome, Outcome::Aborted);
        assert_eq!(result.winner_id, DRAW_SENTINEL);
        assert_eq!(result.loser_id, DRAW_SENTINEL);
        assert!(result.log[0].contains("resolver exploded"));
        assert_eq!(result.log.last().unwrap(), "@@BattleEnd:draw");
        assert_eq!((result.player.hp, result.player.max_hp), (100, 100));
        assert_eq!((result.opponent.hp, result.opponent.max_hp), (100, 100));
    }

    #[test]
    fn test_panic_message_kinds() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(5_u8);
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
