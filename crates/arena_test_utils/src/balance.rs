//! Balance testing utilities.
//!
//! This module provides tools for running series of seeded battles and
//! analytic basic-attack estimates to check that matchups stay fair.

use std::ops::Range;

use arena_core::combat::{final_damage, raw_damage};
use arena_core::combatant::{Combatant, Entrant, OwnerContext};
use arena_core::math::Fixed;
use arena_core::outcome::BattleResult;
use arena_core::ruleset::Ruleset;
use arena_core::simulation::Simulator;
use arena_core::stats::effective_stats;

/// Statistics for a set of battles.
#[derive(Debug, Clone, Default)]
pub struct BattleStats {
    /// Total battles run.
    pub total_battles: u32,
    /// Wins for side A.
    pub wins_a: u32,
    /// Wins for side B.
    pub wins_b: u32,
    /// Draws (turn limit or double knockout).
    pub draws: u32,
    /// Average turns to resolution.
    pub avg_turns: f64,
    /// Average hp fraction the winner kept.
    pub avg_winner_hp_ratio: f64,
}

impl BattleStats {
    /// Calculate win rate for side A (0.0 to 1.0).
    pub fn win_rate_a(&self) -> f64 {
        if self.total_battles == 0 {
            return 0.5;
        }
        self.wins_a as f64 / self.total_battles as f64
    }

    /// Calculate win rate for side B (0.0 to 1.0).
    pub fn win_rate_b(&self) -> f64 {
        if self.total_battles == 0 {
            return 0.5;
        }
        self.wins_b as f64 / self.total_battles as f64
    }

    /// Fraction of battles that were drawn.
    pub fn draw_rate(&self) -> f64 {
        if self.total_battles == 0 {
            return 0.0;
        }
        self.draws as f64 / self.total_battles as f64
    }

    /// Check if matchup is balanced (within acceptable range).
    pub fn is_balanced(&self, min_rate: f64, max_rate: f64) -> bool {
        let rate = self.win_rate_a();
        rate >= min_rate && rate <= max_rate
    }

    /// Fold one result in. `a_id` identifies side A.
    pub fn record(&mut self, result: &BattleResult, a_id: &str) {
        let turns_total = self.avg_turns * f64::from(self.total_battles);
        let ratio_total = self.avg_winner_hp_ratio * f64::from(self.wins_a + self.wins_b);

        self.total_battles += 1;
        let winner_ratio = if result.is_draw() {
            self.draws += 1;
            None
        } else {
            let winner = if result.player.id == result.winner_id {
                &result.player
            } else {
                &result.opponent
            };
            if result.winner_id == a_id {
                self.wins_a += 1;
            } else {
                self.wins_b += 1;
            }
            Some(if winner.max_hp > 0 {
                f64::from(winner.hp) / f64::from(winner.max_hp)
            } else {
                0.0
            })
        };

        self.avg_turns = (turns_total + f64::from(result.turns)) / f64::from(self.total_battles);
        let decisive = self.wins_a + self.wins_b;
        if let Some(ratio) = winner_ratio {
            self.avg_winner_hp_ratio = (ratio_total + ratio) / f64::from(decisive);
        }
    }
}

/// Run `a` (as player) against `b` once per seed.
pub fn run_series(ruleset: &Ruleset, a: &Entrant, b: &Entrant, seeds: Range<u64>) -> BattleStats {
    let sim = Simulator::new(ruleset);
    let mut stats = BattleStats::default();
    for seed in seeds {
        stats.record(&sim.run_seeded(a, b, seed), &a.combatant.id);
    }
    tracing::debug!(
        a = %a.combatant.id,
        b = %b.combatant.id,
        battles = stats.total_battles,
        win_rate_a = stats.win_rate_a(),
        "Series complete"
    );
    stats
}

/// Run the series with `a` on both sides, cancelling out the player tie-break.
pub fn run_series_both_sides(
    ruleset: &Ruleset,
    a: &Entrant,
    b: &Entrant,
    seeds: Range<u64>,
) -> BattleStats {
    let sim = Simulator::new(ruleset);
    let mut stats = BattleStats::default();
    for seed in seeds {
        stats.record(&sim.run_seeded(a, b, seed), &a.combatant.id);
        stats.record(&sim.run_seeded(b, a, seed), &a.combatant.id);
    }
    stats
}

/// Basic attacks `attacker` needs to knock out `defender`, ignoring
/// misses, crits and statuses.
pub fn basic_attacks_to_knockout(attacker: &Combatant, defender: &Combatant, ruleset: &Ruleset) -> u32 {
    let owner = OwnerContext::default();
    let atk = effective_stats(attacker, &owner, ruleset);
    let def = effective_stats(defender, &owner, ruleset);

    let raw = raw_damage(ruleset.tunables().basic_attack_power, atk.attack, def.defense);
    let damage = final_damage(raw, Fixed::ONE, None).max(1);
    let hp = def.max_hp.max(1);
    ((hp + damage - 1) / damage) as u32
}

/// Basic-attack knockout counts for every ordered pair in a roster.
pub fn knockout_matrix(roster: &[Combatant], ruleset: &Ruleset) -> Vec<(String, String, u32)> {
    let mut results = Vec::new();

    for attacker in roster {
        for defender in roster {
            let hits = basic_attacks_to_knockout(attacker, defender, ruleset);
            results.push((attacker.id.clone(), defender.id.clone(), hits));
        }
    }

    results
}
