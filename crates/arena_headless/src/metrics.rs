//! Battle metrics collection for balance analysis.

use std::collections::HashMap;

use arena_core::outcome::{BattleResult, Outcome};
use serde::{Deserialize, Serialize};

/// Metrics for a single battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleMetrics {
    /// Unique battle identifier.
    pub battle_id: String,
    /// Seed used.
    pub seed: u64,
    /// Winning combatant id (None = draw).
    pub winner: Option<String>,
    /// How the battle ended.
    pub outcome: Outcome,
    /// Turns played.
    pub turns: u32,
    /// Player hp left, as a fraction of max.
    pub player_hp_ratio: f64,
    /// Opponent hp left, as a fraction of max.
    pub opponent_hp_ratio: f64,
    /// Battle log length.
    pub log_lines: usize,
    /// Final state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl BattleMetrics {
    /// Extract metrics from a finished battle.
    #[must_use]
    pub fn from_result(battle_id: impl Into<String>, seed: u64, result: &BattleResult) -> Self {
        Self {
            battle_id: battle_id.into(),
            seed,
            winner: (!result.is_draw()).then(|| result.winner_id.clone()),
            outcome: result.outcome,
            turns: result.turns,
            player_hp_ratio: ratio(result.player.hp, result.player.max_hp),
            opponent_hp_ratio: ratio(result.opponent.hp, result.opponent.max_hp),
            log_lines: result.log.len(),
            final_state_hash: result.state_hash(),
        }
    }
}

fn ratio(current: i32, max: i32) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    f64::from(current) / f64::from(max)
}

/// Summary statistics across multiple battles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total battles played.
    pub total_battles: u32,
    /// Battles won by each combatant.
    pub wins_by_combatant: HashMap<String, u32>,
    /// Win rates by combatant.
    pub win_rates: HashMap<String, f64>,
    /// Draws (turn limit or double knockout).
    pub draws: u32,
    /// Battles recovered from a failure.
    pub aborted: u32,
    /// Average battle length in turns.
    pub avg_turns: f64,
    /// Shortest battle.
    pub min_turns: u32,
    /// Longest battle.
    pub max_turns: u32,
}

impl BatchSummary {
    /// Calculate summary from a list of battle metrics.
    #[must_use]
    pub fn from_battles(battles: &[BattleMetrics]) -> Self {
        if battles.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_battles: battles.len() as u32,
            min_turns: u32::MAX,
            ..Default::default()
        };

        let mut turn_sum = 0u64;
        for battle in battles {
            turn_sum += u64::from(battle.turns);
            summary.min_turns = summary.min_turns.min(battle.turns);
            summary.max_turns = summary.max_turns.max(battle.turns);

            match (&battle.winner, battle.outcome) {
                (_, Outcome::Aborted) => summary.aborted += 1,
                (Some(winner), _) => {
                    *summary.wins_by_combatant.entry(winner.clone()).or_default() += 1;
                }
                (None, _) => summary.draws += 1,
            }
        }

        summary.avg_turns = turn_sum as f64 / battles.len() as f64;
        for (id, wins) in &summary.wins_by_combatant {
            summary
                .win_rates
                .insert(id.clone(), f64::from(*wins) / f64::from(summary.total_battles));
        }

        summary
    }

    /// Check that no combatant's win rate strays more than `threshold` from 0.5.
    #[must_use]
    pub fn is_balanced(&self, threshold: f64) -> bool {
        self.win_rates
            .values()
            .all(|rate| (rate - 0.5).abs() <= threshold)
    }

    /// The combatant winning more than `0.5 + threshold` of battles, if any.
    #[must_use]
    pub fn dominant_combatant(&self, threshold: f64) -> Option<&String> {
        self.win_rates
            .iter()
            .find(|(_, rate)| **rate > 0.5 + threshold)
            .map(|(id, _)| id)
    }
}
