//! Battle outcome evaluation and the final result record.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::combatant::{Combatant, Entrant, Tally};
use crate::log::BattleLog;
use crate::stats::max_pools;

/// Written to both id fields of a drawn or aborted battle.
pub const DRAW_SENTINEL: &str = "draw";

/// How a battle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Exactly one side was knocked out.
    Knockout,
    /// The turn cap was reached with both sides standing.
    TurnLimit,
    /// Both sides were knocked out.
    DoubleKnockout,
    /// The simulation failed and was recovered at the orchestration boundary.
    Aborted,
}

impl Outcome {
    /// Whether this outcome is a draw.
    #[must_use]
    pub const fn is_draw(self) -> bool {
        !matches!(self, Outcome::Knockout)
    }
}

/// One combatant's state when the battle ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FinalState {
    /// Combatant id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hp at the end.
    pub hp: i32,
    /// Mp at the end.
    pub mp: i32,
    /// Max hp.
    pub max_hp: i32,
    /// Max mp.
    pub max_mp: i32,
    /// Names of equipped skills.
    pub skills: Vec<String>,
    /// Win/loss record including this battle.
    pub record: Tally,
}

impl FinalState {
    /// Capture a combatant's final state with an unchanged record.
    #[must_use]
    pub fn capture(combatant: &Combatant, max_hp: i32, max_mp: i32) -> Self {
        Self {
            id: combatant.id.clone(),
            name: combatant.name.clone(),
            hp: combatant.hp(),
            mp: combatant.mp(),
            max_hp,
            max_mp,
            skills: combatant
                .skills
                .iter()
                .map(|s| s.skill.name.clone())
                .collect(),
            record: combatant.record,
        }
    }
}

/// Everything a battle produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleResult {
    /// Winner id, or [`DRAW_SENTINEL`].
    pub winner_id: String,
    /// Loser id, or [`DRAW_SENTINEL`].
    pub loser_id: String,
    /// How the battle ended.
    pub outcome: Outcome,
    /// Turns started.
    pub turns: u32,
    /// Full ordered log, closed by a `BattleEnd` sentinel.
    pub log: Vec<String>,
    /// Player side final state.
    pub player: FinalState,
    /// Opponent side final state.
    pub opponent: FinalState,
    /// One presentation summary per combatant.
    pub activity: Vec<String>,
}

impl BattleResult {
    /// Whether the battle was drawn (including aborted battles).
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.outcome.is_draw()
    }

    /// Hash of the log and final states, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// A neutral result for a battle that could not be simulated.
    ///
    /// Final states carry the entrants' real pools; unset hp and mp count
    /// as full, as they would at the start of a battle.
    #[must_use]
    pub fn aborted(player: &Entrant, opponent: &Entrant, reason: &str) -> Self {
        let mut log = BattleLog::new();
        log.push(format!("The battle was called off: {reason}"));
        log.close(DRAW_SENTINEL);
        Self {
            winner_id: DRAW_SENTINEL.to_string(),
            loser_id: DRAW_SENTINEL.to_string(),
            outcome: Outcome::Aborted,
            turns: 0,
            log: log.into_lines(),
            player: untouched_state(player),
            opponent: untouched_state(opponent),
            activity: Vec::new(),
        }
    }
}

fn untouched_state(entrant: &Entrant) -> FinalState {
    let (max_hp, max_mp) = max_pools(&entrant.combatant, &entrant.owner);
    let mut combatant = entrant.combatant.clone();
    combatant.current_hp = Some(combatant.current_hp.unwrap_or(max_hp).clamp(0, max_hp));
    combatant.current_mp = Some(combatant.current_mp.unwrap_or(max_mp).clamp(0, max_mp));
    FinalState::capture(&combatant, max_hp, max_mp)
}

/// Decide the outcome from final hp.
///
/// Exactly one side down is a knockout; both or neither is a draw.
#[must_use]
pub fn evaluate(player: &Combatant, opponent: &Combatant) -> Outcome {
    match (player.is_defeated(), opponent.is_defeated()) {
        (true, true) => Outcome::DoubleKnockout,
        (false, false) => Outcome::TurnLimit,
        _ => Outcome::Knockout,
    }
}

/// Assemble the final result. Closes the log and updates both tallies.
#[must_use]
pub fn finalize(
    mut player: FinalState,
    mut opponent: FinalState,
    mut log: BattleLog,
    outcome: Outcome,
    turns: u32,
) -> BattleResult {
    let (winner_id, loser_id) = if outcome == Outcome::Knockout {
        if player.hp > 0 {
            player.record.wins += 1;
            opponent.record.losses += 1;
            (player.id.clone(), opponent.id.clone())
        } else {
            opponent.record.wins += 1;
            player.record.losses += 1;
            (opponent.id.clone(), player.id.clone())
        }
    } else {
        (DRAW_SENTINEL.to_string(), DRAW_SENTINEL.to_string())
    };

    log.close(&winner_id);
    let activity = vec![
        activity_line(&player, &opponent, &winner_id),
        activity_line(&opponent, &player, &winner_id),
    ];

    BattleResult {
        winner_id,
        loser_id,
        outcome,
        turns,
        log: log.into_lines(),
        player,
        opponent,
        activity,
    }
}

fn activity_line(me: &FinalState, them: &FinalState, winner_id: &str) -> String {
    if winner_id == DRAW_SENTINEL {
        format!("{} fought {} to a draw.", me.name, them.name)
    } else if winner_id == me.id {
        format!("{} defeated {}.", me.name, them.name)
    } else {
        format!("{} was defeated by {}.", me.name, them.name)
    }
}
