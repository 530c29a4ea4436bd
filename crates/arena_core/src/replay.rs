//! Battle replays.
//!
//! A replay stores everything needed to re-run a battle: the ruleset,
//! both entrants and the seed. Because the simulation is deterministic,
//! re-running it must reproduce the recorded state hash.
//!
//! Encoding is `bincode`; reading and writing files is left to callers.

use serde::{Deserialize, Serialize};

use crate::combatant::Entrant;
use crate::error::{GameError, Result};
use crate::outcome::BattleResult;
use crate::ruleset::Ruleset;
use crate::simulation::Simulator;

/// Replay format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Complete replay data structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReplay {
    /// Replay format version.
    pub version: u32,
    /// Seed the battle was run with.
    pub seed: u64,
    /// Ruleset in force.
    pub ruleset: Ruleset,
    /// Player side input.
    pub player: Entrant,
    /// Opponent side input.
    pub opponent: Entrant,
    /// Winner id recorded at the time, or the draw sentinel.
    pub winner_id: String,
    /// Turns recorded at the time.
    pub turns: u32,
    /// [`BattleResult::state_hash`] recorded at the time.
    pub final_hash: u64,
}

impl BattleReplay {
    /// Run a battle and capture it as a replay.
    #[must_use]
    pub fn record(
        ruleset: &Ruleset,
        player: &Entrant,
        opponent: &Entrant,
        seed: u64,
    ) -> (Self, BattleResult) {
        let result = Simulator::new(ruleset).run_seeded(player, opponent, seed);
        let replay = Self {
            version: REPLAY_VERSION,
            seed,
            ruleset: ruleset.clone(),
            player: player.clone(),
            opponent: opponent.clone(),
            winner_id: result.winner_id.clone(),
            turns: result.turns,
            final_hash: result.state_hash(),
        };
        (replay, result)
    }

    /// Re-run the battle without checking it.
    #[must_use]
    pub fn replay(&self) -> BattleResult {
        Simulator::new(&self.ruleset).run_seeded(&self.player, &self.opponent, self.seed)
    }

    /// Re-run the battle and check it against the recorded hash.
    ///
    /// # Errors
    /// Returns [`GameError::ReplayMismatch`] if the re-run diverges.
    pub fn verify(&self) -> Result<BattleResult> {
        let result = self.replay();
        let replayed = result.state_hash();
        if replayed != self.final_hash {
            return Err(GameError::ReplayMismatch {
                seed: self.seed,
                recorded: self.final_hash,
                replayed,
            });
        }
        Ok(result)
    }

    /// Encode the replay.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize replay: {e}")))
    }

    /// Decode a replay, rejecting other format versions.
    ///
    /// # Errors
    /// Returns an error if deserialization fails or the version differs.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let replay: Self = bincode::deserialize(bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::InvalidState(format!(
                "Replay version mismatch: expected {}, got {}",
                REPLAY_VERSION, replay.version
            )));
        }

        Ok(replay)
    }
}
