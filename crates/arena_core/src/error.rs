//! Error types for the battle simulation.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all battle simulation errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Ruleset data is structurally unusable.
    #[error("Invalid ruleset: {0}")]
    InvalidRuleset(String),

    /// Invalid battle state.
    #[error("Invalid battle state: {0}")]
    InvalidState(String),

    /// A replayed battle did not reproduce the recorded result.
    #[error("Replay mismatch for seed {seed}: recorded hash {recorded:016x}, replayed hash {replayed:016x}")]
    ReplayMismatch {
        /// Seed the battle was run with.
        seed: u64,
        /// Hash stored in the replay file.
        recorded: u64,
        /// Hash produced by re-simulation.
        replayed: u64,
    },
}
