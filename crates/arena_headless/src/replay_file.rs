//! Replay persistence.

use std::fs;
use std::path::Path;

use arena_core::error::GameError;
use arena_core::replay::BattleReplay;
use thiserror::Error;

/// Error type for replay files.
#[derive(Error, Debug)]
pub enum ReplayFileError {
    /// Failed to read or write the file.
    #[error("Replay file '{path}': {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Encoding, decoding or verification failed.
    #[error(transparent)]
    Replay(#[from] GameError),
}

/// Write a replay to disk, creating parent directories.
pub fn save_replay(replay: &BattleReplay, path: &Path) -> Result<(), ReplayFileError> {
    let io_err = |source: std::io::Error| ReplayFileError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let bytes = replay.to_bytes()?;
    fs::write(path, bytes).map_err(io_err)?;
    tracing::debug!(path = %path.display(), seed = replay.seed, "Saved replay");
    Ok(())
}

/// Read a replay from disk.
pub fn load_replay(path: &Path) -> Result<BattleReplay, ReplayFileError> {
    let bytes = fs::read(path).map_err(|source| ReplayFileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(BattleReplay::from_bytes(&bytes)?)
}
