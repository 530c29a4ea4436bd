//! Ruleset loading from disk.
//!
//! Rulesets are RON files by default; a `.json` extension switches to JSON.
//! Validation issues are logged, and only the problems that make a ruleset
//! unusable (see [`Ruleset::from_data`]) are returned as errors.

use std::fs;
use std::path::{Path, PathBuf};

use arena_core::data::RulesetData;
use arena_core::error::GameError;
use arena_core::ruleset::Ruleset;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Error type for ruleset loading.
#[derive(Error, Debug)]
pub enum RulesetLoadError {
    /// File not found.
    #[error("Ruleset file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read ruleset file '{path}': {source}")]
    Io {
        /// Offending path.
        path: String,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Failed to parse RON or JSON.
    #[error("Failed to parse ruleset file '{path}': {message}")]
    Parse {
        /// Offending path.
        path: String,
        /// Parser message.
        message: String,
    },
    /// Parsed but unusable.
    #[error(transparent)]
    Invalid(#[from] GameError),
}

/// Data file encodings understood by the loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DataFormat {
    Ron,
    Json,
}

impl DataFormat {
    /// Pick the format from a file extension. Anything but `.json` is RON.
    pub(crate) fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Ron,
        }
    }

    pub(crate) fn parse<T: DeserializeOwned>(self, contents: &str) -> Result<T, String> {
        match self {
            Self::Ron => ron::from_str(contents).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(contents).map_err(|e| e.to_string()),
        }
    }
}

/// Read and parse a ruleset file without building it.
pub fn load_ruleset_data(path: &Path) -> Result<RulesetData, RulesetLoadError> {
    if !path.exists() {
        return Err(RulesetLoadError::FileNotFound(path.display().to_string()));
    }
    let contents = fs::read_to_string(path).map_err(|source| RulesetLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;

    DataFormat::from_path(path)
        .parse(&contents)
        .map_err(|message| RulesetLoadError::Parse {
            path: path.display().to_string(),
            message,
        })
}

/// Load a ruleset file and build a [`Ruleset`] from it.
///
/// Every issue reported by [`RulesetData::validate`] is logged as a warning.
pub fn load_ruleset(path: &Path) -> Result<Ruleset, RulesetLoadError> {
    let data = load_ruleset_data(path)?;
    for issue in data.validate() {
        tracing::warn!(path = %path.display(), "{issue}");
    }
    let ruleset = Ruleset::from_data(data)?;
    tracing::debug!(
        path = %path.display(),
        name = ruleset.name(),
        statuses = ruleset.statuses().count(),
        "Loaded ruleset"
    );
    Ok(ruleset)
}

/// Load the ruleset at `path`, or the built-in standard ruleset when `None`.
pub fn load_ruleset_or_default(path: Option<&Path>) -> Result<Ruleset, RulesetLoadError> {
    match path {
        Some(path) => load_ruleset(path),
        None => Ok(Ruleset::default()),
    }
}

/// Resolve a path relative to the directory of `anchor` (a file).
pub(crate) fn relative_to(anchor: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    anchor
        .parent()
        .map_or_else(|| path.to_path_buf(), |dir| dir.join(path))
}
