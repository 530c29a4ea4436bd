//! # Arena Core
//!
//! Deterministic turn-based battle simulation for Monster Arena.
//!
//! This crate contains **only** deterministic logic:
//! - No IO
//! - No system randomness (the RNG is always injected)
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Running many battles concurrently against one shared [`ruleset::Ruleset`]
//! - Headless batch runs
//! - Replays that reproduce a battle bit for bit
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`components`] - Closed enumerations and stat blocks
//! - [`data`] - Data-file structures (skills, statuses, rulesets)
//! - [`ruleset`] - Immutable runtime ruleset
//! - [`combatant`] - Combatant snapshots and owner context
//! - [`stats`] - Effective stat aggregation
//! - [`status`] - Status effect lifecycle
//! - [`selector`] - Personality-weighted action selection
//! - [`resolver`] - Skill effect resolution
//! - [`simulation`] - Core battle loop
//! - [`outcome`] - Outcome evaluation and the result record
//! - [`log`] - Battle log and sentinel lines
//! - [`replay`] - Recorded battles
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod combatant;
pub mod components;
pub mod data;
pub mod error;
pub mod leveling;
pub mod log;
pub mod math;
pub mod outcome;
pub mod replay;
pub mod resolver;
pub mod ruleset;
pub mod selector;
pub mod simulation;
pub mod stats;
pub mod status;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combatant::{
        ActiveStatus, Combatant, Entrant, EquippedSkill, OwnerContext, Personality, Tally,
        TitleBuff,
    };
    pub use crate::components::*;
    pub use crate::data::{Accuracy, DurationSpec, Effect, RulesetData, Skill, StatusTemplate};
    pub use crate::error::{GameError, Result};
    pub use crate::math::Fixed;
    pub use crate::outcome::{BattleResult, FinalState, Outcome, DRAW_SENTINEL};
    pub use crate::replay::BattleReplay;
    pub use crate::ruleset::Ruleset;
    pub use crate::simulation::{battle_rng, Simulator};
    pub use crate::stats::{effective_stats, EffectiveStats};
}
