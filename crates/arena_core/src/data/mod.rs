//! Data structures for ruleset and skill configuration.
//!
//! This module contains pure data structures that define skills, status
//! templates and rulesets. All structs are designed to be deserialized
//! from RON files.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `arena_headless`.

mod ruleset_data;
mod skill_data;
mod status_data;

pub use ruleset_data::{ChartEntry, RulesetData, Tunables};
pub use skill_data::{Accuracy, Effect, Skill, SpecialLogic, StatDelta};
pub use status_data::{DurationSpec, StatusTemplate, PERSISTENT_DURATION};
