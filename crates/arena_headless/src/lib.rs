//! Headless battle runner for balance testing and CI verification.
//!
//! This crate wraps `arena_core` with everything that touches the outside
//! world: loading matchups and rulesets from disk, running seeded batches
//! across threads, persisting replays and reporting results.
//!
//! - **stdout**: machine output (battle logs, JSON results)
//! - **stderr**: diagnostics (`tracing`)
//!
//! # Example
//!
//! ```bash
//! # One battle, human-readable log
//! cargo run -p arena_headless -- run --matchup matchups/ember_vs_tide.ron --seed 7
//!
//! # 500 seeded battles on 8 threads
//! cargo run -p arena_headless -- batch --matchup matchups/ember_vs_tide.ron \
//!     --count 500 --parallel 8 --output results/
//!
//! # Record and re-check a replay
//! cargo run -p arena_headless -- record --matchup m.ron --seed 3 --output r.bin
//! cargo run -p arena_headless -- replay --file r.bin --verify
//! ```

pub mod batch;
pub mod metrics;
pub mod replay_file;
pub mod ruleset_loader;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchResults, DeterminismReport};
pub use metrics::{BatchSummary, BattleMetrics};
pub use replay_file::{load_replay, save_replay, ReplayFileError};
pub use ruleset_loader::{load_ruleset, load_ruleset_data, RulesetLoadError};
pub use runner::{run_guarded, run_matchup};
pub use scenario::{Matchup, ScenarioError};
