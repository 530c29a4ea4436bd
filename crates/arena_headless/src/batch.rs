//! Batch battle runner for balance testing.
//!
//! Runs many seeded battles of one matchup in parallel using rayon and
//! collects per-battle metrics plus an aggregate summary.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use arena_core::ruleset::Ruleset;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, BattleMetrics};
use crate::runner::run_guarded;
use crate::scenario::Matchup;

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Matchup name, for reports
    pub matchup: String,
    /// Number of battles to run
    pub battle_count: u32,
    /// Worker threads (0 = use rayon default)
    pub parallel: u32,
    /// Output directory for results
    pub output_dir: PathBuf,
    /// First seed; battle `i` uses `seed_start + i`
    pub seed_start: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            matchup: "exhibition".to_string(),
            battle_count: 100,
            parallel: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
        }
    }
}

impl BatchConfig {
    /// Create config for a named matchup
    pub fn new(matchup: &str, battle_count: u32) -> Self {
        Self {
            matchup: matchup.to_string(),
            battle_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set worker thread count
    pub fn with_parallel(mut self, threads: u32) -> Self {
        self.parallel = threads;
        self
    }

    /// Seeds this batch will use, in battle order
    pub fn seeds(&self) -> impl Iterator<Item = u64> + '_ {
        (0..self.battle_count).map(|i| self.seed_start.wrapping_add(u64::from(i)))
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Ruleset name
    pub ruleset: String,
    /// Individual battle metrics, in seed order
    pub battles: Vec<BattleMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
}

impl BatchResults {
    /// File name written into the output directory
    pub const FILE_NAME: &'static str = "batch_results.json";

    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Run a batch of battles
pub fn run_batch(config: BatchConfig, matchup: &Matchup, ruleset: &Ruleset) -> BatchResults {
    let start = Instant::now();
    let completed = AtomicU32::new(0);

    info!(
        "Starting batch run: {} battles of '{}' under '{}'",
        config.battle_count,
        matchup.name,
        ruleset.name()
    );

    let seeds: Vec<u64> = config.seeds().collect();
    let run_all = || -> Vec<BattleMetrics> {
        seeds
            .par_iter()
            .map(|&seed| {
                let result = run_guarded(ruleset, &matchup.player, &matchup.opponent, seed);
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 100 == 0 {
                    debug!("Progress: {}/{}", done, config.battle_count);
                }
                BattleMetrics::from_result(format!("battle_{seed}"), seed, &result)
            })
            .collect()
    };

    let battles = if config.parallel > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build()
        {
            Ok(pool) => pool.install(run_all),
            Err(e) => {
                warn!("Failed to build thread pool ({e}), using global pool");
                run_all()
            }
        }
    } else {
        run_all()
    };

    let summary = BatchSummary::from_battles(&battles);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} battles in {:.2}s ({:.1} battles/sec)",
        battles.len(),
        duration_seconds,
        battles.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    BatchResults {
        config,
        ruleset: ruleset.name().to_string(),
        battles,
        summary,
        duration_seconds,
    }
}

/// Outcome of running one seed several times
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeterminismReport {
    /// Seed checked
    pub seed: u64,
    /// State hash of every run
    pub hashes: Vec<u64>,
    /// Whether every run produced the same hash
    pub is_deterministic: bool,
}

/// Verify determinism by running the same seed multiple times
pub fn verify_determinism(matchup: &Matchup, ruleset: &Ruleset, seed: u64, runs: u32) -> DeterminismReport {
    let hashes: Vec<u64> = (0..runs)
        .map(|_| run_guarded(ruleset, &matchup.player, &matchup.opponent, seed).state_hash())
        .collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !is_deterministic {
        warn!(seed, ?hashes, "Determinism check failed");
    }
    DeterminismReport {
        seed,
        hashes,
        is_deterministic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_config_builders() {
        let config = BatchConfig::new("duel", 3)
            .with_seed(10)
            .with_parallel(2)
            .with_output(PathBuf::from("out"));
        assert_eq!(config.seeds().collect::<Vec<_>>(), vec![10, 11, 12]);
        assert_eq!(config.parallel, 2);
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_batch_runs_every_seed() {
        let matchup = Matchup::exhibition();
        let ruleset = Ruleset::default();
        let results = run_batch(BatchConfig::new("exhibition", 12).with_seed(100), &matchup, &ruleset);

        assert_eq!(results.battles.len(), 12);
        let seeds: Vec<u64> = results.battles.iter().map(|b| b.seed).collect();
        assert_eq!(seeds, (100..112).collect::<Vec<_>>());
        let s = &results.summary;
        assert_eq!(s.total_battles, 12);
        assert_eq!(
            s.wins_by_combatant.values().sum::<u32>() + s.draws + s.aborted,
            12
        );
    }

    #[test]
    fn test_thread_count_does_not_change_results() {
        let matchup = Matchup::exhibition();
        let ruleset = Ruleset::default();
        let single = run_batch(BatchConfig::new("x", 8).with_parallel(1), &matchup, &ruleset);
        let multi = run_batch(BatchConfig::new("x", 8).with_parallel(4), &matchup, &ruleset);

        let hashes = |r: &BatchResults| r.battles.iter().map(|b| b.final_state_hash).collect::<Vec<_>>();
        assert_eq!(hashes(&single), hashes(&multi));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let matchup = Matchup::exhibition();
        let results = run_batch(BatchConfig::new("x", 3), &matchup, &Ruleset::default());
        let path = dir.path().join("nested").join(BatchResults::FILE_NAME);

        results.save(&path).unwrap();
        let loaded = BatchResults::load(&path).unwrap();
        let hashes = |r: &BatchResults| r.battles.iter().map(|b| b.final_state_hash).collect::<Vec<_>>();
        assert_eq!(hashes(&loaded), hashes(&results));
        assert_eq!(loaded.ruleset, "standard");
    }

    #[test]
    fn test_verify_determinism() {
        let report = verify_determinism(&Matchup::exhibition(), &Ruleset::default(), 42, 4);
        assert!(report.is_deterministic);
        assert_eq!(report.hashes.len(), 4);
    }
}
