//! Headless battle runner.
//!
//! Runs battles without any presentation layer. Designed for balance
//! batches, CI determinism checks and replay verification.
//!
//! # Usage
//!
//! ```bash
//! # Run a single battle and print its log
//! cargo run -p arena_headless -- run --matchup matchups/duel.ron --seed 7
//!
//! # Same battle as JSON
//! cargo run -p arena_headless -- run --matchup matchups/duel.ron --seed 7 --json
//!
//! # Run batch balance test
//! cargo run -p arena_headless -- batch --matchup matchups/duel.ron --count 1000 --output results/
//!
//! # Verify determinism
//! cargo run -p arena_headless -- verify --matchup matchups/duel.ron --seed 3 --runs 10
//! ```
//!
//! Output (stdout): battle logs or JSON
//! Logs (stderr): diagnostics

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arena_core::replay::BattleReplay;
use arena_core::ruleset::Ruleset;
use arena_headless::{
    batch::{run_batch, verify_determinism, BatchConfig, BatchResults},
    replay_file::{load_replay, save_replay},
    ruleset_loader::load_ruleset,
    runner::run_matchup,
    scenario::Matchup,
};

#[derive(Parser)]
#[command(name = "arena_headless")]
#[command(about = "Headless monster battle runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single battle
    Run {
        /// Matchup file to load (built-in exhibition if omitted)
        #[arg(short, long)]
        matchup: Option<PathBuf>,

        /// Ruleset file, overriding the matchup's own
        #[arg(short, long)]
        ruleset: Option<PathBuf>,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Print the full result as JSON instead of the log
        #[arg(long)]
        json: bool,
    },

    /// Run batch of battles for balance testing
    Batch {
        /// Matchup file to load (built-in exhibition if omitted)
        #[arg(short, long)]
        matchup: Option<PathBuf>,

        /// Ruleset file, overriding the matchup's own
        #[arg(short, long)]
        ruleset: Option<PathBuf>,

        /// Number of battles to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Worker threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Verify determinism by running one seed repeatedly
    Verify {
        /// Matchup file to load (built-in exhibition if omitted)
        #[arg(short, long)]
        matchup: Option<PathBuf>,

        /// Ruleset file, overriding the matchup's own
        #[arg(short, long)]
        ruleset: Option<PathBuf>,

        /// Seed to test
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of runs to compare
        #[arg(long, default_value = "3")]
        runs: u32,
    },

    /// Run a battle and save it as a replay
    Record {
        /// Matchup file to load (built-in exhibition if omitted)
        #[arg(short, long)]
        matchup: Option<PathBuf>,

        /// Ruleset file, overriding the matchup's own
        #[arg(short, long)]
        ruleset: Option<PathBuf>,

        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Replay file to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Replay a recorded battle
    Replay {
        /// Replay file to load
        #[arg(short, long)]
        file: PathBuf,

        /// Fail unless the re-run matches the recorded hash
        #[arg(long)]
        verify: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for results)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Some(Commands::Run {
            matchup,
            ruleset,
            seed,
            json,
        }) => cmd_run(matchup, ruleset, seed, json),
        Some(Commands::Batch {
            matchup,
            ruleset,
            count,
            parallel,
            output,
            seed,
        }) => cmd_batch(matchup, ruleset, count, parallel, output, seed),
        Some(Commands::Verify {
            matchup,
            ruleset,
            seed,
            runs,
        }) => cmd_verify(matchup, ruleset, seed, runs),
        Some(Commands::Record {
            matchup,
            ruleset,
            seed,
            output,
        }) => cmd_record(matchup, ruleset, seed, &output),
        Some(Commands::Replay { file, verify }) => cmd_replay(&file, verify),
        None => cmd_run(None, None, 0, false),
    }
}

/// Print a fatal error and exit.
fn fatal(message: impl std::fmt::Display) -> ! {
    tracing::error!("{message}");
    eprintln!("FATAL: {message}");
    process::exit(1);
}

/// Load the matchup and the ruleset it should run under.
///
/// `--ruleset` wins over the matchup's own ruleset path.
fn load_inputs(matchup: Option<PathBuf>, ruleset: Option<PathBuf>) -> (Matchup, Ruleset) {
    let matchup = match matchup {
        Some(path) => Matchup::load(&path).unwrap_or_else(|e| fatal(e)),
        None => Matchup::exhibition(),
    };
    let ruleset = match ruleset {
        Some(path) => load_ruleset(&path).unwrap_or_else(|e| fatal(e)),
        None => matchup.load_ruleset().unwrap_or_else(|e| fatal(e)),
    };
    for issue in matchup.skill_issues(&ruleset) {
        tracing::warn!(matchup = %matchup.name, "{issue}");
    }
    tracing::info!(
        matchup = %matchup.name,
        ruleset = ruleset.name(),
        player = %matchup.player.combatant.id,
        opponent = %matchup.opponent.combatant.id,
        "Inputs loaded"
    );
    (matchup, ruleset)
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => fatal(format!("Failed to encode result: {e}")),
    }
}

/// Run a single battle
fn cmd_run(matchup: Option<PathBuf>, ruleset: Option<PathBuf>, seed: u64, json: bool) {
    let (matchup, ruleset) = load_inputs(matchup, ruleset);
    let result = run_matchup(&matchup, &ruleset, seed);

    if json {
        print_json(&result);
    } else {
        for line in &result.log {
            println!("{line}");
        }
        for line in &result.activity {
            eprintln!("{line}");
        }
    }
}

/// Run batch of battles for balance testing
fn cmd_batch(
    matchup: Option<PathBuf>,
    ruleset: Option<PathBuf>,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
) {
    let (matchup, ruleset) = load_inputs(matchup, ruleset);

    if let Err(e) = std::fs::create_dir_all(&output) {
        fatal(format!(
            "Cannot create output directory '{}': {e}",
            output.display()
        ));
    }

    let config = BatchConfig::new(&matchup.name, count)
        .with_seed(seed)
        .with_parallel(parallel)
        .with_output(output.clone());
    let results = run_batch(config, &matchup, &ruleset);

    let results_path = output.join(BatchResults::FILE_NAME);
    if let Err(e) = results.save(&results_path) {
        fatal(format!("Failed to save results: {e}"));
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Battles played: {}", summary.total_battles);
    for entrant in [&matchup.player, &matchup.opponent] {
        let id = &entrant.combatant.id;
        let rate = summary.win_rates.get(id).copied().unwrap_or(0.0);
        eprintln!("  {:<16} {:>5.1}%", id, rate * 100.0);
    }
    eprintln!("Draws: {}", summary.draws);
    if summary.aborted > 0 {
        eprintln!("Aborted: {}", summary.aborted);
    }
    eprintln!(
        "Turns: avg {:.1}, min {}, max {}",
        summary.avg_turns, summary.min_turns, summary.max_turns
    );
    eprintln!("Results: {}", results_path.display());
}

/// Verify determinism
fn cmd_verify(matchup: Option<PathBuf>, ruleset: Option<PathBuf>, seed: u64, runs: u32) {
    let (matchup, ruleset) = load_inputs(matchup, ruleset);
    let report = verify_determinism(&matchup, &ruleset, seed, runs.max(2));
    print_json(&report);

    if report.is_deterministic {
        tracing::info!(seed, runs = report.hashes.len(), "Determinism verified");
    } else {
        fatal(format!("Battle with seed {seed} is not deterministic"));
    }
}

/// Record a replay
fn cmd_record(matchup: Option<PathBuf>, ruleset: Option<PathBuf>, seed: u64, output: &Path) {
    let (matchup, ruleset) = load_inputs(matchup, ruleset);
    let (replay, result) = BattleReplay::record(&ruleset, &matchup.player, &matchup.opponent, seed);

    if let Err(e) = save_replay(&replay, output) {
        fatal(e);
    }
    tracing::info!(
        path = %output.display(),
        seed,
        winner = %result.winner_id,
        hash = %format!("{:016x}", replay.final_hash),
        "Replay recorded"
    );
}

/// Replay a recorded battle
fn cmd_replay(file: &Path, verify: bool) {
    let replay = load_replay(file).unwrap_or_else(|e| fatal(e));

    let result = if verify {
        match replay.verify() {
            Ok(result) => {
                tracing::info!(seed = replay.seed, "Replay verified");
                result
            }
            Err(e) => fatal(e),
        }
    } else {
        replay.replay()
    };

    for line in &result.log {
        println!("{line}");
    }
}
