//! Monster Arena - Development Tools

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "arena-tools")]
#[command(about = "Development tools for Monster Arena")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate ruleset data files
    Validate {
        /// Path to ruleset directory
        #[arg(default_value = "data/rulesets")]
        path: String,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            tracing::info!("Validating ruleset files in: {path}");
            match arena_tools::validate::validate_data_directory(std::path::Path::new(&path)) {
                Ok(report) => {
                    for file in &report.files {
                        for issue in &file.issues {
                            tracing::warn!(path = %file.path.display(), "{issue}");
                        }
                        if let Some(fatal) = &file.fatal {
                            tracing::error!(path = %file.path.display(), "{fatal}");
                        }
                    }
                    if report.has_fatal() {
                        tracing::error!(
                            "Validation failed: {} of {} files unusable",
                            report.fatal_count(),
                            report.files.len()
                        );
                        std::process::exit(1);
                    }
                    tracing::info!(
                        "Validation passed: {} files, {} warnings",
                        report.files.len(),
                        report.issue_count()
                    );
                }
                Err(e) => {
                    tracing::error!("Validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
