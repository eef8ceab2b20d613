use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use fairway::entity::types::{CandidateRecord, CanonicalEntity};
use fairway::pipeline;
use fairway::report::{self, PurityReport};
use fairway::TARGET_PIPELINE;

#[derive(Parser)]
#[clap(name = "fairway", about = "Build and audit a curated golf course directory")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dedupe raw candidates and build canonical entities
    Build {
        /// Candidate records JSON
        #[clap(short, long)]
        input: PathBuf,

        /// Where to write the built entities
        #[clap(short, long, default_value = "entities.json")]
        output: PathBuf,
    },

    /// Audit built entities and write the curated set plus reports
    Audit {
        /// Built entities JSON
        #[clap(short, long)]
        input: PathBuf,

        /// Directory for the audit artifacts
        #[clap(short, long, default_value = "audit")]
        output_dir: PathBuf,
    },

    /// Print a saved purity report
    Report {
        /// Purity report JSON
        #[clap(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    fairway::logging::configure_logging();

    let args = Cli::parse();
    match args.command {
        Commands::Build { input, output } => {
            let candidates: Vec<CandidateRecord> = load_json(&input)?;
            info!(
                target: TARGET_PIPELINE,
                "Loaded {} candidates from {}", candidates.len(), input.display()
            );
            let entities = pipeline::run_build(candidates);
            save_json(&output, &entities)?;
            info!(
                target: TARGET_PIPELINE,
                "Wrote {} entities to {}", entities.len(), output.display()
            );
        }
        Commands::Audit { input, output_dir } => {
            let entities: Vec<CanonicalEntity> = load_json(&input)?;
            info!(
                target: TARGET_PIPELINE,
                "Loaded {} entities from {}", entities.len(), input.display()
            );
            let outcome = pipeline::run_audit(entities);

            fs::create_dir_all(&output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;
            save_json(&output_dir.join("purified.json"), &outcome.kept)?;
            save_json(&output_dir.join("excluded.json"), &outcome.excluded)?;
            save_json(&output_dir.join("manual_review.json"), &outcome.manual_review)?;
            save_json(&output_dir.join("purity_report.json"), &outcome.report)?;

            print!("{}", report::render(&outcome.report));
        }
        Commands::Report { input } => {
            let saved: PurityReport = load_json(&input)?;
            print!("{}", report::render(&saved));
        }
    }

    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(value)?;
    fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))
}
