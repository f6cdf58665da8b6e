//! Behaviour runner CLI
//!
//! Replays recorded or synthetic perception frames through the body and head
//! stacks and prints what each stack did.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use sm_behaviour::{body_catalog, head_catalog, BehaviourConfig, RunReport, Runner, Scenario};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "sm_behaviour")]
#[command(about = "Run robot behaviour stacks against perception scenarios", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Replay a scenario JSON file
    Run {
        /// Scenario JSON file path
        #[arg(long)]
        scenario: PathBuf,

        /// Behaviour config (YAML, or JSON by extension)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Generate a seeded synthetic scenario and run it
    Simulate {
        #[arg(long, default_value = "42")]
        seed: u64,

        #[arg(long, default_value = "100")]
        frames: usize,

        /// Behaviour config (YAML, or JSON by extension)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List the registered body and head elements
    Catalog {
        /// Behaviour config (YAML, or JSON by extension)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { scenario, config, json } => {
            let config = load_config(config.as_deref())?;
            let scenario = Scenario::load(&scenario)
                .with_context(|| format!("loading scenario {}", scenario.display()))?;
            let report = Runner::new(config)?.run(&scenario)?;
            print_report(&report, json)?;
        }

        Commands::Simulate { seed, frames, config, json } => {
            let config = load_config(config.as_deref())?;
            let scenario = Scenario::synthetic(seed, frames);
            let report = Runner::new(config)?.run(&scenario)?;
            print_report(&report, json)?;
        }

        Commands::Catalog { config } => {
            let config = std::sync::Arc::new(load_config(config.as_deref())?);
            for (stack, catalog) in [
                ("body", body_catalog(config.clone())?),
                ("head", head_catalog(config.clone())?),
            ] {
                println!("{} ({} elements)", stack, catalog.len());
                for (kind, role) in catalog.entries() {
                    println!("   {:<22} {}", kind, role);
                }
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn load_config(path: Option<&Path>) -> Result<BehaviourConfig> {
    match path {
        Some(path) => BehaviourConfig::load(path).with_context(|| format!("loading config {}", path.display())),
        None => Ok(BehaviourConfig::default()),
    }
}

#[cfg(feature = "cli")]
fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Scenario {} ({} frames)", report.scenario, report.frames.len());
    println!("   Generated: {}", report.generated_at);
    for frame in &report.frames {
        println!(
            "{:>7.2}s  body {:<60} head {}",
            frame.time,
            frame.body_stack.to_string(),
            frame.head_stack
        );
        for command in &frame.commands {
            println!("           -> {:?}", command);
        }
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("sm_behaviour CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
