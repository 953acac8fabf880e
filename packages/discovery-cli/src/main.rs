// Command-line runner for the channel discovery engine

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use discovery_engine::{
    DiscoveryConfig, Orchestrator, SeedResource, SessionReport, StateStore, TerminationReason,
};
use youtube_client::YouTubeClient;

use config::Config;

const DEFAULT_SEEDS: &str = include_str!("../seeds/sri_lanka.json");

#[derive(Parser, Debug)]
#[command(
    name = "discover",
    about = "Quota-aware, resumable YouTube channel discovery",
    version
)]
struct Args {
    /// Stop once this many channels are validated in total.
    #[arg(long, default_value_t = 10_000)]
    target: usize,

    /// Directory holding the progressive state files.
    #[arg(long, default_value = "data/discovery")]
    output_dir: PathBuf,

    /// Seed-list JSON; defaults to the bundled Sri Lanka resource.
    #[arg(long)]
    seeds: Option<PathBuf>,

    /// Verbose engine logging.
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.debug {
        "info,discovery_engine=debug,youtube_client=debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("failed to load configuration")?;

    let seeds = match &args.seeds {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read seed file {}", path.display()))?;
            SeedResource::from_json(&raw)?
        }
        None => SeedResource::from_json(DEFAULT_SEEDS)?,
    };
    tracing::info!(
        version = seeds.version,
        keywords = seeds.keywords.len(),
        "seed resource loaded"
    );

    let client = YouTubeClient::new(config.api_keys)?;
    let store = StateStore::open(&args.output_dir)?;
    let engine_config = DiscoveryConfig::default().with_target(args.target);

    let report = Orchestrator::new(&client, &seeds, engine_config, store)
        .run()
        .await?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &SessionReport) {
    println!();
    println!("{}", "Discovery session complete".bright_green().bold());
    println!("  session:            {}", report.session_id);
    println!("  discovered (run):   {}", report.discovered_this_session);
    println!("  validated (run):    {}", report.validated_this_session);
    println!("  discovered (total): {}", report.total_discovered);
    println!("  validated (total):  {}", report.total_validated);
    println!("  api calls:          {}", report.api_calls);
    println!("  units spent:        {}", report.quota.total_units);
    for key in &report.quota.keys {
        let state = if key.exhausted {
            "exhausted".red()
        } else {
            "available".green()
        };
        println!("    key {}: {} units ({})", key.index + 1, key.units, state);
    }
    match report.termination {
        TerminationReason::TargetReached => {
            println!("{}", "Target reached.".bright_green())
        }
        TerminationReason::QuotaExhausted => println!(
            "{}",
            "Quota exhausted. This is expected: re-run after the quota window resets."
                .yellow()
        ),
        TerminationReason::Drained => println!(
            "{}",
            "Strategies drained; nothing new to discover right now.".bright_blue()
        ),
    }
}
