//! worldreach - headless targeting probe
//!
//! Loads a world (catalog or seeded scatter), replays scripted player input
//! through the interaction manager and exports events and metrics.

mod config;
mod probe;
mod scatter;
mod scripted_input;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use worldreach_testkit::{
    JsonlSink, MetricsReportBuilder, MetricsSink, TestExecutionMetrics, TestResult,
};
use worldreach_world::{catalog_from_file, InteractionManager};

use config::{ProbeConfig, DEFAULT_CONFIG_PATH};
use probe::Probe;
use scripted_input::{ScriptedInputPlayer, ScriptedStep};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless targeting probe for worldreach", long_about = None)]
struct Args {
    /// Probe configuration (TOML)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Object catalog (JSON) to load
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Scatter this many seeded objects in addition to the catalog
    #[arg(long)]
    scatter: Option<usize>,

    /// Seed for scattered worlds
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Half width of the scattered square, in world units
    #[arg(long, default_value_t = 500.0)]
    extent: f32,

    /// Scripted input (JSON); defaults to a sweep along +X
    #[arg(long)]
    script: Option<PathBuf>,

    /// Write hover/interaction events as JSONL
    #[arg(long)]
    events: Option<PathBuf>,

    /// Write a metrics report (JSON)
    #[arg(long)]
    metrics: Option<PathBuf>,
}

/// Walk from the origin along +X for 200 frames, pressing every default key once per step.
fn default_script() -> Result<ScriptedInputPlayer> {
    let keys = ['E', 'F', 'G', 'T', 'M', 'X'];
    let steps = (0..20)
        .map(|i| {
            ScriptedStep::new(Vec3::new(i as f32 * 10.0, 1.5, 0.0), Vec3::X)
                .walking(Vec3::X, 10)
                .with_keys(keys)
        })
        .collect();
    ScriptedInputPlayer::from_steps(steps)
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    info!("Starting worldreach probe v{}", env!("CARGO_PKG_VERSION"));
    let run_start = Instant::now();

    let config = ProbeConfig::load_from_path(&args.config);
    let bindings = config.key_bindings();
    let mut manager = InteractionManager::new(config.interaction.clone());

    if let Some(path) = &args.catalog {
        let catalog = catalog_from_file(path)
            .with_context(|| format!("loading catalog {}", path.display()))?;
        manager.load_catalog(&catalog);
    }
    if let Some(count) = args.scatter {
        scatter::scatter_world(&mut manager, count, args.seed, args.extent);
    }
    if manager.is_empty() {
        warn!("World is empty; pass --catalog or --scatter");
    }

    let frames = match &args.script {
        Some(path) => ScriptedInputPlayer::from_path(path)?,
        None => default_script()?,
    };

    let events = args
        .events
        .as_ref()
        .map(|path| {
            JsonlSink::create(path).with_context(|| format!("creating {}", path.display()))
        })
        .transpose()?;

    let tally = Probe::new(&mut manager, bindings, events).run(frames)?;
    let unbound = tally.unbound_keys;
    let interaction = tally.into_metrics(&manager);
    manager.log_stats();

    if let Some(path) = &args.metrics {
        let report = MetricsReportBuilder::new("worldreach_probe")
            .result(TestResult::Pass)
            .interaction(interaction.clone())
            .execution(TestExecutionMetrics {
                duration_seconds: run_start.elapsed().as_secs_f64(),
                assertions_checked: None,
                validations_passed: None,
            })
            .build();
        MetricsSink::create(path)
            .and_then(|sink| sink.write(&report))
            .with_context(|| format!("writing metrics {}", path.display()))?;
    }

    println!("{}", serde_json::to_string_pretty(&manager.stats())?);
    println!(
        "updates={} hovered={} permitted={} denied={} unbound_keys={}",
        interaction.updates,
        interaction.hovered_updates,
        interaction.interactions_permitted,
        interaction.interactions_denied,
        unbound
    );
    Ok(())
}
