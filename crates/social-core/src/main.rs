//! Social Simulation Engine
//!
//! Headless runner: a population of faction agents converting each other on
//! a toroidal plane, stepped locally or by an external physics backend.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use social_core::output::{write_report, ReportCollector, REPORT_OUTPUT_PATH};
use social_core::setup::spawn_summary;
use social_core::{
    ControlScript, DriveOutcome, HttpBackend, PersonalityCatalog, SimConfig, Simulation,
    SyncAdapter, SyncMode,
};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "social_sim")]
#[command(about = "An agent-based faction simulation engine")]
struct Args {
    /// Random seed for reproducibility (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of drive steps to run
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Population size (overrides config)
    #[arg(long)]
    agents: Option<usize>,

    /// World width (overrides config)
    #[arg(long)]
    width: Option<f64>,

    /// World height (overrides config)
    #[arg(long)]
    height: Option<f64>,

    /// dt multiplier (overrides config)
    #[arg(long)]
    speed: Option<f64>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Personality catalog JSON (overrides config)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// External physics backend base URL (overrides config)
    #[arg(long)]
    backend_url: Option<String>,

    /// Interval between progress lines and history samples (in ticks)
    #[arg(long, default_value_t = 100)]
    report_interval: u64,

    /// Write a JSON run report to this path
    #[arg(long, num_args = 0..=1, default_missing_value = REPORT_OUTPUT_PATH)]
    report: Option<PathBuf>,

    /// JSON script of operator commands keyed by drive step
    #[arg(long)]
    script: Option<PathBuf>,
}

fn load_config(args: &Args) -> SimConfig {
    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path).unwrap_or_else(|e| {
            eprintln!("Error: could not load config {}: {}", path.display(), e);
            process::exit(1);
        }),
        None => SimConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.world.seed = seed;
    }
    if let Some(agents) = args.agents {
        config.world.population = agents;
    }
    if let Some(width) = args.width {
        config.world.width = width;
    }
    if let Some(height) = args.height {
        config.world.height = height;
    }
    if let Some(speed) = args.speed {
        config.world.speed = speed;
    }
    if let Some(catalog) = &args.catalog {
        config.catalog.path = Some(catalog.clone());
    }
    if let Some(url) = &args.backend_url {
        config.backend.url = Some(url.clone());
    }

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
    config
}

fn build_adapter(config: &SimConfig) -> SyncAdapter<HttpBackend> {
    let Some(url) = &config.backend.url else {
        return SyncAdapter::local();
    };
    match HttpBackend::new(url, Duration::from_millis(config.backend.timeout_ms)) {
        Ok(backend) => SyncAdapter::connect(backend),
        Err(e) => {
            warn!(error = %e, "Could not build backend client, using local engine");
            SyncAdapter::local()
        }
    }
}

fn mode_name(mode: SyncMode) -> &'static str {
    match mode {
        SyncMode::Local => "local",
        SyncMode::Remote => "remote",
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = load_config(&args);

    println!("Social Simulation Engine");
    println!("========================");
    println!("Seed: {}", config.world.seed);
    println!("Ticks: {}", args.ticks);
    println!("World: {}x{}", config.world.width, config.world.height);
    println!("Speed: {}", config.world.speed);
    println!();

    let catalog = PersonalityCatalog::load_or_builtin(config.catalog.path.as_deref());
    println!("Loaded {} archetypes", catalog.len());

    let script = match &args.script {
        Some(path) => ControlScript::from_file(path).unwrap_or_else(|e| {
            eprintln!("Error: could not load script {}: {}", path.display(), e);
            process::exit(1);
        }),
        None => ControlScript::default(),
    };
    if !script.is_empty() {
        println!("Loaded {} scripted commands", script.len());
    }

    let mut sim = Simulation::new(&config, catalog).unwrap_or_else(|e| {
        eprintln!("Error: could not build world: {}", e);
        process::exit(1);
    });
    let adapter = build_adapter(&config);

    // The remote world must match the local one before positional sync
    if adapter.mode() == SyncMode::Remote {
        if let Err(e) = adapter.reset(&mut sim, config.bounds()) {
            eprintln!("Error: reset failed: {}", e);
            process::exit(1);
        }
    }

    let summary = spawn_summary(sim.population());
    println!("Spawned {} agents ({} mode)", summary.total_agents, mode_name(adapter.mode()));
    for (faction, count) in &summary.by_faction {
        println!("    {}: {}", faction, count);
    }

    println!();
    println!("Starting simulation...");
    println!();

    let mut collector = ReportCollector::new();
    let mut dropped = 0u64;

    for step in 0..args.ticks {
        for command in script.due_at(step) {
            if let Err(e) = adapter.apply(&mut sim, command) {
                warn!(step, error = %e, ?command, "Scripted command rejected");
            }
        }

        match adapter.drive(&mut sim, 1.0) {
            Ok(DriveOutcome::Ticked(_)) => collector.record_interactions(sim.interactions()),
            Ok(DriveOutcome::Dropped) => dropped += 1,
            Ok(DriveOutcome::Paused) => {}
            Err(e) => {
                eprintln!("Error: step {} failed: {}", step, e);
                break;
            }
        }

        let metrics = sim.metrics_snapshot();
        collector.observe_counts(&metrics.counts);

        if args.report_interval > 0 && (step + 1) % args.report_interval == 0 {
            collector.record_metrics(&metrics);
            println!(
                "[Tick {:>5}] {} - population {}, entropy {:.3}",
                metrics.tick, metrics.phase, metrics.population, metrics.entropy
            );
        }
    }

    let final_metrics = sim.metrics_snapshot();
    let final_mode = mode_name(adapter.mode());

    println!();
    println!(
        "Simulation complete. Ran {} ticks, ending in phase {} ({} mode).",
        final_metrics.tick, final_metrics.phase, final_mode
    );
    println!(
        "  Entropics: {}, Luminaries: {}, Catalysts: {}, Inert: {}",
        final_metrics.counts.entropics,
        final_metrics.counts.luminaries,
        final_metrics.counts.catalysts,
        final_metrics.counts.inert
    );
    println!(
        "  Interactions: {} ({} applied)",
        collector.total_interactions, collector.applied_interactions
    );
    if dropped > 0 {
        println!("  Dropped {} overlapping backend requests", dropped);
    }

    if let Some(path) = &args.report {
        let report = collector.generate_report(
            config.world.seed,
            final_metrics.tick,
            final_mode,
            final_metrics,
        );
        match write_report(&report, path) {
            Ok(()) => println!("Wrote report to {}", path.display()),
            Err(e) => eprintln!("Warning: Could not write report: {}", e),
        }
    }
}
