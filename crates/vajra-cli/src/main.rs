//! Vajra swarm driver
//!
//! Runs the voxel swarm headless with a synthetic stimulus and reports how
//! far the lattice assembled.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use glam::DVec2;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vajra_swarm::{
    DockingTieBreak, SpatialBackend, Stimulus, Swarm, SwarmConfig, SwarmEvent, TraversalOrder,
};

#[derive(Parser, Debug)]
#[command(name = "vajra", version, about = "Simulate decentralized voxel self-assembly")]
struct Cli {
    /// JSON file with simulation settings; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of voxels to spawn.
    #[arg(long)]
    agents: Option<usize>,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Seed for spawn positions and shuffled traversal.
    #[arg(long)]
    seed: Option<u64>,

    /// Stimulus point as `X,Y` (defaults to the world center).
    #[arg(long, value_parser = parse_point)]
    stimulus: Option<DVec2>,

    /// The stimulus stays active for this many ticks.
    #[arg(long, default_value_t = 60)]
    stimulus_ticks: u64,

    /// Order voxels are visited in each tick.
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// How a face picks among several valid partners.
    #[arg(long, value_enum)]
    tie_break: Option<TieBreakArg>,

    /// Neighbor query backend.
    #[arg(long, value_enum)]
    spatial: Option<SpatialArg>,

    /// Log progress every N ticks (0 disables).
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// Write the final snapshot as JSON.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Write all lock events as JSON lines.
    #[arg(long)]
    events: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderArg {
    Ascending,
    Descending,
    Shuffled,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TieBreakArg {
    First,
    Nearest,
    LowestId,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SpatialArg {
    BruteForce,
    Grid,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vajra=info,vajra_swarm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = build_config(&cli)?;
    info!(
        agents = config.num_agents,
        seed = config.seed,
        traversal = ?config.traversal,
        tie_break = ?config.tie_break,
        spatial = ?config.spatial,
        "starting swarm"
    );

    let mut swarm = Swarm::new(config).context("cannot build swarm")?;
    let point = cli.stimulus.unwrap_or_else(|| swarm.config().bounds.center());
    let mut events: Vec<SwarmEvent> = Vec::new();

    for _ in 0..cli.ticks {
        let stimulus = if swarm.current_tick() < cli.stimulus_ticks {
            Stimulus::at(point)
        } else {
            Stimulus::inactive()
        };
        let summary = swarm.tick(stimulus);
        if cli.events.is_some() {
            events.extend(swarm.drain_events());
        }

        if cli.report_every > 0 && summary.tick % cli.report_every == 0 {
            info!(
                tick = summary.tick,
                locked = summary.locked,
                fluid = summary.fluid,
                clusters = swarm.cluster_count(),
                "progress"
            );
        }
    }

    println!("Vajra swarm");
    println!("===========");
    println!("  Ticks:    {}", swarm.current_tick());
    println!("  Locked:   {}", swarm.locked_count());
    println!("  Fluid:    {}", swarm.fluid_count());
    println!("  Clusters: {}", swarm.cluster_count());
    println!("  Radius:   {}", swarm.lattice_radius());

    if let Some(path) = &cli.snapshot {
        write_snapshot(path, &swarm)?;
        info!(path = %path.display(), "snapshot written");
    }
    if let Some(path) = &cli.events {
        write_events(path, &events)?;
        info!(path = %path.display(), count = events.len(), "events written");
    }

    if let Err(violation) = swarm.check_invariants() {
        error!(%violation, "invariant check failed");
        bail!("invariant check failed: {violation}");
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<SwarmConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => SwarmConfig::default(),
    };

    if let Some(agents) = cli.agents {
        config.num_agents = agents;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(order) = cli.order {
        config.traversal = match order {
            OrderArg::Ascending => TraversalOrder::Ascending,
            OrderArg::Descending => TraversalOrder::Descending,
            OrderArg::Shuffled => TraversalOrder::Shuffled { seed: config.seed },
        };
    }
    if let Some(tie_break) = cli.tie_break {
        config.tie_break = match tie_break {
            TieBreakArg::First => DockingTieBreak::FirstFound,
            TieBreakArg::Nearest => DockingTieBreak::Nearest,
            TieBreakArg::LowestId => DockingTieBreak::LowestId,
        };
    }
    if let Some(spatial) = cli.spatial {
        config.spatial = match spatial {
            SpatialArg::BruteForce => SpatialBackend::BruteForce,
            SpatialArg::Grid => SpatialBackend::Grid,
        };
    }

    config.validate()?;
    Ok(config)
}

fn parse_point(s: &str) -> std::result::Result<DVec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got `{s}`"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x `{x}`: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y `{y}`: {e}"))?;
    Ok(DVec2::new(x, y))
}

fn write_snapshot(path: &Path, swarm: &Swarm) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &swarm.snapshot())?;
    Ok(())
}

fn write_events(path: &Path, events: &[SwarmEvent]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for event in events {
        serde_json::to_writer(&mut out, event)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
