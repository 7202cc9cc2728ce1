//! Reel spin rig
//!
//! Usage:
//!   rf-reel-sim spin                  - One Start/Stop round with defaults
//!   rf-reel-sim spin --spins 5 --json - Several rounds, trace as JSON
//!   rf-reel-sim config                - Print the effective rig config

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use rf_reel_sim::{RigConfig, SpinRig};

#[derive(Parser)]
#[command(name = "rf-reel-sim", about = "Headless reel spin rig")]
struct Cli {
    /// Rig config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the number of reel items
    #[arg(long, global = true)]
    items: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate Start → hold → Stop rounds
    Spin {
        /// Seconds from Start press to Stop press
        #[arg(long, default_value_t = 3.5)]
        hold: f64,

        /// Number of rounds
        #[arg(short, long, default_value_t = 1)]
        spins: u32,

        /// Frame rate of the simulated clock
        #[arg(long, default_value_t = 60.0)]
        fps: f32,

        /// Print the full trace as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Print the effective config as JSON
    Config,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RigConfig::from_file(path)
            .with_context(|| format!("Failed to load rig config {}", path.display()))?,
        None => RigConfig::default(),
    };
    if let Some(items) = cli.items {
        config.layout.items = items;
    }

    match cli.command {
        Commands::Spin {
            hold,
            spins,
            fps,
            json,
        } => spin(config, hold, spins, fps, json),
        Commands::Config => {
            println!("{}", config.to_json()?);
            Ok(())
        }
    }
}

fn spin(config: RigConfig, hold: f64, spins: u32, fps: f32, json: bool) -> Result<()> {
    if !fps.is_finite() || fps <= 0.0 {
        bail!("fps must be positive, got {fps}");
    }
    let dt = 1.0 / fps;

    let mut rig = SpinRig::new(config).context("Invalid rig config")?;
    log::info!("Simulating {spins} spin(s) at {fps} fps");

    let mut reports = Vec::with_capacity(spins as usize);
    for round in 1..=spins {
        let report = rig
            .simulate_spin(hold, dt)
            .with_context(|| format!("Spin {round} did not complete"))?;
        reports.push(report);
    }

    if json {
        println!("{}", rig.trace().to_json()?);
        return Ok(());
    }

    println!("═══════════════════════════════════════════════════════════════");
    println!("  Reel spin rig");
    println!("═══════════════════════════════════════════════════════════════");
    for report in &reports {
        let error = report
            .center_error
            .map_or_else(|| "-".to_string(), |e| format!("{e:+.3}"));
        println!(
            "  #{:<3} hold {:>6.3}s  settle {:>6.3}s  slot {:>4}  error {}",
            report.spin_index,
            report.spin_secs(),
            report.settle_secs(),
            report
                .centered
                .map_or_else(|| "-".to_string(), |slot| slot.to_string()),
            error
        );
    }
    println!("───────────────────────────────────────────────────────────────");
    println!(
        "  {} frames, {:.3}s simulated, {} stop effect(s)",
        rig.frames(),
        rig.time(),
        rig.effect_plays()
    );

    Ok(())
}
