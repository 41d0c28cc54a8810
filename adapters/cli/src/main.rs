#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays maze chase rounds headlessly.

mod input;
mod maze_file;

use std::{
    fs,
    path::{Path, PathBuf},
    thread,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use maze_chase_core::{ChaseConfig, PlannerMode, RoundState};
use maze_chase_round::{FrameInput, RoundController, Status};
use maze_chase_world::query;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{input::Pilot, maze_file::MazeFile};

/// Command-line arguments accepted by the `maze-chase` binary.
#[derive(Debug, Parser)]
#[command(name = "maze-chase", about = "Run maze chase rounds without a window")]
struct Cli {
    /// JSON file holding rows of 0 (road) and 1 (wall) markers.
    #[arg(long)]
    maze: PathBuf,
    /// TOML file with chase tunables; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Overrides the configured placement seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Overrides the configured planning policy.
    #[arg(long, value_enum)]
    planner: Option<PlannerArg>,
    /// Number of rounds to play before quitting.
    #[arg(long, default_value_t = 1)]
    rounds: u32,
    /// Ticks after which an unfinished round is abandoned.
    #[arg(long, default_value_t = 3_600)]
    max_ticks: u32,
    /// Scripted player moves made of U, D, L, R and `.` (wait).
    #[arg(long, conflicts_with = "autopilot")]
    moves: Option<String>,
    /// Steers the player toward the exit.
    #[arg(long)]
    autopilot: bool,
    /// Sleeps between ticks to honour the configured frame-rate cap.
    #[arg(long)]
    realtime: bool,
    /// Prints round reports as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlannerArg {
    Immediate,
    Throttled,
}

impl From<PlannerArg> for PlannerMode {
    fn from(value: PlannerArg) -> Self {
        match value {
            PlannerArg::Immediate => Self::Immediate,
            PlannerArg::Throttled => Self::Throttled,
        }
    }
}

/// Result of one played round.
#[derive(Debug, Serialize)]
struct RoundReport {
    round: u32,
    state: RoundState,
    ticks: u32,
    score: u32,
    coins_collected: u32,
    coins_total: u32,
    elapsed_secs: f32,
}

/// Entry point for the maze chase command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let reports = run(&cli)?;

    if cli.json {
        let rendered =
            serde_json::to_string_pretty(&reports).context("failed to serialise round reports")?;
        println!("{rendered}");
    } else {
        for report in &reports {
            println!(
                "round {}: {:?} after {} ticks, score {} ({}/{} coins, {:.2}s)",
                report.round,
                report.state,
                report.ticks,
                report.score,
                report.coins_collected,
                report.coins_total,
                report.elapsed_secs
            );
        }
    }

    Ok(())
}

fn run(cli: &Cli) -> Result<Vec<RoundReport>> {
    if cli.rounds == 0 {
        bail!("--rounds must be at least 1");
    }

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(planner) = cli.planner {
        config.planner.mode = planner.into();
    }
    config.validate().context("invalid chase configuration")?;

    let (source, grid) = MazeFile::open(&cli.maze)
        .with_context(|| format!("failed to load maze from {}", cli.maze.display()))?;
    let frame_duration = config.frame_duration();
    let mut controller =
        RoundController::new(config, grid, source).context("failed to lay out the first round")?;

    let mut pilot = match (&cli.moves, cli.autopilot) {
        (Some(script), _) => Pilot::scripted(script).context("invalid --moves script")?,
        (None, true) => Pilot::autopilot(),
        (None, false) => Pilot::Idle,
    };

    let mut reports = Vec::new();
    for played in 1..=cli.rounds {
        let mut ticks = 0;
        while controller.state() == RoundState::Playing && ticks < cli.max_ticks {
            let frame = controller.frame();
            let intent = pilot.intent(&frame, query::grid(controller.world()).view());
            let input = FrameInput {
                intent,
                ..FrameInput::default()
            };
            let _ = controller.tick(frame_duration, input)?;
            ticks += 1;
            if cli.realtime {
                thread::sleep(frame_duration);
            }
        }

        let frame = controller.frame();
        reports.push(RoundReport {
            round: frame.round.get(),
            state: frame.state,
            ticks,
            score: frame.stats.score,
            coins_collected: frame.stats.coins_collected,
            coins_total: frame.stats.coins_total,
            elapsed_secs: frame.stats.elapsed.as_secs_f32(),
        });

        if frame.state == RoundState::Playing {
            warn!(round = frame.round.get(), ticks, "round abandoned unfinished");
            return Ok(reports);
        }
        if played < cli.rounds {
            pilot.rewind();
            let _ = controller
                .tick(frame_duration, FrameInput::restart())
                .context("failed to lay out the next round")?;
        }
    }

    if controller.tick(frame_duration, FrameInput::quit())? == Status::Terminated {
        info!(rounds = reports.len(), "session finished");
    }
    Ok(reports)
}

fn load_config(path: Option<&Path>) -> Result<ChaseConfig> {
    let Some(path) = path else {
        return Ok(ChaseConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("failed to parse config {}", path.display()))
}
