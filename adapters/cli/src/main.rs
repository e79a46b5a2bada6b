#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots The Labyrinth Of Soul.

mod script;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use labyrinth_core::{GameStatus, WINDOW_TITLE};
use labyrinth_rendering::{Color, Presentation, RenderingBackend, TextDisplay};
use labyrinth_rendering_macroquad::MacroquadBackend;
use labyrinth_system_orchestrator::{campaign::Campaign, config::GameConfig, TickOrchestrator};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::script::parse_script;

/// Command-line arguments accepted by the `labyrinth` binary.
#[derive(Debug, Parser)]
#[command(name = "labyrinth", version, about = "The Labyrinth Of Soul")]
struct CliArgs {
    /// TOML file overriding the default game rules.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Level file to play; repeat to build a campaign. Defaults to the built-in levels.
    #[arg(long = "level", value_name = "FILE")]
    levels: Vec<PathBuf>,
    /// Inputs played one per tick (U, D, L, R, A, or '.' to wait). Implies --headless.
    #[arg(long, value_name = "MOVES")]
    script: Option<String>,
    /// Number of ticks simulated in headless mode before giving up.
    #[arg(long, value_name = "N", default_value_t = 600)]
    max_ticks: u64,
    /// Run without a window, printing frames to stdout.
    #[arg(long)]
    headless: bool,
    /// Log filter directive, for example `debug` or `labyrinth_world=trace`.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
    /// Milliseconds an enemy waits between two steps.
    #[arg(long, value_name = "MS")]
    enemy_step_ms: Option<u64>,
    /// Milliseconds of simulated time per frame.
    #[arg(long, value_name = "MS")]
    frame_interval_ms: Option<u64>,
    /// Print frame timing metrics once per second.
    #[arg(long)]
    show_fps: bool,
}

impl CliArgs {
    fn runs_headless(&self) -> bool {
        self.headless || self.script.is_some()
    }
}

/// Entry point for the Labyrinth command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_level.as_deref())?;

    let config = load_config(&args)?;
    let campaign = load_campaign(&args.levels)?;
    let frame_interval = config.frame_interval();
    let lattice = config.lattice();
    let mut orchestrator =
        TickOrchestrator::new(config, campaign).context("failed to start the game")?;

    if args.runs_headless() {
        let script = parse_script(args.script.as_deref().unwrap_or_default())?;
        let stdout = io::stdout();
        let status = run_headless(orchestrator, &script, args.max_ticks, &mut stdout.lock())?;
        info!(?status, "headless run finished");
        return Ok(());
    }

    let presentation = Presentation::new(
        WINDOW_TITLE,
        Color::from_rgb_u8(0, 0, 0),
        lattice,
        frame_interval,
    );
    MacroquadBackend::new()
        .with_show_fps(args.show_fps)
        .run(presentation, move |dt, input, recorder| {
            let _ = orchestrator.tick(dt, &input.inputs, recorder);
        })
}

fn init_tracing(log_level: Option<&str>) -> Result<()> {
    let filter = match log_level {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter {directive:?}"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn load_config(args: &CliArgs) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let source = read_source(path)?;
            GameConfig::from_toml_str(&source)
                .with_context(|| format!("invalid config file {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    if let Some(enemy_step_ms) = args.enemy_step_ms {
        config.enemy_step_ms = enemy_step_ms;
    }
    if let Some(frame_interval_ms) = args.frame_interval_ms {
        config.frame_interval_ms = frame_interval_ms;
    }
    Ok(config)
}

fn load_campaign(paths: &[PathBuf]) -> Result<Campaign> {
    if paths.is_empty() {
        return Campaign::builtin().context("built-in levels are invalid");
    }

    let sources = paths
        .iter()
        .map(|path| read_source(path))
        .collect::<Result<Vec<_>>>()?;
    Campaign::from_sources(&sources).context("failed to load levels")
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Plays `script` one input per tick, printing every frame that differs from
/// the previous one, until the session ends or `max_ticks` is reached.
fn run_headless<W>(
    mut orchestrator: TickOrchestrator,
    script: &[Option<labyrinth_core::PlayerInput>],
    max_ticks: u64,
    out: &mut W,
) -> Result<GameStatus>
where
    W: Write,
{
    let dt = orchestrator.config().frame_interval();
    let mut display = TextDisplay::new(orchestrator.config().lattice());
    let mut previous = String::new();
    let mut status = orchestrator.status();
    let mut ticks = 0;

    while ticks < max_ticks && !status.is_terminal() {
        let index = usize::try_from(ticks).unwrap_or(usize::MAX);
        let inputs: Vec<_> = script.get(index).copied().flatten().into_iter().collect();
        status = orchestrator.tick(dt, &inputs, &mut display);
        ticks += 1;

        if display.frame() != previous {
            writeln!(out, "tick {ticks}")?;
            write!(out, "{}", display.frame())?;
            writeln!(out)?;
            previous = display.frame().to_owned();
        }
    }

    writeln!(out, "{status:?} after {ticks} ticks")?;
    Ok(status)
}
