mod game;
mod term;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gridsnake::{Config, FoodPolicy, SelfCollision};

/// Grid snake in the terminal.
#[derive(Parser, Debug)]
#[command(name = "gridsnake", version, about)]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Milliseconds between moves
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Board width in cells (default: fit the terminal)
    #[arg(long)]
    columns: Option<u16>,

    /// Board height in cells (default: fit the terminal)
    #[arg(long)]
    rows: Option<u16>,

    /// Characters per cell side
    #[arg(long)]
    cell_size: Option<u16>,

    #[arg(long, value_enum)]
    food_policy: Option<FoodPolicy>,

    #[arg(long, value_enum)]
    self_collision: Option<SelfCollision>,

    #[arg(long)]
    initial_length: Option<usize>,

    /// Random picks before food placement falls back to a full scan
    #[arg(long)]
    max_food_attempts: Option<u32>,

    /// Frames kept for export
    #[arg(long)]
    history_capacity: Option<usize>,

    /// Seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs here (the terminal itself is taken by the game)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Where `E` saves exported frames
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(v) = self.tick_ms { config.tick_ms = v; }
        if let Some(v) = self.columns { config.columns = Some(v); }
        if let Some(v) = self.rows { config.rows = Some(v); }
        if let Some(v) = self.cell_size { config.cell_size = v; }
        if let Some(v) = self.food_policy { config.food_policy = v; }
        if let Some(v) = self.self_collision { config.self_collision = v; }
        if let Some(v) = self.initial_length { config.initial_length = v; }
        if let Some(v) = self.max_food_attempts { config.max_food_attempts = v; }
        if let Some(v) = self.history_capacity { config.history_capacity = v; }
        if let Some(v) = self.seed { config.seed = Some(v); }
        if let Some(v) = self.log_file { config.log_file = Some(v); }
        if let Some(v) = self.export_dir { config.export_dir = v; }
    }
}

fn init_logging(path: Option<&Path>) -> anyhow::Result<()> {
    let path = match path {
        Some(path) => path,
        None => return Ok(()),
    };

    let file = File::create(path).with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "gridsnake=info".into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!(e))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone();

    let mut config = Config::load(config_path.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    // Only now is there a subscriber to hear about the config
    init_logging(config.log_file.as_deref())?;
    match &config_path {
        Some(path) => tracing::info!(path = %path.display(), "loaded config"),
        None => tracing::debug!("using default config"),
    }
    tracing::info!(?config, "starting");

    let _guard = term::TerminalGuard::enter()?;
    let term = term::TermManager::new()?;
    let mut game = game::SnakeGame::new(term, config)?;

    // The game loop returns on CTRL+C; the guard restores the terminal
    game.play()
}
