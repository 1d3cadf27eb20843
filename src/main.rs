use anyhow::{Context, Result};
use clap::Parser;
use grid_snake::game::{GameConfig, Simulation};
use grid_snake::logging::init_file_logger;
use grid_snake::modes::HumanMode;
use log::info;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "grid_snake")]
#[command(version, about = "Snake on a grid, in the terminal")]
struct Cli {
    /// JSON file with game settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cells per side of the square grid
    #[arg(long)]
    size: Option<usize>,

    /// Starting speed in ticks per second
    #[arg(long)]
    tick_rate: Option<u32>,

    /// Seed for food placement, for reproducible games
    #[arg(long)]
    seed: Option<u64>,

    /// Where to write the log
    #[arg(long, default_value = "grid_snake.log")]
    log_file: PathBuf,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };

        if let Some(size) = self.size {
            config.grid_width = size;
            config.grid_height = size;
        }
        if let Some(tick_rate) = self.tick_rate {
            config.starting_tick_rate = tick_rate;
        }

        config.validate().context("Invalid game settings")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Validate before touching the terminal
    let config = cli.game_config()?;
    init_file_logger(&cli.log_file, cli.verbose)?;
    info!("Starting with {:?}", config);

    let simulation = match cli.seed {
        Some(seed) => Simulation::with_seed(config, seed),
        None => Simulation::new(config),
    };

    let mut human_mode = HumanMode::new(simulation);
    human_mode.run().await?;

    Ok(())
}
