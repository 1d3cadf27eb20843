use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Every this many points the game speeds up
pub const SPEEDUP_THRESHOLD: u32 = 5;
/// Ticks per second added at each speed-up
pub const SPEED_INCREMENT: u32 = 1;

/// Smallest accepted grid axis
pub const MIN_GRID_CELLS: usize = 2;
/// Fastest accepted starting speed, one tick per millisecond
pub const MAX_TICK_RATE: u32 = 1000;

/// Rejected configuration values
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid needs at least {min} cells per axis, got {width}x{height}", min = MIN_GRID_CELLS)]
    GridTooSmall { width: usize, height: usize },
    #[error("grid must be square, got {width}x{height}")]
    NonSquareGrid { width: usize, height: usize },
    #[error("starting tick rate must be at least 1 tick per second")]
    ZeroTickRate,
    #[error("starting tick rate {rate} is above the limit of {max} ticks per second", max = MAX_TICK_RATE)]
    TickRateTooHigh { rate: u32 },
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid in cells
    pub grid_width: usize,
    /// Height of the game grid in cells
    pub grid_height: usize,
    /// Simulation ticks per second at the start of every game
    pub starting_tick_rate: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 20,
            grid_height: 20,
            starting_tick_rate: 7,
        }
    }
}

impl GameConfig {
    /// Create a square grid configuration with the default starting speed
    pub fn new(size: usize) -> Self {
        Self {
            grid_width: size,
            grid_height: size,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10)
    }

    pub fn with_tick_rate(mut self, ticks_per_second: u32) -> Self {
        self.starting_tick_rate = ticks_per_second;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = (self.grid_width, self.grid_height);
        if width < MIN_GRID_CELLS || height < MIN_GRID_CELLS {
            return Err(ConfigError::GridTooSmall { width, height });
        }
        if width != height {
            return Err(ConfigError::NonSquareGrid { width, height });
        }
        if self.starting_tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if self.starting_tick_rate > MAX_TICK_RATE {
            return Err(ConfigError::TickRateTooHigh {
                rate: self.starting_tick_rate,
            });
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig =
            serde_json::from_str(&json).context("Failed to deserialize config")?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {:?}", path))?;
        Ok(config)
    }
}
