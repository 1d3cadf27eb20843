use anyhow::{Context, Result};
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::Path;

/// Send log output to a file; the terminal belongs to the game screen.
pub fn init_file_logger(path: &Path, verbose: bool) -> Result<()> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let file =
        File::create(path).with_context(|| format!("Failed to create log file {:?}", path))?;
    WriteLogger::init(level, Config::default(), file).context("Failed to initialize logger")?;
    Ok(())
}
