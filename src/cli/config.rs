//! Shared arguments for CLI commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::{adapters::GridMap, pipeline::TrainingParams};

/// Which world to play in
#[derive(Args, Debug, Clone)]
pub struct WorldArgs {
    /// Text map file ('.' floor, '#' wall, first line is the top row)
    #[arg(long, conflicts_with_all = ["width", "height"])]
    pub map: Option<PathBuf>,

    /// Width of an open grid when no map is given
    #[arg(long, default_value_t = 10)]
    pub width: i32,

    /// Height of an open grid when no map is given
    #[arg(long, default_value_t = 10)]
    pub height: i32,
}

impl WorldArgs {
    pub fn build(&self) -> Result<GridMap> {
        match &self.map {
            Some(path) => GridMap::from_file(path)
                .with_context(|| format!("failed to load map {}", path.display())),
            None => GridMap::open(self.width, self.height)
                .with_context(|| format!("invalid grid {}x{}", self.width, self.height)),
        }
    }

    /// Short human-readable description of the world
    pub fn describe(&self) -> String {
        match &self.map {
            Some(path) => path.display().to_string(),
            None => format!("open {}x{} grid", self.width, self.height),
        }
    }
}

/// Parameters from a JSON file, or the defaults when no file is given
pub fn load_params(path: Option<&Path>) -> Result<TrainingParams> {
    match path {
        Some(path) => TrainingParams::load(path)
            .with_context(|| format!("failed to read parameters from {}", path.display())),
        None => Ok(TrainingParams::default()),
    }
}
