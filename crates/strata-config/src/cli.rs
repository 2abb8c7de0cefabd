//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "strata", about = "Strata voxel engine")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Terrain noise seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Streaming load radius in chunks.
    #[arg(long)]
    pub load_radius: Option<u32>,

    /// Streaming evict radius in chunks.
    #[arg(long)]
    pub evict_radius: Option<u32>,

    /// Pipeline stage budget per update tick.
    #[arg(long)]
    pub stage_budget: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(r) = args.load_radius {
            self.world.load_radius = r;
        }
        if let Some(r) = args.evict_radius {
            self.world.evict_radius = r;
        }
        if let Some(budget) = args.stage_budget {
            self.world.stage_budget = budget;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            seed: Some(99),
            load_radius: Some(2),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.world.seed, 99);
        assert_eq!(config.world.load_radius, 2);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.world.evict_radius, 6);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }
}
