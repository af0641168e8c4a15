//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Sweep demo command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "sweep", about = "Merged per-step voxel radius scanning")]
pub struct CliArgs {
    /// Sub-box volume at which packed sections are bulk-decoded.
    #[arg(long)]
    pub threshold: Option<u32>,

    /// Largest accepted request radius.
    #[arg(long)]
    pub max_radius: Option<u32>,

    /// Always bulk-decode whole sections.
    #[arg(long)]
    pub no_partial_unpack: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// World generator seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of steps to run.
    #[arg(long)]
    pub steps: Option<u32>,

    /// Horizontal radius of the widest demo request.
    #[arg(long)]
    pub radius: Option<u32>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(threshold) = args.threshold {
            self.scan.predecode_threshold = threshold;
        }
        if let Some(max) = args.max_radius {
            self.scan.max_radius = max;
        }
        if args.no_partial_unpack {
            self.scan.partial_unpack = false;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(seed) = args.seed {
            self.demo.seed = seed;
        }
        if let Some(steps) = args.steps {
            self.demo.steps = steps;
        }
        if let Some(radius) = args.radius {
            self.demo.horizontal_radius = radius;
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
            threshold: Some(64),
            no_partial_unpack: true,
            seed: Some(9),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.scan.predecode_threshold, 64);
        assert!(!config.scan.partial_unpack);
        assert_eq!(config.demo.seed, 9);
        // Non-overridden fields retain defaults
        assert_eq!(config.scan.max_radius, 256);
        assert_eq!(config.demo.steps, 5);
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::parse_from(["sweep", "--radius", "40", "--log-level", "debug"]);
        assert_eq!(args.radius, Some(40));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(!args.no_partial_unpack);
    }
}
