//! Configuration for the sweep scanner and its demo driver.
//!
//! Settings persist to disk as RON files, accept CLI overrides via clap, and
//! deserialize forward/backward compatibly (missing fields take defaults).

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, DemoConfig, ScanConfig, default_config_dir};
pub use error::ConfigError;
