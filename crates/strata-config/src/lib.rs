//! Configuration system for the Strata engine.
//!
//! Runtime-configurable settings that persist to disk as RON files, with
//! CLI overrides via clap and forward/backward compatible serialization
//! (unknown fields ignored, missing fields defaulted).

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, GraphicsConfig, WindowConfig, WorldConfig};
pub use error::ConfigError;
