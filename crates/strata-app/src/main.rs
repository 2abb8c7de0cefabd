//! Binary entry point: config resolution, logging, event loop startup.

mod app;
mod camera;
mod game_loop;
mod input;
mod palette;

use clap::Parser;
use strata_config::{CliArgs, Config};
use tracing::{info, warn};
use winit::event_loop::{ControlFlow, EventLoop};

use crate::app::StrataApp;

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(|| dirs::config_dir().map(|dir| dir.join("strata")));

    let mut config = match &config_dir {
        Some(dir) => Config::load_or_create(dir).unwrap_or_else(|e| {
            eprintln!("Config load failed ({e}), using defaults");
            Config::default()
        }),
        None => Config::default(),
    };
    config.apply_cli_overrides(&args);

    strata_log::init_logging(config_dir.as_deref(), Some(&config));
    info!(
        width = config.window.width,
        height = config.window.height,
        seed = config.world.seed,
        "Starting {}",
        config.window.title
    );
    if config.world.evict_radius <= config.world.load_radius {
        warn!(
            "evict_radius {} must exceed load_radius {}; falling back to defaults",
            config.world.evict_radius, config.world.load_radius
        );
        config.world.load_radius = 4;
        config.world.evict_radius = 6;
    }

    let event_loop = EventLoop::new().expect("event loop creation failed");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = StrataApp::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        eprintln!("Event loop error: {e}");
        std::process::exit(1);
    }
}
