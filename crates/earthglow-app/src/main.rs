//! The binary entry point for earthglow.

use clap::Parser;
use earthglow_config::{CliArgs, Config};
use tracing::{error, info, warn};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().or_else(Config::default_dir);
    let (mut config, load_error) = match &config_dir {
        Some(dir) => match Config::load_or_create(dir) {
            Ok(config) => (config, None),
            Err(e) => (Config::default(), Some(e)),
        },
        None => (Config::default(), None),
    };
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.as_ref().map(|dir| dir.join("logs"));
    earthglow_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {e}");
    }
    match &config_dir {
        Some(dir) => info!("Config directory: {}", dir.display()),
        None => warn!("No config directory available, running with defaults"),
    }
    info!(
        "Starting earthglow {} ({}x{}, assets in {})",
        env!("CARGO_PKG_VERSION"),
        config.window.width,
        config.window.height,
        config.assets.asset_dir.display()
    );

    if let Err(e) = earthglow_app::run_with_config(config) {
        error!("{e}");
        std::process::exit(1);
    }
}
