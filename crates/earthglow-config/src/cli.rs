//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Earthglow command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "earthglow", about = "Animated Earth, moon and planets over a starfield")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Directory containing the planet textures.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Directory containing WGSL shader overrides.
    #[arg(long)]
    pub shaders: Option<PathBuf>,

    /// Fixed starfield seed.
    #[arg(long)]
    pub seed: Option<u64>,

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
        if let Some(ref dir) = args.assets {
            self.assets.asset_dir = dir.clone();
        }
        if let Some(ref dir) = args.shaders {
            self.assets.shader_dir = Some(dir.clone());
        }
        if let Some(seed) = args.seed {
            self.starfield.seed = Some(seed);
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
