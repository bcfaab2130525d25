//! Runtime settings for the earthglow viewer.
//!
//! Settings persist to disk as `config.ron` and can be overridden from the
//! command line. Scene content itself is fixed; only host concerns (window,
//! rendering quality, asset locations, logging) are configurable.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{AssetConfig, Config, DebugConfig, RenderConfig, StarfieldConfig, WindowConfig};
pub use error::ConfigError;
