//! Configuration file parsing for deploy-deck
//!
//! Supports:
//! - `.ddeck/config.toml` - Device polling and compatibility settings

pub mod settings;
pub mod types;

pub use settings::{config_path, init_config_dir, load_settings, CONFIG_FILENAME, DDECK_DIR};
pub use types::*;
