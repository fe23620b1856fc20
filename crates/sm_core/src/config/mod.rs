//! Configuration for the subtitle engine.
//!
//! This module provides:
//! - TOML-based configuration with logical sections
//! - Atomic file writes (write to temp, then rename)
//! - Section-level updates (only changed section is modified)
//! - Defaults for every missing key
//!
//! # Example
//!
//! ```no_run
//! use sm_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new(".config/subtitle-manager.toml");
//! config.load_or_create().unwrap();
//!
//! config.settings_mut().delay.step = 0.25;
//! config.update_section(ConfigSection::Delay).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, DelaySettings, LoggingSettings, SearchSettings, Settings, SourceSettings,
};
