//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use serde::{Deserialize, Serialize};

use crate::logging::LogLevel;
use crate::subtitles::DEFAULT_UNSUPPORTED_SCHEMES;

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Cue search behavior.
    #[serde(default)]
    pub search: SearchSettings,

    /// Delay stepping and live boundary resolution.
    #[serde(default)]
    pub delay: DelaySettings,

    /// Which subtitle sources are readable and how.
    #[serde(default)]
    pub sources: SourceSettings,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level when `RUST_LOG` is not set.
    #[serde(default)]
    pub level: LogLevel,

    /// Also write a daily rolling log file.
    #[serde(default)]
    pub file_logging: bool,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            file_logging: false,
            logs_folder: default_logs_folder(),
        }
    }
}

/// Search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Separator used when flattening multi-line cues for display and export.
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    crate::subtitles::FLATTEN_SEPARATOR.to_string()
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            separator: default_separator(),
        }
    }
}

/// Delay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelaySettings {
    /// Resolve whether host-reported boundaries include the delay.
    #[serde(default = "default_true")]
    pub boundary_heuristic: bool,

    /// Delays at or below this magnitude skip the boundary check (seconds).
    #[serde(default = "default_near_zero")]
    pub near_zero_threshold: f64,

    /// Slack on each side of an interval when testing containment (seconds).
    #[serde(default = "default_tolerance")]
    pub boundary_tolerance: f64,

    /// Amount one delay nudge adds or removes (seconds).
    #[serde(default = "default_step")]
    pub step: f64,
}

fn default_true() -> bool {
    true
}

fn default_near_zero() -> f64 {
    0.0005
}

fn default_tolerance() -> f64 {
    0.05
}

fn default_step() -> f64 {
    0.5
}

impl Default for DelaySettings {
    fn default() -> Self {
        Self {
            boundary_heuristic: true,
            near_zero_threshold: default_near_zero(),
            boundary_tolerance: default_tolerance(),
            step: default_step(),
        }
    }
}

/// Subtitle source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    /// Identity prefixes that are never read as files.
    #[serde(default = "default_unsupported_schemes")]
    pub unsupported_schemes: Vec<String>,

    /// Fall back to an external `cat` process when a direct read fails.
    #[serde(default = "default_true")]
    pub process_fallback: bool,
}

fn default_unsupported_schemes() -> Vec<String> {
    DEFAULT_UNSUPPORTED_SCHEMES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            unsupported_schemes: default_unsupported_schemes(),
            process_fallback: true,
        }
    }
}

/// Config sections for targeted updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Logging,
    Search,
    Delay,
    Sources,
}

impl ConfigSection {
    /// All sections in file order.
    pub const ALL: [ConfigSection; 4] = [
        ConfigSection::Logging,
        ConfigSection::Search,
        ConfigSection::Delay,
        ConfigSection::Sources,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Logging => "logging",
            ConfigSection::Search => "search",
            ConfigSection::Delay => "delay",
            ConfigSection::Sources => "sources",
        }
    }

    /// Comment written above the section.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Logging => "# Logging configuration",
            ConfigSection::Search => "# Cue search",
            ConfigSection::Delay => "# Delay stepping and live line resolution",
            ConfigSection::Sources => "# Subtitle sources",
        }
    }
}
