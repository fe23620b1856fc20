//! Subtitle Manager Core - cue engine for a video player's subtitle browser
//!
//! This crate contains the subtitle logic with zero UI dependencies: parsing
//! SRT/WebVTT/ASS into cues, caching them per track, timeline queries under
//! a per-role delay, and the settings and logging a host needs around that.

pub mod config;
pub mod engine;
pub mod logging;
pub mod subtitles;

pub use engine::{CueEngine, EngineState, PlaybackHost, RoleTrack};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
