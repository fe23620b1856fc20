//! Subtitle cue handling.
//!
//! Turns a host's subtitle tracks into timed cue lists and answers the
//! questions a cue browser asks of them.
//!
//! # Components
//!
//! - **types**: Core data structures (Cue, CueListResult, TrackInfo)
//! - **timestamp**: Timestamp parsing per dialect and display formatting
//! - **parsers**: Format-specific parsers (SRT, WebVTT, ASS/SSA)
//! - **store**: Per-track cue cache with stale-load protection
//! - **timeline**: Active cue lookup, search, match cycling, seek targets
//! - **delay**: Per-role delays and live boundary resolution
//!
//! # Usage
//!
//! ```ignore
//! use sm_core::subtitles::{active_cue_index, CueStore, FsReader, TrackInfo};
//!
//! let store = CueStore::new(FsReader::default());
//! let track = TrackInfo::new(3).with_external("/media/movie.en.srt");
//! let result = store.resolve_track(&track).await;
//!
//! let idx = active_cue_index(&result.cues, 61.2, 0.5);
//! ```

pub mod delay;
mod error;
pub mod parsers;
pub mod store;
pub mod timeline;
pub mod timestamp;
mod types;

// Re-export core types
pub use error::{QueryError, SourceError};
pub use types::{basename, Cue, CueListResult, SourceIdentity, SubtitleFormat, TrackInfo};

pub use delay::{BoundaryPolicy, ContainmentHeuristic, DelayResolver, LiveCue, PassThrough, Role};
pub use parsers::{parse_content, parse_for_path};
pub use store::{CueStore, FsReader, SubtitleReader, DEFAULT_UNSUPPORTED_SCHEMES};
pub use timeline::{
    active_cue_index, cycle_match, effective_interval, flatten_text, flatten_text_with,
    format_copy_payload, nearest_match, search_matches, seek_target, Direction, FocusSeed,
    SearchMatches, FLATTEN_SEPARATOR,
};
pub use timestamp::{
    format_time_range, format_timestamp, format_timestamp_compact, parse_timestamp, Dialect,
};
