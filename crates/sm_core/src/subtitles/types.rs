//! Core subtitle types.
//!
//! All timing values are stored as `f64` seconds. Parsers keep millisecond
//! precision; anything finer is dropped by the timestamp codec.

use std::path::Path;

use serde::{Deserialize, Serialize, Serializer};

use crate::subtitles::error::SourceError;

/// Supported subtitle text formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubtitleFormat {
    /// SubRip (.srt)
    #[serde(rename = "srt")]
    Srt,
    /// WebVTT (.vtt)
    #[serde(rename = "vtt")]
    WebVtt,
    /// Advanced SubStation Alpha (.ass, .ssa)
    #[serde(rename = "ass")]
    Ass,
}

impl SubtitleFormat {
    /// Derive the parser hint from a file extension.
    ///
    /// `.ass`/`.ssa` map to ASS, `.vtt` to WebVTT. Everything else,
    /// including a missing extension, is treated as SRT.
    pub fn from_path_hint(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("ass") | Some("ssa") => Self::Ass,
            Some("vtt") => Self::WebVtt,
            _ => Self::Srt,
        }
    }

    /// Get the typical file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::WebVtt => "vtt",
            Self::Ass => "ass",
        }
    }
}

/// A single subtitle entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Text content, possibly multi-line.
    pub text: String,
}

impl Cue {
    /// Create a new cue.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Where a track's subtitle text comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceIdentity {
    /// No external source: the track is embedded in the container.
    Embedded,
    /// External file path (or URL-like string reported by the host).
    External(String),
}

impl SourceIdentity {
    /// Sentinel string used for embedded tracks.
    pub const EMBEDDED: &'static str = "embedded";

    /// Build an identity from the host's optional external filename.
    pub fn from_external(filename: Option<&str>) -> Self {
        match filename {
            Some(name) => Self::External(name.to_string()),
            None => Self::Embedded,
        }
    }

    /// String form used in payloads and logs.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Embedded => Self::EMBEDDED,
            Self::External(path) => path,
        }
    }
}

impl std::fmt::Display for SourceIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SourceIdentity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Result of resolving the cues of one track.
///
/// Built once per resolution and shared behind an `Arc`; never mutated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CueListResult {
    /// Host track id.
    pub track_id: i64,
    /// Source identity this result was produced from.
    pub source: SourceIdentity,
    /// Detected format, `None` when nothing was parsed.
    pub format: Option<SubtitleFormat>,
    /// Cues in file order.
    pub cues: Vec<Cue>,
    /// Why no cues could be produced, if anything went wrong.
    #[serde(serialize_with = "serialize_error_message")]
    pub error: Option<SourceError>,
}

impl CueListResult {
    /// Successful parse.
    pub fn parsed(
        track_id: i64,
        source: SourceIdentity,
        format: SubtitleFormat,
        cues: Vec<Cue>,
    ) -> Self {
        Self {
            track_id,
            source,
            format: Some(format),
            cues,
            error: None,
        }
    }

    /// Empty payload carrying an error.
    pub fn failed(track_id: i64, source: SourceIdentity, error: SourceError) -> Self {
        Self {
            track_id,
            source,
            format: None,
            cues: Vec::new(),
            error: Some(error),
        }
    }

    /// Error message as shown to the user.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }

    /// Whether the cue list is usable.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

fn serialize_error_message<S: Serializer>(
    error: &Option<SourceError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Subtitle track as reported by the playback host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    /// Host track id.
    pub id: i64,
    /// Language code.
    pub lang: Option<String>,
    /// Track title.
    pub title: Option<String>,
    /// Codec name.
    pub codec: Option<String>,
    /// Path of the external subtitle file, if the track was loaded from one.
    pub external_filename: Option<String>,
    /// Whether the host currently shows this track.
    #[serde(default)]
    pub selected: bool,
}

impl TrackInfo {
    /// Create a track with only an id.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Set the external filename.
    pub fn with_external(mut self, path: impl Into<String>) -> Self {
        self.external_filename = Some(path.into());
        self
    }

    /// Source identity of this track.
    pub fn source_identity(&self) -> SourceIdentity {
        SourceIdentity::from_external(self.external_filename.as_deref())
    }

    /// Human readable label: `LANG - Title - file.srt`.
    pub fn label(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(lang) = non_blank(&self.lang) {
            parts.push(lang.to_uppercase());
        }
        if let Some(title) = non_blank(&self.title) {
            parts.push(title.to_string());
        }
        if parts.is_empty() {
            if let Some(codec) = non_blank(&self.codec) {
                parts.push(codec.to_string());
            }
        }
        if let Some(path) = &self.external_filename {
            parts.push(basename(path).to_string());
        }

        if parts.is_empty() {
            format!("Subtitle #{}", self.id)
        } else {
            parts.join(" - ")
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Last path component, accepting both `/` and `\` separators.
pub fn basename(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(idx) => &path[idx + 1..],
        None => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hint_from_extension() {
        assert_eq!(SubtitleFormat::from_path_hint("a.ass"), SubtitleFormat::Ass);
        assert_eq!(SubtitleFormat::from_path_hint("a.SSA"), SubtitleFormat::Ass);
        assert_eq!(SubtitleFormat::from_path_hint("a.vtt"), SubtitleFormat::WebVtt);
        assert_eq!(SubtitleFormat::from_path_hint("a.srt"), SubtitleFormat::Srt);
        assert_eq!(SubtitleFormat::from_path_hint("a.txt"), SubtitleFormat::Srt);
        assert_eq!(SubtitleFormat::from_path_hint("noext"), SubtitleFormat::Srt);
    }

    #[test]
    fn test_track_label() {
        let track = TrackInfo {
            id: 3,
            lang: Some("eng".into()),
            title: Some(" Full ".into()),
            codec: Some("subrip".into()),
            external_filename: Some("/media/movie.en.srt".into()),
            selected: false,
        };
        assert_eq!(track.label(), "ENG - Full - movie.en.srt");

        let codec_only = TrackInfo {
            codec: Some("ass".into()),
            ..TrackInfo::new(2)
        };
        assert_eq!(codec_only.label(), "ass");

        assert_eq!(TrackInfo::new(7).label(), "Subtitle #7");
    }

    #[test]
    fn test_basename_handles_both_separators() {
        assert_eq!(basename("C:\\subs\\a.srt"), "a.srt");
        assert_eq!(basename("/x/y/b.vtt"), "b.vtt");
        assert_eq!(basename("plain.ass"), "plain.ass");
    }

    #[test]
    fn test_payload_serializes_error_as_string() {
        let result = CueListResult::failed(4, SourceIdentity::Embedded, SourceError::SourceMissing);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["trackId"], 4);
        assert_eq!(json["source"], "embedded");
        assert!(json["format"].is_null());
        assert!(json["error"].as_str().unwrap().contains("embedded"));

        let ok = CueListResult::parsed(
            1,
            SourceIdentity::External("/a.srt".into()),
            SubtitleFormat::WebVtt,
            vec![Cue::new(1.0, 2.0, "hi")],
        );
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["format"], "vtt");
        assert!(json["error"].is_null());
        assert_eq!(json["cues"][0]["text"], "hi");
    }
}
