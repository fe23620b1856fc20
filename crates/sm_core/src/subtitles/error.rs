//! Subtitle error types.
//!
//! Source errors are carried inside cached payloads, so they are plain data
//! (`Clone`) rather than wrapping `std::io::Error`.

/// Why a track's cue list could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// Track has no external file (embedded or bitmap-based).
    #[error(
        "This subtitle track is embedded or bitmap-based, so the full cue list may not be \
         accessible. Current-line copy still works."
    )]
    SourceMissing,

    /// Source is not a plain file (memory, composited, remote).
    #[error("Unsupported subtitle source: {identity}")]
    SourceUnsupported { identity: String },

    /// Reading the external file failed.
    #[error("Failed to read file '{path}': {message}")]
    ReadFailure { path: String, message: String },
}

impl SourceError {
    /// Create an unsupported-source error.
    pub fn unsupported(identity: impl Into<String>) -> Self {
        Self::SourceUnsupported {
            identity: identity.into(),
        }
    }

    /// Create a read failure from an I/O error.
    pub fn read(path: impl Into<String>, source: &std::io::Error) -> Self {
        Self::ReadFailure {
            path: path.into(),
            message: source.to_string(),
        }
    }
}

/// Errors for malformed queries coming from the host.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    /// Time value is NaN or infinite.
    #[error("Invalid time value: {0}")]
    InvalidTimestamp(f64),

    /// Track id not present in the host's track list.
    #[error("Track not found: {0}")]
    UnknownTrack(i64),

    /// Role string is neither primary nor secondary.
    #[error("Invalid role: '{0}'")]
    InvalidRole(String),

    /// Host reported no playback position (no file loaded?).
    #[error("No playback time (no file loaded?)")]
    NoPlaybackTime,
}

impl QueryError {
    /// Reject non-finite time values.
    pub fn check_finite(value: f64) -> Result<f64, QueryError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::InvalidTimestamp(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_failure_passes_message_through() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = SourceError::read("/tmp/a.srt", &io);
        assert_eq!(err.to_string(), "Failed to read file '/tmp/a.srt': no such file");
    }

    #[test]
    fn check_finite_rejects_nan() {
        assert!(QueryError::check_finite(1.5).is_ok());
        assert!(matches!(
            QueryError::check_finite(f64::NAN),
            Err(QueryError::InvalidTimestamp(_))
        ));
        assert!(QueryError::check_finite(f64::INFINITY).is_err());
    }
}
