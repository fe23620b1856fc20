//! Per-track cache of resolved cue lists.
//!
//! # Lookup
//!
//! 1. Cached entry with the same source identity → returned as is.
//! 2. Embedded track → fixed `SourceMissing` payload.
//! 3. Non-file scheme (`memory://`, `edl://`, remote URL) → `SourceUnsupported`.
//! 4. Otherwise the file is read through the injected [`SubtitleReader`] and
//!    parsed with the extension hint. Read failures are cached too.
//!
//! # Staleness
//!
//! Every resolution, and every eviction, takes a fresh per-track token. A
//! read that completes after a newer token was issued for its track is
//! returned to its caller but not committed to the cache.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::SourceSettings;
use crate::subtitles::error::SourceError;
use crate::subtitles::parsers::parse_for_path;
use crate::subtitles::types::{CueListResult, SourceIdentity, TrackInfo};

/// Read capability provided by the host.
pub trait SubtitleReader: Send + Sync {
    /// Read a subtitle file as text.
    fn read_to_string(&self, path: &Path) -> impl Future<Output = io::Result<String>> + Send;
}

/// Filesystem reader with an optional `cat` fallback.
#[derive(Debug, Clone)]
pub struct FsReader {
    process_fallback: bool,
}

impl Default for FsReader {
    fn default() -> Self {
        Self {
            process_fallback: true,
        }
    }
}

impl FsReader {
    pub fn new(process_fallback: bool) -> Self {
        Self { process_fallback }
    }

    pub fn from_settings(settings: &SourceSettings) -> Self {
        Self::new(settings.process_fallback)
    }

    async fn read_via_process(path: &Path) -> io::Result<String> {
        let output = tokio::process::Command::new("cat")
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("Failed to read file: {}", path.display())
            } else {
                stderr
            };
            return Err(io::Error::other(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl SubtitleReader for FsReader {
    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if self.process_fallback => {
                tracing::debug!(
                    "Direct read of {} failed ({}), trying process fallback",
                    path.display(),
                    e
                );
                // Keep the original error if the fallback cannot even start.
                match Self::read_via_process(path).await {
                    Ok(content) => Ok(content),
                    Err(fallback) if fallback.kind() == io::ErrorKind::NotFound => Err(e),
                    Err(fallback) => Err(fallback),
                }
            }
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    source: SourceIdentity,
    payload: Arc<CueListResult>,
}

#[derive(Debug, Default)]
struct StoreState {
    entries: HashMap<i64, CacheEntry>,
    /// Newest token issued per track.
    latest: HashMap<i64, u64>,
    next_token: u64,
}

impl StoreState {
    fn issue_token(&mut self, track_id: i64) -> u64 {
        self.next_token += 1;
        self.latest.insert(track_id, self.next_token);
        self.next_token
    }

    fn is_current(&self, track_id: i64, token: u64) -> bool {
        self.latest.get(&track_id) == Some(&token)
    }

    fn commit(&mut self, track_id: i64, source: &SourceIdentity, payload: &Arc<CueListResult>) {
        self.entries.insert(
            track_id,
            CacheEntry {
                source: source.clone(),
                payload: Arc::clone(payload),
            },
        );
    }
}

/// Cache of the most recent cue list per track.
#[derive(Debug)]
pub struct CueStore<R> {
    reader: R,
    unsupported_schemes: Vec<String>,
    state: Mutex<StoreState>,
}

/// Schemes that never point at a readable file.
pub const DEFAULT_UNSUPPORTED_SCHEMES: [&str; 4] = ["edl://", "memory://", "http://", "https://"];

impl<R: SubtitleReader> CueStore<R> {
    /// Create a store with the default unsupported schemes.
    pub fn new(reader: R) -> Self {
        Self::with_unsupported_schemes(
            reader,
            DEFAULT_UNSUPPORTED_SCHEMES.iter().map(|s| s.to_string()).collect(),
        )
    }

    pub fn with_unsupported_schemes(reader: R, unsupported_schemes: Vec<String>) -> Self {
        Self {
            reader,
            unsupported_schemes,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Build from the `[sources]` config section.
    pub fn from_settings(reader: R, settings: &SourceSettings) -> Self {
        Self::with_unsupported_schemes(reader, settings.unsupported_schemes.clone())
    }

    /// Whether an external identity looks like a plain file path.
    pub fn is_file_source(&self, path: &str) -> bool {
        !self.unsupported_schemes.iter().any(|scheme| {
            path.get(..scheme.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
        })
    }

    /// Resolve the cue list of a host track.
    pub async fn resolve_track(&self, track: &TrackInfo) -> Arc<CueListResult> {
        self.resolve(track.id, &track.source_identity()).await
    }

    /// Resolve the cue list of `track_id` coming from `source`.
    pub async fn resolve(&self, track_id: i64, source: &SourceIdentity) -> Arc<CueListResult> {
        let (path, token) = {
            let mut state = self.state.lock();

            if let Some(entry) = state.entries.get(&track_id) {
                if entry.source == *source {
                    tracing::debug!("Cue cache hit for track {}", track_id);
                    return Arc::clone(&entry.payload);
                }
            }

            let path = match source {
                SourceIdentity::Embedded => {
                    let payload = Arc::new(CueListResult::failed(
                        track_id,
                        source.clone(),
                        SourceError::SourceMissing,
                    ));
                    state.issue_token(track_id);
                    state.commit(track_id, source, &payload);
                    return payload;
                }
                SourceIdentity::External(path) if !self.is_file_source(path) => {
                    let payload = Arc::new(CueListResult::failed(
                        track_id,
                        source.clone(),
                        SourceError::unsupported(path.as_str()),
                    ));
                    state.issue_token(track_id);
                    state.commit(track_id, source, &payload);
                    return payload;
                }
                SourceIdentity::External(path) => path.clone(),
            };

            (path, state.issue_token(track_id))
        };

        let payload = Arc::new(self.load(track_id, source, &path).await);

        let mut state = self.state.lock();
        if state.is_current(track_id, token) {
            state.commit(track_id, source, &payload);
        } else {
            tracing::debug!(
                "Discarding stale cue load for track {} (token {})",
                track_id,
                token
            );
        }
        payload
    }

    async fn load(&self, track_id: i64, source: &SourceIdentity, path: &str) -> CueListResult {
        match self.reader.read_to_string(Path::new(path)).await {
            Ok(content) => {
                let (format, cues) = parse_for_path(path, &content);
                tracing::info!(
                    "Loaded {} cues for track {} from {}",
                    cues.len(),
                    track_id,
                    path
                );
                CueListResult::parsed(track_id, source.clone(), format, cues)
            }
            Err(e) => {
                tracing::warn!("Failed to read subtitles for track {}: {}", track_id, e);
                CueListResult::failed(track_id, source.clone(), SourceError::read(path, &e))
            }
        }
    }

    /// Drop a track's cached entry and invalidate any read in flight for it.
    pub fn evict(&self, track_id: i64) {
        let mut state = self.state.lock();
        state.issue_token(track_id);
        if state.entries.remove(&track_id).is_some() {
            tracing::debug!("Evicted cue cache for track {}", track_id);
        }
    }

    /// Drop every cached entry and invalidate all reads in flight.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        let tracks: Vec<i64> = state.latest.keys().copied().collect();
        for track_id in tracks {
            state.issue_token(track_id);
        }
        state.entries.clear();
    }

    /// Cached payload for a track, without resolving.
    pub fn cached(&self, track_id: i64) -> Option<Arc<CueListResult>> {
        self.state
            .lock()
            .entries
            .get(&track_id)
            .map(|e| Arc::clone(&e.payload))
    }

    /// Number of cached tracks.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The injected reader.
    pub fn reader(&self) -> &R {
        &self.reader
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::{HashMap, VecDeque};
    use std::io;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::SubtitleReader;

    /// In-memory reader that counts reads and can delay responses.
    #[derive(Debug, Default)]
    pub struct MemoryReader {
        files: Mutex<HashMap<PathBuf, String>>,
        scripted: Mutex<VecDeque<(Duration, String)>>,
        reads: AtomicUsize,
    }

    impl MemoryReader {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_file(self, path: &str, content: &str) -> Self {
            self.set_file(path, content);
            self
        }

        pub fn set_file(&self, path: &str, content: &str) {
            self.files
                .lock()
                .insert(PathBuf::from(path), content.to_string());
        }

        /// Queue a response returned after `delay`, ahead of the file map.
        pub fn script(&self, delay: Duration, content: &str) {
            self.scripted
                .lock()
                .push_back((delay, content.to_string()));
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl SubtitleReader for MemoryReader {
        async fn read_to_string(&self, path: &Path) -> io::Result<String> {
            self.reads.fetch_add(1, Ordering::SeqCst);

            let scripted = self.scripted.lock().pop_front();
            if let Some((delay, content)) = scripted {
                tokio::time::sleep(delay).await;
                return Ok(content);
            }

            let content = self.files.lock().get(path).cloned();
            content.ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "No such file or directory")
            })
        }
    }
}
