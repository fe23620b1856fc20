//! Engine facade tying the cue store, role bindings, and delays to a host.
//!
//! The playback host (the video player) owns the clock, the track list and
//! the line it is currently rendering. The engine asks it through
//! [`PlaybackHost`] and keeps everything else: which track is bound to
//! which role, the per-role delays, and the cue cache.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;

use crate::config::Settings;
use crate::subtitles::{
    active_cue_index, flatten_text_with, format_copy_payload, search_matches, seek_target,
    CueListResult, CueStore, DelayResolver, Direction, LiveCue, QueryError, Role,
    SearchMatches, SubtitleReader, TrackInfo,
};

/// Playback state provided by the host.
pub trait PlaybackHost: Send + Sync {
    /// Current playback position in seconds, if a file is loaded.
    fn current_playback_time(&self) -> Option<f64>;

    /// Delay the host is currently applying to a role.
    fn current_delay(&self, role: Role) -> f64;

    /// Subtitle tracks of the loaded file, in host order.
    fn subtitle_tracks(&self) -> Vec<TrackInfo>;

    /// Line the host is rendering for a role, with its raw boundaries.
    fn live_cue(&self, role: Role) -> LiveCue;
}

/// Track with the role it is bound to, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleTrack {
    #[serde(flatten)]
    pub track: TrackInfo,
    pub role: Option<Role>,
    pub label: String,
}

/// Snapshot for a host UI refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineState {
    pub time_pos: Option<f64>,
    pub primary: Option<i64>,
    pub secondary: Option<i64>,
    pub primary_delay: f64,
    pub secondary_delay: f64,
    pub tracks: Vec<RoleTrack>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Bindings {
    primary: Option<i64>,
    secondary: Option<i64>,
}

impl Bindings {
    fn get(&self, role: Role) -> Option<i64> {
        match role {
            Role::Primary => self.primary,
            Role::Secondary => self.secondary,
        }
    }

    fn slot(&mut self, role: Role) -> &mut Option<i64> {
        match role {
            Role::Primary => &mut self.primary,
            Role::Secondary => &mut self.secondary,
        }
    }

    fn role_of(&self, track_id: i64) -> Option<Role> {
        Role::ALL
            .into_iter()
            .find(|role| self.get(*role) == Some(track_id))
    }
}

/// Subtitle cue engine.
pub struct CueEngine<R, H> {
    store: CueStore<R>,
    host: H,
    delays: Mutex<DelayResolver>,
    bindings: Mutex<Bindings>,
    separator: String,
    delay_step: f64,
}

impl<R: SubtitleReader, H: PlaybackHost> CueEngine<R, H> {
    /// Engine with default settings.
    pub fn new(reader: R, host: H) -> Self {
        Self::from_settings(reader, host, &Settings::default())
    }

    /// Engine configured from loaded settings.
    pub fn from_settings(reader: R, host: H, settings: &Settings) -> Self {
        Self {
            store: CueStore::from_settings(reader, &settings.sources),
            host,
            delays: Mutex::new(DelayResolver::from_settings(&settings.delay)),
            bindings: Mutex::new(Bindings::default()),
            separator: settings.search.separator.clone(),
            delay_step: settings.delay.step,
        }
    }

    pub fn store(&self) -> &CueStore<R> {
        &self.store
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn find_track(&self, track_id: i64) -> Result<TrackInfo, QueryError> {
        self.host
            .subtitle_tracks()
            .into_iter()
            .find(|track| track.id == track_id)
            .ok_or(QueryError::UnknownTrack(track_id))
    }

    /// Cue list for a host track.
    pub async fn resolve_cues(&self, track_id: i64) -> Result<Arc<CueListResult>, QueryError> {
        let track = self.find_track(track_id)?;
        Ok(self.store.resolve_track(&track).await)
    }

    /// Bind a track to a role.
    ///
    /// A track already bound to the other role leaves it. The track's cache
    /// entry is evicted so the next lookup re-reads its source.
    pub fn set_track_role(&self, track_id: i64, role: Role) -> Result<(), QueryError> {
        self.find_track(track_id)?;

        let replaced = {
            let mut bindings = self.bindings.lock();
            if bindings.get(role.other()) == Some(track_id) {
                *bindings.slot(role.other()) = None;
            }
            bindings.slot(role).replace(track_id)
        };

        self.store.evict(track_id);
        if let Some(old) = replaced.filter(|old| *old != track_id) {
            self.store.evict(old);
        }

        tracing::info!("Track {} bound to {} subtitles", track_id, role);
        Ok(())
    }

    /// Unbind whatever track holds `role`.
    pub fn disable_role(&self, role: Role) {
        let removed = self.bindings.lock().slot(role).take();
        if let Some(track_id) = removed {
            self.store.evict(track_id);
            tracing::info!("{} subtitles disabled (was track {})", role, track_id);
        }
    }

    pub fn role_of(&self, track_id: i64) -> Option<Role> {
        self.bindings.lock().role_of(track_id)
    }

    pub fn track_for_role(&self, role: Role) -> Option<i64> {
        self.bindings.lock().get(role)
    }

    /// Delay applied to a track through its role; zero when unbound.
    pub fn delay_for_track(&self, track_id: i64) -> f64 {
        match self.role_of(track_id) {
            Some(role) => self.delays.lock().get(role),
            None => 0.0,
        }
    }

    pub fn delay(&self, role: Role) -> f64 {
        self.delays.lock().get(role)
    }

    pub fn set_delay(&self, role: Role, value: f64) -> Result<f64, QueryError> {
        self.delays.lock().set(role, value)
    }

    pub fn add_delay(&self, role: Role, delta: f64) -> Result<f64, QueryError> {
        self.delays.lock().add(role, delta)
    }

    /// Move a role's delay one configured step forward or backward.
    pub fn nudge_delay(&self, role: Role, direction: Direction) -> Result<f64, QueryError> {
        let delta = match direction {
            Direction::Forward => self.delay_step,
            Direction::Backward => -self.delay_step,
        };
        self.add_delay(role, delta)
    }

    /// Pull both role delays from the host. Non-finite values count as zero.
    pub fn sync_delays_from_host(&self) {
        let mut delays = self.delays.lock();
        for role in Role::ALL {
            delays.set_or_zero(role, self.host.current_delay(role));
        }
    }

    /// Set a role's delay so `cue_start` lines up with the current position.
    pub fn sync_delay_to_cue_start(&self, role: Role, cue_start: f64) -> Result<f64, QueryError> {
        let now = self
            .host
            .current_playback_time()
            .ok_or(QueryError::NoPlaybackTime)?;
        self.delays.lock().sync_to_cue_start(role, cue_start, now)
    }

    /// The host's current line for a role with resolved boundaries.
    pub fn current_live_cue(&self, role: Role) -> LiveCue {
        let raw = self.host.live_cue(role);
        let now = self.host.current_playback_time();
        self.delays.lock().resolve_live(role, raw, now)
    }

    /// Clipboard line for the role's current subtitle, or `None` without text.
    pub fn current_subtitle_payload(&self, role: Role) -> Option<String> {
        let live = self.current_live_cue(role);
        if live.text.trim().is_empty() {
            return None;
        }
        let text = flatten_text_with(&live.text, &self.separator);
        Some(format_copy_payload(live.start, live.end, &text))
    }

    /// Primary line if it has text, otherwise the secondary one.
    pub fn any_subtitle_payload(&self) -> Option<(Role, String)> {
        Role::ALL.into_iter().find_map(|role| {
            self.current_subtitle_payload(role)
                .map(|payload| (role, payload))
        })
    }

    /// Host tracks ordered primary, secondary, then the rest.
    pub fn tracks_by_role(&self) -> Vec<RoleTrack> {
        let bindings = *self.bindings.lock();
        let mut tracks = self.host.subtitle_tracks();
        tracks.sort_by_key(|track| match bindings.role_of(track.id) {
            Some(Role::Primary) => 0,
            Some(Role::Secondary) => 1,
            None => 2,
        });

        tracks
            .into_iter()
            .map(|track| RoleTrack {
                role: bindings.role_of(track.id),
                label: track.label(),
                track,
            })
            .collect()
    }

    /// Snapshot of clock, bindings, delays, and tracks.
    pub fn state(&self) -> EngineState {
        let bindings = *self.bindings.lock();
        let (primary_delay, secondary_delay) = {
            let delays = self.delays.lock();
            (delays.get(Role::Primary), delays.get(Role::Secondary))
        };
        EngineState {
            time_pos: self.host.current_playback_time(),
            primary: bindings.primary,
            secondary: bindings.secondary,
            primary_delay,
            secondary_delay,
            tracks: self.tracks_by_role(),
        }
    }

    /// Index of the cue playing now on a track, under its role's delay.
    pub async fn active_cue(&self, track_id: i64) -> Result<Option<usize>, QueryError> {
        let result = self.resolve_cues(track_id).await?;
        let Some(now) = self.host.current_playback_time() else {
            return Ok(None);
        };
        Ok(active_cue_index(
            &result.cues,
            now,
            self.delay_for_track(track_id),
        ))
    }

    /// Search a track's cues.
    pub async fn search(&self, track_id: i64, query: &str) -> Result<SearchMatches, QueryError> {
        let result = self.resolve_cues(track_id).await?;
        Ok(search_matches(&result.cues, query))
    }

    /// Seek position for a cue of a track, under its role's delay.
    pub async fn seek_position(
        &self,
        track_id: i64,
        cue_index: usize,
    ) -> Result<Option<f64>, QueryError> {
        let result = self.resolve_cues(track_id).await?;
        let delay = self.delay_for_track(track_id);
        Ok(result
            .cues
            .get(cue_index)
            .map(|cue| seek_target(cue, delay)))
    }
}
