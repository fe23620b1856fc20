//! Per-role subtitle delay and live boundary resolution.
//!
//! Each role (primary, secondary) carries one signed offset in seconds.
//! The playback host can also report the currently displayed line with its
//! own start/end; depending on the host build those boundaries may or may
//! not already include the delay. A [`BoundaryPolicy`] decides which.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::DelaySettings;
use crate::subtitles::error::QueryError;

/// Subtitle slot a track can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Primary,
    Secondary,
}

impl Role {
    /// Both roles, primary first.
    pub const ALL: [Role; 2] = [Role::Primary, Role::Secondary];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }

    /// The other slot.
    pub fn other(&self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            _ => Err(QueryError::InvalidRole(s.to_string())),
        }
    }
}

/// Line currently shown by the host, as reported or after resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiveCue {
    pub text: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

impl LiveCue {
    pub fn new(text: impl Into<String>, start: Option<f64>, end: Option<f64>) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }
}

/// Decides whether host-reported boundaries need the delay added.
pub trait BoundaryPolicy: fmt::Debug + Send + Sync {
    /// Return the boundaries to use for a line reported as `[start, end]`.
    fn resolve(&self, start: f64, end: f64, now: f64, delay: f64) -> (f64, f64);
}

/// Use host boundaries as reported.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl BoundaryPolicy for PassThrough {
    fn resolve(&self, start: f64, end: f64, _now: f64, _delay: f64) -> (f64, f64) {
        (start, end)
    }
}

/// Picks the interval that contains the playback position.
///
/// If `now` lies inside the delay-shifted interval but not the raw one, the
/// raw boundaries are taken as unshifted and the delay is added. Both
/// containment tests are widened by `tolerance`. Delays within `near_zero`
/// of zero skip the check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainmentHeuristic {
    pub near_zero: f64,
    pub tolerance: f64,
}

impl Default for ContainmentHeuristic {
    fn default() -> Self {
        Self {
            near_zero: 0.0005,
            tolerance: 0.05,
        }
    }
}

impl BoundaryPolicy for ContainmentHeuristic {
    fn resolve(&self, start: f64, end: f64, now: f64, delay: f64) -> (f64, f64) {
        if delay.abs() <= self.near_zero {
            return (start, end);
        }

        let eps = self.tolerance;
        let in_raw = now >= start - eps && now <= end + eps;
        let in_shifted = now >= start + delay - eps && now <= end + delay + eps;

        if !in_raw && in_shifted {
            tracing::trace!("Live boundaries look unshifted, adding delay {:.3}", delay);
            (start + delay, end + delay)
        } else {
            (start, end)
        }
    }
}

/// Holds the delay of each role.
#[derive(Debug)]
pub struct DelayResolver {
    primary: f64,
    secondary: f64,
    policy: Box<dyn BoundaryPolicy>,
}

impl Default for DelayResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayResolver {
    /// Zero delays with the default containment heuristic.
    pub fn new() -> Self {
        Self::with_policy(ContainmentHeuristic::default())
    }

    /// Zero delays with a custom boundary policy.
    pub fn with_policy(policy: impl BoundaryPolicy + 'static) -> Self {
        Self {
            primary: 0.0,
            secondary: 0.0,
            policy: Box::new(policy),
        }
    }

    /// Build from the `[delay]` config section.
    pub fn from_settings(settings: &DelaySettings) -> Self {
        if settings.boundary_heuristic {
            Self::with_policy(ContainmentHeuristic {
                near_zero: settings.near_zero_threshold,
                tolerance: settings.boundary_tolerance,
            })
        } else {
            Self::with_policy(PassThrough)
        }
    }

    pub fn get(&self, role: Role) -> f64 {
        match role {
            Role::Primary => self.primary,
            Role::Secondary => self.secondary,
        }
    }

    fn slot(&mut self, role: Role) -> &mut f64 {
        match role {
            Role::Primary => &mut self.primary,
            Role::Secondary => &mut self.secondary,
        }
    }

    /// Set a role's delay; returns the stored value.
    pub fn set(&mut self, role: Role, value: f64) -> Result<f64, QueryError> {
        let value = QueryError::check_finite(value)?;
        *self.slot(role) = value;
        tracing::debug!("{} delay set to {:.3}s", role, value);
        Ok(value)
    }

    /// Store a delay reported by the host, treating non-finite values as zero.
    pub fn set_or_zero(&mut self, role: Role, value: f64) -> f64 {
        let value = if value.is_finite() { value } else { 0.0 };
        *self.slot(role) = value;
        value
    }

    /// Add `delta` to a role's delay; returns the new value.
    pub fn add(&mut self, role: Role, delta: f64) -> Result<f64, QueryError> {
        let delta = QueryError::check_finite(delta)?;
        self.set(role, self.get(role) + delta)
    }

    /// Reset a role's delay to zero.
    pub fn reset(&mut self, role: Role) {
        *self.slot(role) = 0.0;
    }

    /// Choose the delay that puts `cue_start` at the current position.
    pub fn sync_to_cue_start(
        &mut self,
        role: Role,
        cue_start: f64,
        now: f64,
    ) -> Result<f64, QueryError> {
        let cue_start = QueryError::check_finite(cue_start)?;
        let now = QueryError::check_finite(now)?;
        self.set(role, now - cue_start)
    }

    /// Resolve a host-reported line against this role's delay.
    ///
    /// Boundaries pass through unchanged unless both are known along with
    /// the playback position.
    pub fn resolve_live(&self, role: Role, raw: LiveCue, now: Option<f64>) -> LiveCue {
        match (raw.start, raw.end, now) {
            (Some(start), Some(end), Some(now)) if now.is_finite() => {
                let (start, end) = self.policy.resolve(start, end, now, self.get(role));
                LiveCue {
                    start: Some(start),
                    end: Some(end),
                    ..raw
                }
            }
            _ => raw,
        }
    }
}
