//! Aggregated "latest readings" snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reading::{
    DepthReading, MinimumNavigation, ParsedReading, PositionFix, TrackAndSpeed, WindReading,
};

/// The most recent reading of each kind, as of `timestamp`.
///
/// Slots are `None` until a reading of that kind has been observed at least once.
/// Snapshots are never mutated after publication; a new one replaces the old one
/// behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSnapshot {
    pub position: Option<PositionFix>,
    pub navigation: Option<MinimumNavigation>,
    pub track: Option<TrackAndSpeed>,
    pub wind: Option<WindReading>,
    pub depth: Option<DepthReading>,
    /// When this snapshot was published
    pub timestamp: DateTime<Utc>,
}

impl Default for AggregatedSnapshot {
    fn default() -> Self {
        Self {
            position: None,
            navigation: None,
            track: None,
            wind: None,
            depth: None,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl AggregatedSnapshot {
    /// Overwrite the slot matching `reading`, leaving the others untouched.
    pub fn apply(&mut self, reading: ParsedReading) {
        match reading {
            ParsedReading::Position(fix) => self.position = Some(fix),
            ParsedReading::Navigation(nav) => self.navigation = Some(nav),
            ParsedReading::Track(track) => self.track = Some(track),
            ParsedReading::Wind(wind) => self.wind = Some(wind),
            ParsedReading::Depth(depth) => self.depth = Some(depth),
        }
    }

    /// Whether no slot has been filled yet.
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.navigation.is_none()
            && self.track.is_none()
            && self.wind.is_none()
            && self.depth.is_none()
    }

    /// Best known position, preferring GGA over RMC.
    pub fn latest_position(&self) -> Option<(f64, f64)> {
        if let Some(fix) = &self.position {
            return Some((fix.latitude, fix.longitude));
        }
        let nav = self.navigation.as_ref()?;
        Some((nav.latitude?, nav.longitude?))
    }
}
