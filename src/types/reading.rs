//! Decoded sentence readings

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// One decoded NMEA sentence.
///
/// Produced by [`parse_sentence`](crate::nmea::parse_sentence) and consumed by the
/// aggregator. A variant is only ever constructed from a fully valid sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ParsedReading {
    /// GGA: GNSS fix data
    Position(PositionFix),
    /// RMC: recommended minimum navigation data
    Navigation(MinimumNavigation),
    /// VTG: track made good and ground speed
    Track(TrackAndSpeed),
    /// MWV: wind speed and angle
    Wind(WindReading),
    /// DPT or DBT: water depth
    Depth(DepthReading),
}

impl ParsedReading {
    /// Slot this reading occupies in an aggregated snapshot.
    pub fn kind(&self) -> ReadingKind {
        match self {
            ParsedReading::Position(_) => ReadingKind::Position,
            ParsedReading::Navigation(_) => ReadingKind::Navigation,
            ParsedReading::Track(_) => ReadingKind::Track,
            ParsedReading::Wind(_) => ReadingKind::Wind,
            ParsedReading::Depth(_) => ReadingKind::Depth,
        }
    }
}

/// Discriminant of [`ParsedReading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReadingKind {
    Position,
    Navigation,
    Track,
    Wind,
    Depth,
}

/// Position fix from a GGA sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// UTC time of the fix
    pub time: Option<NaiveTime>,
    /// Signed decimal degrees, north positive
    pub latitude: f64,
    /// Signed decimal degrees, east positive
    pub longitude: f64,
    /// 0 = invalid, 1 = GPS, 2 = DGPS, 4/5 = RTK ...
    pub fix_quality: u8,
    pub satellites: u8,
    /// Horizontal dilution of precision
    pub hdop: Option<f64>,
    /// Antenna altitude above mean sea level
    pub altitude_m: Option<f64>,
    /// Height of the geoid above the WGS84 ellipsoid
    pub geoid_separation_m: Option<f64>,
}

/// Recommended minimum navigation data from an RMC sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinimumNavigation {
    pub time: Option<NaiveTime>,
    pub date: Option<NaiveDate>,
    /// Status field `A` (active); `V` means the receiver has no valid fix
    pub valid: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub speed_over_ground_kn: Option<f64>,
    /// Degrees true, normalized to [0, 360)
    pub course_over_ground_deg: Option<f64>,
    /// Degrees, west negative
    pub magnetic_variation_deg: Option<f64>,
}

impl MinimumNavigation {
    /// Combined UTC timestamp when both date and time were present.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let date = self.date?;
        let time = self.time?;
        Some(date.and_time(time).and_utc())
    }
}

/// Track made good and ground speed from a VTG sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackAndSpeed {
    pub true_track_deg: Option<f64>,
    pub magnetic_track_deg: Option<f64>,
    pub speed_kn: Option<f64>,
    pub speed_kmh: Option<f64>,
}

/// Wind angle reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindReference {
    /// Apparent wind, relative to the bow
    Relative,
    /// True wind, relative to the bow
    True,
}

/// Wind speed and angle from an MWV sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindReading {
    /// Degrees, normalized to [0, 360)
    pub angle_deg: f64,
    pub reference: WindReference,
    /// Speed converted to knots whatever unit the sentence used
    pub speed_kn: f64,
    pub valid: bool,
}

/// Water depth from a DPT or DBT sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthReading {
    /// Depth relative to the transducer
    pub depth_m: f64,
    /// Positive: distance from transducer to waterline; negative: to keel
    pub transducer_offset_m: Option<f64>,
    pub max_range_m: Option<f64>,
}

impl DepthReading {
    /// Depth corrected by the transducer offset, if one was reported.
    pub fn corrected_depth_m(&self) -> f64 {
        self.depth_m + self.transducer_offset_m.unwrap_or(0.0)
    }
}
