//! Typed access to the comma-separated fields of one sentence

use chrono::{NaiveDate, NaiveTime};

use crate::{PipelineError, Result};

/// Which coordinate a DDMM.MMMM field encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn limit(self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    fn sign(self, hemisphere: &str) -> Option<f64> {
        match (self, hemisphere) {
            (Axis::Latitude, "N") | (Axis::Longitude, "E") => Some(1.0),
            (Axis::Latitude, "S") | (Axis::Longitude, "W") => Some(-1.0),
            _ => None,
        }
    }
}

/// Convert `DDMM.MMMM` (or `DDDMM.MMMM`) plus hemisphere into signed decimal degrees.
///
/// ```rust
/// use sailstream::nmea::{Axis, ddmm_to_degrees};
///
/// let lat = ddmm_to_degrees(4807.038, "N", Axis::Latitude).unwrap();
/// assert!((lat - 48.1173).abs() < 1e-4);
/// ```
pub fn ddmm_to_degrees(value: f64, hemisphere: &str, axis: Axis) -> Option<f64> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let degrees = (value / 100.0).floor();
    let minutes = value - degrees * 100.0;
    if minutes >= 60.0 {
        return None;
    }
    let decimal = degrees + minutes / 60.0;
    if decimal > axis.limit() {
        return None;
    }
    Some(decimal * axis.sign(hemisphere)?)
}

/// Fold an angle into [0, 360).
pub fn normalize_angle(degrees: f64) -> f64 {
    let folded = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if folded >= 360.0 { 0.0 } else { folded }
}

/// The data fields of a sentence, with the sentence kept for error context.
///
/// Index 0 is the first field after the address (`GPGGA`).
pub(crate) struct Fields<'a> {
    sentence: &'a str,
    fields: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    pub fn new(sentence: &'a str, fields: Vec<&'a str>) -> Self {
        Self { sentence, fields }
    }

    pub fn fail(&self, reason: impl Into<String>) -> PipelineError {
        PipelineError::parse_failure(self.sentence, reason)
    }

    /// Raw field, empty string when the sentence is shorter than `index + 1`.
    pub fn raw(&self, index: usize) -> &'a str {
        self.fields.get(index).map(|f| f.trim()).unwrap_or("")
    }

    pub fn require_len(&self, min: usize) -> Result<()> {
        if self.fields.len() < min {
            let found = self.fields.len();
            return Err(self.fail(format!("expected at least {min} fields, found {found}")));
        }
        Ok(())
    }

    pub fn opt_f64(&self, index: usize, name: &str) -> Result<Option<f64>> {
        let raw = self.raw(index);
        if raw.is_empty() {
            return Ok(None);
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            _ => Err(self.fail(format!("{name} is not a number: {raw:?}"))),
        }
    }

    pub fn req_f64(&self, index: usize, name: &str) -> Result<f64> {
        self.opt_f64(index, name)?.ok_or_else(|| self.fail(format!("missing {name}")))
    }

    /// Optional value that must not be negative (speeds, depths, ranges).
    pub fn opt_non_negative(&self, index: usize, name: &str) -> Result<Option<f64>> {
        match self.opt_f64(index, name)? {
            Some(value) if value < 0.0 => Err(self.fail(format!("{name} is negative: {value}"))),
            other => Ok(other),
        }
    }

    pub fn opt_angle(&self, index: usize, name: &str) -> Result<Option<f64>> {
        Ok(self.opt_f64(index, name)?.map(normalize_angle))
    }

    pub fn opt_u8(&self, index: usize, name: &str) -> Result<Option<u8>> {
        let raw = self.raw(index);
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse::<u8>()
            .map(Some)
            .map_err(|_| self.fail(format!("{name} is not a small integer: {raw:?}")))
    }

    /// Coordinate pair at `index` (value) and `index + 1` (hemisphere).
    ///
    /// Both empty means no position; exactly one empty is malformed.
    pub fn coordinate(&self, index: usize, axis: Axis) -> Result<Option<f64>> {
        let name = match axis {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
        };
        let hemisphere = self.raw(index + 1);
        let value = self.opt_f64(index, name)?;
        match (value, hemisphere.is_empty()) {
            (None, true) => Ok(None),
            (Some(value), false) => ddmm_to_degrees(value, hemisphere, axis)
                .map(Some)
                .ok_or_else(|| self.fail(format!("{name} out of range: {value} {hemisphere}"))),
            (None, false) => Err(self.fail(format!("missing {name} value"))),
            (Some(_), true) => Err(self.fail(format!("missing {name} hemisphere"))),
        }
    }

    /// `hhmmss` or `hhmmss.sss`.
    pub fn time(&self, index: usize) -> Result<Option<NaiveTime>> {
        let raw = self.raw(index);
        if raw.is_empty() {
            return Ok(None);
        }
        let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
        if whole.len() != 6 || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.fail(format!("malformed UTC time: {raw:?}")));
        }
        let millis = if fraction.is_empty() {
            0
        } else {
            let digits: String = fraction.chars().chain(std::iter::repeat('0')).take(3).collect();
            digits.parse::<u32>().map_err(|_| self.fail(format!("malformed UTC time: {raw:?}")))?
        };

        let hour = whole[0..2].parse::<u32>().unwrap_or(99);
        let minute = whole[2..4].parse::<u32>().unwrap_or(99);
        let second = whole[4..6].parse::<u32>().unwrap_or(99);
        NaiveTime::from_hms_milli_opt(hour, minute, second, millis)
            .map(Some)
            .ok_or_else(|| self.fail(format!("UTC time out of range: {raw:?}")))
    }

    /// `ddmmyy`; years 80-99 map to the 1900s, everything else to the 2000s.
    pub fn date(&self, index: usize) -> Result<Option<NaiveDate>> {
        let raw = self.raw(index);
        if raw.is_empty() {
            return Ok(None);
        }
        if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.fail(format!("malformed date: {raw:?}")));
        }
        let day = raw[0..2].parse::<u32>().unwrap_or(0);
        let month = raw[2..4].parse::<u32>().unwrap_or(0);
        let yy = raw[4..6].parse::<i32>().unwrap_or(0);
        let year = if yy >= 80 { 1900 + yy } else { 2000 + yy };
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Some)
            .ok_or_else(|| self.fail(format!("date out of range: {raw:?}")))
    }
}
