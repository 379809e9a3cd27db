//! Sentence parsing
//!
//! [`parse_sentence`] turns one framed sentence into a [`ParsedReading`]. It is pure
//! and keeps no state between calls, so it can run on any task.
//!
//! Dispatch is by the three-letter sentence type; the two-letter talker (`GP`, `GN`,
//! `II`, `WI`, `SD` ...) is ignored. Supported types:
//!
//! | Type | Reading |
//! |------|---------|
//! | GGA  | [`PositionFix`] |
//! | RMC  | [`MinimumNavigation`] |
//! | VTG  | [`TrackAndSpeed`] |
//! | MWV  | [`WindReading`] |
//! | DPT  | [`DepthReading`] |
//! | DBT  | [`DepthReading`] (meters field, no offset) |

use tracing::{debug, trace};

use super::checksum;
use super::fields::{Axis, Fields};
use crate::types::{
    DepthReading, MinimumNavigation, ParsedReading, PositionFix, TrackAndSpeed, WindReading,
    WindReference,
};
use crate::{PipelineError, Result};

const KMH_PER_KNOT: f64 = 1.852;
const KNOTS_PER_MPS: f64 = 3600.0 / 1852.0;
const KNOTS_PER_MPH: f64 = 1609.344 / 1852.0;

/// Result of parsing a sentence that passed its checksum.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A supported sentence decoded successfully
    Reading(ParsedReading),
    /// Valid sentence of a type this parser does not decode, or a GGA without a fix
    Unrecognized { identifier: String },
}

impl ParseOutcome {
    pub fn into_reading(self) -> Option<ParsedReading> {
        match self {
            ParseOutcome::Reading(reading) => Some(reading),
            ParseOutcome::Unrecognized { .. } => None,
        }
    }
}

/// Parse one sentence without its line terminator.
///
/// The checksum is verified before any field is looked at.
///
/// ```rust
/// use sailstream::nmea::{parse_sentence, ParseOutcome};
/// use sailstream::types::ParsedReading;
///
/// let outcome = parse_sentence(
///     "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47",
/// ).unwrap();
///
/// match outcome {
///     ParseOutcome::Reading(ParsedReading::Position(fix)) => {
///         assert_eq!(fix.satellites, 8);
///         assert!((fix.latitude - 48.1173).abs() < 1e-4);
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
///
/// # Errors
///
/// - [`PipelineError::ChecksumMismatch`] when the checksum is missing or wrong
/// - [`PipelineError::ParseFailure`] when a supported sentence has malformed fields
pub fn parse_sentence(sentence: &str) -> Result<ParseOutcome> {
    let sentence = sentence.trim();
    if !checksum::is_valid(sentence) {
        return Err(PipelineError::checksum_mismatch(sentence));
    }

    // Checksum validation guarantees a leading delimiter and a '*'.
    let payload = match sentence[1..].split_once('*') {
        Some((payload, _)) => payload,
        None => return Err(PipelineError::checksum_mismatch(sentence)),
    };

    let mut parts = payload.split(',');
    let address = parts.next().unwrap_or("");
    let fields = Fields::new(sentence, parts.collect());

    if address.len() != 5 || address.starts_with('P') || !address.is_ascii() {
        debug!(address, "Skipping proprietary or non-standard sentence");
        return Ok(ParseOutcome::Unrecognized { identifier: address.to_string() });
    }

    let kind = &address[2..];
    trace!(talker = &address[..2], kind, "Dispatching sentence");

    let reading = match kind {
        "GGA" => match parse_gga(&fields)? {
            Some(fix) => ParsedReading::Position(fix),
            None => {
                debug!("GGA without a fix, skipping");
                return Ok(ParseOutcome::Unrecognized { identifier: address.to_string() });
            }
        },
        "RMC" => ParsedReading::Navigation(parse_rmc(&fields)?),
        "VTG" => ParsedReading::Track(parse_vtg(&fields)?),
        "MWV" => ParsedReading::Wind(parse_mwv(&fields)?),
        "DPT" => ParsedReading::Depth(parse_dpt(&fields)?),
        "DBT" => ParsedReading::Depth(parse_dbt(&fields)?),
        _ => {
            debug!(address, "Unrecognized sentence type");
            return Ok(ParseOutcome::Unrecognized { identifier: address.to_string() });
        }
    };

    Ok(ParseOutcome::Reading(reading))
}

/// `GGA,time,lat,N,lon,E,quality,sats,hdop,alt,M,geoid,M,age,station`
fn parse_gga(f: &Fields<'_>) -> Result<Option<PositionFix>> {
    f.require_len(9)?;

    let time = f.time(0)?;
    let latitude = f.coordinate(1, Axis::Latitude)?;
    let longitude = f.coordinate(3, Axis::Longitude)?;
    let fix_quality = f.opt_u8(5, "fix quality")?.ok_or_else(|| f.fail("missing fix quality"))?;

    let (latitude, longitude) = match (latitude, longitude) {
        (Some(lat), Some(lon)) => (lat, lon),
        (None, None) if fix_quality == 0 => return Ok(None),
        _ => return Err(f.fail("incomplete position")),
    };

    Ok(Some(PositionFix {
        time,
        latitude,
        longitude,
        fix_quality,
        satellites: f
            .opt_u8(6, "satellite count")?
            .ok_or_else(|| f.fail("missing satellite count"))?,
        hdop: f.opt_non_negative(7, "HDOP")?,
        altitude_m: f.opt_f64(8, "altitude")?,
        geoid_separation_m: f.opt_f64(10, "geoid separation")?,
    }))
}

/// `RMC,time,status,lat,N,lon,E,sog,cog,date,magvar,E/W[,mode]`
fn parse_rmc(f: &Fields<'_>) -> Result<MinimumNavigation> {
    f.require_len(9)?;

    let valid = match f.raw(1) {
        "A" => true,
        "V" => false,
        other => return Err(f.fail(format!("unknown status {other:?}"))),
    };

    let magnetic_variation_deg = match (f.opt_f64(9, "magnetic variation")?, f.raw(10)) {
        (None, _) => None,
        (Some(variation), "E") => Some(variation),
        (Some(variation), "W") => Some(-variation),
        (Some(_), other) => {
            return Err(f.fail(format!("unknown variation direction {other:?}")));
        }
    };

    Ok(MinimumNavigation {
        time: f.time(0)?,
        date: f.date(8)?,
        valid,
        latitude: f.coordinate(2, Axis::Latitude)?,
        longitude: f.coordinate(4, Axis::Longitude)?,
        speed_over_ground_kn: f.opt_non_negative(6, "speed over ground")?,
        course_over_ground_deg: f.opt_angle(7, "course over ground")?,
        magnetic_variation_deg,
    })
}

/// `VTG,track,T,track,M,speed,N,speed,K[,mode]`
fn parse_vtg(f: &Fields<'_>) -> Result<TrackAndSpeed> {
    f.require_len(8)?;

    let speed_kn = f.opt_non_negative(4, "speed (knots)")?;
    let speed_kmh = f.opt_non_negative(6, "speed (km/h)")?;

    Ok(TrackAndSpeed {
        true_track_deg: f.opt_angle(0, "true track")?,
        magnetic_track_deg: f.opt_angle(2, "magnetic track")?,
        speed_kn: speed_kn.or(speed_kmh.map(|kmh| kmh / KMH_PER_KNOT)),
        speed_kmh: speed_kmh.or(speed_kn.map(|kn| kn * KMH_PER_KNOT)),
    })
}

/// `MWV,angle,R/T,speed,unit,status`
fn parse_mwv(f: &Fields<'_>) -> Result<WindReading> {
    f.require_len(5)?;

    let angle_deg = f.opt_angle(0, "wind angle")?.ok_or_else(|| f.fail("missing wind angle"))?;
    let reference = match f.raw(1) {
        "R" => WindReference::Relative,
        "T" => WindReference::True,
        other => return Err(f.fail(format!("unknown wind reference {other:?}"))),
    };
    let speed = f.opt_non_negative(2, "wind speed")?.ok_or_else(|| f.fail("missing wind speed"))?;
    let speed_kn = match f.raw(3) {
        "N" => speed,
        "K" => speed / KMH_PER_KNOT,
        "M" => speed * KNOTS_PER_MPS,
        "S" => speed * KNOTS_PER_MPH,
        other => return Err(f.fail(format!("unknown wind speed unit {other:?}"))),
    };

    Ok(WindReading { angle_deg, reference, speed_kn, valid: f.raw(4) == "A" })
}

/// `DPT,depth,offset[,max range]`
fn parse_dpt(f: &Fields<'_>) -> Result<DepthReading> {
    f.require_len(2)?;

    let depth_m = f.opt_non_negative(0, "depth")?.ok_or_else(|| f.fail("missing depth"))?;

    Ok(DepthReading {
        depth_m,
        transducer_offset_m: f.opt_f64(1, "transducer offset")?,
        max_range_m: f.opt_non_negative(2, "maximum range")?,
    })
}

/// `DBT,feet,f,meters,M,fathoms,F`
fn parse_dbt(f: &Fields<'_>) -> Result<DepthReading> {
    f.require_len(4)?;

    let depth_m = match f.opt_non_negative(2, "depth (meters)")? {
        Some(meters) => meters,
        None => {
            let feet =
                f.opt_non_negative(0, "depth (feet)")?.ok_or_else(|| f.fail("missing depth"))?;
            feet * 0.3048
        }
    };

    Ok(DepthReading { depth_m, transducer_offset_m: None, max_range_m: None })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea::checksum::append;

    fn reading(sentence: &str) -> ParsedReading {
        match parse_sentence(sentence) {
            Ok(ParseOutcome::Reading(reading)) => reading,
            other => panic!("expected a reading from {sentence}, got {other:?}"),
        }
    }

    #[test]
    fn gga_position_fix() {
        let ParsedReading::Position(fix) =
            reading("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47")
        else {
            panic!("expected position");
        };

        assert!((fix.latitude - 48.1173).abs() < 1e-4);
        assert!((fix.longitude - 11.5167).abs() < 1e-4);
        assert_eq!(fix.fix_quality, 1);
        assert_eq!(fix.satellites, 8);
        assert_eq!(fix.hdop, Some(0.9));
        assert_eq!(fix.altitude_m, Some(545.4));
        assert_eq!(fix.geoid_separation_m, Some(46.9));
        assert_eq!(fix.time, chrono::NaiveTime::from_hms_opt(12, 35, 19));
    }

    #[test]
    fn gga_west_longitude_is_negative() {
        let ParsedReading::Position(fix) = reading(
            "$GPGGA,092750.000,5321.6802,N,00630.3372,W,1,8,1.03,61.7,M,55.2,M,,*76",
        ) else {
            panic!("expected position");
        };
        assert!(fix.longitude < -6.5 && fix.longitude > -6.6);
    }

    #[test]
    fn gga_without_fix_is_skipped() {
        let sentence = append("GPGGA,123519,,,,,0,00,,,M,,M,,");
        assert_eq!(
            parse_sentence(&sentence).unwrap(),
            ParseOutcome::Unrecognized { identifier: "GPGGA".to_string() }
        );
    }

    #[test]
    fn rmc_minimum_navigation() {
        let ParsedReading::Navigation(nav) =
            reading("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A")
        else {
            panic!("expected navigation");
        };

        assert!(nav.valid);
        assert!((nav.speed_over_ground_kn.unwrap() - 22.4).abs() < 1e-9);
        assert!((nav.course_over_ground_deg.unwrap() - 84.4).abs() < 1e-9);
        assert_eq!(nav.magnetic_variation_deg, Some(-3.1));
        assert_eq!(nav.date, chrono::NaiveDate::from_ymd_opt(1994, 3, 23));
        assert!(nav.timestamp().is_some());
    }

    #[test]
    fn rmc_void_without_position() {
        let ParsedReading::Navigation(nav) = reading("$GPRMC,235959,V,,,,,,,010199,,*30") else {
            panic!("expected navigation");
        };
        assert!(!nav.valid);
        assert!(nav.latitude.is_none());
        assert!(nav.speed_over_ground_kn.is_none());
    }

    #[test]
    fn rmc_with_mode_field() {
        let ParsedReading::Navigation(nav) = reading(
            "$GNRMC,092751.000,A,5321.6802,N,00630.3371,W,0.06,31.66,280511,,,A*5B",
        ) else {
            panic!("expected navigation");
        };
        assert_eq!(nav.magnetic_variation_deg, None);
        assert_eq!(nav.speed_over_ground_kn, Some(0.06));
    }

    #[test]
    fn vtg_track_and_speed() {
        let sentence = "$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K*48";
        let ParsedReading::Track(track) = reading(sentence) else {
            panic!("expected track");
        };
        assert_eq!(track.true_track_deg, Some(54.7));
        assert_eq!(track.magnetic_track_deg, Some(34.4));
        assert_eq!(track.speed_kn, Some(5.5));
        assert_eq!(track.speed_kmh, Some(10.2));
    }

    #[test]
    fn vtg_fills_missing_speed_unit() {
        let ParsedReading::Track(track) = reading(&append("GPVTG,,T,,M,10.0,N,,K,A")) else {
            panic!("expected track");
        };
        assert_eq!(track.true_track_deg, None);
        assert!((track.speed_kmh.unwrap() - 18.52).abs() < 1e-9);
    }

    #[test]
    fn mwv_wind_units_and_normalization() {
        let ParsedReading::Wind(wind) = reading("$IIMWV,045.0,T,12.5,N,A*0C") else {
            panic!("expected wind");
        };
        assert_eq!(wind.reference, WindReference::True);
        assert_eq!(wind.speed_kn, 12.5);
        assert!(wind.valid);

        let ParsedReading::Wind(wind) = reading("$IIMWV,370.0,R,5.0,M,A*3F") else {
            panic!("expected wind");
        };
        assert_eq!(wind.reference, WindReference::Relative);
        assert!((wind.angle_deg - 10.0).abs() < 1e-9);
        assert!((wind.speed_kn - 9.719).abs() < 1e-3);

        let ParsedReading::Wind(wind) = reading("$WIMWV,214.8,R,0.1,K,A*28") else {
            panic!("expected wind");
        };
        assert!((wind.speed_kn - 0.1 / 1.852).abs() < 1e-9);
    }

    #[test]
    fn mwv_unknown_reference_fails() {
        let err = parse_sentence(&append("WIMWV,100.0,X,5.0,N,A")).unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure { .. }));
    }

    #[test]
    fn dpt_and_dbt_depth() {
        let ParsedReading::Depth(depth) = reading("$SDDPT,2.4,0.5,*78") else {
            panic!("expected depth");
        };
        assert_eq!(depth.depth_m, 2.4);
        assert_eq!(depth.transducer_offset_m, Some(0.5));
        assert_eq!(depth.max_range_m, None);

        let ParsedReading::Depth(depth) = reading("$SDDBT,7.8,f,2.4,M,1.3,F*0D") else {
            panic!("expected depth");
        };
        assert_eq!(depth.depth_m, 2.4);
    }

    #[test]
    fn zero_depth_is_a_reading_but_negative_is_rejected() {
        let ParsedReading::Depth(depth) = reading(&append("SDDPT,0.0,0.0,")) else {
            panic!("expected depth");
        };
        assert_eq!(depth.depth_m, 0.0);

        let err = parse_sentence("$SDDPT,-1.0,0.5,*52").unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure { .. }));
    }

    #[test]
    fn malformed_number_rejects_whole_sentence() {
        let err = parse_sentence(
            "$GPGGA,123519,48x7.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*0F",
        )
        .unwrap_err();
        match err {
            PipelineError::ParseFailure { reason, .. } => assert!(reason.contains("latitude")),
            other => panic!("expected parse failure, got {other:?}"),
        }

        let err = parse_sentence(&append("SDDPT,,0.5,")).unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure { .. }));
    }

    #[test]
    fn checksum_checked_before_fields() {
        let corrupted = "$GPGGA,123519,48x7.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
        let err = parse_sentence(corrupted).unwrap_err();
        assert!(matches!(err, PipelineError::ChecksumMismatch { .. }));

        let err = parse_sentence("$GPGGA,123519").unwrap_err();
        assert!(matches!(err, PipelineError::ChecksumMismatch { .. }));
    }

    #[test]
    fn unknown_and_proprietary_types_are_skipped() {
        let outcome = parse_sentence("$PGRME,15.0,M,45.0,M,25.0,M*1C").unwrap();
        assert_eq!(outcome, ParseOutcome::Unrecognized { identifier: "PGRME".to_string() });

        let outcome =
            parse_sentence("$GPGSV,3,1,11,03,03,111,00,04,15,270,00,06,01,010,00,13,06,292,00*74")
                .unwrap();
        assert!(outcome.into_reading().is_none());

        let ais = append("AIVDM,1,1,,A,13aEOK?P00PD2wVMdLDRhgvL289?,0");
        let outcome = parse_sentence(&ais).unwrap();
        assert!(matches!(outcome, ParseOutcome::Unrecognized { .. }));
    }

    #[test]
    fn short_sentence_is_parse_failure() {
        let err = parse_sentence(&append("GPRMC,123519,A")).unwrap_err();
        assert!(matches!(err, PipelineError::ParseFailure { .. }));
    }
}
