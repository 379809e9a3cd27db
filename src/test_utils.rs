//! Sentence fixtures and builders shared by unit tests and benches

#![cfg(any(test, feature = "benchmark"))]

use crate::nmea::checksum;

/// Known-good sentences with valid checksums.
pub mod sentences {
    pub const GGA: &str = "$GPGGA,092750.000,5321.6802,N,00630.3372,W,1,8,1.03,61.7,M,55.2,M,,*76";
    pub const RMC: &str = "$GNRMC,092751.000,A,5321.6802,N,00630.3371,W,0.06,31.66,280511,,,A*5B";
    pub const VTG: &str = "$GPVTG,054.7,T,034.4,M,005.5,N,010.2,K*48";
    pub const MWV_RELATIVE: &str = "$WIMWV,214.8,R,0.1,K,A*28";
    pub const MWV_TRUE: &str = "$IIMWV,045.0,T,12.5,N,A*0C";
    pub const DPT: &str = "$SDDPT,2.4,0.5,*78";
    pub const DBT: &str = "$SDDBT,7.8,f,2.4,M,1.3,F*0D";
    pub const GSV: &str = "$GPGSV,3,1,11,03,03,111,00,04,15,270,00,06,01,010,00,13,06,292,00*74";
    pub const PROPRIETARY: &str = "$PGRME,15.0,M,45.0,M,25.0,M*1C";
}

/// Render `body` as a complete sentence with checksum and CRLF.
pub fn sentence_line(body: &str) -> String {
    format!("{}\r\n", checksum::append(body))
}

/// A short log covering every decoded sentence type plus ones that are skipped.
pub fn sample_log() -> Vec<u8> {
    [
        sentences::GGA,
        sentences::GSV,
        sentences::RMC,
        sentences::VTG,
        sentences::PROPRIETARY,
        sentences::MWV_RELATIVE,
        sentences::DPT,
    ]
    .iter()
    .map(|s| format!("{s}\r\n"))
    .collect::<String>()
    .into_bytes()
}

/// `count` sentences of mixed types, some with bad checksums, as one byte stream.
pub fn mixed_stream(count: usize) -> Vec<u8> {
    let mut out = String::new();
    for i in 0..count {
        let line = match i % 6 {
            0 => sentence_line(&format!(
                "GPGGA,{:02}{:02}{:02}.00,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,",
                (i / 3600) % 24,
                (i / 60) % 60,
                i % 60
            )),
            1 => sentence_line(&format!("SDDPT,{}.{},0.5,", i % 50, i % 10)),
            2 => sentence_line(&format!("WIMWV,{}.0,R,{}.5,N,A", i % 360, i % 30)),
            3 => format!("{}\r\n", sentences::GSV),
            // Corrupted checksum
            4 => "$SDDPT,2.4,0.5,*00\r\n".to_string(),
            _ => format!("{}\r\n", sentences::RMC),
        };
        out.push_str(&line);
    }
    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmea::{ParseOutcome, SentenceFramer, parse_sentence};

    #[test]
    fn fixtures_have_valid_checksums() {
        for s in [
            sentences::GGA,
            sentences::RMC,
            sentences::VTG,
            sentences::MWV_RELATIVE,
            sentences::MWV_TRUE,
            sentences::DPT,
            sentences::DBT,
            sentences::GSV,
            sentences::PROPRIETARY,
        ] {
            assert!(checksum::is_valid(s), "{s}");
        }
    }

    #[test]
    fn mixed_stream_parses_as_expected() {
        let mut framer = SentenceFramer::new();
        let framed = framer.push(&mixed_stream(60));
        assert_eq!(framed.sentences.len(), 60);

        let outcomes: Vec<_> = framed.sentences.iter().map(|s| parse_sentence(s)).collect();
        assert_eq!(outcomes.iter().filter(|o| o.is_err()).count(), 10);
        let unrecognized =
            outcomes.iter().filter(|o| matches!(o, Ok(ParseOutcome::Unrecognized { .. })));
        assert_eq!(unrecognized.count(), 10);
    }
}
