//! NMEA 0183 wire handling: checksums, framing and sentence decoding.
//!
//! Everything in this module is synchronous and free of I/O. The connection layer
//! feeds raw bytes into a [`SentenceFramer`], and each framed line goes through
//! [`parse_sentence`].
//!
//! ```rust
//! use sailstream::nmea::{ParseOutcome, SentenceFramer, parse_sentence};
//!
//! let mut framer = SentenceFramer::new();
//! let framed = framer.push(b"$SDDPT,2.4,0.5,*78\r\n$PGRME,15.0,M,45.0,M,25.0,M*1C\r\n");
//!
//! let readings: Vec<_> = framed
//!     .sentences
//!     .iter()
//!     .filter_map(|s| parse_sentence(s).ok())
//!     .filter_map(ParseOutcome::into_reading)
//!     .collect();
//! assert_eq!(readings.len(), 1);
//! ```

pub mod checksum;
mod fields;
mod framer;
mod parser;

pub use fields::{Axis, ddmm_to_degrees, normalize_angle};
pub use framer::{DEFAULT_BUFFER_CAPACITY, Framed, SentenceFramer};
pub use parser::{ParseOutcome, parse_sentence};
