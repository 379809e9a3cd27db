//! Core types for NMEA data representation.
//!
//! ## Architecture
//!
//! - [`ParsedReading`] is one decoded sentence (GGA, RMC, VTG, MWV, DPT/DBT)
//! - [`AggregatedSnapshot`] holds the newest reading of each kind
//! - [`ConnectionConfig`] describes how to reach the instrument gateway
//! - [`ConnectionState`] reports link health
//! - [`PipelineStats`] counts what the pipeline has seen
//!
//! ## Usage Example
//!
//! ```rust
//! use sailstream::types::{AggregatedSnapshot, DepthReading, ParsedReading};
//!
//! let mut snapshot = AggregatedSnapshot::default();
//! snapshot.apply(ParsedReading::Depth(DepthReading {
//!     depth_m: 12.5,
//!     transducer_offset_m: Some(0.4),
//!     max_range_m: None,
//! }));
//!
//! assert_eq!(snapshot.depth.map(|d| d.depth_m), Some(12.5));
//! assert!(snapshot.wind.is_none());
//! ```

mod config;
mod reading;
mod snapshot;
mod state;
mod stats;

pub use config::{ConnectionConfig, DEFAULT_NMEA_PORT, TransportKind};
pub use reading::{
    DepthReading, MinimumNavigation, ParsedReading, PositionFix, ReadingKind, TrackAndSpeed,
    WindReading, WindReference,
};
pub use snapshot::AggregatedSnapshot;
pub use state::ConnectionState;
pub(crate) use stats::PipelineCounters;
pub use stats::PipelineStats;
