//! Error types for NMEA ingestion.
//!
//! Every fault the pipeline can observe is a [`PipelineError`]. Most of them are
//! recovered locally: the offending sentence is dropped, or the connection manager
//! schedules a reconnect, and the error is published on the pipeline's error channel
//! for display. Only [`PipelineError::InvalidConfig`] is returned synchronously to a
//! caller, from `connect()`.
//!
//! ## Error Categories
//!
//! - **Link Errors**: socket failures and connect timeouts
//! - **Data Errors**: checksum mismatches and malformed fields in known sentences
//! - **Framing Errors**: a stream that never sends a line terminator
//! - **Configuration Errors**: invalid connection parameters or unreadable config files
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use sailstream::PipelineError;
//!
//! let error = PipelineError::connection_failed("connection refused");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::time::Duration;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T, E = PipelineError> = std::result::Result<T, E>;

/// Main error type for the ingestion pipeline.
///
/// Cloneable so a single error can be fanned out to every error subscriber.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("Connection failed: {reason}")]
    Connection { reason: String },

    #[error("Connect attempt timed out after {duration:?}")]
    Timeout { duration: Duration },

    #[error("Checksum mismatch in sentence: {sentence}")]
    ChecksumMismatch { sentence: String },

    #[error("Failed to parse sentence {sentence}: {reason}")]
    ParseFailure { sentence: String, reason: String },

    #[error("Framer buffer overflow: discarded {discarded} bytes without a line terminator")]
    BufferOverflow { discarded: usize },

    #[error("Invalid connection configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Configuration error: {details}")]
    Config { details: String },
}

impl PipelineError {
    /// Returns whether the underlying condition may clear up on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            PipelineError::Connection { .. } => true,
            PipelineError::Timeout { .. } => true,
            PipelineError::BufferOverflow { .. } => true,
            PipelineError::ChecksumMismatch { .. } => true,
            PipelineError::ParseFailure { .. } => false,
            PipelineError::InvalidConfig { .. } => false,
            PipelineError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            PipelineError::Connection { .. } => vec![
                "Check that the instrument gateway is powered on",
                "Verify host and port in the connection settings",
                "Confirm the device is on the same network",
            ],
            PipelineError::Timeout { .. } => vec![
                "Increase the connect timeout",
                "Check Wi-Fi signal strength to the gateway",
            ],
            PipelineError::ChecksumMismatch { .. } => vec![
                "Check cabling between instruments and multiplexer",
                "Look for baud rate mismatches on serial bridges",
            ],
            PipelineError::ParseFailure { .. } => vec![
                "Verify the talker emits standard NMEA 0183 fields",
                "Check instrument firmware for known output bugs",
            ],
            PipelineError::BufferOverflow { .. } => vec![
                "Confirm the port carries NMEA 0183 and not binary data",
                "Check the gateway's line ending settings",
            ],
            PipelineError::InvalidConfig { .. } => vec![
                "Use a port between 1 and 65535",
                "Provide a non-empty host name or address",
            ],
            PipelineError::Config { .. } => vec![
                "Check the configuration file exists and is readable",
                "Validate the YAML syntax",
            ],
        }
    }

    /// Helper constructor for connection errors.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        PipelineError::Connection { reason: reason.into() }
    }

    /// Helper constructor for parse failures.
    pub fn parse_failure(sentence: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::ParseFailure { sentence: sentence.into(), reason: reason.into() }
    }

    /// Helper constructor for checksum failures.
    pub fn checksum_mismatch(sentence: impl Into<String>) -> Self {
        PipelineError::ChecksumMismatch { sentence: sentence.into() }
    }

    /// Helper constructor for configuration validation errors.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        PipelineError::InvalidConfig { reason: reason.into() }
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Connection { reason: err.to_string() }
    }
}

impl From<serde_yaml_ng::Error> for PipelineError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        PipelineError::Config { details: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn error_messages_carry_their_context(
            reason in ".*",
            sentence in "\\$[A-Z]{5},[0-9.,]*",
            discarded in 0usize..100_000usize,
            duration_ms in 1u64..60000u64
          ) {
            let connection = PipelineError::connection_failed(reason.clone());
            prop_assert!(connection.to_string().contains(&reason));

            let parse = PipelineError::parse_failure(sentence.clone(), reason.clone());
            let parse_msg = parse.to_string();
            prop_assert!(parse_msg.contains(&sentence));
            prop_assert!(parse_msg.contains(&reason));

            let overflow = PipelineError::BufferOverflow { discarded };
            prop_assert!(overflow.to_string().contains(&discarded.to_string()));

            let timeout = PipelineError::Timeout { duration: Duration::from_millis(duration_ms) };
            prop_assert!(!timeout.to_string().is_empty());
          }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + Clone + 'static>() {}
        assert_send_sync_static::<PipelineError>();

        let error = PipelineError::connection_failed("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn retry_classification() {
        assert!(PipelineError::connection_failed("refused").is_retryable());
        assert!(PipelineError::Timeout { duration: Duration::from_secs(10) }.is_retryable());
        assert!(PipelineError::BufferOverflow { discarded: 10_241 }.is_retryable());
        assert!(!PipelineError::invalid_config("port 0").is_retryable());

        for error in [
            PipelineError::connection_failed("x"),
            PipelineError::checksum_mismatch("$GPGGA*00"),
            PipelineError::parse_failure("$GPGGA", "bad latitude"),
            PipelineError::invalid_config("x"),
        ] {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }

    #[test]
    fn from_conversions_work() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let converted: PipelineError = io_err.into();
        match converted {
            PipelineError::Connection { reason } => assert!(reason.contains("refused")),
            other => panic!("Expected Connection error, got {other:?}"),
        }

        let yaml_err = serde_yaml_ng::from_str::<u16>("[not, a, port]").unwrap_err();
        assert!(matches!(PipelineError::from(yaml_err), PipelineError::Config { .. }));
    }
}
