//! Error types for telemetry acquisition and decoding.
//!
//! Errors fall into three groups that the engine treats very differently:
//!
//! - **Startup errors** ([`SchemaError`], [`TelemetryError::Config`]): missing or
//!   malformed descriptor documents and configuration. These abort before the
//!   polling loop starts and are never retried.
//! - **Per-tick errors** ([`DecodeError`]): a single datagram or page that does
//!   not match its layout. The frame is discarded and the previous output stays
//!   on screen.
//! - **Source errors** ([`TelemetryError::Connection`],
//!   [`TelemetryError::UnsupportedPlatform`]): the producer is not running or the
//!   platform has no shared memory. The source reports `Unavailable` and is
//!   re-attempted on the next tick.
//!
//! ```rust
//! use pacenote::TelemetryError;
//!
//! let error = TelemetryError::connection_failed("shared memory not mapped");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

#[cfg(windows)]
use windows_core as core;

/// Result type alias for telemetry operations.
pub type Result<T, E = TelemetryError> = std::result::Result<T, E>;

/// Failures while loading descriptor documents and building a decode plan.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SchemaError {
    #[error("Channel '{0}' is referenced by the packet layout but missing from the channel dictionary")]
    UnknownChannel(String),

    #[error("Packet '{0}' not found in packet layout")]
    UnknownPacket(String),

    #[error("Channel '{0}' is defined more than once in the channel dictionary")]
    DuplicateChannel(String),

    #[error("Cannot read schema document {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed schema document {path}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures while decoding one raw buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("{layout} page is {actual} bytes, layout requires {expected}")]
    SizeMismatch { layout: &'static str, expected: usize, actual: usize },

    #[error("Datagram is {actual} bytes, decode plan requires {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Value for channel '{channel}' has type {found}, plan expects {expected}")]
    TypeMismatch { channel: String, expected: &'static str, found: &'static str },
}

/// Main error type for telemetry operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Telemetry source unavailable: {reason}")]
    Connection {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration error in {context}: {details}")]
    Config { context: String, details: String },

    #[error("File error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Socket error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{feature} is only available on {required_platform}")]
    UnsupportedPlatform { feature: String, required_platform: String },

    #[error("Windows API error: {operation}")]
    #[cfg(windows)]
    WindowsApi {
        operation: String,
        #[source]
        source: core::Error,
    },
}

impl TelemetryError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            TelemetryError::Connection { .. } => true,
            TelemetryError::Decode(_) => true,
            TelemetryError::Io { .. } => true,
            TelemetryError::Schema(_) => false,
            TelemetryError::Config { .. } => false,
            TelemetryError::File { .. } => false,
            TelemetryError::UnsupportedPlatform { .. } => false,
            #[cfg(windows)]
            TelemetryError::WindowsApi { .. } => true,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            TelemetryError::Schema(_) => vec![
                "Check the telemetry directory setting points at the game's readme folder",
                "Verify channels.json and udp/wrc.json are valid JSON",
                "Regenerate the telemetry descriptors from the game",
            ],
            TelemetryError::Decode(_) => vec![
                "Check that the game's UDP packet structure matches the loaded layout",
                "Verify the shared memory layout version matches the game build",
            ],
            TelemetryError::Connection { .. } => vec![
                "Ensure the simulator is running and in a session",
                "Check that telemetry output is enabled in the game",
            ],
            TelemetryError::Config { .. } => vec![
                "Check the configuration file for typos",
                "Remove the offending key to fall back to the default",
            ],
            TelemetryError::File { .. } => {
                vec!["Check file exists and is readable", "Check file permissions"]
            }
            TelemetryError::Io { .. } => vec![
                "Check that no other program is bound to the telemetry port",
                "Match the port with the game's telemetry configuration",
            ],
            TelemetryError::UnsupportedPlatform { .. } => vec![
                "Use the network source on this platform",
                "Run the dashboard on the machine hosting the simulator",
            ],
            #[cfg(windows)]
            TelemetryError::WindowsApi { .. } => vec![
                "Ensure the simulator is running",
                "Run the dashboard under the same user as the simulator",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        TelemetryError::File { path, source }
    }

    /// Helper constructor for unavailable sources.
    pub fn connection_failed(reason: impl Into<String>) -> Self {
        TelemetryError::Connection { reason: reason.into(), source: None }
    }

    /// Helper constructor for unavailable sources with an underlying cause.
    pub fn connection_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        TelemetryError::Connection { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for configuration errors.
    pub fn config_error(context: impl Into<String>, details: impl Into<String>) -> Self {
        TelemetryError::Config { context: context.into(), details: details.into() }
    }

    /// Helper constructor for socket errors.
    pub fn io_error(context: impl Into<String>, source: std::io::Error) -> Self {
        TelemetryError::Io { context: context.into(), source }
    }

    /// Helper constructor for Windows API errors.
    #[cfg(windows)]
    pub fn windows_api_error(operation: impl Into<String>, source: core::Error) -> Self {
        TelemetryError::WindowsApi { operation: operation.into(), source }
    }

    /// Helper constructor for unsupported platform errors.
    pub fn unsupported_platform(
        feature: impl Into<String>,
        required_platform: impl Into<String>,
    ) -> Self {
        TelemetryError::UnsupportedPlatform {
            feature: feature.into(),
            required_platform: required_platform.into(),
        }
    }
}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::Io { context: "<unknown>".to_string(), source: err }
    }
}

#[cfg(windows)]
impl From<core::Error> for TelemetryError {
    fn from(err: core::Error) -> Self {
        TelemetryError::WindowsApi {
            operation: "Unknown Windows operation".to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn error_messages_carry_context(
            channel in "[a-z_]{1,24}",
            expected in 0usize..4096,
            actual in 0usize..4096,
        ) {
            let unknown = TelemetryError::from(SchemaError::UnknownChannel(channel.clone()));
            prop_assert!(unknown.to_string().contains(&channel));

            let mismatch = TelemetryError::from(DecodeError::LengthMismatch { expected, actual });
            let message = mismatch.to_string();
            prop_assert!(message.contains(&expected.to_string()));
            prop_assert!(message.contains(&actual.to_string()));
        }
    }

    #[test]
    fn startup_errors_are_not_retryable() {
        let schema = TelemetryError::from(SchemaError::UnknownPacket("session_update".into()));
        let config = TelemetryError::config_error("refresh_rate_hz", "must be positive");

        assert!(!schema.is_retryable());
        assert!(!config.is_retryable());
    }

    #[test]
    fn per_tick_errors_are_retryable() {
        let decode =
            TelemetryError::from(DecodeError::SizeMismatch { layout: "physics", expected: 276, actual: 12 });
        let connection = TelemetryError::connection_failed("producer not running");

        assert!(decode.is_retryable());
        assert!(connection.is_retryable());
    }

    #[test]
    fn every_variant_offers_suggestions() {
        let errors = vec![
            TelemetryError::from(SchemaError::DuplicateChannel("rpm".into())),
            TelemetryError::from(DecodeError::LengthMismatch { expected: 8, actual: 4 }),
            TelemetryError::connection_failed("test"),
            TelemetryError::config_error("port", "zero"),
            TelemetryError::file_error(
                PathBuf::from("/missing.yaml"),
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            ),
            TelemetryError::io_error("bind", std::io::Error::other("in use")),
            TelemetryError::unsupported_platform("Shared memory telemetry", "Windows"),
        ];

        for error in errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty(), "no suggestions for {error}");
            assert!(suggestions.iter().all(|s| s.len() > 5));
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<TelemetryError>();
        assert_send_sync_static::<SchemaError>();
        assert_send_sync_static::<DecodeError>();
    }

    #[test]
    fn io_errors_convert_into_socket_errors() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        match TelemetryError::from(io_err) {
            TelemetryError::Io { source, .. } => assert_eq!(source.to_string(), "port taken"),
            other => panic!("Expected Io variant, got {other:?}"),
        }
    }
}
