//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while decoding or linking a heap dump.
///
/// Every variant is fatal: the in-progress parse aborts and no partial
/// snapshot is returned. Unrecognized *top-level* record tags are not an
/// error - they are preserved as unknown records and parsing continues.
#[derive(Error, Debug)]
pub enum HprofError {
    #[error("failed to read dump: {0}")]
    Io(#[from] std::io::Error),

    #[error("input truncated: stream ended mid-record or mid-value")]
    TruncatedInput,

    #[error("unrecognized hprof version string: {0:?}")]
    UnrecognizedVersion(String),

    #[error("identifier byte size must be 1, 2, 4 or 8, got {0}")]
    InvalidIdentifierWidth(u32),

    #[error("unsupported sub-record tag inside heap dump segment: 0x{0:02x}")]
    UnsupportedSubRecordTag(u8),

    #[error("unknown value type code: {0}")]
    UnknownValueType(u8),
}

/// Errors that can occur during summary file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
