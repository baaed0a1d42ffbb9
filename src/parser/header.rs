//! Fixed-layout file header decoder.
//!
//! The header is a null-terminated version string followed by the
//! identifier byte width and the capture timestamp. The width read here is
//! fixed for the whole file and threaded through every later decode.

use crate::parser::reader::ByteReader;
use crate::utils::config::KNOWN_VERSION_STRINGS;
use crate::utils::error::HprofError;
use log::debug;

/// Format version of a dump, matched exactly against the known version
/// string set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HprofVersion {
    Jdk101,
    Jdk102,
    Android,
}

impl HprofVersion {
    /// The exact string this version writes into the file header.
    pub fn version_string(self) -> &'static str {
        match self {
            HprofVersion::Jdk101 => KNOWN_VERSION_STRINGS[0],
            HprofVersion::Jdk102 => KNOWN_VERSION_STRINGS[1],
            HprofVersion::Android => KNOWN_VERSION_STRINGS[2],
        }
    }

    fn from_version_string(s: &str) -> Option<HprofVersion> {
        match s {
            "JAVA PROFILE 1.0.1" => Some(HprofVersion::Jdk101),
            "JAVA PROFILE 1.0.2" => Some(HprofVersion::Jdk102),
            "JAVA PROFILE 1.0.3" => Some(HprofVersion::Android),
            _ => None,
        }
    }
}

/// Decoded file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HprofHeader {
    /// Capture timestamp, milliseconds since epoch.
    pub timestamp: i64,

    /// Format version parsed from the header string.
    pub version: HprofVersion,

    /// Width of every identifier in the file. Identifiers reference UTF-8
    /// strings, objects, classes and stack traces; they can match the host
    /// pointer width but are not required to.
    pub identifier_byte_size: u32,
}

impl HprofHeader {
    /// Total encoded header size: version string + 1 terminator byte +
    /// 4-byte identifier width + 8-byte timestamp. Callers doing absolute
    /// offset bookkeeping start record offsets here.
    pub fn header_size(&self) -> usize {
        self.version.version_string().len() + 1 + 4 + 8
    }
}

/// Decode the file header and validate the identifier width.
///
/// # Errors
/// * `HprofError::UnrecognizedVersion` - version string not in the known set
/// * `HprofError::InvalidIdentifierWidth` - width outside {1, 2, 4, 8}
/// * `HprofError::TruncatedInput` - header shorter than its fixed layout
pub fn parse_header(reader: &mut ByteReader<'_>) -> Result<HprofHeader, HprofError> {
    let end_of_version = reader.index_of(0x00).ok_or(HprofError::TruncatedInput)?;
    let version_string = reader.read_utf8(end_of_version)?;
    let version = HprofVersion::from_version_string(&version_string)
        .ok_or(HprofError::UnrecognizedVersion(version_string))?;

    // string terminator
    reader.skip(1)?;

    let identifier_byte_size = reader.read_u32()?;
    if !matches!(identifier_byte_size, 1 | 2 | 4 | 8) {
        return Err(HprofError::InvalidIdentifierWidth(identifier_byte_size));
    }
    let timestamp = reader.read_i64()?;

    debug!(
        "Parsed header: version {:?}, identifier size {}, timestamp {}",
        version, identifier_byte_size, timestamp
    );

    Ok(HprofHeader {
        timestamp,
        version,
        identifier_byte_size,
    })
}
