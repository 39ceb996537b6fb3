//! Non-fatal diagnostics
//!
//! Operations that recover from a condition with a well-defined default
//! (discarding duplicate packets, picking the first of several packets,
//! falling back to byte scanning, keeping a suspicious URL, deleting a field
//! during version migration) report it as an [`AvmWarning`].
//!
//! Every warning is logged through the `log` facade when it is raised and is
//! also handed back to the caller, either inside a result struct or through
//! [`AvmMeta::take_warnings`](crate::core::metadata::AvmMeta::take_warnings).

use std::fmt;

/// A recoverable condition raised while reading or writing metadata
#[derive(Debug, Clone, PartialEq)]
pub enum AvmWarning {
    /// Existing XMP records were removed before embedding a new one
    DuplicatePacketDiscarded {
        /// Container format name
        format: &'static str,
        /// Number of records removed
        count: usize,
    },
    /// Several packets were found and none was selected explicitly
    MultiplePacketsAmbiguous {
        /// Number of packets found
        count: usize,
    },
    /// The container was not recognized and raw byte scanning was used
    UnsupportedContainerFormat,
    /// A URL value does not look like a URL; it is kept as-is
    InvalidUrl {
        /// Logical field name
        field: String,
        /// Stored value
        value: String,
    },
    /// An email value does not look like an address; it is kept as-is
    InvalidEmail {
        /// Logical field name
        field: String,
        /// Stored value
        value: String,
    },
    /// A populated field does not exist in the version being migrated to
    FieldRemovedOnMigration {
        /// Logical field name
        field: String,
        /// Target version identifier
        version: String,
    },
    /// A tag in a recognized namespace is not declared by the active version
    TagIgnored {
        /// Namespace prefix
        prefix: &'static str,
        /// Wire tag
        tag: String,
    },
    /// A value was assigned to a deprecated field
    DeprecatedField {
        /// Logical field name
        field: String,
    },
    /// The packet declares a metadata version with no field table
    UnsupportedVersion {
        /// Declared version
        declared: String,
        /// Version used instead
        used: String,
    },
}

impl fmt::Display for AvmWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvmWarning::DuplicatePacketDiscarded { format, count } => write!(
                f,
                "discarded {} existing XMP packet(s) from {} container",
                count, format
            ),
            AvmWarning::MultiplePacketsAmbiguous { count } => write!(
                f,
                "{} XMP packets found, using the first one (pass a packet index to select another)",
                count
            ),
            AvmWarning::UnsupportedContainerFormat => write!(
                f,
                "container format not recognized, scanning raw bytes for XMP packets"
            ),
            AvmWarning::InvalidUrl { field, value } => {
                write!(f, "{} does not appear to be a valid URL: {}", field, value)
            }
            AvmWarning::InvalidEmail { field, value } => write!(
                f,
                "{} does not appear to be a valid email address: {}",
                field, value
            ),
            AvmWarning::FieldRemovedOnMigration { field, version } => write!(
                f,
                "{} is not defined in format specification {} and will be deleted",
                field, version
            ),
            AvmWarning::TagIgnored { prefix, tag } => {
                write!(f, "ignoring tag {}:{}", prefix, tag)
            }
            AvmWarning::DeprecatedField { field } => write!(f, "{} is deprecated", field),
            AvmWarning::UnsupportedVersion { declared, used } => write!(
                f,
                "metadata version {} is not supported, reading as {}",
                declared, used
            ),
        }
    }
}

/// Log a warning and append it to a buffer
pub(crate) fn raise(buffer: &mut Vec<AvmWarning>, warning: AvmWarning) {
    log::warn!("{}", warning);
    buffer.push(warning);
}
