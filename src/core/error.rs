//! Error types for AVM operations
//!
//! This module defines all fatal error types used throughout the crate.
//! Non-fatal conditions are reported as [`AvmWarning`](crate::core::warning::AvmWarning)
//! values instead.

use thiserror::Error;

/// Error types for AVM operations
#[derive(Debug, Error)]
pub enum AvmError {
    /// The container bytes do not start with the expected signature, or a
    /// segment/chunk runs past the end of the data
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// No APP1, APP0 or SOF segment to anchor a new JPEG XMP segment
    #[error("No insertion point for the XMP segment: {0}")]
    NoInsertionPoint(String),

    /// The first PNG chunk is not IHDR
    #[error("Missing header chunk: first chunk is {0}, expected IHDR")]
    MissingHeaderChunk(String),

    /// The finished APP1 payload would not fit in a JPEG segment
    #[error("XMP packet too large: segment payload of {size} bytes must stay below {limit} bytes")]
    PacketTooLarge {
        /// Size of the segment payload (identifier + packet)
        size: usize,
        /// Exclusive upper bound
        limit: usize,
    },

    /// The container holds no XMP packet
    #[error("No XMP packet found")]
    NoXmpPacketFound,

    /// An explicit packet index does not exist
    #[error("Packet index {index} out of range ({count} packets found)")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of packets found
        count: usize,
    },

    /// The container format is not understood structurally
    #[error("Unsupported container format: {0}")]
    UnsupportedContainerFormat(String),

    /// The RDF content has a shape the codec does not understand
    #[error("Unexpected RDF structure: {0}")]
    UnexpectedRdfStructure(String),

    /// A list value violates the field's length constraint
    #[error("List length error for {field}: {message}")]
    ListLengthError {
        /// Logical field name
        field: String,
        /// Description of the violated constraint
        message: String,
    },

    /// A value is not part of the field's controlled vocabulary
    #[error("{value} is not in the controlled vocabulary of {field}: {allowed}")]
    NotInControlledVocabulary {
        /// Logical field name
        field: String,
        /// Offending (case-normalized) value
        value: String,
        /// Comma separated list of allowed terms
        allowed: String,
    },

    /// The logical name is not declared by the active version
    #[error("{name} is not a valid AVM group or tag in the {version} standard")]
    UnknownField {
        /// Logical name that was looked up
        name: String,
        /// Active version identifier
        version: String,
    },

    /// The logical name only names a group, which cannot hold a value
    #[error("{0} is a group and cannot hold a value")]
    NotAScalarField(String),

    /// The produced image no longer decodes
    #[error("Verification failed: {0}")]
    VerificationFailed(String),

    /// A value could not be coerced to the kind the field requires
    #[error("Type error for {field}: {message}")]
    TypeError {
        /// Logical field name
        field: String,
        /// Description of the coercion failure
        message: String,
    },

    /// XML syntax error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A metadata version with no field table
    #[error("Unknown AVM metadata version: {0}")]
    UnknownVersion(String),

    /// The tree carries no spatial information
    #[error("No spatial information present")]
    NoSpatialInformation,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for AVM operations
pub type AvmResult<T> = Result<T, AvmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AvmError::UnknownField {
            name: "ProposalID".to_string(),
            version: "1.1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ProposalID is not a valid AVM group or tag in the 1.1 standard"
        );

        let err = AvmError::PacketTooLarge {
            size: 65629,
            limit: 65533,
        };
        assert!(err.to_string().contains("65629"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let avm_err: AvmError = io_err.into();
        assert!(matches!(avm_err, AvmError::IoError(_)));
    }
}
