/*!
Error types for the HL7 codec.
*/

use thiserror::Error;

/// Common result type used throughout the codec
pub type Result<T> = std::result::Result<T, Hl7Error>;

/// Errors surfaced by encoding and decoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Hl7Error {
    /// No segment tagged `MSH` was found
    #[error("Missing MSH header segment")]
    MissingHeaderSegment,

    /// A segment has fewer fields than its template reads
    #[error("Malformed {tag} segment at position {position}: expected at least {required} fields, found {found}")]
    MalformedSegment {
        tag: String,
        position: usize,
        required: usize,
        found: usize,
    },

    /// A field value cannot be represented on the wire, or violates a model invariant
    #[error("Invalid value for {segment}.{field}: {reason}")]
    InvalidFieldValue {
        segment: String,
        field: String,
        reason: String,
    },
}

impl Hl7Error {
    /// Create a new malformed segment error
    pub fn malformed_segment(tag: impl Into<String>, position: usize, required: usize, found: usize) -> Self {
        Self::MalformedSegment {
            tag: tag.into(),
            position,
            required,
            found,
        }
    }

    /// Create a new invalid field value error
    pub fn invalid_field(
        segment: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidFieldValue {
            segment: segment.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}
