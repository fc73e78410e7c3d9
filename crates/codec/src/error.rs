//! Error types for the value codec.

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while encoding or decoding values.
///
/// Every error aborts the whole encode/decode call; no partial results are
/// returned. Variants carry the offending tag, id, literal, or flag so the
/// failure can be diagnosed without re-running.
#[derive(Debug, Error)]
pub enum Error {
    /// Encoder was given a native value with no wire representation.
    #[error("Unsupported type of argument: {0}")]
    UnsupportedValue(String),

    /// Decoder was given a structurally invalid tree: a dangling reference,
    /// an unknown sentinel literal, an unparsable date/url/bigint/regex
    /// payload, a missing composite id, or a value with no tag at all.
    #[error("Malformed wire value: {0}")]
    MalformedWireValue(String),

    /// A regex flag has no bijective wire counterpart.
    #[error("Unsupported regex flag: '{0}'")]
    FlagTranslation(char),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the offending flag if this is a flag translation error.
    pub fn offending_flag(&self) -> Option<char> {
        match self {
            Error::FlagTranslation(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns true if this is a malformed-wire-value error.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedWireValue(_))
    }
}
