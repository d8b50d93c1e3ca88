//! Error types for the flattening pipeline.
//!
//! Failures come in three scopes, and the scope decides how much work is
//! discarded:
//!
//! - [`FlattenError`]: the whole input file is unusable. The caller decides
//!   whether to continue with the remaining files.
//! - [`ItemError`]: one item record is unusable. The item is skipped and the
//!   rest of the file is still processed.
//! - [`EncodeError`]: one field value failed normalization. Always surfaced
//!   wrapped in [`ItemError::Value`] with the offending field path.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort processing of a single input file.
#[derive(Debug, Error)]
pub enum FlattenError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not well-formed JSON.
    #[error("{}: malformed JSON: {source}", path.display())]
    MalformedInput {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file parsed, but the top-level `Items` collection is absent
    /// (or is not an array).
    #[error("{}: expected a top-level \"Items\" array", path.display())]
    Schema { path: PathBuf },
}

/// Errors that invalidate a single item record.
///
/// Row emission is atomic per item: when one of these occurs, none of the
/// item's rows reach any relation, and extraction moves on to the next item.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("record is not a JSON object")]
    NotAnObject,

    #[error("required field {0} is missing or null")]
    MissingField(String),

    #[error("field {0} is not a scalar value")]
    NotScalar(String),

    #[error("field {0} must be a JSON object")]
    ExpectedObject(String),

    #[error("field {0} must be a JSON array")]
    ExpectedArray(String),

    #[error("field {field}: {source}")]
    Value {
        field: String,
        #[source]
        source: EncodeError,
    },
}

impl ItemError {
    /// Wrap an encoding failure with the path of the field that held the
    /// offending value.
    pub fn value(field: impl Into<String>, source: EncodeError) -> Self {
        ItemError::Value {
            field: field.into(),
            source,
        }
    }
}

/// Errors from normalizing one scalar value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{0:?} does not strip to a decimal amount")]
    Currency(String),

    #[error("{0:?} is not a Mon-DD-YY HH:MM:SS timestamp")]
    Timestamp(String),

    #[error("unrecognized month abbreviation {0:?}")]
    Month(String),
}
