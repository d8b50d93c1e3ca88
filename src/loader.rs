//! Document loading: one auction dump file to its list of item records.
//!
//! A dump file is a single JSON object whose `Items` key holds the array
//! of item records. Anything else (a bare array, a missing or non-array
//! `Items`) is a schema failure for the whole file; what to do about a
//! failed file is the caller's decision.

use crate::error::FlattenError;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Read one dump file and return its item records.
///
/// Parsing tries simd-json first and falls back to serde_json, whose
/// error carries the line/column diagnostics reported to the user.
pub fn load_items(path: &Path) -> Result<Vec<Value>, FlattenError> {
    let bytes = fs::read(path).map_err(|source| FlattenError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // simd-json parses in place, so it works on its own copy; the
    // untouched original feeds serde_json when the fast path fails.
    let mut simd_bytes = bytes.clone();
    let document: Value = match simd_json::serde::from_slice(&mut simd_bytes) {
        Ok(value) => value,
        Err(_) => {
            serde_json::from_slice(&bytes).map_err(|source| FlattenError::MalformedInput {
                path: path.to_path_buf(),
                source,
            })?
        }
    };

    let mut map = match document {
        Value::Object(map) => map,
        _ => {
            return Err(FlattenError::Schema {
                path: path.to_path_buf(),
            })
        }
    };

    match map.remove("Items") {
        Some(Value::Array(items)) => Ok(items),
        Some(_) | None => Err(FlattenError::Schema {
            path: path.to_path_buf(),
        }),
    }
}

/// Whether a path names a `.json` file. The dumps come interleaved with
/// checksum and readme files, which are passed over without comment.
pub fn has_json_ext(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}
