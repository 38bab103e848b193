//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ApiError, SyncError};

/// Map domain errors to the message printed on stderr
///
/// A missing manifest is shown as the user-facing message alone.
pub fn map_error(e: &ApiError) -> String {
    match e {
        ApiError::Sync(SyncError::ManifestUnavailable) => SyncError::ManifestUnavailable.to_string(),
        other => format!("Error: {}", other),
    }
}
