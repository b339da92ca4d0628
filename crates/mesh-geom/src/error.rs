//! Error types for geometry operations.

use thiserror::Error;

/// Result type alias for geometry operations.
pub type GeomResult<T> = Result<T, GeomError>;

/// Errors that can occur during geometry operations.
#[derive(Debug, Error)]
pub enum GeomError {
    /// Malformed axis-aligned bounding box.
    #[error("invalid bounding box: {details}")]
    InvalidBbox { details: String },
}
