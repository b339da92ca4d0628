//! Error types for the mesh generation engine.

use thiserror::Error;

use mesh_geom::GeomError;

/// Result type alias for engine operations.
pub type GenResult<T> = Result<T, GenError>;

/// Errors that can occur while configuring or running the engine.
///
/// Every variant except `EmptyPointSet` is raised during validation, before
/// any iteration state exists. Mid-loop numeric edge cases are clamped
/// rather than reported.
#[derive(Debug, Error)]
pub enum GenError {
    /// A configuration value failed validation.
    #[error("invalid option `{name}`: {details}")]
    InvalidOption { name: &'static str, details: String },

    /// No minimum edge length could be determined.
    #[error("`h0` is required when the sizing field does not provide a minimum")]
    MissingMinimumSize,

    /// No bounding box could be determined.
    #[error("`bbox` is required when neither domain nor sizing provide one")]
    MissingBbox,

    /// The engine only meshes 2D and 3D domains.
    #[error("unsupported dimension {dim}: only 2 and 3 are meshable")]
    UnsupportedDimension { dim: usize },

    /// Fixed points cannot be constrained across partitions.
    #[error("fixed points are not supported with {size} ranks")]
    FixedPointsInParallel { size: usize },

    /// A rank ended up with nothing to triangulate.
    #[error("no vertices to mesh with on rank {rank}")]
    EmptyPointSet { rank: usize },

    /// Malformed geometry input.
    #[error(transparent)]
    Geometry(#[from] GeomError),
}
