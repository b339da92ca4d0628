//! Engine configuration.
//!
//! Options are plain immutable structs threaded through the entry points;
//! unknown keys are unrepresentable and value errors surface from
//! `validate()` before any loop state is created.

use nalgebra::{Point, Point3};

use mesh_geom::Bbox;

use crate::error::{GenError, GenResult};

/// How chatty the engine is.
///
/// Maps onto log levels rather than swapping behavior: `Summary` emits
/// start/end `info!` lines, `Detailed` adds per-iteration `debug!` progress,
/// `Silent` leaves only warnings and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent,
    Summary,
    Detailed,
}

/// Parameters for [`generate_mesh`](crate::generate_mesh).
#[derive(Debug, Clone)]
pub struct GenerateOptions<const D: usize> {
    /// Logging policy.
    pub verbose: Verbosity,

    /// Number of relaxation iterations to run.
    pub max_iter: usize,

    /// Seed for the rejection sampler; identical seeds reproduce identical
    /// meshes for the same inputs and rank count.
    pub seed: u64,

    /// Run the full quality lint at termination instead of the light cleanup.
    pub perform_checks: bool,

    /// Points constrained to stay exactly where they are.
    pub fixed_points: Vec<Point<f64, D>>,

    /// Axis along which the domain is decomposed across ranks.
    pub axis: usize,

    /// Pseudo-timestep for the Euler update of point positions.
    pub delta_t: f64,

    /// Minimum edge length; required when the sizing field has no intrinsic
    /// minimum (i.e. it is not a scalar).
    pub h0: Option<f64>,

    /// Bounding box; required when neither domain nor sizing provide one.
    pub bbox: Option<Bbox<D>>,

    /// User-supplied starting points. When set, the lattice generator is
    /// skipped and (in parallel) rank 0 partitions these along `axis`.
    pub initial_points: Option<Vec<Point<f64, D>>>,
}

impl<const D: usize> Default for GenerateOptions<D> {
    fn default() -> Self {
        Self {
            verbose: Verbosity::Summary,
            max_iter: 50,
            seed: 0,
            perform_checks: false,
            fixed_points: Vec::new(),
            axis: 1,
            delta_t: 0.30,
            h0: None,
            bbox: None,
            initial_points: None,
        }
    }
}

impl<const D: usize> GenerateOptions<D> {
    /// Validate option values. Called by the entry points before anything
    /// else happens.
    pub fn validate(&self) -> GenResult<()> {
        if !(D == 2 || D == 3) {
            return Err(GenError::UnsupportedDimension { dim: D });
        }
        if self.max_iter == 0 {
            return Err(GenError::InvalidOption {
                name: "max_iter",
                details: "must be at least 1".into(),
            });
        }
        if let Some(h0) = self.h0 {
            if !(h0 > 0.0) {
                return Err(GenError::InvalidOption {
                    name: "h0",
                    details: format!("must be positive, got {h0}"),
                });
            }
        }
        if !(self.delta_t > 0.0) {
            return Err(GenError::InvalidOption {
                name: "delta_t",
                details: format!("must be positive, got {}", self.delta_t),
            });
        }
        if self.axis >= D {
            return Err(GenError::InvalidOption {
                name: "axis",
                details: format!("must be < {D}, got {}", self.axis),
            });
        }
        Ok(())
    }
}

/// Parameters for [`sliver_removal`](crate::sliver_removal).
#[derive(Debug, Clone)]
pub struct SliverOptions {
    /// Logging policy.
    pub verbose: Verbosity,

    /// Maximum number of improvement iterations; the pass exits early the
    /// first time no sliver is found.
    pub max_iter: usize,

    /// Run the full quality lint at termination instead of the light cleanup.
    pub perform_checks: bool,

    /// Points constrained in the mesh. Rejected when more than one rank
    /// participates.
    pub fixed_points: Vec<Point3<f64>>,

    /// Cells with any dihedral angle below this bound (degrees) are slivers.
    pub min_dihedral_deg: f64,

    /// Cells with any dihedral angle above this bound (degrees) are slivers.
    pub max_dihedral_deg: f64,

    /// Minimum edge length; required when the sizing field has no intrinsic
    /// minimum.
    pub h0: Option<f64>,

    /// Bounding box override.
    pub bbox: Option<Bbox<3>>,
}

impl Default for SliverOptions {
    fn default() -> Self {
        Self {
            verbose: Verbosity::Summary,
            max_iter: 50,
            perform_checks: false,
            fixed_points: Vec::new(),
            min_dihedral_deg: 10.0,
            max_dihedral_deg: 170.0,
            h0: None,
            bbox: None,
        }
    }
}

impl SliverOptions {
    /// Validate option values.
    pub fn validate(&self, comm_size: usize) -> GenResult<()> {
        if self.max_iter == 0 {
            return Err(GenError::InvalidOption {
                name: "max_iter",
                details: "must be at least 1".into(),
            });
        }
        if let Some(h0) = self.h0 {
            if !(h0 > 0.0) {
                return Err(GenError::InvalidOption {
                    name: "h0",
                    details: format!("must be positive, got {h0}"),
                });
            }
        }
        if !(self.min_dihedral_deg > 0.0 && self.max_dihedral_deg < 180.0) {
            return Err(GenError::InvalidOption {
                name: "dihedral bounds",
                details: format!(
                    "must lie strictly inside (0, 180), got [{}, {}]",
                    self.min_dihedral_deg, self.max_dihedral_deg
                ),
            });
        }
        if self.min_dihedral_deg >= self.max_dihedral_deg {
            return Err(GenError::InvalidOption {
                name: "dihedral bounds",
                details: "minimum bound must be below maximum bound".into(),
            });
        }
        if comm_size > 1 && !self.fixed_points.is_empty() {
            return Err(GenError::FixedPointsInParallel { size: comm_size });
        }
        Ok(())
    }
}
