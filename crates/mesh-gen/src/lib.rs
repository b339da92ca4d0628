//! Parallel force-equilibrium mesh generation over implicit domains.
//!
//! The engine meshes a domain given as a signed-distance function and a
//! target-edge-length sizing field. Starting from a staggered lattice thinned
//! by rejection sampling, it repeatedly retriangulates the point cloud,
//! discards exterior cells, pushes vertices along one-sided edge springs, and
//! projects strays back onto the boundary; after a fixed number of rounds the
//! partial meshes are merged, welded, and polished. A separate pass bounds
//! the dihedral angles of tetrahedral meshes by perturbing sliver cells.
//!
//! Two collaborators are supplied by the caller as traits: an incremental
//! Delaunay [`Oracle`] and a [`Communicator`] carrying the collectives of the
//! ghost-exchange protocol. [`SerialComm`] covers the single-rank case and
//! [`LocalComm`] wires several ranks together inside one process.
//!
//! ```no_run
//! use mesh_gen::{generate_mesh, GenerateOptions, Rectangle, SerialComm};
//! # use mesh_gen::Oracle;
//! # struct Tri;
//! # impl Oracle<2, 3> for Tri {
//! #     fn insert(&mut self, _: &[nalgebra::Point2<f64>]) {}
//! #     fn relocate(&mut self, _: &[usize], _: &[nalgebra::Point2<f64>]) {}
//! #     fn finite_vertices(&self) -> Vec<nalgebra::Point2<f64>> { vec![] }
//! #     fn finite_cells(&self) -> Vec<[usize; 3]> { vec![] }
//! # }
//!
//! let domain = Rectangle::new(0.0, 1.0, 0.0, 1.0)?;
//! let mesh = generate_mesh(
//!     &domain,
//!     &0.1_f64,
//!     &SerialComm,
//!     || Tri,
//!     &GenerateOptions::default(),
//! )?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod decomp;
mod migration;
mod points;
mod project;
mod resolve;

pub mod comm;
pub mod domain;
pub mod error;
pub mod generate;
pub mod options;
pub mod oracle;
pub mod sizing;
pub mod sliver;

pub use comm::{Communicator, LocalComm, SerialComm};
pub use decomp::blocker;
pub use domain::{Cuboid, Disk, Rectangle, SignedDistance};
pub use error::{GenError, GenResult};
pub use generate::generate_mesh;
pub use options::{GenerateOptions, SliverOptions, Verbosity};
pub use oracle::Oracle;
pub use sizing::SizingField;
pub use sliver::{sliver_removal, SliverOutcome};
