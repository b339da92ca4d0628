//! Geometry queries and repair for simplex meshes.
//!
//! This crate provides the pure-function layer underneath the `mesh-gen`
//! engine: everything here operates on a plain `(points, cells)` pair with no
//! knowledge of signed-distance domains, sizing fields, or communicators.
//! Common operations include:
//!
//! - **Topology**: unique undirected edges, boundary vertices, facet counts
//! - **Measures**: simplex volumes, centroids, circumspheres, dihedral angles
//! - **Repair**: vertex welding, degenerate/duplicate cell removal, renumbering
//!
//! Meshes are dimension-generic: points are `nalgebra::Point<f64, D>` and
//! cells are `[usize; C]` index tuples with `C == D + 1` (triangles in 2D,
//! tetrahedra in 3D).

mod bbox;
mod error;
mod mesh;

pub mod circumsphere;
pub mod edges;
pub mod measures;
pub mod repair;

pub use bbox::Bbox;
pub use error::{GeomError, GeomResult};
pub use mesh::{SimplexMesh, TetMesh, TriMesh};

pub use circumsphere::{circumcenter, circumradius, circumsphere_grad, dihedral_angles};
pub use edges::{boundary_vertices, unique_edges};
pub use measures::{cell_centroid, cell_volume};
pub use repair::{fix_mesh, linter, remove_external_entities, LintReport};
