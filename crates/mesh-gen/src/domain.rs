//! Signed-distance domain descriptions.
//!
//! The engine only ever sees a [`SignedDistance`] implementor: negative
//! strictly inside the domain, zero on the boundary, positive outside. Any
//! closure with that convention works; the canonical shapes additionally
//! carry their exact bounding box, which spares the caller from supplying
//! one.

use nalgebra::{Point, Point2, Point3};

use mesh_geom::{Bbox, GeomResult};

/// An implicit domain given by a signed distance to its boundary.
pub trait SignedDistance<const D: usize> {
    /// Signed distance at `p`: negative inside, zero on the boundary,
    /// positive outside.
    fn eval(&self, p: &Point<f64, D>) -> f64;

    /// Exact bounding box, when the shape knows one.
    fn bbox(&self) -> Option<Bbox<D>> {
        None
    }

    /// Whether this is a canonical axis-aligned box. Box domains are rebuilt
    /// from the merged bounding box when sizing padding widens it.
    fn is_box(&self) -> bool {
        false
    }
}

impl<const D: usize, F> SignedDistance<D> for F
where
    F: Fn(&Point<f64, D>) -> f64,
{
    fn eval(&self, p: &Point<f64, D>) -> f64 {
        self(p)
    }
}

/// An axis-aligned rectangle domain.
#[derive(Debug, Clone, Copy)]
pub struct Rectangle {
    bbox: Bbox<2>,
}

impl Rectangle {
    /// Create a rectangle spanning `[x1, x2] x [y1, y2]`.
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> GeomResult<Self> {
        Ok(Self {
            bbox: Bbox::new([x1, y1], [x2, y2])?,
        })
    }
}

impl SignedDistance<2> for Rectangle {
    fn eval(&self, p: &Point2<f64>) -> f64 {
        self.bbox.signed_distance(p)
    }

    fn bbox(&self) -> Option<Bbox<2>> {
        Some(self.bbox)
    }

    fn is_box(&self) -> bool {
        true
    }
}

/// An axis-aligned box domain.
#[derive(Debug, Clone, Copy)]
pub struct Cuboid {
    bbox: Bbox<3>,
}

impl Cuboid {
    /// Create a box spanning `[x1, x2] x [y1, y2] x [z1, z2]`.
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64, z1: f64, z2: f64) -> GeomResult<Self> {
        Ok(Self {
            bbox: Bbox::new([x1, y1, z1], [x2, y2, z2])?,
        })
    }
}

impl SignedDistance<3> for Cuboid {
    fn eval(&self, p: &Point3<f64>) -> f64 {
        self.bbox.signed_distance(p)
    }

    fn bbox(&self) -> Option<Bbox<3>> {
        Some(self.bbox)
    }

    fn is_box(&self) -> bool {
        true
    }
}

/// A disk domain.
#[derive(Debug, Clone, Copy)]
pub struct Disk {
    center: Point2<f64>,
    radius: f64,
}

impl Disk {
    /// Create a disk with the given center and radius.
    pub fn new(center: Point2<f64>, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl SignedDistance<2> for Disk {
    fn eval(&self, p: &Point2<f64>) -> f64 {
        (p - self.center).norm() - self.radius
    }

    fn bbox(&self) -> Option<Bbox<2>> {
        let c = self.center;
        let r = self.radius;
        Bbox::new([c.x - r, c.y - r], [c.x + r, c.y + r]).ok()
    }
}
