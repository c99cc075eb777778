//! Point types and related functionality

use crate::error::{Error, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A point with RGBA color information
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColoredPoint3f {
    pub position: Point3f,
    pub color: [u8; 4],
}

impl ColoredPoint3f {
    pub fn new(position: Point3f, color: [u8; 4]) -> Self {
        Self { position, color }
    }
}

impl Default for ColoredPoint3f {
    fn default() -> Self {
        Self {
            position: Point3f::origin(),
            color: [255, 255, 255, 255],
        }
    }
}

/// Squared Euclidean distance between two points.
///
/// Every search strategy ranks candidates with this function, so two
/// strategies that agree on an index also agree bit-for-bit on the distance.
#[inline]
pub fn distance_squared(a: &Point3f, b: &Point3f) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    dx * dx + dy * dy + dz * dz
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: &Point3f, b: &Point3f) -> f32 {
    distance_squared(a, b).sqrt()
}

/// Returns true when all three coordinates are finite
#[inline]
pub fn is_finite_point(p: &Point3f) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

/// Reject a query point with a NaN or infinite coordinate
pub fn validate_query_point(query: &Point3f) -> Result<()> {
    if is_finite_point(query) {
        Ok(())
    } else {
        Err(Error::InvalidQueryPoint(format!(
            "coordinates must be finite, got ({}, {}, {})",
            query.x, query.y, query.z
        )))
    }
}

/// Reject an empty point set or one holding a non-finite coordinate.
///
/// The error names the first offending point.
pub fn validate_point_set(points: &[Point3f]) -> Result<()> {
    if points.is_empty() {
        return Err(Error::EmptyPointSet);
    }
    match points.iter().position(|p| !is_finite_point(p)) {
        Some(bad) => Err(Error::InvalidData(format!(
            "point {} has a non-finite coordinate",
            bad
        ))),
        None => Ok(()),
    }
}
