//! Spatial point locator attached to meshes
//!
//! This is the mesh library's own closest point facility: an R*-tree over the
//! vertex positions, bulk loaded once and then queried any number of times.

use crate::error::{Error, Result};
use crate::point::*;
use crate::traits::NearestNeighborSearch;
use rstar::primitives::GeomWithData;
use rstar::RTree;

/// A vertex position tagged with its index in the source point set
type IndexedPoint = GeomWithData<[f32; 3], usize>;

/// Hierarchical spatial index over a fixed point set
#[derive(Clone)]
pub struct PointLocator {
    points: Vec<Point3f>,
    tree: RTree<IndexedPoint>,
}

impl std::fmt::Debug for PointLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointLocator")
            .field("points", &self.points.len())
            .finish()
    }
}

impl PointLocator {
    /// Bulk load a locator over `points`.
    ///
    /// Fails with [`Error::EmptyPointSet`] for an empty slice and with
    /// [`Error::InvalidData`] when a coordinate is not finite.
    pub fn new(points: &[Point3f]) -> Result<Self> {
        validate_point_set(points)?;

        let entries: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new([p.x, p.y, p.z], i))
            .collect();

        Ok(Self {
            points: points.to_vec(),
            tree: RTree::bulk_load(entries),
        })
    }

    /// Index of the point closest to `query`
    pub fn closest_point(&self, query: &Point3f) -> Result<usize> {
        validate_query_point(query)?;
        self.nearest(query)
            .map(|(index, _)| index)
            .ok_or(Error::EmptyPointSet)
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a successfully built locator
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl NearestNeighborSearch for PointLocator {
    fn nearest(&self, query: &Point3f) -> Option<(usize, f32)> {
        let hit = self.tree.nearest_neighbor(&[query.x, query.y, query.z])?;
        Some((hit.data, distance(&self.points[hit.data], query)))
    }

    fn points(&self) -> &[Point3f] {
        &self.points
    }
}
