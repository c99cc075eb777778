//! Core traits for nearpoint

use crate::{mesh::*, point::*, point_cloud::*};

/// Trait for nearest neighbor search structures built over a fixed point set
///
/// Implementations must be safe to query from several threads at once; a
/// query never mutates the structure.
pub trait NearestNeighborSearch: Send + Sync {
    /// Index of the point closest to `query` and its Euclidean distance.
    ///
    /// Returns `None` only when the structure holds no points.
    fn nearest(&self, query: &Point3f) -> Option<(usize, f32)>;

    /// The indexed points, in their original order
    fn points(&self) -> &[Point3f];

    /// Number of indexed points
    fn point_count(&self) -> usize {
        self.points().len()
    }
}

/// Trait for drawable/renderable objects
pub trait Drawable {
    /// Get the bounding box of the object
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }

    /// Length of the bounding box diagonal
    fn extent(&self) -> f32 {
        let (min, max) = self.bounding_box();
        distance(&min, &max)
    }
}

fn bounds_of<'a>(points: impl IntoIterator<Item = &'a Point3f>) -> (Point3f, Point3f) {
    let mut iter = points.into_iter();
    let Some(first) = iter.next() else {
        return (Point3f::origin(), Point3f::origin());
    };

    iter.fold((*first, *first), |(min, max), p| {
        (min.inf(p), max.sup(p))
    })
}

impl Drawable for PointCloud<Point3f> {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(&self.points)
    }
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(&self.vertices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_bounding_box() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(-1.0, 2.0, 0.0),
                Point3f::new(3.0, -2.0, 1.0),
                Point3f::new(0.0, 0.0, -5.0),
            ],
            vec![[0, 1, 2]],
        );
        let (min, max) = mesh.bounding_box();
        assert_eq!(min, Point3f::new(-1.0, -2.0, -5.0));
        assert_eq!(max, Point3f::new(3.0, 2.0, 1.0));
        assert_eq!(mesh.center(), Point3f::new(1.0, 0.0, -2.0));
    }

    #[test]
    fn test_empty_bounding_box_is_origin() {
        let cloud = PointCloud3f::new();
        assert_eq!(cloud.bounding_box(), (Point3f::origin(), Point3f::origin()));
        assert_eq!(cloud.extent(), 0.0);
    }
}
