//! Nearest neighbor search implementations

use nearpoint_core::{distance_squared, Error, NearestNeighborSearch, Point3f, Result};

/// Default number of points stored in a k-d tree leaf
pub const DEFAULT_LEAF_SIZE: usize = 16;

#[derive(Debug, Clone, Copy)]
enum Node {
    /// Range into `KdTree::indices`
    Leaf { start: usize, end: usize },
    /// Points in `left` have `coord[axis] <= value`, points in `right` have `coord[axis] >= value`
    Split {
        axis: usize,
        value: f32,
        left: usize,
        right: usize,
    },
}

/// Balanced k-d tree over a fixed set of 3D points.
///
/// Each internal node splits its range at the median along the axis of
/// greatest spread, so the tree depth is `O(log N)` regardless of the input
/// distribution. Collinear and duplicated points are handled without any
/// special casing: a range of identical points is still cut in half by
/// position.
///
/// Among points tied for the minimum distance the lowest index wins.
#[derive(Debug, Clone)]
pub struct KdTree {
    points: Vec<Point3f>,
    indices: Vec<usize>,
    nodes: Vec<Node>,
    leaf_size: usize,
}

impl KdTree {
    /// Build a tree with [`DEFAULT_LEAF_SIZE`] points per leaf
    pub fn new(points: &[Point3f]) -> Result<Self> {
        Self::with_leaf_size(points, DEFAULT_LEAF_SIZE)
    }

    /// Build a tree storing at most `leaf_size` points per leaf
    pub fn with_leaf_size(points: &[Point3f], leaf_size: usize) -> Result<Self> {
        if leaf_size == 0 {
            return Err(Error::InvalidData(
                "leaf_size must be greater than 0".to_string(),
            ));
        }

        let mut tree = Self {
            points: points.to_vec(),
            indices: (0..points.len()).collect(),
            nodes: Vec::with_capacity(2 * points.len() / leaf_size + 1),
            leaf_size,
        };
        if !points.is_empty() {
            tree.build(0, points.len());
        }
        Ok(tree)
    }

    /// Number of nodes, leaves included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest leaf, the root having depth 0
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    fn build(&mut self, start: usize, end: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { start, end });

        let len = end - start;
        if len <= self.leaf_size {
            return id;
        }

        let axis = self.widest_axis(start, end);
        let half = len / 2;
        let points = &self.points;
        self.indices[start..end].select_nth_unstable_by(half, |&a, &b| {
            points[a][axis].total_cmp(&points[b][axis])
        });
        let mid = start + half;
        let value = self.points[self.indices[mid]][axis];

        let left = self.build(start, mid);
        let right = self.build(mid, end);
        self.nodes[id] = Node::Split {
            axis,
            value,
            left,
            right,
        };
        id
    }

    fn widest_axis(&self, start: usize, end: usize) -> usize {
        let first = self.points[self.indices[start]];
        let (min, max) = self.indices[start + 1..end]
            .iter()
            .map(|&i| &self.points[i])
            .fold((first, first), |(min, max), p| (min.inf(p), max.sup(p)));
        let spread = max - min;

        let mut axis = 0;
        for candidate in 1..3 {
            if spread[candidate] > spread[axis] {
                axis = candidate;
            }
        }
        axis
    }

    fn search(&self, id: usize, query: &Point3f, best: &mut (usize, f32)) {
        match self.nodes[id] {
            Node::Leaf { start, end } => {
                for &i in &self.indices[start..end] {
                    let d2 = distance_squared(&self.points[i], query);
                    if d2 < best.1 || (d2 == best.1 && i < best.0) {
                        *best = (i, d2);
                    }
                }
            }
            Node::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = query[axis] - value;
                let (near, far) = if diff < 0.0 { (left, right) } else { (right, left) };
                self.search(near, query, best);
                // Every point behind the plane is at least |diff| away.
                if diff * diff <= best.1 {
                    self.search(far, query, best);
                }
            }
        }
    }
}

impl NearestNeighborSearch for KdTree {
    fn nearest(&self, query: &Point3f) -> Option<(usize, f32)> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best = (usize::MAX, f32::INFINITY);
        self.search(0, query, &mut best);
        (best.0 != usize::MAX).then(|| (best.0, best.1.sqrt()))
    }

    fn points(&self) -> &[Point3f] {
        &self.points
    }
}

/// Exhaustive linear scan, the reference every other search is checked against.
///
/// Borrows the point set and keeps no state besides the running minimum.
/// Among points tied for the minimum distance the first one in iteration
/// order wins.
#[derive(Debug, Clone, Copy)]
pub struct BruteForceSearch<'a> {
    points: &'a [Point3f],
}

impl<'a> BruteForceSearch<'a> {
    pub fn new(points: &'a [Point3f]) -> Self {
        Self { points }
    }
}

impl NearestNeighborSearch for BruteForceSearch<'_> {
    fn nearest(&self, query: &Point3f) -> Option<(usize, f32)> {
        let mut iter = self.points.iter().enumerate();
        let (_, first) = iter.next()?;
        let mut best = (0, distance_squared(first, query));

        for (idx, point) in iter {
            let d2 = distance_squared(point, query);
            if d2 < best.1 {
                best = (idx, d2);
            }
        }
        Some((best.0, best.1.sqrt()))
    }

    fn points(&self) -> &[Point3f] {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_points(n: usize, seed: u64) -> Vec<Point3f> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                Point3f::new(
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                )
            })
            .collect()
    }

    #[test]
    fn test_brute_force_first_occurrence_wins() {
        let points = vec![
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(-1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
        ];
        let search = BruteForceSearch::new(&points);
        assert_eq!(search.nearest(&Point3f::origin()), Some((0, 1.0)));
    }

    #[test]
    fn test_brute_force_empty() {
        assert_eq!(BruteForceSearch::new(&[]).nearest(&Point3f::origin()), None);
    }

    #[test]
    fn test_kdtree_matches_brute_force() {
        let points = random_points(2_000, 7);
        let tree = KdTree::new(&points).unwrap();
        let brute = BruteForceSearch::new(&points);

        for query in random_points(200, 8) {
            assert_eq!(tree.nearest(&query), brute.nearest(&query));
        }
    }

    #[test]
    fn test_kdtree_is_balanced() {
        let points = random_points(4_096, 1);
        let tree = KdTree::with_leaf_size(&points, 16).unwrap();
        // 4096 / 16 = 256 leaves, so a median split tree has depth 8.
        assert_eq!(tree.depth(), 8);
        assert_eq!(tree.node_count(), 511);
    }

    #[test]
    fn test_kdtree_collinear_points() {
        let points: Vec<Point3f> = (0..1_000)
            .map(|i| Point3f::new(i as f32 * 0.5, 0.0, 0.0))
            .collect();
        let tree = KdTree::with_leaf_size(&points, 4).unwrap();
        let (idx, d) = tree.nearest(&Point3f::new(100.2, 3.0, 4.0)).unwrap();
        assert_eq!(idx, 200);
        assert!((d - (0.04f32 + 25.0).sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_kdtree_duplicated_points() {
        let mut points = vec![Point3f::new(2.0, 2.0, 2.0); 500];
        points.push(Point3f::new(0.0, 0.0, 0.0));
        let tree = KdTree::with_leaf_size(&points, 1).unwrap();

        assert_eq!(tree.nearest(&Point3f::new(0.1, 0.0, 0.0)).map(|r| r.0), Some(500));
        assert_eq!(tree.nearest(&Point3f::new(3.0, 3.0, 3.0)).map(|r| r.0), Some(0));
    }

    #[test]
    fn test_kdtree_rejects_zero_leaf_size() {
        assert!(KdTree::with_leaf_size(&[Point3f::origin()], 0).is_err());
    }

    #[test]
    fn test_kdtree_empty() {
        let tree = KdTree::new(&[]).unwrap();
        assert_eq!(tree.nearest(&Point3f::origin()), None);
        assert_eq!(tree.depth(), 0);
    }
}
