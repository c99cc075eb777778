//! Closest point search with selectable strategies
//!
//! [`find`] answers "which point of this set is closest to the query" using
//! one of three interchangeable [`Strategy`] values. All strategies validate
//! their inputs the same way and report the distance with the same formula,
//! so their results can be compared directly.

use crate::nearest_neighbor::{BruteForceSearch, KdTree};
use nearpoint_core::{
    distance, validate_point_set, validate_query_point, Error, NearestNeighborSearch, Point3f,
    PointLocator, Result,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Algorithm used to answer a closest point query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// The mesh library's spatial locator (`closest_point_pv`)
    #[default]
    BuiltinLocator,
    /// Balanced k-d tree (`kd_tree_scipy`)
    SpatialTree,
    /// Exhaustive linear scan (`reference`)
    BruteForce,
}

impl Strategy {
    /// Every strategy, in the order benchmarks report them
    pub const ALL: [Strategy; 3] = [
        Strategy::BuiltinLocator,
        Strategy::SpatialTree,
        Strategy::BruteForce,
    ];

    /// Name accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            Strategy::BuiltinLocator => "closest_point_pv",
            Strategy::SpatialTree => "kd_tree_scipy",
            Strategy::BruteForce => "reference",
        }
    }

    /// Build the search structure this strategy queries
    pub fn build_index<'a>(self, points: &'a [Point3f]) -> Result<Box<dyn NearestNeighborSearch + 'a>> {
        debug!(strategy = self.name(), points = points.len(), "building search index");
        Ok(match self {
            Strategy::BuiltinLocator => Box::new(PointLocator::new(points)?),
            Strategy::SpatialTree => Box::new(KdTree::new(points)?),
            Strategy::BruteForce => Box::new(BruteForceSearch::new(points)),
        })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| Error::UnsupportedStrategy(s.to_string()))
    }
}

/// Closest point of a point set to a query point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Position of the closest point in the point set
    pub index: usize,
    /// Coordinates of the closest point, equal to `points[index]`
    pub point: Point3f,
    /// Euclidean distance between the query and `point`
    pub distance: f32,
}

impl SearchResult {
    fn at(points: &[Point3f], index: usize, query: &Point3f) -> Self {
        let point = points[index];
        Self {
            index,
            point,
            distance: distance(&point, query),
        }
    }
}

/// Check the preconditions shared by every strategy
pub fn validate_inputs(points: &[Point3f], query: &Point3f) -> Result<()> {
    validate_query_point(query)?;
    validate_point_set(points)
}

/// Find the point of `points` closest to `query`.
///
/// Ties are broken per strategy: [`Strategy::BruteForce`] returns the lowest
/// tied index, the other strategies may return any tied index. The distance
/// is the same either way.
///
/// # Errors
/// * [`Error::EmptyPointSet`] when `points` is empty
/// * [`Error::InvalidQueryPoint`] when `query` has a non-finite coordinate
/// * [`Error::InvalidData`] when a point has a non-finite coordinate
pub fn find(points: &[Point3f], query: &Point3f, strategy: Strategy) -> Result<SearchResult> {
    validate_inputs(points, query)?;
    let index = strategy.build_index(points)?;
    let (closest, _) = index.nearest(query).ok_or(Error::EmptyPointSet)?;
    Ok(SearchResult::at(points, closest, query))
}

/// Like [`find`], selecting the strategy by its command line name.
///
/// An unknown name fails with [`Error::UnsupportedStrategy`] before any
/// search work is done.
pub fn find_by_name(points: &[Point3f], query: &Point3f, name: &str) -> Result<SearchResult> {
    let strategy: Strategy = name.parse()?;
    find(points, query, strategy)
}

/// Answer several independent queries against one point set.
///
/// The search structure is built once and queried in parallel.
pub fn find_many(
    points: &[Point3f],
    queries: &[Point3f],
    strategy: Strategy,
) -> Result<Vec<SearchResult>> {
    validate_point_set(points)?;
    queries.iter().try_for_each(validate_query_point)?;

    let index = strategy.build_index(points)?;
    queries
        .par_iter()
        .map(|query| {
            let (closest, _) = index.nearest(query).ok_or(Error::EmptyPointSet)?;
            Ok(SearchResult::at(points, closest, query))
        })
        .collect()
}
