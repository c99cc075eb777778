//! # nearpoint algorithms
//!
//! Closest point search over 3D point sets.
//!
//! Three interchangeable strategies answer the same question, selected with
//! [`Strategy`]:
//!
//! - [`Strategy::BuiltinLocator`]: the mesh library's R*-tree point locator
//! - [`Strategy::SpatialTree`]: a balanced [`KdTree`]
//! - [`Strategy::BruteForce`]: a linear scan, used as the reference
//!
//! ```rust
//! use nearpoint_algorithms::{find, Strategy};
//! use nearpoint_core::Point3f;
//!
//! let points = vec![
//!     Point3f::new(0.0, 0.0, 0.0),
//!     Point3f::new(1.0, 0.0, 0.0),
//!     Point3f::new(0.0, 1.0, 0.0),
//! ];
//! let result = find(&points, &Point3f::new(0.9, 0.1, 0.0), Strategy::SpatialTree).unwrap();
//! assert_eq!(result.index, 1);
//! ```

pub mod nearest_neighbor;
pub mod closest_point;
pub mod timing;

// Re-export commonly used items
pub use nearest_neighbor::*;
pub use closest_point::*;
pub use timing::*;
