//! Core data structures and traits for nearpoint
//!
//! This crate provides the fundamental types shared by the nearpoint crates:
//! points, point clouds, triangle meshes, the crate-wide error type, and the
//! mesh point locator used for closest vertex lookups.

pub mod point;
pub mod point_cloud;
pub mod mesh;
pub mod traits;
pub mod locator;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use mesh::*;
pub use traits::*;
pub use locator::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3};
