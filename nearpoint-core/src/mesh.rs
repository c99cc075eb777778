//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::locator::PointLocator;
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            normals: None,
        }
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
        }
    }

    /// Generate a latitude/longitude sphere centered at the origin.
    ///
    /// `theta_resolution` is the number of meridians, `phi_resolution` the
    /// number of points along each meridian including both poles. Vertex 0 is
    /// the north pole `(0, 0, radius)`, vertex 1 the south pole, followed by
    /// one ring of `phi_resolution - 2` points per meridian from north to
    /// south.
    pub fn uv_sphere(radius: f32, theta_resolution: usize, phi_resolution: usize) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(Error::InvalidData(format!(
                "sphere radius must be positive and finite, got {}",
                radius
            )));
        }
        if theta_resolution < 3 || phi_resolution < 3 {
            return Err(Error::InvalidData(format!(
                "sphere resolution must be at least 3x3, got {}x{}",
                theta_resolution, phi_resolution
            )));
        }

        let ring = phi_resolution - 2;
        let r = radius as f64;
        let mut vertices = Vec::with_capacity(2 + theta_resolution * ring);
        vertices.push(Point3f::new(0.0, 0.0, radius));
        vertices.push(Point3f::new(0.0, 0.0, -radius));

        let delta_phi = PI / (phi_resolution - 1) as f64;
        let delta_theta = 2.0 * PI / theta_resolution as f64;
        for i in 0..theta_resolution {
            let theta = i as f64 * delta_theta;
            for j in 1..=ring {
                let phi = j as f64 * delta_phi;
                let radial = r * phi.sin();
                vertices.push(Point3f::new(
                    (radial * theta.cos()) as f32,
                    (radial * theta.sin()) as f32,
                    (r * phi.cos()) as f32,
                ));
            }
        }

        let base = |i: usize| 2 + (i % theta_resolution) * ring;
        let mut faces = Vec::with_capacity(2 * theta_resolution * (ring.max(1)));
        for i in 0..theta_resolution {
            let (this, next) = (base(i), base(i + 1));
            faces.push([0, this, next]);
            for j in 0..ring - 1 {
                faces.push([this + j, this + j + 1, next + j + 1]);
                faces.push([this + j, next + j + 1, next + j]);
            }
            faces.push([1, next + ring - 1, this + ring - 1]);
        }

        Ok(Self::from_vertices_and_faces(vertices, faces))
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Check that every face references an existing vertex
    pub fn validate_faces(&self) -> Result<()> {
        let n = self.vertices.len();
        match self.faces.iter().position(|f| f.iter().any(|&i| i >= n)) {
            Some(bad) => Err(Error::InvalidData(format!(
                "face {} references a vertex out of range (vertex count {})",
                bad, n
            ))),
            None => Ok(()),
        }
    }

    /// Index of the vertex closest to `query`.
    ///
    /// Builds a [`PointLocator`] over the vertices for this one call. Keep a
    /// locator from [`TriangleMesh::point_locator`] around when issuing many
    /// queries against the same mesh.
    pub fn find_closest_point(&self, query: &Point3f) -> Result<usize> {
        self.point_locator()?.closest_point(query)
    }

    /// Build the spatial locator used by [`TriangleMesh::find_closest_point`]
    pub fn point_locator(&self) -> Result<PointLocator> {
        PointLocator::new(&self.vertices)
    }
}
