//! Scene description: mesh, markers, overlay text and legend

use nearpoint_algorithms::SearchResult;
use nearpoint_core::{ColoredPoint3f, Drawable, Error, Point3f, Result, TriangleMesh};
use nearpoint_io::ply::PlyWriter;
use std::path::Path;
use tracing::{debug, info};

pub const QUERY_COLOR: [u8; 4] = [255, 0, 0, 255];
pub const CLOSEST_COLOR: [u8; 4] = [0, 0, 255, 255];
pub const MESH_COLOR: [u8; 3] = [255, 255, 255];
pub const MESH_OPACITY: f32 = 0.5;

/// Marker size used for the query and closest points
pub const MARKER_SIZE: f32 = 20.0;

/// Fraction of the scene extent covered by the radius of a marker of
/// size [`MARKER_SIZE`]
const MARKER_RADIUS_FRACTION: f32 = 0.01;

// Tessellation of exported marker spheres
const MARKER_THETA_RES: usize = 12;
const MARKER_PHI_RES: usize = 8;

/// Which result fields the overlay text shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowFields {
    pub query: bool,
    pub closest: bool,
    pub distance: bool,
}

impl ShowFields {
    pub fn all() -> Self {
        Self {
            query: true,
            closest: true,
            distance: true,
        }
    }

    pub fn none() -> Self {
        Self {
            query: false,
            closest: false,
            distance: false,
        }
    }
}

impl Default for ShowFields {
    fn default() -> Self {
        Self::all()
    }
}

/// A labeled point drawn as a small sphere
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub label: String,
    pub position: Point3f,
    pub color: [u8; 4],
    pub size: f32,
}

impl Marker {
    pub fn new(label: impl Into<String>, position: Point3f, color: [u8; 4]) -> Self {
        Self {
            label: label.into(),
            position,
            color,
            size: MARKER_SIZE,
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
}

/// Format coordinates rounded to two decimals, e.g. `[20.29 83.58 26.50]`
pub fn format_coords(p: &Point3f) -> String {
    format!("[{:.2} {:.2} {:.2}]", p.x, p.y, p.z)
}

/// Overlay lines for a result, one per enabled field
pub fn overlay_lines(query: &Point3f, result: &SearchResult, show: ShowFields) -> Vec<String> {
    let mut lines = Vec::new();
    if show.query {
        lines.push(format!("Query Coordinates: {}", format_coords(query)));
    }
    if show.closest {
        lines.push(format!("Closest Coordinates: {}", format_coords(&result.point)));
    }
    if show.distance {
        lines.push(format!("Distance: {:.2} mm", result.distance));
    }
    lines
}

/// Everything displayed for one closest point search
#[derive(Debug, Clone)]
pub struct Scene<'a> {
    mesh: &'a TriangleMesh,
    mesh_color: [u8; 3],
    mesh_opacity: f32,
    markers: Vec<Marker>,
    overlay: Vec<String>,
}

impl<'a> Scene<'a> {
    /// An empty scene around `mesh`, drawn white and half transparent
    pub fn new(mesh: &'a TriangleMesh) -> Self {
        Self {
            mesh,
            mesh_color: MESH_COLOR,
            mesh_opacity: MESH_OPACITY,
            markers: Vec::new(),
            overlay: Vec::new(),
        }
    }

    /// The standard scene for a search result: query marker in red,
    /// closest point marker in blue, overlay text per `show`.
    pub fn for_result(
        mesh: &'a TriangleMesh,
        query: &Point3f,
        result: &SearchResult,
        show: ShowFields,
    ) -> Self {
        let mut scene = Self::new(mesh);
        scene.add_marker(Marker::new("Query Point", *query, QUERY_COLOR));
        scene.add_marker(Marker::new("Closest Point", result.point, CLOSEST_COLOR));
        for line in overlay_lines(query, result, show) {
            scene.add_text(line);
        }
        scene
    }

    pub fn add_marker(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn add_text(&mut self, line: impl Into<String>) {
        self.overlay.push(line.into());
    }

    pub fn mesh(&self) -> &TriangleMesh {
        self.mesh
    }

    pub fn mesh_color(&self) -> [u8; 3] {
        self.mesh_color
    }

    pub fn mesh_opacity(&self) -> f32 {
        self.mesh_opacity
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn overlay_lines(&self) -> &[String] {
        &self.overlay
    }

    /// Overlay text as displayed, one field per line
    pub fn overlay_text(&self) -> String {
        let mut text = String::new();
        for line in &self.overlay {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// Legend entries, one per labeled marker
    pub fn legend(&self) -> impl Iterator<Item = (&str, [u8; 4])> + '_ {
        self.markers
            .iter()
            .filter(|m| !m.label.is_empty())
            .map(|m| (m.label.as_str(), m.color))
    }

    /// Radius of the sphere drawn for `marker`, proportional to the scene size
    pub fn marker_radius(&self, marker: &Marker) -> f32 {
        let extent = self.mesh.extent();
        let scale = if extent > 0.0 && extent.is_finite() { extent } else { 1.0 };
        scale * MARKER_RADIUS_FRACTION * marker.size / MARKER_SIZE
    }

    /// Flatten the scene into colored vertices and triangles.
    ///
    /// Mesh vertices come first and keep their indices; every marker is
    /// appended as a small sphere centered on its position.
    pub fn to_colored_mesh(&self) -> Result<(Vec<ColoredPoint3f>, Vec<[usize; 3]>)> {
        let alpha = (self.mesh_opacity * 255.0).round() as u8;
        let [r, g, b] = self.mesh_color;

        let mut vertices: Vec<ColoredPoint3f> = self
            .mesh
            .vertices
            .iter()
            .map(|&p| ColoredPoint3f::new(p, [r, g, b, alpha]))
            .collect();
        let mut faces = self.mesh.faces.clone();

        for marker in &self.markers {
            let radius = self.marker_radius(marker);
            let sphere = TriangleMesh::uv_sphere(radius, MARKER_THETA_RES, MARKER_PHI_RES)?;
            let offset = vertices.len();
            vertices.extend(sphere.vertices.iter().map(|p| {
                ColoredPoint3f::new(marker.position + p.coords, marker.color)
            }));
            faces.extend(
                sphere
                    .faces
                    .iter()
                    .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
            );
        }

        debug!(
            vertices = vertices.len(),
            faces = faces.len(),
            markers = self.markers.len(),
            "flattened scene"
        );
        Ok((vertices, faces))
    }

    /// Write the scene as a PLY file with per-vertex RGBA colors.
    ///
    /// Any failure is reported as [`Error::Visualization`].
    pub fn export_ply<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let (vertices, faces) = self
            .to_colored_mesh()
            .map_err(|e| Error::Visualization(format!("cannot build scene geometry: {}", e)))?;
        PlyWriter::write_colored_mesh(&vertices, &faces, path).map_err(|e| {
            Error::Visualization(format!("cannot write {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), vertices = vertices.len(), "exported scene");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn result_at(mesh: &TriangleMesh, index: usize, query: &Point3f) -> SearchResult {
        let point = mesh.vertices[index];
        SearchResult {
            index,
            point,
            distance: nearpoint_core::distance(query, &point),
        }
    }

    fn square() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(10.0, 0.0, 0.0),
                Point3f::new(10.0, 10.0, 0.0),
                Point3f::new(0.0, 10.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_format_coords() {
        assert_eq!(format_coords(&Point3f::new(20.294, 83.58, 26.5)), "[20.29 83.58 26.50]");
        assert_eq!(format_coords(&Point3f::new(0.004, -1.5, 100.0)), "[0.00 -1.50 100.00]");
    }

    #[test]
    fn test_overlay_follows_show_fields() {
        let mesh = square();
        let query = Point3f::new(1.0, 1.0, 3.0);
        let result = result_at(&mesh, 0, &query);

        let all = overlay_lines(&query, &result, ShowFields::all());
        assert_eq!(
            all,
            vec![
                "Query Coordinates: [1.00 1.00 3.00]".to_string(),
                "Closest Coordinates: [0.00 0.00 0.00]".to_string(),
                "Distance: 3.32 mm".to_string(),
            ]
        );

        let only_distance = ShowFields {
            distance: true,
            ..ShowFields::none()
        };
        assert_eq!(overlay_lines(&query, &result, only_distance), vec!["Distance: 3.32 mm"]);
        assert!(overlay_lines(&query, &result, ShowFields::none()).is_empty());
    }

    #[test]
    fn test_scene_for_result() {
        let mesh = square();
        let query = Point3f::new(9.0, 9.0, 1.0);
        let result = result_at(&mesh, 2, &query);
        let scene = Scene::for_result(&mesh, &query, &result, ShowFields::default());

        assert_eq!(scene.mesh_opacity(), MESH_OPACITY);
        assert_eq!(scene.markers().len(), 2);
        assert_eq!(scene.markers()[0].position, query);
        assert_eq!(scene.markers()[1].position, mesh.vertices[2]);

        let legend: Vec<_> = scene.legend().collect();
        assert_eq!(
            legend,
            vec![("Query Point", QUERY_COLOR), ("Closest Point", CLOSEST_COLOR)]
        );
        assert_eq!(scene.overlay_text().lines().count(), 3);
        assert!(scene.overlay_text().ends_with("Distance: 1.73 mm\n"));
    }

    #[test]
    fn test_marker_radius_scales_with_extent() {
        let mesh = square();
        let scene = Scene::new(&mesh);
        let marker = Marker::new("m", Point3f::origin(), QUERY_COLOR);
        let diagonal = (200.0f32).sqrt();
        assert_relative_eq!(scene.marker_radius(&marker), diagonal * 0.01, epsilon = 1e-6);
        assert_relative_eq!(
            scene.marker_radius(&marker.clone().with_size(40.0)),
            diagonal * 0.02,
            epsilon = 1e-6
        );

        let single = TriangleMesh::from_vertices_and_faces(vec![Point3f::new(1.0, 2.0, 3.0)], vec![]);
        assert!(Scene::new(&single).marker_radius(&marker) > 0.0);
    }

    #[test]
    fn test_colored_mesh_layout() {
        let mesh = square();
        let query = Point3f::new(5.0, 5.0, 5.0);
        let result = result_at(&mesh, 0, &query);
        let scene = Scene::for_result(&mesh, &query, &result, ShowFields::none());
        let (vertices, faces) = scene.to_colored_mesh().unwrap();

        let per_marker = 2 + MARKER_THETA_RES * (MARKER_PHI_RES - 2);
        assert_eq!(vertices.len(), 4 + 2 * per_marker);
        assert_eq!(vertices[0].color, [255, 255, 255, 128]);
        assert_eq!(vertices[4].color, QUERY_COLOR);
        assert_eq!(vertices[4 + per_marker].color, CLOSEST_COLOR);
        assert_eq!(&faces[..2], &mesh.faces[..]);
        assert!(faces.iter().flatten().all(|&i| i < vertices.len()));

        let radius = scene.marker_radius(&scene.markers()[0]);
        for v in &vertices[4..4 + per_marker] {
            assert_relative_eq!(nearpoint_core::distance(&v.position, &query), radius, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_export_ply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.ply");
        let mesh = square();
        let query = Point3f::new(1.0, 0.0, 1.0);
        let result = result_at(&mesh, 0, &query);
        let scene = Scene::for_result(&mesh, &query, &result, ShowFields::default());

        scene.export_ply(&path).unwrap();
        let loaded = nearpoint_io::read_mesh(&path).unwrap();
        let (vertices, faces) = scene.to_colored_mesh().unwrap();
        assert_eq!(loaded.vertex_count(), vertices.len());
        assert_eq!(loaded.face_count(), faces.len());
    }

    #[test]
    fn test_export_failure_is_visualization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("scene.ply");
        let mesh = square();
        let err = Scene::new(&mesh).export_ply(&path).unwrap_err();
        assert!(err.is_visualization(), "{:?}", err);
    }
}
