//! Scene viewer

use crate::scene::Scene;
use nearpoint_core::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Shows scenes as text and optionally exports them for a mesh viewer.
///
/// There is no interactive window. [`Viewer::show`] prints the mesh summary,
/// overlay text and legend, then writes the colored PLY export when a path
/// is set. Display failures therefore only surface as I/O errors on the
/// output stream or the export file, both reported as
/// [`Error::Visualization`].
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    export_path: Option<PathBuf>,
}

impl Viewer {
    /// Create a viewer that only prints
    pub fn new() -> Self {
        Self::default()
    }

    /// Also write every shown scene to `path` as a colored PLY file
    pub fn with_export<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.export_path = Some(path.into());
        self
    }

    pub fn export_path(&self) -> Option<&Path> {
        self.export_path.as_deref()
    }

    /// Print the overlay text and legend of `scene` to `out`, then export it
    /// if an export path is set.
    pub fn show<W: Write>(&self, scene: &Scene<'_>, out: &mut W) -> Result<()> {
        write_scene(scene, out)
            .map_err(|e| Error::Visualization(format!("cannot display scene: {}", e)))?;

        if let Some(path) = &self.export_path {
            scene.export_ply(path)?;
            info!(path = %path.display(), "scene written");
        }
        Ok(())
    }
}

fn write_scene<W: Write>(scene: &Scene<'_>, out: &mut W) -> std::io::Result<()> {
    let mesh = scene.mesh();
    let [r, g, b] = scene.mesh_color();
    writeln!(
        out,
        "Mesh: {} vertices, {} faces, {} (opacity {:.1})",
        mesh.vertex_count(),
        mesh.face_count(),
        color_name([r, g, b, 255]),
        scene.mesh_opacity()
    )?;
    for line in scene.overlay_lines() {
        writeln!(out, "{}", line)?;
    }
    writeln!(out, "Legend:")?;
    for (label, color) in scene.legend() {
        writeln!(out, "  {} ({})", label, color_name(color))?;
    }
    out.flush()
}

/// Human readable name of a marker color
pub fn color_name(color: [u8; 4]) -> String {
    match color {
        [255, 0, 0, _] => "red".to_string(),
        [0, 0, 255, _] => "blue".to_string(),
        [255, 255, 255, _] => "white".to_string(),
        [r, g, b, _] => format!("#{:02x}{:02x}{:02x}", r, g, b),
    }
}
