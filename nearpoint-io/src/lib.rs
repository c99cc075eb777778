//! I/O operations for meshes and point clouds
//!
//! This crate reads the surface meshes nearpoint searches over. Supported
//! formats are legacy VTK (ASCII and binary), PLY and OBJ; the format is
//! picked from the file extension.

pub mod error;
pub mod obj;
pub mod ply;
pub mod vtk;

pub use error::*;

use nearpoint_core::{Error, Point3f, PointCloud, Result, TriangleMesh};
use std::path::Path;
use tracing::{debug, info};

/// Trait for reading point clouds from files
pub trait PointCloudReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>>;
}

/// Trait for reading meshes from files
pub trait MeshReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh>;
}

/// Trait for writing meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()>;
}

/// Mesh file formats nearpoint can read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Vtk,
    Ply,
    Obj,
}

impl MeshFormat {
    /// Detect the format from the file extension, case-insensitively
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase());
        match ext.as_deref() {
            Some("vtk") => Ok(MeshFormat::Vtk),
            Some("ply") => Ok(MeshFormat::Ply),
            Some("obj") => Ok(MeshFormat::Obj),
            _ => Err(Error::UnsupportedFormat(format!(
                "Unsupported mesh format: {:?}",
                path.extension()
            ))),
        }
    }
}

/// Auto-detect format and read mesh.
///
/// # Errors
/// * [`Error::FileNotFound`] when `path` does not exist
/// * [`Error::UnsupportedFormat`] for an unknown extension
/// * [`Error::UnreadableMesh`] when the contents cannot be decoded
pub fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let format = MeshFormat::from_path(path)?;
    debug!(?format, path = %path.display(), "reading mesh");
    let mesh = match format {
        MeshFormat::Vtk => vtk::VtkReader::read_mesh(path),
        MeshFormat::Ply => ply::PlyReader::read_mesh(path),
        MeshFormat::Obj => obj::ObjReader::read_mesh(path),
    }
    .map_err(|e| match e {
        Error::Io(io) => Error::UnreadableMesh(format!("{}: {}", path.display(), io)),
        other => other,
    })?;

    info!(
        path = %path.display(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "loaded mesh"
    );
    Ok(mesh)
}

/// Read only the vertex positions of a mesh file
pub fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
    Ok(PointCloud::from_points(read_mesh(path)?.vertices))
}

/// Auto-detect format and write mesh
pub fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match MeshFormat::from_path(path)? {
        MeshFormat::Vtk => vtk::VtkWriter::write_mesh(mesh, path),
        MeshFormat::Ply => ply::PlyWriter::write_mesh(mesh, path),
        MeshFormat::Obj => obj::ObjWriter::write_mesh(mesh, path),
    }
}
