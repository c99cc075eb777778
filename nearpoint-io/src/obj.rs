//! OBJ format support

use crate::error::IoError;
use crate::{MeshReader, MeshWriter};
use nearpoint_core::{Point3f, Result, TriangleMesh};
use obj::ObjData;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

pub struct ObjReader;
pub struct ObjWriter;

impl ObjReader {
    /// Decode OBJ text into a mesh, fan triangulating polygons of every group
    pub fn read_mesh_from<R: Read>(reader: R) -> std::result::Result<TriangleMesh, IoError> {
        let data = ObjData::load_buf(BufReader::new(reader))
            .map_err(|e| IoError::parse(format!("invalid OBJ file: {}", e)))?;

        let vertices = data
            .position
            .iter()
            .map(|p| Point3f::new(p[0], p[1], p[2]))
            .collect();

        let mut faces = Vec::new();
        for object in &data.objects {
            for group in &object.groups {
                for poly in &group.polys {
                    let indices: Vec<usize> = poly.0.iter().map(|tuple| tuple.0).collect();
                    for k in 1..indices.len().saturating_sub(1) {
                        faces.push([indices[0], indices[k], indices[k + 1]]);
                    }
                }
            }
        }

        let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        mesh.validate_faces()
            .map_err(|e| IoError::parse(e.to_string()))?;
        Ok(mesh)
    }
}

impl MeshReader for ObjReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let file = File::open(path)?;
        Ok(Self::read_mesh_from(file)?)
    }
}

impl MeshWriter for ObjWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        for v in &mesh.vertices {
            writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
        }
        // OBJ indices are 1-based
        for f in &mesh.faces {
            writeln!(writer, "f {} {} {}", f[0] + 1, f[1] + 1, f[2] + 1)?;
        }
        writer.flush()?;
        Ok(())
    }
}
