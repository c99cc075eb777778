//! PLY format support

use crate::error::IoError;
use crate::{MeshReader, MeshWriter, PointCloudReader};
use nearpoint_core::{ColoredPoint3f, Point3f, PointCloud, Result, TriangleMesh, Vector3f};
use ply_rs::{
    parser::Parser,
    ply::{Addable, DefaultElement, ElementDef, Ply, Property, PropertyDef, PropertyType, ScalarType},
    writer::Writer,
};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

pub struct PlyReader;
pub struct PlyWriter;

impl PlyReader {
    /// Decode a PLY stream into a mesh
    pub fn read_mesh_from<R: Read>(reader: &mut R) -> std::result::Result<TriangleMesh, IoError> {
        let mut reader = BufReader::new(reader);
        let parser = Parser::<DefaultElement>::new();
        let ply = parser
            .read_ply(&mut reader)
            .map_err(|e| IoError::parse(format!("invalid PLY file: {}", e)))?;

        let vertex_element = ply
            .payload
            .get("vertex")
            .ok_or_else(|| IoError::parse("PLY file has no vertex element"))?;

        let mut vertices = Vec::with_capacity(vertex_element.len());
        for vertex in vertex_element {
            let x = extract_property_value(vertex, "x")?;
            let y = extract_property_value(vertex, "y")?;
            let z = extract_property_value(vertex, "z")?;
            vertices.push(Point3f::new(x, y, z));
        }

        let mut faces = Vec::new();
        if let Some(face_element) = ply.payload.get("face") {
            for face in face_element {
                let indices = extract_face_indices(face)?;
                for k in 1..indices.len().saturating_sub(1) {
                    faces.push([indices[0], indices[k], indices[k + 1]]);
                }
            }
        }

        let normals: Option<Vec<Vector3f>> = vertex_element
            .iter()
            .map(|vertex| {
                Some(Vector3f::new(
                    extract_property_value(vertex, "nx").ok()?,
                    extract_property_value(vertex, "ny").ok()?,
                    extract_property_value(vertex, "nz").ok()?,
                ))
            })
            .collect();

        let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if let Some(normals) = normals.filter(|n| !n.is_empty()) {
            mesh.set_normals(normals);
        }
        mesh.validate_faces()
            .map_err(|e| IoError::parse(e.to_string()))?;

        Ok(mesh)
    }
}

impl PointCloudReader for PlyReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud<Point3f>> {
        let mesh = Self::read_mesh(path)?;
        Ok(PointCloud::from_points(mesh.vertices))
    }
}

impl MeshReader for PlyReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let mut file = File::open(path)?;
        Ok(Self::read_mesh_from(&mut file)?)
    }
}

fn scalar_property(name: &str, scalar: ScalarType) -> PropertyDef {
    PropertyDef::new(name.to_string(), PropertyType::Scalar(scalar))
}

fn face_element(faces: &[[usize; 3]]) -> (ElementDef, Vec<DefaultElement>) {
    let mut def = ElementDef::new("face".to_string());
    def.count = faces.len();
    def.properties.add(PropertyDef::new(
        "vertex_indices".to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::Int),
    ));

    let rows = faces
        .iter()
        .map(|face| {
            let mut element = DefaultElement::new();
            let indices = face.iter().map(|&i| i as i32).collect();
            element.insert("vertex_indices".to_string(), Property::ListInt(indices));
            element
        })
        .collect();
    (def, rows)
}

fn write_ply<P: AsRef<Path>>(mut ply: Ply<DefaultElement>, path: P) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let writer_instance = Writer::new();
    writer_instance.write_ply(&mut writer, &mut ply)?;
    Ok(())
}

impl PlyWriter {
    /// Write a mesh whose vertices carry RGBA colors.
    ///
    /// The alpha channel is stored as an `alpha` property, which viewers such
    /// as MeshLab use for per-vertex transparency.
    pub fn write_colored_mesh<P: AsRef<Path>>(
        vertices: &[ColoredPoint3f],
        faces: &[[usize; 3]],
        path: P,
    ) -> Result<()> {
        let mut ply = Ply::<DefaultElement>::new();

        let mut vertex_def = ElementDef::new("vertex".to_string());
        vertex_def.count = vertices.len();
        for axis in ["x", "y", "z"] {
            vertex_def.properties.add(scalar_property(axis, ScalarType::Float));
        }
        for channel in ["red", "green", "blue", "alpha"] {
            vertex_def.properties.add(scalar_property(channel, ScalarType::UChar));
        }
        ply.header.elements.add(vertex_def);

        let rows = vertices
            .iter()
            .map(|v| {
                let mut element = DefaultElement::new();
                element.insert("x".to_string(), Property::Float(v.position.x));
                element.insert("y".to_string(), Property::Float(v.position.y));
                element.insert("z".to_string(), Property::Float(v.position.z));
                for (channel, value) in ["red", "green", "blue", "alpha"].iter().zip(v.color) {
                    element.insert(channel.to_string(), Property::UChar(value));
                }
                element
            })
            .collect();
        ply.payload.insert("vertex".to_string(), rows);

        if !faces.is_empty() {
            let (def, rows) = face_element(faces);
            ply.header.elements.add(def);
            ply.payload.insert("face".to_string(), rows);
        }

        write_ply(ply, path)
    }
}

impl MeshWriter for PlyWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let mut ply = Ply::<DefaultElement>::new();

        let normals = mesh
            .normals
            .as_ref()
            .filter(|n| n.len() == mesh.vertices.len());

        let mut vertex_def = ElementDef::new("vertex".to_string());
        vertex_def.count = mesh.vertices.len();
        for axis in ["x", "y", "z"] {
            vertex_def.properties.add(scalar_property(axis, ScalarType::Float));
        }
        if normals.is_some() {
            for axis in ["nx", "ny", "nz"] {
                vertex_def.properties.add(scalar_property(axis, ScalarType::Float));
            }
        }
        ply.header.elements.add(vertex_def);

        let rows = mesh
            .vertices
            .iter()
            .enumerate()
            .map(|(i, vertex)| {
                let mut element = DefaultElement::new();
                element.insert("x".to_string(), Property::Float(vertex.x));
                element.insert("y".to_string(), Property::Float(vertex.y));
                element.insert("z".to_string(), Property::Float(vertex.z));
                if let Some(normals) = normals {
                    element.insert("nx".to_string(), Property::Float(normals[i].x));
                    element.insert("ny".to_string(), Property::Float(normals[i].y));
                    element.insert("nz".to_string(), Property::Float(normals[i].z));
                }
                element
            })
            .collect();
        ply.payload.insert("vertex".to_string(), rows);

        let (def, rows) = face_element(&mesh.faces);
        ply.header.elements.add(def);
        ply.payload.insert("face".to_string(), rows);

        write_ply(ply, path)
    }
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> std::result::Result<f32, IoError> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        _ => Err(IoError::parse(format!(
            "Property '{}' not found or invalid type",
            name
        ))),
    }
}

/// Extract face indices from a PLY face element
fn extract_face_indices(element: &DefaultElement) -> std::result::Result<Vec<usize>, IoError> {
    match element.get("vertex_indices").or_else(|| element.get("vertex_index")) {
        Some(Property::ListInt(indices)) => indices
            .iter()
            .map(|&idx| usize::try_from(idx).map_err(|_| IoError::parse("negative face index")))
            .collect(),
        Some(Property::ListUInt(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        Some(Property::ListUChar(indices)) => Ok(indices.iter().map(|&idx| idx as usize).collect()),
        _ => Err(IoError::parse("Face indices not found")),
    }
}
