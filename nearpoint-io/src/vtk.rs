//! Legacy VTK format support
//!
//! Reads the geometry of `POLYDATA` and `UNSTRUCTURED_GRID` datasets in both
//! ASCII and big-endian binary encoding. Polygons are fan triangulated; lines,
//! vertices and strips are skipped. Dataset `FIELD` blocks and the `METADATA`
//! blocks written by VTK 9 are skipped wherever they appear, and reading stops
//! at the attribute sections (`POINT_DATA`, `CELL_DATA`).
//!
//! Both cell layouts are accepted: the classic one (`POLYGONS n size`
//! followed by `count i0 i1 ...` records) and the version 5 one with separate
//! `OFFSETS` and `CONNECTIVITY` arrays.

use crate::error::IoError;
use crate::{MeshReader, MeshWriter};
use byteorder::{BigEndian, ByteOrder};
use nearpoint_core::{Point3f, Result, TriangleMesh};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct VtkReader;
pub struct VtkWriter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Ascii,
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DataType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Float,
    Double,
    Int32,
    UInt32,
    Int64,
    UInt64,
}

impl DataType {
    fn parse(name: &str) -> std::result::Result<Self, IoError> {
        match name.to_ascii_lowercase().as_str() {
            "char" | "signed_char" | "vtktypeint8" => Ok(DataType::Int8),
            "unsigned_char" | "vtktypeuint8" => Ok(DataType::UInt8),
            "short" | "vtktypeint16" => Ok(DataType::Int16),
            "unsigned_short" | "vtktypeuint16" => Ok(DataType::UInt16),
            "float" | "vtktypefloat32" => Ok(DataType::Float),
            "double" | "vtktypefloat64" => Ok(DataType::Double),
            "int" | "vtktypeint32" => Ok(DataType::Int32),
            "unsigned_int" | "vtktypeuint32" => Ok(DataType::UInt32),
            "long" | "vtkidtype" | "vtktypeint64" => Ok(DataType::Int64),
            "unsigned_long" | "vtktypeuint64" => Ok(DataType::UInt64),
            other => Err(IoError::parse(format!("unsupported VTK data type '{}'", other))),
        }
    }

    fn size(self) -> usize {
        match self {
            DataType::Int8 | DataType::UInt8 => 1,
            DataType::Int16 | DataType::UInt16 => 2,
            DataType::Float | DataType::Int32 | DataType::UInt32 => 4,
            DataType::Double | DataType::Int64 | DataType::UInt64 => 8,
        }
    }
}

/// Byte cursor over a whole VTK file
struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    encoding: Encoding,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            encoding: Encoding::Ascii,
        }
    }

    fn read_line(&mut self) -> Option<&'a str> {
        if self.pos >= self.data.len() {
            return None;
        }
        let rest = &self.data[self.pos..];
        let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
        self.pos += (end + 1).min(rest.len());
        std::str::from_utf8(&rest[..end]).ok().map(|s| s.trim_end_matches('\r'))
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.data.len() && self.data[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Option<&'a str> {
        self.skip_whitespace();
        let start = self.pos;
        while self.pos < self.data.len() && !self.data[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if start == self.pos {
            None
        } else {
            std::str::from_utf8(&self.data[start..self.pos]).ok()
        }
    }

    fn peek_token(&mut self) -> Option<&'a str> {
        let saved = self.pos;
        let token = self.next_token();
        self.pos = saved;
        token
    }

    fn expect_token(&mut self, what: &str) -> std::result::Result<&'a str, IoError> {
        self.next_token()
            .ok_or_else(|| IoError::parse(format!("unexpected end of file, expected {}", what)))
    }

    fn expect_count(&mut self, what: &str) -> std::result::Result<usize, IoError> {
        let token = self.expect_token(what)?;
        token
            .parse::<usize>()
            .map_err(|_| IoError::parse(format!("invalid {} '{}'", what, token)))
    }

    /// Move past the end of the current keyword line, where binary payloads start
    fn finish_line(&mut self) {
        while self.pos < self.data.len() && self.data[self.pos] != b'\n' {
            self.pos += 1;
        }
        if self.pos < self.data.len() {
            self.pos += 1;
        }
    }

    fn take_values(&mut self, count: usize, dtype: DataType) -> std::result::Result<&'a [u8], IoError> {
        let end = count
            .checked_mul(dtype.size())
            .and_then(|len| self.pos.checked_add(len))
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| IoError::parse("binary payload is truncated"))?;
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_reals(&mut self, count: usize, dtype: DataType) -> std::result::Result<Vec<f64>, IoError> {
        match self.encoding {
            Encoding::Ascii => (0..count)
                .map(|_| {
                    let token = self.expect_token("coordinate")?;
                    token
                        .parse::<f64>()
                        .map_err(|_| IoError::parse(format!("invalid coordinate '{}'", token)))
                })
                .collect(),
            Encoding::Binary => {
                self.finish_line();
                let bytes = self.take_values(count, dtype)?;
                Ok(bytes
                    .chunks_exact(dtype.size())
                    .map(|chunk| match dtype {
                        DataType::Int8 => chunk[0] as i8 as f64,
                        DataType::UInt8 => chunk[0] as f64,
                        DataType::Int16 => BigEndian::read_i16(chunk) as f64,
                        DataType::UInt16 => BigEndian::read_u16(chunk) as f64,
                        DataType::Float => BigEndian::read_f32(chunk) as f64,
                        DataType::Double => BigEndian::read_f64(chunk),
                        DataType::Int32 => BigEndian::read_i32(chunk) as f64,
                        DataType::UInt32 => BigEndian::read_u32(chunk) as f64,
                        DataType::Int64 => BigEndian::read_i64(chunk) as f64,
                        DataType::UInt64 => BigEndian::read_u64(chunk) as f64,
                    })
                    .collect())
            }
        }
    }

    fn read_indices(&mut self, count: usize, dtype: DataType) -> std::result::Result<Vec<usize>, IoError> {
        let raw: Vec<i64> = match self.encoding {
            Encoding::Ascii => (0..count)
                .map(|_| {
                    let token = self.expect_token("index")?;
                    token
                        .parse::<i64>()
                        .map_err(|_| IoError::parse(format!("invalid index '{}'", token)))
                })
                .collect::<std::result::Result<_, _>>()?,
            Encoding::Binary => {
                self.finish_line();
                let bytes = self.take_values(count, dtype)?;
                bytes
                    .chunks_exact(dtype.size())
                    .map(|chunk| match dtype {
                        DataType::Int8 => Ok(chunk[0] as i8 as i64),
                        DataType::UInt8 => Ok(chunk[0] as i64),
                        DataType::Int16 => Ok(BigEndian::read_i16(chunk) as i64),
                        DataType::UInt16 => Ok(BigEndian::read_u16(chunk) as i64),
                        DataType::Int32 => Ok(BigEndian::read_i32(chunk) as i64),
                        DataType::UInt32 => Ok(BigEndian::read_u32(chunk) as i64),
                        DataType::Int64 => Ok(BigEndian::read_i64(chunk)),
                        DataType::UInt64 => i64::try_from(BigEndian::read_u64(chunk))
                            .map_err(|_| IoError::parse("index out of range")),
                        DataType::Float | DataType::Double => {
                            Err(IoError::parse("cell indices must be integers"))
                        }
                    })
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        raw.into_iter()
            .map(|i| usize::try_from(i).map_err(|_| IoError::parse(format!("negative index {}", i))))
            .collect()
    }

    /// Step over `count` values without decoding them
    fn skip_values(&mut self, count: usize, bytes_per_value: Option<usize>) -> std::result::Result<(), IoError> {
        match self.encoding {
            Encoding::Ascii => {
                for _ in 0..count {
                    self.expect_token("array value")?;
                }
            }
            Encoding::Binary => {
                self.finish_line();
                // `None` means bit arrays, packed eight values per byte
                let len = match bytes_per_value {
                    Some(size) => count.checked_mul(size),
                    None => Some(count.div_ceil(8)),
                };
                let _ = self.take_values(len.ok_or_else(|| IoError::parse("array is too large"))?, DataType::UInt8)?;
            }
        }
        Ok(())
    }

    /// Step over a `METADATA` block, which runs up to the next blank line
    fn skip_metadata(&mut self) {
        self.finish_line();
        while let Some(line) = self.read_line() {
            if line.trim().is_empty() {
                break;
            }
        }
    }
}

/// Step over a `FIELD name n` block: `n` arrays, each a
/// `name components tuples type` line followed by its values
fn skip_field(cursor: &mut Cursor<'_>) -> std::result::Result<(), IoError> {
    let _name = cursor.expect_token("field name")?;
    let arrays = cursor.expect_count("field array count")?;
    for _ in 0..arrays {
        let name = cursor.expect_token("field array name")?;
        if name == "NULL_ARRAY" {
            continue;
        }
        let components = cursor.expect_count("component count")?;
        let tuples = cursor.expect_count("tuple count")?;
        let type_name = cursor.expect_token("array type")?;
        let count = components
            .checked_mul(tuples)
            .ok_or_else(|| IoError::parse(format!("field array '{}' is too large", name)))?;

        let bytes_per_value = if type_name.eq_ignore_ascii_case("bit") {
            None
        } else {
            Some(DataType::parse(type_name)?.size())
        };
        cursor.skip_values(count, bytes_per_value)?;

        if cursor.peek_token() == Some("METADATA") {
            let _ = cursor.next_token();
            cursor.skip_metadata();
        }
    }
    Ok(())
}

/// Polygons of one cell section, as vertex index lists
fn read_cells(cursor: &mut Cursor<'_>) -> std::result::Result<Vec<Vec<usize>>, IoError> {
    let count = cursor.expect_count("cell count")?;
    let size = cursor.expect_count("cell list size")?;

    if cursor.peek_token() == Some("OFFSETS") {
        // Version 5 layout: `count` is the number of offsets (cells + 1),
        // `size` the length of the connectivity array.
        let _ = cursor.next_token();
        let dtype = DataType::parse(cursor.expect_token("offsets type")?)?;
        let offsets = cursor.read_indices(count, dtype)?;

        if cursor.next_token() != Some("CONNECTIVITY") {
            return Err(IoError::parse("OFFSETS must be followed by CONNECTIVITY"));
        }
        let dtype = DataType::parse(cursor.expect_token("connectivity type")?)?;
        let connectivity = cursor.read_indices(size, dtype)?;

        offsets
            .windows(2)
            .map(|w| {
                connectivity
                    .get(w[0]..w[1])
                    .map(|cell| cell.to_vec())
                    .ok_or_else(|| IoError::parse("cell offsets exceed connectivity array"))
            })
            .collect()
    } else {
        let flat = cursor.read_indices(size, DataType::Int32)?;
        let mut cells = Vec::with_capacity(count);
        let mut rest = flat.as_slice();
        for _ in 0..count {
            let (&n, tail) = rest
                .split_first()
                .ok_or_else(|| IoError::parse("cell list is shorter than declared"))?;
            if tail.len() < n {
                return Err(IoError::parse("cell list is shorter than declared"));
            }
            cells.push(tail[..n].to_vec());
            rest = &tail[n..];
        }
        Ok(cells)
    }
}

/// Decode a legacy VTK file held in memory
pub fn parse_vtk(data: &[u8]) -> std::result::Result<TriangleMesh, IoError> {
    let mut cursor = Cursor::new(data);

    let magic = cursor.read_line().unwrap_or_default();
    if !magic.trim_start().starts_with("# vtk DataFile") {
        return Err(IoError::InvalidFormat {
            format: "missing '# vtk DataFile Version' header".to_string(),
        });
    }
    let _title = cursor.read_line();
    cursor.encoding = match cursor.read_line().map(|l| l.trim().to_ascii_uppercase()) {
        Some(ref e) if e == "ASCII" => Encoding::Ascii,
        Some(ref e) if e == "BINARY" => Encoding::Binary,
        other => {
            return Err(IoError::parse(format!(
                "expected ASCII or BINARY, found {:?}",
                other.unwrap_or_default()
            )))
        }
    };

    if cursor.next_token() != Some("DATASET") {
        return Err(IoError::parse("expected DATASET keyword"));
    }
    let dataset = cursor.expect_token("dataset type")?;
    let polydata = match dataset {
        "POLYDATA" => true,
        "UNSTRUCTURED_GRID" => false,
        other => {
            return Err(IoError::InvalidFormat {
                format: format!("VTK dataset {} has no surface vertices", other),
            })
        }
    };

    let mut vertices: Option<Vec<Point3f>> = None;
    let mut faces = Vec::new();

    while let Some(keyword) = cursor.next_token() {
        match keyword {
            "POINTS" => {
                let n = cursor.expect_count("point count")?;
                let dtype = DataType::parse(cursor.expect_token("point type")?)?;
                let n = n
                    .checked_mul(3)
                    .ok_or_else(|| IoError::parse("point count is too large"))?;
                let coords = cursor.read_reals(n, dtype)?;
                vertices = Some(
                    coords
                        .chunks_exact(3)
                        .map(|c| Point3f::new(c[0] as f32, c[1] as f32, c[2] as f32))
                        .collect(),
                );
            }
            "POLYGONS" if polydata => {
                for cell in read_cells(&mut cursor)? {
                    for k in 1..cell.len().saturating_sub(1) {
                        faces.push([cell[0], cell[k], cell[k + 1]]);
                    }
                }
            }
            "VERTICES" | "LINES" | "TRIANGLE_STRIPS" | "CELLS" => {
                let _ = read_cells(&mut cursor)?;
            }
            "CELL_TYPES" => {
                let n = cursor.expect_count("cell type count")?;
                let _ = cursor.read_indices(n, DataType::Int32)?;
            }
            "FIELD" => skip_field(&mut cursor)?,
            "METADATA" => cursor.skip_metadata(),
            "POINT_DATA" | "CELL_DATA" => break,
            other => {
                return Err(IoError::parse(format!("unexpected keyword '{}'", other)));
            }
        }
    }

    let vertices = vertices.ok_or_else(|| IoError::parse("file has no POINTS section"))?;
    let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
    mesh.validate_faces()
        .map_err(|e| IoError::parse(e.to_string()))?;
    Ok(mesh)
}

impl MeshReader for VtkReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let data = std::fs::read(path.as_ref())?;
        Ok(parse_vtk(&data)?)
    }
}

impl MeshWriter for VtkWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "# vtk DataFile Version 3.0")?;
        writeln!(writer, "nearpoint mesh")?;
        writeln!(writer, "ASCII")?;
        writeln!(writer, "DATASET POLYDATA")?;
        writeln!(writer, "POINTS {} float", mesh.vertices.len())?;
        for v in &mesh.vertices {
            writeln!(writer, "{} {} {}", v.x, v.y, v.z)?;
        }
        if !mesh.faces.is_empty() {
            writeln!(writer, "POLYGONS {} {}", mesh.faces.len(), mesh.faces.len() * 4)?;
            for f in &mesh.faces {
                writeln!(writer, "3 {} {} {}", f[0], f[1], f[2])?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}
