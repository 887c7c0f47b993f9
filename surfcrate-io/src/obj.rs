//! OBJ mesh support
//!
//! Reading goes through [`ObjData::load_buf`]. Any face index form is accepted
//! (`f 1 2 3`, `f 1/1 2/2 3/3`, `f 1//1 ...`, `f 1/1/1 ...`) and polygons are
//! fan-triangulated. Writing produces plain text with 1-based indices.

use crate::error::{open, IoError, IoResult};
use ::obj::{LoadConfig, ObjData, ObjError, SimplePolygon};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use surfcrate_core::{Point3f, TriangleMesh, TriangleSoup};
use tracing::{debug, info};

impl From<ObjError> for IoError {
    fn from(err: ObjError) -> Self {
        let line = match &err {
            ObjError::Io(_) => None,
            ObjError::MalformedFaceGroup { line_number, .. }
            | ObjError::ArgumentListFailure { line_number, .. }
            | ObjError::UnexpectedCommand { line_number, .. }
            | ObjError::MissingMTLName { line_number }
            | ObjError::ZeroVertexNumber { line_number } => Some(*line_number + 1),
            #[allow(unreachable_patterns)]
            _ => None,
        };
        match err {
            ObjError::Io(e) => IoError::Io(e),
            other => IoError::ParseError {
                line: line.unwrap_or(0),
                message: other.to_string(),
            },
        }
    }
}

/// Fan triangles `[p0, pi, pi+1]` over the position indices of one polygon
fn fan_triangles(polygon: &SimplePolygon) -> Vec<[usize; 3]> {
    let corners: Vec<usize> = polygon.0.iter().map(|tuple| tuple.0).collect();
    match corners.split_first() {
        Some((&first, rest)) => rest.windows(2).map(|pair| [first, pair[0], pair[1]]).collect(),
        None => Vec::new(),
    }
}

/// Parse an OBJ mesh, keeping positions and faces only
///
/// Unknown commands are skipped. Texture coordinates, normals, groups and
/// materials are read but dropped.
pub fn parse_obj<R: BufRead>(reader: R) -> IoResult<TriangleMesh> {
    let data = ObjData::load_buf_with_config(reader, LoadConfig { strict: false })?;

    let vertices: Vec<Point3f> = data.position.iter().map(|&[x, y, z]| Point3f::new(x, y, z)).collect();

    let mut faces = Vec::new();
    let polygons = data
        .objects
        .iter()
        .flat_map(|object| &object.groups)
        .flat_map(|group| &group.polys);
    for (f, polygon) in polygons.enumerate() {
        if polygon.0.len() < 3 {
            return Err(IoError::InvalidFormat {
                format: format!("face {} has {} corners", f, polygon.0.len()),
            });
        }
        faces.extend(fan_triangles(polygon));
    }

    let mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
    mesh.validate().map_err(|e| IoError::InvalidFormat {
        format: e.to_string(),
    })?;

    debug!(vertices = mesh.vertex_count(), faces = mesh.face_count(), "Parsed OBJ mesh");
    Ok(mesh)
}

/// Read an OBJ mesh from a file
pub fn read_obj<P: AsRef<Path>>(path: P) -> IoResult<TriangleMesh> {
    let file = open(path.as_ref())?;
    parse_obj(BufReader::new(file))
}

/// Write an indexed mesh, with `vn` records when the mesh has normals
pub fn write_obj_mesh<W: Write>(mesh: &TriangleMesh, mut writer: W) -> IoResult<()> {
    writeln!(writer, "# vertices: {}", mesh.vertex_count())?;
    writeln!(writer, "# faces: {}", mesh.face_count())?;

    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }

    match &mesh.normals {
        Some(normals) => {
            for n in normals {
                writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
            }
            for &[a, b, c] in &mesh.faces {
                writeln!(writer, "f {0}//{0} {1}//{1} {2}//{2}", a + 1, b + 1, c + 1)?;
            }
        }
        None => {
            for &[a, b, c] in &mesh.faces {
                writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write a triangle soup, three fresh vertices per triangle
///
/// A soup without normals is written without `vn` records.
pub fn write_obj_soup<W: Write>(soup: &TriangleSoup, mut writer: W) -> IoResult<()> {
    let with_normals = !soup.normals.is_empty();
    if with_normals && soup.normals.len() != soup.positions.len() {
        return Err(IoError::InvalidFormat {
            format: format!(
                "soup has {} positions but {} normals",
                soup.positions.len(),
                soup.normals.len()
            ),
        });
    }

    writeln!(writer, "# triangles: {}", soup.triangle_count())?;
    for p in &soup.positions {
        writeln!(writer, "v {} {} {}", p.x, p.y, p.z)?;
    }
    if with_normals {
        for n in &soup.normals {
            writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
        }
    }

    for t in 0..soup.triangle_count() {
        let (a, b, c) = (3 * t + 1, 3 * t + 2, 3 * t + 3);
        if with_normals {
            writeln!(writer, "f {0}//{0} {1}//{1} {2}//{2}", a, b, c)?;
        } else {
            writeln!(writer, "f {} {} {}", a, b, c)?;
        }
    }

    writer.flush()?;
    Ok(())
}

pub fn save_obj_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> IoResult<()> {
    let path = path.as_ref();
    info!(path = %path.display(), faces = mesh.face_count(), "Saving OBJ mesh");
    let file = std::fs::File::create(path)?;
    write_obj_mesh(mesh, BufWriter::new(file))
}

pub fn save_obj_soup<P: AsRef<Path>>(soup: &TriangleSoup, path: P) -> IoResult<()> {
    let path = path.as_ref();
    info!(path = %path.display(), triangles = soup.triangle_count(), "Saving OBJ soup");
    let file = std::fs::File::create(path)?;
    write_obj_soup(soup, BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use surfcrate_core::Vector3f;

    #[test]
    fn test_parse_index_forms() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvt 0 0\nvn 0 0 1\n\
                    f 1 2 3\nf 1/1 3/1 4/1\nf 1//1 2//1 4//1\nf 2/1/1 3/1/1 4/1/1\n";
        let mesh = parse_obj(text.as_bytes()).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3], [0, 1, 3], [1, 2, 3]]);
    }

    #[test]
    fn test_quad_is_fan_triangulated() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nv -1 0.5 0\nf 1 2 3 4 5\n";
        let mesh = parse_obj(text.as_bytes()).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3], [0, 3, 4]]);
    }

    #[test]
    fn test_faces_across_objects_and_groups() {
        let text = "# two objects\nv 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
                    o first\ng top\nf 1 2 3\no second\ng bottom\nusemtl steel\nf 1 3 4\n";
        let mesh = parse_obj(text.as_bytes()).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
    }

    #[test]
    fn test_malformed_line_reports_its_number() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 x 0\n";
        match parse_obj(text.as_bytes()) {
            Err(IoError::ParseError { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_face_is_rejected() {
        let text = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(matches!(parse_obj(text.as_bytes()), Err(IoError::InvalidFormat { .. })));
    }

    #[test]
    fn test_out_of_range_face() {
        let text = "v 0 0 0\nv 1 0 0\nv 1 1 0\nf 1 2 4\n";
        assert!(matches!(parse_obj(text.as_bytes()), Err(IoError::InvalidFormat { .. })));
    }

    #[test]
    fn test_write_soup_text() {
        let mut soup = TriangleSoup::new();
        soup.push_triangle(
            [
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            [Vector3f::z(); 3],
        );

        let mut out = Vec::new();
        write_obj_soup(&soup, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 3);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 3);
        assert!(text.contains("f 1//1 2//2 3//3"));
    }

    #[test]
    fn test_write_mesh_without_normals() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        );

        let mut out = Vec::new();
        write_obj_mesh(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("f 1 2 3"));
        assert!(!text.contains("vn"));
    }
}
