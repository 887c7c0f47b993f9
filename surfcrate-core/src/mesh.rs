//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle mesh with shared vertices and index triples
#[derive(Debug, Clone, Serialize, Deserialize)]
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

    /// Check that every face index refers to an existing vertex
    pub fn validate(&self) -> Result<()> {
        validate_faces(self.vertices.len(), &self.faces)
    }

    /// Replace vertex positions, keeping connectivity
    ///
    /// Stale vertex normals are dropped.
    pub fn with_vertices(mut self, vertices: Vec<Point3f>) -> Result<Self> {
        if vertices.len() != self.vertices.len() {
            return Err(Error::InvalidData(format!(
                "expected {} vertices, got {}",
                self.vertices.len(),
                vertices.len()
            )));
        }
        self.vertices = vertices;
        self.normals = None;
        Ok(self)
    }

    /// Set vertex normals, one per vertex
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) -> Result<()> {
        if normals.len() != self.vertices.len() {
            return Err(Error::InvalidData(format!(
                "expected {} normals, got {}",
                self.vertices.len(),
                normals.len()
            )));
        }
        self.normals = Some(normals);
        Ok(())
    }
}

/// Check that every index in `faces` is below `vertex_count`
pub fn validate_faces(vertex_count: usize, faces: &[[usize; 3]]) -> Result<()> {
    for (f, face) in faces.iter().enumerate() {
        if let Some(&bad) = face.iter().find(|&&i| i >= vertex_count) {
            return Err(Error::InvalidData(format!(
                "face {} references vertex {} but there are {} vertices",
                f, bad, vertex_count
            )));
        }
    }
    Ok(())
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// A flat triangle list without shared vertices
///
/// Triangle `i` is made of positions `3i`, `3i + 1` and `3i + 2`. Normals are
/// stored per corner and are always the same length as `positions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriangleSoup {
    pub positions: Vec<Point3f>,
    pub normals: Vec<Vector3f>,
}

impl TriangleSoup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangles * 3),
            normals: Vec::with_capacity(triangles * 3),
        }
    }

    /// Append one triangle with its corner normals
    pub fn push_triangle(&mut self, corners: [Point3f; 3], normals: [Vector3f; 3]) {
        self.positions.extend_from_slice(&corners);
        self.normals.extend_from_slice(&normals);
    }

    /// Append every triangle of another soup
    pub fn append(&mut self, other: &mut TriangleSoup) {
        self.positions.append(&mut other.positions);
        self.normals.append(&mut other.normals);
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Corners of triangle `i`
    pub fn triangle(&self, i: usize) -> Option<[Point3f; 3]> {
        let base = i.checked_mul(3)?;
        let corners = self.positions.get(base..base + 3)?;
        Some([corners[0], corners[1], corners[2]])
    }

    /// Index the soup without merging coincident corners
    pub fn to_mesh(&self) -> TriangleMesh {
        let faces = (0..self.triangle_count())
            .map(|t| [3 * t, 3 * t + 1, 3 * t + 2])
            .collect();
        let mut mesh = TriangleMesh::from_vertices_and_faces(self.positions.clone(), faces);
        if !self.normals.is_empty() && self.normals.len() == self.positions.len() {
            mesh.normals = Some(self.normals.clone());
        }
        mesh
    }
}
