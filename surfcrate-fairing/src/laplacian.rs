//! Discrete Laplace operators on triangle meshes
//!
//! Both operators are stored as a sparse Laplacian `L` plus the diagonal of the
//! inverse mass matrix `M`. `L` is symmetric and each diagonal entry is the
//! negated sum of the off-diagonal entries in its row.

use nalgebra_sparse::{CooMatrix, CsrMatrix};
use std::collections::BTreeSet;
use surfcrate_core::{validate_faces, Error, Point3f, Result, Vector3f};

/// Cotangent of the angle at `apex` in the triangle (`p0`, `p1`, `apex`)
pub fn cotangent(p0: &Point3f, p1: &Point3f, apex: &Point3f) -> f32 {
    let l0 = p0 - apex;
    let l1 = p1 - apex;
    l0.dot(&l1) / l0.cross(&l1).norm()
}

/// Area of the triangle (`p0`, `p1`, `p2`)
pub fn triangle_area(p0: &Point3f, p1: &Point3f, p2: &Point3f) -> f32 {
    0.5 * (p1 - p0).cross(&(p2 - p0)).norm()
}

/// A Laplacian with its lumped inverse mass
#[derive(Debug, Clone)]
pub struct MeshOperator {
    laplacian: CsrMatrix<f32>,
    inverse_mass: Vec<f32>,
}

impl MeshOperator {
    /// Graph Laplacian with unit weights
    ///
    /// Every face declares its three vertex pairs adjacent; a pair shared by
    /// several faces still has weight 1. The mass of a vertex is its degree.
    /// Fails for a vertex that no face touches.
    pub fn uniform(vertex_count: usize, faces: &[[usize; 3]]) -> Result<Self> {
        validate_faces(vertex_count, faces)?;

        let mut pairs = BTreeSet::new();
        for &[a, b, c] in faces {
            for (i, j) in [(a, b), (b, c), (c, a)] {
                if i != j {
                    pairs.insert((i, j));
                    pairs.insert((j, i));
                }
            }
        }

        let mut degree = vec![0usize; vertex_count];
        let mut coo = CooMatrix::new(vertex_count, vertex_count);
        for &(i, j) in &pairs {
            coo.push(i, j, 1.0);
            degree[i] += 1;
        }

        let mut inverse_mass = Vec::with_capacity(vertex_count);
        for (i, &d) in degree.iter().enumerate() {
            if d == 0 {
                return Err(Error::DegenerateGeometry(format!("vertex {} has no neighbors", i)));
            }
            coo.push(i, i, -(d as f32));
            inverse_mass.push(1.0 / d as f32);
        }

        Ok(Self {
            laplacian: CsrMatrix::from(&coo),
            inverse_mass,
        })
    }

    /// Cotangent Laplacian at the given vertex positions
    ///
    /// The edge opposite each corner gets half the cotangent of that corner's
    /// angle, summed over the faces sharing the edge. The mass of a vertex is a
    /// third of the area of its incident faces. Fails on a zero-area face or a
    /// vertex that no face touches.
    pub fn cotangent(positions: &[Point3f], faces: &[[usize; 3]]) -> Result<Self> {
        let n = positions.len();
        validate_faces(n, faces)?;

        let mut mass = vec![0.0f32; n];
        let mut row_sum = vec![0.0f32; n];
        let mut coo = CooMatrix::new(n, n);

        for (f, &[i0, i1, i2]) in faces.iter().enumerate() {
            let (p0, p1, p2) = (&positions[i0], &positions[i1], &positions[i2]);
            let area = triangle_area(p0, p1, p2);
            if !(area > 0.0 && area.is_finite()) {
                return Err(Error::DegenerateGeometry(format!("face {} has zero area", f)));
            }

            for i in [i0, i1, i2] {
                mass[i] += area / 3.0;
            }

            // (edge end, edge end, weight from the opposite corner)
            let weighted = [
                (i1, i2, 0.5 * cotangent(p1, p2, p0)),
                (i0, i2, 0.5 * cotangent(p0, p2, p1)),
                (i0, i1, 0.5 * cotangent(p0, p1, p2)),
            ];
            for (i, j, w) in weighted {
                coo.push(i, j, w);
                coo.push(j, i, w);
                row_sum[i] += w;
                row_sum[j] += w;
            }
        }

        let mut inverse_mass = Vec::with_capacity(n);
        for (i, (&m, &s)) in mass.iter().zip(&row_sum).enumerate() {
            if m == 0.0 {
                return Err(Error::DegenerateGeometry(format!("vertex {} has zero mass", i)));
            }
            coo.push(i, i, -s);
            inverse_mass.push(1.0 / m);
        }

        Ok(Self {
            laplacian: CsrMatrix::from(&coo),
            inverse_mass,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.inverse_mass.len()
    }

    pub fn laplacian(&self) -> &CsrMatrix<f32> {
        &self.laplacian
    }

    /// Diagonal of `M`
    pub fn inverse_mass(&self) -> &[f32] {
        &self.inverse_mass
    }

    /// `M · L · P` with one row of `P` per position
    pub fn apply(&self, positions: &[Point3f]) -> Vec<Vector3f> {
        self.laplacian
            .row_iter()
            .zip(&self.inverse_mass)
            .map(|(row, &inv_mass)| {
                let mut sum = Vector3f::zeros();
                for (&col, &val) in row.col_indices().iter().zip(row.values()) {
                    sum += positions[col].coords * val;
                }
                sum * inv_mass
            })
            .collect()
    }
}
