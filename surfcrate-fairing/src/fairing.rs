//! Iterative Laplacian fairing
//!
//! Each step moves every vertex by `h · M · L · P`, pulling it toward a
//! weighted average of its neighbors. Connectivity never changes.

use crate::laplacian::MeshOperator;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use surfcrate_core::{validate_faces, Error, Point3f, Result, TriangleMesh, Vector3f};
use tracing::{debug, info, instrument};

/// Which discrete Laplacian drives the flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LaplacianKind {
    /// Unit edge weights, built once from connectivity
    #[default]
    Uniform,
    /// Cotangent weights with lumped area mass, rebuilt every step
    Cotangent,
}

/// How one step is integrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IntegrationScheme {
    /// `P ← P + h · M · L · P`
    #[default]
    Explicit,
    /// Predict `P' = P + h · M · L · P`, then `P ← P + h · M' · L' · P'` with
    /// the operator rebuilt at `P'`
    SemiImplicit,
}

/// Parameters for [`fair`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FairingConfig {
    pub operator: LaplacianKind,
    pub scheme: IntegrationScheme,
    pub iterations: usize,
    /// Time step `h`
    pub step_size: f32,
}

impl Default for FairingConfig {
    fn default() -> Self {
        Self {
            operator: LaplacianKind::Uniform,
            scheme: IntegrationScheme::Explicit,
            iterations: 0,
            step_size: 0.005,
        }
    }
}

impl FairingConfig {
    pub fn with_operator(mut self, operator: LaplacianKind) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_scheme(mut self, scheme: IntegrationScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_step_size(mut self, step_size: f32) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.step_size.is_finite() {
            return Err(Error::InvalidData(format!(
                "step size must be finite, got {}",
                self.step_size
            )));
        }
        Ok(())
    }
}

/// Smooth `positions` over the triangles in `faces`
///
/// Returns the new positions in the same order. A zero step size returns the
/// input unchanged.
#[instrument(skip_all, fields(vertices = positions.len(), faces = faces.len()))]
pub fn fair(positions: &[Point3f], faces: &[[usize; 3]], config: &FairingConfig) -> Result<Vec<Point3f>> {
    config.validate()?;
    validate_faces(positions.len(), faces)?;

    let mut current = positions.to_vec();
    if config.iterations == 0 {
        return Ok(current);
    }

    let fixed = match config.operator {
        LaplacianKind::Uniform => Some(MeshOperator::uniform(positions.len(), faces)?),
        LaplacianKind::Cotangent => None,
    };

    let h = config.step_size;
    for iteration in 0..config.iterations {
        let op = operator_at(fixed.as_ref(), &current, faces)?;
        let mut next = step(&current, &op.apply(&current), h);

        if config.scheme == IntegrationScheme::SemiImplicit {
            let op = operator_at(fixed.as_ref(), &next, faces)?;
            next = step(&current, &op.apply(&next), h);
        }

        debug!(iteration, max_displacement = max_displacement(&current, &next), "Fairing step");
        current = next;
    }

    info!(
        vertices = positions.len(),
        faces = faces.len(),
        iterations = config.iterations,
        operator = ?config.operator,
        scheme = ?config.scheme,
        "Fairing complete"
    );

    Ok(current)
}

/// Fair a mesh, keeping its faces and dropping stale normals
pub fn fair_mesh(mesh: &TriangleMesh, config: &FairingConfig) -> Result<TriangleMesh> {
    let vertices = fair(&mesh.vertices, &mesh.faces, config)?;
    mesh.clone().with_vertices(vertices)
}

/// The fixed operator if there is one, else cotangent weights at `positions`
fn operator_at<'a>(
    fixed: Option<&'a MeshOperator>,
    positions: &[Point3f],
    faces: &[[usize; 3]],
) -> Result<Cow<'a, MeshOperator>> {
    match fixed {
        Some(op) => Ok(Cow::Borrowed(op)),
        None => MeshOperator::cotangent(positions, faces).map(Cow::Owned),
    }
}

fn step(positions: &[Point3f], delta: &[Vector3f], h: f32) -> Vec<Point3f> {
    positions.iter().zip(delta).map(|(p, d)| p + d * h).collect()
}

fn max_displacement(before: &[Point3f], after: &[Point3f]) -> f32 {
    before
        .iter()
        .zip(after)
        .map(|(a, b)| nalgebra::distance(a, b))
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Vec<Point3f>, Vec<[usize; 3]>) {
        (
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_config_default() {
        let config = FairingConfig::default();
        assert_eq!(config.operator, LaplacianKind::Uniform);
        assert_eq!(config.scheme, IntegrationScheme::Explicit);
        assert_eq!(config.iterations, 0);
        assert_eq!(config.step_size, 0.005);
        assert!(config.validate().is_ok());
        assert!(config.with_step_size(f32::NAN).validate().is_err());
    }

    #[test]
    fn test_zero_iterations_is_identity() {
        let (positions, faces) = triangle();
        let out = fair(&positions, &faces, &FairingConfig::default()).unwrap();
        assert_eq!(out, positions);
    }

    #[test]
    fn test_uniform_step_shrinks_triangle() {
        let (positions, faces) = triangle();
        let config = FairingConfig::default().with_iterations(1).with_step_size(0.5);
        let out = fair(&positions, &faces, &config).unwrap();

        // Each vertex moves halfway to the mean of the other two
        let expected = Point3f::new(0.25, 0.25, 0.0);
        assert!((out[0] - expected).norm() < 1e-6);
    }

    #[test]
    fn test_bad_face_index() {
        let (positions, _) = triangle();
        assert!(matches!(
            fair(&positions, &[[0, 1, 3]], &FairingConfig::default()),
            Err(Error::InvalidData(_))
        ));
    }
}
