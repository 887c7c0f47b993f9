//! Regular lattice over the padded input bounds and the field sampled on it

use crate::field::ScalarField;
use crate::parallel;
use serde::{Deserialize, Serialize};
use surfcrate_algorithms::KdTree;
use surfcrate_core::{Aabb, Error, NearestNeighborSearch, Point3f, Result, Vector3f};
use tracing::debug;

/// Corner offsets of a cell as `(dx, dy, dz)`, in marching cubes corner order
pub const CELL_CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 0, 1],
    [0, 0, 1],
    [0, 1, 0],
    [1, 1, 0],
    [1, 1, 1],
    [0, 1, 1],
];

/// Corner pairs joined by each of the 12 cell edges
pub const CELL_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// `(Nx+1) x (Ny+1) x (Nz+1)` nodes spanning a box
///
/// Nodes are stored with x slowest and z fastest, so node `(i, j, k)` lives at
/// `(i * (Ny+1) + j) * (Nz+1) + k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    bounds: Aabb,
    resolution: [usize; 3],
}

impl Lattice {
    /// `resolution` is the number of cells along each axis
    pub fn new(bounds: Aabb, resolution: [usize; 3]) -> Result<Self> {
        if resolution.iter().any(|&n| n == 0) {
            return Err(Error::InvalidData(format!(
                "lattice resolution must be at least 1 per axis, got {:?}",
                resolution
            )));
        }
        Ok(Self { bounds, resolution })
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn resolution(&self) -> [usize; 3] {
        self.resolution
    }

    /// Nodes along each axis
    pub fn dims(&self) -> [usize; 3] {
        [self.resolution[0] + 1, self.resolution[1] + 1, self.resolution[2] + 1]
    }

    pub fn node_count(&self) -> usize {
        self.dims().iter().product()
    }

    pub fn cell_count(&self) -> usize {
        self.resolution.iter().product()
    }

    pub fn spacing(&self) -> Vector3f {
        let e = self.bounds.extent();
        Vector3f::new(
            e.x / self.resolution[0] as f32,
            e.y / self.resolution[1] as f32,
            e.z / self.resolution[2] as f32,
        )
    }

    /// Width of the domain along x, falling back to the largest extent for a flat box
    pub fn width(&self) -> f32 {
        let e = self.bounds.extent();
        if e.x > 0.0 {
            e.x
        } else {
            e.max()
        }
    }

    pub fn node_index(&self, i: usize, j: usize, k: usize) -> usize {
        let [_, ny, nz] = self.dims();
        (i * ny + j) * nz + k
    }

    pub fn node_coords(&self, index: usize) -> [usize; 3] {
        let [_, ny, nz] = self.dims();
        [index / (ny * nz), (index / nz) % ny, index % nz]
    }

    pub fn node_position(&self, i: usize, j: usize, k: usize) -> Point3f {
        let min = self.bounds.min;
        let e = self.bounds.extent();
        Point3f::new(
            min.x + i as f32 * e.x / self.resolution[0] as f32,
            min.y + j as f32 * e.y / self.resolution[1] as f32,
            min.z + k as f32 * e.z / self.resolution[2] as f32,
        )
    }

    /// Every node position in storage order
    pub fn positions(&self) -> Vec<Point3f> {
        let [nx, ny, nz] = self.dims();
        let mut positions = Vec::with_capacity(self.node_count());
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    positions.push(self.node_position(i, j, k));
                }
            }
        }
        positions
    }

    /// Whether `(i, j, k)` names a cell, i.e. is not on a max face
    pub fn is_cell(&self, i: usize, j: usize, k: usize) -> bool {
        i < self.resolution[0] && j < self.resolution[1] && k < self.resolution[2]
    }

    /// Node indices of the 8 corners of cell `(i, j, k)`
    pub fn cell_corner_indices(&self, i: usize, j: usize, k: usize) -> Option<[usize; 8]> {
        if !self.is_cell(i, j, k) {
            return None;
        }
        Some(CELL_CORNERS.map(|[di, dj, dk]| self.node_index(i + di, j + dj, k + dk)))
    }

    /// Positions of the 8 corners of cell `(i, j, k)`
    pub fn cell_corners(&self, i: usize, j: usize, k: usize) -> Option<[Point3f; 8]> {
        if !self.is_cell(i, j, k) {
            return None;
        }
        Some(CELL_CORNERS.map(|[di, dj, dk]| self.node_position(i + di, j + dj, k + dk)))
    }

    /// End points of the 12 edges of cell `(i, j, k)`
    pub fn cell_edges(&self, i: usize, j: usize, k: usize) -> Option<[(Point3f, Point3f); 12]> {
        let corners = self.cell_corners(i, j, k)?;
        Some(CELL_EDGES.map(|[a, b]| (corners[a], corners[b])))
    }
}

/// Which side of the surface a lattice node falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Inside,
    Outside,
}

impl Side {
    /// Negative values are inside
    pub fn classify(value: f32) -> Self {
        if value < 0.0 {
            Side::Inside
        } else {
            Side::Outside
        }
    }

    /// Display color used for node overlays
    pub fn color(self) -> [f32; 3] {
        match self {
            Side::Inside => [0.3, 0.8, 0.8],
            Side::Outside => [1.0, 1.0, 0.8],
        }
    }
}

/// A lattice with one field value per node and a k-d tree over its nodes
#[derive(Debug, Clone)]
pub struct SampledGrid {
    lattice: Lattice,
    values: Vec<f32>,
    index: KdTree,
}

impl SampledGrid {
    /// Evaluate `field` once at every node
    pub fn sample<F>(lattice: Lattice, field: &F) -> Self
    where
        F: ScalarField + Sync,
    {
        let positions = lattice.positions();
        let values = parallel::parallel_map(&positions, |p| field.value(p));
        let index = KdTree::new(&positions);

        let grid = Self {
            lattice,
            values,
            index,
        };
        debug!(
            nodes = grid.values.len(),
            inside = grid.inside_count(),
            "Sampled field on lattice"
        );
        grid
    }

    /// Wrap precomputed node values, which must follow lattice order
    pub fn from_values(lattice: Lattice, values: Vec<f32>) -> Result<Self> {
        if values.len() != lattice.node_count() {
            return Err(Error::InvalidData(format!(
                "lattice has {} nodes, got {} values",
                lattice.node_count(),
                values.len()
            )));
        }
        let index = KdTree::new(&lattice.positions());
        Ok(Self {
            lattice,
            values,
            index,
        })
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn value(&self, i: usize, j: usize, k: usize) -> Option<f32> {
        let [nx, ny, nz] = self.lattice.dims();
        if i < nx && j < ny && k < nz {
            Some(self.values[self.lattice.node_index(i, j, k)])
        } else {
            None
        }
    }

    /// K-d tree over node positions, indices match [`Self::values`]
    pub fn index(&self) -> &KdTree {
        &self.index
    }

    /// Closest node to `p` and its field value
    pub fn nearest_node(&self, p: &Point3f) -> Option<(usize, f32)> {
        self.index.find_nearest(p).map(|(i, _)| (i, self.values[i]))
    }

    pub fn sides(&self) -> Vec<Side> {
        self.values.iter().map(|&v| Side::classify(v)).collect()
    }

    /// Per-node overlay colors, inside and outside
    pub fn colors(&self) -> Vec<[f32; 3]> {
        self.values.iter().map(|&v| Side::classify(v).color()).collect()
    }

    pub fn inside_count(&self) -> usize {
        self.values.iter().filter(|&&v| v < 0.0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_lattice(resolution: [usize; 3]) -> Lattice {
        Lattice::new(Aabb::new(Point3f::origin(), Point3f::new(1.0, 2.0, 4.0)), resolution).unwrap()
    }

    #[test]
    fn test_layout_is_x_slowest_z_fastest() {
        let lattice = unit_lattice([2, 3, 4]);
        let [_, ny, nz] = lattice.dims();

        assert_eq!(lattice.node_count(), 3 * 4 * 5);
        assert_eq!(lattice.node_index(0, 0, 1), 1);
        assert_eq!(lattice.node_index(0, 1, 0), nz);
        assert_eq!(lattice.node_index(1, 0, 0), nz * ny);
        assert_eq!(lattice.node_coords(lattice.node_index(2, 1, 3)), [2, 1, 3]);

        let positions = lattice.positions();
        assert_eq!(positions[lattice.node_index(1, 2, 3)], lattice.node_position(1, 2, 3));
        assert_relative_eq!(positions[lattice.node_count() - 1], Point3f::new(1.0, 2.0, 4.0));
    }

    #[test]
    fn test_cell_corners() {
        let lattice = unit_lattice([2, 2, 2]);
        let corners = lattice.cell_corner_indices(0, 0, 0).unwrap();
        let [_, ny, nz] = lattice.dims();

        assert_eq!(corners[0], 0);
        assert_eq!(corners[1], nz * ny);
        assert_eq!(corners[3], 1);
        assert_eq!(corners[4], nz);
        assert_eq!(corners[6], nz * ny + nz + 1);

        assert!(lattice.cell_corners(2, 0, 0).is_none());
        assert!(lattice.cell_edges(1, 1, 1).is_some());

        let edges = lattice.cell_edges(0, 0, 0).unwrap();
        let (a, b) = edges[8];
        assert_relative_eq!(b - a, Vector3f::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let bounds = Aabb::new(Point3f::origin(), Point3f::new(1.0, 1.0, 1.0));
        assert!(Lattice::new(bounds, [4, 0, 4]).is_err());
    }

    #[test]
    fn test_sampled_grid() {
        let lattice = unit_lattice([4, 4, 4]);
        let field = |p: &Point3f| p.x - 0.5;
        let grid = SampledGrid::sample(lattice, &field);

        assert_eq!(grid.values().len(), 125);
        assert_eq!(grid.value(0, 3, 3), Some(-0.5));
        assert_eq!(grid.value(5, 0, 0), None);
        assert_eq!(grid.inside_count(), 2 * 25);
        assert_eq!(grid.sides()[0], Side::Inside);
        assert_eq!(grid.colors()[124], Side::Outside.color());

        let (node, value) = grid.nearest_node(&Point3f::new(0.98, 1.9, 3.9)).unwrap();
        assert_eq!(node, 124);
        assert_relative_eq!(value, 0.5);
    }

    #[test]
    fn test_from_values_checks_length() {
        let lattice = unit_lattice([1, 1, 1]);
        assert!(SampledGrid::from_values(lattice.clone(), vec![0.0; 7]).is_err());
        assert!(SampledGrid::from_values(lattice, vec![0.0; 8]).is_ok());
    }
}
