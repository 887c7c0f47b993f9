//! Marching Cubes isosurface extraction over a [`SampledGrid`]
//!
//! The standard variant emits the table triangulation of every cell with
//! interpolated edge crossings. The feature-preserving variant additionally looks
//! at the normals emitted by each cell: a cell whose normals disagree strongly is
//! treated as lying on a sharp edge, and its vertices are moved to the
//! least-squares intersection of the tangent planes through them.

use crate::field::ScalarField;
use crate::grid::{SampledGrid, CELL_EDGES};
use crate::parallel;
use crate::tables::{EDGE_TABLE, TRIANGLE_TABLE};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use surfcrate_algorithms::pseudo_inverse;
use surfcrate_core::{Error, Point3f, Result, TriangleSoup, Vector3f};
use tracing::{debug, info, instrument};

/// Field differences below this snap an edge crossing to a corner
pub const SNAP_EPSILON: f32 = 1e-5;

/// The default finite-difference step is the domain width over this
pub const GRADIENT_STEP_DIVISOR: f32 = 5000.0;

/// Which extractor to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtractionVariant {
    #[default]
    Standard,
    /// Relocate vertices of cells that straddle a sharp edge
    FeaturePreserving,
}

/// Classification of a cell by the spread of its emitted normals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellFeature {
    #[default]
    None,
    Edge,
    Corner,
}

/// Configuration for Marching Cubes algorithm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarchingCubesConfig {
    /// Isosurface level (scalar value to extract)
    pub iso_level: f32,
    pub variant: ExtractionVariant,
    /// Finite-difference step for normals, `None` for width / 5000
    pub gradient_step: Option<f32>,
    /// Normal projection onto the edge direction above which a cell is a corner
    pub corner_threshold: f32,
}

impl Default for MarchingCubesConfig {
    fn default() -> Self {
        Self {
            iso_level: 0.0,
            variant: ExtractionVariant::Standard,
            gradient_step: None,
            corner_threshold: 0.7,
        }
    }
}

impl MarchingCubesConfig {
    pub fn with_iso_level(mut self, iso_level: f32) -> Self {
        self.iso_level = iso_level;
        self
    }

    pub fn with_variant(mut self, variant: ExtractionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_gradient_step(mut self, step: f32) -> Self {
        self.gradient_step = Some(step);
        self
    }

    pub fn with_corner_threshold(mut self, threshold: f32) -> Self {
        self.corner_threshold = threshold;
        self
    }
}

/// Counters gathered during one extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub cells_visited: usize,
    /// Cells that emitted at least one triangle
    pub active_cells: usize,
    pub triangles: usize,
    pub edge_cells: usize,
    pub corner_cells: usize,
    /// Vertices whose field gradient vanished; their normal is the zero vector
    pub undefined_normals: usize,
}

/// Output of an extraction
#[derive(Debug, Clone, Default)]
pub struct Isosurface {
    pub soup: TriangleSoup,
    /// Classification of the originating cell, one entry per triangle
    pub features: Vec<CellFeature>,
    pub report: ExtractionReport,
}

impl Isosurface {
    pub fn triangle_count(&self) -> usize {
        self.soup.triangle_count()
    }

    pub fn is_empty(&self) -> bool {
        self.soup.is_empty()
    }
}

/// 8-bit corner code, bit `i` set when corner `i` is below `iso_level`
pub fn cube_index(values: &[f32; 8], iso_level: f32) -> u8 {
    values
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v < iso_level)
        .fold(0u8, |code, (i, _)| code | (1 << i))
}

/// Point where the field crosses `iso_level` along the edge `p1`-`p2`
///
/// Snaps to an end point when its value is within [`SNAP_EPSILON`] of the level,
/// and returns `p1` when both values are that close to each other.
pub fn vertex_interp(iso_level: f32, p1: Point3f, p2: Point3f, v1: f32, v2: f32) -> Point3f {
    if (iso_level - v1).abs() < SNAP_EPSILON {
        return p1;
    }
    if (iso_level - v2).abs() < SNAP_EPSILON {
        return p2;
    }
    if (v1 - v2).abs() < SNAP_EPSILON {
        return p1;
    }
    let mu = (iso_level - v1) / (v2 - v1);
    p1 + (p2 - p1) * mu
}

/// Table triangulation of one cell
pub fn cell_triangles(corners: &[Point3f; 8], values: &[f32; 8], iso_level: f32) -> Vec<[Point3f; 3]> {
    let code = cube_index(values, iso_level) as usize;
    let active = EDGE_TABLE[code];
    if active == 0 {
        return Vec::new();
    }

    let mut crossings = [Point3f::origin(); 12];
    for (e, &[a, b]) in CELL_EDGES.iter().enumerate() {
        if active & (1 << e) != 0 {
            crossings[e] = vertex_interp(iso_level, corners[a], corners[b], values[a], values[b]);
        }
    }

    TRIANGLE_TABLE[code]
        .chunks_exact(3)
        .take_while(|tri| tri[0] >= 0)
        .map(|tri| {
            [
                crossings[tri[0] as usize],
                crossings[tri[1] as usize],
                crossings[tri[2] as usize],
            ]
        })
        .collect()
}

/// Triangles produced by a single cell
struct CellOutput {
    soup: TriangleSoup,
    feature: CellFeature,
    undefined_normals: usize,
}

/// Marching Cubes implementation
#[derive(Debug, Clone, Default)]
pub struct MarchingCubes {
    config: MarchingCubesConfig,
}

impl MarchingCubes {
    /// Create a new Marching Cubes instance
    pub fn new(config: MarchingCubesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MarchingCubesConfig {
        &self.config
    }

    /// Extract the isosurface of `grid`, taking normals from `field`
    ///
    /// `field` should be the function the grid was sampled from. Cells are
    /// visited in lattice order and triangles come out in table order.
    #[instrument(skip_all, fields(variant = ?self.config.variant))]
    pub fn extract<F>(&self, grid: &SampledGrid, field: &F) -> Result<Isosurface>
    where
        F: ScalarField + Sync,
    {
        let lattice = grid.lattice();
        let step = self
            .config
            .gradient_step
            .unwrap_or(lattice.width() / GRADIENT_STEP_DIVISOR);
        if !(step > 0.0 && step.is_finite()) {
            return Err(Error::InvalidData(format!(
                "finite-difference step must be positive, got {}",
                step
            )));
        }

        let [nx, ny, nz] = lattice.resolution();
        let mut cells = Vec::with_capacity(lattice.cell_count());
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    cells.push([i, j, k]);
                }
            }
        }

        debug!(
            cells = cells.len(),
            variant = ?self.config.variant,
            step,
            "Running marching cubes"
        );

        let outputs = parallel::parallel_try_map(&cells, |&[i, j, k]| self.process_cell(grid, field, step, i, j, k))?;

        let mut surface = Isosurface::default();
        surface.report.cells_visited = cells.len();
        for mut out in outputs.into_iter().flatten() {
            let triangles = out.soup.triangle_count();
            surface.report.active_cells += 1;
            surface.report.undefined_normals += out.undefined_normals;
            match out.feature {
                CellFeature::Edge => surface.report.edge_cells += 1,
                CellFeature::Corner => surface.report.corner_cells += 1,
                CellFeature::None => {}
            }
            surface.features.extend(std::iter::repeat(out.feature).take(triangles));
            surface.soup.append(&mut out.soup);
        }
        surface.report.triangles = surface.soup.triangle_count();

        if surface.report.undefined_normals > 0 {
            debug!(
                vertices = surface.report.undefined_normals,
                "Field gradient vanished, normals left undefined"
            );
        }
        info!(
            triangles = surface.report.triangles,
            active_cells = surface.report.active_cells,
            edge_cells = surface.report.edge_cells,
            corner_cells = surface.report.corner_cells,
            "Isosurface extracted"
        );

        Ok(surface)
    }

    fn process_cell<F>(
        &self,
        grid: &SampledGrid,
        field: &F,
        step: f32,
        i: usize,
        j: usize,
        k: usize,
    ) -> Result<Option<CellOutput>>
    where
        F: ScalarField,
    {
        let lattice = grid.lattice();
        let (Some(indices), Some(corners)) = (lattice.cell_corner_indices(i, j, k), lattice.cell_corners(i, j, k))
        else {
            return Ok(None);
        };
        let values = indices.map(|n| grid.values()[n]);

        let triangles = cell_triangles(&corners, &values, self.config.iso_level);
        if triangles.is_empty() {
            return Ok(None);
        }

        let mut positions: Vec<Point3f> = triangles.iter().flatten().copied().collect();
        let mut undefined_normals = 0;
        let mut normals = self.normals_at(field, &positions, step, &mut undefined_normals);

        let mut feature = CellFeature::None;
        if self.config.variant == ExtractionVariant::FeaturePreserving && triangles.len() > 1 {
            feature = classify_normals(&normals, self.config.corner_threshold);
            if feature == CellFeature::Edge {
                positions = tangent_plane_fit(&positions, &normals)?;
                undefined_normals = 0;
                normals = self.normals_at(field, &positions, step, &mut undefined_normals);
            }
        }

        let mut soup = TriangleSoup::with_capacity(triangles.len());
        for (corners, corner_normals) in positions.chunks_exact(3).zip(normals.chunks_exact(3)) {
            soup.push_triangle(
                [corners[0], corners[1], corners[2]],
                [corner_normals[0], corner_normals[1], corner_normals[2]],
            );
        }

        Ok(Some(CellOutput {
            soup,
            feature,
            undefined_normals,
        }))
    }

    fn normals_at<F>(&self, field: &F, positions: &[Point3f], step: f32, undefined: &mut usize) -> Vec<Vector3f>
    where
        F: ScalarField,
    {
        positions
            .iter()
            .map(|p| {
                unit_gradient(field, p, step).unwrap_or_else(|| {
                    *undefined += 1;
                    Vector3f::zeros()
                })
            })
            .collect()
    }
}

/// Normalized field gradient, `None` where it vanishes or is not finite
pub fn unit_gradient<F>(field: &F, p: &Point3f, step: f32) -> Option<Vector3f>
where
    F: ScalarField + ?Sized,
{
    let g = field.gradient(p, step);
    let length = g.norm();
    (length > 0.0 && length.is_finite()).then(|| g / length)
}

/// Classify a cell from the normals of its emitted vertices
///
/// The pair with the smallest dot product decides: a negative dot product makes
/// the cell an edge. The cross product of that pair is taken as the edge
/// direction, and if any normal projects onto it by more than `corner_threshold`
/// the cell is a corner.
pub fn classify_normals(normals: &[Vector3f], corner_threshold: f32) -> CellFeature {
    let mut min_dot = 1.0;
    let mut extremal = None;
    for a in 0..normals.len() {
        for b in a + 1..normals.len() {
            let dot = normals[a].dot(&normals[b]);
            if dot < min_dot {
                min_dot = dot;
                extremal = Some((a, b));
            }
        }
    }

    match extremal {
        Some((a, b)) if min_dot < 0.0 => {
            let direction = normals[a].cross(&normals[b]);
            let spread = normals
                .iter()
                .map(|n| direction.dot(n))
                .fold(f32::NEG_INFINITY, f32::max);
            if spread > corner_threshold {
                CellFeature::Corner
            } else {
                CellFeature::Edge
            }
        }
        _ => CellFeature::None,
    }
}

/// Move vertices onto the least-squares intersection of their tangent planes
///
/// With `N` the normals and `S` the positions as rows, returns the rows of
/// `pinv(Nᵀ) · (Nᵀ S)`. The result is not clamped to the originating cell.
pub fn tangent_plane_fit(positions: &[Point3f], normals: &[Vector3f]) -> Result<Vec<Point3f>> {
    if positions.len() != normals.len() {
        return Err(Error::InvalidData(format!(
            "{} positions but {} normals",
            positions.len(),
            normals.len()
        )));
    }

    let rows = positions.len();
    let n = DMatrix::from_fn(rows, 3, |r, c| normals[r][c]);
    let s = DMatrix::from_fn(rows, 3, |r, c| positions[r][c]);
    let nt = n.transpose();
    let ns = &nt * s;
    let p = pseudo_inverse(&nt)? * ns;

    Ok((0..rows).map(|r| Point3f::new(p[(r, 0)], p[(r, 1)], p[(r, 2)])).collect())
}

/// Convenience function for standard extraction at the given iso level
pub fn marching_cubes<F>(grid: &SampledGrid, field: &F, iso_level: f32) -> Result<Isosurface>
where
    F: ScalarField + Sync,
{
    MarchingCubes::new(MarchingCubesConfig::default().with_iso_level(iso_level)).extract(grid, field)
}
