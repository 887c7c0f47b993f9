//! Reconstruction state for one loaded point cloud
//!
//! A [`ReconstructionSession`] is created when a cloud is loaded and replaced when
//! the next one is. It owns every structure derived from the cloud (surface index,
//! signed samples, sampled lattice), so changing the lattice resolution only
//! rebuilds the lattice.

use crate::field::FieldEvaluator;
use crate::grid::{Lattice, SampledGrid};
use crate::marching_cubes::{ExtractionVariant, Isosurface, MarchingCubes, MarchingCubesConfig};
use crate::signed_samples::SignedSampleSet;
use serde::{Deserialize, Serialize};
use surfcrate_algorithms::KdTree;
use surfcrate_core::{Aabb, Error, NormalPointCloud3f, Result};
use tracing::info;

/// Parameters for building a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionConfig {
    /// Lattice cells along x, y and z
    pub resolution: [usize; 3],
    /// Neighborhood radius for field evaluation, `None` for the kernel width
    pub search_radius: Option<f32>,
    /// Wendland kernel support, `None` for a tenth of the padded diagonal
    pub kernel_width: Option<f32>,
    pub variant: ExtractionVariant,
    /// Bounding box padding per side, as a fraction of the extent
    pub padding_ratio: f32,
    /// Initial normal offset, as a fraction of the padded diagonal
    pub offset_ratio: f32,
    pub max_offset_halvings: u32,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            resolution: [20, 10, 20],
            search_radius: None,
            kernel_width: None,
            variant: ExtractionVariant::Standard,
            padding_ratio: 0.1,
            offset_ratio: 0.01,
            max_offset_halvings: 32,
        }
    }
}

impl ReconstructionConfig {
    pub fn with_resolution(mut self, resolution: [usize; 3]) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_search_radius(mut self, radius: f32) -> Self {
        self.search_radius = Some(radius);
        self
    }

    pub fn with_kernel_width(mut self, width: f32) -> Self {
        self.kernel_width = Some(width);
        self
    }

    pub fn with_variant(mut self, variant: ExtractionVariant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_padding_ratio(mut self, ratio: f32) -> Self {
        self.padding_ratio = ratio;
        self
    }

    pub fn with_offset_ratio(mut self, ratio: f32) -> Self {
        self.offset_ratio = ratio;
        self
    }

    /// Check the parameters that do not depend on the cloud
    pub fn validate(&self) -> Result<()> {
        if self.resolution.iter().any(|&n| n == 0) {
            return Err(Error::InvalidData(format!(
                "resolution must be at least 1 per axis, got {:?}",
                self.resolution
            )));
        }
        if !(self.padding_ratio >= 0.0 && self.padding_ratio.is_finite()) {
            return Err(Error::InvalidData(format!(
                "padding ratio must be non-negative, got {}",
                self.padding_ratio
            )));
        }
        if !(self.offset_ratio > 0.0 && self.offset_ratio.is_finite()) {
            return Err(Error::InvalidData(format!(
                "offset ratio must be positive, got {}",
                self.offset_ratio
            )));
        }
        if let (Some(radius), Some(width)) = (self.search_radius, self.kernel_width) {
            if radius > width {
                return Err(Error::InvalidData(format!(
                    "search radius {} exceeds kernel width {}",
                    radius, width
                )));
            }
        }
        Ok(())
    }
}

/// Everything derived from one oriented point cloud
#[derive(Debug, Clone)]
pub struct ReconstructionSession {
    config: ReconstructionConfig,
    cloud: NormalPointCloud3f,
    bounds: Aabb,
    surface_index: KdTree,
    samples: SignedSampleSet,
    search_radius: f32,
    kernel_width: f32,
    grid: SampledGrid,
}

impl ReconstructionSession {
    /// Build the sample set and sample the field on the configured lattice
    pub fn new(cloud: NormalPointCloud3f, config: ReconstructionConfig) -> Result<Self> {
        config.validate()?;

        let tight = cloud
            .bounding_box()
            .ok_or_else(|| Error::InvalidData("point cloud is empty".to_string()))?;
        let bounds = tight.padded(config.padding_ratio);
        let diagonal = bounds.diagonal();
        if !(diagonal > 0.0 && diagonal.is_finite()) {
            return Err(Error::DegenerateGeometry(format!(
                "bounding box diagonal is {}, need at least two distinct points",
                diagonal
            )));
        }

        let kernel_width = config.kernel_width.unwrap_or(diagonal / 10.0);
        let search_radius = config.search_radius.unwrap_or(kernel_width);

        let surface_index = KdTree::new(&cloud.positions());
        let samples = SignedSampleSet::generate(
            &cloud,
            &surface_index,
            config.offset_ratio * diagonal,
            config.max_offset_halvings,
        )?;

        let field = FieldEvaluator::new(&samples, search_radius, kernel_width)?;
        let grid = SampledGrid::sample(Lattice::new(bounds, config.resolution)?, &field);

        info!(
            points = cloud.len(),
            samples = samples.len(),
            nodes = grid.values().len(),
            kernel_width,
            search_radius,
            "Reconstruction session ready"
        );

        Ok(Self {
            config,
            cloud,
            bounds,
            surface_index,
            samples,
            search_radius,
            kernel_width,
            grid,
        })
    }

    /// Resample the field on a lattice with a new resolution
    ///
    /// Samples and indices over the cloud are reused.
    pub fn with_resolution(mut self, resolution: [usize; 3]) -> Result<Self> {
        let lattice = Lattice::new(self.bounds, resolution)?;
        let grid = SampledGrid::sample(lattice, &self.field());
        self.grid = grid;
        self.config.resolution = resolution;
        Ok(self)
    }

    pub fn with_variant(mut self, variant: ExtractionVariant) -> Self {
        self.config.variant = variant;
        self
    }

    /// The field sampled on the lattice
    pub fn field(&self) -> FieldEvaluator<'_> {
        FieldEvaluator::new_unchecked(&self.samples, self.search_radius, self.kernel_width)
    }

    /// Extract the surface with the configured variant
    pub fn extract(&self) -> Result<Isosurface> {
        self.extract_with(self.config.variant)
    }

    pub fn extract_with(&self, variant: ExtractionVariant) -> Result<Isosurface> {
        let mc = MarchingCubes::new(MarchingCubesConfig::default().with_variant(variant));
        mc.extract(&self.grid, &self.field())
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    pub fn cloud(&self) -> &NormalPointCloud3f {
        &self.cloud
    }

    /// Padded bounds shared by the lattice and the offset scale
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn surface_index(&self) -> &KdTree {
        &self.surface_index
    }

    pub fn samples(&self) -> &SignedSampleSet {
        &self.samples
    }

    pub fn grid(&self) -> &SampledGrid {
        &self.grid
    }

    pub fn search_radius(&self) -> f32 {
        self.search_radius
    }

    pub fn kernel_width(&self) -> f32 {
        self.kernel_width
    }
}

/// Reconstruct a surface from an oriented cloud in one call
pub fn reconstruct(cloud: NormalPointCloud3f, config: ReconstructionConfig) -> Result<Isosurface> {
    ReconstructionSession::new(cloud, config)?.extract()
}

#[cfg(test)]
mod tests {
    use super::*;
    use surfcrate_core::{NormalPoint3f, Point3f, PointCloud, Vector3f};

    fn octahedron() -> NormalPointCloud3f {
        let axes = [
            Vector3f::x(),
            -Vector3f::x(),
            Vector3f::y(),
            -Vector3f::y(),
            Vector3f::z(),
            -Vector3f::z(),
        ];
        axes.iter()
            .map(|&n| NormalPoint3f::new(Point3f::origin() + n, n))
            .collect()
    }

    #[test]
    fn test_config_default() {
        let config = ReconstructionConfig::default();
        assert_eq!(config.resolution, [20, 10, 20]);
        assert_eq!(config.variant, ExtractionVariant::Standard);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(ReconstructionConfig::default().with_resolution([0, 1, 1]).validate().is_err());
        assert!(ReconstructionConfig::default().with_offset_ratio(0.0).validate().is_err());
        assert!(ReconstructionConfig::default()
            .with_search_radius(2.0)
            .with_kernel_width(1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_session_derives_parameters() {
        let session = ReconstructionSession::new(octahedron(), ReconstructionConfig::default()).unwrap();

        let diagonal = session.bounds().diagonal();
        assert!((session.kernel_width() - diagonal / 10.0).abs() < 1e-6);
        assert_eq!(session.search_radius(), session.kernel_width());
        assert_eq!(session.samples().len(), 18);
        assert_eq!(session.grid().values().len(), 21 * 11 * 21);
    }

    #[test]
    fn test_with_resolution_keeps_samples() {
        let session = ReconstructionSession::new(octahedron(), ReconstructionConfig::default()).unwrap();
        let samples_before = session.samples().samples().to_vec();

        let session = session.with_resolution([4, 4, 4]).unwrap();
        assert_eq!(session.grid().values().len(), 125);
        assert_eq!(session.config().resolution, [4, 4, 4]);
        assert_eq!(session.samples().samples(), samples_before.as_slice());
        assert!(session.with_resolution([4, 0, 4]).is_err());
    }

    #[test]
    fn test_degenerate_clouds_rejected() {
        let empty = NormalPointCloud3f::new();
        assert!(ReconstructionSession::new(empty, ReconstructionConfig::default()).is_err());

        let single = PointCloud::from_points(vec![NormalPoint3f::default()]);
        assert!(matches!(
            ReconstructionSession::new(single, ReconstructionConfig::default()),
            Err(Error::DegenerateGeometry(_))
        ));
    }
}
