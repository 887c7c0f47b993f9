//! Inside/outside labelled samples built by pushing surface points along their normals

use serde::{Deserialize, Serialize};
use surfcrate_algorithms::KdTree;
use surfcrate_core::{Error, NearestNeighborSearch, NormalPointCloud3f, Point3f, Result};
use tracing::{debug, instrument, warn};

/// A point tagged with a scalar whose sign says which side of the surface it is on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignedSample {
    pub position: Point3f,
    pub value: f32,
}

/// Signed samples for a whole cloud, plus a k-d tree over their positions
///
/// Samples are stored in triples per input point `i`:
/// `3i` is the surface point (value 0), `3i + 1` the outer offset (value `+alpha`)
/// and `3i + 2` the inner offset (value `-alpha`).
///
/// Both offsets of a point share one `alpha`. It is halved until neither side
/// collides, so a crowded side also shrinks the offset on the clear side. The
/// two sides are never shrunk independently.
#[derive(Debug, Clone)]
pub struct SignedSampleSet {
    samples: Vec<SignedSample>,
    index: KdTree,
    shrunk_offsets: usize,
}

impl SignedSampleSet {
    /// Offset every point of `cloud` along its normal in both directions
    ///
    /// `surface_index` must be built over the positions of `cloud`, in the same
    /// order. The offset starts at `start_offset` and is halved while either
    /// offset point has another surface point strictly within the offset
    /// distance; both sides share the final offset. After `max_halvings` halvings
    /// the current offset is accepted and a warning is logged.
    #[instrument(skip(cloud, surface_index), fields(points = cloud.len()))]
    pub fn generate(
        cloud: &NormalPointCloud3f,
        surface_index: &KdTree,
        start_offset: f32,
        max_halvings: u32,
    ) -> Result<Self> {
        if cloud.is_empty() {
            return Err(Error::InvalidData("point cloud is empty".to_string()));
        }
        if surface_index.len() != cloud.len() {
            return Err(Error::InvalidData(format!(
                "surface index holds {} points, cloud has {}",
                surface_index.len(),
                cloud.len()
            )));
        }
        if !(start_offset > 0.0 && start_offset.is_finite()) {
            return Err(Error::InvalidData(format!(
                "starting offset must be positive and finite, got {}",
                start_offset
            )));
        }

        let collides = |own: usize, query: &Point3f, alpha: f32| {
            surface_index
                .find_radius_neighbors(query, alpha)
                .iter()
                .any(|&(j, _)| j != own)
        };

        let mut samples = Vec::with_capacity(cloud.len() * 3);
        let mut shrunk_offsets = 0;
        let mut capped = 0;

        for (i, point) in cloud.iter().enumerate() {
            let p = point.position;
            let n = point.normal;
            let mut alpha = start_offset;
            let mut halvings = 0;

            while collides(i, &(p + n * alpha), alpha) || collides(i, &(p - n * alpha), alpha) {
                if halvings == max_halvings {
                    capped += 1;
                    break;
                }
                alpha *= 0.5;
                halvings += 1;
            }
            if halvings > 0 {
                shrunk_offsets += 1;
            }

            samples.push(SignedSample { position: p, value: 0.0 });
            samples.push(SignedSample { position: p + n * alpha, value: alpha });
            samples.push(SignedSample { position: p - n * alpha, value: -alpha });
        }

        if capped > 0 {
            warn!(
                points = capped,
                max_halvings, "Offset still collides after the halving limit, accepted as is"
            );
        }
        debug!(
            samples = samples.len(),
            shrunk = shrunk_offsets,
            start_offset,
            "Generated signed samples"
        );

        let positions: Vec<Point3f> = samples.iter().map(|s| s.position).collect();
        let index = KdTree::new(&positions);

        Ok(Self {
            samples,
            index,
            shrunk_offsets,
        })
    }

    pub fn samples(&self) -> &[SignedSample] {
        &self.samples
    }

    /// K-d tree over sample positions, indices match [`Self::samples`]
    pub fn index(&self) -> &KdTree {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of input points whose offset had to be shrunk at least once
    pub fn shrunk_offsets(&self) -> usize {
        self.shrunk_offsets
    }

    /// Outer offset samples, one per input point
    pub fn positive_offsets(&self) -> impl Iterator<Item = &SignedSample> {
        self.samples.iter().skip(1).step_by(3)
    }

    /// Inner offset samples, one per input point
    pub fn negative_offsets(&self) -> impl Iterator<Item = &SignedSample> {
        self.samples.iter().skip(2).step_by(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use surfcrate_core::{NormalPoint3f, PointCloud, Vector3f};

    fn build(cloud: &NormalPointCloud3f, start: f32) -> SignedSampleSet {
        let index = KdTree::new(&cloud.positions());
        SignedSampleSet::generate(cloud, &index, start, 32).unwrap()
    }

    #[test]
    fn test_isolated_point_keeps_full_offset() {
        let cloud = PointCloud::from_points(vec![NormalPoint3f::new(Point3f::origin(), Vector3f::z())]);
        let set = build(&cloud, 0.5);

        assert_eq!(set.len(), 3);
        assert_eq!(set.shrunk_offsets(), 0);
        assert_eq!(set.samples()[0].value, 0.0);
        assert_relative_eq!(set.samples()[1].position, Point3f::new(0.0, 0.0, 0.5));
        assert_relative_eq!(set.samples()[1].value, 0.5);
        assert_relative_eq!(set.samples()[2].position, Point3f::new(0.0, 0.0, -0.5));
        assert_relative_eq!(set.samples()[2].value, -0.5);
    }

    #[test]
    fn test_offsets_are_symmetric() {
        // Two sheets facing each other force the offsets to shrink
        let mut points = Vec::new();
        for i in 0..5 {
            for j in 0..5 {
                let (x, y) = (i as f32 * 0.1, j as f32 * 0.1);
                points.push(NormalPoint3f::new(Point3f::new(x, y, 0.0), Vector3f::z()));
                points.push(NormalPoint3f::new(Point3f::new(x, y, 0.3), -Vector3f::z()));
            }
        }
        let cloud = PointCloud::from_points(points);
        let set = build(&cloud, 1.0);

        assert!(set.shrunk_offsets() > 0);
        for (pos, neg) in set.positive_offsets().zip(set.negative_offsets()) {
            assert!(pos.value > 0.0);
            assert!(neg.value < 0.0);
            assert_eq!(pos.value, -neg.value);
            assert!(pos.value <= 1.0);
        }
    }

    #[test]
    fn test_crowded_side_shrinks_both_offsets() {
        // Only the inner side of the first point is crowded
        let cloud = PointCloud::from_points(vec![
            NormalPoint3f::new(Point3f::origin(), Vector3f::z()),
            NormalPoint3f::new(Point3f::new(0.0, 0.0, -0.3), Vector3f::z()),
        ]);
        let set = build(&cloud, 0.5);

        assert_eq!(set.samples()[1].value, 0.125);
        assert_eq!(set.samples()[1].position, Point3f::new(0.0, 0.0, 0.125));
        assert_eq!(set.samples()[2].value, -0.125);
    }

    #[test]
    fn test_accepted_offsets_are_clear_of_other_points() {
        let cloud: NormalPointCloud3f = (0..10)
            .map(|i| NormalPoint3f::new(Point3f::new(i as f32 * 0.05, 0.0, 0.0), Vector3f::y()))
            .collect();
        let index = KdTree::new(&cloud.positions());
        let set = SignedSampleSet::generate(&cloud, &index, 0.2, 32).unwrap();

        for (i, sample) in set.positive_offsets().enumerate() {
            let found = index.find_radius_neighbors(&sample.position, sample.value);
            assert!(found.iter().all(|&(j, _)| j == i));
        }
    }

    #[test]
    fn test_invalid_input() {
        let empty = NormalPointCloud3f::new();
        let index = KdTree::new(&[]);
        assert!(SignedSampleSet::generate(&empty, &index, 0.1, 32).is_err());

        let cloud = PointCloud::from_points(vec![NormalPoint3f::default()]);
        let index = KdTree::new(&cloud.positions());
        assert!(SignedSampleSet::generate(&cloud, &index, 0.0, 32).is_err());
        assert!(SignedSampleSet::generate(&cloud, &KdTree::new(&[]), 0.1, 32).is_err());
    }
}
