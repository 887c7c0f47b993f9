//! Scalar field estimated from signed samples
//!
//! The field at a point is the Wendland-weighted mean of the signed sample values
//! within a search radius. Far from every sample the field saturates to a large
//! constant carrying the sign of the nearest sample.

use crate::signed_samples::SignedSampleSet;
use surfcrate_core::{Error, NearestNeighborSearch, Point3f, Result, Vector3f};

/// Magnitude returned when no sample lies within the search radius
pub const FAR_FIELD_VALUE: f32 = 10_000.0;

/// Anything that can be evaluated at a point in space
pub trait ScalarField {
    fn value(&self, p: &Point3f) -> f32;

    /// Central finite-difference gradient with the given step
    fn gradient(&self, p: &Point3f, step: f32) -> Vector3f {
        let mut g = Vector3f::zeros();
        for axis in 0..3 {
            let mut offset = Vector3f::zeros();
            offset[axis] = step;
            g[axis] = (self.value(&(p + offset)) - self.value(&(p - offset))) / (2.0 * step);
        }
        g
    }
}

impl<F> ScalarField for F
where
    F: Fn(&Point3f) -> f32,
{
    fn value(&self, p: &Point3f) -> f32 {
        self(p)
    }
}

/// Wendland weight: (1-d/h)⁴ * (4d/h + 1) for d < h, zero beyond
pub fn wendland(distance: f32, h: f32) -> f32 {
    if distance >= h {
        0.0
    } else {
        let r = distance / h;
        (1.0 - r).powi(4) * (4.0 * r + 1.0)
    }
}

/// Weighted-mean field over a [`SignedSampleSet`]
#[derive(Debug, Clone, Copy)]
pub struct FieldEvaluator<'a> {
    samples: &'a SignedSampleSet,
    radius: f32,
    kernel_width: f32,
}

impl<'a> FieldEvaluator<'a> {
    /// Create an evaluator, rejecting a search radius wider than the kernel
    ///
    /// Samples between the kernel width and the radius would all get zero weight,
    /// which can turn the mean into 0/0.
    pub fn new(samples: &'a SignedSampleSet, radius: f32, kernel_width: f32) -> Result<Self> {
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(Error::InvalidData(format!("search radius must be positive, got {}", radius)));
        }
        if !(kernel_width > 0.0 && kernel_width.is_finite()) {
            return Err(Error::InvalidData(format!(
                "kernel width must be positive, got {}",
                kernel_width
            )));
        }
        if radius > kernel_width {
            return Err(Error::InvalidData(format!(
                "search radius {} exceeds kernel width {}",
                radius, kernel_width
            )));
        }
        Ok(Self::new_unchecked(samples, radius, kernel_width))
    }

    pub(crate) fn new_unchecked(samples: &'a SignedSampleSet, radius: f32, kernel_width: f32) -> Self {
        Self {
            samples,
            radius,
            kernel_width,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn kernel_width(&self) -> f32 {
        self.kernel_width
    }

    /// Field value at `query`
    ///
    /// Returns `±FAR_FIELD_VALUE` (or 0 for a surface sample) from the nearest
    /// sample when nothing is within the radius. NaN if every weight is zero,
    /// which a validated evaluator cannot produce.
    pub fn value_at(&self, query: &Point3f) -> f32 {
        let samples = self.samples.samples();
        let neighbors = self.samples.index().find_radius_neighbors(query, self.radius);

        if neighbors.is_empty() {
            return match self.samples.index().find_nearest(query) {
                Some((nearest, _)) => saturate(samples[nearest].value),
                None => f32::NAN,
            };
        }

        let mut weighted = 0.0;
        let mut total = 0.0;
        for (i, distance) in neighbors {
            let w = wendland(distance, self.kernel_width);
            weighted += w * samples[i].value;
            total += w;
        }
        weighted / total
    }
}

impl ScalarField for FieldEvaluator<'_> {
    fn value(&self, p: &Point3f) -> f32 {
        self.value_at(p)
    }
}

fn saturate(value: f32) -> f32 {
    if value > 0.0 {
        FAR_FIELD_VALUE
    } else if value < 0.0 {
        -FAR_FIELD_VALUE
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use surfcrate_algorithms::KdTree;
    use surfcrate_core::{NormalPoint3f, NormalPointCloud3f, PointCloud};

    fn single_point_samples(offset: f32) -> SignedSampleSet {
        let cloud: NormalPointCloud3f =
            PointCloud::from_points(vec![NormalPoint3f::new(Point3f::origin(), Vector3f::z())]);
        let index = KdTree::new(&cloud.positions());
        SignedSampleSet::generate(&cloud, &index, offset, 32).unwrap()
    }

    #[test]
    fn test_wendland_weight() {
        assert_relative_eq!(wendland(0.0, 1.0), 1.0);
        assert_relative_eq!(wendland(0.5, 1.0), 0.0625 * 3.0);
        assert_eq!(wendland(1.0, 1.0), 0.0);
        assert_eq!(wendland(2.0, 1.0), 0.0);
        assert!(wendland(0.25, 1.0) > wendland(0.75, 1.0));
    }

    #[test]
    fn test_far_field_saturates() {
        let samples = single_point_samples(0.1);
        let field = FieldEvaluator::new(&samples, 0.2, 0.5).unwrap();

        assert_eq!(field.value_at(&Point3f::new(0.0, 0.0, 5.0)), FAR_FIELD_VALUE);
        assert_eq!(field.value_at(&Point3f::new(0.0, 0.0, -5.0)), -FAR_FIELD_VALUE);
        // Nearest sample is the surface point itself
        assert_eq!(field.value_at(&Point3f::new(5.0, 0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_weighted_mean() {
        let samples = single_point_samples(0.1);
        let field = FieldEvaluator::new(&samples, 1.0, 1.0).unwrap();

        // Symmetric neighborhood on the surface plane cancels out
        assert_relative_eq!(field.value_at(&Point3f::new(0.05, 0.0, 0.0)), 0.0, epsilon = 1e-6);

        let above = field.value_at(&Point3f::new(0.0, 0.0, 0.05));
        let below = field.value_at(&Point3f::new(0.0, 0.0, -0.05));
        assert!(above > 0.0 && above < 0.1);
        assert_relative_eq!(above, -below, epsilon = 1e-6);
    }

    #[test]
    fn test_radius_must_not_exceed_kernel() {
        let samples = single_point_samples(0.1);
        assert!(FieldEvaluator::new(&samples, 0.6, 0.5).is_err());
        assert!(FieldEvaluator::new(&samples, 0.0, 0.5).is_err());
        assert!(FieldEvaluator::new(&samples, 0.5, f32::NAN).is_err());
        assert!(FieldEvaluator::new(&samples, 0.5, 0.5).is_ok());
    }

    #[test]
    fn test_gradient_of_linear_field() {
        let field = |p: &Point3f| 2.0 * p.x - p.y + 0.5 * p.z;
        let g = field.gradient(&Point3f::new(0.3, -0.2, 1.0), 1e-2);

        assert_relative_eq!(g, Vector3f::new(2.0, -1.0, 0.5), epsilon = 1e-3);
    }
}
