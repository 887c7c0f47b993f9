//! Axis-aligned bounding boxes

use crate::point::*;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3f,
    pub max: Point3f,
}

impl Aabb {
    pub fn new(min: Point3f, max: Point3f) -> Self {
        Self { min, max }
    }

    /// Tight box around a set of points, `None` when the iterator is empty
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Point3f>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut min = first;
        let mut max = first;

        for p in iter {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);

            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some(Self { min, max })
    }

    /// Grow the box by `ratio` of its extent on both sides of every axis
    pub fn padded(&self, ratio: f32) -> Self {
        let pad = self.extent() * ratio;
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Edge lengths along x, y and z
    pub fn extent(&self) -> Vector3f {
        self.max - self.min
    }

    /// Distance between the two corners
    pub fn diagonal(&self) -> f32 {
        self.extent().norm()
    }

    pub fn center(&self) -> Point3f {
        nalgebra::center(&self.min, &self.max)
    }

    /// Inclusive containment test
    pub fn contains(&self, p: &Point3f) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] && p[axis] <= self.max[axis])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_points() {
        let points = vec![
            Point3f::new(1.0, -2.0, 0.5),
            Point3f::new(-1.0, 3.0, 0.0),
            Point3f::new(0.0, 0.0, 2.0),
        ];
        let bounds = Aabb::from_points(points).unwrap();

        assert_eq!(bounds.min, Point3f::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Point3f::new(1.0, 3.0, 2.0));
        assert!(Aabb::from_points(Vec::<Point3f>::new()).is_none());
    }

    #[test]
    fn test_padding_is_symmetric() {
        let bounds = Aabb::new(Point3f::new(0.0, 0.0, 0.0), Point3f::new(10.0, 2.0, 1.0));
        let padded = bounds.padded(0.1);

        assert_relative_eq!(padded.min.x, -1.0);
        assert_relative_eq!(padded.max.x, 11.0);
        assert_relative_eq!(padded.min.y, -0.2);
        assert_relative_eq!(padded.max.y, 2.2);
        assert_relative_eq!(padded.min.z, -0.1);
        assert_relative_eq!(padded.max.z, 1.1);
        assert_relative_eq!(padded.center(), bounds.center());
    }

    #[test]
    fn test_diagonal() {
        let bounds = Aabb::new(Point3f::origin(), Point3f::new(2.0, 3.0, 6.0));
        assert_relative_eq!(bounds.diagonal(), 7.0);
        assert!(bounds.contains(&Point3f::new(2.0, 0.0, 6.0)));
        assert!(!bounds.contains(&Point3f::new(2.1, 0.0, 0.0)));
    }
}
