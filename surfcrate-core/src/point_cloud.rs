//! Point cloud data structures and functionality

use crate::bounds::Aabb;
use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// A generic point cloud container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

/// A point cloud with 3D points
pub type PointCloud3f = PointCloud<Point3f>;

/// A point cloud with normal vectors
pub type NormalPointCloud3f = PointCloud<NormalPoint3f>;

impl<T> PointCloud<T> {
    /// Create a new empty point cloud
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a new point cloud with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Create a point cloud from a vector of points
    pub fn from_points(points: Vec<T>) -> Self {
        Self { points }
    }

    /// Get the number of points in the cloud
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Add a point to the cloud
    pub fn push(&mut self, point: T) {
        self.points.push(point);
    }

    /// Get an iterator over the points
    pub fn iter(&self) -> std::slice::Iter<T> {
        self.points.iter()
    }
}

impl<T> Default for PointCloud<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<T> IndexMut<usize> for PointCloud<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.points[index]
    }
}

impl<'a, T> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            points: Vec::from_iter(iter),
        }
    }
}

impl<T> PointCloud<T>
where
    T: Copy,
    Point3f: From<T>,
{
    /// Positions of every point, in storage order
    pub fn positions(&self) -> Vec<Point3f> {
        self.points.iter().map(|&p| Point3f::from(p)).collect()
    }

    /// Tight axis-aligned bounds, `None` for an empty cloud
    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.points.iter().map(|&p| Point3f::from(p)))
    }
}

impl PointCloud<NormalPoint3f> {
    /// Pair up positions with normals
    ///
    /// Fails when the two arrays differ in length.
    pub fn from_positions_and_normals(positions: &[Point3f], normals: &[Vector3f]) -> Result<Self> {
        if positions.len() != normals.len() {
            return Err(Error::InvalidData(format!(
                "{} positions but {} normals",
                positions.len(),
                normals.len()
            )));
        }

        Ok(positions
            .iter()
            .zip(normals)
            .map(|(&position, &normal)| NormalPoint3f::new(position, normal))
            .collect())
    }

    /// Normals of every point, in storage order
    pub fn normals(&self) -> Vec<Vector3f> {
        self.points.iter().map(|p| p.normal).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_and_normals_must_match() {
        let positions = vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0)];
        let normals = vec![Vector3f::z()];

        assert!(NormalPointCloud3f::from_positions_and_normals(&positions, &normals).is_err());

        let normals = vec![Vector3f::z(), Vector3f::x()];
        let cloud = NormalPointCloud3f::from_positions_and_normals(&positions, &normals).unwrap();
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.positions(), positions);
        assert_eq!(cloud.normals(), normals);
    }

    #[test]
    fn test_bounding_box() {
        let cloud = PointCloud3f::from_points(vec![
            Point3f::new(-1.0, 0.0, 0.0),
            Point3f::new(1.0, 2.0, 3.0),
        ]);
        let bounds = cloud.bounding_box().unwrap();
        assert_eq!(bounds.min, Point3f::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Point3f::new(1.0, 2.0, 3.0));

        assert!(PointCloud3f::new().bounding_box().is_none());
    }
}
