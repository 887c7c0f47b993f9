//! Core traits for surfcrate

use crate::point::*;

/// Trait for nearest neighbor search functionality
///
/// Results are `(index, distance)` pairs where `index` points into the array the
/// structure was built from. Every query against an empty structure returns an
/// empty result.
pub trait NearestNeighborSearch {
    /// Find the k nearest neighbors to a query point, closest first
    ///
    /// Returns fewer than `k` results when fewer points are stored.
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)>;

    /// Find all neighbors strictly closer than `radius`, in no particular order
    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)>;

    /// Closest stored point, if any
    fn find_nearest(&self, query: &Point3f) -> Option<(usize, f32)> {
        self.find_k_nearest(query, 1).into_iter().next()
    }

    /// Whether any stored point is strictly closer than `radius`
    fn any_within(&self, query: &Point3f, radius: f32) -> bool {
        !self.find_radius_neighbors(query, radius).is_empty()
    }
}
