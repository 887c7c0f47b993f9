//! Core data structures and traits for surfcrate
//!
//! This crate provides the fundamental types shared by the reconstruction and
//! fairing crates: points, oriented point clouds, bounding boxes, indexed meshes,
//! triangle soups, and the nearest neighbor search trait.

pub mod bounds;
pub mod error;
pub mod mesh;
pub mod point;
pub mod point_cloud;
pub mod traits;

pub use bounds::*;
pub use error::*;
pub use mesh::*;
pub use point::*;
pub use point_cloud::*;
pub use traits::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix3, Point3, Vector3};

// Type aliases for easier imports
pub type Point = Point3f;
pub type Mesh = TriangleMesh;
