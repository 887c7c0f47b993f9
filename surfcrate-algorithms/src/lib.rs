//! # surfcrate algorithms
//!
//! Building blocks shared by the reconstruction pipeline: a static k-d tree for
//! radius and k-nearest queries, a brute force reference search, and a
//! pseudo-inverse for least-squares vertex placement.

pub mod linalg;
pub mod nearest_neighbor;

// Re-export commonly used items
pub use linalg::*;
pub use nearest_neighbor::*;
