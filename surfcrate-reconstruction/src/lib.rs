//! Implicit surface reconstruction from oriented point clouds
//!
//! The pipeline runs in four stages:
//! - [`signed_samples`]: offset each surface point along its normal to get
//!   inside and outside samples
//! - [`field`]: estimate a scalar field from the samples with a Wendland-weighted mean
//! - [`grid`]: sample the field on a regular lattice over the padded bounds
//! - [`marching_cubes`]: extract the zero level set, optionally preserving sharp edges
//!
//! [`session::ReconstructionSession`] ties the stages together for one cloud.

pub mod field;
pub mod grid;
pub mod marching_cubes;
pub mod parallel;
pub mod session;
pub mod signed_samples;
pub mod tables;

pub use field::*;
pub use grid::*;
pub use marching_cubes::*;
pub use session::*;
pub use signed_samples::*;
