//! Mesh fairing for surfcrate
//!
//! Smooths the vertices of an indexed triangle mesh with discrete Laplacian
//! flow. Two operators are available:
//! - Uniform graph Laplacian, fixed by connectivity
//! - Cotangent Laplacian with lumped area mass, rebuilt from the current geometry
//!
//! The flow is integrated with an explicit Euler step or a two-stage
//! semi-implicit step.

pub mod fairing;
pub mod laplacian;

pub use fairing::*;
pub use laplacian::*;
