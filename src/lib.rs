//! # surfcrate
//!
//! Implicit surface reconstruction and mesh fairing for point clouds.
//!
//! This is the umbrella crate that provides convenient access to all surfcrate functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: points, oriented point clouds, bounds, meshes and triangle soups
//! - **Algorithms**: k-d tree neighbor queries and the SVD pseudo-inverse
//! - **Reconstruction**: signed samples, a Wendland-weighted field, lattice sampling
//!   and marching cubes with an optional sharp-feature pass
//! - **Fairing**: uniform and cotangent Laplacian smoothing
//! - **I/O**: OFF/NOFF point files and OBJ meshes
//!
//! ## Quick Start
//!
//! ```rust
//! use surfcrate::prelude::*;
//!
//! // Six points on the unit sphere with outward normals
//! let axes = [
//!     Vector3f::x(),
//!     -Vector3f::x(),
//!     Vector3f::y(),
//!     -Vector3f::y(),
//!     Vector3f::z(),
//!     -Vector3f::z(),
//! ];
//! let cloud: NormalPointCloud3f = axes
//!     .iter()
//!     .map(|&n| NormalPoint3f::new(Point3f::origin() + n, n))
//!     .collect();
//!
//! let config = ReconstructionConfig::default().with_resolution([8, 8, 8]);
//! let surface = reconstruct(cloud, config)?;
//! assert_eq!(surface.report.cells_visited, 512);
//!
//! // Fair an indexed mesh
//! let vertices = vec![
//!     Point3f::new(0.0, 0.0, 0.0),
//!     Point3f::new(1.0, 0.0, 0.0),
//!     Point3f::new(0.0, 1.0, 0.0),
//! ];
//! let faired = fair(&vertices, &[[0, 1, 2]], &FairingConfig::default().with_iterations(3))?;
//! assert_eq!(faired.len(), 3);
//! # Ok::<(), surfcrate::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables algorithms, io, reconstruction and fairing
//! - `algorithms`: Spatial index and linear algebra helpers
//! - `io`: File format support
//! - `reconstruction`: Surface reconstruction
//! - `fairing`: Mesh fairing
//! - `parallel`: Evaluate lattice nodes and cells on the rayon thread pool
//! - `all`: Enables all features

// Re-export core functionality
pub use surfcrate_core::*;

// Re-export sub-crates
#[cfg(feature = "algorithms")]
pub use surfcrate_algorithms as algorithms;

#[cfg(feature = "io")]
pub use surfcrate_io as io;

#[cfg(feature = "reconstruction")]
pub use surfcrate_reconstruction as reconstruction;

#[cfg(feature = "fairing")]
pub use surfcrate_fairing as fairing;

/// Convenient imports for common use cases
pub mod prelude {
    pub use surfcrate_core::*;

    #[cfg(feature = "algorithms")]
    pub use surfcrate_algorithms::{BruteForceSearch, KdTree};

    #[cfg(feature = "io")]
    pub use surfcrate_io::{read_obj, read_oriented_cloud, save_obj_mesh, save_obj_soup, IoError};

    #[cfg(feature = "reconstruction")]
    pub use surfcrate_reconstruction::{
        reconstruct, CellFeature, ExtractionReport, ExtractionVariant, FieldEvaluator, Isosurface, Lattice,
        MarchingCubes, MarchingCubesConfig, ReconstructionConfig, ReconstructionSession, SampledGrid, ScalarField,
        Side, SignedSampleSet,
    };

    #[cfg(feature = "fairing")]
    pub use surfcrate_fairing::{fair, fair_mesh, FairingConfig, IntegrationScheme, LaplacianKind, MeshOperator};
}
