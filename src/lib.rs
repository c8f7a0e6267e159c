//! Triangulations of one eighth of the unit sphere
//!
//! Generates triangular point grids covering the spherical octant bounded by
//! the three coordinate planes, under several competing strategies, and
//! derives render buffers and quality metrics from them. Output is
//! engine-agnostic: plain position/normal/uv/index arrays.
//!
//! # Quick Start
//!
//! ```rust
//! use octant_sphere::*;
//!
//! // Pick a generator by name
//! let generate = triangulation_fns()["geodesics"];
//! let t = generate(2);
//! assert_eq!(t.row_count(), 3);
//! assert!(t.row(2)[0].abs_diff_eq(DVec3::Y, 1e-9));
//!
//! // Or drive everything from a configuration
//! let config = OctantConfigBuilder::new()
//!     .order(8)
//!     .unwrap()
//!     .method(Method::AsinBased)
//!     .build()
//!     .unwrap();
//! let patch = OctantPatch::generate(config).unwrap();
//! let mesh = patch.mesh();
//! println!("Generated {} triangles", mesh.patch.triangle_count());
//! println!("{}", patch.metrics());
//! ```
//!
//! # Logging
//!
//! Non-convergence of the sine-ratio solver or the relaxation balancer is
//! reported through the `log` facade at `warn` level; the relaxation loop
//! traces its progress at `debug` level.
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-vertex lookups using KD-tree
//! - `serde`: Enables serialization support for configuration, meshes and metrics

// Modules
pub mod error;
pub mod math;
pub mod grid;
pub mod generation;
pub mod mesh;
pub mod metrics;
pub mod config;
pub mod patch;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{OctantError, Result};
pub use grid::{Boundary, GridPos, Triangulation, TriangularGrid};
pub use generation::{
    lookup, triangulation_fns, Method, RelaxationOptions, RelaxationReport, SolverOptions,
    TriangulationFn,
};
pub use mesh::{
    build_mesh, build_octant_mesh, mirror_octants, rays, AdjacencyMode, AdjacentPatch, MeshData,
    OctantMesh,
};
pub use metrics::{quality_report, BentEdge, EdgeStats, QualityReport};
pub use config::{OctantConfig, OctantConfigBuilder, MAX_ORDER};
pub use patch::OctantPatch;

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec3 for convenience
pub use glam::DVec3;
