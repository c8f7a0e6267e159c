//! OctantPatch: one generated octant and everything derived from it

use glam::DVec3;

use crate::config::OctantConfig;
use crate::error::Result;
use crate::grid::Triangulation;
use crate::mesh::{build_octant_mesh, rays, OctantMesh};
use crate::metrics::{quality_report, QualityReport};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// A generated octant triangulation together with the configuration that
/// produced it
///
/// Outputs are recomputed on every call and owned by the caller; a new
/// configuration means a new patch.
///
/// # Examples
///
/// ```
/// use octant_sphere::*;
///
/// let config = OctantConfigBuilder::new()
///     .order(4)
///     .unwrap()
///     .method(Method::Geodesics)
///     .build()
///     .unwrap();
///
/// let patch = OctantPatch::generate(config).unwrap();
/// let mesh = patch.mesh();
/// assert_eq!(mesh.patch.triangle_count(), 16);
///
/// let report = patch.metrics();
/// println!("{}", report);
/// ```
#[derive(Debug, Clone)]
pub struct OctantPatch {
    config: OctantConfig,
    triangulation: Triangulation,
}

impl OctantPatch {
    /// Run the configured generator
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the solver or relaxation options in the
    /// configuration are out of range.
    pub fn generate(config: OctantConfig) -> Result<Self> {
        config.solver.validate()?;
        config.relaxation.validate()?;
        let triangulation = config.method.generate_with_options(
            config.order,
            &config.solver,
            &config.relaxation,
        );
        Ok(Self {
            config,
            triangulation,
        })
    }

    #[inline]
    pub fn config(&self) -> &OctantConfig {
        &self.config
    }

    #[inline]
    pub fn triangulation(&self) -> &Triangulation {
        &self.triangulation
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.triangulation.order()
    }

    /// Render buffers using the configured shading and adjacency
    pub fn mesh(&self) -> OctantMesh {
        build_octant_mesh(&self.triangulation, self.config.smooth, self.config.adjacency)
    }

    /// Quality metrics using the configured adjacency
    pub fn metrics(&self) -> QualityReport {
        quality_report(&self.triangulation, self.config.adjacency)
    }

    /// Origin-to-vertex segments for debug display
    pub fn rays(&self) -> Vec<[DVec3; 2]> {
        rays(&self.triangulation)
    }

    /// Grid rows sampled at the configured refinement
    pub fn lines(&self) -> Result<Vec<Vec<DVec3>>> {
        self.config.method.sample_lines_with_options(
            self.config.order,
            self.config.refinement,
            &self.config.solver,
            &self.config.relaxation,
        )
    }

    /// Nearest-vertex index over this patch
    #[cfg(feature = "spatial-index")]
    pub fn spatial_index(&self) -> SpatialIndex {
        SpatialIndex::new(&self.triangulation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OctantConfigBuilder;
    use crate::generation::{Method, RelaxationOptions};
    use crate::mesh::AdjacencyMode;

    #[test]
    fn test_generate_patch() {
        let config = OctantConfigBuilder::new()
            .order(6)
            .unwrap()
            .method(Method::SineBased)
            .build()
            .unwrap();
        let patch = OctantPatch::generate(config).unwrap();

        assert_eq!(patch.order(), 6);
        assert_eq!(patch.triangulation(), &Method::SineBased.generate(6));

        let mesh = patch.mesh();
        assert_eq!(mesh.patch.vertex_count(), 28);
        assert_eq!(mesh.patch.triangle_count(), 36);
        assert!(mesh.patch.normals.is_some());

        let report = patch.metrics();
        assert_eq!(report.edge_count, 63);
        assert_eq!(patch.rays().len(), 28);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let config = OctantConfigBuilder::new().order(5).unwrap().build().unwrap();
        let a = OctantPatch::generate(config).unwrap();
        let b = OctantPatch::generate(config).unwrap();
        assert_eq!(a.triangulation(), b.triangulation());
        assert_eq!(a.mesh(), b.mesh());
    }

    #[test]
    fn test_configured_relaxation_budget_is_used() {
        let options = RelaxationOptions {
            max_iterations: 2,
            convergence_threshold: 0.0,
        };
        let config = OctantConfigBuilder::new()
            .order(6)
            .unwrap()
            .relaxation(options)
            .unwrap()
            .build()
            .unwrap();
        let patch = OctantPatch::generate(config).unwrap();
        assert_ne!(patch.triangulation(), &Method::Balanced.generate(6));
    }

    #[test]
    fn test_generate_rejects_invalid_options() {
        let mut config = OctantConfigBuilder::new().build().unwrap();
        config.solver.max_iterations = 0;
        assert!(OctantPatch::generate(config).is_err());
    }

    #[test]
    fn test_lines_use_refinement() {
        let config = OctantConfigBuilder::new()
            .order(3)
            .unwrap()
            .method(Method::Parallels)
            .refinement(5)
            .unwrap()
            .adjacency(AdjacencyMode::Cylinder)
            .build()
            .unwrap();
        let patch = OctantPatch::generate(config).unwrap();
        let lens: Vec<usize> = patch.lines().unwrap().iter().map(Vec::len).collect();
        assert_eq!(lens, vec![16, 11, 6, 1]);
    }

    #[cfg(feature = "spatial-index")]
    #[test]
    fn test_spatial_index_from_patch() {
        let config = OctantConfigBuilder::new()
            .order(4)
            .unwrap()
            .method(Method::Geodesics)
            .build()
            .unwrap();
        let patch = OctantPatch::generate(config).unwrap();
        let index = patch.spatial_index();
        let apex = index.find_nearest(DVec3::new(0.05, 0.99, 0.05));
        assert_eq!((apex.i, apex.j, apex.k), (4, 0, 0));
    }
}
