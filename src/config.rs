//! Octant patch configuration and builder
//!
//! This module holds the parameters a display layer edits: subdivision
//! order, generation method, shading and boundary continuation, plus the
//! budgets of the two iterative solvers.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{OctantError, Result};
use crate::generation::{Method, RelaxationOptions, SolverOptions};
use crate::mesh::AdjacencyMode;

/// Largest accepted subdivision order
///
/// Generation is `O(n²)`; this keeps a stray input from allocating
/// millions of vertices.
pub const MAX_ORDER: usize = 512;

/// Parse a subdivision order typed by a user
///
/// # Errors
///
/// Returns `InvalidArgument` for negative, fractional, non-numeric or
/// out-of-range input.
///
/// # Example
///
/// ```rust
/// use octant_sphere::config::parse_order;
///
/// assert_eq!(parse_order(" 12 ").unwrap(), 12);
/// assert!(parse_order("-1").is_err());
/// assert!(parse_order("2.5").is_err());
/// ```
pub fn parse_order(input: &str) -> Result<usize> {
    let trimmed = input.trim();
    let order: usize = trimmed.parse().map_err(|_| {
        OctantError::InvalidArgument(format!(
            "subdivision order must be a non-negative integer (got {:?})",
            trimmed
        ))
    })?;
    check_order(order)?;
    Ok(order)
}

fn check_order(order: usize) -> Result<()> {
    if order > MAX_ORDER {
        return Err(OctantError::InvalidArgument(format!(
            "subdivision order must be <= {} (got {})",
            MAX_ORDER, order
        )));
    }
    Ok(())
}

/// Everything needed to produce one octant patch
///
/// The same configuration always produces the identical patch.
///
/// # Example
///
/// ```rust
/// use octant_sphere::*;
///
/// let config = OctantConfigBuilder::new()
///     .order(6)
///     .unwrap()
///     .method(Method::Geodesics)
///     .build()
///     .unwrap();
///
/// // Config is serializable (with "serde" feature)
/// # #[cfg(feature = "serde")]
/// # {
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: OctantConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(config, restored);
/// # }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctantConfig {
    /// Subdivision order `n`; the patch has `(n + 1)(n + 2)/2` vertices
    pub order: usize,

    /// Generation strategy
    pub method: Method,

    /// Samples per grid step when drawing grid lines
    pub refinement: usize,

    /// Emit per-vertex normals (smooth shading)
    pub smooth: bool,

    /// How the surface continues past the boundary edges
    pub adjacency: AdjacencyMode,

    /// Budget of the relaxation balancer (`balanced` only)
    pub relaxation: RelaxationOptions,

    /// Budget of the sine-ratio solver (`asinBased` only)
    pub solver: SolverOptions,
}

impl Default for OctantConfig {
    fn default() -> Self {
        Self {
            order: 8,
            method: Method::default(),
            refinement: 1,
            smooth: true,
            adjacency: AdjacencyMode::default(),
            relaxation: RelaxationOptions::default(),
            solver: SolverOptions::default(),
        }
    }
}

/// Builder for creating an `OctantConfig` with validation
///
/// # Example
///
/// ```rust
/// use octant_sphere::*;
///
/// // Use defaults
/// let config = OctantConfigBuilder::new().build().unwrap();
/// assert_eq!(config.method, Method::Balanced);
///
/// // Customize
/// let config = OctantConfigBuilder::new()
///     .order(20)
///     .unwrap()
///     .method(Method::AsinBased)
///     .adjacency(AdjacencyMode::Cylinder)
///     .smooth(false)
///     .build()
///     .unwrap();
/// assert_eq!(config.order, 20);
/// ```
#[derive(Debug, Clone)]
pub struct OctantConfigBuilder {
    config: OctantConfig,
}

impl OctantConfigBuilder {
    /// Create a new builder with default values
    ///
    /// Defaults:
    /// - order: 8
    /// - method: balanced
    /// - refinement: 1
    /// - smooth: true
    /// - adjacency: sphere
    /// - relaxation: 100 iterations, threshold 1e-8
    /// - solver: 30 iterations, tolerance 1e-10
    pub fn new() -> Self {
        Self {
            config: OctantConfig::default(),
        }
    }

    /// Set the subdivision order
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the order exceeds [`MAX_ORDER`]
    pub fn order(mut self, order: usize) -> Result<Self> {
        check_order(order)?;
        self.config.order = order;
        Ok(self)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.config.method = method;
        self
    }

    /// Select the method by registry name
    ///
    /// # Errors
    ///
    /// Returns `UnknownMethod` for names not in the registry
    pub fn method_name(mut self, name: &str) -> Result<Self> {
        self.config.method = name.parse()?;
        Ok(self)
    }

    /// Set the number of samples per grid step for grid lines
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if refinement is zero
    pub fn refinement(mut self, refinement: usize) -> Result<Self> {
        if refinement == 0 {
            return Err(OctantError::InvalidArgument(
                "refinement must be at least 1".to_string(),
            ));
        }
        self.config.refinement = refinement;
        Ok(self)
    }

    pub fn smooth(mut self, smooth: bool) -> Self {
        self.config.smooth = smooth;
        self
    }

    pub fn adjacency(mut self, adjacency: AdjacencyMode) -> Self {
        self.config.adjacency = adjacency;
        self
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero budget or negative threshold
    pub fn relaxation(mut self, options: RelaxationOptions) -> Result<Self> {
        options.validate()?;
        self.config.relaxation = options;
        Ok(self)
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero budget or non-positive tolerance
    pub fn solver(mut self, options: SolverOptions) -> Result<Self> {
        options.validate()?;
        self.config.solver = options;
        Ok(self)
    }

    /// Build the configuration
    ///
    /// Every setter validates its own input, so this always succeeds.
    pub fn build(self) -> Result<OctantConfig> {
        Ok(self.config)
    }
}

impl Default for OctantConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
