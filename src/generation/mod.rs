//! Triangulation generators and the name registry
//!
//! Eight generators are closed-form parametric surfaces, `asinBased` runs
//! the sine-ratio solver per point and `balanced` relaxes the `sineBased`
//! grid.

pub mod parametric;
pub mod relax;
pub mod sine_ratio;

pub use parametric::{
    collapsed, even_geodesics, flat, geodesics, parallels, sample_rows, sine_based, sine_based2,
    sines, triangulate,
};
pub use relax::{balanced, relax, relax_with_options, RelaxationOptions, RelaxationReport};
pub use sine_ratio::{
    asin_based, asin_based_with_options, solve_sine_ratio, SineRatioSolution, SolverOptions,
    SolverReport,
};

use glam::DVec3;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{OctantError, Result};
use crate::grid::Triangulation;

/// A generator as stored in the registry
pub type TriangulationFn = fn(usize) -> Triangulation;

/// The available triangulation strategies
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// Planar triangle through the three axis intercepts
    Flat,
    /// Every point at the origin
    Collapsed,
    /// The flat grid normalised onto the sphere
    Geodesics,
    /// Rows along parallels of latitude
    Parallels,
    /// Rows along great circles between evenly spaced edge points
    EvenGeodesics,
    /// Sine-warped flat grid, inside the sphere
    Sines,
    /// Sine-warped grid normalised onto the sphere
    SineBased,
    /// Sine-warped grid projected onto the sphere along `(1, 1, 1)`
    SineBased2,
    /// Arcsine ratios matching the barycentric coordinates
    AsinBased,
    /// `SineBased` relaxed towards uniform edge lengths
    #[default]
    Balanced,
}

impl Method {
    pub const ALL: [Method; 10] = [
        Method::Flat,
        Method::Collapsed,
        Method::Geodesics,
        Method::Parallels,
        Method::EvenGeodesics,
        Method::Sines,
        Method::SineBased,
        Method::SineBased2,
        Method::AsinBased,
        Method::Balanced,
    ];

    /// Registry key
    pub fn name(self) -> &'static str {
        match self {
            Method::Flat => "flat",
            Method::Collapsed => "collapsed",
            Method::Geodesics => "geodesics",
            Method::Parallels => "parallels",
            Method::EvenGeodesics => "evenGeodesics",
            Method::Sines => "sines",
            Method::SineBased => "sineBased",
            Method::SineBased2 => "sineBased2",
            Method::AsinBased => "asinBased",
            Method::Balanced => "balanced",
        }
    }

    /// Whether every generated point lies on the unit sphere
    pub fn is_spherical(self) -> bool {
        !matches!(self, Method::Flat | Method::Collapsed | Method::Sines)
    }

    pub fn triangulation_fn(self) -> TriangulationFn {
        match self {
            Method::Flat => flat,
            Method::Collapsed => collapsed,
            Method::Geodesics => geodesics,
            Method::Parallels => parallels,
            Method::EvenGeodesics => even_geodesics,
            Method::Sines => sines,
            Method::SineBased => sine_based,
            Method::SineBased2 => sine_based2,
            Method::AsinBased => asin_based,
            Method::Balanced => balanced,
        }
    }

    /// Generate with default solver and relaxation options
    pub fn generate(self, n: usize) -> Triangulation {
        (self.triangulation_fn())(n)
    }

    /// Generate with explicit options for the iterative methods
    pub fn generate_with_options(
        self,
        n: usize,
        solver: &SolverOptions,
        relaxation: &RelaxationOptions,
    ) -> Triangulation {
        match self {
            Method::AsinBased => asin_based_with_options(n, solver).0,
            Method::Balanced => relax_with_options(&sine_based(n), relaxation).0,
            _ => self.generate(n),
        }
    }

    /// Sample the grid rows with `refinement` points per grid step
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `refinement` is zero.
    pub fn sample_lines(self, n: usize, refinement: usize) -> Result<Vec<Vec<DVec3>>> {
        self.sample_lines_with_options(
            n,
            refinement,
            &SolverOptions::default(),
            &RelaxationOptions::default(),
        )
    }

    pub fn sample_lines_with_options(
        self,
        n: usize,
        refinement: usize,
        solver: &SolverOptions,
        relaxation: &RelaxationOptions,
    ) -> Result<Vec<Vec<DVec3>>> {
        if refinement == 0 {
            return Err(OctantError::InvalidArgument(
                "refinement must be at least 1".to_string(),
            ));
        }
        let rows = match self {
            Method::Flat => sample_rows(n, refinement, parametric::flat_at),
            Method::Collapsed => sample_rows(n, refinement, parametric::collapsed_at),
            Method::Geodesics => sample_rows(n, refinement, parametric::geodesics_at),
            Method::Parallels => sample_rows(n, refinement, parametric::parallels_at),
            Method::EvenGeodesics => sample_rows(n, refinement, parametric::even_geodesics_at),
            Method::Sines => sample_rows(n, refinement, parametric::sines_at),
            Method::SineBased => sample_rows(n, refinement, parametric::sine_based_at),
            Method::SineBased2 => sample_rows(n, refinement, parametric::sine_based2_at),
            Method::AsinBased => sine_ratio::asin_rows(n, refinement, solver),
            Method::Balanced => {
                let grid = relax_with_options(&sine_based(n), relaxation).0;
                relax::densify_rows(&grid, refinement)
            }
        };
        Ok(rows)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = OctantError;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|method| method.name() == s)
            .ok_or_else(|| OctantError::UnknownMethod(s.to_string()))
    }
}

/// Map from generator name to generator
pub fn triangulation_fns() -> BTreeMap<&'static str, TriangulationFn> {
    Method::ALL
        .into_iter()
        .map(|method| (method.name(), method.triangulation_fn()))
        .collect()
}

/// Look up a generator by name
///
/// # Errors
///
/// Returns `UnknownMethod` for names not in the registry.
pub fn lookup(name: &str) -> Result<TriangulationFn> {
    name.parse::<Method>().map(Method::triangulation_fn)
}
