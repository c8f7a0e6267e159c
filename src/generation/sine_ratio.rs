//! Sine-ratio solver behind the `asinBased` generator
//!
//! For a target `p` on the octahedron face (coordinates summing to one) the
//! solver looks for a unit vector `g` whose coordinate-wise arcsines, scaled
//! to sum to one, reproduce `p`. In other words the angular distances of `g`
//! from the three coordinate planes stand in the same ratio as the
//! barycentric coordinates of `p`.

use glam::DVec3;
use log::warn;

use crate::error::{OctantError, Result};
use crate::generation::parametric::{flat_at, sample_rows};
use crate::grid::Triangulation;
use crate::math::{asin_components, barycentric_normalize, sine_warp};

/// Options for the sine-ratio fixed-point iteration
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Maximum number of update steps before giving up
    pub max_iterations: usize,
    /// Converged once the angle offset is shorter than this
    pub tolerance: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            tolerance: 1e-10,
        }
    }
}

impl SolverOptions {
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero iteration budget or a
    /// non-positive tolerance.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(OctantError::InvalidArgument(
                "solver needs at least one iteration".to_string(),
            ));
        }
        if self.tolerance.is_nan() || self.tolerance <= 0.0 {
            return Err(OctantError::InvalidArgument(format!(
                "solver tolerance must be positive (got {})",
                self.tolerance
            )));
        }
        Ok(())
    }
}

/// Outcome of solving one grid point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SineRatioSolution {
    /// Best estimate on the unit sphere
    pub point: DVec3,
    /// Update steps taken
    pub iterations: usize,
    /// Length of the final angle offset
    pub residual: f64,
    pub converged: bool,
}

/// Aggregate over every point solved for one grid
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SolverReport {
    pub points: usize,
    pub unconverged: usize,
    pub max_iterations: usize,
    pub worst_residual: f64,
}

impl SolverReport {
    fn record(&mut self, solution: &SineRatioSolution) {
        self.points += 1;
        if !solution.converged {
            self.unconverged += 1;
        }
        self.max_iterations = self.max_iterations.max(solution.iterations);
        self.worst_residual = self.worst_residual.max(solution.residual);
    }

    pub fn converged(&self) -> bool {
        self.unconverged == 0
    }

    fn warn_if_unconverged(&self) {
        if !self.converged() {
            warn!(
                "sine-ratio solver did not converge for {} of {} points (worst residual {:.3e})",
                self.unconverged, self.points, self.worst_residual
            );
        }
    }
}

/// Solve a single target, logging a warning if it does not converge
pub fn solve_sine_ratio(target: DVec3, options: &SolverOptions) -> SineRatioSolution {
    let solution = iterate(target, options);
    if !solution.converged {
        warn!(
            "sine-ratio solver did not converge for {:?} after {} iterations (residual {:.3e})",
            target, solution.iterations, solution.residual
        );
    }
    solution
}

fn iterate(target: DVec3, options: &SolverOptions) -> SineRatioSolution {
    let target = barycentric_normalize(target);
    // The sine warp already solves the problem exactly along the edges
    let mut g = sine_warp(target).normalize_or_zero();
    let mut iterations = 0;
    loop {
        let offset = barycentric_normalize(asin_components(g)) - target;
        let residual = offset.length();
        if residual < options.tolerance || iterations == options.max_iterations {
            return SineRatioSolution {
                point: g,
                iterations,
                residual,
                converged: residual < options.tolerance,
            };
        }
        g = (barycentric_normalize(g) - offset).normalize_or_zero();
        iterations += 1;
    }
}

/// `asinBased` triangulation with default solver options
pub fn asin_based(n: usize) -> Triangulation {
    asin_based_with_options(n, &SolverOptions::default()).0
}

/// `asinBased` triangulation, returning a summary of the solver runs
pub fn asin_based_with_options(n: usize, options: &SolverOptions) -> (Triangulation, SolverReport) {
    let mut report = SolverReport::default();
    let triangulation = Triangulation::from_fn(n, |pos| {
        let (t, u) = pos.params();
        let solution = iterate(flat_at(t, u), options);
        report.record(&solution);
        solution.point
    });
    report.warn_if_unconverged();
    (triangulation, report)
}

/// Refined rows of the `asinBased` parametrisation
pub(crate) fn asin_rows(n: usize, refinement: usize, options: &SolverOptions) -> Vec<Vec<DVec3>> {
    let mut report = SolverReport::default();
    let rows = sample_rows(n, refinement, |t, u| {
        let solution = iterate(flat_at(t, u), options);
        report.record(&solution);
        solution.point
    });
    report.warn_if_unconverged();
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn angle_ratio(g: DVec3) -> DVec3 {
        barycentric_normalize(asin_components(g))
    }

    #[test]
    fn test_solver_options_default() {
        let options = SolverOptions::default();
        assert_eq!(options.max_iterations, 30);
        assert_eq!(options.tolerance, 1e-10);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_solver_options_validation() {
        let zero = SolverOptions {
            max_iterations: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
        let negative = SolverOptions {
            tolerance: -1.0,
            ..Default::default()
        };
        assert!(negative.validate().is_err());
        let nan = SolverOptions {
            tolerance: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_edge_targets_converge_immediately() {
        let options = SolverOptions::default();
        for step in 0..=10 {
            let a = step as f64 / 10.0;
            let solution = solve_sine_ratio(DVec3::new(a, 1.0 - a, 0.0), &options);
            assert!(solution.converged);
            assert!(solution.iterations <= 1);
        }
    }

    #[test]
    fn test_centre_target() {
        let solution = solve_sine_ratio(DVec3::splat(1.0 / 3.0), &SolverOptions::default());
        assert!(solution.converged);
        let expected = DVec3::ONE.normalize();
        assert!(solution.point.abs_diff_eq(expected, 1e-9));
    }

    #[test]
    fn test_random_targets_converge() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let options = SolverOptions::default();
        for _ in 0..100 {
            let target = barycentric_normalize(DVec3::new(
                rng.gen_range(0.01..1.0),
                rng.gen_range(0.01..1.0),
                rng.gen_range(0.01..1.0),
            ));
            let solution = solve_sine_ratio(target, &options);
            assert!(solution.converged, "{:?}: {:?}", target, solution);
            assert_abs_diff_eq!(solution.point.length(), 1.0, epsilon = 1e-12);
            assert!(angle_ratio(solution.point).abs_diff_eq(target, 1e-9));
        }
    }

    #[test]
    fn test_budget_exhaustion_returns_estimate() {
        let options = SolverOptions { max_iterations: 1, tolerance: 1e-300 };
        let solution = solve_sine_ratio(DVec3::new(0.5, 0.3, 0.2), &options);
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 1);
        assert!(solution.point.is_finite());
        assert_abs_diff_eq!(solution.point.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_asin_based_grid() {
        let n = 10;
        let (t, report) = asin_based_with_options(n, &SolverOptions::default());
        assert!(report.converged());
        assert_eq!(report.points, t.grid().vertex_count());
        for pos in t.grid().positions() {
            let p = t.get(pos);
            assert_abs_diff_eq!(p.length(), 1.0, epsilon = 1e-9);
            assert!(angle_ratio(p).abs_diff_eq(pos.barycentric(), 1e-8), "{:?}", pos);
        }
        assert_eq!(t.corners(), [DVec3::X, DVec3::Y, DVec3::Z]);
    }

    #[test]
    fn test_asin_rows_match_grid() {
        let rows = asin_rows(4, 1, &SolverOptions::default());
        let grid = asin_based(4);
        for (row, expected) in rows.iter().zip(grid.rows()) {
            assert_eq!(row.len(), expected.len());
            for (a, b) in row.iter().zip(expected) {
                assert_eq!(a, b);
            }
        }
    }
}
