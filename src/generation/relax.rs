//! Relaxation balancing for near-uniform edge lengths
//!
//! Each pass moves every non-corner vertex to the spherical mean of its
//! neighbours: the six surrounding vertices for interior points, the two
//! neighbours along the edge for boundary points. Corners stay fixed. Every
//! pass produces a new snapshot from the previous one, so the seed handed in
//! by the caller is never touched.

use glam::DVec3;
use log::{debug, warn};
use std::time::Instant;

use crate::error::{OctantError, Result};
use crate::generation::parametric::sine_based;
use crate::grid::{GridPos, Triangulation};

/// All six lattice directions around an interior vertex
const INTERIOR_OFFSETS: [(isize, isize); 6] = [(1, -1), (1, 0), (0, 1), (-1, 1), (-1, 0), (0, -1)];

/// Options for the relaxation balancer
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxationOptions {
    /// Maximum number of passes to run
    pub max_iterations: usize,
    /// Stop once the RMS displacement of a pass drops below this value.
    /// Set to 0.0 to always run every pass.
    pub convergence_threshold: f64,
}

impl Default for RelaxationOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_threshold: 1e-8,
        }
    }
}

impl RelaxationOptions {
    /// # Errors
    ///
    /// Returns `InvalidArgument` for a zero pass budget or a negative
    /// (or NaN) threshold.
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(OctantError::InvalidArgument(
                "relaxation needs at least one iteration".to_string(),
            ));
        }
        if self.convergence_threshold.is_nan() || self.convergence_threshold < 0.0 {
            return Err(OctantError::InvalidArgument(format!(
                "relaxation threshold must be >= 0 (got {})",
                self.convergence_threshold
            )));
        }
        Ok(())
    }
}

/// What happened during a relaxation run
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelaxationReport {
    pub iterations: usize,
    pub converged: bool,
    /// RMS point displacement of each pass, in order
    pub displacement_history: Vec<f64>,
}

impl RelaxationReport {
    pub fn final_displacement(&self) -> Option<f64> {
        self.displacement_history.last().copied()
    }
}

/// `balanced` triangulation: the `sineBased` grid relaxed with default options
pub fn balanced(n: usize) -> Triangulation {
    relax(&sine_based(n))
}

/// Relax a seed triangulation with default options
pub fn relax(seed: &Triangulation) -> Triangulation {
    relax_with_options(seed, &RelaxationOptions::default()).0
}

/// Relax a seed triangulation until the RMS displacement of a pass falls
/// below the threshold or the pass budget runs out
///
/// Never fails: when the budget is exhausted a warning is logged and the
/// last snapshot is returned.
///
/// # Example
///
/// ```
/// use octant_sphere::generation::{relax_with_options, sine_based, RelaxationOptions};
///
/// let options = RelaxationOptions {
///     max_iterations: 10,
///     convergence_threshold: 0.0,
/// };
/// let (relaxed, report) = relax_with_options(&sine_based(6), &options);
/// assert_eq!(relaxed.order(), 6);
/// assert_eq!(report.iterations, 10);
/// assert_eq!(report.displacement_history.len(), 10);
/// assert!(!report.converged);
/// ```
pub fn relax_with_options(
    seed: &Triangulation,
    options: &RelaxationOptions,
) -> (Triangulation, RelaxationReport) {
    let total_start = Instant::now();
    let mut report = RelaxationReport::default();
    let mut current = seed.clone();

    debug!(
        "[relax] starting: order {}, {} vertices, max {} iterations, threshold {:.1e}",
        seed.order(),
        seed.points().len(),
        options.max_iterations,
        options.convergence_threshold
    );

    for iteration in 0..options.max_iterations {
        let iter_start = Instant::now();
        let next = relax_step(&current);
        let displacement = next.rms_displacement(&current);
        current = next;
        report.iterations = iteration + 1;
        report.displacement_history.push(displacement);

        debug!(
            "[relax] iter {}: rms_disp={:.3e}, took {:?}",
            iteration + 1,
            displacement,
            iter_start.elapsed()
        );

        if displacement < options.convergence_threshold {
            report.converged = true;
            break;
        }
    }

    if report.converged {
        debug!(
            "[relax] converged after {} iterations in {:?}",
            report.iterations,
            total_start.elapsed()
        );
    } else {
        warn!(
            "relaxation of order {} did not converge after {} iterations (rms displacement {:.3e})",
            seed.order(),
            report.iterations,
            report.final_displacement().unwrap_or(0.0)
        );
    }

    (current, report)
}

/// One Jacobi pass: every new position is computed from the previous snapshot
fn relax_step(previous: &Triangulation) -> Triangulation {
    Triangulation::from_fn(previous.order(), |pos| relaxed_position(previous, pos))
}

fn relaxed_position(grid: &Triangulation, pos: GridPos) -> DVec3 {
    let current = grid.get(pos);
    if pos.is_corner() {
        return current;
    }
    let offsets: &[(isize, isize)] = if pos.i == 0 {
        &[(0, -1), (0, 1)]
    } else if pos.j == 0 {
        &[(-1, 0), (1, 0)]
    } else if pos.k == 0 {
        &[(-1, 1), (1, -1)]
    } else {
        &INTERIOR_OFFSETS
    };
    let sum: DVec3 = offsets
        .iter()
        .filter_map(|&(di, dj)| pos.offset(di, dj))
        .map(|neighbour| grid.get(neighbour))
        .sum();
    let mean = sum.normalize_or_zero();
    if mean == DVec3::ZERO {
        current
    } else {
        mean
    }
}

/// Densify each row of a triangulation by slerping every segment into
/// `refinement` pieces
pub(crate) fn densify_rows(triangulation: &Triangulation, refinement: usize) -> Vec<Vec<DVec3>> {
    triangulation
        .rows()
        .map(|row| {
            let mut dense = Vec::with_capacity((row.len() - 1) * refinement + 1);
            for pair in row.windows(2) {
                for s in 0..refinement {
                    dense.push(pair[0].slerp(pair[1], s as f64 / refinement as f64));
                }
            }
            dense.extend(row.last().copied());
            dense
        })
        .collect()
}
