//! Quality metrics: edge-length statistics, dihedral bend, enclosed volume

use glam::DVec3;
use std::f64::consts::TAU;
use std::fmt;

use crate::grid::{Boundary, GridPos, Triangulation};
use crate::mesh::{outer_vertex, AdjacencyMode};

/// Volume of one eighth of the unit ball, `τ/12`
pub const OCTANT_VOLUME: f64 = TAU / 12.0;

/// Edges whose bend is within this of the maximum count as maximal
pub const BEND_TIE_TOLERANCE: f64 = 1e-7;

/// Running statistics over edge lengths
///
/// Only the count, sum, sum of squares and extremes are kept, so pushing is
/// `O(1)` and no lengths are stored.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeStats {
    count: usize,
    sum: f64,
    sum_squares: f64,
    min: f64,
    max: f64,
}

impl Default for EdgeStats {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_squares: 0.0,
            min: f64::INFINITY,
            max: 0.0,
        }
    }
}

impl EdgeStats {
    pub fn push(&mut self, length: f64) {
        self.count += 1;
        self.sum += length;
        self.sum_squares += length * length;
        self.min = self.min.min(length);
        self.max = self.max.max(length);
    }

    /// Number of lengths pushed so far
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.sum / self.count as f64
    }

    /// Population standard deviation, `√(E[d²] − E[d]²)`
    pub fn std_dev(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_squares / self.count as f64 - mean * mean).max(0.0).sqrt()
    }

    /// Standard deviation as a percentage of the mean
    pub fn std_dev_percent(&self) -> f64 {
        let mean = self.mean();
        if mean == 0.0 {
            return 0.0;
        }
        100.0 * self.std_dev() / mean
    }

    pub fn min(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.min
        }
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

/// Length statistics over every grid edge
pub fn edge_stats(triangulation: &Triangulation) -> EdgeStats {
    let mut stats = EdgeStats::default();
    for (from, to) in triangulation.grid().edges() {
        stats.push(triangulation.get(from).distance(triangulation.get(to)));
    }
    stats
}

/// The vertex opposite an edge in one of its two triangles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wing {
    /// A vertex of the grid itself
    Grid(GridPos),
    /// The `s`-th outer vertex beyond a boundary
    Outer(Boundary, usize),
}

/// Opposite vertices `(left, right)` of the forward edge `from → to`
///
/// The left triangle `(from, to, left)` and the right triangle
/// `(to, from, right)` are both wound outward. A wing that would fall off
/// the grid is replaced by the outer vertex of the boundary the edge lies on:
/// `i < 0` past the `i = 0` edge, `j < 0` past `j = 0`, and `i + j > n`
/// past `k = 0`. Returns `None` if `to` is not a forward neighbour of `from`.
pub fn edge_wings(from: GridPos, to: GridPos) -> Option<(Wing, Wing)> {
    let offset = (to.i as isize - from.i as isize, to.j as isize - from.j as isize);
    let (left, right) = match offset {
        (1, 0) => ((0, 1), (1, -1)),
        (1, -1) => ((1, 0), (0, -1)),
        (0, 1) => ((-1, 1), (1, 0)),
        _ => return None,
    };
    Some((wing(from, left), wing(from, right)))
}

fn wing(from: GridPos, (di, dj): (isize, isize)) -> Wing {
    if let Some(pos) = from.offset(di, dj) {
        return Wing::Grid(pos);
    }
    let n = from.order() as isize;
    let (i, j) = (from.i as isize + di, from.j as isize + dj);
    if i < 0 {
        Wing::Outer(Boundary::I, from.j)
    } else if j < 0 {
        Wing::Outer(Boundary::J, from.i)
    } else {
        debug_assert!(i + j > n);
        Wing::Outer(Boundary::K, from.i)
    }
}

fn wing_position(triangulation: &Triangulation, wing: Wing, mode: AdjacencyMode) -> DVec3 {
    match wing {
        Wing::Grid(pos) => triangulation.get(pos),
        Wing::Outer(boundary, s) => outer_vertex(triangulation, boundary, s, mode),
    }
}

/// A grid edge with its length and bend
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BentEdge {
    pub from: (usize, usize),
    pub to: (usize, usize),
    pub length: f64,
    /// Supplement of the dihedral angle, in radians; 0 for a planar joint
    pub bend: f64,
}

/// Bend of the joint between triangles `(a, b, left)` and `(b, a, right)`
pub fn bend_angle(a: DVec3, b: DVec3, left: DVec3, right: DVec3) -> f64 {
    let n_left = (b - a).cross(left - a).normalize_or_zero();
    let n_right = (a - b).cross(right - b).normalize_or_zero();
    if n_left == DVec3::ZERO || n_right == DVec3::ZERO {
        return 0.0;
    }
    n_left.dot(n_right).clamp(-1.0, 1.0).acos()
}

/// Every grid edge with its bend, sorted by bend descending
///
/// Boundary edges are bent against the adjacent-patch continuation chosen
/// by `mode`.
///
/// # Example
///
/// ```
/// use octant_sphere::metrics::edge_bends;
/// use octant_sphere::{AdjacencyMode, Method};
///
/// let t = Method::SineBased.generate(3);
/// let bends = edge_bends(&t, AdjacencyMode::Sphere);
/// assert_eq!(bends.len(), 18);
/// assert!(bends.windows(2).all(|w| w[0].bend >= w[1].bend));
/// println!("most bent: {:?} -> {:?}", bends[0].from, bends[0].to);
/// ```
pub fn edge_bends(triangulation: &Triangulation, mode: AdjacencyMode) -> Vec<BentEdge> {
    let mut bends: Vec<BentEdge> = triangulation
        .grid()
        .edges()
        .filter_map(|(from, to)| {
            let (left, right) = edge_wings(from, to)?;
            let (a, b) = (triangulation.get(from), triangulation.get(to));
            Some(BentEdge {
                from: (from.i, from.j),
                to: (to.i, to.j),
                length: a.distance(b),
                bend: bend_angle(
                    a,
                    b,
                    wing_position(triangulation, left, mode),
                    wing_position(triangulation, right, mode),
                ),
            })
        })
        .collect();
    bends.sort_by(|x, y| y.bend.total_cmp(&x.bend));
    bends
}

/// Signed volume between the patch and the origin, `Σ a·(b×c)/6`
pub fn volume(triangulation: &Triangulation) -> f64 {
    triangulation
        .grid()
        .triangles()
        .map(|tri| {
            let [a, b, c] = tri.map(|pos| triangulation.get(pos));
            a.dot(b.cross(c)) / 6.0
        })
        .sum()
}

/// [`volume`] relative to the true octant volume
pub fn volume_fraction(triangulation: &Triangulation) -> f64 {
    volume(triangulation) / OCTANT_VOLUME
}

/// All metrics of one triangulation
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub edge_count: usize,
    pub mean_edge_length: f64,
    pub std_dev_edge_length: f64,
    pub min_edge_length: f64,
    pub max_edge_length: f64,
    /// Largest bend in radians
    pub max_bend_angle: f64,
    /// Every edge whose bend ties the maximum
    pub bent_edges: Vec<BentEdge>,
    pub volume_fraction: f64,
}

impl QualityReport {
    pub fn std_dev_percent(&self) -> f64 {
        if self.mean_edge_length == 0.0 {
            return 0.0;
        }
        100.0 * self.std_dev_edge_length / self.mean_edge_length
    }

    pub fn volume_percent(&self) -> f64 {
        100.0 * self.volume_fraction
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "edges: {}", self.edge_count)?;
        writeln!(
            f,
            "edge length: {:.6} ± {:.6} ({:.3}%)",
            self.mean_edge_length,
            self.std_dev_edge_length,
            self.std_dev_percent()
        )?;
        writeln!(
            f,
            "edge range: {:.6} .. {:.6}",
            self.min_edge_length, self.max_edge_length
        )?;
        writeln!(
            f,
            "max bend: {:.4}° ({} edge{})",
            self.max_bend_angle.to_degrees(),
            self.bent_edges.len(),
            if self.bent_edges.len() == 1 { "" } else { "s" }
        )?;
        write!(f, "volume: {:.4}% of τ/12", self.volume_percent())
    }
}

/// Compute every metric for a triangulation
pub fn quality_report(triangulation: &Triangulation, mode: AdjacencyMode) -> QualityReport {
    let stats = edge_stats(triangulation);
    let bends = edge_bends(triangulation, mode);
    let max_bend_angle = bends.first().map_or(0.0, |edge| edge.bend);
    let bent_edges = bends
        .into_iter()
        .take_while(|edge| edge.bend >= max_bend_angle - BEND_TIE_TOLERANCE)
        .collect();

    QualityReport {
        edge_count: stats.count(),
        mean_edge_length: stats.mean(),
        std_dev_edge_length: stats.std_dev(),
        min_edge_length: stats.min(),
        max_edge_length: stats.max(),
        max_bend_angle,
        bent_edges,
        volume_fraction: volume_fraction(triangulation),
    }
}
