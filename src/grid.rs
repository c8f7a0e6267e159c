//! Triangular grid indexing and the triangulation arena
//!
//! A grid of subdivision order `n` has one vertex per barycentric position
//! `(i, j, k)` with `i + j + k = n`. Vertices are stored row-major in a
//! single arena: row `i` holds the `n - i + 1` positions `j = 0..=n-i`, and
//! row `i` starts at `i·(2n + 3 − i)/2`. Every component addresses vertices
//! through [`TriangularGrid`] rather than re-deriving that formula.

use glam::DVec3;

use crate::error::{OctantError, Result};

/// The three forward neighbour offsets `(Δi, Δj)` that enumerate every grid
/// edge exactly once
pub const FORWARD_OFFSETS: [(isize, isize); 3] = [(1, -1), (1, 0), (0, 1)];

/// A vertex of the triangular grid in barycentric coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub i: usize,
    pub j: usize,
    pub k: usize,
}

impl GridPos {
    /// Create the position `(i, j, n - i - j)`, or `None` if it is off the grid
    pub fn new(i: usize, j: usize, order: usize) -> Option<Self> {
        let k = order.checked_sub(i)?.checked_sub(j)?;
        Some(Self { i, j, k })
    }

    /// Subdivision order of the grid this position belongs to
    #[inline]
    pub fn order(self) -> usize {
        self.i + self.j + self.k
    }

    /// Step by `(Δi, Δj)`, keeping `i + j + k` fixed
    ///
    /// Returns `None` when any of `i`, `j`, `k` would become negative.
    pub fn offset(self, di: isize, dj: isize) -> Option<Self> {
        let i = self.i.checked_add_signed(di)?;
        let j = self.j.checked_add_signed(dj)?;
        let k = self.k.checked_add_signed(-(di + dj))?;
        Some(Self { i, j, k })
    }

    /// True for the three positions where one coordinate equals `n`
    pub fn is_corner(self) -> bool {
        let n = self.order();
        self.i == n || self.j == n || self.k == n
    }

    /// True when the position lies on one of the three boundary edges
    pub fn is_boundary(self) -> bool {
        self.i == 0 || self.j == 0 || self.k == 0
    }

    /// Parametric coordinates `(t, u)` of this position
    ///
    /// `u = i/n` selects the row and `t = j/(n − i)` the place along it.
    /// Degenerate denominators (the apex, or `n = 0`) map to zero.
    pub fn params(self) -> (f64, f64) {
        let n = self.order();
        let row = n - self.i;
        let u = if n == 0 { 0.0 } else { self.i as f64 / n as f64 };
        let t = if row == 0 { 0.0 } else { self.j as f64 / row as f64 };
        (t, u)
    }

    /// Point on the octahedron face `x + y + z = 1`: `(k, i, j) / n`
    pub fn barycentric(self) -> DVec3 {
        let n = self.order();
        if n == 0 {
            return DVec3::X;
        }
        DVec3::new(self.k as f64, self.i as f64, self.j as f64) / n as f64
    }
}

/// One of the three boundary edges, named by the coordinate that vanishes
/// along it
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// `i = 0`, the arc from `ex` to `ez` in the plane `y = 0`
    I,
    /// `j = 0`, the arc from `ex` to `ey` in the plane `z = 0`
    J,
    /// `k = 0`, the arc from `ez` to `ey` in the plane `x = 0`
    K,
}

impl Boundary {
    pub const ALL: [Boundary; 3] = [Boundary::I, Boundary::J, Boundary::K];

    /// Index (0 = x, 1 = y, 2 = z) of the coordinate that is zero along this edge
    pub fn plane_axis(self) -> usize {
        match self {
            Boundary::I => 1,
            Boundary::J => 2,
            Boundary::K => 0,
        }
    }

    /// The `s`-th vertex along the edge, `0 ≤ s ≤ n`
    pub fn vertex(self, s: usize, order: usize) -> GridPos {
        debug_assert!(s <= order);
        match self {
            Boundary::I => GridPos { i: 0, j: s, k: order - s },
            Boundary::J => GridPos { i: s, j: 0, k: order - s },
            Boundary::K => GridPos { i: s, j: order - s, k: 0 },
        }
    }

    /// The interior-row vertex adjacent to both `vertex(s)` and `vertex(s + 1)`,
    /// `0 ≤ s < n`
    pub fn inner(self, s: usize, order: usize) -> GridPos {
        debug_assert!(s < order);
        match self {
            Boundary::I => GridPos { i: 1, j: s, k: order - s - 1 },
            Boundary::J => GridPos { i: s, j: 1, k: order - s - 1 },
            Boundary::K => GridPos { i: s, j: order - s - 1, k: 1 },
        }
    }

    /// Whether the strip order `vertex(s), outer(s), vertex(s+1)` has to be
    /// reversed to face outward
    pub(crate) fn reversed(self) -> bool {
        !matches!(self, Boundary::J)
    }
}

/// Index arithmetic for a triangular grid of a given subdivision order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriangularGrid {
    order: usize,
}

impl TriangularGrid {
    pub fn new(order: usize) -> Self {
        Self { order }
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// `(n + 1)(n + 2) / 2`
    #[inline]
    pub fn vertex_count(&self) -> usize {
        (self.order + 1) * (self.order + 2) / 2
    }

    /// `n²`: each row `i = 1..=n` contributes `2(n − i) + 1` triangles
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.order * self.order
    }

    /// `3n(n + 1) / 2`
    #[inline]
    pub fn edge_count(&self) -> usize {
        3 * self.order * (self.order + 1) / 2
    }

    /// Offset of the first vertex of row `i`
    #[inline]
    pub fn row_start(&self, i: usize) -> usize {
        i * (2 * self.order + 3 - i) / 2
    }

    /// Number of vertices in row `i`
    #[inline]
    pub fn row_len(&self, i: usize) -> usize {
        self.order - i + 1
    }

    /// Linear index of a position
    #[inline]
    pub fn index(&self, pos: GridPos) -> usize {
        debug_assert_eq!(pos.order(), self.order);
        self.row_start(pos.i) + pos.j
    }

    /// Linear index of `(i, j)`, or `None` if it is off the grid
    pub fn index_of(&self, i: usize, j: usize) -> Option<usize> {
        self.pos(i, j).map(|pos| self.index(pos))
    }

    /// Position `(i, j)` of this grid, or `None` if it is off the grid
    pub fn pos(&self, i: usize, j: usize) -> Option<GridPos> {
        GridPos::new(i, j, self.order)
    }

    /// Inverse of [`index`](Self::index)
    pub fn position_at(&self, index: usize) -> Option<GridPos> {
        if index >= self.vertex_count() {
            return None;
        }
        let mut i = 0;
        while self.row_start(i + 1) <= index {
            i += 1;
        }
        self.pos(i, index - self.row_start(i))
    }

    /// All positions in row-major (arena) order
    pub fn positions(&self) -> impl Iterator<Item = GridPos> {
        let n = self.order;
        (0..=n).flat_map(move |i| (0..=n - i).map(move |j| GridPos { i, j, k: n - i - j }))
    }

    /// All triangles, wound counter-clockwise when seen from outside the sphere
    ///
    /// For every row `i > 0` and every `j`: the "upward" triangle
    /// `(i−1, j), (i, j), (i−1, j+1)`, and when `j > 0` the "downward"
    /// triangle `(i, j), (i−1, j), (i, j−1)`.
    pub fn triangles(&self) -> impl Iterator<Item = [GridPos; 3]> {
        let n = self.order;
        let at = move |i: usize, j: usize| GridPos { i, j, k: n - i - j };
        (1..=n).flat_map(move |i| {
            (0..=n - i).flat_map(move |j| {
                let up = [at(i - 1, j), at(i, j), at(i - 1, j + 1)];
                let down = (j > 0).then(|| [at(i, j), at(i - 1, j), at(i, j - 1)]);
                std::iter::once(up).chain(down)
            })
        })
    }

    /// Every edge exactly once, as `(from, to)` with `to` a forward neighbour
    pub fn edges(&self) -> impl Iterator<Item = (GridPos, GridPos)> + '_ {
        self.positions().flat_map(|from| {
            FORWARD_OFFSETS
                .iter()
                .filter_map(move |&(di, dj)| from.offset(di, dj).map(|to| (from, to)))
        })
    }
}

/// A triangulated grid of points covering the octant
///
/// Points live in one row-major arena addressed through [`TriangularGrid`].
/// Row `i` has exactly `n − i + 1` points and the last row is the apex.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangulation {
    grid: TriangularGrid,
    points: Vec<DVec3>,
}

impl Triangulation {
    /// Build a triangulation by evaluating `f` at every grid position
    pub fn from_fn<F>(order: usize, mut f: F) -> Self
    where
        F: FnMut(GridPos) -> DVec3,
    {
        let grid = TriangularGrid::new(order);
        let points = grid.positions().map(&mut f).collect();
        Self { grid, points }
    }

    /// Build a triangulation from explicit rows
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if there are no rows or row `i` does not
    /// hold exactly `n − i + 1` points.
    pub fn from_rows(rows: Vec<Vec<DVec3>>) -> Result<Self> {
        let order = rows.len().checked_sub(1).ok_or_else(|| {
            OctantError::InvalidArgument("a triangulation needs at least one row".to_string())
        })?;
        let grid = TriangularGrid::new(order);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != grid.row_len(i) {
                return Err(OctantError::InvalidArgument(format!(
                    "row {} has {} points, expected {}",
                    i,
                    row.len(),
                    grid.row_len(i)
                )));
            }
        }
        Ok(Self {
            grid,
            points: rows.into_iter().flatten().collect(),
        })
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.grid.order()
    }

    #[inline]
    pub fn grid(&self) -> &TriangularGrid {
        &self.grid
    }

    /// All points in row-major order
    #[inline]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    #[inline]
    pub fn get(&self, pos: GridPos) -> DVec3 {
        self.points[self.grid.index(pos)]
    }

    /// Point at `(i, j)`, or `None` if it is off the grid
    pub fn at(&self, i: usize, j: usize) -> Option<DVec3> {
        self.grid.index_of(i, j).map(|idx| self.points[idx])
    }

    /// Number of rows, `n + 1`
    #[inline]
    pub fn row_count(&self) -> usize {
        self.order() + 1
    }

    /// Row `i` as a slice of the arena
    pub fn row(&self, i: usize) -> &[DVec3] {
        let start = self.grid.row_start(i);
        &self.points[start..start + self.grid.row_len(i)]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[DVec3]> {
        (0..self.row_count()).map(move |i| self.row(i))
    }

    pub fn to_rows(&self) -> Vec<Vec<DVec3>> {
        self.rows().map(<[DVec3]>::to_vec).collect()
    }

    /// The corners at `k = n`, `i = n` and `j = n`, in that order
    pub fn corners(&self) -> [DVec3; 3] {
        let n = self.order();
        [
            self.get(GridPos { i: 0, j: 0, k: n }),
            self.get(GridPos { i: n, j: 0, k: 0 }),
            self.get(GridPos { i: 0, j: n, k: 0 }),
        ]
    }

    /// Apply `f` to every point, keeping the grid shape
    pub fn map<F>(&self, f: F) -> Self
    where
        F: FnMut(DVec3) -> DVec3,
    {
        Self {
            grid: self.grid,
            points: self.points.iter().copied().map(f).collect(),
        }
    }

    /// Root-mean-square distance between corresponding points of two
    /// triangulations of the same order
    pub fn rms_displacement(&self, other: &Triangulation) -> f64 {
        debug_assert_eq!(self.grid, other.grid);
        let sum: f64 = self
            .points
            .iter()
            .zip(&other.points)
            .map(|(a, b)| a.distance_squared(*b))
            .sum();
        (sum / self.points.len() as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_row_start_closed_form() {
        for n in 0..20 {
            let grid = TriangularGrid::new(n);
            let mut expected = 0;
            for i in 0..=n {
                assert_eq!(grid.row_start(i), expected, "n={} i={}", n, i);
                expected += grid.row_len(i);
            }
            assert_eq!(expected, grid.vertex_count());
            assert_eq!(grid.row_start(n + 1), grid.vertex_count());
        }
    }

    #[test]
    fn test_positions_are_row_major() {
        let grid = TriangularGrid::new(7);
        for (idx, pos) in grid.positions().enumerate() {
            assert_eq!(grid.index(pos), idx);
            assert_eq!(pos.order(), 7);
        }
        assert_eq!(grid.positions().count(), grid.vertex_count());
    }

    #[test]
    fn test_index_bijection_random() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..200 {
            let n = rng.gen_range(0..60);
            let grid = TriangularGrid::new(n);
            let i = rng.gen_range(0..=n);
            let j = rng.gen_range(0..=n - i);
            let idx = grid.index_of(i, j).unwrap();
            assert!(idx < grid.vertex_count());
            let pos = grid.position_at(idx).unwrap();
            assert_eq!((pos.i, pos.j, pos.k), (i, j, n - i - j));
        }
    }

    #[test]
    fn test_out_of_grid_positions() {
        let grid = TriangularGrid::new(3);
        assert!(grid.pos(2, 2).is_none());
        assert!(grid.index_of(4, 0).is_none());
        assert!(grid.position_at(grid.vertex_count()).is_none());

        let pos = grid.pos(0, 3).unwrap();
        assert!(pos.offset(-1, 0).is_none());
        assert!(pos.offset(0, 1).is_none());
        assert_eq!(pos.offset(1, -1), grid.pos(1, 2));
    }

    #[test]
    fn test_degenerate_order_zero() {
        let grid = TriangularGrid::new(0);
        assert_eq!(grid.vertex_count(), 1);
        assert_eq!(grid.triangle_count(), 0);
        assert_eq!(grid.triangles().count(), 0);
        assert_eq!(grid.edges().count(), 0);

        let pos = grid.pos(0, 0).unwrap();
        assert!(pos.is_corner());
        assert_eq!(pos.params(), (0.0, 0.0));
    }

    #[test]
    fn test_triangle_and_edge_counts() {
        for n in 0..15 {
            let grid = TriangularGrid::new(n);
            assert_eq!(grid.triangles().count(), n * n);
            assert_eq!(grid.triangle_count(), n * n);
            assert_eq!(grid.edges().count(), grid.edge_count());
        }
    }

    #[test]
    fn test_edges_are_unique() {
        let grid = TriangularGrid::new(9);
        let mut seen = HashSet::new();
        for (a, b) in grid.edges() {
            let key = if a < b { (a, b) } else { (b, a) };
            assert!(seen.insert(key), "duplicate edge {:?}", key);
        }
    }

    #[test]
    fn test_every_triangle_edge_is_a_grid_edge() {
        let grid = TriangularGrid::new(6);
        let edges: HashSet<_> = grid
            .edges()
            .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        for tri in grid.triangles() {
            for s in 0..3 {
                let (a, b) = (tri[s], tri[(s + 1) % 3]);
                let key = if a < b { (a, b) } else { (b, a) };
                assert!(edges.contains(&key));
            }
        }
    }

    #[test]
    fn test_boundary_vertices_and_inner_row() {
        let n = 5;
        for boundary in Boundary::ALL {
            for s in 0..=n {
                let v = boundary.vertex(s, n);
                assert_eq!(v.order(), n);
                assert!(v.is_boundary());
            }
            for s in 0..n {
                let inner = boundary.inner(s, n);
                let (a, b) = (boundary.vertex(s, n), boundary.vertex(s + 1, n));
                assert_eq!(inner.order(), n);
                // adjacent to both endpoints
                for end in [a, b] {
                    let di = end.i as isize - inner.i as isize;
                    let dj = end.j as isize - inner.j as isize;
                    let is_neighbour = FORWARD_OFFSETS
                        .iter()
                        .any(|&o| o == (di, dj) || o == (-di, -dj));
                    assert!(is_neighbour, "{:?} {:?} {:?}", boundary, inner, end);
                }
            }
        }
    }

    #[test]
    fn test_from_rows_validates_shape() {
        let ok = Triangulation::from_rows(vec![
            vec![DVec3::X, DVec3::Z],
            vec![DVec3::Y],
        ])
        .unwrap();
        assert_eq!(ok.order(), 1);
        assert_eq!(ok.row(1), &[DVec3::Y]);

        let bad = Triangulation::from_rows(vec![vec![DVec3::X], vec![DVec3::Y]]);
        assert!(matches!(bad, Err(OctantError::InvalidArgument(_))));
        assert!(Triangulation::from_rows(Vec::new()).is_err());
    }

    #[test]
    fn test_rows_round_trip_through_arena() {
        let t = Triangulation::from_fn(4, |pos| pos.barycentric());
        let rows = t.to_rows();
        assert_eq!(rows.iter().map(Vec::len).collect::<Vec<_>>(), vec![5, 4, 3, 2, 1]);
        assert_eq!(Triangulation::from_rows(rows).unwrap(), t);
    }

    #[test]
    fn test_barycentric_corners() {
        let t = Triangulation::from_fn(3, |pos| pos.barycentric());
        assert_eq!(t.corners(), [DVec3::X, DVec3::Y, DVec3::Z]);
    }
}
