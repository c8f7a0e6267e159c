//! Spatial indexing for fast position-to-vertex lookups
//!
//! This module is only available with the `spatial-index` feature.

#[cfg(feature = "spatial-index")]
use kiddo::immutable::float::kdtree::ImmutableKdTree;
#[cfg(feature = "spatial-index")]
use kiddo::SquaredEuclidean;
#[cfg(feature = "spatial-index")]
use glam::DVec3;

#[cfg(feature = "spatial-index")]
use crate::grid::{GridPos, Triangulation, TriangularGrid};

/// Wrapper around KD-tree for nearest-vertex queries
///
/// Maps a 3D position picked by a display layer (a ray hit, a cursor
/// projected onto the sphere) back to the grid position of the closest
/// vertex.
///
/// # Performance
///
/// - Construction: O(v log v) for `v = (n + 1)(n + 2)/2` vertices
/// - Query: O(log v)
#[cfg(feature = "spatial-index")]
#[derive(Clone)]
pub struct SpatialIndex {
    grid: TriangularGrid,
    tree: ImmutableKdTree<f64, usize, 3, 32>,
}

#[cfg(feature = "spatial-index")]
impl SpatialIndex {
    /// Build a spatial index over the vertices of a triangulation
    ///
    /// # Example
    ///
    /// ```
    /// use octant_sphere::*;
    ///
    /// # #[cfg(feature = "spatial-index")]
    /// # {
    /// let t = Method::Geodesics.generate(2);
    /// let index = SpatialIndex::new(&t);
    /// let pos = index.find_nearest(DVec3::new(0.9, 0.1, 0.0));
    /// assert_eq!((pos.i, pos.j, pos.k), (0, 0, 2)); // the ex corner
    /// # }
    /// ```
    pub fn new(triangulation: &Triangulation) -> Self {
        let points: Vec<[f64; 3]> = triangulation
            .points()
            .iter()
            .map(|p| p.to_array())
            .collect();

        Self {
            grid: *triangulation.grid(),
            tree: ImmutableKdTree::new_from_slice(&points),
        }
    }

    /// Grid position of the vertex nearest to `position`
    pub fn find_nearest(&self, position: DVec3) -> GridPos {
        let query = position.to_array();
        let result = self.tree.nearest_one::<SquaredEuclidean>(&query);
        // Items are arena indices, which are always on the grid
        self.grid
            .position_at(result.item)
            .unwrap_or(GridPos { i: 0, j: 0, k: self.grid.order() })
    }
}

#[cfg(test)]
#[cfg(feature = "spatial-index")]
mod tests {
    use super::*;
    use crate::generation::{balanced, geodesics};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn brute_force_distance(t: &Triangulation, query: DVec3) -> f64 {
        t.points()
            .iter()
            .map(|p| p.distance_squared(query))
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn test_spatial_index_corners() {
        let t = geodesics(6);
        let index = SpatialIndex::new(&t);

        let pos = index.find_nearest(DVec3::new(0.95, 0.05, 0.0));
        assert_eq!((pos.i, pos.j, pos.k), (0, 0, 6));

        let pos = index.find_nearest(DVec3::new(0.02, 0.99, 0.02));
        assert_eq!((pos.i, pos.j, pos.k), (6, 0, 0));

        let pos = index.find_nearest(DVec3::new(0.02, 0.02, 0.99));
        assert_eq!((pos.i, pos.j, pos.k), (0, 6, 0));
    }

    #[test]
    fn test_spatial_index_exact_match() {
        let t = balanced(5);
        let index = SpatialIndex::new(&t);

        // Query at exact vertex positions
        for pos in t.grid().positions() {
            assert_eq!(index.find_nearest(t.get(pos)), pos);
        }
    }

    #[test]
    fn test_spatial_index_matches_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for n in [2, 4, 6, 30] {
            let t = geodesics(n);
            let index = SpatialIndex::new(&t);
            for _ in 0..200 {
                let query = DVec3::new(
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(0.0..1.0),
                )
                .normalize_or_zero();
                let found = index.find_nearest(query);
                // Compare distances, mirror-image vertices can tie
                let d = t.get(found).distance_squared(query);
                let best = brute_force_distance(&t, query);
                assert!(d - best < 1e-12, "n={} query {:?} got {:?}", n, query, found);
            }
        }
    }
}
