//! Synthetic continuation geometry beyond the three boundary edges

use glam::DVec3;
use std::fmt;
use std::str::FromStr;

use crate::error::OctantError;
use crate::grid::{Boundary, Triangulation};

/// How the surface is continued past a boundary edge
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AdjacencyMode {
    /// Mirror the first interior row across the boundary plane
    #[default]
    Sphere,
    /// Mirror, then push out radially onto the cylinder around the
    /// boundary plane's normal axis
    Cylinder,
}

impl AdjacencyMode {
    pub const ALL: [AdjacencyMode; 2] = [AdjacencyMode::Sphere, AdjacencyMode::Cylinder];

    pub fn name(self) -> &'static str {
        match self {
            AdjacencyMode::Sphere => "sphere",
            AdjacencyMode::Cylinder => "cylinder",
        }
    }
}

impl fmt::Display for AdjacencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AdjacencyMode {
    type Err = OctantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AdjacencyMode::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| OctantError::InvalidArgument(format!("unknown adjacency mode: {}", s)))
    }
}

/// The `s`-th outer vertex beyond `boundary`, sitting across the edge from
/// the interior vertex shared by boundary vertices `s` and `s + 1`
pub fn outer_vertex(
    triangulation: &Triangulation,
    boundary: Boundary,
    s: usize,
    mode: AdjacencyMode,
) -> DVec3 {
    let axis = boundary.plane_axis();
    let mut mirrored = triangulation.get(boundary.inner(s, triangulation.order()));
    mirrored[axis] = -mirrored[axis];
    match mode {
        AdjacencyMode::Sphere => mirrored,
        AdjacencyMode::Cylinder => {
            let mut radial = mirrored;
            radial[axis] = 0.0;
            match radial.try_normalize() {
                Some(mut projected) => {
                    projected[axis] = mirrored[axis];
                    projected
                }
                None => mirrored,
            }
        }
    }
}

fn outer_normal(position: DVec3, axis: usize, mode: AdjacencyMode) -> DVec3 {
    match mode {
        AdjacencyMode::Sphere => position.normalize_or_zero(),
        AdjacencyMode::Cylinder => {
            let mut radial = position;
            radial[axis] = 0.0;
            radial.normalize_or_zero()
        }
    }
}

/// Strip of `2n + 1` vertices alternating boundary and outer vertices
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacentPatch {
    pub boundary: Boundary,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl AdjacentPatch {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build the continuation strip for one boundary edge
///
/// Even strip slots hold boundary vertices, odd slots the outer vertices.
/// Triangles are wound to face outward like the main patch.
pub fn build_adjacent_patch(
    triangulation: &Triangulation,
    boundary: Boundary,
    mode: AdjacencyMode,
) -> AdjacentPatch {
    let n = triangulation.order();
    let axis = boundary.plane_axis();

    let mut strip = Vec::with_capacity(2 * n + 1);
    for s in 0..=n {
        strip.push(triangulation.get(boundary.vertex(s, n)));
        if s < n {
            strip.push(outer_vertex(triangulation, boundary, s, mode));
        }
    }

    let mut indices = Vec::with_capacity(3 * (2 * n).saturating_sub(1));
    let mut push = |a: usize, b: usize, c: usize| {
        let (b, c) = if boundary.reversed() { (c, b) } else { (b, c) };
        indices.extend([a as u32, b as u32, c as u32]);
    };
    for s in 0..n {
        push(2 * s, 2 * s + 1, 2 * s + 2);
        if s + 1 < n {
            push(2 * s + 1, 2 * s + 3, 2 * s + 2);
        }
    }

    AdjacentPatch {
        boundary,
        positions: strip.iter().map(|p| p.as_vec3().to_array()).collect(),
        normals: strip
            .iter()
            .map(|p| outer_normal(*p, axis, mode).as_vec3().to_array())
            .collect(),
        indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::parametric::{flat, geodesics};
    use approx::assert_abs_diff_eq;
    use glam::Vec3;

    fn triangle_normals(patch: &AdjacentPatch) -> Vec<(Vec3, Vec3)> {
        patch
            .indices
            .chunks(3)
            .map(|tri| {
                let [a, b, c] =
                    [0, 1, 2].map(|s| Vec3::from_array(patch.positions[tri[s] as usize]));
                ((b - a).cross(c - a), (a + b + c) / 3.0)
            })
            .collect()
    }

    #[test]
    fn test_strip_sizes() {
        for n in 0..6 {
            let t = geodesics(n);
            for boundary in Boundary::ALL {
                let patch = build_adjacent_patch(&t, boundary, AdjacencyMode::Sphere);
                assert_eq!(patch.positions.len(), 2 * n + 1);
                assert_eq!(patch.normals.len(), 2 * n + 1);
                assert_eq!(patch.triangle_count(), (2 * n).saturating_sub(1));
                assert!(patch.indices.iter().all(|&i| (i as usize) < 2 * n + 1));
            }
        }
    }

    #[test]
    fn test_strips_face_outward() {
        for mode in AdjacencyMode::ALL {
            let t = geodesics(5);
            for boundary in Boundary::ALL {
                let patch = build_adjacent_patch(&t, boundary, mode);
                for (normal, centroid) in triangle_normals(&patch) {
                    assert!(normal.dot(centroid) > 0.0, "{:?} {:?}", boundary, mode);
                }
            }
        }
    }

    #[test]
    fn test_sphere_outer_vertices_are_mirror_images() {
        let t = geodesics(4);
        let outer = outer_vertex(&t, Boundary::I, 2, AdjacencyMode::Sphere);
        let inner = t.at(1, 2).unwrap();
        assert_eq!(outer, DVec3::new(inner.x, -inner.y, inner.z));
        assert_abs_diff_eq!(outer.length(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_cylinder_outer_vertices_on_cylinder() {
        let t = geodesics(6);
        for boundary in Boundary::ALL {
            let axis = boundary.plane_axis();
            for s in 0..6 {
                let p = outer_vertex(&t, boundary, s, AdjacencyMode::Cylinder);
                let mut radial = p;
                radial[axis] = 0.0;
                assert_abs_diff_eq!(radial.length(), 1.0, epsilon = 1e-12);
                assert!(p[axis] < 0.0);
            }
        }
    }

    #[test]
    fn test_cylinder_normals_are_horizontal() {
        let t = geodesics(3);
        let patch = build_adjacent_patch(&t, Boundary::J, AdjacencyMode::Cylinder);
        for normal in &patch.normals {
            assert_eq!(normal[2], 0.0);
            assert_abs_diff_eq!(Vec3::from_array(*normal).length(), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_flat_patch_mirrors_stay_finite() {
        let t = flat(3);
        for mode in AdjacencyMode::ALL {
            for boundary in Boundary::ALL {
                let patch = build_adjacent_patch(&t, boundary, mode);
                assert!(patch.positions.iter().flatten().all(|c| c.is_finite()));
            }
        }
    }

    #[test]
    fn test_adjacency_mode_from_str() {
        assert_eq!("sphere".parse::<AdjacencyMode>().unwrap(), AdjacencyMode::Sphere);
        assert_eq!("cylinder".parse::<AdjacencyMode>().unwrap(), AdjacencyMode::Cylinder);
        assert!("cone".parse::<AdjacencyMode>().is_err());
    }
}
