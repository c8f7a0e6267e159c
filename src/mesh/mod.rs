//! Mesh buffers for a finished triangulation
//!
//! Produces engine-agnostic vertex and index buffers:
//! - Bevy: Convert to `Mesh` with attributes
//! - three.js / WebGL: Upload as `BufferGeometry` attributes
//! - wgpu: Use directly as vertex buffers

mod adjacent;

pub use adjacent::{build_adjacent_patch, outer_vertex, AdjacencyMode, AdjacentPatch};

use glam::{DVec3, Vec3};

use crate::grid::{Boundary, Triangulation};

/// Vertex and index buffers of one octant patch
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions, one per grid position in row-major order
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals, present for smooth shading only
    pub normals: Option<Vec<[f32; 3]>>,
    /// Texture coordinates on the skewed triangular layout
    pub uvs: Vec<[f32; 2]>,
    /// Triangle indices, counter-clockwise seen from outside
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Check if mesh is empty
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Unshare vertices so every triangle gets its own face normal
    pub fn to_flat_shaded(&self) -> MeshData {
        let mut mesh = MeshData {
            normals: Some(Vec::with_capacity(self.indices.len())),
            ..Default::default()
        };
        for tri in self.indices.chunks_exact(3) {
            let corners = [0, 1, 2].map(|s| Vec3::from_array(self.positions[tri[s] as usize]));
            let normal = (corners[1] - corners[0])
                .cross(corners[2] - corners[0])
                .normalize_or_zero()
                .to_array();
            for &idx in tri {
                mesh.indices.push(mesh.positions.len() as u32);
                mesh.positions.push(self.positions[idx as usize]);
                mesh.uvs.push(self.uvs[idx as usize]);
                if let Some(normals) = mesh.normals.as_mut() {
                    normals.push(normal);
                }
            }
        }
        mesh
    }
}

/// The main patch plus its three boundary continuation strips
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct OctantMesh {
    pub patch: MeshData,
    /// One strip per boundary, in the order of [`Boundary::ALL`]
    pub adjacent: [AdjacentPatch; 3],
}

/// Build render buffers for a triangulation and its adjacent strips
///
/// # Example
///
/// ```
/// use octant_sphere::{build_octant_mesh, AdjacencyMode, Method};
///
/// let t = Method::Geodesics.generate(4);
/// let mesh = build_octant_mesh(&t, true, AdjacencyMode::Cylinder);
/// assert_eq!(mesh.patch.vertex_count(), 15);
/// assert_eq!(mesh.patch.triangle_count(), 16);
///
/// // Each strip alternates boundary and outer vertices
/// for strip in &mesh.adjacent {
///     assert_eq!(strip.positions.len(), 9);
///     assert_eq!(strip.triangle_count(), 7);
/// }
/// ```
pub fn build_octant_mesh(
    triangulation: &Triangulation,
    smooth: bool,
    adjacency: AdjacencyMode,
) -> OctantMesh {
    OctantMesh {
        patch: build_mesh(triangulation, smooth),
        adjacent: Boundary::ALL
            .map(|boundary| build_adjacent_patch(triangulation, boundary, adjacency)),
    }
}

/// Build the vertex and index buffers of the main patch
///
/// Normals are the normalised positions, which is exact for every generator
/// whose points lie on the unit sphere.
pub fn build_mesh(triangulation: &Triangulation, smooth: bool) -> MeshData {
    let grid = triangulation.grid();
    let n = grid.order();
    let scale = if n == 0 { 0.0 } else { 1.0 / n as f32 };

    let positions: Vec<[f32; 3]> = triangulation
        .points()
        .iter()
        .map(|p| p.as_vec3().to_array())
        .collect();

    let normals = smooth.then(|| {
        triangulation
            .points()
            .iter()
            .map(|p| p.normalize_or_zero().as_vec3().to_array())
            .collect()
    });

    let uvs = grid
        .positions()
        .map(|pos| {
            let (i, j) = (pos.i as f32, pos.j as f32);
            [(j + i / 2.0) * scale, i * scale]
        })
        .collect();

    let mut indices = Vec::with_capacity(3 * grid.triangle_count());
    for tri in grid.triangles() {
        indices.extend(tri.map(|pos| grid.index(pos) as u32));
    }

    MeshData {
        positions,
        normals,
        uvs,
        indices,
    }
}

/// Reflect an octant mesh into all eight octants of the sphere
///
/// Copies are emitted in sign order `(±x, ±y, ±z)`; copies with an odd
/// number of reflections get their winding reversed so every face still
/// points outward.
pub fn mirror_octants(mesh: &MeshData) -> MeshData {
    let mut out = MeshData {
        normals: mesh.normals.as_ref().map(|_| Vec::with_capacity(8 * mesh.vertex_count())),
        ..Default::default()
    };
    for octant in 0..8 {
        let signs = Vec3::new(
            if octant & 1 == 0 { 1.0 } else { -1.0 },
            if octant & 2 == 0 { 1.0 } else { -1.0 },
            if octant & 4 == 0 { 1.0 } else { -1.0 },
        );
        let flip = signs.x * signs.y * signs.z < 0.0;
        let base = out.positions.len() as u32;

        out.positions.extend(
            mesh.positions
                .iter()
                .map(|p| (Vec3::from_array(*p) * signs).to_array()),
        );
        out.uvs.extend_from_slice(&mesh.uvs);
        if let (Some(src), Some(dst)) = (mesh.normals.as_ref(), out.normals.as_mut()) {
            dst.extend(src.iter().map(|n| (Vec3::from_array(*n) * signs).to_array()));
        }
        for tri in mesh.indices.chunks_exact(3) {
            if flip {
                out.indices.extend([base + tri[0], base + tri[2], base + tri[1]]);
            } else {
                out.indices.extend([base + tri[0], base + tri[1], base + tri[2]]);
            }
        }
    }
    out
}

/// Segments from the origin to every point, for debug display
pub fn rays(triangulation: &Triangulation) -> Vec<[DVec3; 2]> {
    triangulation
        .points()
        .iter()
        .map(|&p| [DVec3::ZERO, p])
        .collect()
}
