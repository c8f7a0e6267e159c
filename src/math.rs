//! Vector primitives shared by the generators
//!
//! All geometry is computed in `f64`: the sine-ratio solver converges to
//! `1e-10`, which is below single precision.

use glam::DVec3;
use std::f64::consts::FRAC_PI_2;

/// Sphere-axis intercept on x, the corner at grid position `k = n`
pub const EX: DVec3 = DVec3::X;
/// Sphere-axis intercept on y, the apex at grid position `i = n`
pub const EY: DVec3 = DVec3::Y;
/// Sphere-axis intercept on z, the corner at grid position `j = n`
pub const EZ: DVec3 = DVec3::Z;

/// The diagonal direction used by the parallel projection onto the sphere
pub const DIAGONAL: DVec3 = DVec3::ONE;

/// Scale a vector so its coordinates sum to one
///
/// Points on the octahedron face `x + y + z = 1` are fixed points. The
/// origin (and anything else with a zero coordinate sum) is returned as-is.
pub fn barycentric_normalize(v: DVec3) -> DVec3 {
    let sum = v.element_sum();
    if sum.abs() < f64::EPSILON {
        return v;
    }
    v / sum
}

/// Coordinate-wise arcsine, clamped so rounding just above 1 stays finite
pub fn asin_components(v: DVec3) -> DVec3 {
    DVec3::new(
        v.x.clamp(-1.0, 1.0).asin(),
        v.y.clamp(-1.0, 1.0).asin(),
        v.z.clamp(-1.0, 1.0).asin(),
    )
}

/// Coordinate-wise `sin(π/2 · c)`
pub fn sine_warp(v: DVec3) -> DVec3 {
    DVec3::new(
        (FRAC_PI_2 * v.x).sin(),
        (FRAC_PI_2 * v.y).sin(),
        (FRAC_PI_2 * v.z).sin(),
    )
}

/// Move `p` along `(1, 1, 1)` until it lands on the unit sphere
///
/// Solves `|p + λ(1,1,1)| = 1` for the larger root,
/// `λ = (√(2(xy + xz + yz − x² − y² − z²) + 3) − (x + y + z)) / 3`.
pub fn project_along_diagonal(p: DVec3) -> DVec3 {
    let DVec3 { x, y, z } = p;
    let discriminant = 2.0 * (x * y + x * z + y * z - x * x - y * y - z * z) + 3.0;
    let lambda = (discriminant.max(0.0).sqrt() - p.element_sum()) / 3.0;
    p + DIAGONAL * lambda
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_barycentric_normalize() {
        let v = barycentric_normalize(DVec3::new(2.0, 1.0, 1.0));
        assert_abs_diff_eq!(v.element_sum(), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(v.x, 0.5, epsilon = 1e-15);

        assert_eq!(barycentric_normalize(DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn test_asin_components_clamps() {
        let v = asin_components(DVec3::new(1.0 + 1e-15, 0.0, -1.0));
        assert!(v.is_finite());
        assert_abs_diff_eq!(v.x, FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(v.z, -FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_sine_warp_keeps_edge_points_on_circle() {
        // On an edge two coordinates sum to one, so sin/cos pair up
        for step in 0..=10 {
            let a = step as f64 / 10.0;
            let warped = sine_warp(DVec3::new(a, 0.0, 1.0 - a));
            assert_abs_diff_eq!(warped.length(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_project_along_diagonal_lands_on_sphere() {
        let samples = [
            DVec3::new(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0),
            DVec3::new(0.5, 0.25, 0.25),
            DVec3::new(0.7, 0.7, 0.1),
            DVec3::ZERO,
        ];
        for p in samples {
            let q = project_along_diagonal(p);
            assert_abs_diff_eq!(q.length(), 1.0, epsilon = 1e-12);
            // The offset is parallel to the diagonal
            let offset = q - p;
            assert_abs_diff_eq!(offset.x, offset.y, epsilon = 1e-12);
            assert_abs_diff_eq!(offset.y, offset.z, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_project_along_diagonal_fixes_unit_points() {
        let p = DVec3::new(0.6, 0.0, 0.8);
        assert!(project_along_diagonal(p).abs_diff_eq(p, 1e-12));
    }
}
