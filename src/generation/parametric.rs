//! Closed-form parametric generators
//!
//! Each generator evaluates a function `f(t, u)` over the grid, with
//! `u = i/n` selecting the row and `t = j/(n − i)` the place along it. The
//! corners map to `f(0, 0) = ex`, `f(1, 0) = ez` and `f(·, 1) = ey`.

use glam::DVec3;

use crate::grid::Triangulation;
use crate::math::{project_along_diagonal, sine_warp, EX, EY, EZ};

/// Evaluate `f` at every grid position of order `n`
pub fn triangulate<F>(n: usize, f: F) -> Triangulation
where
    F: Fn(f64, f64) -> DVec3,
{
    Triangulation::from_fn(n, |pos| {
        let (t, u) = pos.params();
        f(t, u)
    })
}

/// Evaluate `f` along the grid rows with `refinement` samples per grid step
///
/// Row `i` holds `(n − i)·refinement + 1` samples at `t = j'/n'`,
/// `n' = (n − i)·refinement`. With `refinement = 1` the rows are exactly
/// those of [`triangulate`].
pub fn sample_rows<F>(n: usize, refinement: usize, mut f: F) -> Vec<Vec<DVec3>>
where
    F: FnMut(f64, f64) -> DVec3,
{
    let mut rows = Vec::with_capacity(n + 1);
    for i in 0..=n {
        let u = if n == 0 { 0.0 } else { i as f64 / n as f64 };
        let steps = (n - i) * refinement;
        let mut row = Vec::with_capacity(steps + 1);
        for j in 0..=steps {
            let t = if steps == 0 { 0.0 } else { j as f64 / steps as f64 };
            row.push(f(t, u));
        }
        rows.push(row);
    }
    rows
}

/// Planar triangle through `ex`, `ez`, `ey`
pub fn flat_at(t: f64, u: f64) -> DVec3 {
    EX.lerp(EZ, t).lerp(EY, u)
}

pub fn collapsed_at(_t: f64, _u: f64) -> DVec3 {
    DVec3::ZERO
}

/// Straight chords through the ball, pushed out onto the sphere
pub fn geodesics_at(t: f64, u: f64) -> DVec3 {
    flat_at(t, u).normalize()
}

/// Rows are parallels of latitude around the `ey` axis
pub fn parallels_at(t: f64, u: f64) -> DVec3 {
    EX.slerp(EZ, t).slerp(EY, u)
}

/// Rows are great-circle arcs between evenly spaced edge points
pub fn even_geodesics_at(t: f64, u: f64) -> DVec3 {
    EX.slerp(EY, u).slerp(EZ.slerp(EY, u), t)
}

/// `sin(π/2 · c)` applied to the flat grid; inside the sphere away from the edges
pub fn sines_at(t: f64, u: f64) -> DVec3 {
    sine_warp(flat_at(t, u))
}

pub fn sine_based_at(t: f64, u: f64) -> DVec3 {
    sines_at(t, u).normalize()
}

/// The sine grid moved onto the sphere along `(1, 1, 1)`
pub fn sine_based2_at(t: f64, u: f64) -> DVec3 {
    project_along_diagonal(sines_at(t, u))
}

pub fn flat(n: usize) -> Triangulation {
    triangulate(n, flat_at)
}

pub fn collapsed(n: usize) -> Triangulation {
    triangulate(n, collapsed_at)
}

pub fn geodesics(n: usize) -> Triangulation {
    triangulate(n, geodesics_at)
}

pub fn parallels(n: usize) -> Triangulation {
    triangulate(n, parallels_at)
}

pub fn even_geodesics(n: usize) -> Triangulation {
    triangulate(n, even_geodesics_at)
}

pub fn sines(n: usize) -> Triangulation {
    triangulate(n, sines_at)
}

pub fn sine_based(n: usize) -> Triangulation {
    triangulate(n, sine_based_at)
}

pub fn sine_based2(n: usize) -> Triangulation {
    triangulate(n, sine_based2_at)
}
