//! Legality test for a shared edge between two triangles.
//!
//! The test hypothetically flips the edge — a pure construction over
//! coordinates, never a mesh mutation and never counted — and compares
//! the ordered angle vector of the six interior angles before and after:
//! smallest first, then second-smallest, then largest. The edge is
//! illegal (must flip) when some level strictly improves with all
//! earlier levels tied within tolerance. A full tie is legal, which is
//! what keeps co-circular configurations such as the unit square from
//! flip-flopping.

use float_ord::FloatOrd;

use crate::errors::{TriangulationError, TriangulationResult};
use crate::geometry::mesh::Mesh;
use crate::geometry::triangle::{angles_of_points, signed_area_doubled};

/// Angle differences within this tolerance (degrees) count as ties and
/// fall through to the next comparison level.
pub const ANGLE_TIE_EPSILON: f64 = 1e-9;

/// Decides whether the edge at `edge_idx`, shared by triangles `tri_idx`
/// and `adj_idx`, satisfies the min-angle-maximizing criterion.
///
/// The verdict is symmetric in the two triangle arguments.
///
/// # Errors
///
/// Returns [`TriangulationError::MeshInvariant`] if the indices do not
/// describe two triangles sharing the edge.
pub fn edge_is_legal(
    mesh: &Mesh,
    edge_idx: usize,
    tri_idx: usize,
    adj_idx: usize,
) -> TriangulationResult<bool> {
    let edge = mesh.edge(edge_idx).ok_or_else(|| {
        TriangulationError::MeshInvariant(format!("legality test of unknown edge {edge_idx}"))
    })?;
    let apex1 = mesh.apex(tri_idx, edge_idx)?;
    let apex2 = mesh.apex(adj_idx, edge_idx)?;
    let shared = (mesh.coords(edge.a)?, mesh.coords(edge.b)?);
    let a = mesh.coords(apex1)?;
    let b = mesh.coords(apex2)?;
    Ok(!flip_improves_angles(shared, a, b))
}

/// True when flipping the shared edge `(p, q)` of the triangle pair with
/// apexes `a` and `b` strictly improves the ordered angle vector.
///
/// Degenerate configurations — coincident apexes, any of the four
/// involved triangles with near-zero area, or a nonconvex quadrilateral
/// (no geometrically valid flip) — report no improvement, so the edge
/// stays legal by default.
#[must_use]
pub fn flip_improves_angles(shared: ((f64, f64), (f64, f64)), a: (f64, f64), b: (f64, f64)) -> bool {
    let (p, q) = shared;
    if a == b {
        return false;
    }
    let tolerance = area_tolerance(&[p, q, a, b]);
    for (u, v, w) in [(a, p, q), (b, p, q), (a, b, p), (a, b, q)] {
        if signed_area_doubled(u, v, w).abs() <= tolerance {
            return false;
        }
    }
    // A flip only exists when the union of the two triangles is a convex
    // quadrilateral, i.e. the candidate diagonal properly crosses the
    // shared edge.
    if signed_area_doubled(a, b, p).signum() == signed_area_doubled(a, b, q).signum()
        || signed_area_doubled(p, q, a).signum() == signed_area_doubled(p, q, b).signum()
    {
        return false;
    }

    let before = angle_vector([a, p, q], [b, p, q]);
    let after = angle_vector([a, b, p], [a, b, q]);
    for level in 0..3 {
        let diff = after[level] - before[level];
        if diff > ANGLE_TIE_EPSILON {
            return true;
        }
        if diff < -ANGLE_TIE_EPSILON {
            return false;
        }
    }
    false
}

// Comparison key over the six interior angles of a triangle pair:
// smallest, second-smallest, largest.
fn angle_vector(t1: [(f64, f64); 3], t2: [(f64, f64); 3]) -> [f64; 3] {
    let a1 = angles_of_points(t1[0], t1[1], t1[2]);
    let a2 = angles_of_points(t2[0], t2[1], t2[2]);
    let mut angles = [a1[0], a1[1], a1[2], a2[0], a2[1], a2[2]];
    angles.sort_by_key(|angle| FloatOrd(*angle));
    [angles[0], angles[1], angles[5]]
}

fn area_tolerance(points: &[(f64, f64)]) -> f64 {
    let span = points
        .iter()
        .fold(1.0_f64, |m, (x, y)| m.max(x.abs()).max(y.abs()));
    span * span * 1e-12
}
