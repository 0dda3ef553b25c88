//! Triangle records and pure triangle geometry.
//!
//! The arena record ties three edge indices to three point ids; the
//! scalar helpers (law of cosines, orientation, containment) work on
//! plain coordinates so the legality tester can evaluate hypothetical
//! triangles that are never materialized in the mesh.

use num_traits::Float;

use crate::geometry::edge::Edge;
use crate::geometry::point::{PointId, distance};

/// A triangle of the mesh: three edge indices over three distinct points.
///
/// The point ids are stored alongside the edge indices so membership
/// tests do not need to chase edge records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triangle {
    /// Arena indices of the three edges.
    pub edges: [usize; 3],
    /// The three distinct point ids the edges cycle over.
    pub points: [PointId; 3],
}

impl Triangle {
    /// True if `p` is one of the three vertices.
    #[must_use]
    pub fn contains_point(&self, p: PointId) -> bool {
        self.points.contains(&p)
    }

    /// True if both endpoints of `e` are vertices of this triangle.
    #[must_use]
    pub fn contains_edge(&self, e: &Edge) -> bool {
        self.contains_point(e.a) && self.contains_point(e.b)
    }

    /// True if this triangle uses the edge at arena index `edge_idx`.
    #[must_use]
    pub fn has_edge_index(&self, edge_idx: usize) -> bool {
        self.edges.contains(&edge_idx)
    }

    /// True if any vertex is a synthetic super-triangle vertex.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.points.iter().any(|p| p.is_synthetic())
    }
}

/// Interior angles in degrees from the three side lengths.
///
/// Angle `i` is opposite side `i`, via the law of cosines. The acos
/// argument is clamped to [-1, 1] so nearly collinear triangles yield
/// 0/180 degree angles instead of a domain error; a zero-length side
/// yields a zero angle for the sides meeting it.
#[must_use]
pub fn angles_from_sides<T: Float>(sides: [T; 3]) -> [T; 3] {
    let [a, b, c] = sides;
    [
        law_of_cosines(a, b, c),
        law_of_cosines(b, c, a),
        law_of_cosines(c, a, b),
    ]
}

fn law_of_cosines<T: Float>(opposite: T, s1: T, s2: T) -> T {
    let denom = (T::one() + T::one()) * s1 * s2;
    if denom <= T::zero() {
        return T::zero();
    }
    let arg = (s1 * s1 + s2 * s2 - opposite * opposite) / denom;
    arg.max(-T::one()).min(T::one()).acos().to_degrees()
}

/// Interior angles in degrees of the triangle over three coordinate
/// pairs. Angle `i` is the angle at vertex `i`.
#[must_use]
pub fn angles_of_points<T: Float>(p1: (T, T), p2: (T, T), p3: (T, T)) -> [T; 3] {
    // Side i is opposite vertex i.
    let a = distance(p2, p3);
    let b = distance(p3, p1);
    let c = distance(p1, p2);
    angles_from_sides([a, b, c])
}

/// Twice the signed area of the triangle `a`, `b`, `c`.
///
/// Positive for counterclockwise orientation, zero for collinear points.
#[must_use]
pub fn signed_area_doubled<T: Float>(a: (T, T), b: (T, T), c: (T, T)) -> T {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// True when `p` lies in the closed interior of triangle `a`, `b`, `c`.
///
/// Orientation-sign test with tolerance `eps`, so points exactly on an
/// edge count as contained. Degenerate (collinear) triangles contain
/// nothing.
#[must_use]
pub fn triangle_contains(a: (f64, f64), b: (f64, f64), c: (f64, f64), p: (f64, f64)) -> bool {
    let area2 = signed_area_doubled(a, b, c);
    if area2.abs() <= f64::EPSILON {
        return false;
    }
    // Walk the vertices counterclockwise; p is inside iff it is on the
    // left of (or on) every directed side.
    let (a, b, c) = if area2 > 0.0 { (a, b, c) } else { (a, c, b) };
    let eps = containment_tolerance(a, b, c);
    signed_area_doubled(a, b, p) >= -eps
        && signed_area_doubled(b, c, p) >= -eps
        && signed_area_doubled(c, a, p) >= -eps
}

// Scale the on-edge tolerance with the triangle extent so containment
// stays meaningful for very large super-triangles.
fn containment_tolerance(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    let span = [a.0, a.1, b.0, b.1, c.0, c.1]
        .iter()
        .fold(1.0_f64, |m, v| m.max(v.abs()));
    span * 1e-12
}
