//! The Lawson edge flip.
//!
//! [`flip_edge`] is the only place the flip counter is incremented. The
//! legality tester builds its hypothetical flips purely from coordinates
//! and never calls into this module, so the counter records exactly the
//! flips applied to the mesh.

use crate::errors::{TriangulationError, TriangulationResult};
use crate::geometry::mesh::Mesh;

/// Run-scoped flip counter.
///
/// Owned by the driver and threaded by `&mut` into [`flip_edge`], so
/// independent triangulation runs never share counter state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlipCounter(u64);

impl FlipCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Total number of applied flips recorded so far.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.0
    }

    const fn record(&mut self) {
        self.0 += 1;
    }
}

/// What a flip changed in the mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlipOutcome {
    /// Arena indices of the two triangles created by the flip.
    pub new_triangles: [usize; 2],
    /// Arena index of the new diagonal edge.
    pub new_edge: usize,
    /// Arena indices of the two triangles removed by the flip.
    pub removed_triangles: [usize; 2],
    /// Arena index of the removed diagonal edge.
    pub removed_edge: usize,
}

/// Replaces the two triangles sharing `edge_idx` with the two triangles
/// over the opposite diagonal, and counts the flip.
///
/// The four outer edges are paired across the two old triangles by
/// shared endpoint; each new triangle takes one outer edge from each old
/// triangle plus the new diagonal. Triangle count and distinct-edge
/// count are unchanged.
///
/// # Errors
///
/// Returns [`TriangulationError::MeshInvariant`] if the edge is unknown
/// or a boundary edge, if the apexes coincide, or if rebuilding the
/// triangles fails — all of which mean the mesh is corrupt.
pub fn flip_edge(
    mesh: &mut Mesh,
    edge_idx: usize,
    counter: &mut FlipCounter,
) -> TriangulationResult<FlipOutcome> {
    let edge = mesh.edge(edge_idx).ok_or_else(|| {
        TriangulationError::MeshInvariant(format!("flip of unknown edge index {edge_idx}"))
    })?;
    let incident = edge.triangles.clone();
    let &[t1, t2] = incident.as_slice() else {
        return Err(TriangulationError::MeshInvariant(format!(
            "flip of edge {edge_idx} with {} incident triangles",
            incident.len()
        )));
    };
    let apex1 = mesh.apex(t1, edge_idx)?;
    let apex2 = mesh.apex(t2, edge_idx)?;
    if apex1 == apex2 {
        return Err(TriangulationError::MeshInvariant(format!(
            "triangles {t1} and {t2} share apex {apex1} across edge {edge_idx}"
        )));
    }

    let old1 = mesh.remove_triangle(t1)?;
    let old2 = mesh.remove_triangle(t2)?;
    let outer1 = outer_edges(&old1.edges, edge_idx);
    let outer2 = outer_edges(&old2.edges, edge_idx);
    mesh.remove_edge(edge_idx)?;
    let diagonal = mesh.ensure_edge(apex1, apex2)?;

    // Partner outer edges that share an endpoint; the other branch is
    // the crossed pairing.
    let first = mesh.edge(outer1[0]).ok_or_else(|| {
        TriangulationError::MeshInvariant(format!("outer edge {} vanished mid-flip", outer1[0]))
    })?;
    let candidate = mesh.edge(outer2[0]).ok_or_else(|| {
        TriangulationError::MeshInvariant(format!("outer edge {} vanished mid-flip", outer2[0]))
    })?;
    let pairs = if first.common_endpoint(candidate).is_some() {
        [(outer1[0], outer2[0]), (outer1[1], outer2[1])]
    } else {
        [(outer1[0], outer2[1]), (outer1[1], outer2[0])]
    };
    let n1 = mesh.add_triangle([pairs[0].0, pairs[0].1, diagonal])?;
    let n2 = mesh.add_triangle([pairs[1].0, pairs[1].1, diagonal])?;

    counter.record();
    Ok(FlipOutcome {
        new_triangles: [n1, n2],
        new_edge: diagonal,
        removed_triangles: [t1, t2],
        removed_edge: edge_idx,
    })
}

fn outer_edges(edges: &[usize; 3], removed: usize) -> [usize; 2] {
    let mut outer = [0; 2];
    let mut slot = 0;
    for idx in edges {
        if *idx != removed {
            outer[slot] = *idx;
            slot += 1;
        }
    }
    outer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::PointId;

    fn quad_mesh() -> (Mesh, usize) {
        // Flat quad split by the horizontal edge (-1,0)-(1,0); apexes
        // above and below.
        let mut mesh = Mesh::new();
        mesh.add_point(PointId(0), -1.0, 0.0).unwrap();
        mesh.add_point(PointId(1), 1.0, 0.0).unwrap();
        mesh.add_point(PointId(2), 0.0, 0.2).unwrap();
        mesh.add_point(PointId(3), 0.0, -0.2).unwrap();
        let shared = mesh.ensure_edge(PointId(0), PointId(1)).unwrap();
        let up_left = mesh.ensure_edge(PointId(0), PointId(2)).unwrap();
        let up_right = mesh.ensure_edge(PointId(1), PointId(2)).unwrap();
        let down_left = mesh.ensure_edge(PointId(0), PointId(3)).unwrap();
        let down_right = mesh.ensure_edge(PointId(1), PointId(3)).unwrap();
        mesh.add_triangle([shared, up_left, up_right]).unwrap();
        mesh.add_triangle([shared, down_left, down_right]).unwrap();
        (mesh, shared)
    }

    #[test]
    fn flip_swaps_the_diagonal() {
        let (mut mesh, shared) = quad_mesh();
        let mut counter = FlipCounter::new();
        let outcome = flip_edge(&mut mesh, shared, &mut counter).unwrap();

        assert_eq!(counter.total(), 1);
        assert!(mesh.edge(shared).is_none());
        let diagonal = mesh.edge(outcome.new_edge).unwrap();
        assert!(diagonal.has_endpoint(PointId(2)));
        assert!(diagonal.has_endpoint(PointId(3)));
        mesh.validate().unwrap();

        // Each new triangle keeps one old apex and both new diagonal
        // endpoints.
        for tri_idx in outcome.new_triangles {
            let triangle = mesh.triangle(tri_idx).unwrap();
            assert!(triangle.contains_point(PointId(2)));
            assert!(triangle.contains_point(PointId(3)));
        }
    }

    #[test]
    fn flip_preserves_counts() {
        let (mut mesh, shared) = quad_mesh();
        let triangles_before = mesh.triangle_count();
        let edges_before = mesh.edge_count();
        let mut counter = FlipCounter::new();
        flip_edge(&mut mesh, shared, &mut counter).unwrap();
        assert_eq!(mesh.triangle_count(), triangles_before);
        assert_eq!(mesh.edge_count(), edges_before);
    }

    #[test]
    fn double_flip_restores_the_original_diagonal() {
        let (mut mesh, shared) = quad_mesh();
        let mut counter = FlipCounter::new();
        let outcome = flip_edge(&mut mesh, shared, &mut counter).unwrap();
        let back = flip_edge(&mut mesh, outcome.new_edge, &mut counter).unwrap();
        assert_eq!(counter.total(), 2);
        let restored = mesh.edge(back.new_edge).unwrap();
        assert!(restored.has_endpoint(PointId(0)));
        assert!(restored.has_endpoint(PointId(1)));
        mesh.validate().unwrap();
    }

    #[test]
    fn boundary_edge_cannot_flip() {
        let (mut mesh, shared) = quad_mesh();
        let boundary = mesh.find_edge(PointId(0), PointId(2)).unwrap();
        let mut counter = FlipCounter::new();
        assert!(flip_edge(&mut mesh, boundary, &mut counter).is_err());
        assert_eq!(counter.total(), 0);
        // The failed attempt must not have touched the mesh.
        assert!(mesh.edge(shared).is_some());
        mesh.validate().unwrap();
    }
}
