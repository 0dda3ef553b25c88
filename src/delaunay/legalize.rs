//! Point insertion and worklist-driven edge legalization.
//!
//! Inserting a point splits its containing triangle into three and seeds
//! the worklist with that triangle's original edges. Each worklist entry
//! is re-examined against the inserted point: boundary edges are always
//! legal, illegal edges are flipped (counted) and replaced on the
//! worklist by the two edges opposite the point in the freshly created
//! triangles — never the edge just flipped, which is what keeps a single
//! edge from flip-flopping.

use crate::delaunay::flip::{FlipCounter, flip_edge};
use crate::delaunay::legality::edge_is_legal;
use crate::errors::{TriangulationError, TriangulationResult};
use crate::geometry::mesh::Mesh;
use crate::geometry::point::PointId;

/// Worklist entries processed per insertion may not exceed
/// `FACTOR * triangle_count + SLACK`; beyond that the run is aborted as
/// a broken algorithmic invariant instead of looping.
const LEGALIZE_BOUND_FACTOR: usize = 16;
const LEGALIZE_BOUND_SLACK: usize = 64;

/// How an insertion was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The point was inserted and its region legalized.
    Inserted,
    /// The point coincides with an existing vertex and was absorbed.
    CoincidentSkipped,
}

/// Inserts the registered point `id` into the triangulation.
///
/// Locates the containing triangle, replaces it with three triangles
/// spoked from the new point, then legalizes outward from the containing
/// triangle's original edges. A point coinciding with a vertex of its
/// containing triangle is skipped rather than creating degenerate
/// spokes.
///
/// # Errors
///
/// Returns [`TriangulationError::NoContainingTriangle`] when point
/// location fails, [`TriangulationError::UnboundedLegalization`] when
/// the worklist bound is exceeded, and
/// [`TriangulationError::MeshInvariant`] on corrupt adjacency.
pub fn insert_point(
    mesh: &mut Mesh,
    counter: &mut FlipCounter,
    id: PointId,
) -> TriangulationResult<InsertOutcome> {
    let (x, y) = mesh.coords(id)?;
    let t0 = mesh
        .locate(x, y)
        .ok_or(TriangulationError::NoContainingTriangle { id: id.0, x, y })?;
    let vertices = mesh
        .triangle(t0)
        .ok_or_else(|| TriangulationError::MeshInvariant(format!("located missing triangle {t0}")))?
        .points;
    for vertex in vertices {
        if mesh.coords(vertex)? == (x, y) {
            log::warn!("point {id} coincides with vertex {vertex}, skipping insertion");
            return Ok(InsertOutcome::CoincidentSkipped);
        }
    }

    let removed = mesh.remove_triangle(t0)?;
    for edge_idx in removed.edges {
        let (u, v) = mesh
            .edge(edge_idx)
            .ok_or_else(|| {
                TriangulationError::MeshInvariant(format!(
                    "triangle {t0} referenced missing edge {edge_idx}"
                ))
            })?
            .endpoints();
        let spoke_u = mesh.ensure_edge(id, u)?;
        let spoke_v = mesh.ensure_edge(id, v)?;
        mesh.add_triangle([edge_idx, spoke_u, spoke_v])?;
    }
    log::debug!("inserted point {id} into triangle {t0}");

    legalize(mesh, counter, id, removed.edges.to_vec())?;
    Ok(InsertOutcome::Inserted)
}

/// Drains the worklist of edges to legalize with respect to `p`.
fn legalize(
    mesh: &mut Mesh,
    counter: &mut FlipCounter,
    p: PointId,
    mut work: Vec<usize>,
) -> TriangulationResult<()> {
    let mut processed = 0_usize;
    while let Some(edge_idx) = work.pop() {
        processed += 1;
        let bound = LEGALIZE_BOUND_FACTOR * mesh.triangle_count() + LEGALIZE_BOUND_SLACK;
        if processed > bound || work.len() > bound {
            return Err(TriangulationError::UnboundedLegalization { processed, bound });
        }

        let Some(edge) = mesh.edge(edge_idx) else {
            // Flipped away by an earlier worklist entry.
            continue;
        };
        if edge.has_endpoint(p) {
            continue;
        }
        let mut with_p = None;
        let mut across = None;
        for tri_idx in edge.triangles.clone() {
            if mesh
                .triangle(tri_idx)
                .is_some_and(|t| t.contains_point(p))
            {
                with_p = Some(tri_idx);
            } else {
                across = Some(tri_idx);
            }
        }
        let Some(tri_idx) = with_p else {
            // Stale entry: the region around p was restructured.
            continue;
        };
        let Some(adj_idx) = across else {
            // Boundary edge of the super-triangle: always legal.
            continue;
        };

        if edge_is_legal(mesh, edge_idx, tri_idx, adj_idx)? {
            continue;
        }
        let outcome = flip_edge(mesh, edge_idx, counter)?;
        for new_tri in outcome.new_triangles {
            work.push(mesh.opposite_edge(new_tri, p)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_mesh(points: &[(i64, f64, f64)]) -> Mesh {
        // A large triangle with three synthetic corners, plus registered
        // (not yet inserted) interior points.
        let mut mesh = Mesh::new();
        mesh.add_point(PointId(-1), -100.0, -100.0).unwrap();
        mesh.add_point(PointId(-2), 0.0, 200.0).unwrap();
        mesh.add_point(PointId(-3), 100.0, -100.0).unwrap();
        let e1 = mesh.ensure_edge(PointId(-1), PointId(-2)).unwrap();
        let e2 = mesh.ensure_edge(PointId(-2), PointId(-3)).unwrap();
        let e3 = mesh.ensure_edge(PointId(-3), PointId(-1)).unwrap();
        mesh.add_triangle([e1, e2, e3]).unwrap();
        for (id, x, y) in points {
            mesh.add_point(PointId(*id), *x, *y).unwrap();
        }
        mesh
    }

    #[test]
    fn first_insertion_splits_into_three() {
        let mut mesh = seeded_mesh(&[(0, 0.0, 0.0)]);
        let mut counter = FlipCounter::new();
        let outcome = insert_point(&mut mesh, &mut counter, PointId(0)).unwrap();
        assert_eq!(outcome, InsertOutcome::Inserted);
        assert_eq!(mesh.triangle_count(), 3);
        assert_eq!(mesh.edge_count(), 6);
        assert_eq!(counter.total(), 0);
        mesh.validate().unwrap();
    }

    #[test]
    fn insertion_outside_the_mesh_fails() {
        let mut mesh = seeded_mesh(&[(0, 5000.0, 5000.0)]);
        let mut counter = FlipCounter::new();
        let err = insert_point(&mut mesh, &mut counter, PointId(0)).unwrap_err();
        assert!(matches!(
            err,
            TriangulationError::NoContainingTriangle { id: 0, .. }
        ));
    }

    #[test]
    fn coincident_point_is_absorbed() {
        let mut mesh = seeded_mesh(&[(0, 0.0, 0.0), (1, 0.0, 0.0)]);
        let mut counter = FlipCounter::new();
        insert_point(&mut mesh, &mut counter, PointId(0)).unwrap();
        let outcome = insert_point(&mut mesh, &mut counter, PointId(1)).unwrap();
        assert_eq!(outcome, InsertOutcome::CoincidentSkipped);
        assert_eq!(mesh.triangle_count(), 3);
        mesh.validate().unwrap();
    }

    #[test]
    fn each_insertion_adds_two_triangles() {
        let mut mesh = seeded_mesh(&[(0, 0.0, 0.0), (1, 10.0, 5.0), (2, -20.0, -30.0)]);
        let mut counter = FlipCounter::new();
        for id in 0..3 {
            insert_point(&mut mesh, &mut counter, PointId(id)).unwrap();
            mesh.validate().unwrap();
        }
        // Splitting adds two triangles net; flips add none.
        assert_eq!(mesh.triangle_count(), 1 + 2 * 3);
    }

    #[test]
    fn collinear_point_does_not_panic() {
        // Point 2 sits exactly on the spoke between point 0 and point 1.
        let mut mesh = seeded_mesh(&[(0, -10.0, 0.0), (1, 10.0, 0.0), (2, 0.0, 0.0)]);
        let mut counter = FlipCounter::new();
        for id in 0..3 {
            insert_point(&mut mesh, &mut counter, PointId(id)).unwrap();
        }
        assert_eq!(mesh.triangle_count(), 1 + 2 * 3);
    }
}
