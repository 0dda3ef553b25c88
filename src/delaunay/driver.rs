//! Triangulation driver: super-triangle bootstrap, sequential insertion
//! and the flip-count report.

use std::collections::BTreeSet;

use crate::delaunay::flip::FlipCounter;
use crate::delaunay::legalize::{InsertOutcome, insert_point};
use crate::errors::{TriangulationError, TriangulationResult};
use crate::geometry::mesh::Mesh;
use crate::geometry::point::PointId;
use crate::io::InputPoint;

/// Default margin placed around the point extent when the super-triangle
/// is constructed.
pub const DEFAULT_MARGIN: f64 = 1000.0;

/// Ids of the three synthetic super-triangle vertices.
const SUPER_VERTEX_IDS: [i64; 3] = [-1, -2, -3];

/// How a single insertion request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionStatus {
    /// The point entered the mesh.
    Inserted,
    /// The id was already inserted earlier in the sequence.
    DuplicateId,
    /// The point coincides with an existing vertex.
    CoincidentPoint,
}

/// Summary of a completed triangulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriangulationReport {
    /// Total number of applied edge flips.
    pub flips: u64,
    /// Points actually inserted into the mesh.
    pub points_inserted: usize,
    /// Insertion requests skipped because the id was already inserted.
    pub duplicates_skipped: usize,
    /// Insertion requests absorbed as coincident with an existing vertex.
    pub coincident_skipped: usize,
    /// Triangles over the true point set (no synthetic vertex).
    pub triangles: usize,
    /// All live triangles, including those touching the super-triangle.
    pub mesh_triangles: usize,
}

/// Incremental Delaunay triangulation over a declared point set.
///
/// Owns the mesh and the run-scoped flip counter; construction builds
/// the enclosing super-triangle, after which points are inserted one at
/// a time in the order the caller chooses.
#[derive(Debug, Clone)]
pub struct Triangulator {
    mesh: Mesh,
    counter: FlipCounter,
    inserted: BTreeSet<PointId>,
    duplicates_skipped: usize,
    coincident_skipped: usize,
}

impl Triangulator {
    /// Registers the input points and bootstraps the super-triangle.
    ///
    /// The synthetic vertices (ids −1, −2, −3) are placed a generous
    /// margin outside the axis-aligned extent of the inputs; the margin
    /// grows with the extent so enclosure holds at any input scale.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] for duplicate or
    /// negative input ids, and [`TriangulationError::InvalidConfig`]
    /// for a non-positive or non-finite margin.
    pub fn new(points: &[InputPoint], margin: f64) -> TriangulationResult<Self> {
        if !margin.is_finite() || margin <= 0.0 {
            return Err(TriangulationError::InvalidConfig(format!(
                "super-triangle margin must be positive, got {margin}"
            )));
        }
        let mut mesh = Mesh::new();
        for point in points {
            if point.id.is_synthetic() {
                return Err(TriangulationError::MeshInvariant(format!(
                    "input point uses reserved synthetic id {}",
                    point.id
                )));
            }
            mesh.add_point(point.id, point.x, point.y)?;
        }

        let [a, b, c] = super_triangle_vertices(points, margin);
        let [ida, idb, idc] = SUPER_VERTEX_IDS.map(PointId);
        mesh.add_point(ida, a.0, a.1)?;
        mesh.add_point(idb, b.0, b.1)?;
        mesh.add_point(idc, c.0, c.1)?;
        let e1 = mesh.ensure_edge(ida, idb)?;
        let e2 = mesh.ensure_edge(idb, idc)?;
        let e3 = mesh.ensure_edge(idc, ida)?;
        mesh.add_triangle([e1, e2, e3])?;
        log::debug!(
            "super-triangle spans ({:.1}, {:.1}) ({:.1}, {:.1}) ({:.1}, {:.1})",
            a.0,
            a.1,
            b.0,
            b.1,
            c.0,
            c.1
        );

        Ok(Self {
            mesh,
            counter: FlipCounter::new(),
            inserted: BTreeSet::new(),
            duplicates_skipped: 0,
            coincident_skipped: 0,
        })
    }

    /// Inserts one registered point; repeated ids are skipped.
    ///
    /// # Errors
    ///
    /// Propagates the fatal insertion errors of
    /// [`insert_point`](crate::delaunay::legalize::insert_point).
    pub fn insert(&mut self, id: PointId) -> TriangulationResult<InsertionStatus> {
        if self.inserted.contains(&id) {
            log::debug!("point {id} already inserted, skipping");
            self.duplicates_skipped += 1;
            return Ok(InsertionStatus::DuplicateId);
        }
        match insert_point(&mut self.mesh, &mut self.counter, id)? {
            InsertOutcome::Inserted => {
                self.inserted.insert(id);
                Ok(InsertionStatus::Inserted)
            }
            InsertOutcome::CoincidentSkipped => {
                self.coincident_skipped += 1;
                Ok(InsertionStatus::CoincidentPoint)
            }
        }
    }

    /// The live mesh.
    #[must_use]
    pub const fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Applied flips so far.
    #[must_use]
    pub const fn flip_count(&self) -> u64 {
        self.counter.total()
    }

    /// Live triangles with no synthetic vertex.
    #[must_use]
    pub fn real_triangle_count(&self) -> usize {
        self.mesh
            .triangles()
            .filter(|(_, t)| !t.is_synthetic())
            .count()
    }

    /// Snapshot of the run so far.
    #[must_use]
    pub fn report(&self) -> TriangulationReport {
        TriangulationReport {
            flips: self.counter.total(),
            points_inserted: self.inserted.len(),
            duplicates_skipped: self.duplicates_skipped,
            coincident_skipped: self.coincident_skipped,
            triangles: self.real_triangle_count(),
            mesh_triangles: self.mesh.triangle_count(),
        }
    }
}

/// Runs a full triangulation: bootstrap, insert the sequence in order,
/// report the flip count.
///
/// # Errors
///
/// Propagates construction and insertion errors; see [`Triangulator`].
pub fn triangulate(
    points: &[InputPoint],
    insertions: &[PointId],
    margin: f64,
) -> TriangulationResult<TriangulationReport> {
    let mut triangulator = Triangulator::new(points, margin)?;
    for id in insertions {
        triangulator.insert(*id)?;
    }
    let report = triangulator.report();
    log::info!(
        "triangulated {} points with {} flips ({} triangles, {} duplicates skipped)",
        report.points_inserted,
        report.flips,
        report.triangles,
        report.duplicates_skipped,
    );
    Ok(report)
}

// Synthetic corners strictly enclosing the point extent: a wide base
// below the extent and an apex far above it. The half-width/height of
// 20m against a base offset of m keeps the slanted sides clear of the
// extent corners for any aspect ratio once m >= the extent span.
fn super_triangle_vertices(points: &[InputPoint], margin: f64) -> [(f64, f64); 3] {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    if points.is_empty() {
        min_x = 0.0;
        min_y = 0.0;
        max_x = 0.0;
        max_y = 0.0;
    }
    let m = margin.max(max_x - min_x).max(max_y - min_y);
    let mid_x = (min_x + max_x) / 2.0;
    [
        (mid_x - 20.0 * m, min_y - m),
        (mid_x, max_y + 20.0 * m),
        (mid_x + 20.0 * m, min_y - m),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::triangle::triangle_contains;

    fn input(points: &[(i64, f64, f64)]) -> Vec<InputPoint> {
        points
            .iter()
            .map(|(id, x, y)| InputPoint {
                id: PointId(*id),
                x: *x,
                y: *y,
            })
            .collect()
    }

    #[test]
    fn super_triangle_encloses_all_points() {
        let points = input(&[(0, -3.0, 2.0), (1, 14.0, -7.0), (2, 5.0, 40.0)]);
        let [a, b, c] = super_triangle_vertices(&points, DEFAULT_MARGIN);
        for p in &points {
            assert!(triangle_contains(a, b, c, (p.x, p.y)));
        }
    }

    #[test]
    fn super_triangle_scales_with_large_extents() {
        // Extents wider than the configured margin must still be
        // enclosed.
        let points = input(&[(0, -50_000.0, 0.0), (1, 50_000.0, 10.0), (2, 0.0, 80_000.0)]);
        let [a, b, c] = super_triangle_vertices(&points, DEFAULT_MARGIN);
        for p in &points {
            assert!(triangle_contains(a, b, c, (p.x, p.y)));
        }
    }

    #[test]
    fn bootstrap_has_one_triangle_and_zero_flips() {
        let points = input(&[(0, 0.0, 0.0), (1, 1.0, 0.0)]);
        let triangulator = Triangulator::new(&points, DEFAULT_MARGIN).unwrap();
        assert_eq!(triangulator.mesh().triangle_count(), 1);
        assert_eq!(triangulator.flip_count(), 0);
        assert_eq!(triangulator.real_triangle_count(), 0);
        triangulator.mesh().validate().unwrap();
    }

    #[test]
    fn rejects_reserved_ids_and_bad_margin() {
        let bad_id = input(&[(-7, 0.0, 0.0)]);
        assert!(Triangulator::new(&bad_id, DEFAULT_MARGIN).is_err());
        let points = input(&[(0, 0.0, 0.0)]);
        assert!(Triangulator::new(&points, 0.0).is_err());
        assert!(Triangulator::new(&points, f64::NAN).is_err());
    }

    #[test]
    fn duplicate_insertions_are_counted_not_fatal() {
        let points = input(&[(0, 0.0, 0.0), (1, 5.0, 5.0)]);
        let mut triangulator = Triangulator::new(&points, DEFAULT_MARGIN).unwrap();
        assert_eq!(
            triangulator.insert(PointId(0)).unwrap(),
            InsertionStatus::Inserted
        );
        assert_eq!(
            triangulator.insert(PointId(0)).unwrap(),
            InsertionStatus::DuplicateId
        );
        let report = triangulator.report();
        assert_eq!(report.points_inserted, 1);
        assert_eq!(report.duplicates_skipped, 1);
    }

    #[test]
    fn empty_input_reports_zero_flips() {
        let report = triangulate(&[], &[], DEFAULT_MARGIN).unwrap();
        assert_eq!(report.flips, 0);
        assert_eq!(report.triangles, 0);
        assert_eq!(report.mesh_triangles, 1);
    }

    #[test]
    fn square_end_to_end_yields_two_triangles() {
        let points = input(&[(0, 0.0, 0.0), (1, 1.0, 0.0), (2, 1.0, 1.0), (3, 0.0, 1.0)]);
        let ids: Vec<PointId> = (0..4).map(PointId).collect();
        let report = triangulate(&points, &ids, DEFAULT_MARGIN).unwrap();
        assert_eq!(report.triangles, 2);
        assert_eq!(report.points_inserted, 4);
    }

    #[test]
    fn flip_count_is_deterministic_for_fixed_order() {
        let points = input(&[
            (0, 0.0, 0.0),
            (1, 4.0, 0.5),
            (2, 2.0, 3.0),
            (3, -1.0, 2.0),
            (4, 1.5, 1.0),
        ]);
        let ids: Vec<PointId> = (0..5).map(PointId).collect();
        let first = triangulate(&points, &ids, DEFAULT_MARGIN).unwrap();
        let second = triangulate(&points, &ids, DEFAULT_MARGIN).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn counters_do_not_leak_between_runs() {
        let points = input(&[(0, 0.0, 0.0), (1, 1.0, 0.0), (2, 1.0, 1.0), (3, 0.0, 1.0)]);
        let ids: Vec<PointId> = (0..4).map(PointId).collect();
        let first = triangulate(&points, &ids, DEFAULT_MARGIN).unwrap().flips;
        let second = triangulate(&points, &ids, DEFAULT_MARGIN).unwrap().flips;
        assert_eq!(first, second);
    }
}
