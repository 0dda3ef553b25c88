//! Arena-owned mesh of points, edges and triangles.
//!
//! The mesh is the sole owner of all records. Points are keyed by their
//! external id, edges and triangles by monotonically increasing arena
//! indices; all adjacency is expressed as ids and indices, so there are
//! no reference cycles. The arenas are `BTreeMap`s rather than hash maps
//! so that iteration order, and with it point location and the final
//! flip count, is deterministic for a fixed insertion sequence.

use std::collections::{BTreeMap, HashMap};

use crate::errors::{TriangulationError, TriangulationResult};
use crate::geometry::edge::{Edge, canonical_pair};
use crate::geometry::point::{Point, PointId, distance};
use crate::geometry::triangle::{
    Triangle, angles_from_sides, signed_area_doubled, triangle_contains,
};

/// Tolerance for the angle-sum consistency check in [`Mesh::validate`],
/// in degrees.
const ANGLE_SUM_TOLERANCE: f64 = 1e-6;

/// The live collection of triangles tiling the point set.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    points: BTreeMap<i64, Point>,
    edges: BTreeMap<usize, Edge>,
    triangles: BTreeMap<usize, Triangle>,
    edge_lookup: HashMap<(i64, i64), usize>,
    next_edge_id: usize,
    next_triangle_id: usize,
}

impl Mesh {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a point record.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] if a point with the
    /// same id is already registered.
    pub fn add_point(&mut self, id: PointId, x: f64, y: f64) -> TriangulationResult<()> {
        if self.points.contains_key(&id.0) {
            return Err(TriangulationError::MeshInvariant(format!(
                "point {id} registered twice"
            )));
        }
        self.points.insert(id.0, Point::new(id, x, y));
        Ok(())
    }

    /// Looks up a point record.
    #[must_use]
    pub fn point(&self, id: PointId) -> Option<&Point> {
        self.points.get(&id.0)
    }

    /// Coordinates of a registered point.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] if the id is unknown.
    pub fn coords(&self, id: PointId) -> TriangulationResult<(f64, f64)> {
        self.point(id).map(Point::coords).ok_or_else(|| {
            TriangulationError::MeshInvariant(format!("unknown point {id} referenced"))
        })
    }

    /// Number of registered points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of live edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of live triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Iterates over points in ascending id order.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.points.values()
    }

    /// Iterates over `(index, edge)` in ascending index order.
    pub fn edges(&self) -> impl Iterator<Item = (usize, &Edge)> {
        self.edges.iter().map(|(idx, e)| (*idx, e))
    }

    /// Iterates over `(index, triangle)` in ascending index order.
    pub fn triangles(&self) -> impl Iterator<Item = (usize, &Triangle)> {
        self.triangles.iter().map(|(idx, t)| (*idx, t))
    }

    /// Looks up an edge record by arena index.
    #[must_use]
    pub fn edge(&self, idx: usize) -> Option<&Edge> {
        self.edges.get(&idx)
    }

    /// Looks up a triangle record by arena index.
    #[must_use]
    pub fn triangle(&self, idx: usize) -> Option<&Triangle> {
        self.triangles.get(&idx)
    }

    /// Arena index of the edge between `a` and `b`, if it exists.
    #[must_use]
    pub fn find_edge(&self, a: PointId, b: PointId) -> Option<usize> {
        let (low, high) = canonical_pair(a, b);
        self.edge_lookup.get(&(low.0, high.0)).copied()
    }

    /// Returns the edge between `a` and `b`, creating it if absent.
    ///
    /// Edges are deduplicated by their canonical endpoint pair, so two
    /// triangles sharing an edge share the same record. Creating an edge
    /// records each endpoint in the other's neighbor cache.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] if the endpoints
    /// coincide or either is unregistered.
    pub fn ensure_edge(&mut self, a: PointId, b: PointId) -> TriangulationResult<usize> {
        if a == b {
            return Err(TriangulationError::MeshInvariant(format!(
                "edge with coincident endpoints {a}"
            )));
        }
        if let Some(idx) = self.find_edge(a, b) {
            return Ok(idx);
        }
        if self.point(a).is_none() || self.point(b).is_none() {
            return Err(TriangulationError::MeshInvariant(format!(
                "edge ({a}, {b}) references an unregistered point"
            )));
        }
        let idx = self.next_edge_id;
        self.next_edge_id += 1;
        let (low, high) = canonical_pair(a, b);
        self.edge_lookup.insert((low.0, high.0), idx);
        self.edges.insert(idx, Edge::new(a, b));
        self.link_neighbors(a, b);
        Ok(idx)
    }

    /// Removes an edge that no triangle uses any more.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] if the index is
    /// unknown or a triangle still references the edge.
    pub fn remove_edge(&mut self, idx: usize) -> TriangulationResult<Edge> {
        let Some(edge) = self.edges.get(&idx) else {
            return Err(TriangulationError::MeshInvariant(format!(
                "removal of unknown edge index {idx}"
            )));
        };
        if !edge.triangles.is_empty() {
            return Err(TriangulationError::MeshInvariant(format!(
                "removal of edge {idx} with {} incident triangles",
                edge.triangles.len()
            )));
        }
        let edge = self.edges.remove(&idx).expect("edge presence checked above");
        let (low, high) = edge.key();
        self.edge_lookup.remove(&(low.0, high.0));
        self.unlink_neighbors(edge.a, edge.b);
        Ok(edge)
    }

    /// Creates a triangle over three existing edges.
    ///
    /// The edges must be pairwise distinct and cycle over exactly three
    /// distinct points, each with room for another incident triangle.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] if any of those
    /// conditions fails.
    pub fn add_triangle(&mut self, edge_indices: [usize; 3]) -> TriangulationResult<usize> {
        let [i1, i2, i3] = edge_indices;
        if i1 == i2 || i1 == i3 || i2 == i3 {
            return Err(TriangulationError::MeshInvariant(format!(
                "triangle over repeated edge indices {edge_indices:?}"
            )));
        }
        let mut keys = [(PointId(0), PointId(0)); 3];
        for (slot, idx) in edge_indices.iter().enumerate() {
            let Some(edge) = self.edges.get(idx) else {
                return Err(TriangulationError::MeshInvariant(format!(
                    "triangle references unknown edge index {idx}"
                )));
            };
            if edge.triangles.len() >= 2 {
                return Err(TriangulationError::MeshInvariant(format!(
                    "edge {idx} already bounds two triangles"
                )));
            }
            keys[slot] = edge.key();
        }
        let points = triangle_points(keys).ok_or_else(|| {
            TriangulationError::MeshInvariant(format!(
                "edges {edge_indices:?} do not cycle over three distinct points"
            ))
        })?;

        let tri_idx = self.next_triangle_id;
        self.next_triangle_id += 1;
        for idx in edge_indices {
            self.edges
                .get_mut(&idx)
                .expect("edge presence checked above")
                .triangles
                .push(tri_idx);
        }
        self.triangles.insert(
            tri_idx,
            Triangle {
                edges: edge_indices,
                points,
            },
        );
        Ok(tri_idx)
    }

    /// Removes a triangle, releasing its edge incidences. The edges
    /// themselves stay in the mesh.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] if the index is
    /// unknown or an edge record has lost the back-reference.
    pub fn remove_triangle(&mut self, idx: usize) -> TriangulationResult<Triangle> {
        let Some(triangle) = self.triangles.remove(&idx) else {
            return Err(TriangulationError::MeshInvariant(format!(
                "removal of unknown triangle index {idx}"
            )));
        };
        for edge_idx in triangle.edges {
            let Some(edge) = self.edges.get_mut(&edge_idx) else {
                return Err(TriangulationError::MeshInvariant(format!(
                    "triangle {idx} references missing edge {edge_idx}"
                )));
            };
            let before = edge.triangles.len();
            edge.triangles.retain(|t| *t != idx);
            if edge.triangles.len() + 1 != before {
                return Err(TriangulationError::MeshInvariant(format!(
                    "edge {edge_idx} lost back-reference to triangle {idx}"
                )));
            }
        }
        Ok(triangle)
    }

    /// The unique edge of triangle `tri_idx` not incident to `p`.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] if the triangle is
    /// unknown or zero or more than one of its edges misses `p` — either
    /// means the mesh is corrupt.
    pub fn opposite_edge(&self, tri_idx: usize, p: PointId) -> TriangulationResult<usize> {
        let triangle = self.triangle(tri_idx).ok_or_else(|| {
            TriangulationError::MeshInvariant(format!("unknown triangle index {tri_idx}"))
        })?;
        let mut found = None;
        for edge_idx in triangle.edges {
            let edge = self.edge(edge_idx).ok_or_else(|| {
                TriangulationError::MeshInvariant(format!(
                    "triangle {tri_idx} references missing edge {edge_idx}"
                ))
            })?;
            if !edge.has_endpoint(p) {
                if found.is_some() {
                    return Err(TriangulationError::MeshInvariant(format!(
                        "triangle {tri_idx} has two edges not touching point {p}"
                    )));
                }
                found = Some(edge_idx);
            }
        }
        found.ok_or_else(|| {
            TriangulationError::MeshInvariant(format!(
                "triangle {tri_idx} has no edge opposite point {p}"
            ))
        })
    }

    /// The vertex of triangle `tri_idx` not on edge `edge_idx`.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] if either index is
    /// unknown or the triangle does not have exactly one such vertex.
    pub fn apex(&self, tri_idx: usize, edge_idx: usize) -> TriangulationResult<PointId> {
        let triangle = self.triangle(tri_idx).ok_or_else(|| {
            TriangulationError::MeshInvariant(format!("unknown triangle index {tri_idx}"))
        })?;
        let edge = self.edge(edge_idx).ok_or_else(|| {
            TriangulationError::MeshInvariant(format!("unknown edge index {edge_idx}"))
        })?;
        let mut apexes = triangle.points.iter().filter(|p| !edge.has_endpoint(**p));
        match (apexes.next(), apexes.next()) {
            (Some(apex), None) => Ok(*apex),
            _ => Err(TriangulationError::MeshInvariant(format!(
                "triangle {tri_idx} does not share edge {edge_idx}"
            ))),
        }
    }

    /// Coordinates of the triangle's vertices, in `points` order.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] if the triangle or a
    /// vertex record is missing.
    pub fn triangle_coords(&self, tri_idx: usize) -> TriangulationResult<[(f64, f64); 3]> {
        let triangle = self.triangle(tri_idx).ok_or_else(|| {
            TriangulationError::MeshInvariant(format!("unknown triangle index {tri_idx}"))
        })?;
        let mut coords = [(0.0, 0.0); 3];
        for (slot, p) in triangle.points.iter().enumerate() {
            coords[slot] = self.coords(*p)?;
        }
        Ok(coords)
    }

    /// Euclidean length of an edge.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] if the edge or an
    /// endpoint record is missing.
    pub fn edge_length(&self, edge_idx: usize) -> TriangulationResult<f64> {
        let edge = self.edge(edge_idx).ok_or_else(|| {
            TriangulationError::MeshInvariant(format!("unknown edge index {edge_idx}"))
        })?;
        Ok(distance(self.coords(edge.a)?, self.coords(edge.b)?))
    }

    /// The triangle's three side lengths, in `edges` order.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] if the triangle or
    /// any referenced record is missing.
    pub fn side_lengths(&self, tri_idx: usize) -> TriangulationResult<[f64; 3]> {
        let triangle = self.triangle(tri_idx).ok_or_else(|| {
            TriangulationError::MeshInvariant(format!("unknown triangle index {tri_idx}"))
        })?;
        let mut sides = [0.0; 3];
        for (slot, edge_idx) in triangle.edges.iter().enumerate() {
            sides[slot] = self.edge_length(*edge_idx)?;
        }
        Ok(sides)
    }

    /// Interior angles in degrees; angle `i` is opposite edge `i`.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] if the triangle or
    /// any referenced record is missing.
    pub fn angles(&self, tri_idx: usize) -> TriangulationResult<[f64; 3]> {
        Ok(angles_from_sides(self.side_lengths(tri_idx)?))
    }

    /// First triangle, in ascending arena order, whose closed interior
    /// contains `(x, y)`.
    #[must_use]
    pub fn locate(&self, x: f64, y: f64) -> Option<usize> {
        for (idx, _) in self.triangles() {
            if let Ok([a, b, c]) = self.triangle_coords(idx)
                && triangle_contains(a, b, c, (x, y))
            {
                return Some(idx);
            }
        }
        None
    }

    /// Edges sharing a triangle with `edge_idx`, derived from the
    /// incident-triangle lists.
    #[must_use]
    pub fn edge_neighbors(&self, edge_idx: usize) -> Vec<usize> {
        let mut neighbors = Vec::new();
        let Some(edge) = self.edge(edge_idx) else {
            return neighbors;
        };
        for tri_idx in &edge.triangles {
            if let Some(triangle) = self.triangle(*tri_idx) {
                for other in triangle.edges {
                    if other != edge_idx && !neighbors.contains(&other) {
                        neighbors.push(other);
                    }
                }
            }
        }
        neighbors.sort_unstable();
        neighbors
    }

    /// Full consistency check over every arena and adjacency cache.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::MeshInvariant`] describing the first
    /// violation found.
    pub fn validate(&self) -> TriangulationResult<()> {
        for (idx, edge) in self.edges() {
            if edge.a == edge.b {
                return Err(TriangulationError::MeshInvariant(format!(
                    "edge {idx} has coincident endpoints"
                )));
            }
            let (low, high) = edge.key();
            if low.0 > high.0 {
                return Err(TriangulationError::MeshInvariant(format!(
                    "edge {idx} canonical pair out of order"
                )));
            }
            if self.edge_lookup.get(&(low.0, high.0)) != Some(&idx) {
                return Err(TriangulationError::MeshInvariant(format!(
                    "edge {idx} missing from the canonical lookup"
                )));
            }
            if edge.triangles.len() > 2 {
                return Err(TriangulationError::MeshInvariant(format!(
                    "edge {idx} bounds {} triangles",
                    edge.triangles.len()
                )));
            }
            for endpoint in [edge.a, edge.b] {
                let point = self.point(endpoint).ok_or_else(|| {
                    TriangulationError::MeshInvariant(format!(
                        "edge {idx} references unregistered point {endpoint}"
                    ))
                })?;
                let other = edge.other_endpoint(endpoint).expect("endpoint of edge");
                if !point.neighbors.contains(&other) {
                    return Err(TriangulationError::MeshInvariant(format!(
                        "neighbor cache of point {endpoint} misses {other}"
                    )));
                }
            }
            for tri_idx in &edge.triangles {
                let triangle = self.triangle(*tri_idx).ok_or_else(|| {
                    TriangulationError::MeshInvariant(format!(
                        "edge {idx} references missing triangle {tri_idx}"
                    ))
                })?;
                if !triangle.has_edge_index(idx) {
                    return Err(TriangulationError::MeshInvariant(format!(
                        "triangle {tri_idx} does not list edge {idx}"
                    )));
                }
            }
        }
        for (idx, triangle) in self.triangles() {
            let mut distinct = triangle.points;
            distinct.sort_unstable();
            if distinct[0] == distinct[1] || distinct[1] == distinct[2] {
                return Err(TriangulationError::MeshInvariant(format!(
                    "triangle {idx} has repeated vertices"
                )));
            }
            for edge_idx in triangle.edges {
                let edge = self.edge(edge_idx).ok_or_else(|| {
                    TriangulationError::MeshInvariant(format!(
                        "triangle {idx} references missing edge {edge_idx}"
                    ))
                })?;
                if !edge.triangles.contains(&idx) {
                    return Err(TriangulationError::MeshInvariant(format!(
                        "edge {edge_idx} does not list triangle {idx}"
                    )));
                }
                if !triangle.contains_edge(edge) {
                    return Err(TriangulationError::MeshInvariant(format!(
                        "edge {edge_idx} endpoints are not vertices of triangle {idx}"
                    )));
                }
            }
            let [a, b, c] = self.triangle_coords(idx)?;
            if signed_area_doubled(a, b, c).abs() > f64::EPSILON {
                let sum: f64 = self.angles(idx)?.iter().sum();
                if (sum - 180.0).abs() > ANGLE_SUM_TOLERANCE {
                    return Err(TriangulationError::MeshInvariant(format!(
                        "triangle {idx} angles sum to {sum} degrees"
                    )));
                }
            }
        }
        Ok(())
    }

    fn link_neighbors(&mut self, a: PointId, b: PointId) {
        if let Some(point) = self.points.get_mut(&a.0) {
            point.neighbors.insert(b);
        }
        if let Some(point) = self.points.get_mut(&b.0) {
            point.neighbors.insert(a);
        }
    }

    fn unlink_neighbors(&mut self, a: PointId, b: PointId) {
        if let Some(point) = self.points.get_mut(&a.0) {
            point.neighbors.remove(&b);
        }
        if let Some(point) = self.points.get_mut(&b.0) {
            point.neighbors.remove(&a);
        }
    }
}

// The three distinct points a valid edge cycle covers, or None when the
// canonical pairs repeat or cover more than three ids. Order: first
// edge's endpoints, then the remaining vertex.
fn triangle_points(keys: [(PointId, PointId); 3]) -> Option<[PointId; 3]> {
    if keys[0] == keys[1] || keys[0] == keys[2] || keys[1] == keys[2] {
        return None;
    }
    let mut ids: Vec<PointId> = keys.iter().flat_map(|(a, b)| [*a, *b]).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != 3 {
        return None;
    }
    let (a, b) = keys[0];
    let third = *ids.iter().find(|p| **p != a && **p != b)?;
    Some([a, b, third])
}
