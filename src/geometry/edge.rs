//! Edge records and the canonical endpoint key.

use crate::geometry::point::PointId;

/// Canonical (low, high) form of an unordered endpoint pair.
///
/// A pure function of the two invoked integer ids, independent of the
/// order in which the endpoints are given. Used as the dedup key for the
/// mesh edge table and as a deterministic tie-break wherever edges must
/// be ordered.
#[must_use]
pub fn canonical_pair(a: PointId, b: PointId) -> (PointId, PointId) {
    if a.0 <= b.0 { (a, b) } else { (b, a) }
}

/// An edge of the mesh: an unordered pair of distinct point ids.
///
/// `triangles` lists the arena indices of the incident triangles (at most
/// two; exactly one for boundary edges of the super-triangle). It is
/// adjacency maintained by the mesh, from which neighboring edges are
/// derived on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// First endpoint as given at creation.
    pub a: PointId,
    /// Second endpoint as given at creation.
    pub b: PointId,
    /// Arena indices of incident triangles, at most two.
    pub triangles: Vec<usize>,
}

impl Edge {
    /// Creates an edge with no incident triangles yet.
    ///
    /// Endpoint distinctness is enforced by the mesh before records are
    /// created.
    #[must_use]
    pub const fn new(a: PointId, b: PointId) -> Self {
        Self {
            a,
            b,
            triangles: Vec::new(),
        }
    }

    /// The canonical (low, high) endpoint pair.
    #[must_use]
    pub fn key(&self) -> (PointId, PointId) {
        canonical_pair(self.a, self.b)
    }

    /// Lower endpoint id.
    #[must_use]
    pub fn low(&self) -> PointId {
        self.key().0
    }

    /// Higher endpoint id.
    #[must_use]
    pub fn high(&self) -> PointId {
        self.key().1
    }

    /// Both endpoints in creation order.
    #[must_use]
    pub const fn endpoints(&self) -> (PointId, PointId) {
        (self.a, self.b)
    }

    /// True if `p` is one of the two endpoints.
    #[must_use]
    pub fn has_endpoint(&self, p: PointId) -> bool {
        self.a == p || self.b == p
    }

    /// The endpoint that is not `p`.
    ///
    /// Returns `None` when `p` is not an endpoint of this edge.
    #[must_use]
    pub fn other_endpoint(&self, p: PointId) -> Option<PointId> {
        if self.a == p {
            Some(self.b)
        } else if self.b == p {
            Some(self.a)
        } else {
            None
        }
    }

    /// An endpoint shared with `other`, if any.
    #[must_use]
    pub fn common_endpoint(&self, other: &Self) -> Option<PointId> {
        if other.has_endpoint(self.a) {
            Some(self.a)
        } else if other.has_endpoint(self.b) {
            Some(self.b)
        } else {
            None
        }
    }

    /// True when this edge lies on the mesh boundary (single incident
    /// triangle).
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        self.triangles.len() < 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn canonical_pair_orders_low_high() {
        let (low, high) = canonical_pair(PointId(5), PointId(2));
        assert_eq!(low, PointId(2));
        assert_eq!(high, PointId(5));
    }

    #[test]
    fn canonical_pair_handles_synthetic_ids() {
        let (low, high) = canonical_pair(PointId(0), PointId(-3));
        assert_eq!(low, PointId(-3));
        assert_eq!(high, PointId(0));
    }

    #[test]
    fn endpoint_queries() {
        let e = Edge::new(PointId(4), PointId(1));
        assert!(e.has_endpoint(PointId(4)));
        assert!(e.has_endpoint(PointId(1)));
        assert!(!e.has_endpoint(PointId(2)));
        assert_eq!(e.other_endpoint(PointId(4)), Some(PointId(1)));
        assert_eq!(e.other_endpoint(PointId(9)), None);
        assert_eq!(e.low(), PointId(1));
        assert_eq!(e.high(), PointId(4));
    }

    #[test]
    fn common_endpoint_found_and_absent() {
        let e1 = Edge::new(PointId(1), PointId(2));
        let e2 = Edge::new(PointId(2), PointId(3));
        let e3 = Edge::new(PointId(4), PointId(5));
        assert_eq!(e1.common_endpoint(&e2), Some(PointId(2)));
        assert_eq!(e1.common_endpoint(&e3), None);
    }

    #[test]
    fn fresh_edge_is_boundary() {
        let e = Edge::new(PointId(1), PointId(2));
        assert!(e.is_boundary());
    }

    proptest! {
        #[test]
        fn canonical_pair_is_order_independent(a in -1000i64..1000, b in -1000i64..1000) {
            let forward = canonical_pair(PointId(a), PointId(b));
            let reverse = canonical_pair(PointId(b), PointId(a));
            prop_assert_eq!(forward, reverse);
            prop_assert!(forward.0.0 <= forward.1.0);
        }
    }
}
