//! Nearest-node resolution.
//!
//! # Metric
//!
//! Distance is great-circle (haversine) distance on a sphere of radius
//! 6 371 km.  Nodes without coordinates are never returned.
//!
//! # Tie-break
//!
//! When two nodes are at exactly the same distance from the query point the
//! one with the lowest [`NodeId`] wins, independent of insertion order.
//!
//! # Index
//!
//! [`NodeLocator`] stores every node as a point on the unit sphere in an
//! R-tree (`rstar`).  Chord length grows strictly with arc length, so the
//! R-tree's Euclidean nearest neighbour is also the haversine nearest; the
//! few candidates within rounding distance of the best chord are re-ranked by
//! haversine distance and id.  [`nearest_node`] is the O(n) linear scan with
//! the same contract, kept as a reference.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use eta_core::{GeoPoint, NodeId, NodeIx};

use crate::RoadGraph;

/// Relative slack on squared chord distance within which R-tree candidates
/// are re-ranked by haversine distance.
const CHORD_TIE_SLACK: f64 = 1e-9;

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 3],
    pos: GeoPoint,
    ix: NodeIx,
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── NodeLocator ───────────────────────────────────────────────────────────────

/// Spatial index answering "which graph node is closest to this point?".
///
/// Built once per graph; the graph must not change afterwards.
pub struct NodeLocator {
    tree: RTree<NodeEntry>,
}

impl NodeLocator {
    /// Bulk-load every node that has finite coordinates.
    ///
    /// Time complexity: O(N log N).
    pub fn new(graph: &RoadGraph) -> Self {
        let entries: Vec<NodeEntry> = graph
            .node_pos
            .iter()
            .enumerate()
            .filter_map(|(i, pos)| {
                let pos = pos.filter(|p| p.is_finite())?;
                Some(NodeEntry {
                    point: pos.unit_vector(),
                    pos,
                    ix: NodeIx(i as u32),
                    id: graph.node_id[i],
                })
            })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    /// Number of indexed (coordinate-bearing) nodes.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Id of the node nearest to `pos`, or `None` if no node has coordinates.
    pub fn nearest(&self, pos: GeoPoint) -> Option<NodeId> {
        self.nearest_entry(pos).map(|e| e.id)
    }

    /// Dense index of the node nearest to `pos`.
    pub fn nearest_ix(&self, pos: GeoPoint) -> Option<NodeIx> {
        self.nearest_entry(pos).map(|e| e.ix)
    }

    fn nearest_entry(&self, pos: GeoPoint) -> Option<&NodeEntry> {
        if !pos.is_finite() {
            return None;
        }
        let query = pos.unit_vector();
        let mut candidates = self.tree.nearest_neighbor_iter_with_distance_2(&query);

        let (first, first_d2) = candidates.next()?;
        let limit = first_d2 * (1.0 + CHORD_TIE_SLACK) + f64::EPSILON * f64::EPSILON;

        let mut best = first;
        let mut best_m = pos.distance_m(first.pos);
        for (entry, d2) in candidates {
            if d2 > limit {
                break;
            }
            let m = pos.distance_m(entry.pos);
            if m < best_m || (m == best_m && entry.id < best.id) {
                best = entry;
                best_m = m;
            }
        }
        Some(best)
    }
}

// ── Reference scan ────────────────────────────────────────────────────────────

/// Linear-scan nearest node by haversine distance, lowest id on ties.
///
/// O(n) per query; prefer [`NodeLocator`] when resolving more than a handful
/// of points against the same graph.
pub fn nearest_node(graph: &RoadGraph, lon: f64, lat: f64) -> Option<NodeId> {
    let query = GeoPoint::new(lon, lat);
    if !query.is_finite() {
        return None;
    }
    graph
        .node_pos
        .iter()
        .zip(&graph.node_id)
        .filter_map(|(pos, &id)| {
            let pos = pos.filter(|p| p.is_finite())?;
            Some((query.distance_m(pos), id))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
        .map(|(_, id)| id)
}
