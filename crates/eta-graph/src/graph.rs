//! Road multigraph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeIx n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edge_*[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays are sorted by source node and indexed by `EdgeIx`.  The
//! sort is stable, so parallel edges between the same ordered node pair keep
//! the order in which the collaborator supplied them.
//!
//! # Multigraph semantics
//!
//! Several edges may join the same ordered pair `(u, v)`; they are told apart
//! by `edge_key`.  Edge speeds and travel times are empty until
//! [`RoadGraph::apply_speeds`](crate::speed) runs.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use eta_core::{EdgeIx, GeoPoint, NodeId, NodeIx};

use crate::{GraphError, GraphResult};

// ── RoadGraph ─────────────────────────────────────────────────────────────────

/// Directed road multigraph in CSR format.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadGraphBuilder`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadGraph {
    // ── Node data (indexed by NodeIx) ─────────────────────────────────────
    /// Road-data id of each node.
    pub node_id: Vec<NodeId>,

    /// Position of each node; `None` when the supplier had no coordinates.
    pub node_pos: Vec<Option<GeoPoint>>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeIx) ─────────────────────────────────────
    pub edge_from: Vec<NodeIx>,
    pub edge_to: Vec<NodeIx>,

    /// Parallel-edge discriminator within one `(from, to)` pair.
    pub edge_key: Vec<u32>,

    /// Road-class tags.  Usually one; merged edges may carry several.
    pub edge_road_class: Vec<Vec<String>>,

    /// Length in metres, if the supplier provided one.
    pub edge_length_m: Vec<Option<f64>>,

    /// Speed in metres/minute, set by `apply_speeds`.
    pub edge_speed_mm: Vec<Option<f64>>,

    /// Travel time in minutes.  `None` marks an edge as not traversable.
    pub edge_travel_min: Vec<Option<f64>>,

    /// The supplier merged edges during topology simplification.
    pub simplified: bool,

    ix_by_id: FxHashMap<NodeId, NodeIx>,
}

impl RoadGraph {
    /// Construct a graph with no nodes or edges.
    pub fn empty() -> Self {
        RoadGraphBuilder::new().build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_id.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_id.is_empty()
    }

    pub fn is_simplified(&self) -> bool {
        self.simplified
    }

    // ── Id translation ────────────────────────────────────────────────────

    /// Dense index of a road-data node id.
    #[inline]
    pub fn node_ix(&self, id: NodeId) -> Option<NodeIx> {
        self.ix_by_id.get(&id).copied()
    }

    #[inline]
    pub fn node_id(&self, ix: NodeIx) -> NodeId {
        self.node_id[ix.index()]
    }

    #[inline]
    pub fn node_pos(&self, ix: NodeIx) -> Option<GeoPoint> {
        self.node_pos[ix.index()]
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeIx`s of all outgoing edges from `node`.
    #[inline]
    pub fn out_edges(&self, node: NodeIx) -> impl Iterator<Item = EdgeIx> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeIx(i as u32))
    }

    #[inline]
    pub fn out_degree(&self, node: NodeIx) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// All parallel edges `from → to`, in supplier order.
    pub fn edges_between(&self, from: NodeIx, to: NodeIx) -> impl Iterator<Item = EdgeIx> + '_ {
        self.out_edges(from)
            .filter(move |e| self.edge_to[e.index()] == to)
    }

    /// Travel time of an edge, or `None` if it is not traversable.
    #[inline]
    pub fn travel_time_min(&self, edge: EdgeIx) -> Option<f64> {
        self.edge_travel_min[edge.index()]
    }

    /// Structural sanity check used when a graph comes from an untrusted
    /// source such as the on-disk cache.
    pub fn is_consistent(&self) -> bool {
        let n = self.node_count();
        let e = self.edge_count();
        self.node_pos.len() == n
            && self.node_out_start.len() == n + 1
            && self.node_out_start.last().map(|&last| last as usize) == Some(e)
            && self.node_out_start.windows(2).all(|w| w[0] <= w[1])
            && self.edge_from.len() == e
            && self.edge_key.len() == e
            && self.edge_road_class.len() == e
            && self.edge_length_m.len() == e
            && self.edge_speed_mm.len() == e
            && self.edge_travel_min.len() == e
            && self.edge_from.iter().all(|ix| ix.index() < n)
            && self.edge_to.iter().all(|ix| ix.index() < n)
            && self.ix_by_id.len() == n
            && self.ix_by_id.values().all(|ix| ix.index() < n)
    }
}

// ── RoadGraphBuilder ──────────────────────────────────────────────────────────

/// One directed edge as delivered by the graph supplier.
#[derive(Clone, Debug, PartialEq)]
pub struct RawEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub key: u32,
    pub road_class: Vec<String>,
    pub length_m: Option<f64>,
}

impl RawEdge {
    /// Edge with a single road-class tag and key 0.
    pub fn new(from: NodeId, to: NodeId, road_class: &str, length_m: f64) -> Self {
        Self {
            from,
            to,
            key: 0,
            road_class: vec![road_class.to_owned()],
            length_m: Some(length_m),
        }
    }

    pub fn with_key(mut self, key: u32) -> Self {
        self.key = key;
        self
    }
}

/// Construct a [`RoadGraph`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use eta_core::{GeoPoint, NodeId};
/// use eta_graph::{RawEdge, RoadGraphBuilder};
///
/// let mut b = RoadGraphBuilder::new();
/// b.add_node(NodeId(1), Some(GeoPoint::new(37.60, 55.75))).unwrap();
/// b.add_node(NodeId(2), Some(GeoPoint::new(37.61, 55.75))).unwrap();
/// b.add_edge(RawEdge::new(NodeId(1), NodeId(2), "residential", 630.0)).unwrap();
/// let g = b.build();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 1);
/// ```
pub struct RoadGraphBuilder {
    node_id: Vec<NodeId>,
    node_pos: Vec<Option<GeoPoint>>,
    ix_by_id: FxHashMap<NodeId, NodeIx>,
    raw_edges: Vec<PendingEdge>,
    simplified: bool,
}

struct PendingEdge {
    from: NodeIx,
    to: NodeIx,
    key: u32,
    road_class: Vec<String>,
    length_m: Option<f64>,
}

impl RoadGraphBuilder {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            node_id: Vec::with_capacity(nodes),
            node_pos: Vec::with_capacity(nodes),
            ix_by_id: FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            raw_edges: Vec::with_capacity(edges),
            simplified: false,
        }
    }

    /// Add a node and return its dense index (sequential from 0).
    pub fn add_node(&mut self, id: NodeId, pos: Option<GeoPoint>) -> GraphResult<NodeIx> {
        if self.ix_by_id.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        let ix = NodeIx(self.node_id.len() as u32);
        self.node_id.push(id);
        self.node_pos.push(pos);
        self.ix_by_id.insert(id, ix);
        Ok(ix)
    }

    /// Add a **directed** edge.  Both endpoints must already exist.
    pub fn add_edge(&mut self, edge: RawEdge) -> GraphResult<()> {
        let from = *self.ix_by_id.get(&edge.from).ok_or(GraphError::UnknownNode(edge.from))?;
        let to = *self.ix_by_id.get(&edge.to).ok_or(GraphError::UnknownNode(edge.to))?;
        self.raw_edges.push(PendingEdge {
            from,
            to,
            key: edge.key,
            road_class: edge.road_class,
            length_m: edge.length_m,
        });
        Ok(())
    }

    /// Convenience: add edges in **both directions** for a two-way road.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, road_class: &str, length_m: f64) -> GraphResult<()> {
        self.add_edge(RawEdge::new(a, b, road_class, length_m))?;
        self.add_edge(RawEdge::new(b, a, road_class, length_m))
    }

    /// Record that the supplier simplified the topology (merged edges).
    pub fn mark_simplified(&mut self) -> &mut Self {
        self.simplified = true;
        self
    }

    pub fn node_count(&self) -> usize { self.node_id.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`RoadGraph`].
    ///
    /// Time complexity: O(E log E) for the stable edge sort.
    pub fn build(self) -> RoadGraph {
        let node_count = self.node_id.len();
        let edge_count = self.raw_edges.len();

        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let edge_from: Vec<NodeIx> = raw.iter().map(|e| e.from).collect();
        let edge_to: Vec<NodeIx> = raw.iter().map(|e| e.to).collect();
        let edge_key: Vec<u32> = raw.iter().map(|e| e.key).collect();
        let edge_length_m: Vec<Option<f64>> = raw.iter().map(|e| e.length_m).collect();
        let edge_road_class: Vec<Vec<String>> = raw.into_iter().map(|e| e.road_class).collect();

        RoadGraph {
            node_id: self.node_id,
            node_pos: self.node_pos,
            node_out_start,
            edge_from,
            edge_to,
            edge_key,
            edge_road_class,
            edge_length_m,
            edge_speed_mm: vec![None; edge_count],
            edge_travel_min: vec![None; edge_count],
            simplified: self.simplified,
            ix_by_id: self.ix_by_id,
        }
    }
}

impl Default for RoadGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
