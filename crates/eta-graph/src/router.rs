//! Routing trait and default Dijkstra implementation.
//!
//! # Pluggability
//!
//! The arrival-time engine calls routing through the [`Router`] trait, so a
//! bidirectional search or contraction hierarchy can replace the default
//! [`DijkstraRouter`] without touching the engine.
//!
//! # Cost units
//!
//! Costs are edge `travel_time_min` values (minutes, `f64`).  Edges without a
//! travel time are not traversable and are never relaxed.  Every usable
//! weight is positive, which Dijkstra requires.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use eta_core::{EdgeIx, NodeId, NodeIx};

use crate::{GraphError, GraphResult, RoadGraph};

// ── ShortestPathTree ──────────────────────────────────────────────────────────

/// One-to-all result of a single-source search.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    pub source: NodeIx,
    /// Best travel time to each node; `f64::INFINITY` for unreached nodes.
    time_min: Vec<f64>,
    /// Edge that reached each node; `EdgeIx::INVALID` for the source and
    /// unreached nodes.
    prev_edge: Vec<EdgeIx>,
}

impl ShortestPathTree {
    /// Travel time to `node`, or `None` if it is unreachable.
    #[inline]
    pub fn time_to(&self, node: NodeIx) -> Option<f64> {
        let t = self.time_min[node.index()];
        t.is_finite().then_some(t)
    }

    /// Iterator over every reached node and its travel time.
    pub fn reached(&self) -> impl Iterator<Item = (NodeIx, f64)> + '_ {
        self.time_min
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_finite())
            .map(|(i, &t)| (NodeIx(i as u32), t))
    }

    /// Node sequence from the source to `node`, both inclusive.
    pub fn path_to(&self, graph: &RoadGraph, node: NodeIx) -> Option<Vec<NodeIx>> {
        self.time_to(node)?;
        let mut nodes = vec![node];
        let mut cur = node;
        while cur != self.source {
            let e = self.prev_edge[cur.index()];
            if e == EdgeIx::INVALID {
                return None;
            }
            cur = graph.edge_from[e.index()];
            nodes.push(cur);
        }
        nodes.reverse();
        Some(nodes)
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable single-source shortest-path engine.
///
/// Implementations must be `Send + Sync` so one router can serve every
/// rayon worker of the matrix engine.
pub trait Router: Send + Sync {
    /// Shortest travel time from `source` to every reachable node.
    fn shortest_tree(&self, graph: &RoadGraph, source: NodeIx) -> ShortestPathTree;

    /// Node-id path of minimum travel time from `from` to `to`.
    ///
    /// `from == to` yields the single-node path.
    fn route(&self, graph: &RoadGraph, from: NodeId, to: NodeId) -> GraphResult<Vec<NodeId>> {
        let src = graph.node_ix(from).ok_or(GraphError::UnknownNode(from))?;
        let dst = graph.node_ix(to).ok_or(GraphError::UnknownNode(to))?;
        let tree = self.shortest_tree(graph, src);
        tree.path_to(graph, dst)
            .map(|p| p.into_iter().map(|ix| graph.node_id(ix)).collect())
            .ok_or(GraphError::NoRoute { from, to })
    }
}

impl<R: Router + ?Sized> Router for &R {
    fn shortest_tree(&self, graph: &RoadGraph, source: NodeIx) -> ShortestPathTree {
        (**self).shortest_tree(graph, source)
    }
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Binary-heap Dijkstra over the CSR multigraph.
///
/// Parallel edges need no special treatment: each is relaxed on its own and
/// the cheapest one wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn shortest_tree(&self, graph: &RoadGraph, source: NodeIx) -> ShortestPathTree {
        dijkstra(graph, source)
    }
}

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeIx,
}

impl Eq for State {}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by cost; NodeIx breaks ties deterministically.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn dijkstra(graph: &RoadGraph, source: NodeIx) -> ShortestPathTree {
    let n = graph.node_count();
    let mut time_min = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeIx::INVALID; n];

    if source.index() >= n {
        return ShortestPathTree { source, time_min, prev_edge };
    }

    time_min[source.index()] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(State { cost: 0.0, node: source });

    while let Some(State { cost, node }) = heap.pop() {
        // Skip stale heap entries.
        if cost > time_min[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let Some(w) = graph.travel_time_min(edge) else {
                continue;
            };
            let next = graph.edge_to[edge.index()];
            let next_cost = cost + w;

            if next_cost < time_min[next.index()] {
                time_min[next.index()] = next_cost;
                prev_edge[next.index()] = edge;
                heap.push(State { cost: next_cost, node: next });
            }
        }
    }

    ShortestPathTree { source, time_min, prev_edge }
}
