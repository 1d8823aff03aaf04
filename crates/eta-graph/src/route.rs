//! Route reconstruction: node sequence → coordinates, time, and length.
//!
//! Used only for routes that will actually be displayed, so it runs lazily
//! after the matrix is computed.

use tracing::debug;

use eta_core::{EdgeIx, GeoPoint, NodeId, NodeIx};

use crate::{GraphError, GraphResult, RoadGraph};

/// A materialised route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    pub nodes: Vec<NodeId>,
    /// Coordinates of every node that has them, in path order.
    pub coords: Vec<GeoPoint>,
    pub travel_time_min: f64,
    pub length_m: f64,
}

impl RouteGeometry {
    /// `true` if the geometry can be drawn as a line.
    pub fn is_drawable(&self) -> bool {
        self.coords.len() >= 2
    }

    pub fn length_km(&self) -> f64 {
        self.length_m / 1000.0
    }
}

/// Walk `nodes` and sum one edge per hop.
///
/// For each consecutive pair the parallel edge with the lowest travel time is
/// used.  If none of the parallel edges is traversable the first one in
/// supplier order stands in, contributing zero time and its length (or zero).
/// Hops with no edge at all contribute nothing.
///
/// # Errors
///
/// [`GraphError::UnknownNode`] if any id is not in `graph`.
pub fn reconstruct_route(graph: &RoadGraph, nodes: &[NodeId]) -> GraphResult<RouteGeometry> {
    let ixs: Vec<NodeIx> = nodes
        .iter()
        .map(|&id| graph.node_ix(id).ok_or(GraphError::UnknownNode(id)))
        .collect::<GraphResult<_>>()?;

    let coords = ixs.iter().filter_map(|&ix| graph.node_pos(ix)).collect();

    let mut travel_time_min = 0.0;
    let mut length_m = 0.0;
    for pair in ixs.windows(2) {
        let (u, v) = (pair[0], pair[1]);
        match hop_edge(graph, u, v) {
            Some((edge, time)) => {
                travel_time_min += time;
                length_m += graph.edge_length_m[edge.index()].unwrap_or(0.0);
            }
            None => debug!(
                "no edge {} -> {} on reconstructed route",
                graph.node_id(u),
                graph.node_id(v)
            ),
        }
    }

    Ok(RouteGeometry {
        nodes: nodes.to_vec(),
        coords,
        travel_time_min,
        length_m,
    })
}

/// The parallel edge `u → v` with minimum travel time, with that time.
fn hop_edge(graph: &RoadGraph, u: NodeIx, v: NodeIx) -> Option<(EdgeIx, f64)> {
    let best = graph
        .edges_between(u, v)
        .filter_map(|e| graph.travel_time_min(e).map(|t| (e, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1));

    best.or_else(|| graph.edges_between(u, v).next().map(|e| (e, 0.0)))
}
