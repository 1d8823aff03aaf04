//! Stations, targets, and their placement on the road graph.
//!
//! Resolution happens once per graph: every station and target is reduced
//! to a representative point and snapped to its nearest graph node.  Items
//! that cannot be placed are returned as plain values next to the resolved
//! ones; they never fail the run.

use std::fmt;

use geo::{Geometry, Point};
use tracing::warn;

use eta_core::{representative_point, GeoPoint, NodeId, NodeIx, StationId, TargetId};
use eta_graph::{NodeLocator, RoadGraph};

// ── Inputs ────────────────────────────────────────────────────────────────────

/// A depot that dispatches units.
#[derive(Clone, Debug)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub geometry: Geometry<f64>,
}

impl Station {
    pub fn new(id: StationId, name: impl Into<String>, geometry: Geometry<f64>) -> Self {
        Self { id, name: name.into(), geometry }
    }

    /// Station at a single point.
    pub fn at(id: StationId, name: impl Into<String>, pos: GeoPoint) -> Self {
        Self::new(id, name, Point::new(pos.lon, pos.lat).into())
    }
}

/// An object whose arrival time is evaluated.
#[derive(Clone, Debug)]
pub struct Target {
    pub id: TargetId,
    pub geometry: Geometry<f64>,
}

impl Target {
    pub fn new(id: TargetId, geometry: Geometry<f64>) -> Self {
        Self { id, geometry }
    }

    pub fn at(id: TargetId, pos: GeoPoint) -> Self {
        Self::new(id, Point::new(pos.lon, pos.lat).into())
    }
}

// ── Resolved entities ─────────────────────────────────────────────────────────

/// A station placed on the graph for the duration of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedStation {
    pub id: StationId,
    pub name: String,
    pub location: GeoPoint,
    pub node: NodeId,
    pub ix: NodeIx,
}

/// A target placed on the graph for the duration of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedTarget {
    pub id: TargetId,
    pub location: GeoPoint,
    pub node: NodeId,
    pub ix: NodeIx,
}

/// Why an entity could not be placed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlacementFailure {
    /// Empty or non-finite geometry; no representative point.
    NoLocation,
    /// The graph has no node with coordinates.
    NoNearbyNode,
}

impl fmt::Display for PlacementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementFailure::NoLocation => f.write_str("geometry has no usable location"),
            PlacementFailure::NoNearbyNode => f.write_str("no road node found nearby"),
        }
    }
}

/// A station excluded from the run.
#[derive(Clone, Debug, PartialEq)]
pub struct StationError {
    pub station: StationId,
    pub name: String,
    pub reason: PlacementFailure,
}

impl fmt::Display for StationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "station '{}' ({}): {}", self.name, self.station, self.reason)
    }
}

/// A target excluded from the run.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetSkip {
    pub target: TargetId,
    pub reason: PlacementFailure,
}

impl fmt::Display for TargetSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "target {}: {}", self.target, self.reason)
    }
}

// ── Resolution ────────────────────────────────────────────────────────────────

fn place(locator: &NodeLocator, geometry: &Geometry<f64>) -> Result<(GeoPoint, NodeIx), PlacementFailure> {
    let location = representative_point(geometry).ok_or(PlacementFailure::NoLocation)?;
    let ix = locator.nearest_ix(location).ok_or(PlacementFailure::NoNearbyNode)?;
    Ok((location, ix))
}

/// Snap every station to its nearest node, keeping input order.
pub fn resolve_stations(
    stations: &[Station],
    graph: &RoadGraph,
    locator: &NodeLocator,
) -> (Vec<ResolvedStation>, Vec<StationError>) {
    let mut resolved = Vec::with_capacity(stations.len());
    let mut errors = Vec::new();
    for s in stations {
        match place(locator, &s.geometry) {
            Ok((location, ix)) => resolved.push(ResolvedStation {
                id: s.id,
                name: s.name.clone(),
                location,
                node: graph.node_id(ix),
                ix,
            }),
            Err(reason) => {
                let err = StationError { station: s.id, name: s.name.clone(), reason };
                warn!("skipping {err}");
                errors.push(err);
            }
        }
    }
    (resolved, errors)
}

/// Snap every target to its nearest node, keeping input order.
pub fn resolve_targets(
    targets: &[Target],
    graph: &RoadGraph,
    locator: &NodeLocator,
) -> (Vec<ResolvedTarget>, Vec<TargetSkip>) {
    let mut resolved = Vec::with_capacity(targets.len());
    let mut skipped = Vec::new();
    for t in targets {
        match place(locator, &t.geometry) {
            Ok((location, ix)) => resolved.push(ResolvedTarget {
                id: t.id,
                location,
                node: graph.node_id(ix),
                ix,
            }),
            Err(reason) => {
                let skip = TargetSkip { target: t.id, reason };
                warn!("skipping {skip}");
                skipped.push(skip);
            }
        }
    }
    (resolved, skipped)
}
