//! Results sink: where per-target records go.

use eta_core::{NodeId, StationId, TargetId};

use crate::{FirstArrival, NearestStation, RouteRecord, TargetRanks};

/// One row of the exported arrival matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct MatrixRow {
    pub target: TargetId,
    pub node: NodeId,
    /// One entry per resolved station, in station order; `None` if
    /// unreachable.
    pub times: Vec<(StationId, Option<f64>)>,
}

/// Receives analysis output.
///
/// All methods have default no-op implementations so implementors only need
/// to override the record types they persist.  Records for one target are
/// delivered together, targets in input order.
pub trait ResultSink {
    fn on_ranks(&mut self, _record: &TargetRanks) {}

    fn on_matrix_row(&mut self, _record: &MatrixRow) {}

    fn on_first_arrival(&mut self, _record: &FirstArrival) {}

    fn on_nearest_station(&mut self, _record: &NearestStation) {}

    fn on_route(&mut self, _record: &RouteRecord) {}
}

/// A [`ResultSink`] that drops everything.
pub struct NoopSink;

impl ResultSink for NoopSink {}

/// A [`ResultSink`] that keeps every record in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub ranks: Vec<TargetRanks>,
    pub matrix: Vec<MatrixRow>,
    pub first_arrivals: Vec<FirstArrival>,
    pub nearest: Vec<NearestStation>,
    pub routes: Vec<RouteRecord>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultSink for CollectingSink {
    fn on_ranks(&mut self, record: &TargetRanks) {
        self.ranks.push(record.clone());
    }

    fn on_matrix_row(&mut self, record: &MatrixRow) {
        self.matrix.push(record.clone());
    }

    fn on_first_arrival(&mut self, record: &FirstArrival) {
        self.first_arrivals.push(*record);
    }

    fn on_nearest_station(&mut self, record: &NearestStation) {
        self.nearest.push(record.clone());
    }

    fn on_route(&mut self, record: &RouteRecord) {
        self.routes.push(record.clone());
    }
}
