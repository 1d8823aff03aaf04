//! Route mode: which station→target routes to draw.

use eta_core::{GeoPoint, StationId, TargetId};

use crate::Arrival;

/// Default threshold for [`RouteSelection::WithinThreshold`], in minutes.
pub const DEFAULT_ROUTE_THRESHOLD_MIN: f64 = 30.0;

/// Which stations get a route to each target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RouteSelection {
    /// Only the fastest station.
    Nearest,
    /// Every station that reaches the target.
    All,
    /// Every station arriving within the given number of minutes.
    WithinThreshold(f64),
}

impl Default for RouteSelection {
    fn default() -> Self {
        RouteSelection::WithinThreshold(DEFAULT_ROUTE_THRESHOLD_MIN)
    }
}

impl RouteSelection {
    /// The subset of `arrivals` (sorted fastest first) to draw, in order.
    pub fn select<'a>(&self, arrivals: &'a [Arrival]) -> &'a [Arrival] {
        match *self {
            RouteSelection::Nearest => &arrivals[..arrivals.len().min(1)],
            RouteSelection::All => arrivals,
            RouteSelection::WithinThreshold(limit) => {
                let n = arrivals.partition_point(|a| a.time_min <= limit);
                &arrivals[..n]
            }
        }
    }
}

/// One drawable station→target route.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteRecord {
    pub target: TargetId,
    pub station: StationId,
    pub station_name: String,
    /// Arrival time from the matrix, turnout delay included.
    pub time_min: f64,
    pub distance_km: f64,
    /// Station first, target last.
    pub coords: Vec<GeoPoint>,
}
