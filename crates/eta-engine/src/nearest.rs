//! First-arrival and nearest-station analyses.
//!
//! Both pick the single fastest station per target.  Nearest-station also
//! reconstructs that station's route to report a driving distance, and rates
//! the time on its own four-band scale, which is deliberately separate from
//! the two-band rank evaluation.

use std::fmt;

use eta_core::{NodeId, StationId, TargetId};

use crate::Arrival;

/// Fastest station for one target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FirstArrival {
    pub target: TargetId,
    pub node: NodeId,
    pub station: StationId,
    pub time_min: f64,
}

impl FirstArrival {
    /// Pick the head of `arrivals` (sorted fastest first, ties in station
    /// registration order).
    pub fn from_arrivals(target: TargetId, node: NodeId, arrivals: &[Arrival]) -> Option<FirstArrival> {
        let first = arrivals.first()?;
        Some(FirstArrival { target, node, station: first.station, time_min: first.time_min })
    }
}

/// Four-band rating of a single response time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NearestBand {
    /// ≤ 5 minutes.
    Excellent,
    /// ≤ 10 minutes.
    Good,
    /// ≤ 20 minutes.
    Satisfactory,
    Unsatisfactory,
}

impl NearestBand {
    pub fn classify(time_min: f64) -> NearestBand {
        if time_min <= 5.0 {
            NearestBand::Excellent
        } else if time_min <= 10.0 {
            NearestBand::Good
        } else if time_min <= 20.0 {
            NearestBand::Satisfactory
        } else {
            NearestBand::Unsatisfactory
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NearestBand::Excellent => "excellent",
            NearestBand::Good => "good",
            NearestBand::Satisfactory => "satisfactory",
            NearestBand::Unsatisfactory => "unsatisfactory",
        }
    }
}

impl fmt::Display for NearestBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Nearest-station result for one target.
#[derive(Clone, Debug, PartialEq)]
pub struct NearestStation {
    pub target: TargetId,
    pub station: StationId,
    pub station_name: String,
    pub response_time_min: f64,
    /// Driving distance along the reconstructed route; `None` if the route
    /// could not be rebuilt.
    pub distance_km: Option<f64>,
    pub band: NearestBand,
}
