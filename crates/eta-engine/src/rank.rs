//! Dispatch-rank aggregation.
//!
//! For each rank requiring `k` units, the `k` fastest arrivals at a target
//! are summarised.  Fewer than `k` reachable stations is not an error: the
//! rank is summarised over whatever is available.
//!
//! The overall figures are a min of minimums, a max of maximums, and a
//! *mean of per-rank averages*.  Every rank weighs the same in the mean no
//! matter how many stations it covers.

use std::fmt;

use eta_core::{DispatchRank, NodeId, TargetId};

use crate::Arrival;

/// Summary of the arrivals counted by one rank.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RankStats {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    /// Number of stations the stats were computed over.
    pub count: usize,
}

impl RankStats {
    /// Stats over the first `min(units, arrivals.len())` arrivals.
    ///
    /// `arrivals` must be sorted fastest first.
    pub fn of_fastest(arrivals: &[Arrival], units: usize) -> Option<RankStats> {
        let used = &arrivals[..units.min(arrivals.len())];
        if used.is_empty() {
            return None;
        }
        let (min, max, sum) = used.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0.0),
            |(lo, hi, sum), a| (lo.min(a.time_min), hi.max(a.time_min), sum + a.time_min),
        );
        Some(RankStats { min, max, avg: sum / used.len() as f64, count: used.len() })
    }
}

/// One rank's result for one target.
#[derive(Clone, Debug, PartialEq)]
pub struct RankOutcome {
    pub name: String,
    pub units: usize,
    /// `None` when no station reaches the target.
    pub stats: Option<RankStats>,
}

/// Cross-rank summary for one target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverallStats {
    pub arrival_time_min: f64,
    pub arrival_time_max: f64,
    pub arrival_time_mean: f64,
}

/// Two-band rating of the overall mean.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Evaluation {
    Satisfactory,
    Unsatisfactory,
}

impl Evaluation {
    /// `mean <= threshold` is satisfactory.
    pub fn of_mean(mean: f64, threshold_min: f64) -> Evaluation {
        if mean <= threshold_min {
            Evaluation::Satisfactory
        } else {
            Evaluation::Unsatisfactory
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Evaluation::Satisfactory => "satisfactory",
            Evaluation::Unsatisfactory => "unsatisfactory",
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything rank analysis produces for one target.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetRanks {
    pub target: TargetId,
    pub node: NodeId,
    /// One entry per configured rank, in configuration order.
    pub ranks: Vec<RankOutcome>,
    pub overall: Option<OverallStats>,
    pub evaluation: Option<Evaluation>,
}

impl TargetRanks {
    /// `true` when no station reaches the target.
    pub fn is_unreached(&self) -> bool {
        self.overall.is_none()
    }
}

// ── RankAggregator ────────────────────────────────────────────────────────────

/// Stateless rank aggregation over a fixed rank ladder.
#[derive(Clone, Debug)]
pub struct RankAggregator {
    ranks: Vec<DispatchRank>,
    threshold_min: f64,
}

impl RankAggregator {
    pub fn new(ranks: Vec<DispatchRank>, threshold_min: f64) -> Self {
        Self { ranks, threshold_min }
    }

    pub fn ranks(&self) -> &[DispatchRank] {
        &self.ranks
    }

    /// Aggregate the arrivals at one target, sorted fastest first.
    pub fn aggregate(&self, target: TargetId, node: NodeId, arrivals: &[Arrival]) -> TargetRanks {
        let ranks: Vec<RankOutcome> = self
            .ranks
            .iter()
            .map(|r| RankOutcome {
                name: r.name.clone(),
                units: r.units,
                stats: RankStats::of_fastest(arrivals, r.units),
            })
            .collect();

        let overall = overall(&ranks);
        let evaluation = overall.map(|o| Evaluation::of_mean(o.arrival_time_mean, self.threshold_min));
        TargetRanks { target, node, ranks, overall, evaluation }
    }
}

fn overall(ranks: &[RankOutcome]) -> Option<OverallStats> {
    let stats: Vec<&RankStats> = ranks.iter().filter_map(|r| r.stats.as_ref()).collect();
    if stats.is_empty() {
        return None;
    }
    Some(OverallStats {
        arrival_time_min: stats.iter().map(|s| s.min).fold(f64::INFINITY, f64::min),
        arrival_time_max: stats.iter().map(|s| s.max).fold(f64::NEG_INFINITY, f64::max),
        arrival_time_mean: stats.iter().map(|s| s.avg).sum::<f64>() / stats.len() as f64,
    })
}
