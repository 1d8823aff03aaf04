//! `eta-engine`: arrival-time matrix, dispatch-rank aggregation, and the
//! end-to-end analysis pipeline.
//!
//! # Pipeline
//!
//! ```text
//! Station / Target geometry
//!   → Extent (+ buffer) → GraphCache | GraphSource → RoadGraph
//!   → apply_speeds → NodeLocator → ResolvedStation / ResolvedTarget
//!   → MatrixEngine  (one Dijkstra per station)  → ArrivalMatrix
//!   → per target:   RankAggregator | MatrixRow | FirstArrival
//!                   | NearestStation | RouteRecord  → ResultSink
//! ```
//!
//! # Error model
//!
//! Run-level problems (bad config, empty inputs, graph source failure) are
//! [`EngineError`]s.  A station or target that cannot be placed is a
//! [`StationError`] / [`TargetSkip`] in the [`AnalysisReport`].  A target no
//! station reaches is simply absent from the matrix and has no rank stats.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Runs per-station traversals on Rayon's thread pool.      |

pub mod analysis;
pub mod error;
pub mod input;
pub mod matrix;
pub mod nearest;
pub mod progress;
pub mod rank;
pub mod routes;
pub mod sink;


pub use analysis::{Analysis, AnalysisModes, AnalysisReport};
pub use error::{EngineError, EngineResult};
pub use input::{
    resolve_stations, resolve_targets, PlacementFailure, ResolvedStation, ResolvedTarget, Station,
    StationError, Target, TargetSkip,
};
pub use matrix::{Arrival, ArrivalMatrix, MatrixEngine, MatrixRun};
pub use nearest::{FirstArrival, NearestBand, NearestStation};
pub use progress::{CancelToken, NoopProgress, ProgressSink};
pub use rank::{Evaluation, OverallStats, RankAggregator, RankOutcome, RankStats, TargetRanks};
pub use routes::{RouteRecord, RouteSelection, DEFAULT_ROUTE_THRESHOLD_MIN};
pub use sink::{CollectingSink, MatrixRow, NoopSink, ResultSink};
