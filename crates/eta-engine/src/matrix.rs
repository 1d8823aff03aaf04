//! Arrival-time matrix: one shortest-path traversal per station.
//!
//! # Cost
//!
//! Every station runs one full single-source search over the graph, whatever
//! the number of targets: O(stations × E log V).  Each tree is then filtered
//! down to the target nodes of the run and discarded, unless route
//! reconstruction asked for the trees to be kept.
//!
//! # Sparsity
//!
//! A missing `(station, node)` entry means "unreachable".  No infinite or
//! placeholder time is ever stored.
//!
//! # Cancellation and progress
//!
//! The cancel token is polled before each station's traversal.  A traversal
//! in flight always completes and its row is kept; stations never started
//! have no row at all.  Progress is `completed / total` stations.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use eta_core::{NodeId, NodeIx, StationId};
use eta_graph::{RoadGraph, Router, ShortestPathTree};

use crate::progress::percent;
use crate::{CancelToken, ProgressSink, ResolvedStation};

// ── ArrivalMatrix ─────────────────────────────────────────────────────────────

/// One station's time to a node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Arrival {
    pub station: StationId,
    pub time_min: f64,
}

/// Sparse `station → (node → minutes)` lookup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArrivalMatrix {
    /// Stations in registration order; defines tie-break order.
    order: Vec<StationId>,
    rows: FxHashMap<StationId, FxHashMap<NodeId, f64>>,
}

impl ArrivalMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one station's complete row, replacing any previous row.
    pub fn insert_row(&mut self, station: StationId, row: FxHashMap<NodeId, f64>) {
        if self.rows.insert(station, row).is_none() {
            self.order.push(station);
        }
    }

    /// Stations with a row, in the order they were inserted.
    pub fn stations(&self) -> &[StationId] {
        &self.order
    }

    pub fn station_count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn row(&self, station: StationId) -> Option<&FxHashMap<NodeId, f64>> {
        self.rows.get(&station)
    }

    /// Time from `station` to `node`, `None` if unreachable.
    pub fn time(&self, station: StationId, node: NodeId) -> Option<f64> {
        self.rows.get(&station)?.get(&node).copied()
    }

    /// Every station that reaches `node`, fastest first.
    ///
    /// Equal times keep station registration order.
    pub fn arrivals_at(&self, node: NodeId) -> Vec<Arrival> {
        let mut out: Vec<Arrival> = self
            .order
            .iter()
            .filter_map(|&station| {
                let time_min = self.time(station, node)?;
                Some(Arrival { station, time_min })
            })
            .collect();
        out.sort_by(|a, b| a.time_min.total_cmp(&b.time_min));
        out
    }
}

// ── MatrixEngine ──────────────────────────────────────────────────────────────

/// Result of [`MatrixEngine::compute`].
#[derive(Debug)]
pub struct MatrixRun {
    pub matrix: ArrivalMatrix,
    /// Each completed station's tree, when [`MatrixEngine::keep_trees`] is set.
    pub trees: FxHashMap<StationId, ShortestPathTree>,
    /// The run stopped early; `matrix` holds only completed stations.
    pub cancelled: bool,
}

/// One completed station: its filtered row and, optionally, its tree.
type StationPass = (StationId, FxHashMap<NodeId, f64>, Option<ShortestPathTree>);

/// Computes an [`ArrivalMatrix`] over one weighted graph.
pub struct MatrixEngine<'g, R: Router> {
    graph: &'g RoadGraph,
    router: R,
    turnout_delay_min: f64,
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    num_threads: Option<usize>,
    keep_trees: bool,
}

impl<'g, R: Router> MatrixEngine<'g, R> {
    pub fn new(graph: &'g RoadGraph, router: R) -> Self {
        Self { graph, router, turnout_delay_min: 0.0, num_threads: None, keep_trees: false }
    }

    /// Minutes added to every stored time.
    pub fn turnout_delay(mut self, minutes: f64) -> Self {
        self.turnout_delay_min = minutes;
        self
    }

    /// Worker count for the `parallel` feature; ignored otherwise.
    pub fn num_threads(mut self, n: Option<usize>) -> Self {
        self.num_threads = n;
        self
    }

    /// Keep every station's shortest-path tree in [`MatrixRun::trees`] so
    /// routes can be rebuilt without another traversal.
    pub fn keep_trees(mut self, keep: bool) -> Self {
        self.keep_trees = keep;
        self
    }

    /// Travel time from every station to every node in `targets`.
    pub fn compute<P: ProgressSink + ?Sized>(
        &self,
        stations: &[ResolvedStation],
        targets: &[NodeIx],
        progress: &mut P,
        cancel: &CancelToken,
    ) -> MatrixRun {
        let targets: Vec<NodeIx> = {
            let mut seen = FxHashSet::default();
            targets.iter().copied().filter(|t| seen.insert(*t)).collect()
        };
        info!(
            "computing arrival matrix: {} stations x {} target nodes",
            stations.len(),
            targets.len()
        );
        progress.set_progress(0);

        #[cfg(not(feature = "parallel"))]
        let run = self.compute_sequential(stations, &targets, &mut *progress, cancel);

        #[cfg(feature = "parallel")]
        let run = self.compute_parallel(stations, &targets, &mut *progress, cancel);

        if run.cancelled {
            info!(
                "arrival matrix cancelled after {}/{} stations",
                run.matrix.station_count(),
                stations.len()
            );
        }
        run
    }

    /// Full traversal from one station, filtered to `targets`.
    fn station_pass(&self, station: &ResolvedStation, targets: &[NodeIx]) -> StationPass {
        let tree = self.router.shortest_tree(self.graph, station.ix);
        let row: FxHashMap<NodeId, f64> = targets
            .iter()
            .filter_map(|&t| {
                let time = tree.time_to(t)?;
                Some((self.graph.node_id(t), time + self.turnout_delay_min))
            })
            .collect();
        debug!("station {} reaches {}/{} target nodes", station.name, row.len(), targets.len());
        (station.id, row, self.keep_trees.then_some(tree))
    }

    fn merge(matrix: &mut ArrivalMatrix, trees: &mut FxHashMap<StationId, ShortestPathTree>, pass: StationPass) {
        let (station, row, tree) = pass;
        matrix.insert_row(station, row);
        if let Some(tree) = tree {
            trees.insert(station, tree);
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn compute_sequential<P: ProgressSink + ?Sized>(
        &self,
        stations: &[ResolvedStation],
        targets: &[NodeIx],
        progress: &mut P,
        cancel: &CancelToken,
    ) -> MatrixRun {
        let mut matrix = ArrivalMatrix::new();
        let mut trees = FxHashMap::default();
        for (done, station) in stations.iter().enumerate() {
            if cancel.is_cancelled() {
                return MatrixRun { matrix, trees, cancelled: true };
            }
            Self::merge(&mut matrix, &mut trees, self.station_pass(station, targets));
            progress.set_progress(percent(done + 1, stations.len()));
        }
        MatrixRun { matrix, trees, cancelled: false }
    }

    #[cfg(feature = "parallel")]
    fn compute_parallel<P: ProgressSink + ?Sized>(
        &self,
        stations: &[ResolvedStation],
        targets: &[NodeIx],
        progress: &mut P,
        cancel: &CancelToken,
    ) -> MatrixRun {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::{Mutex, PoisonError};

        use rayon::prelude::*;
        use tracing::warn;

        let total = stations.len();
        let done = AtomicUsize::new(0);
        let progress = Mutex::new(progress);

        let work = || -> Vec<Option<StationPass>> {
            stations
                .par_iter()
                .map(|station| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let pass = self.station_pass(station, targets);
                    // Count under the lock so reported progress never goes backwards.
                    let mut p = progress.lock().unwrap_or_else(PoisonError::into_inner);
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    p.set_progress(percent(n, total));
                    Some(pass)
                })
                .collect()
        };

        let rows = match self.num_threads {
            Some(n) => match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => pool.install(work),
                Err(e) => {
                    warn!("could not build a {n}-thread pool ({e}); using the global pool");
                    work()
                }
            },
            None => work(),
        };

        // Merge per station, in registration order.
        let mut matrix = ArrivalMatrix::new();
        let mut trees = FxHashMap::default();
        let mut cancelled = false;
        for pass in rows {
            match pass {
                Some(pass) => Self::merge(&mut matrix, &mut trees, pass),
                None => cancelled = true,
            }
        }
        MatrixRun { matrix, trees, cancelled }
    }
}
