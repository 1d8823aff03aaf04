//! End-to-end analysis pipeline.
//!
//! ```text
//! validate config and inputs
//!   → extent of all stations and targets
//!   → road graph from cache, else from the GraphSource (then cached)
//!   → speed weighting
//!   → snap stations and targets to nodes
//!   → arrival matrix (one traversal per station)
//!   → per target: ranks / matrix row / first arrival / nearest station / routes
//! ```
//!
//! Every enabled mode shares the one graph, resolution pass, and matrix.
//! Nearest-station and route records are rebuilt from the shortest-path
//! trees the matrix pass already grew, so no mode adds traversals.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use eta_core::{representative_point, AnalysisConfig, Extent, StationId};
use eta_graph::{
    reconstruct_route, CacheKey, DijkstraRouter, GraphCache, GraphSource, NodeLocator, RoadGraph,
    Router, ShortestPathTree, SpeedProfile,
};

use crate::input::{resolve_stations, resolve_targets};
use crate::progress::percent;
use crate::{
    ArrivalMatrix, CancelToken, EngineError, EngineResult, FirstArrival, MatrixEngine, MatrixRow,
    NearestBand, NearestStation, ProgressSink, RankAggregator, ResolvedStation, ResolvedTarget,
    ResultSink, RouteRecord, RouteSelection, Station, StationError, Target, TargetSkip,
};

// ── Modes & report ────────────────────────────────────────────────────────────

/// Which outputs a run produces.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnalysisModes {
    pub ranks: bool,
    pub matrix: bool,
    pub first_arrival: bool,
    pub nearest_station: bool,
    /// `None` disables route mode.
    pub routes: Option<RouteSelection>,
}

impl Default for AnalysisModes {
    /// Rank analysis only.
    fn default() -> Self {
        Self {
            ranks: true,
            matrix: false,
            first_arrival: false,
            nearest_station: false,
            routes: None,
        }
    }
}

impl AnalysisModes {
    /// Every mode, with the default route selection.
    pub fn all() -> Self {
        Self {
            ranks: true,
            matrix: true,
            first_arrival: true,
            nearest_station: true,
            routes: Some(RouteSelection::default()),
        }
    }
}

/// What happened during a run, apart from the records sent to the sink.
#[derive(Debug, Default)]
pub struct AnalysisReport {
    pub station_errors: Vec<StationError>,
    pub skipped_targets: Vec<TargetSkip>,
    pub stations_resolved: usize,
    pub targets_resolved: usize,
    pub graph_from_cache: bool,
    /// The run was cancelled; the sink holds only what was finished.
    pub cancelled: bool,
    pub matrix: ArrivalMatrix,
}

// ── Analysis ──────────────────────────────────────────────────────────────────

/// A configured arrival-time analysis.
///
/// # Example
///
/// ```rust,ignore
/// let report = Analysis::new(AnalysisConfig::default())
///     .modes(AnalysisModes::all())
///     .run(&source, &stations, &targets, &mut NoopProgress, &mut sink, &CancelToken::new())?;
/// ```
pub struct Analysis<R: Router = DijkstraRouter> {
    config: AnalysisConfig,
    modes: AnalysisModes,
    router: R,
}

impl Analysis<DijkstraRouter> {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config, modes: AnalysisModes::default(), router: DijkstraRouter }
    }
}

impl<R: Router> Analysis<R> {
    /// Replace the routing algorithm.
    pub fn with_router<R2: Router>(self, router: R2) -> Analysis<R2> {
        Analysis { config: self.config, modes: self.modes, router }
    }

    pub fn modes(mut self, modes: AnalysisModes) -> Self {
        self.modes = modes;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run every enabled mode and stream records into `sink`.
    ///
    /// # Errors
    ///
    /// Only run-level problems: invalid configuration, empty inputs, a
    /// failing graph source, or nothing at all placeable on the graph.
    /// Per-station and per-target problems end up in the report.
    pub fn run<S, P, K>(
        &self,
        source: &S,
        stations: &[Station],
        targets: &[Target],
        progress: &mut P,
        sink: &mut K,
        cancel: &CancelToken,
    ) -> EngineResult<AnalysisReport>
    where
        S: GraphSource + ?Sized,
        P: ProgressSink + ?Sized,
        K: ResultSink + ?Sized,
    {
        // ── Configuration errors, before any work ─────────────────────────
        self.config.validate()?;
        let profile = SpeedProfile::from_kmh(&self.config.speed_profile_kmh)?;
        if stations.is_empty() {
            return Err(EngineError::NoStations);
        }
        if targets.is_empty() {
            return Err(EngineError::NoTargets);
        }
        let mut seen = FxHashSet::default();
        if let Some(dup) = stations.iter().find(|s| !seen.insert(s.id)) {
            return Err(EngineError::DuplicateStation(dup.id));
        }

        let mut report = AnalysisReport::default();

        // ── Graph ─────────────────────────────────────────────────────────
        progress.set_status("preparing road graph");
        let points = stations
            .iter()
            .map(|s| &s.geometry)
            .chain(targets.iter().map(|t| &t.geometry))
            .filter_map(representative_point);
        let extent = Extent::from_points(points).ok_or(EngineError::NoResolvedStations)?;

        let (mut graph, from_cache) = self.load_graph(source, &extent)?;
        report.graph_from_cache = from_cache;
        graph.apply_speeds(&profile);
        if cancel.is_cancelled() {
            report.cancelled = true;
            return Ok(report);
        }

        // ── Placement ─────────────────────────────────────────────────────
        progress.set_status("placing stations and targets");
        let locator = NodeLocator::new(&graph);
        let (stations, station_errors) = resolve_stations(stations, &graph, &locator);
        let (targets, skipped_targets) = resolve_targets(targets, &graph, &locator);
        for e in &station_errors {
            progress.report_error(&e.to_string());
        }
        report.stations_resolved = stations.len();
        report.targets_resolved = targets.len();
        report.station_errors = station_errors;
        report.skipped_targets = skipped_targets;
        info!(
            "placed {} stations ({} failed) and {} targets ({} skipped)",
            report.stations_resolved,
            report.station_errors.len(),
            report.targets_resolved,
            report.skipped_targets.len()
        );
        if stations.is_empty() {
            return Err(EngineError::NoResolvedStations);
        }
        if targets.is_empty() {
            return Err(EngineError::NoResolvedTargets);
        }

        // ── Matrix ────────────────────────────────────────────────────────
        progress.set_status("computing arrival times");
        let target_nodes: Vec<_> = targets.iter().map(|t| t.ix).collect();
        let needs_routes = self.modes.nearest_station || self.modes.routes.is_some();
        let run = MatrixEngine::new(&graph, &self.router)
            .turnout_delay(self.config.turnout_delay_min)
            .num_threads(self.config.num_threads)
            .keep_trees(needs_routes)
            .compute(&stations, &target_nodes, &mut *progress, cancel);
        report.matrix = run.matrix;
        let trees = run.trees;
        if run.cancelled {
            report.cancelled = true;
            return Ok(report);
        }

        // ── Per-target output ─────────────────────────────────────────────
        progress.set_status("aggregating results");
        progress.set_progress(0);
        let routes = RouteSource { graph: &graph, trees: &trees };
        report.cancelled =
            self.emit(&routes, &stations, &targets, &report.matrix, &mut *progress, sink, cancel);
        if !report.cancelled {
            progress.set_status("done");
        }
        Ok(report)
    }

    /// Cached graph for `extent`, else a fresh one from `source`.
    ///
    /// The second value is `true` on a cache hit.
    fn load_graph<S: GraphSource + ?Sized>(
        &self,
        source: &S,
        extent: &Extent,
    ) -> EngineResult<(RoadGraph, bool)> {
        let buffer_m = self.config.buffer_m;
        let key = CacheKey::new(extent, buffer_m);
        let cache = self.config.active_cache_dir().map(|dir| GraphCache::new(dir));

        if let Some(graph) = cache.as_ref().and_then(|c| c.get(key)) {
            info!("road graph {key} loaded from cache: {} nodes, {} edges", graph.node_count(), graph.edge_count());
            return Ok((graph, true));
        }

        let graph = source.load(&extent.buffered(buffer_m), buffer_m)?;
        info!("road graph built: {} nodes, {} edges", graph.node_count(), graph.edge_count());
        if let Some(cache) = &cache {
            if !cache.put(key, &graph) {
                warn!("continuing without caching road graph {key}");
            }
        }
        Ok((graph, false))
    }

    /// Stream every enabled record type, target by target.
    ///
    /// Returns `true` if cancelled part-way.
    #[allow(clippy::too_many_arguments)]
    fn emit<P, K>(
        &self,
        routes: &RouteSource<'_>,
        stations: &[ResolvedStation],
        targets: &[ResolvedTarget],
        matrix: &ArrivalMatrix,
        progress: &mut P,
        sink: &mut K,
        cancel: &CancelToken,
    ) -> bool
    where
        P: ProgressSink + ?Sized,
        K: ResultSink + ?Sized,
    {
        let modes = self.modes;
        let aggregator = RankAggregator::new(
            self.config.dispatch_ranks.clone(),
            self.config.evaluation_threshold_min,
        );
        let by_id: FxHashMap<StationId, &ResolvedStation> = stations.iter().map(|s| (s.id, s)).collect();

        for (done, target) in targets.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("aggregation cancelled after {done}/{} targets", targets.len());
                return true;
            }

            let arrivals = matrix.arrivals_at(target.node);
            if arrivals.is_empty() {
                debug!("target {} is unreachable from every station", target.id);
            }

            if modes.ranks {
                sink.on_ranks(&aggregator.aggregate(target.id, target.node, &arrivals));
            }

            if modes.matrix {
                sink.on_matrix_row(&MatrixRow {
                    target: target.id,
                    node: target.node,
                    times: matrix.stations().iter().map(|&s| (s, matrix.time(s, target.node))).collect(),
                });
            }

            if modes.first_arrival {
                if let Some(first) = FirstArrival::from_arrivals(target.id, target.node, &arrivals) {
                    sink.on_first_arrival(&first);
                }
            }

            if modes.nearest_station {
                if let Some(first) = arrivals.first() {
                    if let Some(station) = by_id.get(&first.station) {
                        let distance_km = routes.record(station, target).map(|r| r.distance_km);
                        sink.on_nearest_station(&NearestStation {
                            target: target.id,
                            station: station.id,
                            station_name: station.name.clone(),
                            response_time_min: first.time_min,
                            distance_km,
                            band: NearestBand::classify(first.time_min),
                        });
                    }
                }
            }

            if let Some(selection) = modes.routes {
                for arrival in selection.select(&arrivals) {
                    let Some(station) = by_id.get(&arrival.station) else { continue };
                    if let Some(mut record) = routes.record(station, target) {
                        record.time_min = arrival.time_min;
                        sink.on_route(&record);
                    }
                }
            }

            progress.set_progress(percent(done + 1, targets.len()));
        }
        false
    }
}

/// Rebuilds station→target routes from the matrix pass's kept trees.
struct RouteSource<'a> {
    graph: &'a RoadGraph,
    trees: &'a FxHashMap<StationId, ShortestPathTree>,
}

impl RouteSource<'_> {
    /// The station→target route, or `None` (logged at debug level) when
    /// the station has no tree or the target is off it.
    fn record(&self, station: &ResolvedStation, target: &ResolvedTarget) -> Option<RouteRecord> {
        let Some(tree) = self.trees.get(&station.id) else {
            debug!("no shortest-path tree kept for {}", station.name);
            return None;
        };
        let Some(path) = tree.path_to(self.graph, target.ix) else {
            debug!("no route for target {} from {}", target.id, station.name);
            return None;
        };
        let nodes: Vec<_> = path.into_iter().map(|ix| self.graph.node_id(ix)).collect();
        match reconstruct_route(self.graph, &nodes) {
            Ok(geometry) => Some(RouteRecord {
                target: target.id,
                station: station.id,
                station_name: station.name.clone(),
                time_min: geometry.travel_time_min,
                distance_km: geometry.length_km(),
                coords: geometry.coords,
            }),
            Err(e) => {
                debug!("could not rebuild route for target {} from {}: {e}", target.id, station.name);
                None
            }
        }
    }
}
