//! grid-city: every analysis mode over a synthetic street grid.
//!
//! Three stations and seventeen targets in a made-up town.  The road graph
//! is generated for the extent of the inputs and cached in the system temp
//! directory, so the second run skips graph generation.
//!
//! `RUST_LOG=debug cargo run -p grid-city` shows per-station detail.

mod network;

use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use eta_core::AnalysisConfig;
use eta_engine::{
    Analysis, AnalysisModes, CancelToken, CollectingSink, ProgressSink, RouteSelection,
};

use network::GridCity;

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_logger() {
    let default_level = LevelFilter::INFO;
    let rust_log =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| default_level.to_string());
    let filter = EnvFilter::try_new(rust_log).unwrap_or_else(|err| {
        eprintln!("invalid {}, falling back to '{default_level}': {err}", EnvFilter::DEFAULT_ENV);
        EnvFilter::new(default_level.to_string())
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

// ── Progress ──────────────────────────────────────────────────────────────────

/// Logs each stage and every 25% step.
#[derive(Default)]
struct LogProgress {
    last_quarter: Option<u8>,
}

impl ProgressSink for LogProgress {
    fn set_progress(&mut self, percent: u8) {
        let quarter = percent / 25;
        if self.last_quarter != Some(quarter) {
            self.last_quarter = Some(quarter);
            info!("{percent}%");
        }
    }

    fn set_status(&mut self, status: &str) {
        self.last_quarter = None;
        info!("{status}");
    }

    fn report_error(&mut self, message: &str) {
        eprintln!("warning: {message}");
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_logger();

    println!("=== grid-city: arrival-time analysis ===");
    let stations = network::stations();
    let targets = network::targets();
    println!("Stations: {}  |  Targets: {}", stations.len(), targets.len());
    println!();

    let config = AnalysisConfig {
        cache_dir: Some(std::env::temp_dir().join("eta-grid-city-cache")),
        turnout_delay_min: 1.0,
        ..AnalysisConfig::default()
    };
    let modes = AnalysisModes {
        routes: Some(RouteSelection::WithinThreshold(8.0)),
        ..AnalysisModes::all()
    };

    let mut sink = CollectingSink::new();
    let start = Instant::now();
    let report = Analysis::new(config).modes(modes).run(
        &GridCity::default(),
        &stations,
        &targets,
        &mut LogProgress::default(),
        &mut sink,
        &CancelToken::new(),
    )?;
    let elapsed = start.elapsed();

    println!();
    println!("Analysis complete in {:.3} s", elapsed.as_secs_f64());
    println!(
        "Graph from cache: {}  |  stations placed: {}  |  targets placed: {}",
        report.graph_from_cache, report.stations_resolved, report.targets_resolved
    );
    println!();

    // ── Rank analysis ─────────────────────────────────────────────────────
    println!("{:<8} {:>8} {:>8} {:>8}  {}", "Target", "min", "max", "mean", "evaluation");
    println!("{}", "-".repeat(48));
    for r in &sink.ranks {
        match r.overall {
            Some(o) => println!(
                "{:<8} {:>8.2} {:>8.2} {:>8.2}  {}",
                r.target.0,
                o.arrival_time_min,
                o.arrival_time_max,
                o.arrival_time_mean,
                r.evaluation.map(|e| e.label()).unwrap_or("-"),
            ),
            None => println!("{:<8} {:>8} {:>8} {:>8}  -", r.target.0, "-", "-", "-"),
        }
    }
    println!();

    // ── Nearest station ───────────────────────────────────────────────────
    println!("{:<8} {:<10} {:>8} {:>8}  {}", "Target", "Station", "min", "km", "band");
    println!("{}", "-".repeat(48));
    for n in &sink.nearest {
        let km = n.distance_km.map(|d| format!("{d:.2}")).unwrap_or_else(|| "-".into());
        println!(
            "{:<8} {:<10} {:>8.2} {:>8}  {}",
            n.target.0, n.station_name, n.response_time_min, km, n.band
        );
    }
    println!();

    // ── Routes ────────────────────────────────────────────────────────────
    println!("Routes within 8 min: {}", sink.routes.len());
    for route in sink.routes.iter().take(5) {
        println!(
            "  target {:<4} from {:<10} {:>6.2} min {:>6.2} km  ({} vertices)",
            route.target.0,
            route.station_name,
            route.time_min,
            route.distance_km,
            route.coords.len()
        );
    }

    Ok(())
}
