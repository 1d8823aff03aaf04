//! Run configuration.
//!
//! Typically assembled by the embedding application (a dialog, a CLI, a
//! JSON file with the `serde` feature) and handed to
//! `eta_engine::Analysis`.  Nothing here is read from the environment.

use std::path::PathBuf;

use crate::{CoreError, CoreResult};

/// Default tier speeds in km/h, fastest (arterial) to slowest (pedestrian).
pub const DEFAULT_SPEEDS_KMH: [f64; 5] = [49.0, 37.0, 26.0, 16.0, 5.0];

/// One dispatch policy: an incident rank and how many units it requires.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchRank {
    /// Attribute prefix used in output, e.g. `rank_2` → `rank_2_min`.
    pub name: String,
    /// Number of units that must arrive.
    pub units: usize,
}

impl DispatchRank {
    pub fn new(name: impl Into<String>, units: usize) -> Self {
        Self { name: name.into(), units }
    }

    /// The standard six-rank ladder requiring 1 through 6 units.
    pub fn default_ladder() -> Vec<DispatchRank> {
        vec![
            DispatchRank::new("rank_1", 1),
            DispatchRank::new("rank_1_bis", 2),
            DispatchRank::new("rank_2", 3),
            DispatchRank::new("rank_3", 4),
            DispatchRank::new("rank_4", 5),
            DispatchRank::new("rank_5", 6),
        ]
    }
}

/// Top-level configuration of one arrival-time analysis.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisConfig {
    /// Exactly five positive tier speeds in km/h, fastest first.
    pub speed_profile_kmh: Vec<f64>,

    /// Ordered rank ladder.  Default: [`DispatchRank::default_ladder`].
    pub dispatch_ranks: Vec<DispatchRank>,

    /// Read/write the on-disk graph cache.  Default: `true`.
    pub use_cache: bool,

    /// Cache directory.  `None` disables caching even if `use_cache` is set.
    pub cache_dir: Option<PathBuf>,

    /// Metres added around the station/target extent before the graph is
    /// requested.  Default: 500.
    pub buffer_m: f64,

    /// Minutes added to every station→target time (turnout before driving).
    /// Default: 0.
    pub turnout_delay_min: f64,

    /// Mean arrival time (minutes) at or below which a target is rated
    /// satisfactory in rank analysis.  Default: 10.
    pub evaluation_threshold_min: f64,

    /// Worker thread count for the `parallel` engine.  `None` uses all
    /// logical cores.
    pub num_threads: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            speed_profile_kmh:        DEFAULT_SPEEDS_KMH.to_vec(),
            dispatch_ranks:           DispatchRank::default_ladder(),
            use_cache:                true,
            cache_dir:                None,
            buffer_m:                 500.0,
            turnout_delay_min:        0.0,
            evaluation_threshold_min: 10.0,
            num_threads:              None,
        }
    }
}

impl AnalysisConfig {
    /// Check every field that can make a run meaningless.
    ///
    /// Speed-profile *length* and positivity are checked again by the speed
    /// model in `eta-graph`; checking here lets callers fail before any graph
    /// is requested.
    pub fn validate(&self) -> CoreResult<()> {
        if self.speed_profile_kmh.len() != 5 {
            return Err(CoreError::Config(format!(
                "speed profile must have exactly 5 tiers, got {}",
                self.speed_profile_kmh.len()
            )));
        }
        if let Some(bad) = self
            .speed_profile_kmh
            .iter()
            .find(|s| !(s.is_finite() && **s > 0.0))
        {
            return Err(CoreError::Config(format!(
                "speed profile entries must be positive and finite, got {bad}"
            )));
        }
        if self.dispatch_ranks.is_empty() {
            return Err(CoreError::Config("at least one dispatch rank is required".into()));
        }
        if let Some(rank) = self.dispatch_ranks.iter().find(|r| r.units == 0) {
            return Err(CoreError::Config(format!(
                "dispatch rank '{}' requires zero units",
                rank.name
            )));
        }
        if !(self.buffer_m.is_finite() && self.buffer_m >= 0.0) {
            return Err(CoreError::Config(format!(
                "buffer must be a non-negative number of metres, got {}",
                self.buffer_m
            )));
        }
        if !(self.turnout_delay_min.is_finite() && self.turnout_delay_min >= 0.0) {
            return Err(CoreError::Config(format!(
                "turnout delay must be non-negative, got {}",
                self.turnout_delay_min
            )));
        }
        if !self.evaluation_threshold_min.is_finite() {
            return Err(CoreError::Config("evaluation threshold must be finite".into()));
        }
        if self.num_threads == Some(0) {
            return Err(CoreError::Config("num_threads must be at least 1".into()));
        }
        Ok(())
    }

    /// Directory to use for the graph cache, if caching is active.
    pub fn active_cache_dir(&self) -> Option<&PathBuf> {
        if self.use_cache { self.cache_dir.as_ref() } else { None }
    }
}
