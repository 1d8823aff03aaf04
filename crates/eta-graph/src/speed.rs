//! Road-class speed model.
//!
//! Every road-class tag maps to one of five fixed tiers.  A [`SpeedProfile`]
//! assigns a speed to each tier; [`RoadGraph::apply_speeds`] then writes
//! `speed_mm` and `travel_time_min` onto every edge.
//!
//! | Tier | Tags                                                                  |
//! |------|-----------------------------------------------------------------------|
//! | 1    | trunk, trunk_link, motorway, motorway_link                            |
//! | 2    | primary, primary_link, secondary, secondary_link, unclassified        |
//! | 3    | tertiary, tertiary_link, residential, living_street                   |
//! | 4    | road, service, track                                                  |
//! | 5    | footway, path, pedestrian, steps, cycleway, bridleway, corridor, *any other* |
//!
//! This is the single place where units are converted: profiles arrive in
//! km/h and are stored in metres/minute.

use tracing::warn;

use crate::{GraphError, GraphResult, RoadGraph};

/// Number of speed tiers in every profile.
pub const TIER_COUNT: usize = 5;

/// Decimal places kept when converting km/h to m/min.
const MM_PRECISION: i32 = 2;

/// Tag assumed for edges that carry no road-class tag at all.
const UNTAGGED: &str = "other";

/// Convert km/h to metres/minute, rounded to two decimal places.
pub fn kmh_to_mm(kmh: f64) -> f64 {
    let scale = 10f64.powi(MM_PRECISION);
    (kmh * 1000.0 / 60.0 * scale).round() / scale
}

// ── RoadTier ──────────────────────────────────────────────────────────────────

/// Road-class speed tier, fastest first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoadTier {
    /// Arterial city roads and through routes.
    Arterial,
    /// District-level main streets.
    District,
    /// Local streets and residential roads.
    Local,
    /// Service drives, yards, parking aisles, tracks.
    Service,
    /// Pedestrian areas passable by a fire engine in an emergency.
    Pedestrian,
}

impl RoadTier {
    /// Tier of an OSM-style `highway` tag.  Unknown tags are `Pedestrian`.
    pub fn of_tag(tag: &str) -> RoadTier {
        match tag {
            "trunk" | "trunk_link" | "motorway" | "motorway_link" => RoadTier::Arterial,
            "primary" | "primary_link" | "secondary" | "secondary_link"
            | "unclassified" => RoadTier::District,
            "tertiary" | "tertiary_link" | "residential" | "living_street" => RoadTier::Local,
            "road" | "service" | "track" => RoadTier::Service,
            _ => RoadTier::Pedestrian,
        }
    }

    /// 1-based tier number.
    #[inline]
    pub fn number(self) -> u8 {
        self.index() as u8 + 1
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

// ── SpeedProfile ──────────────────────────────────────────────────────────────

/// Immutable tier → speed (m/min) table.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeedProfile {
    tiers_mm: [f64; TIER_COUNT],
}

impl SpeedProfile {
    /// Build a profile from five km/h speeds, fastest tier first.
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidProfile`] unless there are exactly five positive
    /// finite entries.
    pub fn from_kmh(speeds_kmh: &[f64]) -> GraphResult<Self> {
        check_speeds(speeds_kmh)?;
        Self::from_mm(&speeds_kmh.iter().map(|&s| kmh_to_mm(s)).collect::<Vec<_>>())
    }

    /// Build a profile from speeds already in metres/minute.
    pub fn from_mm(speeds_mm: &[f64]) -> GraphResult<Self> {
        check_speeds(speeds_mm)?;
        let mut tiers_mm = [0.0; TIER_COUNT];
        tiers_mm.copy_from_slice(speeds_mm);
        Ok(Self { tiers_mm })
    }

    #[inline]
    pub fn tier_speed_mm(&self, tier: RoadTier) -> f64 {
        self.tiers_mm[tier.index()]
    }

    /// Speed for an edge's tag list: the mean of each tag's tier speed.
    pub fn speed_for_tags<S: AsRef<str>>(&self, tags: &[S]) -> f64 {
        if tags.is_empty() {
            return self.tier_speed_mm(RoadTier::of_tag(UNTAGGED));
        }
        let sum: f64 = tags
            .iter()
            .map(|t| self.tier_speed_mm(RoadTier::of_tag(t.as_ref())))
            .sum();
        sum / tags.len() as f64
    }
}

fn check_speeds(speeds: &[f64]) -> GraphResult<()> {
    if speeds.len() != TIER_COUNT {
        return Err(GraphError::InvalidProfile(format!(
            "expected {TIER_COUNT} tier speeds, got {}",
            speeds.len()
        )));
    }
    if let Some(bad) = speeds.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
        return Err(GraphError::InvalidProfile(format!(
            "tier speeds must be positive and finite, got {bad}"
        )));
    }
    Ok(())
}

/// `length / speed` when both are positive and finite.
#[inline]
fn travel_time(length_m: Option<f64>, speed_mm: f64) -> Option<f64> {
    let len = length_m?;
    let usable = |v: f64| v.is_finite() && v > 0.0;
    (usable(len) && usable(speed_mm)).then(|| len / speed_mm)
}

// ── Weighting ─────────────────────────────────────────────────────────────────

impl RoadGraph {
    /// Write speed and travel time onto every edge.
    ///
    /// Edges with a missing, zero, or non-finite length get no travel time
    /// and are skipped by every router.  A simplified graph is weighted all
    /// the same, with a warning: merged edges may mix road classes.
    pub fn apply_speeds(&mut self, profile: &SpeedProfile) {
        if self.simplified {
            warn!(
                "graph was simplified before weighting; per-edge road tiers are approximate \
                 (weight the raw graph first, then simplify)"
            );
        }

        for e in 0..self.edge_count() {
            let speed = profile.speed_for_tags(&self.edge_road_class[e]);
            self.edge_speed_mm[e] = Some(speed);
            self.edge_travel_min[e] = travel_time(self.edge_length_m[e], speed);
        }
    }

    /// [`SpeedProfile::from_kmh`] followed by [`apply_speeds`](Self::apply_speeds).
    pub fn apply_speeds_kmh(&mut self, speeds_kmh: &[f64]) -> GraphResult<()> {
        let profile = SpeedProfile::from_kmh(speeds_kmh)?;
        self.apply_speeds(&profile);
        Ok(())
    }
}
