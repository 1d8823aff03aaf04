//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` stores WGS-84 longitude/latitude in `f64`, in `(x, y)` order to
//! match the `geo` crate.  Graph collaborators may instead supply a local
//! projected frame; the only requirement is that one graph and every point
//! queried against it share the same frame.

use ::geo::{Centroid, CoordsIter, Geometry, Point};

/// Mean Earth radius in metres used by every great-circle computation.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Rough metres-per-degree figure used to widen an [`Extent`] by a buffer.
const METRES_PER_DEGREE: f64 = 111_000.0;

/// A geographic coordinate: longitude (`x`) then latitude (`y`), in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// `true` when both components are finite numbers.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Position on the unit sphere.
    ///
    /// Euclidean (chord) distance between two unit vectors grows strictly
    /// with their great-circle distance, so an ordinary Euclidean
    /// nearest-neighbour search over these vectors is a haversine search.
    pub fn unit_vector(self) -> [f64; 3] {
        let lat = self.lat.to_radians();
        let lon = self.lon.to_radians();
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    }
}

impl From<Point<f64>> for GeoPoint {
    #[inline]
    fn from(p: Point<f64>) -> Self {
        GeoPoint::new(p.x(), p.y())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

/// Point used to stand in for a target or station geometry.
///
/// - points are used as-is;
/// - areal geometries (polygons, rects, triangles) use their centroid;
/// - anything else (lines, multipoints, collections) uses its first vertex.
///
/// Returns `None` for empty or non-finite geometries; callers skip them.
pub fn representative_point(geometry: &Geometry<f64>) -> Option<GeoPoint> {
    let point = match geometry {
        Geometry::Point(p) => Some(GeoPoint::from(*p)),
        Geometry::Polygon(_)
        | Geometry::MultiPolygon(_)
        | Geometry::Rect(_)
        | Geometry::Triangle(_) => geometry.centroid().map(GeoPoint::from),
        other => other.coords_iter().next().map(|c| GeoPoint::new(c.x, c.y)),
    };
    point.filter(|p| p.is_finite())
}

// ── Extent ────────────────────────────────────────────────────────────────────

/// Axis-aligned lon/lat bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Extent {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl Extent {
    /// Smallest extent containing every point, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Extent>
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        points
            .into_iter()
            .filter(|p| p.is_finite())
            .fold(None, |acc: Option<Extent>, p| {
                Some(match acc {
                    None => Extent { min_lon: p.lon, min_lat: p.lat, max_lon: p.lon, max_lat: p.lat },
                    Some(e) => Extent {
                        min_lon: e.min_lon.min(p.lon),
                        min_lat: e.min_lat.min(p.lat),
                        max_lon: e.max_lon.max(p.lon),
                        max_lat: e.max_lat.max(p.lat),
                    },
                })
            })
    }

    /// Grow every side by `buffer_m` metres (≈ `buffer_m / 111 km` degrees).
    pub fn buffered(self, buffer_m: f64) -> Extent {
        let deg = buffer_m / METRES_PER_DEGREE;
        Extent {
            min_lon: self.min_lon - deg,
            min_lat: self.min_lat - deg,
            max_lon: self.max_lon + deg,
            max_lat: self.max_lat + deg,
        }
    }

    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lon >= self.min_lon && p.lon <= self.max_lon && p.lat >= self.min_lat && p.lat <= self.max_lat
    }
}
