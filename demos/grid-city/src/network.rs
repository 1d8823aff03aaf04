//! Synthetic road supplier and input points for the demo.
//!
//! `GridCity` lays a regular street grid over whatever extent it is asked
//! for, so it behaves like a real map supplier: the graph depends on where
//! the stations and targets are.

use geo::{polygon, Geometry};

use eta_core::{Extent, GeoPoint, NodeId, StationId, TargetId};
use eta_engine::{Station, Target};
use eta_graph::{GraphError, GraphResult, GraphSource, RawEdge, RoadGraph, RoadGraphBuilder};

/// Refuse extents that would produce more nodes than this.
const MAX_NODES: usize = 250_000;

/// Street grid with arterials every tenth line, main streets every fifth,
/// residential streets elsewhere, and a footpath alongside every third
/// block.
pub struct GridCity {
    /// Distance between parallel streets, in degrees.
    pub spacing_deg: f64,
}

impl Default for GridCity {
    fn default() -> Self {
        Self { spacing_deg: 0.002 }
    }
}

impl GridCity {
    fn class_of(line: usize) -> &'static str {
        if line % 10 == 0 {
            "trunk"
        } else if line % 5 == 0 {
            "secondary"
        } else {
            "residential"
        }
    }
}

impl GraphSource for GridCity {
    fn load(&self, extent: &Extent, _buffer_m: f64) -> GraphResult<RoadGraph> {
        let sp = self.spacing_deg;
        let cols = ((extent.max_lon - extent.min_lon) / sp).ceil() as usize + 1;
        let rows = ((extent.max_lat - extent.min_lat) / sp).ceil() as usize + 1;
        if rows.saturating_mul(cols) > MAX_NODES {
            return Err(GraphError::Source(format!("{rows}x{cols} grid is too large for the demo")));
        }

        let mut b = RoadGraphBuilder::with_capacity(rows * cols, rows * cols * 5);
        let id = |r: usize, c: usize| NodeId((r * cols + c) as i64 + 1);
        let pos = |r: usize, c: usize| {
            GeoPoint::new(extent.min_lon + c as f64 * sp, extent.min_lat + r as f64 * sp)
        };

        for r in 0..rows {
            for c in 0..cols {
                b.add_node(id(r, c), Some(pos(r, c)))?;
            }
        }
        for r in 0..rows {
            for c in 0..cols {
                if c + 1 < cols {
                    let len = pos(r, c).distance_m(pos(r, c + 1));
                    b.add_road(id(r, c), id(r, c + 1), Self::class_of(r), len)?;
                    if c % 3 == 0 {
                        b.add_edge(RawEdge::new(id(r, c), id(r, c + 1), "footway", len).with_key(1))?;
                    }
                }
                if r + 1 < rows {
                    let len = pos(r, c).distance_m(pos(r + 1, c));
                    b.add_road(id(r, c), id(r + 1, c), Self::class_of(c), len)?;
                }
            }
        }
        Ok(b.build())
    }
}

/// Three fire stations around a small town.
pub fn stations() -> Vec<Station> {
    vec![
        Station::at(StationId(0), "Central", GeoPoint::new(24.9400, 60.1700)),
        Station::at(StationId(1), "Harbour", GeoPoint::new(24.9560, 60.1610)),
        Station::at(StationId(2), "Northgate", GeoPoint::new(24.9310, 60.1850)),
    ]
}

/// A mix of building footprints and address points.
pub fn targets() -> Vec<Target> {
    let mut out = Vec::new();
    let mut next = 1u64;
    for i in 0..4 {
        for j in 0..4 {
            let lon = 24.925 + i as f64 * 0.009;
            let lat = 60.160 + j as f64 * 0.008;
            let footprint: Geometry<f64> = polygon![
                (x: lon, y: lat),
                (x: lon + 0.0004, y: lat),
                (x: lon + 0.0004, y: lat + 0.0003),
                (x: lon, y: lat + 0.0003),
            ]
            .into();
            out.push(Target::new(TargetId(next), footprint));
            next += 1;
        }
    }
    out.push(Target::at(TargetId(next), GeoPoint::new(24.9700, 60.1900)));
    out
}
