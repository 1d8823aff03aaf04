//! `eta-graph`: road multigraph, speed model, node snapping, caching, and
//! routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`graph`]   | `RoadGraph` (CSR multigraph), `RoadGraphBuilder`, `RawEdge`   |
//! | [`speed`]   | `RoadTier`, `SpeedProfile`, `kmh_to_mm`, `RoadGraph::apply_speeds` |
//! | [`locator`] | `NodeLocator` (R-tree), `nearest_node` (linear reference scan) |
//! | [`router`]  | `Router` trait, `ShortestPathTree`, `DijkstraRouter`          |
//! | [`route`]   | `RouteGeometry`, `reconstruct_route`                          |
//! | [`cache`]   | `GraphCache`, `CacheKey`                                      |
//! | [`source`]  | `GraphSource` collaborator trait, `StaticGraphSource`         |
//! | [`error`]   | `GraphError`, `GraphResult<T>`                                |
//!
//! # Units
//!
//! Lengths are metres, speeds metres per minute, travel times minutes.
//! The only conversion (km/h → m/min) happens in [`speed`].

pub mod cache;
pub mod error;
pub mod graph;
pub mod locator;
pub mod route;
pub mod router;
pub mod source;
pub mod speed;

#[cfg(test)]
mod tests;

pub use cache::{CacheKey, GraphCache};
pub use error::{GraphError, GraphResult};
pub use graph::{RawEdge, RoadGraph, RoadGraphBuilder};
pub use locator::{nearest_node, NodeLocator};
pub use route::{reconstruct_route, RouteGeometry};
pub use router::{DijkstraRouter, Router, ShortestPathTree};
pub use source::{GraphSource, StaticGraphSource};
pub use speed::{kmh_to_mm, RoadTier, SpeedProfile};
