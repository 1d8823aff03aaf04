//! Raw-graph collaborator interface.
//!
//! Fetching and parsing map data is not this workspace's job.  Whatever does
//! it (an OSM extract reader, a GIS layer adapter, a test fixture) implements
//! [`GraphSource`] and hands back an unweighted [`RoadGraph`].

use eta_core::Extent;

use crate::{GraphResult, RoadGraph};

/// Supplies the road graph covering a buffered extent.
pub trait GraphSource {
    /// Return the graph for `extent`, which already includes `buffer_m`.
    ///
    /// Speeds and travel times are applied by the caller; anything set here
    /// is overwritten.
    fn load(&self, extent: &Extent, buffer_m: f64) -> GraphResult<RoadGraph>;
}

impl<F> GraphSource for F
where
    F: Fn(&Extent, f64) -> GraphResult<RoadGraph>,
{
    fn load(&self, extent: &Extent, buffer_m: f64) -> GraphResult<RoadGraph> {
        self(extent, buffer_m)
    }
}

/// A source that returns a clone of one prebuilt graph for any extent.
pub struct StaticGraphSource {
    graph: RoadGraph,
}

impl StaticGraphSource {
    pub fn new(graph: RoadGraph) -> Self {
        Self { graph }
    }
}

impl GraphSource for StaticGraphSource {
    fn load(&self, _extent: &Extent, _buffer_m: f64) -> GraphResult<RoadGraph> {
        Ok(self.graph.clone())
    }
}
