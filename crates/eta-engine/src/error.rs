use thiserror::Error;

use eta_core::{CoreError, StationId};
use eta_graph::GraphError;

/// Errors that abort a whole analysis run.
///
/// Problems with a single station or target are not errors; they are
/// collected in the [`AnalysisReport`](crate::AnalysisReport).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] CoreError),

    #[error("no stations supplied")]
    NoStations,

    #[error("no targets supplied")]
    NoTargets,

    #[error("station id {0} used more than once")]
    DuplicateStation(StationId),

    #[error("no station could be placed on the road graph")]
    NoResolvedStations,

    #[error("no target could be placed on the road graph")]
    NoResolvedTargets,

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type EngineResult<T> = Result<T, EngineError>;
