//! `eta-core`: foundational types for the `eta` arrival-time workspace.
//!
//! This crate is a dependency of every other `eta-*` crate.  It has no
//! `eta-*` dependencies and few external ones (`geo` for representative
//! points, `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`ids`]      | `NodeId`, `NodeIx`, `EdgeIx`, `StationId`, `TargetId`    |
//! | [`geo`]      | `GeoPoint`, haversine distance, `Extent`, representative points |
//! | [`config`]   | `AnalysisConfig`, `DispatchRank`                         |
//! | [`error`]    | `CoreError`, `CoreResult`                                |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types; required by the graph cache in `eta-graph`. |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{AnalysisConfig, DispatchRank, DEFAULT_SPEEDS_KMH};
pub use error::{CoreError, CoreResult};
pub use crate::geo::{representative_point, Extent, GeoPoint, EARTH_RADIUS_M};
pub use ids::{EdgeIx, NodeId, NodeIx, StationId, TargetId};
