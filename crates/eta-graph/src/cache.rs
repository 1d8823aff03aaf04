//! On-disk graph cache keyed by spatial extent.
//!
//! # Layout
//!
//! One file per key, `<dir>/<key>.bin`, holding a `bincode`-serialized
//! [`RoadGraph`].  Writes go to a temporary sibling file that is renamed
//! into place, so concurrent writers of the same key leave the last complete
//! graph behind.
//!
//! # Caveats
//!
//! - Entries are never invalidated.  If the road data behind an extent
//!   changes, delete the cache directory.
//! - Nothing is ever evicted; the directory grows with every new extent.
//! - Read and write failures are logged and reported as a miss / `false`;
//!   they never fail a run.

use std::fmt;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHasher;
use tracing::{debug, warn};

use eta_core::Extent;

use crate::RoadGraph;

/// Distinguishes temporary files written by one process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

// ── CacheKey ──────────────────────────────────────────────────────────────────

/// Stable content hash of `(extent, buffer)`.
///
/// Each component is formatted with six decimals before hashing, so extents
/// that differ only below a micro-degree share a key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey(pub u64);

impl CacheKey {
    pub fn new(extent: &Extent, buffer_m: f64) -> Self {
        let canonical = format!(
            "{:.6}|{:.6}|{:.6}|{:.6}|{:.6}",
            extent.min_lon, extent.min_lat, extent.max_lon, extent.max_lat, buffer_m
        );
        let mut h = FxHasher::default();
        canonical.hash(&mut h);
        CacheKey(h.finish())
    }

    pub fn file_name(self) -> String {
        format!("{self}.bin")
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// ── GraphCache ────────────────────────────────────────────────────────────────

/// Directory-backed graph cache.
#[derive(Debug, Clone)]
pub struct GraphCache {
    dir: PathBuf,
}

impl GraphCache {
    /// Use `dir` as the cache directory.  It is created on first `put`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Load the graph stored under `key`.
    ///
    /// Missing, unreadable, undecodable, or structurally inconsistent
    /// entries all return `None`.
    pub fn get(&self, key: CacheKey) -> Option<RoadGraph> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                debug!("graph cache miss for {key}: {e}");
                return None;
            }
        };
        match bincode::deserialize::<RoadGraph>(&bytes) {
            Ok(graph) if graph.is_consistent() => {
                debug!("graph cache hit for {key} ({} nodes)", graph.node_count());
                Some(graph)
            }
            Ok(_) => {
                warn!("graph cache entry {} is inconsistent; ignoring", path.display());
                None
            }
            Err(e) => {
                warn!("graph cache entry {} is corrupt ({e}); ignoring", path.display());
                None
            }
        }
    }

    /// Store `graph` under `key`, replacing any previous entry.
    ///
    /// Returns `false` (after logging) if anything went wrong.
    pub fn put(&self, key: CacheKey, graph: &RoadGraph) -> bool {
        match self.try_put(key, graph) {
            Ok(()) => true,
            Err(e) => {
                warn!("could not write graph cache entry {key}: {e}");
                false
            }
        }
    }

    fn try_put(&self, key: CacheKey, graph: &RoadGraph) -> Result<(), Box<dyn std::error::Error>> {
        fs::create_dir_all(&self.dir)?;
        let bytes = bincode::serialize(graph)?;

        let tmp = self.dir.join(format!(
            "{}.{}.{}.tmp",
            key.file_name(),
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&tmp, bytes)?;
        if let Err(e) = fs::rename(&tmp, self.path_for(key)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}
