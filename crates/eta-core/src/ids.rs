//! Strongly typed, zero-cost identifier wrappers.
//!
//! Two families of node identifier exist:
//!
//! - [`NodeId`] is the road-data id supplied by the graph collaborator
//!   (OSM-style, signed 64-bit, sparse).  It is what callers see.
//! - [`NodeIx`] / [`EdgeIx`] are dense positions into the CSR arrays of a
//!   built graph.  They are only meaningful for the graph that produced them.

use std::fmt;

/// Generate a typed dense-index wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Position of a node in a built graph's node arrays.
    pub struct NodeIx(u32);
}

typed_id! {
    /// Position of a directed edge in a built graph's CSR edge arrays.
    pub struct EdgeIx(u32);
}

typed_id! {
    /// Index of a station in the station list of one run.
    pub struct StationId(u32);
}

typed_id! {
    /// Collaborator-assigned identifier of a target object (building, point).
    pub struct TargetId(u64);
}

/// Road-data node identifier, unique within one graph.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl From<i64> for NodeId {
    #[inline]
    fn from(raw: i64) -> Self {
        NodeId(raw)
    }
}
