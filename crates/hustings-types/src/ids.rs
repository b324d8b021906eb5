//! Type-safe identifier wrappers.
//!
//! Citizens are numbered densely from zero at population construction, so
//! [`VoterId`] wraps a `u32` index rather than a UUID: neighbor lookups,
//! stable sorting, and seeded RNG derivation all key off that index. The
//! one identifier that must be unique across runs is [`RunId`], which uses
//! UUID v7 (time-ordered) so reports sort by creation time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around a dense `u32` index with standard derives.
macro_rules! define_index_id {
    (
        $(#[$meta:meta])*
        $name:ident, $prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Wrap a raw index.
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Return the inner index.
            pub const fn into_inner(self) -> u32 {
                self.0
            }

            /// Return the inner index widened for slice addressing.
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, concat!($prefix, "{:04}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(index: u32) -> Self {
                Self(index)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_index_id! {
    /// Identifier of a citizen. Candidates keep the identifier they had as voters.
    VoterId, "v"
}

/// Unique identifier for a single simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for RunId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
