#![warn(missing_docs)]
//! Core primitives shared across the workspace.

pub mod category;
pub mod kind;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export commonly used types
pub use category::ObjectCategory;
pub use kind::InteractionKind;

/// Fixed tick type. The interaction manager advances it once per player update.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Helper to derive a reproducible RNG from a world seed, a domain hash and a tick.
///
/// Randomness is always passed in explicitly; nothing in the workspace seeds from the clock.
pub fn scoped_rng(world_seed: u64, domain_hash: u64, tick: SimTick) -> StdRng {
    let seed = world_seed ^ domain_hash ^ tick.0;
    StdRng::seed_from_u64(seed)
}

/// Catalog identifier of an interactive object (e.g. `"tree_001"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wrap a catalog identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ObjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
