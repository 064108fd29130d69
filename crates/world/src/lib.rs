#![warn(missing_docs)]
//! Object targeting for large 3D worlds: spatial index, raycasting and
//! interaction validation.

mod arena;
pub mod catalog;
mod interaction;
mod object;
mod raycast;
mod spatial;
mod stats;

pub use arena::{ObjectArena, ObjectHandle};
pub use catalog::{
    catalog_from_file, catalog_from_str, CatalogEntry, CatalogError, ObjectCatalog,
};
pub use interaction::{
    ActionPrompt, HoverPrompt, InteractionConfig, InteractionDenied, InteractionGrant,
    InteractionManager,
};
pub use object::{InteractionState, InteractiveObject, Requirements, DEFAULT_INTERACTION_RADIUS};
pub use raycast::{nearest_hit, raycast, RayHit};
pub use spatial::{CellKey, SpatialGrid, DEFAULT_CELL_SIZE};
pub use stats::InteractionStats;

use thiserror::Error;
use worldreach_core::ObjectId;

/// Errors emitted while populating the world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// An object with this id is already present.
    #[error("object id {0} is already present")]
    DuplicateId(ObjectId),
}
