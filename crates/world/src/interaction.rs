//! Per-frame targeting and interaction gating.
//!
//! Each player update runs two passes over the objects near the player:
//!
//! 1. Proximity: every object's frame flags are cleared, then candidates from the
//!    spatial grid are marked in range when the player is inside their own
//!    interaction sphere.
//! 2. Targeting: a ray along the facing direction picks the nearest interactable
//!    box; it becomes the hovered object only if it was marked in range.
//!
//! The proximity pass completes for all objects before the targeting pass reads
//! any flag.

use std::cell::Cell;
use std::time::{Duration, Instant};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use worldreach_core::{InteractionKind, ObjectId, SimTick};
use worldreach_physics::normalize_or_degenerate;

use crate::catalog::ObjectCatalog;
use crate::raycast::{raycast, RayHit};
use crate::spatial::{SpatialGrid, DEFAULT_CELL_SIZE};
use crate::{InteractionStats, InteractiveObject, ObjectArena, ObjectHandle, WorldError};

/// Tunables for the interaction manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Spatial grid cell edge length. Fixed for the manager's lifetime.
    pub cell_size: f32,
    /// Radius of the per-frame proximity query around the player.
    pub max_interaction_distance: f32,
    /// Length of the targeting ray.
    pub raycast_distance: f32,
    /// Interaction radius for catalog entries that do not specify one.
    pub default_interaction_radius: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            max_interaction_distance: 5.0,
            raycast_distance: 10.0,
            default_interaction_radius: crate::DEFAULT_INTERACTION_RADIUS,
        }
    }
}

/// Why an interaction request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InteractionDenied {
    /// No object is under the crosshair.
    #[error("no object is hovered")]
    NothingHovered,
    /// The hovered object is no longer in range.
    #[error("hovered object is out of range")]
    OutOfRange,
    /// The hovered object does not accept the requested kind.
    #[error("object does not accept {requested:?} (primary is {primary:?})")]
    UnsupportedKind {
        /// Kind that was requested.
        requested: InteractionKind,
        /// The object's primary kind.
        primary: InteractionKind,
    },
}

/// A permitted interaction. Collaborators react to it; the manager only records the tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionGrant {
    /// Handle of the object interacted with.
    pub object: ObjectHandle,
    /// Its catalog id.
    pub id: ObjectId,
    /// The permitted kind.
    pub kind: InteractionKind,
    /// Tick recorded as the object's last interaction.
    pub tick: SimTick,
}

/// One action line of a crosshair prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionPrompt {
    /// Interaction kind.
    pub kind: InteractionKind,
    /// Action label ("Gather").
    pub label: &'static str,
    /// Default key hint ('E').
    pub key: char,
}

impl From<InteractionKind> for ActionPrompt {
    fn from(kind: InteractionKind) -> Self {
        Self {
            kind,
            label: kind.label(),
            key: kind.default_key(),
        }
    }
}

/// HUD payload describing the hovered object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoverPrompt {
    /// Catalog id.
    pub id: ObjectId,
    /// Display name.
    pub display_name: String,
    /// Description.
    pub description: String,
    /// Primary action.
    pub primary: ActionPrompt,
    /// Secondary actions.
    pub secondary: Vec<ActionPrompt>,
    /// Minimum level required by collaborators.
    pub required_level: u32,
    /// Item required by collaborators.
    pub required_item: Option<String>,
}

/// Owns the objects and the spatial index, tracks the player pose and gates interactions.
pub struct InteractionManager {
    config: InteractionConfig,
    objects: ObjectArena,
    index: SpatialGrid,
    player_position: Vec3,
    player_forward: Vec3,
    hovered: Option<ObjectHandle>,
    tick: SimTick,
    /// Largest reach among the objects currently managed.
    largest_reach: f32,
    raycast_count: Cell<u64>,
    query_count: Cell<u64>,
    last_raycast_time: Cell<Duration>,
}

impl Default for InteractionManager {
    fn default() -> Self {
        Self::new(InteractionConfig::default())
    }
}

impl InteractionManager {
    /// Create an empty manager.
    pub fn new(config: InteractionConfig) -> Self {
        let index = SpatialGrid::new(config.cell_size);
        let config = InteractionConfig {
            cell_size: index.cell_size(),
            ..config
        };
        Self {
            config,
            objects: ObjectArena::new(),
            index,
            player_position: Vec3::ZERO,
            player_forward: Vec3::ZERO,
            hovered: None,
            tick: SimTick::ZERO,
            largest_reach: 0.0,
            raycast_count: Cell::new(0),
            query_count: Cell::new(0),
            last_raycast_time: Cell::new(Duration::ZERO),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Number of managed objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true when no objects are managed.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Borrow an object.
    pub fn get(&self, handle: ObjectHandle) -> Option<&InteractiveObject> {
        self.objects.get(handle)
    }

    /// Resolve a catalog id.
    pub fn handle_of(&self, id: &ObjectId) -> Option<ObjectHandle> {
        self.objects.handle_of(id)
    }

    /// Iterate all objects.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectHandle, &InteractiveObject)> {
        self.objects.iter()
    }

    /// The spatial index (read-only).
    pub fn index(&self) -> &SpatialGrid {
        &self.index
    }

    /// Last player position passed to [`InteractionManager::update_player_position`].
    pub fn player_position(&self) -> Vec3 {
        self.player_position
    }

    /// Last normalized facing direction (zero if degenerate).
    pub fn player_forward(&self) -> Vec3 {
        self.player_forward
    }

    /// Player updates processed so far.
    pub fn tick(&self) -> SimTick {
        self.tick
    }

    /// Add an object and index it at its current position.
    pub fn add_object(&mut self, object: InteractiveObject) -> Result<ObjectHandle, WorldError> {
        let position = object.position();
        let reach = object.reach();
        let handle = self.objects.insert(object)?;
        self.index.insert(handle, position);
        if reach.is_finite() {
            self.largest_reach = self.largest_reach.max(reach);
        }
        Ok(handle)
    }

    /// Add every catalog entry. Duplicate ids are logged and skipped.
    ///
    /// Returns the number of objects added.
    pub fn load_catalog(&mut self, catalog: &ObjectCatalog) -> usize {
        let mut added = 0;
        for entry in &catalog.entries {
            let object = entry.to_object(self.config.default_interaction_radius);
            match self.add_object(object) {
                Ok(_) => added += 1,
                Err(err) => warn!("Ignoring catalog entry: {err}"),
            }
        }
        info!(added, total = self.objects.len(), "loaded object catalog");
        added
    }

    /// Remove an object from both the arena and the index. Returns false on a lookup miss.
    pub fn remove_object(&mut self, handle: ObjectHandle) -> bool {
        let Some(removed) = self.objects.remove(handle) else {
            return false;
        };
        self.index.remove(handle);
        if removed.reach() >= self.largest_reach {
            self.recompute_largest_reach();
        }
        if self.hovered == Some(handle) {
            self.hovered = None;
        }
        true
    }

    /// Remove an object by catalog id. Returns false on a lookup miss.
    pub fn remove_by_id(&mut self, id: &ObjectId) -> bool {
        match self.objects.handle_of(id) {
            Some(handle) => self.remove_object(handle),
            None => false,
        }
    }

    /// Move an object and reindex it. Its frame flags are cleared until the next update.
    pub fn move_object(&mut self, handle: ObjectHandle, position: Vec3) -> bool {
        let Some(object) = self.objects.get_mut(handle) else {
            return false;
        };
        object.relocate(position);
        object.clear_frame_state();
        let reach = object.reach();
        self.index.reindex(handle, position);
        if reach.is_finite() {
            self.largest_reach = self.largest_reach.max(reach);
        }
        if self.hovered == Some(handle) {
            self.hovered = None;
        }
        true
    }

    /// Enable or disable interaction with an object. Disabling drops its highlight.
    pub fn set_interactable(&mut self, handle: ObjectHandle, interactable: bool) -> bool {
        let Some(object) = self.objects.get_mut(handle) else {
            return false;
        };
        object.interactable = interactable;
        if !interactable {
            object.highlighted = false;
            if self.hovered == Some(handle) {
                self.hovered = None;
            }
        }
        true
    }

    /// Refresh range and hover state for a new player pose.
    pub fn update_player_position(&mut self, position: Vec3, facing: Vec3) {
        self.tick = self.tick.advance(1);
        self.player_position = position;
        self.player_forward = normalize_or_degenerate(facing);

        let candidates = self.query_index(position, self.proximity_radius());

        for object in self.objects.values_mut() {
            object.clear_frame_state();
        }
        for handle in candidates {
            if let Some(object) = self.objects.get_mut(handle) {
                if object.is_within_reach_of(position) {
                    object.in_range = true;
                }
            }
        }

        let hit = self.raycast(position, self.player_forward, self.config.raycast_distance);
        let previous = self.hovered;
        self.hovered = hit
            .object
            .filter(|handle| self.objects.get(*handle).is_some_and(|o| o.in_range));
        if let Some(object) = self.hovered.and_then(|h| self.objects.get_mut(h)) {
            object.highlighted = true;
        }

        if previous != self.hovered {
            let id = self
                .hovered
                .and_then(|h| self.objects.get(h))
                .map(|o| o.id.as_str());
            debug!(tick = self.tick.0, hovered = ?id, "hover changed");
        }
    }

    /// Currently hovered object.
    pub fn hovered(&self) -> Option<ObjectHandle> {
        self.hovered
    }

    /// Currently hovered object, borrowed.
    pub fn hovered_object(&self) -> Option<&InteractiveObject> {
        self.hovered.and_then(|h| self.objects.get(h))
    }

    /// Crosshair prompt for the hovered object.
    pub fn hover_prompt(&self) -> Option<HoverPrompt> {
        let object = self.hovered_object()?;
        Some(HoverPrompt {
            id: object.id.clone(),
            display_name: object.display_name.clone(),
            description: object.description.clone(),
            primary: object.primary.into(),
            secondary: object.secondary.iter().copied().map(Into::into).collect(),
            required_level: object.requirements.level,
            required_item: object.requirements.item.clone(),
        })
    }

    /// Validate `kind` against the hovered object, recording the tick on success.
    pub fn try_interact(
        &mut self,
        kind: InteractionKind,
    ) -> Result<InteractionGrant, InteractionDenied> {
        let handle = self.hovered.ok_or(InteractionDenied::NothingHovered)?;
        let object = self
            .objects
            .get_mut(handle)
            .ok_or(InteractionDenied::NothingHovered)?;
        if !object.in_range {
            return Err(InteractionDenied::OutOfRange);
        }
        if !object.accepts(kind) {
            return Err(InteractionDenied::UnsupportedKind {
                requested: kind,
                primary: object.primary,
            });
        }
        object.last_interaction = Some(self.tick);
        Ok(InteractionGrant {
            object: handle,
            id: object.id.clone(),
            kind,
            tick: self.tick,
        })
    }

    /// Boolean form of [`InteractionManager::try_interact`].
    pub fn interact(&mut self, kind: InteractionKind) -> bool {
        match self.try_interact(kind) {
            Ok(grant) => {
                debug!(id = %grant.id, ?kind, tick = grant.tick.0, "interaction permitted");
                true
            }
            Err(reason) => {
                debug!(?kind, %reason, "interaction denied");
                false
            }
        }
    }

    /// Objects whose position lies within `radius` of `center`. Order is unspecified.
    pub fn get_objects_in_radius(&self, center: Vec3, radius: f32) -> Vec<ObjectHandle> {
        self.query_index(center, radius)
            .into_iter()
            .filter(|handle| {
                self.objects
                    .get(*handle)
                    .is_some_and(|o| o.position().distance(center) <= radius)
            })
            .collect()
    }

    /// Objects in range and interactable as of the last update, in arena order.
    pub fn interactable_in_range(&self) -> Vec<ObjectHandle> {
        self.objects
            .iter()
            .filter(|(_, o)| o.in_range && o.interactable)
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Nearest interactable hit along a ray, with objects gathered from the index.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> RayHit {
        let start = Instant::now();
        self.query_count.set(self.query_count.get() + 1);
        let hit = raycast(&self.index, &self.objects, origin, direction, max_distance);
        self.last_raycast_time.set(start.elapsed());
        self.raycast_count.set(self.raycast_count.get() + 1);
        hit
    }

    /// Diagnostic snapshot.
    pub fn stats(&self) -> InteractionStats {
        InteractionStats {
            object_count: self.objects.len(),
            occupied_cells: self.index.occupied_cells(),
            raycast_count: self.raycast_count.get(),
            query_count: self.query_count.get(),
            last_raycast_us: self.last_raycast_time.get().as_secs_f64() * 1_000_000.0,
            hovered: self.hovered_object().map(|o| o.id.clone()),
            tick: self.tick,
        }
    }

    /// Log the diagnostic snapshot at info level.
    pub fn log_stats(&self) {
        let stats = self.stats();
        info!(
            objects = stats.object_count,
            cells = stats.occupied_cells,
            raycasts = stats.raycast_count,
            queries = stats.query_count,
            last_raycast_us = stats.last_raycast_us,
            hovered = ?stats.hovered.as_ref().map(ObjectId::as_str),
            "interaction stats"
        );
    }

    /// Radius of the per-frame proximity query.
    pub fn proximity_radius(&self) -> f32 {
        self.config.max_interaction_distance.max(self.largest_reach)
    }

    fn recompute_largest_reach(&mut self) {
        self.largest_reach = self
            .objects
            .iter()
            .map(|(_, o)| o.reach())
            .filter(|reach| reach.is_finite())
            .fold(0.0, f32::max);
    }

    fn query_index(&self, center: Vec3, radius: f32) -> Vec<ObjectHandle> {
        self.query_count.set(self.query_count.get() + 1);
        self.index.query(center, radius)
    }
}
