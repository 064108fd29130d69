//! Interactive objects: identity, geometry, accepted interactions and per-frame state.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use worldreach_core::{InteractionKind, ObjectCategory, ObjectId, SimTick};
use worldreach_physics::{Aabb, BoundingSphere};

/// Interaction radius used when an object does not specify one.
pub const DEFAULT_INTERACTION_RADIUS: f32 = 3.0;

/// Requirement metadata carried for collaborators. Validation here never enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Requirements {
    /// Minimum player level.
    pub level: u32,
    /// Item the player must hold, if any.
    pub item: Option<String>,
}

impl Default for Requirements {
    fn default() -> Self {
        Self {
            level: 1,
            item: None,
        }
    }
}

/// Targeting state of an object for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionState {
    /// Outside its interaction sphere.
    OutOfRange,
    /// Inside its interaction sphere but not under the crosshair.
    InRange,
    /// In range and the nearest ray hit; at most one object per frame.
    Highlighted,
}

/// An object the player can target and interact with.
///
/// Geometry is only mutable through the owning manager so the spatial index
/// never drifts from the object's position.
#[derive(Debug, Clone)]
pub struct InteractiveObject {
    /// Catalog identifier.
    pub id: ObjectId,
    /// Classification.
    pub category: ObjectCategory,
    /// Presentation name.
    pub display_name: String,
    /// Presentation description.
    pub description: String,
    /// Orientation (Euler angles, radians). Carried, never used for ray tests.
    pub rotation: Vec3,
    /// The default action.
    pub primary: InteractionKind,
    /// Additional accepted actions.
    pub secondary: Vec<InteractionKind>,
    /// Requirement metadata.
    pub requirements: Requirements,
    position: Vec3,
    bounds: Aabb,
    interaction_sphere: BoundingSphere,
    pub(crate) interactable: bool,
    pub(crate) highlighted: bool,
    pub(crate) in_range: bool,
    pub(crate) last_interaction: Option<SimTick>,
}

impl InteractiveObject {
    /// Create an interactable object whose interaction sphere sits at the box
    /// center with [`DEFAULT_INTERACTION_RADIUS`].
    pub fn new(
        id: impl Into<ObjectId>,
        category: ObjectCategory,
        position: Vec3,
        bounds: Aabb,
        primary: InteractionKind,
    ) -> Self {
        let id = id.into();
        Self {
            display_name: id.to_string(),
            id,
            category,
            description: String::new(),
            rotation: Vec3::ZERO,
            primary,
            secondary: Vec::new(),
            requirements: Requirements::default(),
            position,
            interaction_sphere: BoundingSphere::new(bounds.center(), DEFAULT_INTERACTION_RADIUS),
            bounds,
            interactable: true,
            highlighted: false,
            in_range: false,
            last_interaction: None,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the orientation.
    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Keep the sphere center, change its radius.
    pub fn with_interaction_radius(mut self, radius: f32) -> Self {
        self.interaction_sphere.radius = radius;
        self
    }

    /// Replace the interaction sphere entirely.
    pub fn with_interaction_sphere(mut self, sphere: BoundingSphere) -> Self {
        self.interaction_sphere = sphere;
        self
    }

    /// Set the secondary interaction kinds.
    pub fn with_secondary(mut self, kinds: impl IntoIterator<Item = InteractionKind>) -> Self {
        self.secondary = kinds.into_iter().collect();
        self
    }

    /// Set requirement metadata.
    pub fn with_requirements(mut self, requirements: Requirements) -> Self {
        self.requirements = requirements;
        self
    }

    /// Set whether the object can ever be interacted with.
    pub fn with_interactable(mut self, interactable: bool) -> Self {
        self.interactable = interactable;
        self
    }

    /// World position (the spatial index key source).
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Collision box used for ray tests.
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// Sphere used for range tests.
    pub fn interaction_sphere(&self) -> &BoundingSphere {
        &self.interaction_sphere
    }

    /// Whether the object can be interacted with at all.
    pub fn is_interactable(&self) -> bool {
        self.interactable
    }

    /// Whether the object is this frame's hovered object.
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Whether the player was inside the interaction sphere this frame.
    pub fn is_in_range(&self) -> bool {
        self.in_range
    }

    /// Tick of the last successful interaction.
    pub fn last_interaction(&self) -> Option<SimTick> {
        self.last_interaction
    }

    /// Current targeting state.
    pub fn state(&self) -> InteractionState {
        if self.highlighted {
            InteractionState::Highlighted
        } else if self.in_range {
            InteractionState::InRange
        } else {
            InteractionState::OutOfRange
        }
    }

    /// True if `kind` is the primary kind or one of the secondary kinds.
    pub fn accepts(&self, kind: InteractionKind) -> bool {
        self.primary == kind || self.secondary.contains(&kind)
    }

    /// Range test against this object's own sphere.
    pub fn is_within_reach_of(&self, player: Vec3) -> bool {
        self.interaction_sphere.contains_point(player)
    }

    /// Farthest distance from `position` at which a player can still be in range.
    pub fn reach(&self) -> f32 {
        self.interaction_sphere.center.distance(self.position) + self.interaction_sphere.radius
    }

    /// Move the object, carrying its box and sphere along. Caller reindexes.
    pub(crate) fn relocate(&mut self, position: Vec3) {
        let delta = position - self.position;
        self.position = position;
        self.bounds = self.bounds.translated(delta);
        self.interaction_sphere = self.interaction_sphere.translated(delta);
    }

    pub(crate) fn clear_frame_state(&mut self) {
        self.in_range = false;
        self.highlighted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> InteractiveObject {
        InteractiveObject::new(
            "tree_001",
            ObjectCategory::Resource,
            Vec3::new(5.0, 0.0, 0.0),
            Aabb::new(Vec3::new(4.5, 0.0, -0.5), Vec3::new(5.5, 3.0, 0.5)),
            InteractionKind::Gather,
        )
    }

    #[test]
    fn sphere_defaults_to_box_center() {
        let tree = tree();
        assert_eq!(tree.interaction_sphere().center, Vec3::new(5.0, 1.5, 0.0));
        assert_eq!(tree.interaction_sphere().radius, DEFAULT_INTERACTION_RADIUS);
        assert_eq!(tree.display_name, "tree_001");
        assert!(tree.is_interactable());
        assert_eq!(tree.state(), InteractionState::OutOfRange);
    }

    #[test]
    fn accepts_primary_and_secondary_only() {
        let door = tree()
            .with_secondary([InteractionKind::Examine])
            .with_display_name("Wooden Door");
        assert!(door.accepts(InteractionKind::Gather));
        assert!(door.accepts(InteractionKind::Examine));
        assert!(!door.accepts(InteractionKind::Loot));
    }

    #[test]
    fn relocate_carries_geometry() {
        let mut tree = tree();
        tree.relocate(Vec3::new(15.0, 0.0, 0.0));
        assert_eq!(tree.position(), Vec3::new(15.0, 0.0, 0.0));
        assert_eq!(tree.bounds().min, Vec3::new(14.5, 0.0, -0.5));
        assert_eq!(tree.interaction_sphere().center, Vec3::new(15.0, 1.5, 0.0));
    }

    #[test]
    fn reach_includes_sphere_offset() {
        let tree = tree().with_interaction_radius(2.0);
        assert!((tree.reach() - 3.5).abs() < 1e-6);
    }
}
