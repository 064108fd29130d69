//! Static object catalogs produced offline and loaded at world start.
//!
//! A catalog is a JSON array of entries. Only the fields targeting needs are
//! read; gameplay payload (rarity, price, damage, ...) is ignored.

use std::fs;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use worldreach_core::{InteractionKind, ObjectCategory, ObjectId};
use worldreach_physics::{Aabb, BoundingSphere};

use crate::{InteractiveObject, Requirements};

/// Errors emitted during catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Wrap IO errors when reading catalogs.
    #[error("failed to read object catalog: {0}")]
    Io(#[from] std::io::Error),
    /// Wrap serde parsing issues.
    #[error("failed to parse object catalog: {0}")]
    Parse(#[from] serde_json::Error),
    /// An entry failed validation.
    #[error("invalid catalog entry {id}: {reason}")]
    InvalidEntry {
        /// Offending entry id.
        id: String,
        /// What was wrong.
        reason: &'static str,
    },
}

/// One catalog record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique id.
    pub id: String,
    /// Category.
    pub category: ObjectCategory,
    /// Display name (defaults to the id).
    #[serde(default)]
    pub display_name: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// World position `[x, y, z]`.
    pub position: Vec3,
    /// Orientation `[x, y, z]`.
    #[serde(default)]
    pub rotation: Vec3,
    /// Collision box.
    pub bounds: Aabb,
    /// Interaction radius around the box center.
    #[serde(default)]
    pub interaction_radius: Option<f32>,
    /// Primary interaction kind.
    pub primary: InteractionKind,
    /// Secondary interaction kinds.
    #[serde(default)]
    pub secondary: Vec<InteractionKind>,
    /// Whether the object can be interacted with.
    #[serde(default = "default_interactable")]
    pub interactable: bool,
    /// Minimum level.
    #[serde(default = "default_required_level")]
    pub required_level: u32,
    /// Required held item.
    #[serde(default)]
    pub required_item: Option<String>,
}

fn default_interactable() -> bool {
    true
}

fn default_required_level() -> u32 {
    1
}

impl CatalogEntry {
    /// Build the runtime object, using `default_radius` when the entry has none.
    pub fn to_object(&self, default_radius: f32) -> InteractiveObject {
        let radius = self.interaction_radius.unwrap_or(default_radius);
        InteractiveObject::new(
            ObjectId::new(self.id.clone()),
            self.category,
            self.position,
            self.bounds,
            self.primary,
        )
        .with_display_name(self.display_name.clone().unwrap_or_else(|| self.id.clone()))
        .with_description(self.description.clone())
        .with_rotation(self.rotation)
        .with_interaction_sphere(BoundingSphere::new(self.bounds.center(), radius))
        .with_secondary(self.secondary.iter().copied())
        .with_requirements(Requirements {
            level: self.required_level,
            item: self.required_item.clone(),
        })
        .with_interactable(self.interactable)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let invalid = |reason| CatalogError::InvalidEntry {
            id: self.id.clone(),
            reason,
        };
        if self.id.is_empty() {
            return Err(invalid("empty id"));
        }
        if !self.position.is_finite() || !self.bounds.min.is_finite() || !self.bounds.max.is_finite()
        {
            return Err(invalid("non-finite coordinates"));
        }
        if let Some(radius) = self.interaction_radius {
            if !radius.is_finite() || radius < 0.0 {
                return Err(invalid("interaction radius must be finite and non-negative"));
            }
        }
        if !self.bounds.is_well_formed() {
            warn!(id = %self.id, "catalog entry has inverted bounds");
        }
        Ok(())
    }
}

/// A loaded catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectCatalog {
    /// Entries in file order.
    pub entries: Vec<CatalogEntry>,
}

/// Parse and validate a JSON catalog.
pub fn catalog_from_str(input: &str) -> Result<ObjectCatalog, CatalogError> {
    let catalog: ObjectCatalog = serde_json::from_str(input)?;
    for entry in &catalog.entries {
        entry.validate()?;
    }
    Ok(catalog)
}

/// Load a catalog from the provided JSON file path.
pub fn catalog_from_file(path: &Path) -> Result<ObjectCatalog, CatalogError> {
    let data = fs::read_to_string(path)?;
    catalog_from_str(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "id": "tree_001",
            "category": "resource",
            "display_name": "Oak Tree",
            "description": "A sturdy oak tree ready for chopping",
            "position": [5.0, 0.0, 0.0],
            "bounds": { "min": [4.5, 0.0, -0.5], "max": [5.5, 3.0, 0.5] },
            "interaction_radius": 3.0,
            "primary": "gather",
            "rarity": "legendary",
            "price": 120
        },
        {
            "id": "door_001",
            "category": "door",
            "position": [15.0, 0.0, 0.0],
            "bounds": { "min": [14.5, 0.0, -0.5], "max": [15.5, 2.5, 0.5] },
            "primary": "use",
            "secondary": ["examine"],
            "required_item": "iron_key"
        }
    ]"#;

    #[test]
    fn parses_entries_and_ignores_payload() {
        let catalog = catalog_from_str(SAMPLE).expect("catalog parses");
        assert_eq!(catalog.entries.len(), 2);
        let door = &catalog.entries[1];
        assert_eq!(door.secondary, vec![InteractionKind::Examine]);
        assert!(door.interactable);
        assert_eq!(door.required_level, 1);
        assert_eq!(door.display_name, None);
    }

    #[test]
    fn entry_builds_object_with_defaults() {
        let catalog = catalog_from_str(SAMPLE).unwrap();
        let door = catalog.entries[1].to_object(2.0);
        assert_eq!(door.display_name, "door_001");
        assert_eq!(door.interaction_sphere().radius, 2.0);
        assert_eq!(door.interaction_sphere().center, Vec3::new(15.0, 1.25, 0.0));
        assert_eq!(door.requirements.item.as_deref(), Some("iron_key"));
        assert!(door.accepts(InteractionKind::Examine));
    }

    #[test]
    fn negative_radius_is_rejected() {
        let input = r#"[{
            "id": "bad", "category": "trigger", "position": [0, 0, 0],
            "bounds": { "min": [0, 0, 0], "max": [1, 1, 1] },
            "interaction_radius": -1.0, "primary": "examine"
        }]"#;
        let err = catalog_from_str(input).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidEntry { ref id, .. } if id == "bad"));
    }

    #[test]
    fn inverted_bounds_are_accepted() {
        let input = r#"[{
            "id": "flipped", "category": "decoration", "position": [0, 0, 0],
            "bounds": { "min": [1, 1, 1], "max": [0, 0, 0] }, "primary": "examine"
        }]"#;
        assert_eq!(catalog_from_str(input).unwrap().entries.len(), 1);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            catalog_from_str("{ not json"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("worldreach-missing-catalog.json");
        assert!(matches!(catalog_from_file(&path), Err(CatalogError::Io(_))));
    }
}
