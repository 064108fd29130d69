//! Object categories.
//!
//! Categories classify catalog records for presentation and for collaborators
//! reacting to interactions. The targeting core never branches on them.

use serde::{Deserialize, Serialize};

/// Broad classification of an interactive object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    /// Trees, rocks, plants.
    Resource,
    /// Chests, barrels, crates.
    Container,
    /// Chairs, tables, beds.
    Furniture,
    /// Swords, bows, staves.
    Weapon,
    /// Helmets, chestplates, boots.
    Armor,
    /// Horses, carts, ships.
    Vehicle,
    /// Non-player characters.
    Npc,
    /// Doors and gates.
    Door,
    /// Quest triggers and zone transitions.
    Trigger,
    /// Set dressing.
    Decoration,
}

impl ObjectCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Resource,
        Self::Container,
        Self::Furniture,
        Self::Weapon,
        Self::Armor,
        Self::Vehicle,
        Self::Npc,
        Self::Door,
        Self::Trigger,
        Self::Decoration,
    ];

    /// Canonical string key used in catalogs/logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::Container => "container",
            Self::Furniture => "furniture",
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Vehicle => "vehicle",
            Self::Npc => "npc",
            Self::Door => "door",
            Self::Trigger => "trigger",
            Self::Decoration => "decoration",
        }
    }

    /// Parse a canonical string key.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_keys_roundtrip() {
        for category in ObjectCategory::ALL {
            assert_eq!(ObjectCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(ObjectCategory::parse("NPC"), Some(ObjectCategory::Npc));
        assert_eq!(ObjectCategory::parse("spaceship"), None);
    }

    #[test]
    fn serde_uses_snake_case_keys() {
        let json = serde_json::to_string(&ObjectCategory::Decoration).unwrap();
        assert_eq!(json, "\"decoration\"");
        let parsed: ObjectCategory = serde_json::from_str("\"container\"").unwrap();
        assert_eq!(parsed, ObjectCategory::Container);
    }
}
