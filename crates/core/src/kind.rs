//! Interaction kinds requested by the input layer.

use serde::{Deserialize, Serialize};

/// An action the player can request against the hovered object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// Gather resources (chop, mine, pick).
    Gather,
    /// Open a container and loot it.
    Loot,
    /// Use the object (sit, open a door).
    Use,
    /// Talk to an NPC.
    Talk,
    /// Mount a vehicle.
    Mount,
    /// Examine the object.
    Examine,
}

impl InteractionKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Gather,
        Self::Loot,
        Self::Use,
        Self::Talk,
        Self::Mount,
        Self::Examine,
    ];

    /// Canonical string key used in catalogs/configs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gather => "gather",
            Self::Loot => "loot",
            Self::Use => "use",
            Self::Talk => "talk",
            Self::Mount => "mount",
            Self::Examine => "examine",
        }
    }

    /// Parse a canonical string key (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
    }

    /// Human-readable action label for HUD prompts.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Gather => "Gather",
            Self::Loot => "Loot",
            Self::Use => "Use",
            Self::Talk => "Talk",
            Self::Mount => "Mount",
            Self::Examine => "Examine",
        }
    }

    /// Default keyboard key bound to this kind.
    pub const fn default_key(self) -> char {
        match self {
            Self::Gather => 'E',
            Self::Loot => 'F',
            Self::Use => 'G',
            Self::Talk => 'T',
            Self::Mount => 'M',
            Self::Examine => 'X',
        }
    }

    /// Reverse of [`InteractionKind::default_key`].
    pub fn from_default_key(key: char) -> Option<Self> {
        let key = key.to_ascii_uppercase();
        Self::ALL.into_iter().find(|kind| kind.default_key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keys_are_unique_and_reversible() {
        for kind in InteractionKind::ALL {
            assert_eq!(InteractionKind::from_default_key(kind.default_key()), Some(kind));
        }
        assert_eq!(
            InteractionKind::from_default_key('e'),
            Some(InteractionKind::Gather)
        );
        assert_eq!(InteractionKind::from_default_key('Q'), None);
    }

    #[test]
    fn parse_accepts_any_case() {
        assert_eq!(InteractionKind::parse("LOOT"), Some(InteractionKind::Loot));
        assert_eq!(InteractionKind::parse("none"), None);
    }
}
