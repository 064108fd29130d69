use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::Path,
};
use tracing::warn;
use worldreach_core::InteractionKind;
use worldreach_world::InteractionConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/worldreach.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub interaction: InteractionConfig,
    /// Key overrides, e.g. `F = "use"`. Unlisted kinds keep their default key.
    pub bindings: BTreeMap<String, String>,
}

impl ProbeConfig {
    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_lenient(&contents, path),
            Err(err) => {
                if path != Path::new(DEFAULT_CONFIG_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Probe config not found at {}. Using defaults", path.display());
                }
                ProbeConfig::default()
            }
        }
    }

    fn from_toml_lenient(contents: &str, path: &Path) -> Self {
        match toml::from_str::<ProbeConfig>(contents) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!("Failed to parse {}: {err}. Using defaults", path.display());
                ProbeConfig::default()
            }
        }
    }

    /// Resolve the key map: defaults first, then overrides. Invalid entries are skipped.
    pub fn key_bindings(&self) -> KeyBindings {
        let mut keys: BTreeMap<char, InteractionKind> = InteractionKind::ALL
            .into_iter()
            .map(|kind| (kind.default_key(), kind))
            .collect();

        for (key, kind_name) in &self.bindings {
            let Some(key_char) = single_key(key) else {
                warn!(key = %key, "Ignoring binding: key must be a single character");
                continue;
            };
            let Some(kind) = InteractionKind::parse(kind_name) else {
                warn!(key = %key, kind = %kind_name, "Ignoring binding: unknown interaction kind");
                continue;
            };
            // A rebound kind loses its previous key.
            keys.retain(|_, bound| *bound != kind);
            keys.insert(key_char, kind);
        }
        KeyBindings { keys }
    }
}

fn single_key(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

/// Resolved key → interaction kind map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    keys: BTreeMap<char, InteractionKind>,
}

impl KeyBindings {
    pub fn kind_for(&self, key: char) -> Option<InteractionKind> {
        self.keys.get(&key.to_ascii_uppercase()).copied()
    }
}
