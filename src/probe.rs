//! Headless probe loop: replays scripted frames through the interaction manager.

use anyhow::Result;
use std::time::Instant;
use tracing::{debug, info};
use worldreach_testkit::{EventRecord, InteractionMetrics, JsonlSink};
use worldreach_world::InteractionManager;

use crate::config::KeyBindings;
use crate::scripted_input::ScriptedFrame;

/// Counters accumulated while replaying.
#[derive(Debug, Default, Clone)]
pub struct ProbeTally {
    pub updates: u64,
    pub hovered_updates: u64,
    pub interactions_permitted: u64,
    pub interactions_denied: u64,
    pub unbound_keys: u64,
    total_update_us: f64,
    max_update_us: f64,
}

impl ProbeTally {
    pub fn into_metrics(self, manager: &InteractionManager) -> InteractionMetrics {
        let stats = manager.stats();
        InteractionMetrics {
            objects: stats.object_count,
            occupied_cells: stats.occupied_cells,
            updates: self.updates,
            avg_update_time_us: if self.updates == 0 {
                0.0
            } else {
                self.total_update_us / self.updates as f64
            },
            max_update_time_us: self.max_update_us,
            raycasts: stats.raycast_count,
            queries: stats.query_count,
            hovered_updates: self.hovered_updates,
            interactions_permitted: self.interactions_permitted,
            interactions_denied: self.interactions_denied,
        }
    }
}

pub struct Probe<'a> {
    manager: &'a mut InteractionManager,
    bindings: KeyBindings,
    events: Option<JsonlSink>,
    tally: ProbeTally,
}

impl<'a> Probe<'a> {
    pub fn new(
        manager: &'a mut InteractionManager,
        bindings: KeyBindings,
        events: Option<JsonlSink>,
    ) -> Self {
        Self {
            manager,
            bindings,
            events,
            tally: ProbeTally::default(),
        }
    }

    /// Apply one frame: pose update, then each key press in order.
    pub fn step(&mut self, frame: &ScriptedFrame) -> Result<()> {
        let previous = self.manager.hovered();
        let start = Instant::now();
        self.manager
            .update_player_position(frame.position, frame.facing);
        let elapsed_us = start.elapsed().as_secs_f64() * 1_000_000.0;
        self.tally.updates += 1;
        self.tally.total_update_us += elapsed_us;
        self.tally.max_update_us = self.tally.max_update_us.max(elapsed_us);

        if self.manager.hovered().is_some() {
            self.tally.hovered_updates += 1;
        }
        if previous != self.manager.hovered() {
            let payload = self
                .manager
                .hovered_object()
                .map(|o| o.id.to_string())
                .unwrap_or_default();
            self.emit("hover", &payload)?;
        }

        for &key in &frame.keys {
            let Some(kind) = self.bindings.kind_for(key) else {
                debug!(%key, "key not bound to an interaction");
                self.tally.unbound_keys += 1;
                continue;
            };
            match self.manager.try_interact(kind) {
                Ok(grant) => {
                    self.tally.interactions_permitted += 1;
                    let payload = format!("{}:{}", grant.id, kind.as_str());
                    self.emit("interact", &payload)?;
                }
                Err(reason) => {
                    self.tally.interactions_denied += 1;
                    let payload = format!("{}:{reason}", kind.as_str());
                    self.emit("denied", &payload)?;
                }
            }
        }
        Ok(())
    }

    pub fn run(mut self, frames: impl IntoIterator<Item = ScriptedFrame>) -> Result<ProbeTally> {
        for frame in frames {
            self.step(&frame)?;
        }
        info!(
            updates = self.tally.updates,
            hovered = self.tally.hovered_updates,
            permitted = self.tally.interactions_permitted,
            denied = self.tally.interactions_denied,
            "probe replay finished"
        );
        Ok(self.tally)
    }

    fn emit(&mut self, kind: &str, payload: &str) -> Result<()> {
        if let Some(sink) = self.events.as_mut() {
            sink.write(&EventRecord {
                tick: self.manager.tick(),
                kind,
                payload,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbeConfig;
    use crate::scripted_input::{ScriptedInputPlayer, ScriptedStep};
    use glam::Vec3;
    use worldreach_core::{InteractionKind, ObjectCategory};
    use worldreach_physics::Aabb;
    use worldreach_world::InteractiveObject;

    fn tree_world() -> InteractionManager {
        let mut manager = InteractionManager::default();
        manager
            .add_object(InteractiveObject::new(
                "tree_001",
                ObjectCategory::Resource,
                Vec3::new(5.0, 0.0, 0.0),
                Aabb::new(Vec3::new(4.5, 0.0, -0.5), Vec3::new(5.5, 3.0, 0.5)),
                InteractionKind::Gather,
            ))
            .unwrap();
        manager
    }

    #[test]
    fn replay_counts_hover_and_key_outcomes() {
        let mut manager = tree_world();
        let frames = ScriptedInputPlayer::from_steps(vec![
            // Out of range: hovered ray hit is rejected.
            ScriptedStep::new(Vec3::new(-2.0, 1.5, 0.0), Vec3::X).with_keys(['E']),
            ScriptedStep::new(Vec3::new(2.0, 1.5, 0.0), Vec3::X).with_keys(['E', 'F', 'Q']),
        ])
        .unwrap();

        let tally = Probe::new(&mut manager, ProbeConfig::default().key_bindings(), None)
            .run(frames)
            .unwrap();

        assert_eq!(tally.updates, 2);
        assert_eq!(tally.hovered_updates, 1);
        assert_eq!(tally.interactions_permitted, 1);
        assert_eq!(tally.interactions_denied, 2);
        assert_eq!(tally.unbound_keys, 1);

        let metrics = tally.into_metrics(&manager);
        assert_eq!(metrics.objects, 1);
        assert_eq!(metrics.raycasts, 2);
    }

    #[test]
    fn events_are_written_for_hover_changes_and_interactions() {
        let path = std::env::temp_dir().join(format!(
            "worldreach-probe-events-{}.jsonl",
            std::process::id()
        ));
        let sink = JsonlSink::create(&path).unwrap();
        let mut manager = tree_world();
        let frames = vec![
            ScriptedFrame {
                position: Vec3::new(2.0, 1.5, 0.0),
                facing: Vec3::X,
                keys: vec!['E'],
            },
            ScriptedFrame {
                position: Vec3::new(2.0, 1.5, 0.0),
                facing: Vec3::NEG_X,
                keys: Vec::new(),
            },
        ];
        Probe::new(&mut manager, ProbeConfig::default().key_bindings(), Some(sink))
            .run(frames)
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("\"kind\":\"hover\"") && lines[0].contains("tree_001"));
        assert!(lines[1].contains("tree_001:gather"));
        assert!(lines[2].contains("\"payload\":\"\""));
        let _ = std::fs::remove_file(&path);
    }
}
