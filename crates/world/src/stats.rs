//! Diagnostic snapshot of the interaction manager. Advisory only.

use serde::Serialize;
use worldreach_core::{ObjectId, SimTick};

/// Counters and latencies for HUD/telemetry consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionStats {
    /// Objects owned by the manager.
    pub object_count: usize,
    /// Non-empty spatial grid cells.
    pub occupied_cells: usize,
    /// Raycasts performed since creation.
    pub raycast_count: u64,
    /// Spatial index queries performed since creation.
    pub query_count: u64,
    /// Wall-clock duration of the last raycast, in microseconds.
    pub last_raycast_us: f64,
    /// Currently hovered object.
    pub hovered: Option<ObjectId>,
    /// Player updates processed.
    pub tick: SimTick,
}
