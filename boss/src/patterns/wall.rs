use std::time::Duration;

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::*,
    playfield::{Edge, Playfield, travel_time},
    pool::{ProjectileKind, SpawnRequest},
};

// ============================================================================
// Wall Volley
// ============================================================================

// Spikes slide in from each edge in turn and lock in place just inside it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct WallParams {
    pub spacing: f32,
    pub edge_delay_ms: u64,
    pub shot_delay_ms: u64,
    pub spawn_offset: f32,
    pub speed: f32,
    pub kind: ProjectileKind,
}

impl Default for WallParams {
    fn default() -> Self {
        Self {
            spacing: WALL_SPACING,
            edge_delay_ms: WALL_EDGE_DELAY_MS,
            shot_delay_ms: WALL_SHOT_DELAY_MS,
            spawn_offset: WALL_SPAWN_OFFSET,
            speed: WALL_SPEED,
            kind: ProjectileKind::Spike,
        }
    }
}

impl WallParams {
    // Delay from the volley start until `edge` begins releasing
    #[must_use]
    pub fn edge_delay(&self, edge: Edge) -> Duration {
        let index = Edge::CLOCKWISE.iter().position(|e| *e == edge).unwrap_or(0) as u32;
        Duration::from_millis(self.edge_delay_ms) * index
    }

    // Delay from the edge start until shot `index` on that edge
    #[must_use]
    pub fn shot_delay(&self, index: usize) -> Duration {
        Duration::from_millis(self.shot_delay_ms) * index as u32
    }

    // Time a spike travels before locking: long enough to cross the spawn offset
    #[must_use]
    pub fn halt_after(&self) -> Option<Duration> {
        travel_time(self.spawn_offset, self.speed)
    }

    // Offset of the very last shot from the volley start
    #[must_use]
    pub fn span(&self, field: &Playfield) -> Duration {
        Edge::CLOCKWISE
            .iter()
            .map(|edge| {
                let shots = wall_positions(field, *edge, self.spacing).len();
                self.edge_delay(*edge) + self.shot_delay(shots.saturating_sub(1))
            })
            .max()
            .unwrap_or_default()
    }
}

// Positions along `edge` at `spacing`, in release order.
// Bottom and left run backwards, so the release sweeps around the playfield.
#[must_use]
pub fn wall_positions(field: &Playfield, edge: Edge, spacing: f32) -> Vec<f32> {
    if spacing <= GEOMETRY_EPSILON {
        return Vec::new();
    }
    let length = edge.length(field);
    let count = (length / spacing).floor() as usize + 1;
    let mut positions: Vec<f32> = (0..count).map(|i| i as f32 * spacing).collect();

    if matches!(edge, Edge::Bottom | Edge::Left) {
        positions.reverse();
    }
    positions
}

// The spike for one position along one edge
#[must_use]
pub fn wall_shot(field: &Playfield, edge: Edge, along: f32, params: &WallParams) -> SpawnRequest {
    let position = edge.outside_point(field, along, params.spawn_offset);
    let request = SpawnRequest::new(position, edge.inward_angle(), params.speed, params.kind);
    match params.halt_after() {
        Some(halt_after) => request.with_halt_after(halt_after),
        None => request,
    }
}
