use bevy_math::Vec2;
use std::time::Duration;

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::*,
    playfield::bearing_deg,
    pool::{ProjectileKind, SpawnRequest},
};

// ============================================================================
// Aimed Shot
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct AimedParams {
    pub speed: f32,
    pub lifetime_ms: Option<u64>,
    pub kind: ProjectileKind,
}

impl Default for AimedParams {
    fn default() -> Self {
        Self {
            speed: AIMED_SPEED,
            lifetime_ms: Some(AIMED_LIFETIME_MS),
            kind: ProjectileKind::Bullet,
        }
    }
}

// One projectile straight at the target
#[must_use]
pub fn aimed(origin: Vec2, target: Option<Vec2>, params: &AimedParams) -> Option<SpawnRequest> {
    let angle = bearing_deg(origin, target?)?;
    let request = SpawnRequest::new(origin, angle, params.speed, params.kind);
    Some(match params.lifetime_ms {
        Some(ms) => request.with_lifetime(Duration::from_millis(ms)),
        None => request.culled_out_of_bounds(),
    })
}

// ============================================================================
// Straight Shot
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct StraightParams {
    pub angle_deg: f32,
    pub speed: f32,
    pub kind: ProjectileKind,
}

impl Default for StraightParams {
    fn default() -> Self {
        Self {
            angle_deg: 90.0,
            speed: STRAIGHT_SPEED,
            kind: ProjectileKind::Main,
        }
    }
}

// One projectile along a fixed heading, culled when it leaves the playfield
#[must_use]
pub fn straight(origin: Vec2, params: &StraightParams) -> SpawnRequest {
    SpawnRequest::new(origin, params.angle_deg, params.speed, params.kind).culled_out_of_bounds()
}
