use bevy_math::Vec2;
use rand::Rng;
use std::time::Duration;

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use super::angular_error;
use crate::{
    constants::*,
    playfield::bearing_deg,
    pool::{ProjectileKind, SpawnRequest},
};

// ============================================================================
// Flurry
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct FlurryParams {
    pub speed: f32,
    pub error_deg: f32,
    pub lifetime_ms: u64,
    pub kind: ProjectileKind,
}

impl Default for FlurryParams {
    fn default() -> Self {
        Self {
            speed: FLURRY_SPEED,
            error_deg: FLURRY_ERROR_DEG,
            lifetime_ms: FLURRY_LIFETIME_MS,
            kind: ProjectileKind::Bullet,
        }
    }
}

// One loosely aimed projectile. It expires on its own lifetime, whatever the phase does.
pub fn flurry<R: Rng + ?Sized>(
    origin: Vec2,
    target: Option<Vec2>,
    params: &FlurryParams,
    rng: &mut R,
) -> Option<SpawnRequest> {
    let base_deg = bearing_deg(origin, target?)?;
    let angle = base_deg + angular_error(rng, params.error_deg);
    Some(
        SpawnRequest::new(origin, angle, params.speed, params.kind)
            .with_lifetime(Duration::from_millis(params.lifetime_ms)),
    )
}
