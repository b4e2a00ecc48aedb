use rand::Rng;

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::*,
    playfield::{Playfield, bearing_deg, travel_time},
    pool::{ProjectileKind, SpawnRequest},
};

// ============================================================================
// Radial Burst
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum RadialDirection {
    // Boundary -> centre
    #[default]
    Inward,
    // Centre -> boundary
    Outward,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct RadialParams {
    pub count: u32,
    pub speed: f32,
    pub direction: RadialDirection,
    pub kind: ProjectileKind,
}

impl Default for RadialParams {
    fn default() -> Self {
        Self {
            count: RADIAL_COUNT,
            speed: RADIAL_SPEED,
            direction: RadialDirection::Inward,
            kind: ProjectileKind::Bullet,
        }
    }
}

// `count` projectiles between random boundary points and the centre. Each one is released
// exactly when it arrives (distance / speed), so none outlives its trip.
pub fn radial<R: Rng + ?Sized>(field: &Playfield, params: &RadialParams, rng: &mut R) -> Vec<SpawnRequest> {
    let center = field.center();
    let mut requests = Vec::with_capacity(params.count as usize);

    for _ in 0..params.count {
        let edge_point = field.random_boundary_point(rng);
        let (from, to) = match params.direction {
            RadialDirection::Inward => (edge_point, center),
            RadialDirection::Outward => (center, edge_point),
        };

        let Some(angle) = bearing_deg(from, to) else {
            continue;
        };
        let Some(arrival) = travel_time(from.distance(to), params.speed) else {
            continue;
        };

        requests.push(SpawnRequest::new(from, angle, params.speed, params.kind).with_lifetime(arrival));
    }

    requests
}
