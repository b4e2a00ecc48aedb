use bevy_math::Vec2;
use rand::Rng;

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use super::angular_error;
use crate::{
    constants::*,
    playfield::bearing_deg,
    pool::{ProjectileKind, SpawnRequest},
};

// ============================================================================
// Fan Shot
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct FanParams {
    pub count: u32,
    pub width_deg: f32,
    pub speed: f32,
    pub error_deg: f32,
    pub kind: ProjectileKind,
}

impl Default for FanParams {
    fn default() -> Self {
        Self {
            count: FAN_BULLETS,
            width_deg: FAN_WIDTH_DEG,
            speed: FAN_SPEED,
            error_deg: FAN_ERROR_DEG,
            kind: ProjectileKind::Shard,
        }
    }
}

// Ideal headings before error: `count` angles evenly spread over `width_deg`, centred on `base_deg`
#[must_use]
pub fn fan_angles(base_deg: f32, count: u32, width_deg: f32) -> Vec<f32> {
    if count <= 1 {
        return vec![base_deg; count as usize];
    }
    let step = width_deg / (count - 1) as f32;
    (0..count)
        .map(|i| (i as f32).mul_add(step, base_deg - width_deg / 2.0))
        .collect()
}

// One fan toward `target`. Each projectile gets its own error in [-error_deg, +error_deg].
pub fn fan<R: Rng + ?Sized>(origin: Vec2, target: Option<Vec2>, params: &FanParams, rng: &mut R) -> Vec<SpawnRequest> {
    let Some(base_deg) = target.and_then(|target| bearing_deg(origin, target)) else {
        return Vec::new();
    };

    fan_angles(base_deg, params.count, params.width_deg)
        .into_iter()
        .map(|ideal| {
            let angle = ideal + angular_error(rng, params.error_deg);
            SpawnRequest::new(origin, angle, params.speed, params.kind)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn ideal_angles_are_symmetric_and_evenly_spaced() {
        let angles = fan_angles(30.0, 5, 60.0);
        assert_eq!(angles.len(), 5);
        for (i, angle) in angles.iter().enumerate() {
            let expected = (i as f32).mul_add(15.0, 0.0);
            assert!((angle - expected).abs() < 1e-4, "angle {i} was {angle}");
        }
        assert!((angles[0] + angles[4] - 2.0 * 30.0).abs() < 1e-4);
        assert!((angles[1] + angles[3] - 2.0 * 30.0).abs() < 1e-4);
    }

    #[test]
    fn single_projectile_fan_points_straight_at_the_target() {
        assert_eq!(fan_angles(45.0, 1, 60.0), vec![45.0]);
        assert!(fan_angles(45.0, 0, 60.0).is_empty());
    }

    #[test]
    fn error_stays_within_the_margin() {
        let mut rng = StdRng::seed_from_u64(11);
        let origin = Vec2::new(100.0, 100.0);
        let target = Vec2::new(200.0, 100.0);
        let params = FanParams::default();

        for _ in 0..50 {
            let shots = fan(origin, Some(target), &params, &mut rng);
            assert_eq!(shots.len(), 5);
            for (shot, ideal) in shots.iter().zip(fan_angles(0.0, 5, 60.0)) {
                assert!((shot.angle_deg - ideal).abs() <= params.error_deg + 1e-4);
                assert_eq!(shot.position, origin);
                assert_eq!(shot.kind, ProjectileKind::Shard);
            }
        }
    }

    #[test]
    fn zero_error_yields_the_ideal_angles() {
        let mut rng = StdRng::seed_from_u64(3);
        let params = FanParams {
            error_deg: 0.0,
            ..FanParams::default()
        };
        let shots = fan(Vec2::ZERO, Some(Vec2::new(0.0, 50.0)), &params, &mut rng);
        for (shot, ideal) in shots.iter().zip(fan_angles(90.0, 5, 60.0)) {
            assert!((shot.angle_deg - ideal).abs() < 1e-3);
        }
    }
}
