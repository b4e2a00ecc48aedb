use rand::Rng;

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::*,
    playfield::{Edge, Playfield},
    pool::{ProjectileKind, SpawnRequest},
};

// ============================================================================
// Vertical Stream
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct StreamParams {
    // Edge the projectiles enter from; they travel straight to the opposite one
    pub edge: Edge,
    pub speed: f32,
    pub spawn_offset: f32,
    pub kind: ProjectileKind,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            edge: Edge::Bottom,
            speed: STREAM_SPEED,
            spawn_offset: STREAM_SPAWN_OFFSET,
            kind: ProjectileKind::Bullet,
        }
    }
}

// One projectile from a random spot just outside `edge`. The pool culls it once it leaves.
pub fn stream<R: Rng + ?Sized>(field: &Playfield, params: &StreamParams, rng: &mut R) -> SpawnRequest {
    let length = params.edge.length(field);
    let along = if length > 0.0 { rng.random_range(0.0..=length) } else { 0.0 };
    let position = params.edge.outside_point(field, along, params.spawn_offset);

    SpawnRequest::new(position, params.edge.inward_angle(), params.speed, params.kind).culled_out_of_bounds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn bottom_stream_rises_from_below_the_playfield() {
        let field = Playfield::default();
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..20 {
            let shot = stream(&field, &StreamParams::default(), &mut rng);
            assert!((shot.position.y - (field.height + 10.0)).abs() < 1e-4);
            assert!((0.0..=field.width).contains(&shot.position.x));
            assert!(shot.velocity().y < 0.0);
            assert!(shot.velocity().x.abs() < 1e-3);
            assert!(shot.cull_out_of_bounds);
        }
    }

    #[test]
    fn top_stream_falls() {
        let field = Playfield::default();
        let mut rng = StdRng::seed_from_u64(4);
        let params = StreamParams {
            edge: Edge::Top,
            ..StreamParams::default()
        };
        let shot = stream(&field, &params, &mut rng);
        assert!(shot.position.y < 0.0);
        assert!(shot.velocity().y > 0.0);
    }
}
