//! Bullet patterns.
//!
//! Every pattern is a plain function of the boss position, the aim target and its
//! parameters, returning the projectiles to spawn for one invocation. Patterns that
//! aim return nothing while there is no target. The wall volley is the exception:
//! it is released edge by edge and shot by shot, so the actor schedules it through
//! [`wall::wall_positions`] and [`wall::wall_shot`] instead of [`Pattern::emit`].

pub mod fan;
pub mod flurry;
pub mod radial;
pub mod shots;
pub mod stream;
pub mod wall;

use bevy_math::Vec2;
use rand::Rng;

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::{playfield::Playfield, pool::SpawnRequest};

pub use fan::FanParams;
pub use flurry::FlurryParams;
pub use radial::{RadialDirection, RadialParams};
pub use shots::{AimedParams, StraightParams};
pub use stream::StreamParams;
pub use wall::WallParams;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "type", rename_all = "snake_case"))]
pub enum Pattern {
    Fan(FanParams),
    Flurry(FlurryParams),
    WallVolley(WallParams),
    Radial(RadialParams),
    Stream(StreamParams),
    Aimed(AimedParams),
    Straight(StraightParams),
}

impl Pattern {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Fan(_) => "fan",
            Self::Flurry(_) => "flurry",
            Self::WallVolley(_) => "wall_volley",
            Self::Radial(_) => "radial",
            Self::Stream(_) => "stream",
            Self::Aimed(_) => "aimed",
            Self::Straight(_) => "straight",
        }
    }

    // Projectiles for one invocation. The wall volley yields nothing here.
    pub fn emit<R: Rng + ?Sized>(
        &self,
        origin: Vec2,
        target: Option<Vec2>,
        field: &Playfield,
        rng: &mut R,
    ) -> Vec<SpawnRequest> {
        match self {
            Self::Fan(params) => fan::fan(origin, target, params, rng),
            Self::Flurry(params) => flurry::flurry(origin, target, params, rng).into_iter().collect(),
            Self::WallVolley(_) => Vec::new(),
            Self::Radial(params) => radial::radial(field, params, rng),
            Self::Stream(params) => vec![stream::stream(field, params, rng)],
            Self::Aimed(params) => shots::aimed(origin, target, params).into_iter().collect(),
            Self::Straight(params) => vec![shots::straight(origin, params)],
        }
    }
}

// Uniform error in [-margin, +margin] degrees
fn angular_error<R: Rng + ?Sized>(rng: &mut R, margin_deg: f32) -> f32 {
    let margin = margin_deg.abs();
    if margin == 0.0 {
        return 0.0;
    }
    rng.random_range(-margin..=margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn every_aiming_pattern_is_silent_without_a_target() {
        let field = Playfield::default();
        let mut rng = StdRng::seed_from_u64(1);
        let origin = Vec2::new(600.0, 100.0);

        for pattern in [
            Pattern::Fan(FanParams::default()),
            Pattern::Flurry(FlurryParams::default()),
            Pattern::Aimed(AimedParams::default()),
        ] {
            assert!(
                pattern.emit(origin, None, &field, &mut rng).is_empty(),
                "{} fired without a target",
                pattern.name()
            );
        }
    }

    #[test]
    fn untargeted_patterns_fire_without_a_target() {
        let field = Playfield::default();
        let mut rng = StdRng::seed_from_u64(2);
        let origin = field.center();

        assert_eq!(Pattern::Straight(StraightParams::default()).emit(origin, None, &field, &mut rng).len(), 1);
        assert_eq!(Pattern::Stream(StreamParams::default()).emit(origin, None, &field, &mut rng).len(), 1);
        assert!(!Pattern::Radial(RadialParams::default()).emit(origin, None, &field, &mut rng).is_empty());
        assert!(Pattern::WallVolley(WallParams::default()).emit(origin, None, &field, &mut rng).is_empty());
    }
}
