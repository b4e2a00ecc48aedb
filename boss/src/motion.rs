use bevy_math::Vec2;
use rand::Rng;
use std::time::Duration;

use crate::{
    actions::Motion,
    constants::GEOMETRY_EPSILON,
    playfield::{Playfield, travel_time},
};

// ============================================================================
// Kinematics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Kinematics {
    pub position: Vec2,
    pub velocity: Vec2, // pixels per second
    pub angle_deg: f32,
    pub spin_deg_per_sec: f32,
}

impl Kinematics {
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            angle_deg: 0.0,
            spin_deg_per_sec: 0.0,
        }
    }
}

// A pending `MoveTo` arrival: where to snap and after how long
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrival {
    pub at: Vec2,
    pub after: Duration,
}

// ============================================================================
// Motion
// ============================================================================

// Switch the body over to `motion`. For `MoveTo` the caller must schedule the returned arrival.
pub fn start_motion<R: Rng + ?Sized>(
    body: &mut Kinematics,
    motion: Motion,
    target: Option<Vec2>,
    rng: &mut R,
) -> Option<Arrival> {
    match motion {
        Motion::Stop => body.velocity = Vec2::ZERO,
        Motion::Drift { vx, vy } => body.velocity = Vec2::new(vx, vy),
        Motion::MoveTo { x, y, speed } => {
            let destination = Vec2::new(x, y);
            let offset = destination - body.position;
            body.velocity = Vec2::ZERO;
            if offset.length() <= GEOMETRY_EPSILON {
                body.position = destination;
                return None;
            }
            // No speed to get there with
            let after = travel_time(offset.length(), speed)?;
            body.velocity = offset.normalize_or_zero() * speed.abs();
            return Some(Arrival { at: destination, after });
        }
        Motion::Bounce { speed } => {
            let speed = speed.abs();
            body.velocity = if speed > 0.0 {
                Vec2::new(rng.random_range(-speed..=speed), rng.random_range(-speed..=speed))
            } else {
                Vec2::ZERO
            };
        }
        Motion::Chase { speed } => body.velocity = chase_velocity(body.position, target, speed),
    }
    None
}

// Advance the body by `dt` under `motion`. `flair_spin` is added to the body's own spin.
pub fn integrate(
    body: &mut Kinematics,
    motion: Motion,
    target: Option<Vec2>,
    field: &Playfield,
    flair_spin: f32,
    dt: Duration,
) {
    let secs = dt.as_secs_f32();

    if let Motion::Chase { speed } = motion {
        body.velocity = chase_velocity(body.position, target, speed);
    }

    body.position += body.velocity * secs;
    if matches!(motion, Motion::Bounce { .. }) {
        field.bounce(&mut body.position, &mut body.velocity);
    }

    body.angle_deg = (body.angle_deg + (body.spin_deg_per_sec + flair_spin) * secs).rem_euclid(360.0);
}

// Straight at the target, or standing still without one
fn chase_velocity(from: Vec2, target: Option<Vec2>, speed: f32) -> Vec2 {
    let Some(target) = target else {
        return Vec2::ZERO;
    };
    let offset = target - from;
    if offset.length() <= GEOMETRY_EPSILON {
        return Vec2::ZERO;
    }
    offset.normalize() * speed.abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn move_to_reports_the_exact_travel_time() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut body = Kinematics::at(Vec2::new(600.0, -100.0));
        let arrival = start_motion(
            &mut body,
            Motion::MoveTo {
                x: 600.0,
                y: 100.0,
                speed: 100.0,
            },
            None,
            &mut rng,
        );
        assert_eq!(
            arrival,
            Some(Arrival {
                at: Vec2::new(600.0, 100.0),
                after: ms(2000)
            })
        );
        assert!((body.velocity - Vec2::new(0.0, 100.0)).length() < 1e-4);
    }

    #[test]
    fn move_to_the_current_position_needs_no_arrival() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut body = Kinematics::at(Vec2::new(10.0, 10.0));
        body.velocity = Vec2::X;
        let arrival = start_motion(
            &mut body,
            Motion::MoveTo {
                x: 10.0,
                y: 10.0,
                speed: 100.0,
            },
            None,
            &mut rng,
        );
        assert_eq!(arrival, None);
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn bounce_stays_inside_the_playfield() {
        let field = Playfield::default();
        let mut rng = StdRng::seed_from_u64(5);
        let mut body = Kinematics::at(field.center());
        let motion = Motion::Bounce { speed: 400.0 };
        start_motion(&mut body, motion, None, &mut rng);

        for _ in 0..2000 {
            integrate(&mut body, motion, None, &field, 0.0, ms(16));
            assert!(field.contains(body.position, 0.0), "escaped to {:?}", body.position);
        }
    }

    #[test]
    fn chase_follows_the_target_and_idles_without_one() {
        let field = Playfield::default();
        let mut body = Kinematics::at(Vec2::ZERO);
        let motion = Motion::Chase { speed: 100.0 };

        integrate(&mut body, motion, Some(Vec2::new(100.0, 0.0)), &field, 0.0, ms(500));
        assert!((body.position - Vec2::new(50.0, 0.0)).length() < 1e-3);

        integrate(&mut body, motion, None, &field, 0.0, ms(500));
        assert!((body.position - Vec2::new(50.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn spin_and_flair_add_up() {
        let field = Playfield::default();
        let mut body = Kinematics::at(Vec2::ZERO);
        body.spin_deg_per_sec = 60.0;
        integrate(&mut body, Motion::Stop, None, &field, 90.0, ms(1000));
        assert!((body.angle_deg - 150.0).abs() < 1e-3);

        integrate(&mut body, Motion::Stop, None, &field, 90.0, ms(2000));
        assert!((body.angle_deg - 90.0).abs() < 1e-2);
    }
}
