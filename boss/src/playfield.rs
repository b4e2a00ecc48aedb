use bevy_math::Vec2;
use rand::Rng;
use std::time::Duration;

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::constants::*;

// ============================================================================
// Playfield
// ============================================================================

// Screen-space rectangle the fight happens in: origin top-left, +y down.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
        }
    }
}

impl Playfield {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    // True if `pos` lies inside the rectangle grown by `margin` on every side
    #[must_use]
    pub fn contains(&self, pos: Vec2, margin: f32) -> bool {
        pos.x >= -margin && pos.x <= self.width + margin && pos.y >= -margin && pos.y <= self.height + margin
    }

    #[must_use]
    pub fn perimeter(&self) -> f32 {
        2.0 * (self.width + self.height)
    }

    // Uniformly random point on the boundary, walking clockwise from the top-left corner
    pub fn random_boundary_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let perimeter = self.perimeter();
        if perimeter <= GEOMETRY_EPSILON {
            return Vec2::ZERO;
        }
        let mut t = rng.random_range(0.0..perimeter);

        if t < self.width {
            return Vec2::new(t, 0.0);
        }
        t -= self.width;
        if t < self.height {
            return Vec2::new(self.width, t);
        }
        t -= self.height;
        if t < self.width {
            return Vec2::new(self.width - t, self.height);
        }
        t -= self.width;
        Vec2::new(0.0, (self.height - t).max(0.0))
    }

    // Reflect `velocity` off any edge `pos` has crossed and pull `pos` back inside.
    // Returns true if a bounce happened.
    pub fn bounce(&self, pos: &mut Vec2, velocity: &mut Vec2) -> bool {
        let mut bounced = false;
        if pos.x < 0.0 || pos.x > self.width {
            pos.x = pos.x.clamp(0.0, self.width);
            velocity.x = -velocity.x;
            bounced = true;
        }
        if pos.y < 0.0 || pos.y > self.height {
            pos.y = pos.y.clamp(0.0, self.height);
            velocity.y = -velocity.y;
            bounced = true;
        }
        bounced
    }
}

// ============================================================================
// Edges
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    // Release order of a wall volley
    pub const CLOCKWISE: [Self; 4] = [Self::Top, Self::Right, Self::Bottom, Self::Left];

    // Heading (degrees) of something launched from this edge into the playfield
    #[must_use]
    pub const fn inward_angle(self) -> f32 {
        match self {
            Self::Top => 90.0,
            Self::Right => 180.0,
            Self::Bottom => -90.0,
            Self::Left => 0.0,
        }
    }

    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    // Length of this edge on `field`
    #[must_use]
    pub const fn length(self, field: &Playfield) -> f32 {
        if self.is_horizontal() { field.width } else { field.height }
    }

    // Point `offset` pixels outside this edge, `along` pixels from its low-coordinate end
    #[must_use]
    pub fn outside_point(self, field: &Playfield, along: f32, offset: f32) -> Vec2 {
        match self {
            Self::Top => Vec2::new(along, -offset),
            Self::Bottom => Vec2::new(along, field.height + offset),
            Self::Left => Vec2::new(-offset, along),
            Self::Right => Vec2::new(field.width + offset, along),
        }
    }
}

// Heading in degrees from `from` to `to`, or None if the points coincide
#[must_use]
pub fn bearing_deg(from: Vec2, to: Vec2) -> Option<f32> {
    let delta = to - from;
    if delta.length_squared() <= GEOMETRY_EPSILON * GEOMETRY_EPSILON {
        return None;
    }
    Some(delta.y.atan2(delta.x).to_degrees())
}

// Time to cover `distance` at `speed` px/s, to the microsecond. None for a stationary projectile.
#[must_use]
pub fn travel_time(distance: f32, speed: f32) -> Option<Duration> {
    if speed <= GEOMETRY_EPSILON {
        return None;
    }
    let micros = (f64::from(distance.max(0.0)) / f64::from(speed) * 1_000_000.0).round();
    Some(Duration::from_micros(micros as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn boundary_points_lie_on_an_edge() {
        let field = Playfield::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let point = field.random_boundary_point(&mut rng);
            let on_vertical = point.x.abs() < 1e-3 || (point.x - field.width).abs() < 1e-3;
            let on_horizontal = point.y.abs() < 1e-3 || (point.y - field.height).abs() < 1e-3;
            assert!(on_vertical || on_horizontal, "{point:?} is not on the boundary");
            assert!(field.contains(point, 1e-3));
        }
    }

    #[test]
    fn bounce_reflects_and_clamps() {
        let field = Playfield::new(100.0, 100.0);
        let mut pos = Vec2::new(105.0, 50.0);
        let mut velocity = Vec2::new(30.0, -10.0);
        assert!(field.bounce(&mut pos, &mut velocity));
        assert_eq!(pos, Vec2::new(100.0, 50.0));
        assert_eq!(velocity, Vec2::new(-30.0, -10.0));
    }

    #[test]
    fn bearing_is_none_for_coincident_points() {
        assert_eq!(bearing_deg(Vec2::ONE, Vec2::ONE), None);
        let down = bearing_deg(Vec2::ZERO, Vec2::new(0.0, 10.0)).unwrap_or_default();
        assert!((down - 90.0).abs() < 1e-4);
    }

    #[test]
    fn travel_time_is_exact_to_the_microsecond() {
        assert_eq!(travel_time(10.0, 200.0), Some(Duration::from_millis(50)));
        assert_eq!(travel_time(250.0, 250.0), Some(Duration::from_secs(1)));
        assert_eq!(travel_time(10.0, 0.0), None);
    }
}
