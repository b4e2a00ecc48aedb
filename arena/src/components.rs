use bevy::prelude::*;

use boss::{ProjectileHandle, ProjectileKind};

// ============================================================================
// Bevy Components
// ============================================================================

// Position in playfield pixels, origin top-left, +y down
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec2);

// A live boss projectile. Expiry, halting and culling are all handled here, not by the boss.
#[derive(Component, Debug)]
pub struct Projectile {
    pub handle: ProjectileHandle,
    pub kind: ProjectileKind,
    pub velocity: Vec2,
    pub lifetime: Option<Timer>,
    // Velocity drops to zero once this finishes
    pub halt: Option<Timer>,
    pub cull_out_of_bounds: bool,
}

impl Projectile {
    #[must_use]
    pub const fn new(handle: ProjectileHandle, kind: ProjectileKind) -> Self {
        Self {
            handle,
            kind,
            velocity: Vec2::ZERO,
            lifetime: None,
            halt: None,
            cull_out_of_bounds: false,
        }
    }
}

// Marker component: the boss entity
#[derive(Component)]
pub struct BossMarker;
