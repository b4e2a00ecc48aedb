use bevy_math::Vec2;
use std::{collections::VecDeque, time::Duration};

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Projectile Kinds
// ============================================================================

// Which pool a projectile comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum ProjectileKind {
    Bullet,
    Shard,
    Spike,
    Main,
    Special,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProjectileHandle(pub u64);

// ============================================================================
// Spawn Requests
// ============================================================================

/// A projectile one pattern invocation wants in the world.
///
/// The core keeps nothing once the request has been handed to the pool: expiry,
/// halting and culling are carried out by the pool from the fields below.
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnRequest {
    pub position: Vec2,
    pub angle_deg: f32,
    pub speed: f32,
    pub kind: ProjectileKind,
    // Released by the pool after this long
    pub lifetime: Option<Duration>,
    // Velocity drops to zero and the projectile locks in place after this long
    pub halt_after: Option<Duration>,
    // Released by the pool once it leaves the arena
    pub cull_out_of_bounds: bool,
}

impl SpawnRequest {
    #[must_use]
    pub const fn new(position: Vec2, angle_deg: f32, speed: f32, kind: ProjectileKind) -> Self {
        Self {
            position,
            angle_deg,
            speed,
            kind,
            lifetime: None,
            halt_after: None,
            cull_out_of_bounds: false,
        }
    }

    #[must_use]
    pub const fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    #[must_use]
    pub const fn with_halt_after(mut self, halt_after: Duration) -> Self {
        self.halt_after = Some(halt_after);
        self
    }

    #[must_use]
    pub const fn culled_out_of_bounds(mut self) -> Self {
        self.cull_out_of_bounds = true;
        self
    }

    // Velocity vector for `speed` along `angle_deg` (0° = +x, 90° = +y, screen coordinates)
    #[must_use]
    pub fn velocity(&self) -> Vec2 {
        Vec2::from_angle(self.angle_deg.to_radians()) * self.speed
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// The engine-side projectile pool.
pub trait ProjectilePool {
    // None when the pool is exhausted; callers skip the projectile
    fn acquire(&mut self, position: Vec2, kind: ProjectileKind) -> Option<ProjectileHandle>;
    fn release(&mut self, handle: ProjectileHandle);
    fn set_velocity(&mut self, handle: ProjectileHandle, velocity: Vec2);
    fn set_angle(&mut self, handle: ProjectileHandle, degrees: f32);
    fn set_lifetime(&mut self, handle: ProjectileHandle, lifetime: Duration);
    fn set_halt_after(&mut self, handle: ProjectileHandle, travel: Duration);
    fn set_cull_out_of_bounds(&mut self, handle: ProjectileHandle, cull: bool);
}

/// Where the boss aims. `None` while there is nothing to aim at (e.g. the player is down).
pub trait AimTarget {
    fn current_target(&self) -> Option<Vec2>;
}

impl AimTarget for Option<Vec2> {
    fn current_target(&self) -> Option<Vec2> {
        *self
    }
}

impl AimTarget for Vec2 {
    fn current_target(&self) -> Option<Vec2> {
        Some(*self)
    }
}

// Hand one request to the pool. An exhausted pool is not an error.
pub fn fire(pool: &mut dyn ProjectilePool, request: &SpawnRequest) -> Option<ProjectileHandle> {
    let handle = pool.acquire(request.position, request.kind)?;
    pool.set_angle(handle, request.angle_deg);
    pool.set_velocity(handle, request.velocity());
    if let Some(lifetime) = request.lifetime {
        pool.set_lifetime(handle, lifetime);
    }
    if let Some(halt_after) = request.halt_after {
        pool.set_halt_after(handle, halt_after);
    }
    if request.cull_out_of_bounds {
        pool.set_cull_out_of_bounds(handle, true);
    }
    Some(handle)
}

// Fire every request in order; returns how many the pool accepted.
pub fn fire_all(pool: &mut dyn ProjectilePool, requests: &[SpawnRequest]) -> usize {
    requests.iter().filter_map(|request| fire(pool, request)).count()
}

// ============================================================================
// Recording Pool
// ============================================================================

// A projectile as seen by `RecordingPool`
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedProjectile {
    pub handle: ProjectileHandle,
    pub position: Vec2,
    pub kind: ProjectileKind,
    pub velocity: Vec2,
    pub angle_deg: f32,
    pub lifetime: Option<Duration>,
    pub halt_after: Option<Duration>,
    pub cull_out_of_bounds: bool,
    pub released: bool,
}

/// In-memory pool that records every request, with an optional capacity.
///
/// Useful for headless runs and tests; `refuse_next` simulates exhaustion for
/// individual acquisitions.
#[derive(Debug, Default)]
pub struct RecordingPool {
    pub projectiles: Vec<RecordedProjectile>,
    pub capacity: Option<usize>,
    pub refused: usize,
    refuse_queue: VecDeque<bool>,
}

impl RecordingPool {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    // Script the outcome of upcoming acquisitions: `true` refuses that one.
    pub fn refuse_next(&mut self, pattern: &[bool]) {
        self.refuse_queue.extend(pattern.iter().copied());
    }

    #[must_use]
    pub fn live(&self) -> usize {
        self.projectiles.iter().filter(|projectile| !projectile.released).count()
    }

    fn get_mut(&mut self, handle: ProjectileHandle) -> Option<&mut RecordedProjectile> {
        self.projectiles.iter_mut().find(|projectile| projectile.handle == handle)
    }
}

impl ProjectilePool for RecordingPool {
    fn acquire(&mut self, position: Vec2, kind: ProjectileKind) -> Option<ProjectileHandle> {
        let scripted_refusal = self.refuse_queue.pop_front().unwrap_or(false);
        let full = self.capacity.is_some_and(|capacity| self.live() >= capacity);
        if scripted_refusal || full {
            self.refused += 1;
            return None;
        }

        let handle = ProjectileHandle(self.projectiles.len() as u64);
        self.projectiles.push(RecordedProjectile {
            handle,
            position,
            kind,
            velocity: Vec2::ZERO,
            angle_deg: 0.0,
            lifetime: None,
            halt_after: None,
            cull_out_of_bounds: false,
            released: false,
        });
        Some(handle)
    }

    fn release(&mut self, handle: ProjectileHandle) {
        if let Some(projectile) = self.get_mut(handle) {
            projectile.released = true;
        }
    }

    fn set_velocity(&mut self, handle: ProjectileHandle, velocity: Vec2) {
        if let Some(projectile) = self.get_mut(handle) {
            projectile.velocity = velocity;
        }
    }

    fn set_angle(&mut self, handle: ProjectileHandle, degrees: f32) {
        if let Some(projectile) = self.get_mut(handle) {
            projectile.angle_deg = degrees;
        }
    }

    fn set_lifetime(&mut self, handle: ProjectileHandle, lifetime: Duration) {
        if let Some(projectile) = self.get_mut(handle) {
            projectile.lifetime = Some(lifetime);
        }
    }

    fn set_halt_after(&mut self, handle: ProjectileHandle, travel: Duration) {
        if let Some(projectile) = self.get_mut(handle) {
            projectile.halt_after = Some(travel);
        }
    }

    fn set_cull_out_of_bounds(&mut self, handle: ProjectileHandle, cull: bool) {
        if let Some(projectile) = self.get_mut(handle) {
            projectile.cull_out_of_bounds = cull;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_applies_every_request_field() {
        let mut pool = RecordingPool::new();
        let request = SpawnRequest::new(Vec2::new(10.0, 20.0), 90.0, 100.0, ProjectileKind::Spike)
            .with_halt_after(Duration::from_millis(50))
            .culled_out_of_bounds();

        let handle = fire(&mut pool, &request);
        assert_eq!(handle, Some(ProjectileHandle(0)));

        let projectile = &pool.projectiles[0];
        assert_eq!(projectile.kind, ProjectileKind::Spike);
        assert!((projectile.velocity - Vec2::new(0.0, 100.0)).length() < 1e-3);
        assert_eq!(projectile.halt_after, Some(Duration::from_millis(50)));
        assert!(projectile.cull_out_of_bounds);
        assert_eq!(projectile.lifetime, None);
    }

    #[test]
    fn exhausted_pool_skips_only_the_refused_requests() {
        let mut pool = RecordingPool::new();
        pool.refuse_next(&[false, true, false]);
        let request = SpawnRequest::new(Vec2::ZERO, 0.0, 1.0, ProjectileKind::Bullet);

        assert_eq!(fire_all(&mut pool, &[request.clone(), request.clone(), request]), 2);
        assert_eq!(pool.refused, 1);
    }

    #[test]
    fn capacity_counts_live_projectiles() {
        let mut pool = RecordingPool::with_capacity(1);
        let first = pool.acquire(Vec2::ZERO, ProjectileKind::Main);
        assert!(first.is_some());
        assert!(pool.acquire(Vec2::ZERO, ProjectileKind::Main).is_none());

        if let Some(handle) = first {
            pool.release(handle);
        }
        assert!(pool.acquire(Vec2::ZERO, ProjectileKind::Main).is_some());
    }
}
