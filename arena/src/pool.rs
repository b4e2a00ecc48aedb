use bevy::prelude::*;
use std::time::Duration;

use crate::{
    components::{Position, Projectile},
    resources::PoolBudget,
};
use boss::{ProjectileHandle, ProjectileKind, ProjectilePool};

// ============================================================================
// ECS Projectile Pool
// ============================================================================

/// Collects the projectiles one boss update asks for.
///
/// Requests are buffered and become entities in [`EcsPool::flush`], after the boss
/// update, so the pool can hand out handles without touching the world.
pub struct EcsPool<'a> {
    budget: &'a mut PoolBudget,
    pending: Vec<(Position, Projectile)>,
    released: Vec<ProjectileHandle>,
    refused: u64,
}

impl<'a> EcsPool<'a> {
    pub const fn new(budget: &'a mut PoolBudget) -> Self {
        Self {
            budget,
            pending: Vec::new(),
            released: Vec::new(),
            refused: 0,
        }
    }

    #[must_use]
    pub const fn refused(&self) -> u64 {
        self.refused
    }

    fn pending_mut(&mut self, handle: ProjectileHandle) -> Option<&mut Projectile> {
        self.pending
            .iter_mut()
            .map(|(_, projectile)| projectile)
            .find(|projectile| projectile.handle == handle)
    }

    // Spawn every buffered projectile. Returns (spawned, handles released after spawning).
    pub fn flush(self, commands: &mut Commands) -> (Vec<ProjectileHandle>, Vec<ProjectileHandle>) {
        let mut spawned = Vec::with_capacity(self.pending.len());
        for (position, projectile) in self.pending {
            spawned.push(projectile.handle);
            commands.spawn((position, projectile));
        }
        (spawned, self.released)
    }
}

impl ProjectilePool for EcsPool<'_> {
    fn acquire(&mut self, position: Vec2, kind: ProjectileKind) -> Option<ProjectileHandle> {
        if self.budget.is_full() {
            self.refused += 1;
            return None;
        }
        let handle = ProjectileHandle(self.budget.next_handle);
        self.budget.next_handle += 1;
        self.budget.live += 1;
        self.pending.push((Position(position), Projectile::new(handle, kind)));
        Some(handle)
    }

    fn release(&mut self, handle: ProjectileHandle) {
        let before = self.pending.len();
        self.pending.retain(|(_, projectile)| projectile.handle != handle);
        if self.pending.len() == before {
            // Already in the world, despawned by the caller of `flush`
            self.released.push(handle);
        } else {
            self.budget.release(1);
        }
    }

    fn set_velocity(&mut self, handle: ProjectileHandle, velocity: Vec2) {
        if let Some(projectile) = self.pending_mut(handle) {
            projectile.velocity = velocity;
        }
    }

    // Nothing is drawn here; the heading already lives in the velocity
    fn set_angle(&mut self, _handle: ProjectileHandle, _degrees: f32) {}

    fn set_lifetime(&mut self, handle: ProjectileHandle, lifetime: Duration) {
        if let Some(projectile) = self.pending_mut(handle) {
            projectile.lifetime = Some(Timer::new(lifetime, TimerMode::Once));
        }
    }

    fn set_halt_after(&mut self, handle: ProjectileHandle, travel: Duration) {
        if let Some(projectile) = self.pending_mut(handle) {
            projectile.halt = Some(Timer::new(travel, TimerMode::Once));
        }
    }

    fn set_cull_out_of_bounds(&mut self, handle: ProjectileHandle, cull: bool) {
        if let Some(projectile) = self.pending_mut(handle) {
            projectile.cull_out_of_bounds = cull;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_budget_refuses_without_failing() {
        let mut budget = PoolBudget::new(2);
        let mut pool = EcsPool::new(&mut budget);

        assert!(pool.acquire(Vec2::ZERO, ProjectileKind::Bullet).is_some());
        assert!(pool.acquire(Vec2::ZERO, ProjectileKind::Bullet).is_some());
        assert!(pool.acquire(Vec2::ZERO, ProjectileKind::Bullet).is_none());
        assert_eq!(pool.refused(), 1);
    }

    #[test]
    fn releasing_a_buffered_projectile_frees_its_slot() {
        let mut budget = PoolBudget::new(1);
        let mut pool = EcsPool::new(&mut budget);

        let Some(handle) = pool.acquire(Vec2::ZERO, ProjectileKind::Spike) else {
            panic!("empty pool refused");
        };
        pool.release(handle);
        assert!(pool.acquire(Vec2::ZERO, ProjectileKind::Spike).is_some());
    }

    #[test]
    fn setters_reach_the_buffered_projectile() {
        let mut budget = PoolBudget::new(4);
        let mut pool = EcsPool::new(&mut budget);
        let Some(handle) = pool.acquire(Vec2::new(1.0, 2.0), ProjectileKind::Shard) else {
            panic!("empty pool refused");
        };
        pool.set_velocity(handle, Vec2::new(0.0, 300.0));
        pool.set_lifetime(handle, Duration::from_millis(3000));
        pool.set_cull_out_of_bounds(handle, true);

        let Some(projectile) = pool.pending_mut(handle) else {
            panic!("projectile vanished");
        };
        assert_eq!(projectile.velocity, Vec2::new(0.0, 300.0));
        assert!(projectile.lifetime.is_some());
        assert!(projectile.cull_out_of_bounds);
    }
}
