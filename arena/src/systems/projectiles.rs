use bevy::prelude::*;

use crate::{
    components::{BossMarker, Position, Projectile},
    constants::*,
    resources::{EncounterStats, HostState, PoolBudget, ScriptedTarget},
};
use boss::{BossActor, Playfield};

// ============================================================================
// Projectiles System
// ============================================================================

// Move projectiles, then halt, expire, cull or land them. Everything stands still while
// the host has the arena frozen.
pub fn projectiles_system(
    mut commands: Commands,
    time: Res<Time>,
    host: Res<HostState>,
    mut budget: ResMut<PoolBudget>,
    mut stats: ResMut<EncounterStats>,
    mut target: ResMut<ScriptedTarget>,
    boss_query: Query<&BossActor, With<BossMarker>>,
    mut projectile_query: Query<(Entity, &mut Position, &mut Projectile)>,
) {
    if host.frozen() {
        return;
    }
    let delta_seconds = time.delta_secs();
    let frame_time = time.delta();
    let field = boss_query
        .single()
        .map_or_else(|_| Playfield::default(), |actor| *actor.playfield());

    for (entity, mut pos, mut projectile) in &mut projectile_query {
        pos.0 += projectile.velocity * delta_seconds;

        if let Some(halt) = projectile.halt.as_mut() {
            halt.tick(frame_time);
            if halt.is_finished() {
                projectile.velocity = Vec2::ZERO;
                projectile.halt = None;
                stats.halted += 1;
            }
        }

        let expired = projectile.lifetime.as_mut().is_some_and(|lifetime| {
            lifetime.tick(frame_time);
            lifetime.is_finished()
        });
        if expired {
            stats.expired += 1;
        } else if !field.contains(pos.0, if projectile.cull_out_of_bounds { CULL_MARGIN } else { WORLD_MARGIN }) {
            stats.culled += 1;
        } else if let Some(player) = target.position
            && pos.0.distance(player) <= TARGET_HIT_RADIUS
        {
            target.hits_taken += 1;
            trace!("{:?} {:?} hit the player", projectile.kind, projectile.handle);
        } else {
            continue;
        }

        commands.entity(entity).despawn();
        budget.release(1);
    }
}
