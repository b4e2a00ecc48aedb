use bevy::prelude::*;

use crate::{
    components::{BossMarker, Projectile},
    pool::EcsPool,
    resources::{EncounterStats, PoolBudget, ScriptedTarget},
};
use boss::BossActor;

// ============================================================================
// Boss Update System
// ============================================================================

// Run the boss up to the current time and turn its spawn requests into entities.
pub fn boss_update_system(
    mut commands: Commands,
    time: Res<Time>,
    target: Res<ScriptedTarget>,
    mut budget: ResMut<PoolBudget>,
    mut stats: ResMut<EncounterStats>,
    mut boss_query: Query<&mut BossActor, With<BossMarker>>,
    projectile_query: Query<(Entity, &Projectile)>,
) {
    let Ok(mut actor) = boss_query.single_mut() else {
        return;
    };

    let mut pool = EcsPool::new(&mut budget);
    actor.update(time.delta(), time.elapsed(), &mut pool, &target.position);
    let refused = pool.refused();
    let (spawned, released) = pool.flush(&mut commands);

    if !released.is_empty() {
        for (entity, projectile) in &projectile_query {
            if released.contains(&projectile.handle) {
                commands.entity(entity).despawn();
                budget.release(1);
            }
        }
    }

    stats.spawned += spawned.len() as u64;
    stats.refused += refused;
    stats.peak_live = stats.peak_live.max(budget.live);
    if refused > 0 {
        debug!("{}: pool full, {} projectiles declined", actor.name(), refused);
    }
}
