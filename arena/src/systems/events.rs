use bevy::prelude::*;
use std::time::Duration;

use crate::{
    components::{BossMarker, Projectile},
    constants::*,
    resources::{EncounterStats, EncounterStatus, PoolBudget, ScriptedTarget},
};
use boss::{BossActor, BossEvent};

// ============================================================================
// Boss Events System
// ============================================================================

// Log what the boss reported this tick. Defeat clears the arena and ends the encounter.
pub fn boss_events_system(
    mut commands: Commands,
    mut boss_query: Query<&mut BossActor, With<BossMarker>>,
    projectile_query: Query<Entity, With<Projectile>>,
    mut budget: ResMut<PoolBudget>,
    mut status: ResMut<EncounterStatus>,
    mut stats: ResMut<EncounterStats>,
) {
    let Ok(mut actor) = boss_query.single_mut() else {
        return;
    };

    for event in actor.drain_events() {
        match event {
            BossEvent::PhaseEntered { phase, name, at } => {
                stats.phases_entered += 1;
                info!("{:>8.2}s  phase {} ({}) entered", at.as_secs_f64(), phase, name);
            }
            BossEvent::PhaseExited { name, at, .. } => {
                debug!("{:>8.2}s  phase {} exited", at.as_secs_f64(), name);
            }
            BossEvent::Paused { source, at } => {
                info!("{:>8.2}s  paused by {:?}", at.as_secs_f64(), source);
            }
            BossEvent::Resumed { source, at } => {
                info!("{:>8.2}s  resumed by {:?}", at.as_secs_f64(), source);
            }
            BossEvent::Damaged { amount, health } => {
                trace!("took {:.2} damage, {:.1} left", amount, health);
            }
            BossEvent::Defeated { at } => {
                let mut cleared = 0;
                for entity in &projectile_query {
                    commands.entity(entity).despawn();
                    cleared += 1;
                }
                budget.release(cleared);
                stats.cleared += cleared as u64;
                status.defeated_at = Some(at);
                status.finished = true;
                info!(
                    "{:>8.2}s  {} defeated, {} projectiles cleared",
                    at.as_secs_f64(),
                    actor.name(),
                    cleared
                );
            }
        }
    }
}

// ============================================================================
// Encounter Clock System
// ============================================================================

// Count frames, report progress periodically and end the run after the last frame.
pub fn encounter_clock_system(
    time: Res<Time>,
    budget: Res<PoolBudget>,
    target: Res<ScriptedTarget>,
    stats: Res<EncounterStats>,
    mut status: ResMut<EncounterStatus>,
    boss_query: Query<&BossActor, With<BossMarker>>,
) {
    status.frame += 1;

    if time.elapsed() >= status.next_report {
        status.next_report += Duration::from_secs(REPORT_INTERVAL_SECS);
        if let Ok(actor) = boss_query.single() {
            info!(
                "{:>8.2}s  {} in {} | health {:.0}/{:.0} | {} live projectiles ({} spawned, {} refused) | {} hits on player",
                time.elapsed_secs_f64(),
                actor.name(),
                actor.active_phase().unwrap_or("-"),
                actor.health(),
                actor.max_health(),
                budget.live,
                stats.spawned,
                stats.refused,
                target.hits_taken
            );
        }
    }

    if status.frame >= status.max_frames {
        status.finished = true;
    }
}
