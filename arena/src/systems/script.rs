use bevy::prelude::*;

use crate::{
    components::BossMarker,
    config::Window,
    constants::*,
    resources::{HostState, Script, ScriptedTarget},
};
use boss::BossActor;

// ============================================================================
// Scripted Target System
// ============================================================================

// Move the aim target around its orbit, or take it away while the player is down.
pub fn target_system(time: Res<Time>, script: Res<Script>, mut target: ResMut<ScriptedTarget>) {
    let now = time.elapsed();
    if script.target_down.is_some_and(|window| window.contains(now)) {
        target.position = None;
        return;
    }

    let angle = time.elapsed_secs() * TARGET_ORBIT_SPEED;
    let center = Vec2::new(TARGET_ORBIT_CENTER_X, TARGET_ORBIT_CENTER_Y);
    target.position = Some(center + Vec2::from_angle(angle) * TARGET_ORBIT_RADIUS);
}

// ============================================================================
// Host Script System
// ============================================================================

// Apply the scripted pause, hide and overlay windows to the boss, on their edges only.
pub fn host_script_system(
    time: Res<Time>,
    script: Res<Script>,
    mut host: ResMut<HostState>,
    mut boss_query: Query<&mut BossActor, With<BossMarker>>,
) {
    let now = time.elapsed();
    let inside = |window: Option<Window>| window.is_some_and(|window| window.contains(now));
    let paused = inside(script.pause);
    let hidden = inside(script.hide);
    let overlay = inside(script.overlay);

    let Ok(mut actor) = boss_query.single_mut() else {
        return;
    };

    if paused != host.paused {
        host.paused = paused;
        if paused {
            actor.on_host_pause();
        } else {
            actor.on_host_resume();
        }
    }
    if hidden != host.hidden {
        host.hidden = hidden;
        actor.on_visibility_change(!hidden);
    }
    if overlay != host.overlay {
        host.overlay = overlay;
        actor.on_overlay(overlay);
    }
}

// ============================================================================
// Damage System
// ============================================================================

// The scripted player deals a steady stream of damage while it is up and the arena runs.
pub fn damage_system(
    time: Res<Time>,
    script: Res<Script>,
    host: Res<HostState>,
    target: Res<ScriptedTarget>,
    mut boss_query: Query<&mut BossActor, With<BossMarker>>,
) {
    if script.dps <= 0.0 || host.frozen() || target.position.is_none() {
        return;
    }
    let Ok(mut actor) = boss_query.single_mut() else {
        return;
    };
    let amount = script.dps * time.delta_secs();
    if amount > 0.0 {
        actor.take_damage(amount);
    }
}
