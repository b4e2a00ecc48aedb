//! Headless arena that runs one boss encounter on a Bevy schedule.
//!
//! The arena owns the clock, the projectile pool and a scripted player; the boss
//! itself comes from the `boss` crate and only sees the time it is handed.

pub mod components;
pub mod config;
pub mod constants;
pub mod pool;
pub mod resources;
pub mod systems;

use anyhow::{Context, Result};
use bevy::{prelude::*, time::TimeUpdateStrategy};
use std::time::Duration;

use crate::{components::BossMarker, config::Args, resources::*, systems::*};
use boss::{BossActor, BossDefinition};

// ============================================================================
// App Setup
// ============================================================================

/// Build the encounter app without any logging plugin.
///
/// Every update advances simulated time by exactly one tick, however long the update
/// took, so a run is reproducible from its arguments and seed.
pub fn build_app(args: &Args, definition: BossDefinition) -> Result<App> {
    let tick = args.tick_duration();
    let actor = BossActor::spawn(definition, args.seed, Duration::ZERO)
        .with_context(|| format!("Failed to spawn boss '{}'", args.boss))?;

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(tick))
        .insert_resource(PoolBudget::new(args.pool_capacity))
        .insert_resource(ScriptedTarget::default())
        .insert_resource(Script {
            dps: args.dps,
            pause: args.pause,
            hide: args.hide,
            overlay: args.overlay,
            target_down: args.target_down,
        })
        .insert_resource(HostState::default())
        .insert_resource(EncounterStatus::new(args.frames()))
        .insert_resource(EncounterStats::default())
        .add_systems(
            Update,
            (
                // Order matters:
                // 1. The host decides where the player is and whether the arena runs
                // 2. The boss fires whatever is due and requests projectiles
                // 3. ApplyDeferred (makes new projectiles queryable)
                // 4. Projectiles move and leave the pool
                // 5. Boss events are reported last, so defeat clears everything spawned this tick
                target_system,
                host_script_system,
                damage_system,
                boss_update_system,
                ApplyDeferred,
                projectiles_system,
                boss_events_system,
                encounter_clock_system,
            )
                .chain(),
        );

    // Long ticks must not be clamped, or the boss clock would fall behind the host's
    app.world_mut()
        .resource_mut::<Time<Virtual>>()
        .set_max_delta(tick.max(Duration::from_millis(250)));
    app.world_mut().spawn((actor, BossMarker));

    Ok(app)
}
