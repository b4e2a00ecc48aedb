use anyhow::Result;
use bevy::prelude::*;
use clap::Parser;
use tokio::time::{self, Instant, MissedTickBehavior};

use arena::{
    build_app,
    components::BossMarker,
    config::{Args, load_definition},
    constants::LOG_FILTER,
    resources::{EncounterStats, EncounterStatus, PoolBudget, ScriptedTarget},
};
use boss::BossActor;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let definition = load_definition(&args.boss)?;

    #[cfg(feature = "json")]
    if args.dump {
        println!("{}", definition.to_json()?);
        return Ok(());
    }

    let mut app = build_app(&args, definition)?;
    app.add_plugins(bevy::log::LogPlugin {
        level: args.log_level,
        filter: LOG_FILTER.to_string(),
        ..default()
    });

    info!(
        "starting {} encounter: {} Hz for {:.1}s (seed {})",
        args.boss, args.tick_hz, args.seconds, args.seed
    );

    // Run the app in a loop manually at tick_hz, or flat out with --fast
    let tick_duration = args.tick_duration();
    let mut interval = time::interval(tick_duration);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut frame: u64 = 0;
    while !app.world().resource::<EncounterStatus>().finished {
        if !args.fast {
            interval.tick().await;
        }

        let update_start = Instant::now();
        app.update();
        let update_elapsed = update_start.elapsed();

        if !args.fast && update_elapsed > tick_duration {
            warn!(
                "tick {} took {:.2}ms (exceeded {:.2}ms budget)",
                frame,
                update_elapsed.as_secs_f64() * 1000.0,
                tick_duration.as_secs_f64() * 1000.0
            );
        }

        frame += 1;
    }

    report(&mut app);
    Ok(())
}

// Final summary of the run
fn report(app: &mut App) {
    let world = app.world_mut();
    let mut boss_query = world.query_filtered::<&BossActor, With<BossMarker>>();
    if let Ok(actor) = boss_query.single(world) {
        info!(
            "{}: {} after {:.2}s of fighting, health {:.0}/{:.0}",
            actor.name(),
            actor.active_phase().unwrap_or("defeated"),
            actor.encounter_time().as_secs_f64(),
            actor.health(),
            actor.max_health()
        );
    }

    let status = world.resource::<EncounterStatus>();
    let stats = world.resource::<EncounterStats>();
    let budget = world.resource::<PoolBudget>();
    let target = world.resource::<ScriptedTarget>();
    if let Some(at) = status.defeated_at {
        info!("boss defeated at {:.2}s", at.as_secs_f64());
    }
    info!(
        "{} frames: {} spawned, {} refused, {} expired, {} culled, {} halted, {} cleared, {} phases entered, peak {} live ({} still live), {} hits on player",
        status.frame,
        stats.spawned,
        stats.refused,
        stats.expired,
        stats.culled,
        stats.halted,
        stats.cleared,
        stats.phases_entered,
        stats.peak_live,
        budget.live,
        target.hits_taken
    );
}
