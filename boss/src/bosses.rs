use anyhow::{Result, bail};

use crate::{
    actions::{Cadence, EmitterSpec, Motion, PhaseAction},
    constants::*,
    definition::{BossDefinition, HealthTrigger},
    patterns::{
        AimedParams, FanParams, FlurryParams, Pattern, RadialDirection, RadialParams, StraightParams, StreamParams,
        WallParams,
    },
    phase::{BranchRule, Phase},
    playfield::Playfield,
    pool::ProjectileKind,
};

// ============================================================================
// Built-in Bosses
// ============================================================================

pub const BUILTIN_BOSSES: [&str; 2] = ["star", "trinity"];

pub fn builtin(name: &str) -> Result<BossDefinition> {
    match name {
        "star" => Ok(star()),
        "trinity" => Ok(trinity()),
        _ => bail!("Unknown boss '{}' (built-in bosses: {})", name, BUILTIN_BOSSES.join(", ")),
    }
}

// Phase indices of the star table
pub mod star_phase {
    use crate::phase::PhaseId;

    pub const START: PhaseId = 0;
    pub const FAN: PhaseId = 1;
    pub const WALL: PhaseId = 2;
    pub const FLURRY: PhaseId = 3;
    pub const STREAM: PhaseId = 4;
    pub const BOUNCE: PhaseId = 5;
    pub const CHASE: PhaseId = 6;
    pub const SHOOT: PhaseId = 7;
    pub const ENRAGE: PhaseId = 8;
}

fn set_motion(motion: Motion) -> PhaseAction {
    PhaseAction::SetMotion { motion }
}

// Glides on stage, then cycles through its attacks twice before locking into an
// endless radial barrage. Dropping low on health skips straight to the barrage.
#[must_use]
pub fn star() -> BossDefinition {
    let phases = vec![
        Phase::new("START", 4500)
            .on_enter(set_motion(Motion::MoveTo {
                x: 600.0,
                y: 100.0,
                speed: STAR_SPEED,
            }))
            .on_exit(set_motion(Motion::Stop)),
        Phase::new("PHASE1", 44000)
            .on_enter(PhaseAction::Arm(EmitterSpec::every(
                Pattern::Fan(FanParams::default()),
                FAN_INTERVAL_MS,
            ))),
        Phase::new("PHASE2", 7800).on_enter(PhaseAction::Arm(EmitterSpec::once(
            Pattern::WallVolley(WallParams::default()),
            0,
        ))),
        Phase::new("PHASE3", 14600).on_enter(PhaseAction::Arm(EmitterSpec::every(
            Pattern::Flurry(FlurryParams::default()),
            FLURRY_INTERVAL_MS,
        ))),
        Phase::new("PHASE4", 10000).on_enter(PhaseAction::Arm(EmitterSpec::every(
            Pattern::Stream(StreamParams::default()),
            STREAM_INTERVAL_MS,
        ))),
        Phase::new("BOUNCE", 5000).on_enter(set_motion(Motion::Bounce { speed: STAR_SPEED })),
        Phase::new("CHASE", 5000).on_enter(set_motion(Motion::Chase { speed: STAR_SPEED })),
        Phase::new("SHOOT", 5000)
            .on_enter(set_motion(Motion::Stop))
            .on_enter(PhaseAction::Arm(EmitterSpec::new(
                Pattern::Aimed(AimedParams::default()),
                Cadence::Times {
                    interval_ms: AIMED_INTERVAL_MS,
                    count: AIMED_SHOTS,
                },
            )))
            .branch(BranchRule::AfterVisits {
                visits: 2,
                then: star_phase::ENRAGE,
                otherwise: star_phase::FAN,
            }),
        Phase::terminal("ENRAGE")
            .on_enter(set_motion(Motion::MoveTo {
                x: ARENA_WIDTH / 2.0,
                y: ARENA_HEIGHT / 2.0,
                speed: STAR_SPEED,
            }))
            .on_enter(PhaseAction::Arm(EmitterSpec::every(
                Pattern::Radial(RadialParams::default()),
                RADIAL_INTERVAL_MS,
            )))
            .on_enter(PhaseAction::Arm(EmitterSpec::new(
                Pattern::Radial(RadialParams {
                    direction: RadialDirection::Outward,
                    ..RadialParams::default()
                }),
                Cadence::Every {
                    interval_ms: RADIAL_INTERVAL_MS * 2,
                    jitter_ms: RADIAL_INTERVAL_MS / 2,
                },
            ))),
    ];

    BossDefinition {
        name: "star".into(),
        playfield: Playfield::default(),
        health: STAR_HEALTH,
        spawn_x: STAR_SPAWN_X,
        spawn_y: STAR_SPAWN_Y,
        flair_spin: STAR_FLAIR_SPIN,
        fallback_phase: star_phase::START,
        phases,
        ambient: Vec::new(),
        health_triggers: vec![HealthTrigger {
            below: STAR_ENRAGE_HEALTH_FRACTION,
            phase: star_phase::ENRAGE,
        }],
    }
}

// Drifts in, then loops stop / spin / special forever with a steady straight shot on top.
#[must_use]
pub fn trinity() -> BossDefinition {
    let phases = vec![
        Phase::new("INTRO", 3000).on_enter(set_motion(Motion::Drift {
            vx: 0.0,
            vy: TRINITY_INTRO_DRIFT,
        })),
        Phase::new("PHASE1", 10000).on_enter(set_motion(Motion::Stop)),
        Phase::new("PHASE2", 12000).on_enter(PhaseAction::Spin {
            deg_per_sec: TRINITY_SPIN,
        }),
        Phase::new("PHASE3", 8000).on_enter(PhaseAction::Arm(EmitterSpec::once(
            Pattern::Aimed(AimedParams {
                speed: SPECIAL_SPEED,
                lifetime_ms: None,
                kind: ProjectileKind::Special,
            }),
            0,
        ))),
    ];

    BossDefinition {
        name: "trinity".into(),
        playfield: Playfield::default(),
        health: TRINITY_HEALTH,
        spawn_x: TRINITY_SPAWN_X,
        spawn_y: TRINITY_SPAWN_Y,
        flair_spin: 0.0,
        fallback_phase: 0,
        phases,
        ambient: vec![EmitterSpec::every(
            Pattern::Straight(StraightParams::default()),
            STRAIGHT_INTERVAL_MS,
        )],
        health_triggers: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_loops_back_once_before_enraging() {
        let star = star();
        assert_eq!(star.phases.len(), 9);
        assert_eq!(star.phase_id("ENRAGE"), Some(star_phase::ENRAGE));
        assert_eq!(
            star.phases[star_phase::SHOOT].branch,
            BranchRule::AfterVisits {
                visits: 2,
                then: star_phase::ENRAGE,
                otherwise: star_phase::FAN,
            }
        );
        assert!(star.phases[star_phase::ENRAGE].is_terminal());
    }

    #[test]
    fn trinity_durations_follow_the_cycle() {
        let trinity = trinity();
        let durations: Vec<_> = trinity.phases.iter().map(|phase| phase.duration_ms).collect();
        assert_eq!(durations, vec![Some(3000), Some(10000), Some(12000), Some(8000)]);
        assert_eq!(trinity.ambient.len(), 1);
    }
}
