use anyhow::Result;
use bevy_ecs::component::Component;
use bevy_math::Vec2;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use crate::{
    actions::{EmitterSpec, Motion, PhaseAction},
    constants::MIN_REPEAT_INTERVAL_MS,
    definition::{BossDefinition, HealthTrigger},
    motion::{self, Kinematics},
    patterns::{
        Pattern, WallParams,
        wall::{wall_positions, wall_shot},
    },
    pause::{PauseController, PauseSource},
    phase::{Phase, PhaseHooks, PhaseId, PhaseStateMachine},
    playfield::{Edge, Playfield},
    pool::{AimTarget, ProjectilePool, fire, fire_all},
    registry::{PhaseScope, TimerRegistry},
    timer::{Fired, TimerHandle, TimerMode, TimerScheduler},
};

// ============================================================================
// Timer Actions
// ============================================================================

// Which scope a timer was armed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Phase,
    Ambient,
}

/// What a boss timer does when it fires.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerAction {
    PhaseExpired,
    Emit {
        pattern: Pattern,
        owner: Owner,
        // (interval, jitter) in ms for emitters re-armed by hand with a fresh random gap
        jitter: Option<(u64, u64)>,
    },
    // One edge of a wall volley starts releasing
    WallEdge {
        edge: Edge,
        params: WallParams,
        owner: Owner,
    },
    WallShot {
        edge: Edge,
        along: f32,
        params: WallParams,
        owner: Owner,
    },
    // A `MoveTo` reaches its destination
    Arrive {
        at: Vec2,
    },
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum BossEvent {
    PhaseEntered { phase: PhaseId, name: String, at: Duration },
    PhaseExited { phase: PhaseId, name: String, at: Duration },
    Paused { source: PauseSource, at: Duration },
    Resumed { source: PauseSource, at: Duration },
    Damaged { amount: f32, health: f32 },
    // Emitted exactly once, when health reaches zero
    Defeated { at: Duration },
}

// ============================================================================
// Boss Core
// ============================================================================

// Everything the phase hooks touch. Kept apart from the machine so the machine can
// borrow it mutably while it runs a transition.
#[derive(Debug)]
struct BossCore {
    name: String,
    field: Playfield,
    scheduler: TimerScheduler<TimerAction>,
    registry: TimerRegistry,
    phase_scope: PhaseScope,
    ambient_scope: PhaseScope,
    body: Kinematics,
    motion: Motion,
    flair_spin: f32,
    target: Option<Vec2>,
    rng: StdRng,
    events: Vec<BossEvent>,
}

impl BossCore {
    // Arm a timer in `owner`'s scope as if it had been armed at `at` (<= now)
    fn arm(&mut self, owner: Owner, at: Duration, delay: Duration, mode: TimerMode, action: TimerAction) -> TimerHandle {
        let scope = match owner {
            Owner::Phase => &mut self.phase_scope,
            Owner::Ambient => &mut self.ambient_scope,
        };
        scope.arm_at(&mut self.scheduler, &mut self.registry, at + delay, delay, mode, action)
    }

    fn forget(&mut self, owner: Owner, handle: TimerHandle) {
        let scope = match owner {
            Owner::Phase => &mut self.phase_scope,
            Owner::Ambient => &mut self.ambient_scope,
        };
        scope.forget(handle, &mut self.scheduler, &mut self.registry);
    }

    fn jittered_delay(&mut self, interval_ms: u64, jitter_ms: u64) -> Duration {
        let low = interval_ms.saturating_sub(jitter_ms).max(MIN_REPEAT_INTERVAL_MS);
        let high = interval_ms.saturating_add(jitter_ms).max(low);
        Duration::from_millis(self.rng.random_range(low..=high))
    }

    fn arm_emitter(&mut self, emitter: &EmitterSpec, owner: Owner, at: Duration) {
        let jitter = emitter.cadence.jitter();
        let (delay, mode) = match jitter {
            Some((interval_ms, jitter_ms)) => (self.jittered_delay(interval_ms, jitter_ms), TimerMode::Once),
            None => emitter.cadence.first_arming(),
        };
        debug!(
            "{}: arming {} emitter ({:?}) in {:?} scope",
            self.name,
            emitter.pattern.name(),
            emitter.cadence,
            owner
        );
        self.arm(
            owner,
            at,
            delay,
            mode,
            TimerAction::Emit {
                pattern: emitter.pattern.clone(),
                owner,
                jitter,
            },
        );
    }

    fn apply(&mut self, action: &PhaseAction, at: Duration, may_arm: bool) {
        match action {
            PhaseAction::SetMotion { motion } => self.set_motion(*motion, at),
            PhaseAction::Spin { deg_per_sec } => self.body.spin_deg_per_sec = *deg_per_sec,
            PhaseAction::Arm(emitter) if may_arm => self.arm_emitter(emitter, Owner::Phase, at),
            PhaseAction::Arm(emitter) => {
                warn!(
                    "{}: ignoring {} emitter armed on phase exit",
                    self.name,
                    emitter.pattern.name()
                );
            }
        }
    }

    fn set_motion(&mut self, motion: Motion, at: Duration) {
        self.motion = motion;
        if let Some(arrival) = motion::start_motion(&mut self.body, motion, self.target, &mut self.rng) {
            self.arm(
                Owner::Phase,
                at,
                arrival.after,
                TimerMode::Once,
                TimerAction::Arrive { at: arrival.at },
            );
        }
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    fn emit(&mut self, pattern: &Pattern, pool: &mut dyn ProjectilePool) -> usize {
        let requests = pattern.emit(self.body.position, self.target, &self.field, &mut self.rng);
        let spawned = fire_all(pool, &requests);
        if spawned < requests.len() {
            trace!(
                "{}: pool declined {} of {} {} projectiles",
                self.name,
                requests.len() - spawned,
                requests.len(),
                pattern.name()
            );
        }
        spawned
    }

    fn dispatch(&mut self, fired: Fired<TimerAction>, pool: &mut dyn ProjectilePool) {
        let Fired { handle, action, due } = fired;
        let owner = match action {
            TimerAction::PhaseExpired => return,
            TimerAction::Emit { ref pattern, owner, jitter } => {
                if let Pattern::WallVolley(params) = pattern {
                    self.start_wall(params, owner, due);
                } else {
                    self.emit(pattern, pool);
                }
                if let Some((interval_ms, jitter_ms)) = jitter {
                    let delay = self.jittered_delay(interval_ms, jitter_ms);
                    self.arm(owner, due, delay, TimerMode::Once, action.clone());
                }
                owner
            }
            TimerAction::WallEdge { edge, ref params, owner } => {
                for (index, along) in wall_positions(&self.field, edge, params.spacing).into_iter().enumerate() {
                    self.arm(
                        owner,
                        due,
                        params.shot_delay(index),
                        TimerMode::Once,
                        TimerAction::WallShot {
                            edge,
                            along,
                            params: params.clone(),
                            owner,
                        },
                    );
                }
                owner
            }
            TimerAction::WallShot {
                edge,
                along,
                ref params,
                owner,
            } => {
                fire(pool, &wall_shot(&self.field, edge, along, params));
                owner
            }
            TimerAction::Arrive { at } => {
                if matches!(self.motion, Motion::MoveTo { .. }) {
                    self.body.position = at;
                    self.body.velocity = Vec2::ZERO;
                    self.motion = Motion::Stop;
                }
                Owner::Phase
            }
        };

        // Finished timers leave their scope right away so long phases do not pile them up
        if self.scheduler.is_dispatched(handle) {
            self.forget(owner, handle);
        }
    }

    fn start_wall(&mut self, params: &WallParams, owner: Owner, at: Duration) {
        for edge in Edge::CLOCKWISE {
            self.arm(
                owner,
                at,
                params.edge_delay(edge),
                TimerMode::Once,
                TimerAction::WallEdge {
                    edge,
                    params: params.clone(),
                    owner,
                },
            );
        }
    }
}

impl PhaseHooks for BossCore {
    fn now(&self) -> Duration {
        self.scheduler.now()
    }

    fn enter_phase(&mut self, id: PhaseId, phase: &Phase, at: Duration) {
        self.events.push(BossEvent::PhaseEntered {
            phase: id,
            name: phase.name.clone(),
            at,
        });
        for action in &phase.enter {
            self.apply(action, at, true);
        }
    }

    fn exit_phase(&mut self, id: PhaseId, phase: &Phase, at: Duration) {
        let released = self.phase_scope.release(&mut self.scheduler, &mut self.registry);
        for action in &phase.exit {
            self.apply(action, at, false);
        }
        debug!("{}: left phase {} ({}), released {} timers", self.name, id, phase.name, released);
        self.events.push(BossEvent::PhaseExited {
            phase: id,
            name: phase.name.clone(),
            at,
        });
    }

    fn arm_phase_timer(&mut self, due: Duration) -> TimerHandle {
        self.scheduler
            .schedule_at(due, Duration::ZERO, TimerMode::Once, TimerAction::PhaseExpired)
    }

    fn disarm_phase_timer(&mut self, handle: TimerHandle) {
        self.scheduler.cancel(handle);
    }
}

// ============================================================================
// Boss Actor
// ============================================================================

/// One boss encounter: phase machine, timers and body, driven by the host clock.
///
/// The host pushes time with [`BossActor::update`], forwards pause signals, applies
/// damage and drains [`BossEvent`]s. Projectiles go straight to the host's pool and
/// are never tracked here.
#[derive(Component, Debug)]
pub struct BossActor {
    machine: PhaseStateMachine,
    core: BossCore,
    pause: PauseController,
    health: f32,
    max_health: f32,
    triggers: Vec<(HealthTrigger, bool)>,
    spawned_at: Duration,
    defeated: bool,
    destroyed: bool,
}

impl BossActor {
    // Build the boss from `definition` and enter its first phase at `now`
    pub fn spawn(definition: BossDefinition, seed: u64, now: Duration) -> Result<Self> {
        definition.validate()?;
        let BossDefinition {
            name,
            playfield,
            health,
            spawn_x,
            spawn_y,
            flair_spin,
            fallback_phase,
            phases,
            ambient,
            health_triggers,
        } = definition;

        let machine = PhaseStateMachine::new(phases, fallback_phase)?;
        let mut scheduler = TimerScheduler::new();
        scheduler.advance_to(now);

        let mut actor = Self {
            machine,
            core: BossCore {
                name,
                field: playfield,
                scheduler,
                registry: TimerRegistry::new(),
                phase_scope: PhaseScope::new(),
                ambient_scope: PhaseScope::new(),
                body: Kinematics::at(Vec2::new(spawn_x, spawn_y)),
                motion: Motion::Stop,
                flair_spin,
                target: None,
                rng: StdRng::seed_from_u64(seed),
                events: Vec::new(),
            },
            pause: PauseController::new(),
            health,
            max_health: health,
            triggers: health_triggers.into_iter().map(|trigger| (trigger, false)).collect(),
            spawned_at: now,
            defeated: false,
            destroyed: false,
        };

        for emitter in &ambient {
            actor.core.arm_emitter(emitter, Owner::Ambient, now);
        }
        actor.machine.start(&mut actor.core);
        info!(
            "{} spawned at {:?} with {} phases and {} ambient emitters",
            actor.core.name,
            actor.core.body.position,
            actor.machine.phases().len(),
            ambient.len()
        );
        Ok(actor)
    }

    // Advance to `now`: fire every due timer in order, then move the body by `dt`.
    pub fn update(&mut self, dt: Duration, now: Duration, pool: &mut dyn ProjectilePool, target: &dyn AimTarget) {
        if self.destroyed {
            return;
        }
        self.core.target = target.current_target();
        self.core.scheduler.advance_to(now);

        while let Some(fired) = self.core.scheduler.pop_due() {
            self.dispatch(fired, pool);
        }

        if self.pause.is_paused() {
            return;
        }
        motion::integrate(
            &mut self.core.body,
            self.core.motion,
            self.core.target,
            &self.core.field,
            self.core.flair_spin,
            dt,
        );
    }

    fn dispatch(&mut self, fired: Fired<TimerAction>, pool: &mut dyn ProjectilePool) {
        // Late callbacks after teardown do nothing
        if self.destroyed {
            return;
        }
        trace!("{}: {:?} due at {:?}", self.core.name, fired.action, fired.due);
        if matches!(fired.action, TimerAction::PhaseExpired) {
            if let Some(transition) = self.machine.on_timer(fired.handle, fired.due, &mut self.core) {
                debug!("{}: phase {} -> {}", self.core.name, transition.from, transition.to);
            }
            return;
        }
        self.core.dispatch(fired, pool);
    }

    // ------------------------------------------------------------------------
    // Pause
    // ------------------------------------------------------------------------

    // Freeze the phase clock, every registered timer and the body. No-op when already paused.
    pub fn pause(&mut self, source: PauseSource) -> bool {
        if self.destroyed {
            return false;
        }
        let now = self.core.scheduler.now();
        if !self.pause.pause(now, source, &mut self.core.body) {
            return false;
        }
        self.machine.pause(&mut self.core);
        let frozen = self.core.registry.pause_all(&mut self.core.scheduler);
        debug!("{}: paused {} timers", self.core.name, frozen);
        self.core.events.push(BossEvent::Paused { source, at: now });
        true
    }

    // Undo `pause`: the phase and every timer continue with the time they had left.
    pub fn resume(&mut self, source: PauseSource) -> bool {
        if self.destroyed {
            return false;
        }
        let now = self.core.scheduler.now();
        if !self.pause.resume(now, source, &mut self.core.body) {
            return false;
        }
        self.machine.resume(&mut self.core);
        let thawed = self.core.registry.resume_all(&mut self.core.scheduler);
        debug!("{}: resumed {} timers", self.core.name, thawed);
        self.core.events.push(BossEvent::Resumed { source, at: now });
        true
    }

    pub fn on_host_pause(&mut self) -> bool {
        self.pause(PauseSource::Host)
    }

    pub fn on_host_resume(&mut self) -> bool {
        self.resume(PauseSource::Host)
    }

    pub fn on_visibility_change(&mut self, visible: bool) -> bool {
        if visible {
            self.resume(PauseSource::Visibility)
        } else {
            self.pause(PauseSource::Visibility)
        }
    }

    pub fn on_overlay(&mut self, open: bool) -> bool {
        if open {
            self.pause(PauseSource::Overlay)
        } else {
            self.resume(PauseSource::Overlay)
        }
    }

    // ------------------------------------------------------------------------
    // Damage & Teardown
    // ------------------------------------------------------------------------

    // Returns true only for the hit that defeats the boss. A paused boss takes no damage.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.destroyed || self.defeated || self.pause.is_paused() || amount.is_nan() || amount <= 0.0 {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.core.events.push(BossEvent::Damaged {
            amount,
            health: self.health,
        });

        if self.health <= 0.0 {
            let at = self.core.scheduler.now();
            self.defeated = true;
            self.core.events.push(BossEvent::Defeated { at });
            info!("{} defeated at {:?}", self.core.name, at);
            self.destroy();
            return true;
        }

        // At most one trigger per hit, in listed order; the rest wait for the next hit
        let share = self.health / self.max_health;
        let skip = self
            .triggers
            .iter_mut()
            .find(|(trigger, used)| !*used && share < trigger.below)
            .map(|(trigger, used)| {
                *used = true;
                trigger.phase
            });
        if let Some(phase) = skip
            && self.machine.active() != Some(phase)
        {
            info!("{} dropped below {:.0}% health", self.core.name, share * 100.0);
            self.machine.skip_to(phase, &mut self.core);
        }
        false
    }

    // Tear everything down. Safe to call any number of times.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.machine.stop(&mut self.core);

        let core = &mut self.core;
        core.ambient_scope.release(&mut core.scheduler, &mut core.registry);
        let leftover = core.registry.cancel_all(&mut core.scheduler);
        if leftover > 0 {
            warn!("{}: {} timers outlived their scope", core.name, leftover);
        }
        core.body.velocity = Vec2::ZERO;
        core.body.spin_deg_per_sec = 0.0;
        core.motion = Motion::Stop;
        debug!("{} destroyed", core.name);
    }

    pub fn drain_events(&mut self) -> Vec<BossEvent> {
        std::mem::take(&mut self.core.events)
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn name(&self) -> &str {
        &self.core.name
    }

    #[must_use]
    pub const fn kinematics(&self) -> &Kinematics {
        &self.core.body
    }

    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.core.body.position
    }

    #[must_use]
    pub const fn motion(&self) -> Motion {
        self.core.motion
    }

    #[must_use]
    pub const fn playfield(&self) -> &Playfield {
        &self.core.field
    }

    #[must_use]
    pub const fn health(&self) -> f32 {
        self.health
    }

    #[must_use]
    pub const fn max_health(&self) -> f32 {
        self.max_health
    }

    #[must_use]
    pub const fn is_defeated(&self) -> bool {
        self.defeated
    }

    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    #[must_use]
    pub fn pause_source(&self) -> Option<PauseSource> {
        self.pause.source()
    }

    #[must_use]
    pub const fn machine(&self) -> &PhaseStateMachine {
        &self.machine
    }

    #[must_use]
    pub fn active_phase(&self) -> Option<&str> {
        self.machine.active_phase().map(|phase| phase.name.as_str())
    }

    #[must_use]
    pub fn phase_remaining(&self) -> Option<Duration> {
        self.machine.remaining(self.core.scheduler.now())
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.core.scheduler.now()
    }

    // Time since spawn with every pause taken out
    #[must_use]
    pub fn encounter_time(&self) -> Duration {
        let now = self.core.scheduler.now();
        self.pause.simulated(now).saturating_sub(self.pause.simulated(self.spawned_at))
    }

    // Timers in the registry: ambient emitters plus whatever the active phase armed
    #[must_use]
    pub fn registered_timers(&self) -> usize {
        self.core.registry.len()
    }

    #[must_use]
    pub fn phase_timers(&self) -> usize {
        self.core.phase_scope.len()
    }

    // Every timer the scheduler holds, the phase timer included
    #[must_use]
    pub fn live_timers(&self) -> usize {
        self.core.scheduler.len()
    }
}
