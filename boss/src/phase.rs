use anyhow::{Result, bail};
use std::time::Duration;
use tracing::{debug, warn};

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::{actions::PhaseAction, constants::MIN_PHASE_DURATION_MS, timer::TimerHandle};

pub type PhaseId = usize;

// ============================================================================
// Phase Table
// ============================================================================

// Where the machine goes when the active phase runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "rule", rename_all = "snake_case"))]
pub enum BranchRule {
    // (index + 1) mod count
    #[default]
    Next,
    Goto {
        phase: PhaseId,
    },
    // `then` once this phase has been entered `visits` times, `otherwise` before that
    AfterVisits {
        visits: u32,
        then: PhaseId,
        otherwise: PhaseId,
    },
    // No outgoing transition and no phase timer
    Terminal,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct Phase {
    pub name: String,
    // None means unbounded
    #[cfg_attr(feature = "json", serde(default))]
    pub duration_ms: Option<u64>,
    #[cfg_attr(feature = "json", serde(default))]
    pub branch: BranchRule,
    #[cfg_attr(feature = "json", serde(default))]
    pub enter: Vec<PhaseAction>,
    #[cfg_attr(feature = "json", serde(default))]
    pub exit: Vec<PhaseAction>,
}

impl Phase {
    #[must_use]
    pub fn new(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            duration_ms: Some(duration_ms),
            branch: BranchRule::Next,
            enter: Vec::new(),
            exit: Vec::new(),
        }
    }

    #[must_use]
    pub fn terminal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            duration_ms: None,
            branch: BranchRule::Terminal,
            enter: Vec::new(),
            exit: Vec::new(),
        }
    }

    #[must_use]
    pub fn on_enter(mut self, action: PhaseAction) -> Self {
        self.enter.push(action);
        self
    }

    #[must_use]
    pub fn on_exit(mut self, action: PhaseAction) -> Self {
        self.exit.push(action);
        self
    }

    #[must_use]
    pub const fn branch(mut self, branch: BranchRule) -> Self {
        self.branch = branch;
        self
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.branch, BranchRule::Terminal)
    }

    // Time until the phase timer fires, None for terminal and unbounded phases
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        if self.is_terminal() {
            return None;
        }
        self.duration_ms
            .map(|ms| Duration::from_millis(ms.max(MIN_PHASE_DURATION_MS)))
    }
}

// ============================================================================
// Hooks
// ============================================================================

/// What the machine needs from its owner.
///
/// `enter_phase` / `exit_phase` run the phase actions; the phase timer is a plain
/// one-shot the owner schedules and later hands back to [`PhaseStateMachine::on_timer`].
pub trait PhaseHooks {
    fn now(&self) -> Duration;
    // `at` is the instant the transition belongs to, which may be earlier than `now`
    // when one long tick crosses several phase ends
    fn enter_phase(&mut self, id: PhaseId, phase: &Phase, at: Duration);
    fn exit_phase(&mut self, id: PhaseId, phase: &Phase, at: Duration);
    // Arm the phase timer for the absolute time `due`, which may already have passed
    fn arm_phase_timer(&mut self, due: Duration) -> TimerHandle;
    fn disarm_phase_timer(&mut self, handle: TimerHandle);
}

// ============================================================================
// Runtime State
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseRuntimeState {
    pub active: PhaseId,
    pub started_at: Duration,
    pub duration: Option<Duration>,
    // Only authoritative while paused
    pub remaining: Option<Duration>,
    pub next: Option<PhaseId>,
    // Times the active phase has been entered, this visit included
    pub pass: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: PhaseId,
    pub to: PhaseId,
}

// ============================================================================
// Phase State Machine
// ============================================================================

#[derive(Debug)]
pub struct PhaseStateMachine {
    phases: Vec<Phase>,
    fallback: PhaseId,
    visits: Vec<u32>,
    state: Option<PhaseRuntimeState>,
    timer: Option<TimerHandle>,
    paused: bool,
    stopped: bool,
}

impl PhaseStateMachine {
    pub fn new(phases: Vec<Phase>, fallback: PhaseId) -> Result<Self> {
        if phases.is_empty() {
            bail!("phase table is empty");
        }
        if fallback >= phases.len() {
            bail!("fallback phase {} is out of range (only {} phases)", fallback, phases.len());
        }
        let visits = vec![0; phases.len()];
        Ok(Self {
            phases,
            fallback,
            visits,
            state: None,
            timer: None,
            paused: false,
            stopped: false,
        })
    }

    // Enter the first phase. Does nothing once started.
    pub fn start(&mut self, hooks: &mut dyn PhaseHooks) {
        if self.state.is_some() || self.stopped {
            return;
        }
        let now = hooks.now();
        self.enter(0, now, hooks);
    }

    // Handle a fired phase timer whose scheduled end was `due`. Handles that are not the
    // live phase timer are ignored.
    pub fn on_timer(&mut self, handle: TimerHandle, due: Duration, hooks: &mut dyn PhaseHooks) -> Option<Transition> {
        if self.timer != Some(handle) || self.paused || self.stopped {
            return None;
        }
        let from = self.state?.active;
        let to = self.resolve_next(from);
        self.switch(to, due, hooks);
        Some(Transition { from, to })
    }

    // Leave the active phase for `target` right away, whatever its remaining time.
    // An out-of-range target goes to the fallback phase.
    pub fn skip_to(&mut self, target: PhaseId, hooks: &mut dyn PhaseHooks) -> Option<Transition> {
        if self.stopped {
            return None;
        }
        let from = self.state?.active;
        let to = self.checked(target, from);
        let now = hooks.now();
        self.switch(to, now, hooks);
        Some(Transition { from, to })
    }

    // Freeze the phase clock. Returns false if already paused or not running.
    pub fn pause(&mut self, hooks: &mut dyn PhaseHooks) -> bool {
        if self.paused || self.stopped {
            return false;
        }
        let now = hooks.now();
        let Some(state) = self.state.as_mut() else {
            return false;
        };

        state.remaining = state
            .duration
            .map(|duration| duration.saturating_sub(now.saturating_sub(state.started_at)));
        if let Some(handle) = self.timer.take() {
            hooks.disarm_phase_timer(handle);
        }
        self.paused = true;
        true
    }

    // Re-arm the phase timer with the remaining time captured by `pause`.
    pub fn resume(&mut self, hooks: &mut dyn PhaseHooks) -> bool {
        if !self.paused || self.stopped {
            return false;
        }
        self.paused = false;
        let now = hooks.now();
        let Some(state) = self.state.as_mut() else {
            return true;
        };

        if let (Some(duration), Some(remaining)) = (state.duration, state.remaining) {
            // Shift the start so that duration - (now - start) is the remaining time again
            state.started_at = now.saturating_sub(duration.saturating_sub(remaining));
            self.timer = Some(hooks.arm_phase_timer(now + remaining));
        }
        true
    }

    // Leave the active phase for good. Runs its exit hook, so everything the phase armed
    // is torn down. Idempotent.
    pub fn stop(&mut self, hooks: &mut dyn PhaseHooks) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Some(handle) = self.timer.take() {
            hooks.disarm_phase_timer(handle);
        }
        if let Some(state) = self.state {
            let now = hooks.now();
            hooks.exit_phase(state.active, &self.phases[state.active], now);
        }
    }

    fn switch(&mut self, to: PhaseId, at: Duration, hooks: &mut dyn PhaseHooks) {
        if let Some(handle) = self.timer.take() {
            hooks.disarm_phase_timer(handle);
        }
        if let Some(state) = self.state {
            let phase = &self.phases[state.active];
            hooks.exit_phase(state.active, phase, at);
        }
        self.enter(to, at, hooks);
    }

    fn enter(&mut self, id: PhaseId, at: Duration, hooks: &mut dyn PhaseHooks) {
        self.visits[id] = self.visits[id].saturating_add(1);
        let phase = &self.phases[id];
        let duration = phase.duration();

        self.state = Some(PhaseRuntimeState {
            active: id,
            started_at: at,
            duration,
            remaining: duration,
            next: None,
            pass: self.visits[id],
        });
        debug!("entering phase {} ({}) at {:?}, pass {}", id, phase.name, at, self.visits[id]);
        hooks.enter_phase(id, phase, at);

        // Entered while frozen: the timer is armed on resume from the full duration
        if let Some(duration) = duration
            && !self.paused
        {
            self.timer = Some(hooks.arm_phase_timer(at + duration));
        }

        let next = (!self.phases[id].is_terminal()).then(|| self.resolve_next(id));
        if let Some(state) = self.state.as_mut() {
            state.next = next;
        }
    }

    fn resolve_next(&self, from: PhaseId) -> PhaseId {
        let count = self.phases.len();
        let target = match self.phases[from].branch {
            BranchRule::Next => (from + 1) % count,
            BranchRule::Goto { phase } => phase,
            BranchRule::AfterVisits { visits, then, otherwise } => {
                if self.visits[from] >= visits {
                    then
                } else {
                    otherwise
                }
            }
            BranchRule::Terminal => from,
        };
        self.checked(target, from)
    }

    fn checked(&self, target: PhaseId, from: PhaseId) -> PhaseId {
        if target < self.phases.len() {
            return target;
        }
        warn!(
            "phase {} ({}) routes to phase {} which does not exist, falling back to phase {}",
            from, self.phases[from].name, target, self.fallback
        );
        self.fallback
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    #[must_use]
    pub const fn state(&self) -> Option<&PhaseRuntimeState> {
        self.state.as_ref()
    }

    #[must_use]
    pub fn active(&self) -> Option<PhaseId> {
        self.state.map(|state| state.active)
    }

    #[must_use]
    pub fn active_phase(&self) -> Option<&Phase> {
        self.state.map(|state| &self.phases[state.active])
    }

    #[must_use]
    pub fn phase(&self, id: PhaseId) -> Option<&Phase> {
        self.phases.get(id)
    }

    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    #[must_use]
    pub fn visits(&self, id: PhaseId) -> u32 {
        self.visits.get(id).copied().unwrap_or(0)
    }

    // Time left in the active phase; None while the phase is unbounded
    #[must_use]
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        let state = self.state?;
        if self.paused {
            return state.remaining;
        }
        state
            .duration
            .map(|duration| duration.saturating_sub(now.saturating_sub(state.started_at)))
    }

    #[must_use]
    pub const fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.active_phase().is_some_and(Phase::is_terminal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{TimerMode, TimerScheduler};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    // Records hook calls and owns the scheduler the phase timer lives on
    #[derive(Default)]
    struct Log {
        scheduler: TimerScheduler<()>,
        calls: Vec<String>,
    }

    impl PhaseHooks for Log {
        fn now(&self) -> Duration {
            self.scheduler.now()
        }

        fn enter_phase(&mut self, _id: PhaseId, phase: &Phase, _at: Duration) {
            self.calls.push(format!("enter {}", phase.name));
        }

        fn exit_phase(&mut self, _id: PhaseId, phase: &Phase, _at: Duration) {
            self.calls.push(format!("exit {}", phase.name));
        }

        fn arm_phase_timer(&mut self, due: Duration) -> TimerHandle {
            self.scheduler.schedule_at(due, Duration::ZERO, TimerMode::Once, ())
        }

        fn disarm_phase_timer(&mut self, handle: TimerHandle) {
            self.scheduler.cancel(handle);
        }
    }

    fn run_until(machine: &mut PhaseStateMachine, log: &mut Log, now: Duration) {
        log.scheduler.advance_to(now);
        while let Some(fired) = log.scheduler.pop_due() {
            machine.on_timer(fired.handle, fired.due, log);
        }
    }

    fn two_phases() -> PhaseStateMachine {
        let phases = vec![Phase::new("A", 1000), Phase::new("B", 2000)];
        let Ok(machine) = PhaseStateMachine::new(phases, 0) else {
            panic!("valid table rejected");
        };
        machine
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(PhaseStateMachine::new(Vec::new(), 0).is_err());
        assert!(PhaseStateMachine::new(vec![Phase::new("A", 10)], 3).is_err());
    }

    #[test]
    fn transitions_exactly_at_the_phase_end() {
        let mut machine = two_phases();
        let mut log = Log::default();
        machine.start(&mut log);

        run_until(&mut machine, &mut log, ms(999));
        assert_eq!(machine.active(), Some(0));
        run_until(&mut machine, &mut log, ms(1000));
        assert_eq!(machine.active(), Some(1));
        run_until(&mut machine, &mut log, ms(3000));
        assert_eq!(machine.active(), Some(0));
        assert_eq!(machine.visits(0), 2);
    }

    #[test]
    fn exit_runs_before_enter() {
        let mut machine = two_phases();
        let mut log = Log::default();
        machine.start(&mut log);
        run_until(&mut machine, &mut log, ms(1000));
        assert_eq!(log.calls, vec!["enter A", "exit A", "enter B"]);
    }

    #[test]
    fn one_long_tick_walks_through_several_phases() {
        let mut machine = two_phases();
        let mut log = Log::default();
        machine.start(&mut log);
        run_until(&mut machine, &mut log, ms(6500));
        // A 0-1000, B -3000, A -4000, B -6000, A
        assert_eq!(machine.active(), Some(0));
        assert_eq!(machine.state().map(|state| state.started_at), Some(ms(6000)));
    }

    #[test]
    fn long_tick_keeps_the_timeline_on_scheduled_ends() {
        let mut machine = two_phases();
        let mut log = Log::default();
        machine.start(&mut log);
        // B ends at 3000 even though the tick that notices A's end is already at 3500
        run_until(&mut machine, &mut log, ms(3500));
        assert_eq!(log.calls, vec!["enter A", "exit A", "enter B", "exit B", "enter A"]);
        assert_eq!(machine.active(), Some(0));
        assert_eq!(machine.state().map(|state| state.started_at), Some(ms(3000)));
        assert_eq!(machine.remaining(ms(3500)), Some(ms(500)));
    }

    #[test]
    fn pause_preserves_the_remaining_time() {
        let mut machine = two_phases();
        let mut log = Log::default();
        machine.start(&mut log);
        run_until(&mut machine, &mut log, ms(1500));

        assert!(machine.pause(&mut log));
        assert!(!machine.pause(&mut log));
        assert_eq!(machine.remaining(ms(1900)), Some(ms(1500)));

        run_until(&mut machine, &mut log, ms(2000));
        assert!(machine.resume(&mut log));
        assert!(!machine.resume(&mut log));
        assert_eq!(machine.remaining(ms(2000)), Some(ms(1500)));

        run_until(&mut machine, &mut log, ms(3499));
        assert_eq!(machine.active(), Some(1));
        run_until(&mut machine, &mut log, ms(3500));
        assert_eq!(machine.active(), Some(0));
    }

    #[test]
    fn stale_phase_timer_is_ignored() {
        let mut machine = two_phases();
        let mut log = Log::default();
        machine.start(&mut log);
        let stale = log.scheduler.schedule(ms(10), TimerMode::Once, ());
        log.scheduler.advance_to(ms(10));
        assert_eq!(machine.on_timer(stale, ms(10), &mut log), None);
        assert_eq!(machine.active(), Some(0));
    }

    #[test]
    fn after_visits_routes_to_the_terminal_phase_on_the_second_pass() {
        let phases = vec![
            Phase::new("A", 100),
            Phase::new("B", 100).branch(BranchRule::AfterVisits {
                visits: 2,
                then: 2,
                otherwise: 0,
            }),
            Phase::terminal("END"),
        ];
        let Ok(mut machine) = PhaseStateMachine::new(phases, 0) else {
            panic!("valid table rejected");
        };
        let mut log = Log::default();
        machine.start(&mut log);

        run_until(&mut machine, &mut log, ms(200));
        assert_eq!(machine.active(), Some(0));
        run_until(&mut machine, &mut log, ms(400));
        assert_eq!(machine.active(), Some(2));
        assert!(machine.is_terminal());
        assert_eq!(machine.timer(), None);

        run_until(&mut machine, &mut log, ms(100_000));
        assert_eq!(machine.active(), Some(2));
        assert_eq!(machine.remaining(ms(100_000)), None);
    }

    #[test]
    fn out_of_range_branch_falls_back() {
        let phases = vec![
            Phase::new("A", 100),
            Phase::new("B", 100).branch(BranchRule::Goto { phase: 42 }),
            Phase::new("C", 100),
        ];
        let Ok(mut machine) = PhaseStateMachine::new(phases, 2) else {
            panic!("valid table rejected");
        };
        let mut log = Log::default();
        machine.start(&mut log);
        run_until(&mut machine, &mut log, ms(200));
        assert_eq!(machine.active(), Some(2));
    }

    #[test]
    fn runtime_state_announces_the_next_phase() {
        let mut machine = two_phases();
        let mut log = Log::default();
        machine.start(&mut log);
        assert_eq!(machine.state().and_then(|state| state.next), Some(1));
    }

    #[test]
    fn skip_while_paused_arms_on_resume() {
        let mut machine = two_phases();
        let mut log = Log::default();
        machine.start(&mut log);
        run_until(&mut machine, &mut log, ms(200));
        machine.pause(&mut log);

        assert_eq!(machine.skip_to(1, &mut log), Some(Transition { from: 0, to: 1 }));
        assert_eq!(machine.timer(), None);
        run_until(&mut machine, &mut log, ms(5000));
        machine.resume(&mut log);
        assert_eq!(machine.remaining(ms(5000)), Some(ms(2000)));
        run_until(&mut machine, &mut log, ms(7000));
        assert_eq!(machine.active(), Some(0));
    }

    #[test]
    fn stop_exits_once() {
        let mut machine = two_phases();
        let mut log = Log::default();
        machine.start(&mut log);
        machine.stop(&mut log);
        machine.stop(&mut log);
        assert_eq!(log.calls, vec!["enter A", "exit A"]);
        assert!(log.scheduler.is_empty());
        run_until(&mut machine, &mut log, ms(10_000));
        assert_eq!(log.calls.len(), 2);
    }
}
