use std::time::Duration;

use crate::timer::{TimerHandle, TimerMode, TimerScheduler};

// ============================================================================
// Timer Registry
// ============================================================================

/// Every timer a boss owns, for bulk pause / resume / cancel.
#[derive(Debug, Default)]
pub struct TimerRegistry {
    handles: Vec<TimerHandle>,
    paused: bool,
}

impl TimerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, handle: TimerHandle) {
        if !self.handles.contains(&handle) {
            self.handles.push(handle);
        }
    }

    pub fn untrack(&mut self, handle: TimerHandle) -> bool {
        let before = self.handles.len();
        self.handles.retain(|tracked| *tracked != handle);
        self.handles.len() != before
    }

    // Freeze every live timer. Dispatched one-shots are left alone. Returns how many were paused.
    pub fn pause_all<A: Clone>(&mut self, scheduler: &mut TimerScheduler<A>) -> usize {
        if self.paused {
            return 0;
        }
        self.paused = true;
        self.handles
            .iter()
            .filter(|handle| !scheduler.is_dispatched(**handle) && scheduler.pause(**handle))
            .count()
    }

    pub fn resume_all<A: Clone>(&mut self, scheduler: &mut TimerScheduler<A>) -> usize {
        if !self.paused {
            return 0;
        }
        self.paused = false;
        self.handles
            .iter()
            .filter(|handle| !scheduler.is_dispatched(**handle) && scheduler.resume(**handle))
            .count()
    }

    // Cancel everything still tracked. Timers cancelled individually beforehand are skipped.
    pub fn cancel_all<A: Clone>(&mut self, scheduler: &mut TimerScheduler<A>) -> usize {
        let cancelled = self.handles.drain(..).filter(|handle| scheduler.cancel(*handle)).count();
        self.paused = false;
        cancelled
    }

    #[must_use]
    pub fn contains(&self, handle: TimerHandle) -> bool {
        self.handles.contains(&handle)
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

// ============================================================================
// Phase Scope
// ============================================================================

/// Timers armed on behalf of one owner (a phase, or the actor itself).
///
/// Arming only happens through [`PhaseScope::arm`], which registers the timer in the
/// registry as well; [`PhaseScope::release`] cancels and unregisters all of them. Whoever
/// owns the scope therefore cannot leak a timer past its release.
#[derive(Debug, Default)]
pub struct PhaseScope {
    handles: Vec<TimerHandle>,
}

impl PhaseScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm<A: Clone>(
        &mut self,
        scheduler: &mut TimerScheduler<A>,
        registry: &mut TimerRegistry,
        delay: Duration,
        mode: TimerMode,
        action: A,
    ) -> TimerHandle {
        let due = scheduler.now() + delay;
        self.arm_at(scheduler, registry, due, delay, mode, action)
    }

    // Like `arm`, for an absolute scheduled end that may already have passed
    pub fn arm_at<A: Clone>(
        &mut self,
        scheduler: &mut TimerScheduler<A>,
        registry: &mut TimerRegistry,
        due: Duration,
        interval: Duration,
        mode: TimerMode,
        action: A,
    ) -> TimerHandle {
        let handle = scheduler.schedule_at(due, interval, mode, action);
        // Arming while the owner is frozen must not produce a running timer
        if registry.is_paused() {
            scheduler.pause(handle);
        }
        registry.track(handle);
        self.handles.push(handle);
        handle
    }

    // Drop a single finished timer from the scope (and the registry) without waiting for release.
    pub fn forget<A: Clone>(
        &mut self,
        handle: TimerHandle,
        scheduler: &mut TimerScheduler<A>,
        registry: &mut TimerRegistry,
    ) {
        self.handles.retain(|owned| *owned != handle);
        registry.untrack(handle);
        scheduler.cancel(handle);
    }

    pub fn release<A: Clone>(&mut self, scheduler: &mut TimerScheduler<A>, registry: &mut TimerRegistry) -> usize {
        let mut cancelled = 0;
        for handle in self.handles.drain(..) {
            registry.untrack(handle);
            if scheduler.cancel(handle) {
                cancelled += 1;
            }
        }
        cancelled
    }

    #[must_use]
    pub fn contains(&self, handle: TimerHandle) -> bool {
        self.handles.contains(&handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
