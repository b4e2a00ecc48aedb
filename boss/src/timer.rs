use std::{
    cmp::Reverse,
    collections::{BTreeMap, BinaryHeap},
    time::Duration,
};
use tracing::trace;

use crate::constants::MIN_REPEAT_INTERVAL_MS;

// ============================================================================
// Timer Types
// ============================================================================

// Handles are issued in increasing order, so comparing handles compares registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    // Fires once, then stays dispatched until removed
    Once,
    // Re-arms for the same interval after every dispatch
    Repeating,
    // Fires `n` times, then behaves like a dispatched one-shot
    Count(u32),
}

#[derive(Debug)]
struct Timer<A> {
    interval: Duration,
    mode: TimerMode,
    fires_left: u32,
    due: Duration,
    remaining_at_pause: Duration,
    paused: bool,
    dispatched: bool,
    // Bumped whenever `due` changes so queue entries from an older arming are ignored
    generation: u32,
    action: A,
}

/// A timer whose scheduled end has been reached.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<A> {
    pub handle: TimerHandle,
    pub action: A,
    pub due: Duration,
}

// ============================================================================
// Timer Scheduler
// ============================================================================

/// Cancellable, pausable countdown / repeat timers on a clock pushed by the host.
///
/// Callbacks are plain values of type `A`; the owner drains due timers with
/// [`TimerScheduler::pop_due`] and dispatches them itself, one at a time, so a
/// callback may cancel or pause any other timer before that one is popped.
#[derive(Debug)]
pub struct TimerScheduler<A> {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerHandle, Timer<A>>,
    queue: BinaryHeap<Reverse<(Duration, TimerHandle, u32)>>,
}

impl<A> Default for TimerScheduler<A> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            timers: BTreeMap::new(),
            queue: BinaryHeap::new(),
        }
    }
}

impl<A: Clone> TimerScheduler<A> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    // Move the clock forward. A timestamp older than the current one is ignored.
    pub fn advance_to(&mut self, now: Duration) {
        if now < self.now {
            trace!("ignoring clock step backwards ({:?} < {:?})", now, self.now);
            return;
        }
        self.now = now;
    }

    pub fn schedule(&mut self, delay: Duration, mode: TimerMode, action: A) -> TimerHandle {
        self.schedule_at(self.now + delay, delay, mode, action)
    }

    // Arm a timer for an absolute scheduled end. `due` may already lie in the past, in which
    // case the timer fires on the next `pop_due` and repeats stay on the `due + k * interval` grid.
    pub fn schedule_at(&mut self, due: Duration, interval: Duration, mode: TimerMode, action: A) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;

        let interval = match mode {
            TimerMode::Once => interval,
            TimerMode::Repeating | TimerMode::Count(_) => interval.max(Duration::from_millis(MIN_REPEAT_INTERVAL_MS)),
        };
        let fires_left = match mode {
            TimerMode::Once | TimerMode::Repeating => 1,
            TimerMode::Count(n) => n,
        };

        self.timers.insert(
            handle,
            Timer {
                interval,
                mode,
                fires_left,
                due,
                remaining_at_pause: Duration::ZERO,
                paused: false,
                dispatched: fires_left == 0,
                generation: 0,
                action,
            },
        );
        if fires_left > 0 {
            self.queue.push(Reverse((due, handle, 0)));
        }
        handle
    }

    // Remove a timer. Any queued dispatch for it is dropped. Returns false if it was already gone.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.timers.remove(&handle).is_some()
    }

    // Freeze the time left until the scheduled end. No-op for paused, dispatched or unknown timers.
    pub fn pause(&mut self, handle: TimerHandle) -> bool {
        let now = self.now;
        let Some(timer) = self.timers.get_mut(&handle) else {
            return false;
        };
        if timer.paused || timer.dispatched {
            return false;
        }
        timer.remaining_at_pause = timer.due.saturating_sub(now);
        timer.paused = true;
        timer.generation = timer.generation.wrapping_add(1);
        true
    }

    // Re-arm a paused timer with exactly the time it had left when paused.
    pub fn resume(&mut self, handle: TimerHandle) -> bool {
        let now = self.now;
        let Some(timer) = self.timers.get_mut(&handle) else {
            return false;
        };
        if !timer.paused || timer.dispatched {
            return false;
        }
        timer.due = now + timer.remaining_at_pause;
        timer.paused = false;
        timer.generation = timer.generation.wrapping_add(1);
        self.queue.push(Reverse((timer.due, handle, timer.generation)));
        true
    }

    #[must_use]
    pub fn remaining(&self, handle: TimerHandle) -> Option<Duration> {
        let timer = self.timers.get(&handle)?;
        Some(if timer.dispatched {
            Duration::ZERO
        } else if timer.paused {
            timer.remaining_at_pause
        } else {
            timer.due.saturating_sub(self.now)
        })
    }

    #[must_use]
    pub fn contains(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }

    #[must_use]
    pub fn is_paused(&self, handle: TimerHandle) -> bool {
        self.timers.get(&handle).is_some_and(|timer| timer.paused)
    }

    #[must_use]
    pub fn is_dispatched(&self, handle: TimerHandle) -> bool {
        self.timers.get(&handle).is_some_and(|timer| timer.dispatched)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    // Pop the next timer whose scheduled end is at or before `now`.
    //
    // Earlier scheduled ends come first; equal ends come out in registration order.
    // Repeating timers are re-armed from their previous scheduled end before being returned,
    // so one long tick can yield the same repeating timer more than once.
    pub fn pop_due(&mut self) -> Option<Fired<A>> {
        while let Some(Reverse((due, handle, generation))) = self.queue.peek().copied() {
            if due > self.now {
                return None;
            }
            self.queue.pop();

            let Some(timer) = self.timers.get_mut(&handle) else {
                continue;
            };
            if timer.paused || timer.dispatched || timer.generation != generation || timer.due != due {
                continue;
            }

            let action = timer.action.clone();
            match timer.mode {
                TimerMode::Once => timer.dispatched = true,
                TimerMode::Repeating => {
                    timer.due += timer.interval;
                    self.queue.push(Reverse((timer.due, handle, timer.generation)));
                }
                TimerMode::Count(_) => {
                    timer.fires_left -= 1;
                    if timer.fires_left == 0 {
                        timer.dispatched = true;
                    } else {
                        timer.due += timer.interval;
                        self.queue.push(Reverse((timer.due, handle, timer.generation)));
                    }
                }
            }

            trace!("timer {:?} fired (due {:?}, now {:?})", handle, due, self.now);
            return Some(Fired { handle, action, due });
        }
        None
    }
}
