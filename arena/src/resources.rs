use bevy::prelude::*;
use std::time::Duration;

use crate::{config::Window, constants::*};

// ============================================================================
// Bevy Resources
// ============================================================================

// Capacity bookkeeping for the projectile pool
#[derive(Resource, Debug)]
pub struct PoolBudget {
    pub capacity: usize,
    pub live: usize,
    pub next_handle: u64,
}

impl PoolBudget {
    #[must_use]
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            live: 0,
            next_handle: 0,
        }
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.live >= self.capacity
    }

    pub const fn release(&mut self, count: usize) {
        self.live = self.live.saturating_sub(count);
    }
}

// The player as the boss sees it
#[derive(Resource, Debug, Default)]
pub struct ScriptedTarget {
    pub position: Option<Vec2>,
    pub hits_taken: u64,
}

// Scripted host behaviour for the whole run
#[derive(Resource, Debug, Clone)]
pub struct Script {
    pub dps: f32,
    pub pause: Option<Window>,
    pub hide: Option<Window>,
    pub overlay: Option<Window>,
    pub target_down: Option<Window>,
}

// What the host is currently doing to the arena, as last applied from the script
#[derive(Resource, Debug, Default)]
pub struct HostState {
    pub paused: bool,
    pub hidden: bool,
    pub overlay: bool,
}

impl HostState {
    // Projectiles freeze whenever the arena is not running normally
    #[must_use]
    pub const fn frozen(&self) -> bool {
        self.paused || self.hidden || self.overlay
    }
}

#[derive(Resource, Debug)]
pub struct EncounterStatus {
    pub frame: u64,
    pub max_frames: u64,
    pub defeated_at: Option<Duration>,
    pub finished: bool,
    pub next_report: Duration,
}

impl EncounterStatus {
    #[must_use]
    pub const fn new(max_frames: u64) -> Self {
        Self {
            frame: 0,
            max_frames,
            defeated_at: None,
            finished: false,
            next_report: Duration::from_secs(REPORT_INTERVAL_SECS),
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct EncounterStats {
    pub spawned: u64,
    pub refused: u64,
    pub expired: u64,
    pub culled: u64,
    pub halted: u64,
    pub cleared: u64,
    pub phases_entered: u64,
    pub peak_live: usize,
}
