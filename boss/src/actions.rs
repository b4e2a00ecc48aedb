use std::time::Duration;

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::{patterns::Pattern, timer::TimerMode};

// ============================================================================
// Motion
// ============================================================================

// How the boss body moves. Set by a phase and kept by later phases until one changes it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "type", rename_all = "snake_case"))]
pub enum Motion {
    #[default]
    Stop,
    Drift {
        vx: f32,
        vy: f32,
    },
    // Head for a point and snap onto it on arrival
    MoveTo {
        x: f32,
        y: f32,
        speed: f32,
    },
    // Random heading, reflected off the playfield edges
    Bounce {
        speed: f32,
    },
    // Re-aim at the target every tick
    Chase {
        speed: f32,
    },
}

// ============================================================================
// Emitters
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "type", rename_all = "snake_case"))]
pub enum Cadence {
    // A single invocation after `delay_ms`
    Once {
        #[cfg_attr(feature = "json", serde(default))]
        delay_ms: u64,
    },
    // Every `interval_ms`, first one after one interval. With a jitter, each gap is
    // drawn from [interval - jitter, interval + jitter].
    Every {
        interval_ms: u64,
        #[cfg_attr(feature = "json", serde(default))]
        jitter_ms: u64,
    },
    // `count` invocations, `interval_ms` apart, first one after one interval
    Times {
        interval_ms: u64,
        count: u32,
    },
}

impl Cadence {
    // First delay and timer mode for a non-jittered cadence
    #[must_use]
    pub const fn first_arming(self) -> (Duration, TimerMode) {
        match self {
            Self::Once { delay_ms } => (Duration::from_millis(delay_ms), TimerMode::Once),
            Self::Every { interval_ms, .. } => (Duration::from_millis(interval_ms), TimerMode::Repeating),
            Self::Times { interval_ms, count } => (Duration::from_millis(interval_ms), TimerMode::Count(count)),
        }
    }

    #[must_use]
    pub const fn jitter(self) -> Option<(u64, u64)> {
        match self {
            Self::Every { interval_ms, jitter_ms } if jitter_ms > 0 => Some((interval_ms, jitter_ms)),
            _ => None,
        }
    }
}

// A pattern plus the cadence it fires on
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
pub struct EmitterSpec {
    pub pattern: Pattern,
    pub cadence: Cadence,
}

impl EmitterSpec {
    #[must_use]
    pub const fn new(pattern: Pattern, cadence: Cadence) -> Self {
        Self { pattern, cadence }
    }

    #[must_use]
    pub const fn every(pattern: Pattern, interval_ms: u64) -> Self {
        Self::new(pattern, Cadence::Every { interval_ms, jitter_ms: 0 })
    }

    #[must_use]
    pub const fn once(pattern: Pattern, delay_ms: u64) -> Self {
        Self::new(pattern, Cadence::Once { delay_ms })
    }
}

// ============================================================================
// Phase Actions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "action", rename_all = "snake_case"))]
pub enum PhaseAction {
    SetMotion { motion: Motion },
    // Angular velocity in degrees per second; persists across phases
    Spin { deg_per_sec: f32 },
    // Arm an emitter for the lifetime of the phase (enter actions only)
    Arm(EmitterSpec),
}
