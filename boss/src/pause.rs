use bevy_math::Vec2;
use std::time::Duration;
use tracing::debug;

#[cfg(feature = "json")]
use serde::{Deserialize, Serialize};

use crate::motion::Kinematics;

// ============================================================================
// Pause Sources
// ============================================================================

// Every route into a pause. They all end up in the same pause / resume pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "snake_case"))]
pub enum PauseSource {
    // Explicit pause from the host scene
    Host,
    // Window or tab lost visibility
    Visibility,
    // A pause menu opened on top of the encounter
    Overlay,
}

// ============================================================================
// Pause Controller
// ============================================================================

/// Freezes and restores the body's motion, and keeps the paused-time ledger.
///
/// Every source holds the pause independently: the body freezes when the first source
/// pauses and thaws only when the last one has resumed. The actor freezes its phase
/// clock and timers only on those two edges, so repeated signals are no-ops.
#[derive(Debug, Default)]
pub struct PauseController {
    paused_since: Option<Duration>,
    // Sources currently holding the pause, in the order they arrived
    sources: Vec<PauseSource>,
    total_paused: Duration,
    saved_velocity: Vec2,
    saved_spin: f32,
}

impl PauseController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Add `source` to the holders. Snapshots and zeroes the body on the first one only;
    // returns true exactly then.
    pub fn pause(&mut self, now: Duration, source: PauseSource, body: &mut Kinematics) -> bool {
        if self.sources.contains(&source) {
            return false;
        }
        self.sources.push(source);
        if self.paused_since.is_some() {
            debug!("{:?} joined the pause at {:?}", source, now);
            return false;
        }
        self.paused_since = Some(now);
        self.saved_velocity = body.velocity;
        self.saved_spin = body.spin_deg_per_sec;
        body.velocity = Vec2::ZERO;
        body.spin_deg_per_sec = 0.0;
        debug!("paused by {:?} at {:?}", source, now);
        true
    }

    // Release `source`. Restores the snapshot once no source holds the pause any more;
    // returns true exactly then.
    pub fn resume(&mut self, now: Duration, source: PauseSource, body: &mut Kinematics) -> bool {
        let before = self.sources.len();
        self.sources.retain(|held| *held != source);
        if self.sources.len() == before {
            return false;
        }
        if !self.sources.is_empty() {
            debug!("{:?} released at {:?}, still held by {:?}", source, now, self.sources);
            return false;
        }
        let Some(since) = self.paused_since.take() else {
            return false;
        };
        self.total_paused += now.saturating_sub(since);
        body.velocity = self.saved_velocity;
        body.spin_deg_per_sec = self.saved_spin;
        debug!("resumed by {:?} at {:?} after {:?}", source, now, now.saturating_sub(since));
        true
    }

    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    // The source that started the current pause
    #[must_use]
    pub fn source(&self) -> Option<PauseSource> {
        self.sources.first().copied()
    }

    #[must_use]
    pub fn is_held_by(&self, source: PauseSource) -> bool {
        self.sources.contains(&source)
    }

    // Paused time up to `now`, the running pause included
    #[must_use]
    pub fn total_paused(&self, now: Duration) -> Duration {
        let running = self.paused_since.map_or(Duration::ZERO, |since| now.saturating_sub(since));
        self.total_paused + running
    }

    // Host time with every pause taken out
    #[must_use]
    pub fn simulated(&self, now: Duration) -> Duration {
        now.saturating_sub(self.total_paused(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn moving_body() -> Kinematics {
        Kinematics {
            velocity: Vec2::new(30.0, -40.0),
            spin_deg_per_sec: 60.0,
            ..Kinematics::default()
        }
    }

    #[test]
    fn pause_zeroes_motion_and_resume_restores_it() {
        let mut controller = PauseController::new();
        let mut body = moving_body();

        assert!(controller.pause(ms(100), PauseSource::Host, &mut body));
        assert_eq!(body.velocity, Vec2::ZERO);
        assert!(body.spin_deg_per_sec.abs() < f32::EPSILON);

        assert!(controller.resume(ms(300), PauseSource::Host, &mut body));
        assert_eq!(body, moving_body());
    }

    #[test]
    fn second_pause_keeps_the_first_snapshot() {
        let mut controller = PauseController::new();
        let mut body = moving_body();

        assert!(controller.pause(ms(0), PauseSource::Visibility, &mut body));
        // The body is already frozen; snapshotting again would lose the velocity
        assert!(!controller.pause(ms(10), PauseSource::Overlay, &mut body));
        assert!(!controller.pause(ms(15), PauseSource::Overlay, &mut body));
        assert_eq!(controller.source(), Some(PauseSource::Visibility));

        assert!(!controller.resume(ms(20), PauseSource::Overlay, &mut body));
        assert!(controller.is_paused());
        assert_eq!(body.velocity, Vec2::ZERO);

        assert!(!controller.resume(ms(25), PauseSource::Host, &mut body));
        assert!(controller.resume(ms(30), PauseSource::Visibility, &mut body));
        assert!(!controller.is_paused());
        assert_eq!(body, moving_body());
        assert_eq!(controller.total_paused(ms(30)), ms(30));
    }

    #[test]
    fn simulated_time_excludes_pauses() {
        let mut controller = PauseController::new();
        let mut body = Kinematics::default();

        controller.pause(ms(1500), PauseSource::Host, &mut body);
        assert_eq!(controller.simulated(ms(1800)), ms(1500));
        controller.resume(ms(2000), PauseSource::Host, &mut body);

        assert_eq!(controller.total_paused(ms(2500)), ms(500));
        assert_eq!(controller.simulated(ms(3500)), ms(3000));
    }
}
