//! Boss attack-pattern scheduling for a bullet-hell encounter.
//!
//! A boss is data ([`BossDefinition`]): a table of timed phases whose enter actions arm
//! emitters, move the body or spin it. [`BossActor`] runs that table on a clock pushed
//! by the host, spawning projectiles through the host's [`ProjectilePool`] and aiming
//! at whatever [`AimTarget`] reports. Pausing freezes every timer with its remaining
//! time intact.

pub mod actions;
pub mod actor;
pub mod bosses;
pub mod constants;
pub mod definition;
pub mod motion;
pub mod patterns;
pub mod pause;
pub mod phase;
pub mod playfield;
pub mod pool;
pub mod registry;
pub mod timer;

pub use actions::{Cadence, EmitterSpec, Motion, PhaseAction};
pub use actor::{BossActor, BossEvent};
pub use definition::{BossDefinition, HealthTrigger};
pub use pause::PauseSource;
pub use phase::{BranchRule, Phase, PhaseId};
pub use playfield::Playfield;
pub use pool::{AimTarget, ProjectileHandle, ProjectileKind, ProjectilePool, RecordingPool, SpawnRequest};
