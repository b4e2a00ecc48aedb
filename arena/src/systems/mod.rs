pub mod actor;
pub mod events;
pub mod projectiles;
pub mod script;

pub use actor::boss_update_system;
pub use events::{boss_events_system, encounter_clock_system};
pub use projectiles::projectiles_system;
pub use script::{damage_system, host_script_system, target_system};
