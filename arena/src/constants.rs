// ============================================================================
// Arena Loop
// ============================================================================

pub const DEFAULT_TICK_HZ: u64 = 60;
pub const DEFAULT_RUN_SECS: f32 = 200.0; // long enough for the star boss to enrage
pub const LOG_FILTER: &str = "wgpu=error,naga=warn";

// ============================================================================
// Projectile Pool
// ============================================================================

pub const DEFAULT_POOL_CAPACITY: usize = 600;
// Projectiles further than this outside the playfield are culled
pub const CULL_MARGIN: f32 = 40.0; // pixels
// Anything this far out can never come back and is released regardless of its flags
pub const WORLD_MARGIN: f32 = 400.0; // pixels

// ============================================================================
// Scripted Player
// ============================================================================

// The aim target circles the lower half of the playfield
pub const TARGET_ORBIT_CENTER_X: f32 = 640.0;
pub const TARGET_ORBIT_CENTER_Y: f32 = 540.0;
pub const TARGET_ORBIT_RADIUS: f32 = 180.0; // pixels
pub const TARGET_ORBIT_SPEED: f32 = 0.6; // radians per second
pub const TARGET_HIT_RADIUS: f32 = 12.0; // pixels

// ============================================================================
// Reporting
// ============================================================================

pub const REPORT_INTERVAL_SECS: u64 = 10;
