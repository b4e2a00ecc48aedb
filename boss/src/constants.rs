// ============================================================================
// Arena
// ============================================================================

pub const ARENA_WIDTH: f32 = 1280.0; // pixels
pub const ARENA_HEIGHT: f32 = 720.0; // pixels

// ============================================================================
// Floating-Point Comparisons
// ============================================================================

// Small value for near-zero checks (distance guards, degenerate aim vectors).
pub const GEOMETRY_EPSILON: f32 = 1e-4;

// ============================================================================
// Timers
// ============================================================================

// Shortest interval a repeating timer may use. Zero would re-fire forever within one tick.
pub const MIN_REPEAT_INTERVAL_MS: u64 = 1;

// Shortest phase. A zero-length phase table would cycle forever within one tick.
pub const MIN_PHASE_DURATION_MS: u64 = 1;

// ============================================================================
// Fan Pattern
// ============================================================================

pub const FAN_WIDTH_DEG: f32 = 60.0;
pub const FAN_BULLETS: u32 = 5;
pub const FAN_SPEED: f32 = 400.0; // pixels per second
pub const FAN_ERROR_DEG: f32 = 5.0; // ± degrees per projectile
pub const FAN_INTERVAL_MS: u64 = 1800;

// ============================================================================
// Flurry Pattern
// ============================================================================

pub const FLURRY_INTERVAL_MS: u64 = 100;
pub const FLURRY_SPEED: f32 = 300.0;
pub const FLURRY_ERROR_DEG: f32 = 45.0;
pub const FLURRY_LIFETIME_MS: u64 = 3000;

// ============================================================================
// Wall Volley Pattern
// ============================================================================

pub const WALL_SPACING: f32 = 32.0; // pixels between spawns along an edge
pub const WALL_EDGE_DELAY_MS: u64 = 1800; // between edges
pub const WALL_SHOT_DELAY_MS: u64 = 50; // between shots on one edge
pub const WALL_SPAWN_OFFSET: f32 = 10.0; // pixels outside the arena
pub const WALL_SPEED: f32 = 200.0;

// ============================================================================
// Radial Burst Pattern
// ============================================================================

pub const RADIAL_INTERVAL_MS: u64 = 400;
pub const RADIAL_COUNT: u32 = 6;
pub const RADIAL_SPEED: f32 = 250.0;

// ============================================================================
// Vertical Stream Pattern
// ============================================================================

pub const STREAM_INTERVAL_MS: u64 = 150;
pub const STREAM_SPEED: f32 = 300.0;
pub const STREAM_SPAWN_OFFSET: f32 = 10.0;

// ============================================================================
// Single Shots
// ============================================================================

pub const AIMED_INTERVAL_MS: u64 = 500;
pub const AIMED_SHOTS: u32 = 10;
pub const AIMED_SPEED: f32 = 200.0;
pub const AIMED_LIFETIME_MS: u64 = 3000;

pub const STRAIGHT_INTERVAL_MS: u64 = 1500;
pub const STRAIGHT_SPEED: f32 = 200.0;

pub const SPECIAL_SPEED: f32 = 250.0;

// ============================================================================
// Boss Bodies
// ============================================================================

pub const STAR_SPEED: f32 = 100.0;
pub const STAR_FLAIR_SPIN: f32 = 90.0; // degrees per second, always on
pub const STAR_HEALTH: f32 = 1000.0;
pub const STAR_SPAWN_X: f32 = 640.0;
pub const STAR_SPAWN_Y: f32 = -60.0;

pub const TRINITY_SPEED: f32 = 120.0;
pub const TRINITY_SPIN: f32 = 60.0;
pub const TRINITY_HEALTH: f32 = 500.0;
pub const TRINITY_INTRO_DRIFT: f32 = 50.0;
pub const TRINITY_SPAWN_X: f32 = 640.0;
pub const TRINITY_SPAWN_Y: f32 = -80.0;

// ============================================================================
// Health Thresholds
// ============================================================================

// Share of max health below which the star boss abandons its cycle for good
pub const STAR_ENRAGE_HEALTH_FRACTION: f32 = 0.25;
