//! Gameplay constants. Units are playfield pixels and ticks.

// ── Playfield ───────────────────────────────────────────────────────────────

pub const FIELD_WIDTH: f64 = 480.0;
pub const FIELD_HEIGHT: f64 = 640.0;
pub const GROUND_HEIGHT: f64 = 60.0;
/// Top edge of the ground strip.
pub const FLOOR_Y: f64 = FIELD_HEIGHT - GROUND_HEIGHT;

// ── Player ──────────────────────────────────────────────────────────────────

pub const PLAYER_X: f64 = 120.0;
pub const PLAYER_START_Y: f64 = 320.0;
pub const PLAYER_SIZE: f64 = 30.0;
/// Inset applied to every side of the player box for collision tests.
pub const HITBOX_PADDING: f64 = 4.0;

// ── Physics ─────────────────────────────────────────────────────────────────

pub const GRAVITY: f64 = 0.6;
pub const FLAP_VELOCITY: f64 = -10.0;
pub const MAX_FALL_SPEED: f64 = 12.0;
pub const ROTATION_SCALE: f64 = 0.08;
pub const MIN_TILT: f64 = -0.5;
pub const MAX_TILT: f64 = 0.8;
/// Extra rotation per tick while tumbling after death.
pub const DEATH_SPIN: f64 = 0.15;

// ── Obstacles ───────────────────────────────────────────────────────────────

pub const OBSTACLE_WIDTH: f64 = 60.0;
/// Minimum height of either barrier.
pub const OBSTACLE_MIN_HEIGHT: f64 = 100.0;
pub const TORII_CHANCE: f64 = 0.15;

pub const INITIAL_SPEED: f64 = 3.0;
pub const SPEED_STEP: f64 = 0.2;
pub const MAX_SPEED: f64 = 6.0;

pub const INITIAL_GAP: f64 = 200.0;
pub const GAP_STEP: f64 = 5.0;
pub const MIN_GAP: f64 = 140.0;

pub const SPAWN_INTERVAL: u64 = 100;
pub const RAMP_INTERVAL: u64 = 500;

// ── Particles ───────────────────────────────────────────────────────────────

pub const PARTICLE_GRAVITY: f64 = 0.3;

// ── Timers (ticks at a nominal 60 Hz) ───────────────────────────────────────

/// Post-death fall stops once this many ticks have passed.
pub const DEATH_FALL_TICKS: u32 = 50;
/// Delay before the game-over summary is shown (~800ms).
pub const REVEAL_DELAY_TICKS: u32 = 48;
/// Restart input is ignored for this long after the reveal (~500ms).
pub const RESTART_DEBOUNCE_TICKS: u32 = 30;
