//! Runner - a side-scrolling jump game engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collisions, scoring, phases)
//! - `config`: Validated game tuning
//! - `platform`: Scheduling and thread-safe engine access
//! - `persistence`: Run summaries, lifetime stats and offline score queue
//! - `highscores`: Local leaderboard

pub mod config;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod sim;

pub use config::{ConfigError, GameConfig};
pub use highscores::HighScores;
pub use sim::{Command, GameEngine, GamePhase, Snapshot};

/// Default tuning constants
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz, one tick per display frame)
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// World dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 400.0;
    /// Height of the ground strip at the bottom of the canvas
    pub const GROUND_HEIGHT: f32 = 60.0;

    /// Controlled entity
    pub const ENTITY_X: f32 = 100.0;
    pub const ENTITY_SIZE: f32 = 20.0;
    /// Upward impulse applied on jump (negative is up)
    pub const JUMP_FORCE: f32 = -14.0;
    /// Added to vertical velocity every tick
    pub const GRAVITY: f32 = 0.8;
    /// How close to the ground the entity must be to jump
    pub const JUMP_TOLERANCE: f32 = 10.0;

    /// Obstacles
    pub const OBSTACLE_WIDTH: f32 = 20.0;
    pub const OBSTACLE_MIN_HEIGHT: f32 = 30.0;
    pub const OBSTACLE_MAX_HEIGHT: f32 = 80.0;
    /// Distance before the very first obstacle appears
    pub const INITIAL_OBSTACLE_DISTANCE: f32 = 800.0;
    pub const MIN_OBSTACLE_DISTANCE: f32 = 300.0;
    pub const MAX_OBSTACLE_DISTANCE: f32 = 600.0;
    /// Per-tick spawn probability once spacing allows it
    pub const OBSTACLE_SPAWN_CHANCE: f64 = 0.02;
    /// Obstacles are culled once their trailing edge is this far left of x=0
    pub const CULL_MARGIN: f32 = 100.0;

    /// Scroll speed
    pub const BASE_SPEED: f32 = 4.0;
    pub const SPEED_STEP: f32 = 0.5;
    pub const SPEED_INCREASE_INTERVAL: u64 = 1000;
    pub const MAX_SPEED: f32 = 8.0;

    /// Scoring
    pub const DISTANCE_SCORE_MULTIPLIER: f32 = 0.1;
    pub const JUMP_SCORE_BONUS: u64 = 5;
    /// One point per this many milliseconds alive
    pub const TIME_SCORE_DIVISOR_MS: f64 = 100.0;
}
