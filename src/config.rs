//! Game tuning and validation
//!
//! All values are fixed when an engine is constructed and stay immutable for
//! the engine's lifetime. A bad configuration is rejected up front so that an
//! unjumpable obstacle can never show up mid-run.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::physics::jump_apex;

/// Configuration rejected by [`GameConfig::validate`]
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// NaN or infinite value
    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    /// A size or distance that must be strictly positive is not
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    /// Ground strip does not leave room for the entity inside the canvas
    #[error("ground height {ground} leaves no room for entity size {size} in canvas {canvas}")]
    GroundOutOfCanvas { ground: f32, size: f32, canvas: f32 },
    /// Jump force must point upward (negative)
    #[error("jump force must be negative (upward), got {0}")]
    JumpNotUpward(f32),
    /// A `[min, max]` pair is inverted
    #[error("{field}: min {min} exceeds max {max}")]
    InvertedRange { field: &'static str, min: f64, max: f64 },
    /// Tallest obstacle cannot be cleared by a full jump
    #[error("obstacle height {height} is unjumpable (jump apex is {apex})")]
    Unjumpable { height: f32, apex: f32 },
    /// Spawn probability outside [0, 1]
    #[error("spawn chance must be within [0, 1], got {0}")]
    SpawnChance(f64),
    /// Negative margin or tolerance
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    /// Config file could not be parsed
    #[error("invalid config json: {0}")]
    Parse(String),
}

/// Engine tuning, fixed at construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === World ===
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Height of the ground strip; the ground line sits at `canvas_height - ground_height`
    pub ground_height: f32,

    // === Entity ===
    pub entity_x: f32,
    pub entity_size: f32,
    pub jump_force: f32,
    pub gravity: f32,
    pub jump_tolerance: f32,

    // === Obstacles ===
    pub obstacle_width: f32,
    pub obstacle_min_height: f32,
    pub obstacle_max_height: f32,
    pub initial_obstacle_distance: f32,
    pub min_obstacle_distance: f32,
    pub max_obstacle_distance: f32,
    pub spawn_chance: f64,
    pub cull_margin: f32,

    // === Speed ramp ===
    pub base_speed: f32,
    pub speed_step: f32,
    pub speed_increase_interval: u64,
    pub max_speed: f32,

    // === Scoring ===
    pub distance_multiplier: f32,
    pub jump_bonus: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            ground_height: GROUND_HEIGHT,

            entity_x: ENTITY_X,
            entity_size: ENTITY_SIZE,
            jump_force: JUMP_FORCE,
            gravity: GRAVITY,
            jump_tolerance: JUMP_TOLERANCE,

            obstacle_width: OBSTACLE_WIDTH,
            obstacle_min_height: OBSTACLE_MIN_HEIGHT,
            obstacle_max_height: OBSTACLE_MAX_HEIGHT,
            initial_obstacle_distance: INITIAL_OBSTACLE_DISTANCE,
            min_obstacle_distance: MIN_OBSTACLE_DISTANCE,
            max_obstacle_distance: MAX_OBSTACLE_DISTANCE,
            spawn_chance: OBSTACLE_SPAWN_CHANCE,
            cull_margin: CULL_MARGIN,

            base_speed: BASE_SPEED,
            speed_step: SPEED_STEP,
            speed_increase_interval: SPEED_INCREASE_INTERVAL,
            max_speed: MAX_SPEED,

            distance_multiplier: DISTANCE_SCORE_MULTIPLIER,
            jump_bonus: JUMP_SCORE_BONUS,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Y coordinate of the ground surface (obstacle bases rest here)
    #[inline]
    pub fn ground_line(&self) -> f32 {
        self.canvas_height - self.ground_height
    }

    /// Resting Y of the entity's top edge
    #[inline]
    pub fn ground_y(&self) -> f32 {
        self.ground_line() - self.entity_size
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite: [(&'static str, f64); 20] = [
            ("canvas_width", self.canvas_width as f64),
            ("canvas_height", self.canvas_height as f64),
            ("ground_height", self.ground_height as f64),
            ("entity_x", self.entity_x as f64),
            ("entity_size", self.entity_size as f64),
            ("jump_force", self.jump_force as f64),
            ("gravity", self.gravity as f64),
            ("jump_tolerance", self.jump_tolerance as f64),
            ("obstacle_width", self.obstacle_width as f64),
            ("obstacle_min_height", self.obstacle_min_height as f64),
            ("obstacle_max_height", self.obstacle_max_height as f64),
            ("initial_obstacle_distance", self.initial_obstacle_distance as f64),
            ("min_obstacle_distance", self.min_obstacle_distance as f64),
            ("max_obstacle_distance", self.max_obstacle_distance as f64),
            ("spawn_chance", self.spawn_chance),
            ("cull_margin", self.cull_margin as f64),
            ("base_speed", self.base_speed as f64),
            ("speed_step", self.speed_step as f64),
            ("max_speed", self.max_speed as f64),
            ("distance_multiplier", self.distance_multiplier as f64),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        let positive: [(&'static str, f64); 9] = [
            ("canvas_width", self.canvas_width as f64),
            ("canvas_height", self.canvas_height as f64),
            ("entity_size", self.entity_size as f64),
            ("gravity", self.gravity as f64),
            ("obstacle_width", self.obstacle_width as f64),
            ("obstacle_min_height", self.obstacle_min_height as f64),
            ("base_speed", self.base_speed as f64),
            ("speed_increase_interval", self.speed_increase_interval as f64),
            ("min_obstacle_distance", self.min_obstacle_distance as f64),
        ];
        for (field, value) in positive {
            // NaN fails this check too
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }

        let non_negative: [(&'static str, f64); 5] = [
            ("ground_height", self.ground_height as f64),
            ("jump_tolerance", self.jump_tolerance as f64),
            ("cull_margin", self.cull_margin as f64),
            ("initial_obstacle_distance", self.initial_obstacle_distance as f64),
            ("speed_step", self.speed_step as f64),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if self.ground_y() < 0.0 {
            return Err(ConfigError::GroundOutOfCanvas {
                ground: self.ground_height,
                size: self.entity_size,
                canvas: self.canvas_height,
            });
        }

        if !(self.jump_force < 0.0) {
            return Err(ConfigError::JumpNotUpward(self.jump_force));
        }

        if self.obstacle_min_height > self.obstacle_max_height {
            return Err(ConfigError::InvertedRange {
                field: "obstacle height",
                min: self.obstacle_min_height as f64,
                max: self.obstacle_max_height as f64,
            });
        }
        if self.min_obstacle_distance > self.max_obstacle_distance {
            return Err(ConfigError::InvertedRange {
                field: "obstacle distance",
                min: self.min_obstacle_distance as f64,
                max: self.max_obstacle_distance as f64,
            });
        }
        if self.base_speed > self.max_speed {
            return Err(ConfigError::InvertedRange {
                field: "speed",
                min: self.base_speed as f64,
                max: self.max_speed as f64,
            });
        }

        if !(0.0..=1.0).contains(&self.spawn_chance) {
            return Err(ConfigError::SpawnChance(self.spawn_chance));
        }

        let apex = jump_apex(self.jump_force, self.gravity);
        if apex <= self.obstacle_max_height {
            return Err(ConfigError::Unjumpable {
                height: self.obstacle_max_height,
                apex,
            });
        }

        Ok(())
    }
}
