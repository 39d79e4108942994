//! Game state and core simulation types

use serde::{Deserialize, Serialize};

use super::geometry::Aabb;
use crate::config::GameConfig;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, no run in progress
    #[default]
    Menu,
    /// Active gameplay
    Running,
    /// Run frozen, ticks are ignored
    Paused,
    /// Run ended by a collision
    GameOver,
}

/// The controlled actor. Its x never changes; the world scrolls instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub x: f32,
    /// Top edge, never below the ground Y
    pub y: f32,
    pub velocity_y: f32,
    pub size: f32,
    /// True from jump initiation until ground contact
    pub is_jumping: bool,
}

impl Entity {
    /// Entity standing on the ground
    pub fn new(config: &GameConfig) -> Self {
        Self {
            x: config.entity_x,
            y: config.ground_y(),
            velocity_y: 0.0,
            size: config.entity_size,
            is_jumping: false,
        }
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.size, self.size)
    }
}

/// A ground obstacle scrolling toward the entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    /// Unique per spawned instance
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Set once the trailing edge has passed the entity
    pub scored: bool,
}

impl Obstacle {
    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }

    /// X of the trailing (right) edge
    #[inline]
    pub fn trailing_edge(&self) -> f32 {
        self.x + self.width
    }
}

/// Per-run statistics, created on start and finalized on game over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Engine clock (ms) when the run started
    pub start_time_ms: f64,
    pub jumps: u32,
    /// Reserved; no code path counts hits yet
    pub obstacles_hit: u32,
    pub obstacles_passed: u32,
    pub max_speed: f32,
}

impl RunStats {
    pub fn new(start_time_ms: f64, base_speed: f32) -> Self {
        Self {
            start_time_ms,
            jumps: 0,
            obstacles_hit: 0,
            obstacles_passed: 0,
            max_speed: base_speed,
        }
    }

    /// Build the upstream payload for a finished run
    pub fn summary(&self, now_ms: f64, distance_traveled: f32) -> GameSummary {
        GameSummary {
            duration_ms: (now_ms - self.start_time_ms).max(0.0) as u64,
            jumps: self.jumps,
            obstacles_hit: self.obstacles_hit,
            obstacles_passed: self.obstacles_passed,
            distance_traveled: distance_traveled.floor() as u64,
            max_speed: self.max_speed,
        }
    }
}

/// Lifetime statistics across runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregateStats {
    pub total_games: u64,
    pub total_score: u64,
    pub total_jumps: u64,
    /// Most obstacles passed in a single run
    pub best_streak: u32,
    pub total_distance: u64,
}

impl AggregateStats {
    /// Fold a finished run in. `total_games` is counted at start, not here.
    pub fn record_run(&mut self, score: u64, summary: &GameSummary) {
        self.total_score += score;
        self.total_jumps += summary.jumps as u64;
        self.total_distance += summary.distance_traveled;
        self.best_streak = self.best_streak.max(summary.obstacles_passed);
    }
}

/// Finalized run payload handed to persistence on game over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub duration_ms: u64,
    pub jumps: u32,
    pub obstacles_hit: u32,
    pub obstacles_passed: u32,
    /// Floored to whole units
    pub distance_traveled: u64,
    pub max_speed: f32,
}

/// Scroll state recomputed every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub distance_traveled: f32,
    pub current_speed: f32,
    pub score: u64,
}

impl WorldState {
    pub fn new(base_speed: f32) -> Self {
        Self {
            distance_traveled: 0.0,
            current_speed: base_speed,
            score: 0,
        }
    }
}

/// Immutable copy of engine state for the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub entity: Entity,
    pub obstacles: Vec<Obstacle>,
    pub world: WorldState,
    pub high_score: u64,
    pub run: Option<RunStats>,
    /// Ticks applied since the engine was created
    pub tick_count: u64,
}

/// Notable things that happened during a command or tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started,
    Jumped,
    Paused,
    Resumed,
    Reset,
    ObstacleSpawned { id: u32, x: f32, height: f32 },
    ObstaclePassed { id: u32, total: u32 },
    Collision { id: u32 },
    GameOver { score: u64, summary: GameSummary },
    NewHighScore { score: u64, previous: u64 },
}
