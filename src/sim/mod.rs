//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Per-tick integration only (the tick is the unit of motion)
//! - Injected, seedable RNG only
//! - Stable obstacle order (oldest first)
//! - No rendering, storage or platform dependencies

pub mod collision;
pub mod geometry;
pub mod physics;
pub mod scoring;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{hits, intersects, penetration};
pub use geometry::Aabb;
pub use physics::{advance, jump_apex, try_jump};
pub use scoring::{score, speed_for_score};
pub use spawner::{ObstacleGenerator, advance_obstacles};
pub use state::{
    AggregateStats, Entity, GameEvent, GamePhase, GameSummary, Obstacle, RunStats, Snapshot,
    WorldState,
};
pub use tick::{Command, GameEngine};
