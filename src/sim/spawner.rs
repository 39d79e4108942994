//! Obstacle generation, scrolling and culling
//!
//! Spawning is gated twice: a hard spacing floor measured from the screen's
//! right edge to the newest obstacle, then a small per-tick probability. The
//! result is a geometric inter-arrival time with a minimum gap.

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::Obstacle;
use crate::config::GameConfig;

/// Produces obstacles with randomized geometry from an injected RNG
#[derive(Debug, Clone)]
pub struct ObstacleGenerator<R: Rng = Pcg32> {
    rng: R,
    next_id: u32,
}

impl<R: Rng> ObstacleGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, next_id: 1 }
    }

    /// Decide whether a new obstacle should appear this tick
    pub fn should_spawn(
        &mut self,
        config: &GameConfig,
        obstacles: &[Obstacle],
        distance_traveled: f32,
    ) -> bool {
        match obstacles.last() {
            None => distance_traveled > config.initial_obstacle_distance,
            Some(newest) => {
                let gap = config.canvas_width - newest.x;
                gap > config.min_obstacle_distance && self.rng.random_bool(config.spawn_chance)
            }
        }
    }

    /// Create an obstacle at or beyond the right edge of the screen.
    ///
    /// `last_spawn_x` is the current x of the newest live obstacle, if any;
    /// the new one is placed a random spacing further right of it.
    pub fn spawn(
        &mut self,
        config: &GameConfig,
        canvas_width: f32,
        last_spawn_x: Option<f32>,
    ) -> Obstacle {
        let spacing = self
            .rng
            .random_range(config.min_obstacle_distance..=config.max_obstacle_distance);
        let x = match last_spawn_x {
            Some(last) => canvas_width.max(last + spacing),
            None => canvas_width,
        };

        let height = self
            .rng
            .random_range(config.obstacle_min_height..=config.obstacle_max_height);

        let id = self.next_id;
        self.next_id += 1;

        Obstacle {
            id,
            x,
            y: config.ground_line() - height,
            width: config.obstacle_width,
            height,
            scored: false,
        }
    }
}

/// Scroll obstacles left by `speed` and drop those fully past the cull margin
pub fn advance_obstacles(obstacles: &mut Vec<Obstacle>, speed: f32, cull_margin: f32) {
    for obstacle in obstacles.iter_mut() {
        obstacle.x -= speed;
    }
    obstacles.retain(|o| o.trailing_edge() > -cull_margin);
}
