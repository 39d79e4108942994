//! Game engine: phase state machine and the per-frame update cycle
//!
//! The engine exclusively owns the entity, obstacles and run statistics.
//! Collaborators drive it with [`Command`]s and [`GameEngine::tick`], and read
//! it through [`GameEngine::snapshot`].

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision;
use super::physics;
use super::scoring::{score, speed_for_score};
use super::spawner::{ObstacleGenerator, advance_obstacles};
use super::state::{
    AggregateStats, Entity, GameEvent, GamePhase, GameSummary, Obstacle, RunStats, Snapshot,
    WorldState,
};
use crate::config::{ConfigError, GameConfig};

/// Discrete intents from the input source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Jump,
    Pause,
    Resume,
    Reset,
}

/// One game session
#[derive(Debug, Clone)]
pub struct GameEngine<R: Rng = Pcg32> {
    config: GameConfig,
    phase: GamePhase,
    entity: Entity,
    /// Oldest first; the last element is the newest spawn
    obstacles: Vec<Obstacle>,
    world: WorldState,
    run: Option<RunStats>,
    last_summary: Option<GameSummary>,
    aggregate: AggregateStats,
    high_score: u64,
    spawner: ObstacleGenerator<R>,
    /// Simulated milliseconds, advanced only by running ticks
    clock_ms: f64,
    tick_count: u64,
    events: Vec<GameEvent>,
}

impl GameEngine<Pcg32> {
    /// Engine with a seeded PCG source
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> GameEngine<R> {
    /// Engine drawing spawn decisions and obstacle geometry from `rng`
    pub fn with_rng(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "Engine ready: {}x{} world, ground at {}",
            config.canvas_width,
            config.canvas_height,
            config.ground_line()
        );
        Ok(Self {
            entity: Entity::new(&config),
            world: WorldState::new(config.base_speed),
            phase: GamePhase::Menu,
            obstacles: Vec::new(),
            run: None,
            last_summary: None,
            aggregate: AggregateStats::default(),
            high_score: 0,
            spawner: ObstacleGenerator::new(rng),
            clock_ms: 0.0,
            tick_count: 0,
            events: Vec::new(),
            config,
        })
    }

    /// Seed lifetime stats and high score loaded by the application
    pub fn with_profile(mut self, aggregate: AggregateStats, high_score: u64) -> Self {
        self.aggregate = aggregate;
        self.high_score = high_score;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Stats of the current run, or the finalized stats after game over
    pub fn run(&self) -> Option<&RunStats> {
        self.run.as_ref()
    }

    /// Payload of the most recently finished run
    pub fn last_summary(&self) -> Option<&GameSummary> {
        self.last_summary.as_ref()
    }

    pub fn aggregate(&self) -> &AggregateStats {
        &self.aggregate
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Immutable copy of everything the renderer needs
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            entity: self.entity,
            obstacles: self.obstacles.clone(),
            world: self.world,
            high_score: self.high_score,
            run: self.run.clone(),
            tick_count: self.tick_count,
        }
    }

    /// Dispatch a command; commands invalid in the current phase are ignored
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Start => self.start(),
            Command::Jump => self.jump(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::Reset => self.reset(),
        }
    }

    /// Begin a new run from the menu or after game over
    pub fn start(&mut self) {
        if !matches!(self.phase, GamePhase::Menu | GamePhase::GameOver) {
            self.ignore(Command::Start);
            return;
        }
        self.clear_world();
        self.run = Some(RunStats::new(self.clock_ms, self.config.base_speed));
        self.last_summary = None;
        self.aggregate.total_games += 1;
        self.phase = GamePhase::Running;
        self.events.push(GameEvent::Started);
        log::info!("Run started (game #{})", self.aggregate.total_games);
    }

    /// Request a jump; accepted only while running and near the ground
    pub fn jump(&mut self) {
        if self.phase != GamePhase::Running {
            self.ignore(Command::Jump);
            return;
        }
        let accepted = physics::try_jump(
            &mut self.entity,
            self.config.jump_force,
            self.config.ground_y(),
            self.config.jump_tolerance,
        );
        if accepted {
            if let Some(run) = self.run.as_mut() {
                run.jumps += 1;
            }
            self.events.push(GameEvent::Jumped);
            log::debug!("Jump at distance {:.0}", self.world.distance_traveled);
        }
    }

    pub fn pause(&mut self) {
        if self.phase != GamePhase::Running {
            self.ignore(Command::Pause);
            return;
        }
        self.phase = GamePhase::Paused;
        self.events.push(GameEvent::Paused);
        log::info!("Paused");
    }

    pub fn resume(&mut self) {
        if self.phase != GamePhase::Paused {
            self.ignore(Command::Resume);
            return;
        }
        self.phase = GamePhase::Running;
        self.events.push(GameEvent::Resumed);
        log::info!("Resumed");
    }

    /// Discard any run and return to the menu; valid from every phase
    pub fn reset(&mut self) {
        self.clear_world();
        self.run = None;
        self.last_summary = None;
        self.phase = GamePhase::Menu;
        self.events.push(GameEvent::Reset);
        log::info!("Reset to menu");
    }

    /// Advance one frame. `dt_ms` feeds the time-alive score only; motion is
    /// per tick. No-op unless running.
    pub fn tick(&mut self, dt_ms: f64) {
        if self.phase != GamePhase::Running {
            return;
        }
        let Some(run) = self.run.as_ref() else {
            return;
        };

        let now_ms = self.clock_ms + dt_ms.max(0.0);
        let scroll = self.world.current_speed;

        // 1. Scroll the world
        let distance = self.world.distance_traveled + scroll;

        // 2. Speed ramp from the score so far
        let speed = speed_for_score(&self.config, self.world.score);

        // 3. Entity physics
        let entity = physics::advance(&self.entity, self.config.gravity, self.config.ground_y());

        // 4. Obstacles: scroll, cull, maybe spawn
        let mut obstacles = self.obstacles.clone();
        advance_obstacles(&mut obstacles, scroll, self.config.cull_margin);
        let mut spawned = None;
        if self.spawner.should_spawn(&self.config, &obstacles, distance) {
            let last_x = obstacles.last().map(|o| o.x);
            let obstacle = self
                .spawner
                .spawn(&self.config, self.config.canvas_width, last_x);
            spawned = Some((obstacle.id, obstacle.x, obstacle.height));
            obstacles.push(obstacle);
        }

        // 5. Score
        let time_alive_ms = now_ms - run.start_time_ms;
        let new_score = score(&self.config, distance, run.jumps, time_alive_ms);

        // 6. Obstacles cleared by the entity
        let mut passed = Vec::new();
        for obstacle in obstacles.iter_mut().filter(|o| !o.scored) {
            if obstacle.trailing_edge() < entity.x {
                obstacle.scored = true;
                passed.push(obstacle.id);
            }
        }

        self.clock_ms = now_ms;
        self.tick_count += 1;

        // 7. Collisions; a hit ends the run with the last committed frame on screen
        let hits = collision::hits(&entity, &obstacles);
        if !hits.is_empty() {
            for &id in &hits {
                if let Some(obstacle) = obstacles.iter().find(|o| o.id == id) {
                    let offset = collision::collision_offset(&entity, obstacle);
                    let depth = collision::penetration(&entity, obstacle).unwrap_or_default();
                    log::info!(
                        "Hit obstacle {} at x={:.1}, offset ({:.1}, {:.1}), depth {:.1}x{:.1}",
                        id,
                        obstacle.x,
                        offset.x,
                        offset.y,
                        depth.x,
                        depth.y
                    );
                }
                self.events.push(GameEvent::Collision { id });
            }
            self.game_over();
            return;
        }

        // Commit
        let prev_second = (time_alive_ms - dt_ms.max(0.0)) / 1000.0;
        if prev_second.floor() != (time_alive_ms / 1000.0).floor() {
            log::debug!(
                "Score {}, distance {:.0}, speed {:.1}, jumps {}",
                new_score,
                distance,
                speed,
                run.jumps
            );
        }

        if let Some((id, x, height)) = spawned {
            log::debug!("Obstacle {} spawned at x={:.0}, height {:.1}", id, x, height);
            self.events.push(GameEvent::ObstacleSpawned { id, x, height });
        }

        let Some(run) = self.run.as_mut() else {
            return;
        };
        for id in passed {
            run.obstacles_passed += 1;
            log::debug!("Obstacle {} passed ({} total)", id, run.obstacles_passed);
            self.events.push(GameEvent::ObstaclePassed {
                id,
                total: run.obstacles_passed,
            });
        }
        run.max_speed = run.max_speed.max(speed);

        self.entity = entity;
        self.obstacles = obstacles;
        self.world = WorldState {
            distance_traveled: distance,
            current_speed: speed,
            score: new_score,
        };
        log::trace!(
            "Tick {}: y={:.1} obstacles={}",
            self.tick_count,
            self.entity.y,
            self.obstacles.len()
        );
    }

    /// Finalize the run and fold it into lifetime stats
    fn game_over(&mut self) {
        let Some(run) = self.run.as_ref() else {
            return;
        };
        let summary = run.summary(self.clock_ms, self.world.distance_traveled);
        let final_score = self.world.score;

        self.aggregate.record_run(final_score, &summary);
        if final_score > self.high_score {
            log::info!("New high score {} (was {})", final_score, self.high_score);
            self.events.push(GameEvent::NewHighScore {
                score: final_score,
                previous: self.high_score,
            });
            self.high_score = final_score;
        }

        log::info!(
            "Game over: score {}, distance {}, jumps {}, passed {}",
            final_score,
            summary.distance_traveled,
            summary.jumps,
            summary.obstacles_passed
        );
        self.phase = GamePhase::GameOver;
        self.events.push(GameEvent::GameOver {
            score: final_score,
            summary: summary.clone(),
        });
        self.last_summary = Some(summary);
    }

    fn clear_world(&mut self) {
        self.entity = Entity::new(&self.config);
        self.obstacles.clear();
        self.world = WorldState::new(self.config.base_speed);
    }

    fn ignore(&self, command: Command) {
        log::debug!("Ignoring {:?} in {:?}", command, self.phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT_MS;

    fn engine() -> GameEngine {
        GameEngine::new(GameConfig::default(), 12345).expect("default config is valid")
    }

    /// Engine that never spawns beyond the first obstacle
    fn quiet_engine() -> GameEngine {
        let config = GameConfig {
            spawn_chance: 0.0,
            ..Default::default()
        };
        GameEngine::new(config, 7).expect("valid config")
    }

    #[test]
    fn test_starts_in_menu() {
        let engine = engine();
        assert_eq!(engine.phase(), GamePhase::Menu);
        assert!(engine.run().is_none());
        assert!(engine.obstacles().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GameConfig {
            obstacle_max_height: 500.0,
            ..Default::default()
        };
        assert!(matches!(
            GameEngine::new(config, 1),
            Err(ConfigError::Unjumpable { .. })
        ));

        // Caught here rather than at the first spawn
        let config = GameConfig {
            max_obstacle_distance: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            GameEngine::new(config, 1),
            Err(ConfigError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_start_creates_run() {
        let mut engine = engine();
        engine.start();
        assert_eq!(engine.phase(), GamePhase::Running);
        assert_eq!(engine.aggregate().total_games, 1);
        let run = engine.run().expect("run exists");
        assert_eq!(run.jumps, 0);
        assert_eq!(run.max_speed, 4.0);
        assert_eq!(engine.drain_events(), vec![GameEvent::Started]);
    }

    #[test]
    fn test_ticks_ignored_outside_running() {
        let mut engine = engine();
        engine.tick(SIM_DT_MS);
        assert_eq!(engine.snapshot().tick_count, 0);

        engine.start();
        engine.tick(SIM_DT_MS);
        engine.pause();
        let frozen = engine.snapshot();
        for _ in 0..10 {
            engine.tick(SIM_DT_MS);
        }
        assert_eq!(engine.snapshot(), frozen);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut engine = engine();
        engine.start();
        engine.pause();
        engine.pause();
        assert_eq!(engine.phase(), GamePhase::Paused);
        engine.resume();
        assert_eq!(engine.phase(), GamePhase::Running);
        engine.resume();
        assert_eq!(engine.phase(), GamePhase::Running);
    }

    #[test]
    fn test_commands_ignored_in_wrong_phase() {
        let mut engine = engine();
        engine.apply(Command::Jump);
        engine.apply(Command::Pause);
        engine.apply(Command::Resume);
        assert_eq!(engine.phase(), GamePhase::Menu);
        assert!(engine.drain_events().is_empty());

        engine.start();
        engine.start();
        assert_eq!(engine.aggregate().total_games, 1);
    }

    #[test]
    fn test_jump_counts_only_when_accepted() {
        let mut engine = engine();
        engine.start();
        engine.jump();
        assert!(engine.entity().is_jumping);
        assert_eq!(engine.entity().velocity_y, -14.0);
        for _ in 0..5 {
            engine.tick(SIM_DT_MS);
        }
        // Mid-air, well above tolerance
        engine.jump();
        assert_eq!(engine.run().map(|r| r.jumps), Some(1));
    }

    #[test]
    fn test_distance_and_speed_progress() {
        let mut engine = engine();
        engine.start();
        let mut last_distance = 0.0;
        let mut last_speed = engine.world().current_speed;
        for _ in 0..50 {
            engine.tick(SIM_DT_MS);
            if engine.phase() != GamePhase::Running {
                break;
            }
            assert!(engine.world().distance_traveled > last_distance);
            assert!(engine.world().current_speed >= last_speed);
            last_distance = engine.world().distance_traveled;
            last_speed = engine.world().current_speed;
        }
        assert_eq!(engine.world().distance_traveled, 200.0);
    }

    #[test]
    fn test_speed_ramps_to_cap_and_resets() {
        let config = GameConfig {
            speed_increase_interval: 10,
            spawn_chance: 0.0,
            initial_obstacle_distance: 100_000.0,
            ..Default::default()
        };
        let mut engine = GameEngine::new(config.clone(), 3).unwrap();
        engine.start();

        let mut last_speed = config.base_speed;
        let mut ramped = false;
        for _ in 0..1000 {
            let prev_score = engine.world().score;
            engine.tick(SIM_DT_MS);
            assert_eq!(engine.phase(), GamePhase::Running);

            let speed = engine.world().current_speed;
            assert!(speed >= last_speed, "speed dropped {last_speed} -> {speed}");
            assert_eq!(speed, speed_for_score(&config, prev_score));
            assert!(speed <= config.max_speed);
            assert_eq!(engine.run().map(|r| r.max_speed), Some(speed));
            ramped |= speed > config.base_speed && speed < config.max_speed;
            last_speed = speed;
            if speed == config.max_speed {
                break;
            }
        }
        assert!(ramped, "never saw an intermediate speed");
        assert_eq!(last_speed, config.max_speed);

        // Stays capped
        for _ in 0..60 {
            engine.tick(SIM_DT_MS);
        }
        assert_eq!(engine.world().current_speed, config.max_speed);
        assert_eq!(engine.run().map(|r| r.max_speed), Some(config.max_speed));

        engine.reset();
        engine.start();
        assert_eq!(engine.world().current_speed, config.base_speed);
        assert_eq!(engine.run().map(|r| r.max_speed), Some(config.base_speed));
        engine.tick(SIM_DT_MS);
        assert_eq!(engine.world().distance_traveled, config.base_speed);
    }

    #[test]
    fn test_no_obstacle_before_initial_distance() {
        let mut engine = quiet_engine();
        engine.start();
        // 200 ticks at speed 4 reaches exactly 800, not beyond
        for _ in 0..200 {
            engine.tick(SIM_DT_MS);
            assert!(engine.obstacles().is_empty());
        }
        engine.tick(SIM_DT_MS);
        assert_eq!(engine.obstacles().len(), 1);
        assert_eq!(engine.obstacles()[0].x, 800.0);
    }

    #[test]
    fn test_collision_ends_run() {
        let mut engine = quiet_engine();
        engine.start();
        let mut ticks = 0;
        while engine.phase() == GamePhase::Running && ticks < 1000 {
            engine.tick(SIM_DT_MS);
            ticks += 1;
        }
        assert_eq!(engine.phase(), GamePhase::GameOver);

        let summary = engine.last_summary().expect("summary recorded").clone();
        assert_eq!(summary.jumps, 0);
        assert_eq!(summary.obstacles_passed, 0);
        assert_eq!(summary.obstacles_hit, 0);

        let events = engine.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::Collision { .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));

        // The frame of death is not committed: no drawn obstacle overlaps yet
        let snapshot = engine.snapshot();
        assert!(collision::hits(&snapshot.entity, &snapshot.obstacles).is_empty());

        // Ticks after game over do nothing
        let frozen = engine.snapshot();
        engine.tick(SIM_DT_MS);
        assert_eq!(engine.snapshot(), frozen);
    }

    #[test]
    fn test_game_over_updates_aggregate_and_high_score() {
        let mut engine = quiet_engine().with_profile(
            AggregateStats {
                total_games: 4,
                total_score: 1000,
                ..Default::default()
            },
            10,
        );
        engine.start();
        while engine.phase() == GamePhase::Running {
            engine.tick(SIM_DT_MS);
        }
        let score = engine.world().score;
        assert!(score > 10);
        assert_eq!(engine.high_score(), score);
        assert_eq!(engine.aggregate().total_games, 5);
        assert_eq!(engine.aggregate().total_score, 1000 + score);
        assert!(engine.drain_events().contains(&GameEvent::NewHighScore {
            score,
            previous: 10
        }));
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut engine = quiet_engine();
        engine.start();
        while engine.phase() == GamePhase::Running {
            engine.tick(SIM_DT_MS);
        }
        engine.start();
        assert_eq!(engine.phase(), GamePhase::Running);
        assert!(engine.obstacles().is_empty());
        assert_eq!(engine.world().distance_traveled, 0.0);
        assert_eq!(engine.world().current_speed, 4.0);
        assert!(engine.last_summary().is_none());
        assert_eq!(engine.aggregate().total_games, 2);
    }

    #[test]
    fn test_reset_from_every_phase() {
        let mut engine = quiet_engine();
        let fresh = Entity::new(engine.config());

        engine.reset();
        assert_eq!(engine.phase(), GamePhase::Menu);

        engine.start();
        engine.jump();
        engine.tick(SIM_DT_MS);
        engine.reset();
        assert_eq!(engine.phase(), GamePhase::Menu);
        assert_eq!(*engine.entity(), fresh);
        assert!(engine.run().is_none());

        engine.start();
        engine.pause();
        engine.reset();
        assert_eq!(engine.phase(), GamePhase::Menu);

        engine.start();
        while engine.phase() == GamePhase::Running {
            engine.tick(SIM_DT_MS);
        }
        engine.reset();
        assert_eq!(engine.phase(), GamePhase::Menu);
        assert!(engine.obstacles().is_empty());
        assert_eq!(*engine.entity(), fresh);
    }

    #[test]
    fn test_jumping_clears_obstacle() {
        let mut engine = quiet_engine();
        engine.start();
        // The obstacle spawns at x=800 and reaches the entity around tick 370.
        // Taking off 50-80 units early keeps the apex over the whole overlap window.
        let mut ticks = 0;
        while engine.run().map(|r| r.obstacles_passed) == Some(0) && ticks < 600 {
            let near = engine.obstacles().iter().any(|o| {
                let gap = o.x - engine.entity().x;
                gap > 50.0 && gap < 80.0
            });
            if near {
                engine.jump();
            }
            engine.tick(SIM_DT_MS);
            assert_eq!(engine.phase(), GamePhase::Running, "hit at tick {ticks}");
            ticks += 1;
        }
        assert_eq!(engine.run().map(|r| r.obstacles_passed), Some(1));
        assert!(engine.obstacles()[0].scored);
        let events = engine.drain_events();
        assert!(events.contains(&GameEvent::ObstaclePassed {
            id: engine.obstacles()[0].id,
            total: 1
        }));
    }

    #[test]
    fn test_determinism() {
        let mut a = engine();
        let mut b = engine();
        a.start();
        b.start();
        for i in 0..2000 {
            if i % 37 == 0 {
                a.jump();
                b.jump();
            }
            a.tick(SIM_DT_MS);
            b.tick(SIM_DT_MS);
        }
        assert_eq!(a.snapshot(), b.snapshot());
    }
}
