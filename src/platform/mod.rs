//! Platform glue between the engine and its host
//!
//! - `FrameScheduler`: turns variable frame times into fixed engine ticks
//! - `SharedEngine`: one engine shared between an input thread, a tick loop
//!   and a renderer, with whole-engine locking and published snapshots

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::{MAX_SUBSTEPS, SIM_DT_MS};
use crate::sim::{Command, GameEngine, GameEvent, Snapshot};

/// Longest frame accepted before clamping (ms)
const MAX_FRAME_MS: f64 = 100.0;

/// Fixed-step accumulator
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    step_ms: f64,
    max_substeps: u32,
    accumulator: f64,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(SIM_DT_MS, MAX_SUBSTEPS)
    }
}

impl FrameScheduler {
    pub fn new(step_ms: f64, max_substeps: u32) -> Self {
        Self {
            step_ms,
            max_substeps,
            accumulator: 0.0,
        }
    }

    pub fn step_ms(&self) -> f64 {
        self.step_ms
    }

    /// Feed one frame's elapsed time; returns how many ticks are due
    pub fn frame(&mut self, frame_ms: f64) -> u32 {
        self.accumulator += frame_ms.clamp(0.0, MAX_FRAME_MS);
        let mut substeps = 0;
        while self.accumulator >= self.step_ms && substeps < self.max_substeps {
            self.accumulator -= self.step_ms;
            substeps += 1;
        }
        substeps
    }

    /// Run the due ticks against a shared engine
    pub fn drive<R: Rng>(&mut self, engine: &SharedEngine<R>, frame_ms: f64) -> u32 {
        let due = self.frame(frame_ms);
        for _ in 0..due {
            engine.tick(self.step_ms);
        }
        due
    }
}

/// Thread-safe handle to a single engine.
///
/// Every command and tick holds the engine lock for its whole duration, so
/// input never interleaves with a tick in progress. Readers get the last
/// published `Arc<Snapshot>` and never see a half-applied update.
#[derive(Debug)]
pub struct SharedEngine<R: Rng = Pcg32> {
    engine: Arc<Mutex<GameEngine<R>>>,
    published: Arc<RwLock<Arc<Snapshot>>>,
}

impl<R: Rng> Clone for SharedEngine<R> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            published: Arc::clone(&self.published),
        }
    }
}

impl<R: Rng> SharedEngine<R> {
    pub fn new(engine: GameEngine<R>) -> Self {
        let snapshot = Arc::new(engine.snapshot());
        Self {
            engine: Arc::new(Mutex::new(engine)),
            published: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Apply an input command and publish the result
    pub fn command(&self, command: Command) {
        let mut engine = self.lock();
        engine.apply(command);
        self.publish(&engine);
    }

    /// Advance one tick and publish the result
    pub fn tick(&self, dt_ms: f64) {
        let mut engine = self.lock();
        engine.tick(dt_ms);
        self.publish(&engine);
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        match self.published.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.lock().drain_events()
    }

    /// Run `f` with exclusive access to the engine
    pub fn with_engine<T>(&self, f: impl FnOnce(&mut GameEngine<R>) -> T) -> T {
        let mut engine = self.lock();
        let result = f(&mut engine);
        self.publish(&engine);
        result
    }

    fn lock(&self) -> MutexGuard<'_, GameEngine<R>> {
        self.engine
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, engine: &GameEngine<R>) {
        let snapshot = Arc::new(engine.snapshot());
        match self.published.write() {
            Ok(mut slot) => *slot = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }
}
