//! Runner headless entry point
//!
//! Plays a few autopilot runs through the engine, the same way a windowed
//! host would: a fixed-step frame loop, input as commands, and snapshots for
//! the "renderer" (here just a lookahead for the autopilot). Finished runs are
//! recorded in the profile and submitted as JSON lines on stdout.
//!
//! Usage: runner [--seed N] [--runs N] [--config FILE] [--profile FILE]

use std::process::ExitCode;

use runner::GameConfig;
use runner::highscores::{HighScores, format_age};
use runner::persistence::{ProfileStore, ScoreSink, ScoreSubmission, SubmitError, unix_time_ms};
use runner::platform::{FrameScheduler, SharedEngine};
use runner::sim::{Command, GameEngine, GameEvent, GamePhase, Snapshot};

/// Give up on a run that survives this long
const MAX_TICKS_PER_RUN: u64 = 20_000;

struct Options {
    seed: u64,
    runs: u32,
    config: Option<String>,
    profile: String,
}

impl Options {
    fn parse() -> Result<Self, String> {
        let mut options = Options {
            seed: 1,
            runs: 3,
            config: None,
            profile: "runner_profile.json".to_string(),
        };
        let mut args = std::env::args().skip(1);
        while let Some(flag) = args.next() {
            let value = args
                .next()
                .ok_or_else(|| format!("missing value for {}", flag))?;
            match flag.as_str() {
                "--seed" => {
                    options.seed = value.parse().map_err(|_| format!("bad seed: {}", value))?
                }
                "--runs" => {
                    options.runs = value
                        .parse()
                        .map_err(|_| format!("bad run count: {}", value))?
                }
                "--config" => options.config = Some(value),
                "--profile" => options.profile = value,
                other => return Err(format!("unknown flag: {}", other)),
            }
        }
        Ok(options)
    }
}

/// Prints each submission as a JSON line
struct StdoutSink;

impl ScoreSink for StdoutSink {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<(), SubmitError> {
        let json = serde_json::to_string(submission).map_err(|e| SubmitError(e.to_string()))?;
        println!("{}", json);
        Ok(())
    }
}

/// Jump when the nearest obstacle ahead is inside the take-off window
fn autopilot_wants_jump(snapshot: &Snapshot) -> bool {
    let entity = &snapshot.entity;
    if entity.is_jumping {
        return false;
    }
    // Take off earlier as the world speeds up
    let lead = snapshot.world.current_speed * 14.0;
    snapshot.obstacles.iter().any(|o| {
        let gap = o.x - (entity.x + entity.size);
        gap > 0.0 && gap < lead
    })
}

fn load_config(path: Option<&str>) -> Result<GameConfig, String> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    GameConfig::from_json(&json).map_err(|e| format!("{}: {}", path, e))
}

fn run() -> Result<(), String> {
    let options = Options::parse()?;
    let config = load_config(options.config.as_deref())?;
    let mut store = ProfileStore::open(&options.profile).map_err(|e| e.to_string())?;
    log::info!("Using profile {}", store.path().display());

    let engine = GameEngine::new(config, options.seed)
        .map_err(|e| e.to_string())?
        .with_profile(
            store.profile().aggregate.clone(),
            store.profile().high_score,
        );
    let engine = SharedEngine::new(engine);
    let mut scheduler = FrameScheduler::default();
    let mut sink = StdoutSink;

    if let Err(e) = store.sync_offline(&mut sink) {
        log::warn!("{}", e);
    }

    for run in 1..=options.runs {
        engine.command(Command::Start);
        let first_tick = engine.snapshot().tick_count;
        while engine.snapshot().phase == GamePhase::Running {
            if autopilot_wants_jump(&engine.snapshot()) {
                engine.command(Command::Jump);
            }
            // One frame per tick, as on a steady 60Hz display
            let frame_ms = scheduler.step_ms();
            scheduler.drive(&engine, frame_ms);
            if engine.snapshot().tick_count - first_tick >= MAX_TICKS_PER_RUN {
                log::info!("Run {} survived {} ticks, stopping", run, MAX_TICKS_PER_RUN);
                engine.command(Command::Reset);
            }
        }

        for event in engine.drain_events() {
            if let GameEvent::GameOver { score, summary } = event {
                let (aggregate, high_score) =
                    engine.with_engine(|e| (e.aggregate().clone(), e.high_score()));
                let now = unix_time_ms();
                if let Some(rank) = store.record_run(&aggregate, high_score, score, &summary, now) {
                    log::info!("Run {} placed #{} on the leaderboard", run, rank);
                }
                let submission = ScoreSubmission {
                    score,
                    game_data: summary,
                };
                store.submit_or_queue(&mut sink, submission, now);
            }
        }
    }

    store.save().map_err(|e| e.to_string())?;
    let profile = store.profile();
    log::info!(
        "High score {}, {} games, best streak {}",
        profile.high_score,
        profile.aggregate.total_games,
        profile.aggregate.best_streak
    );
    print_leaderboard(&profile.leaderboard, unix_time_ms());
    Ok(())
}

fn print_leaderboard(leaderboard: &HighScores, now_ms: u64) {
    if leaderboard.is_empty() {
        eprintln!("No high scores yet");
        return;
    }
    if let Some(top) = leaderboard.top_score() {
        eprintln!("Best {}", top);
    }
    for (rank, entry) in leaderboard.entries.iter().enumerate() {
        eprintln!(
            "{:>2}. {:>6}  {:>6}m  {}",
            rank + 1,
            entry.score,
            entry.distance,
            format_age(now_ms, entry.timestamp_ms)
        );
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Runner (headless) starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("runner: {}", e);
            ExitCode::FAILURE
        }
    }
}
