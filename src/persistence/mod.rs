//! Player profile persistence and score submission
//!
//! Features:
//! - JSON profile file: high score, lifetime stats, leaderboard, offline queue
//! - Atomic save (write tmp, then rename over the profile)
//! - Submissions that fail upstream are queued and synced later

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highscores::HighScores;
use crate::sim::{AggregateStats, GameSummary};

/// Profile storage failures
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("profile io error: {0}")]
    Io(#[from] io::Error),
    #[error("profile encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Upstream submission failure
#[derive(Debug, Error)]
#[error("score submission failed: {0}")]
pub struct SubmitError(pub String);

/// Payload submitted upstream after a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSubmission {
    pub score: u64,
    pub game_data: GameSummary,
}

/// A batch stopped partway; the first `accepted` entries went upstream
#[derive(Debug, Error)]
#[error("{source} ({accepted} accepted before the failure)")]
pub struct BatchError {
    pub accepted: usize,
    pub source: SubmitError,
}

/// A submission waiting for connectivity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineScore {
    #[serde(flatten)]
    pub submission: ScoreSubmission,
    pub timestamp_ms: u64,
}

/// Transport for score submissions (HTTP client, message queue, ...)
pub trait ScoreSink {
    fn submit(&mut self, submission: &ScoreSubmission) -> Result<(), SubmitError>;

    /// Submit queued scores in order.
    ///
    /// On failure, `BatchError::accepted` counts the leading entries that were
    /// delivered. An all-or-nothing transport reports 0. The default submits
    /// one by one.
    fn submit_batch(&mut self, scores: &[OfflineScore]) -> Result<(), BatchError> {
        for (accepted, queued) in scores.iter().enumerate() {
            self.submit(&queued.submission)
                .map_err(|source| BatchError { accepted, source })?;
        }
        Ok(())
    }
}

/// Everything persisted between sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub high_score: u64,
    pub aggregate: AggregateStats,
    pub leaderboard: HighScores,
    pub offline_scores: Vec<OfflineScore>,
}

/// File-backed profile
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    profile: Profile,
}

impl ProfileStore {
    /// Load the profile at `path`; a missing or corrupt file yields a fresh profile
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let profile = match fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str::<Profile>(&json) {
                Ok(profile) => {
                    log::info!(
                        "Loaded profile: high score {}, {} games",
                        profile.high_score,
                        profile.aggregate.total_games
                    );
                    profile
                }
                Err(e) => {
                    log::warn!("Profile at {} is corrupt ({}), starting fresh", path.display(), e);
                    Profile::default()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!("No profile found, starting fresh");
                Profile::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, profile })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Write the profile atomically
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&self.profile)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        log::info!("Profile saved to {}", self.path.display());
        Ok(())
    }

    /// Store the engine's lifetime stats and a finished run.
    /// Returns the leaderboard rank the run achieved, if any.
    pub fn record_run(
        &mut self,
        aggregate: &AggregateStats,
        high_score: u64,
        score: u64,
        summary: &GameSummary,
        timestamp_ms: u64,
    ) -> Option<usize> {
        self.profile.aggregate = aggregate.clone();
        self.profile.high_score = self.profile.high_score.max(high_score);
        self.profile
            .leaderboard
            .add_score(score, summary.distance_traveled, timestamp_ms)
    }

    /// Submit a run, queueing it offline if the sink fails
    pub fn submit_or_queue(
        &mut self,
        sink: &mut dyn ScoreSink,
        submission: ScoreSubmission,
        timestamp_ms: u64,
    ) -> bool {
        match sink.submit(&submission) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{}; storing score {} offline", e, submission.score);
                self.queue_offline(submission, timestamp_ms);
                false
            }
        }
    }

    pub fn queue_offline(&mut self, submission: ScoreSubmission, timestamp_ms: u64) {
        self.profile.offline_scores.push(OfflineScore {
            submission,
            timestamp_ms,
        });
    }

    pub fn offline_count(&self) -> usize {
        self.profile.offline_scores.len()
    }

    /// Remove and return all queued submissions
    pub fn take_offline(&mut self) -> Vec<OfflineScore> {
        std::mem::take(&mut self.profile.offline_scores)
    }

    /// Push queued scores upstream. Delivered entries leave the queue even
    /// when the batch fails partway, so nothing is sent twice.
    /// Returns how many were synced.
    pub fn sync_offline(&mut self, sink: &mut dyn ScoreSink) -> Result<usize, SubmitError> {
        if self.profile.offline_scores.is_empty() {
            return Ok(0);
        }
        match sink.submit_batch(&self.profile.offline_scores) {
            Ok(()) => {
                let synced = self.take_offline().len();
                log::info!("Synced {} offline scores", synced);
                Ok(synced)
            }
            Err(BatchError { accepted, source }) => {
                let accepted = accepted.min(self.profile.offline_scores.len());
                self.profile.offline_scores.drain(..accepted);
                log::warn!(
                    "Offline sync stopped after {} scores, {} still queued",
                    accepted,
                    self.profile.offline_scores.len()
                );
                Err(source)
            }
        }
    }
}

/// Wall-clock milliseconds since the Unix epoch
pub fn unix_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
