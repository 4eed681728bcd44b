//! Difficulty Controller
//!
//! A single task owns the rate window and the current level. Everything else
//! talks to it through [`DifficultyHandle`], so no locks guard the state.
//!
//! Each difficulty query nudges the level by one step toward the target
//! rate. Reading the rate, adjusting and storing the level happen inside one
//! command, so concurrent queries never interleave.

use crate::application::config::PowConfig;
use crate::domain::repository::DifficultyManager;
use crate::error::{PowError, PowResult};
use platform::rate_limit::RateWindow;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

const MIN_BUCKET: Duration = Duration::from_millis(1);

#[derive(Debug)]
enum Command {
    RecordRequest,
    CurrentDifficulty(oneshot::Sender<i32>),
}

/// Cloneable mailbox of the controller task
#[derive(Debug, Clone)]
pub struct DifficultyHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl DifficultyManager for DifficultyHandle {
    fn record_request(&self) {
        // Records sent after stop are dropped
        let _ = self.tx.send(Command::RecordRequest);
    }

    async fn current_difficulty_percent(&self) -> PowResult<i32> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::CurrentDifficulty(reply_tx))
            .map_err(|_| PowError::DifficultyUnavailable)?;
        reply_rx.await.map_err(|_| PowError::DifficultyUnavailable)
    }
}

/// Owner of the controller task
///
/// Dropping it without calling [`stop`](Self::stop) also ends the task.
pub struct DifficultyController {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl DifficultyController {
    /// Start the controller task on the current runtime
    pub fn spawn(config: &PowConfig) -> (DifficultyHandle, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let state = DifficultyState::new(config, Instant::now());

        tracing::info!(
            target_rps = config.target_rps,
            step = config.difficulty_step,
            difficulty = state.level,
            "Difficulty controller started"
        );

        let task = tokio::spawn(run(state, rx, shutdown_rx));
        (
            DifficultyHandle { tx },
            Self {
                shutdown: shutdown_tx,
                task,
            },
        )
    }

    /// Stop the task and wait for it to exit
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Difficulty controller task failed");
        }
    }
}

struct DifficultyState {
    window: RateWindow,
    level: i32,
    step: i32,
    target_rps: f64,
}

impl DifficultyState {
    fn new(config: &PowConfig, now: Instant) -> Self {
        Self {
            window: RateWindow::new(
                config.initial_previous_bucket(),
                config.bucket.max(MIN_BUCKET),
                now.into_std(),
            ),
            level: config.initial_difficulty_percent.clamp(0, 100),
            step: config.difficulty_step,
            target_rps: config.target_rps,
        }
    }

    fn adjust(&mut self, now: Instant) -> i32 {
        let rps = self.window.rps(now.into_std());
        if rps > self.target_rps {
            self.level = self.level.saturating_add(self.step);
        } else if rps < self.target_rps {
            self.level = self.level.saturating_sub(self.step);
        }
        self.level = self.level.clamp(0, 100);

        tracing::debug!(rps, difficulty = self.level, "Difficulty adjusted");
        self.level
    }
}

async fn run(
    mut state: DifficultyState,
    mut rx: mpsc::UnboundedReceiver<Command>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let bucket = state.window.bucket();
    let mut ticker = time::interval_at(Instant::now() + bucket, bucket);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                state.window.roll_over(Instant::now().into_std());
            }
            command = rx.recv() => match command {
                Some(Command::RecordRequest) => state.window.record(),
                Some(Command::CurrentDifficulty(reply)) => {
                    let level = state.adjust(Instant::now());
                    let _ = reply.send(level);
                }
                None => break,
            },
        }
    }

    tracing::info!(difficulty = state.level, "Difficulty controller stopped");
}

/// Difficulty source that never changes (client side)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpDifficulty;

impl DifficultyManager for NoOpDifficulty {
    fn record_request(&self) {}

    async fn current_difficulty_percent(&self) -> PowResult<i32> {
        Ok(0)
    }
}
