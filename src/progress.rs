//! Cosmetic progress feedback while a video is being generated.
//!
//! The remote API reports no progress, so the counter is driven by a local
//! timer and never reaches 100 before the video is actually ready.

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Status lines cycled while waiting.
pub const STATUS_MESSAGES: [&str; 6] = [
    "Analyzing your visual references...",
    "Composing the cinematic structure...",
    "Optimizing digital lighting...",
    "Processing dynamic camera moves...",
    "Finalizing texture detail...",
    "Almost done! Preparing the preview...",
];

/// Message shown once the video is ready.
pub const COMPLETED_MESSAGE: &str = "Video created successfully!";

/// Time between ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(4);

/// Progress added per tick.
pub const PROGRESS_STEP: u8 = 5;

/// Highest value reachable before completion.
pub const PROGRESS_CAP: u8 = 95;

/// How long the completed state is shown before generating resets.
pub const COMPLETION_HOLD: Duration = Duration::from_secs(2);

/// What the user sees about an in-flight generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoState {
    /// True from start until the result (or error) has been shown.
    pub is_generating: bool,
    /// 0..=100.
    pub progress: u8,
    /// Current status line.
    pub message: String,
}

/// Advances [`VideoState`] on a fixed-rate timer.
#[derive(Debug, Clone)]
pub struct ProgressTicker {
    state: VideoState,
    message_index: usize,
}

impl Default for ProgressTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressTicker {
    /// Starts at 0% with the first status message.
    pub fn new() -> Self {
        Self {
            state: VideoState {
                is_generating: true,
                progress: 0,
                message: STATUS_MESSAGES[0].to_string(),
            },
            message_index: 0,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &VideoState {
        &self.state
    }

    /// Moves to the next message and adds a step, capped below completion.
    pub fn tick(&mut self) -> &VideoState {
        self.message_index = (self.message_index + 1) % STATUS_MESSAGES.len();
        self.state.message = STATUS_MESSAGES[self.message_index].to_string();
        self.state.progress = self
            .state
            .progress
            .saturating_add(PROGRESS_STEP)
            .min(PROGRESS_CAP);
        &self.state
    }

    /// Snaps to 100% with the completion message.
    pub fn complete(&mut self) -> &VideoState {
        self.state.progress = 100;
        self.state.message = COMPLETED_MESSAGE.to_string();
        &self.state
    }

    /// Leaves the generating state.
    pub fn finish(&mut self) -> &VideoState {
        self.state.is_generating = false;
        &self.state
    }

    /// Awaits `future`, ticking every [`TICK_INTERVAL`] until it resolves.
    ///
    /// `on_update` sees the initial state and every tick.
    pub async fn run<F, T>(&mut self, future: F, on_update: &mut impl FnMut(&VideoState)) -> T
    where
        F: Future<Output = T>,
    {
        on_update(&self.state);
        let mut interval = tokio::time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        tokio::pin!(future);

        loop {
            tokio::select! {
                biased;
                output = &mut future => return output,
                _ = interval.tick() => on_update(self.tick()),
            }
        }
    }
}
