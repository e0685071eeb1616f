//! Reconnection policy.
//!
//! Pure state machine, no IO: the channel actor asks it what to do after a
//! lost connection or failed dial. Transient loss gets a fixed backoff and
//! another attempt; exhaustion is terminal until an explicit reset. A
//! successful open zeroes the counter, so the budget applies to consecutive
//! failures, not lifetime ones.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Wait out the backoff, then dial again.
    Backoff(Duration),
    /// Budget exhausted: terminal failure, no further attempts.
    GiveUp,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Duration,
    attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
            attempts: 0,
        }
    }

    /// Connection reached open: consecutive-failure counter starts over.
    pub fn on_open(&mut self) {
        self.attempts = 0;
    }

    /// Decide the next step after a loss. Increments the counter when it
    /// grants an attempt.
    pub fn next_action(&mut self) -> RetryAction {
        if self.attempts >= self.max_retries {
            return RetryAction::GiveUp;
        }
        self.attempts += 1;
        RetryAction::Backoff(self.backoff)
    }

    /// Explicit re-arm after `GiveUp` (user-initiated retry).
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}
