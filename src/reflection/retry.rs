// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Retry policies shared by event handling and namespace cleanup

use crate::constants::retry;
use crate::error::{FarsideError, Result};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// How often and how fast an operation is retried
#[derive(Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    steps: u32,
    initial: Duration,
    factor: f64,
    retriable: fn(&FarsideError) -> bool,
}

impl RetryPolicy {
    /// Single attempt
    pub fn none() -> Self {
        Self {
            steps: 1,
            initial: Duration::ZERO,
            factor: 1.0,
            retriable: |_| false,
        }
    }

    /// Exponential backoff retrying every error but `NotFound`
    pub fn exponential(steps: u32, initial: Duration, factor: f64) -> Self {
        Self {
            steps: steps.max(1),
            initial,
            factor,
            retriable: |e| !e.is_not_found(),
        }
    }

    /// 4 attempts, 10ms initial delay, x5 per attempt
    pub fn default_backoff() -> Self {
        Self::exponential(
            retry::STEPS,
            Duration::from_millis(retry::INITIAL_DELAY_MILLIS),
            retry::FACTOR,
        )
    }

    /// Sleeps between attempts
    pub fn delays(&self) -> Vec<Duration> {
        let mut delays = Vec::new();
        let mut delay = self.initial;
        for _ in 1..self.steps {
            delays.push(delay);
            delay = delay.mul_f64(self.factor);
        }
        delays
    }

    /// Run `operation` until it succeeds, fails with a non-retriable error,
    /// or the attempt budget is spent. The last error is returned.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delays = self.delays().into_iter();
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !(self.retriable)(&e) => return Err(e),
                Err(e) => match delays.next() {
                    Some(delay) => {
                        warn!("Attempt {} failed, retrying in {:?}: {}", attempt, delay, e);
                        sleep(delay).await;
                        attempt += 1;
                    }
                    None => return Err(e),
                },
            }
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("steps", &self.steps)
            .field("initial", &self.initial)
            .field("factor", &self.factor)
            .finish()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}
