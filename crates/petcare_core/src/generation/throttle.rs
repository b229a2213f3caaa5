//! Rate-limit aware wrapper around a [`ContentGenerator`].
//!
//! Provides:
//! - Minimum spacing between consecutive upstream calls
//! - Retry of rate-limited calls with exponential backoff and jitter
//! - Cooldown hints from the upstream error take precedence when longer

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::ContentGenerator;
use crate::Result;
use crate::types::{CalendarEvent, Pet, Reminder, Status, Tip};

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first call
    pub max_attempts: u8,
    /// Base backoff time in milliseconds
    pub base_backoff_ms: u64,
    /// Maximum backoff time in milliseconds
    pub max_backoff_ms: u64,
    /// Jitter range in milliseconds (added to backoff)
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 1000,
            max_backoff_ms: 30_000,
            jitter_ms: 500,
        }
    }
}

pub struct ThrottledGenerator<G> {
    inner: G,
    min_spacing: Duration,
    retry: RetryConfig,
    last_call: Mutex<Option<Instant>>,
}

impl<G: ContentGenerator> ThrottledGenerator<G> {
    pub fn new(inner: G, min_spacing: Duration, retry: RetryConfig) -> Self {
        Self {
            inner,
            min_spacing,
            retry,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until at least `min_spacing` has passed since the previous call.
    async fn pace(&self) {
        let mut last_call = self.last_call.lock().await;
        if let Some(previous) = *last_call {
            let ready_at = previous + self.min_spacing;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }
        *last_call = Some(Instant::now());
    }

    async fn with_retry<T, F, Fut>(&self, artifact: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T>> + Send,
        T: Send,
    {
        let mut attempt = 0u8;
        loop {
            attempt += 1;
            self.pace().await;

            match call().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let Some(hint) = e.rate_limit_hint() else {
                        return Err(e);
                    };
                    if attempt >= self.retry.max_attempts {
                        return Err(e);
                    }

                    let wait = hint.max(Duration::from_millis(calculate_backoff(
                        attempt,
                        &self.retry,
                    )));
                    tracing::warn!(
                        artifact,
                        attempt,
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "Generation rate limited, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }
}

#[async_trait]
impl<G: ContentGenerator> ContentGenerator for ThrottledGenerator<G> {
    async fn generate_tip(&self, pet: &Pet, events: &[CalendarEvent]) -> Result<Option<Tip>> {
        self.with_retry("tip", || self.inner.generate_tip(pet, events))
            .await
    }

    async fn generate_status(&self, pet: &Pet, events: &[CalendarEvent]) -> Status {
        self.pace().await;
        self.inner.generate_status(pet, events).await
    }

    async fn generate_reminders(
        &self,
        pet: &Pet,
        events: &[CalendarEvent],
    ) -> Result<Vec<Reminder>> {
        self.with_retry("reminders", || self.inner.generate_reminders(pet, events))
            .await
    }
}

/// Calculate exponential backoff with cap.
fn calculate_backoff(attempt: u8, config: &RetryConfig) -> u64 {
    let base = config.base_backoff_ms;
    let exponential = base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1) as u32));
    let capped = exponential.min(config.max_backoff_ms);
    let jitter = if config.jitter_ms > 0 {
        rand::rng().random_range(0..config.jitter_ms)
    } else {
        0
    };
    capped.saturating_add(jitter)
}
