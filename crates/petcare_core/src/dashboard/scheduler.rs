use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::engine::{AggregationEngine, RefreshPriority, RunOutcome};
use crate::error::CoreError;
use crate::types::Pet;
use crate::Result;

/// Current pet list, owned by the pet-management subsystem.
#[async_trait]
pub trait PetDirectory: Send + Sync {
    async fn pets(&self) -> Vec<Pet>;
}

#[async_trait]
impl PetDirectory for Vec<Pet> {
    async fn pets(&self) -> Vec<Pet> {
        self.clone()
    }
}

/// Whether the user is signed in and the app is in the foreground.
#[cfg_attr(test, mockall::automock)]
pub trait SessionGate: Send + Sync {
    fn is_active(&self) -> bool;
}

/// Settable [`SessionGate`] for hosts that track the session themselves.
#[derive(Debug, Default)]
pub struct SessionFlag(AtomicBool);

impl SessionFlag {
    pub fn new(active: bool) -> Self {
        Self(AtomicBool::new(active))
    }

    pub fn set_active(&self, active: bool) {
        self.0.store(active, Ordering::Release);
    }
}

impl SessionGate for SessionFlag {
    fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Gate failed: no pets to refresh.
    NoPets,
    /// Gate failed: nobody is signed in.
    Inactive,
    Ran(RunOutcome),
}

struct Ticker {
    engine: Arc<AggregationEngine>,
    pets: Arc<dyn PetDirectory>,
    session: Arc<dyn SessionGate>,
    interval: Duration,
}

impl Ticker {
    async fn tick(&self) -> TickOutcome {
        let pets = self.pets.pets().await;
        if pets.is_empty() {
            return TickOutcome::NoPets;
        }
        if !self.session.is_active() {
            return TickOutcome::Inactive;
        }
        TickOutcome::Ran(self.engine.run(&pets, RefreshPriority::Background).await)
    }

    async fn run_loop(self: Arc<Self>, token: CancellationToken) {
        info!(interval_secs = self.interval.as_secs(), "Dashboard refresh loop started");
        loop {
            if token.is_cancelled() {
                break;
            }
            tokio::select! {
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
            if token.is_cancelled() {
                break;
            }

            let outcome = self.tick().await;
            debug!(?outcome, "Dashboard refresh tick");
        }
        info!("Dashboard refresh loop stopped");
    }
}

struct ActiveLoop {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Re-runs the aggregation engine in the background on a fixed interval.
///
/// At most one loop exists per scheduler: `start` replaces any running loop.
/// Stopping cancels future ticks only; a run already in flight completes.
pub struct RefreshScheduler {
    ticker: Arc<Ticker>,
    active: Mutex<Option<ActiveLoop>>,
}

impl RefreshScheduler {
    pub fn new(
        engine: Arc<AggregationEngine>,
        pets: Arc<dyn PetDirectory>,
        session: Arc<dyn SessionGate>,
        interval: Duration,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(CoreError::invalid_config(
                "refresh.interval_secs",
                "refresh interval must be greater than zero",
            ));
        }
        Ok(Self {
            ticker: Arc::new(Ticker {
                engine,
                pets,
                session,
                interval,
            }),
            active: Mutex::new(None),
        })
    }

    /// Spawn the refresh loop on the current tokio runtime.
    pub fn start(&self) {
        let mut active = self.active.lock();
        if let Some(previous) = active.take() {
            debug!("Replacing existing dashboard refresh loop");
            previous.token.cancel();
        }

        let token = CancellationToken::new();
        let handle = tokio::spawn(self.ticker.clone().run_loop(token.clone()));
        *active = Some(ActiveLoop { token, handle });
    }

    /// Cancel the loop. Safe to call repeatedly.
    pub fn stop(&self) {
        if let Some(active) = self.active.lock().take() {
            active.token.cancel();
        }
    }

    /// Cancel the loop and wait for it to wind down, including any run that
    /// was in flight.
    pub async fn shutdown(&self) {
        let active = self.active.lock().take();
        if let Some(active) = active {
            active.token.cancel();
            if let Err(e) = active.handle.await {
                warn!(error = %e, "Dashboard refresh loop ended abnormally");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|active| !active.handle.is_finished())
    }

    /// Evaluate the gates once and run a background refresh if they pass.
    pub async fn tick(&self) -> TickOutcome {
        self.ticker.tick().await
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut().take() {
            active.token.cancel();
        }
    }
}
