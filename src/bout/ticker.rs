use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

use super::session::BoutSessionState;

/// Drives a session's match clock once per period.
///
/// At most one ticking task exists per ticker: `start` aborts the previous
/// task before spawning, so restarting never double-schedules.
#[derive(Debug, Default)]
pub struct ClockTicker {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ClockTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn start(&self, session: Arc<RwLock<BoutSessionState>>, period: Duration) {
        let mut handle = self.handle.lock().await;
        if let Some(previous) = handle.take() {
            previous.abort();
        }
        *handle = Some(tokio::spawn(run_clock(session, period)));
    }

    pub async fn stop(&self) {
        if let Some(previous) = self.handle.lock().await.take() {
            previous.abort();
        }
    }

    pub async fn is_active(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.get_mut().take() {
            handle.abort();
        }
    }
}

async fn run_clock(session: Arc<RwLock<BoutSessionState>>, period: Duration) {
    let mut ticks = interval_at(Instant::now() + period, period);

    loop {
        ticks.tick().await;

        let mut session = session.write().await;
        if !session.clock().is_running() {
            debug!(bout_id = %session.bout_id(), "Clock no longer running, ticker exits");
            break;
        }

        let remaining = session.tick_clock();
        if remaining == 0 {
            info!(bout_id = %session.bout_id(), "Match clock expired");
            break;
        }
    }
}
