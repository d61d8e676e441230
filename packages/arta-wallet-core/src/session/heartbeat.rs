//! Session-activity heartbeat.
//!
//! While a session is active, a spawned task calls
//! `update_session_activity` on every interval tick. Failures are logged
//! and the loop continues. The task is aborted when the handle is stopped
//! or dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::backend::BackendClient;

/// Handle to a running heartbeat task
#[derive(Debug)]
pub(crate) struct Heartbeat {
    handle: JoinHandle<()>,
}

impl Heartbeat {
    /// Spawn the heartbeat; the first tick is one interval from now
    pub fn start(
        client: Arc<dyn BackendClient>,
        session_id: String,
        interval: Duration,
        call_timeout: Duration,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match tokio::time::timeout(call_timeout, client.update_session_activity(&session_id))
                    .await
                {
                    Ok(Ok(_)) => tracing::debug!(session_id = %session_id, "Session heartbeat"),
                    Ok(Err(e)) => {
                        tracing::warn!(session_id = %session_id, error = %e, "Session heartbeat failed")
                    }
                    Err(_) => tracing::warn!(session_id = %session_id, "Session heartbeat timed out"),
                }
            }
        });

        Self { handle }
    }

    /// Stop the heartbeat
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
