//! # Background Integrity Monitor
//!
//! The [`IntegrityMonitor`] is an async task that periodically re-verifies
//! the live chain while the foreground keeps appending to it. Each tick it
//! takes a read lock, runs both verification passes
//! ([`check_links`](Chain::check_links) and
//! [`check_blocks`](Chain::check_blocks)), and releases the lock. Appends
//! are never blocked beyond that read-side critical section, and no lock is
//! held across an await point.
//!
//! ## State machine
//!
//! ```text
//! Idle ──tick──▶ Running ──ok──▶ Idle
//!                   │
//!                 fail──▶ Failed (terminal)
//! ```
//!
//! The first failed pass is terminal for the monitor instance: it emits one
//! [`IntegrityAlert`] to its observer channel, parks in `Failed`, and stops
//! scheduling further checks. The process keeps running in a flagged,
//! degraded state so the operator can inspect the chain; resuming
//! monitoring means spawning a new monitor. (A variant that keeps checking
//! and alerts repeatedly would also be defensible; stop-on-failure is the
//! documented contract here.)
//!
//! ## Shutdown
//!
//! The loop monitors a `tokio::sync::watch` channel and select-s it against
//! the tick sleep, so shutdown is prompt even mid-interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::config::MONITOR_INTERVAL;
use crate::storage::chain::{Chain, IntegrityViolation};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunable parameters for the integrity monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Time between verification passes. Each pass is O(n) in chain
    /// length; an unbounded pass on a very large chain would stall the
    /// next tick, which is acceptable at this system's intended scale.
    pub interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: MONITOR_INTERVAL,
        }
    }
}

// ---------------------------------------------------------------------------
// State & Alerts
// ---------------------------------------------------------------------------

/// Observable lifecycle state of a monitor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Between ticks; nothing wrong so far.
    Idle,
    /// A verification pass is in progress.
    Running,
    /// A violation was detected. Terminal for this instance.
    Failed,
}

/// Asynchronous failure notification sent to the monitor's observer.
#[derive(Debug, Clone)]
pub struct IntegrityAlert {
    /// The first violation the failing pass found.
    pub violation: IntegrityViolation,
    /// Chain length at the instant of detection.
    pub chain_len: usize,
    /// When the violation was detected.
    pub detected_at: DateTime<Utc>,
}

/// Handle to a spawned monitor: observe its state, request shutdown.
pub struct MonitorHandle {
    state: Arc<RwLock<MonitorState>>,
    shutdown: watch::Sender<bool>,
    task: tokio::task::JoinHandle<Result<(), IntegrityViolation>>,
}

impl MonitorHandle {
    /// Current lifecycle state of the monitored task.
    pub fn state(&self) -> MonitorState {
        *self.state.read()
    }

    /// Signal shutdown and wait for the task to finish.
    ///
    /// Returns `Ok(())` when the monitor exited without ever detecting a
    /// violation, `Err(violation)` when it had already failed. A task that
    /// crashed (panicked or was aborted) is logged and parks the handle's
    /// state in `Failed` so it cannot pass for a clean shutdown.
    pub async fn shutdown(self) -> Result<(), IntegrityViolation> {
        // A monitor that already stopped has dropped its receiver; the
        // failed send is expected then.
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(result) => result,
            Err(join_error) => {
                error!(error = %join_error, "integrity monitor task crashed");
                *self.state.write() = MonitorState::Failed;
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// IntegrityMonitor
// ---------------------------------------------------------------------------

/// Periodic background verifier over the shared live chain.
pub struct IntegrityMonitor {
    chain: Arc<RwLock<Chain>>,
    config: MonitorConfig,
    state: Arc<RwLock<MonitorState>>,
    alerts: mpsc::UnboundedSender<IntegrityAlert>,
}

impl IntegrityMonitor {
    /// Create a monitor over `chain`. Returns the monitor and the receiving
    /// end of its alert channel; the observer keeps the receiver.
    pub fn new(
        chain: Arc<RwLock<Chain>>,
        config: MonitorConfig,
    ) -> (Self, mpsc::UnboundedReceiver<IntegrityAlert>) {
        let (alerts, alert_rx) = mpsc::unbounded_channel();
        let monitor = Self {
            chain,
            config,
            state: Arc::new(RwLock::new(MonitorState::Idle)),
            alerts,
        };
        (monitor, alert_rx)
    }

    /// Spawn the monitor onto the current tokio runtime and return a
    /// handle that can observe and stop it.
    pub fn spawn(self) -> MonitorHandle {
        let state = Arc::clone(&self.state);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move { self.run(&mut shutdown_rx).await });
        MonitorHandle {
            state,
            shutdown: shutdown_tx,
            task,
        }
    }

    /// Run the monitor until shutdown or the first detected violation.
    ///
    /// Returns `Ok(())` on clean shutdown, `Err(violation)` after a failed
    /// pass (the same violation carried by the emitted alert).
    pub async fn run(
        &self,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), IntegrityViolation> {
        info!(
            interval_ms = self.config.interval.as_millis() as u64,
            "integrity monitor starting"
        );

        loop {
            if *shutdown.borrow() {
                info!("integrity monitor received shutdown signal, exiting cleanly");
                return Ok(());
            }

            // Sleep with shutdown awareness: wake early if shutdown fires.
            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = shutdown.changed() => {
                    info!("integrity monitor shutting down during sleep");
                    return Ok(());
                }
            }

            match self.run_single_pass() {
                Ok(chain_len) => {
                    debug!(blocks = chain_len, "integrity pass clean");
                }
                Err(alert) => {
                    error!(
                        violation = %alert.violation,
                        blocks = alert.chain_len,
                        "integrity violation detected, monitor stopping"
                    );
                    let violation = alert.violation.clone();
                    // The observer may be gone; detection still stands.
                    let _ = self.alerts.send(alert);
                    return Err(violation);
                }
            }
        }
    }

    /// Execute one verification pass over the live chain.
    ///
    /// Takes the read lock once, runs both checks against that snapshot,
    /// and transitions `Running -> Idle` or `Running -> Failed`. On success
    /// returns the verified chain length.
    pub fn run_single_pass(&self) -> Result<usize, IntegrityAlert> {
        *self.state.write() = MonitorState::Running;

        let (result, chain_len) = {
            let chain = self.chain.read();
            (
                chain.check_links().and_then(|()| chain.check_blocks()),
                chain.len(),
            )
        };

        match result {
            Ok(()) => {
                *self.state.write() = MonitorState::Idle;
                Ok(chain_len)
            }
            Err(violation) => {
                *self.state.write() = MonitorState::Failed;
                Err(IntegrityAlert {
                    violation,
                    chain_len,
                    detected_at: Utc::now(),
                })
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> MonitorState {
        *self.state.read()
    }

    /// The monitor's configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
