//! Scheduled Sweep
//!
//! Every fixed interval, replays the readings from the trailing window
//! through the detection engine, one at a time. A failing reading is
//! logged and skipped; it never aborts the rest of the sweep.

use chrono::{Duration, Utc};
use detection::DetectionEngine;
use notifier::FaultNotifier;
use std::sync::Arc;
use storage::Repository;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Sweeper configuration
#[derive(Debug, Clone)]
pub struct SweeperConfig {
    /// Seconds between sweeps
    pub interval_secs: u64,
    /// Window of readings each sweep replays (seconds)
    pub lookback_secs: i64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            lookback_secs: 300,
        }
    }
}

/// Outcome counters for one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Readings processed to completion
    pub processed: usize,
    /// Readings whose processing failed and was skipped
    pub failed: usize,
    /// Faults produced (created or reused) across the sweep
    pub faults: usize,
}

/// Periodic sweep over recent readings
pub struct Sweeper<R, N> {
    engine: Arc<DetectionEngine<R, N>>,
    repository: Arc<R>,
    config: SweeperConfig,
}

impl<R: Repository, N: FaultNotifier> Sweeper<R, N> {
    pub fn new(
        engine: Arc<DetectionEngine<R, N>>,
        repository: Arc<R>,
        config: SweeperConfig,
    ) -> Self {
        info!(
            "Creating sweeper (interval {}s, lookback {}s)",
            config.interval_secs, config.lookback_secs
        );
        Self {
            engine,
            repository,
            config,
        }
    }

    /// Replay the current lookback window through the engine
    pub async fn sweep_once(&self) -> SweepStats {
        let since = Utc::now() - Duration::seconds(self.config.lookback_secs);
        let readings = match self.repository.readings_since(since) {
            Ok(readings) => readings,
            Err(err) => {
                warn!("Sweep could not fetch readings: {}", err);
                return SweepStats::default();
            }
        };

        let mut stats = SweepStats::default();
        for reading in &readings {
            match self.engine.handle_reading(reading).await {
                Ok(faults) => {
                    stats.processed += 1;
                    stats.faults += faults.len();
                }
                Err(err) => {
                    warn!(
                        "Sweep skipped a reading for model {}: {}",
                        reading.model_id, err
                    );
                    stats.failed += 1;
                }
            }
        }

        debug!(
            "Sweep done: {} processed, {} failed, {} faults",
            stats.processed, stats.failed, stats.faults
        );
        stats
    }

    /// Run sweeps on the configured interval until shutdown is signalled
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(self.config.interval_secs.max(1)));
        // The first tick fires immediately; skip it so startup ingest wins
        interval.tick().await;

        info!("Sweeper started");
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.sweep_once().await;
                }
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("Sweeper stopped");
    }
}
