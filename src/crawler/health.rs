//! Worker pool health checks
//!
//! Readiness runs once, after a grace period, and verifies that every
//! worker loop registered. Liveness runs periodically for the rest of the
//! crawl and verifies that enough tasks are alive and that pages are still
//! being visited.

use crate::crawler::metrics::MetricsRecorder;
use crate::crawler::pool::{TaskGauge, WorkerRegistry};
use crate::HealthError;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Waits `grace`, then checks that `expected` workers registered
pub async fn readiness_check(
    registry: &WorkerRegistry,
    expected: usize,
    grace: Duration,
) -> Result<(), HealthError> {
    sleep(grace).await;

    let registered = registry.len();
    if registered != expected {
        return Err(HealthError::Readiness {
            registered,
            expected,
        });
    }

    debug!("Readiness check passed: {} workers registered", registered);
    Ok(())
}

/// Settings for [`liveness_check`]
#[derive(Debug, Clone)]
pub struct LivenessProbe {
    /// Minimum number of live tasks
    pub floor: usize,
    pub interval: Duration,

    /// Longest time allowed without a new page visit
    pub window: Duration,
}

/// Runs until the crawl stops or a liveness rule is broken
///
/// # Returns
///
/// * `Some(HealthError)` - A rule was broken while the crawl was running
/// * `None` - The crawl began stopping on its own
pub async fn liveness_check(
    probe: LivenessProbe,
    registry: WorkerRegistry,
    tasks: TaskGauge,
    metrics: MetricsRecorder,
) -> Option<HealthError> {
    let mut last_visited = metrics.urls_visited();
    let mut last_progress = Instant::now();

    loop {
        sleep(probe.interval).await;

        if registry.is_stopping() {
            return None;
        }

        let live = tasks.live();
        if live < probe.floor {
            return Some(HealthError::TaskFloor {
                live,
                floor: probe.floor,
            });
        }

        let visited = metrics.urls_visited();
        if visited != last_visited {
            last_visited = visited;
            last_progress = Instant::now();
        } else if last_progress.elapsed() >= probe.window {
            return Some(HealthError::Stalled {
                window_ms: probe.window.as_millis() as u64,
            });
        }

        debug!(
            "Liveness check passed: {} live tasks, {} pages visited",
            live, visited
        );
    }
}
