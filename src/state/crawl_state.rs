/// Crawl lifecycle state definitions
///
/// A crawl moves strictly forward through these states. The tracker shared
/// by the orchestrator and its helper tasks rejects any other move.
use crate::{Result, TrawlerError};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Represents the lifecycle state of one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlState {
    /// Options validated, restrictions being loaded
    Initializing,

    /// Root target being placed on the frontier
    Seeding,

    /// Workers pulling targets
    Running,

    /// In-flight count reached zero; workers finishing up
    Draining,

    // ===== Terminal States =====
    /// Crawl completed and results were collected
    Done,

    /// Crawl stopped on a fatal fetch error or failed health check
    Aborted,
}

impl CrawlState {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Initializing, Self::Seeding)
                | (Self::Seeding, Self::Running)
                | (Self::Running, Self::Draining)
                | (Self::Draining, Self::Done)
                | (Self::Running, Self::Aborted)
                | (Self::Draining, Self::Aborted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Seeding => "seeding",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared handle on the current crawl state
#[derive(Debug, Clone)]
pub struct StateTracker {
    state: Arc<Mutex<CrawlState>>,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker {
    /// Starts a tracker in [`CrawlState::Initializing`]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CrawlState::Initializing)),
        }
    }

    pub fn current(&self) -> CrawlState {
        *self.state.lock().unwrap()
    }

    /// Moves to `next`, or returns [`TrawlerError::InvalidTransition`]
    pub fn advance(&self, next: CrawlState) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if !state.can_transition_to(next) {
            return Err(TrawlerError::InvalidTransition {
                from: *state,
                to: next,
            });
        }

        info!("Crawl state changed: {} -> {}", *state, next);
        *state = next;
        Ok(())
    }
}
