//! Worker pool bookkeeping
//!
//! - `WorkerRegistry`: one stop slot per registered worker loop
//! - `TaskGauge`: count of live worker loops and fetch tasks

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Registry of worker stop slots
///
/// Workers register themselves when they start, which is what the
/// readiness check counts. Entries are never removed during a crawl.
#[derive(Debug, Clone, Default)]
pub struct WorkerRegistry {
    slots: Arc<Mutex<HashMap<usize, mpsc::Sender<()>>>>,
    stopping: Arc<AtomicBool>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers worker `id` and returns the receiving end of its stop slot
    ///
    /// A worker registering after [`WorkerRegistry::stop_all`] finds its
    /// stop already pending.
    pub fn register(&self, id: usize) -> mpsc::Receiver<()> {
        let (tx, rx) = mpsc::channel(1);
        let mut slots = self.slots.lock().unwrap();
        if self.is_stopping() {
            let _ = tx.try_send(());
        }
        slots.insert(id, tx);
        rx
    }

    /// Number of workers that have registered
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Signals every registered worker to stop; safe to call repeatedly
    pub fn stop_all(&self) {
        self.stopping.store(true, Ordering::SeqCst);
        for slot in self.slots.lock().unwrap().values() {
            // Full means a stop is already pending
            let _ = slot.try_send(());
        }
    }

    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }
}

/// Live task counter
#[derive(Debug, Clone, Default)]
pub struct TaskGauge {
    live: Arc<AtomicUsize>,
}

impl TaskGauge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the caller as live until the returned guard is dropped
    pub fn track(&self) -> TaskGuard {
        self.live.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            live: Arc::clone(&self.live),
        }
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Decrements the gauge on drop
#[derive(Debug)]
pub struct TaskGuard {
    live: Arc<AtomicUsize>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}
