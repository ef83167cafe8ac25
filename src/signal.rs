//! # Task Signaling Primitives
//!
//! Semaphore-style wakeups shared between the ingest path, the operator
//! controls and the render tasks.
//!
//! - [`Signal`]: counting semaphore. Signaling never blocks and every signal
//!   is delivered to exactly one wait.
//! - [`Refresh`]: binary semaphore for render requests. Signals coalesce
//!   while the renderer is busy.
//! - [`EdgeLine`]: debounced edge source. A trigger disables the line until
//!   the consuming task re-arms it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};

/// Counting semaphore wakeup
#[derive(Debug, Clone)]
pub struct Signal {
    permits: Arc<Semaphore>,
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

impl Signal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(0)),
        }
    }

    /// Increment the count; safe from any context.
    pub fn signal(&self) {
        self.permits.add_permits(1);
    }

    /// Suspend until the count is positive, then decrement it.
    pub async fn wait(&self) {
        // The semaphore is never closed, so acquire cannot fail
        if let Ok(permit) = self.permits.acquire().await {
            permit.forget();
        }
    }

    /// Decrement without waiting; false if nothing was pending.
    pub fn try_wait(&self) -> bool {
        match self.permits.try_acquire() {
            Ok(permit) => {
                permit.forget();
                true
            }
            Err(_) => false,
        }
    }

    /// Signals not yet consumed.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.permits.available_permits()
    }
}

/// Coalescing render-refresh request
#[derive(Debug, Clone, Default)]
pub struct Refresh {
    notify: Arc<Notify>,
}

impl Refresh {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a refresh.
    pub fn request(&self) {
        self.notify.notify_one();
    }

    /// Wait for the next refresh request.
    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Debounced edge-triggered input line
#[derive(Debug, Clone)]
pub struct EdgeLine {
    enabled: Arc<AtomicBool>,
    signal: Signal,
}

impl Default for EdgeLine {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeLine {
    /// Creates an enabled line.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
            signal: Signal::new(),
        }
    }

    /// Edge handler: disables the line and signals, if enabled.
    ///
    /// Returns false when the edge was suppressed as bounce.
    pub fn trigger(&self) -> bool {
        if self.enabled.swap(false, Ordering::AcqRel) {
            self.signal.signal();
            true
        } else {
            false
        }
    }

    /// Wait for a debounced edge.
    pub async fn wait(&self) {
        self.signal.wait().await;
    }

    /// Consume a pending edge without waiting.
    pub fn try_wait(&self) -> bool {
        self.signal.try_wait()
    }

    /// Re-enable the line after the settle delay.
    pub fn rearm(&self) {
        self.enabled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }
}
