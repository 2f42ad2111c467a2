//! Per-tool concurrency limiter with a bounded FIFO wait queue.

use crate::types::{Error, Result};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

/// Snapshot of a limiter's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LimiterStats {
    pub limit: usize,
    pub in_flight: usize,
    pub queued: usize,
}

/// Caps concurrent invocations of one tool.
///
/// Slots are handed out in request order (tokio's semaphore is fair). Once
/// every slot is taken, at most `max_queue_depth` callers wait; the rest are
/// rejected with [`Error::Overload`].
#[derive(Debug)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    limit: usize,
    max_queue_depth: usize,
    queued: AtomicUsize,
}

impl ConcurrencyLimiter {
    pub fn new(limit: NonZeroUsize, max_queue_depth: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(limit.get())),
            limit: limit.get(),
            max_queue_depth,
            queued: AtomicUsize::new(0),
        }
    }

    /// Take a slot, waiting in line if allowed.
    ///
    /// The permit releases the slot when dropped, so a slot is returned
    /// exactly once no matter how the holder ends.
    pub async fn acquire(&self, tool: &str) -> Result<OwnedSemaphorePermit> {
        match Arc::clone(&self.semaphore).try_acquire_owned() {
            Ok(permit) => return Ok(permit),
            Err(TryAcquireError::Closed) => {
                return Err(Error::internal("concurrency limiter closed"));
            }
            Err(TryAcquireError::NoPermits) => {}
        }

        let _ticket = QueueTicket::enter(&self.queued, self.max_queue_depth).ok_or_else(|| {
            Error::Overload {
                tool: tool.to_string(),
                reason: format!(
                    "all {} slots busy and {} callers queued",
                    self.limit, self.max_queue_depth
                ),
            }
        })?;

        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| Error::internal("concurrency limiter closed"))
    }

    pub fn stats(&self) -> LimiterStats {
        LimiterStats {
            limit: self.limit,
            in_flight: self.limit.saturating_sub(self.semaphore.available_permits()),
            queued: self.queued.load(Ordering::SeqCst),
        }
    }

    #[cfg(test)]
    pub(crate) fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Holds one place in the wait queue; leaving (acquired or cancelled) frees it.
struct QueueTicket<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> QueueTicket<'a> {
    fn enter(counter: &'a AtomicUsize, max: usize) -> Option<Self> {
        let prev = counter.fetch_add(1, Ordering::SeqCst);
        if prev >= max {
            counter.fetch_sub(1, Ordering::SeqCst);
            return None;
        }
        Some(Self { counter })
    }
}

impl Drop for QueueTicket<'_> {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}
