//! Asynchronous click recording pipeline.
//!
//! A bounded queue sits between the redirect handlers (producers) and a
//! single background consumer that persists events one at a time.
//!
//! - Producers never wait: a full queue drops the event and counts it.
//! - The consumer persists in enqueue order. A failed write is logged and
//!   counted, then the event is discarded.
//! - On shutdown the receiving side is closed first, so new events are
//!   rejected, and everything already queued is drained.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::ClickRepository;

/// Result of offering an event to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    Accepted,
    /// Queue at capacity; event discarded.
    DroppedFull,
    /// Pipeline is shutting down; event discarded.
    DroppedClosed,
}

/// Point-in-time copy of the pipeline counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickStats {
    pub enqueued: u64,
    pub dropped_full: u64,
    pub dropped_closed: u64,
    pub persisted: u64,
    pub failed: u64,
}

impl ClickStats {
    /// Events accepted into the queue that have not reached a final state.
    pub fn in_flight(&self) -> u64 {
        self.enqueued
            .saturating_sub(self.persisted)
            .saturating_sub(self.failed)
    }
}

#[derive(Debug, Default)]
struct ClickCounters {
    enqueued: AtomicU64,
    dropped_full: AtomicU64,
    dropped_closed: AtomicU64,
    persisted: AtomicU64,
    failed: AtomicU64,
}

impl ClickCounters {
    fn snapshot(&self) -> ClickStats {
        ClickStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped_full: self.dropped_full.load(Ordering::Relaxed),
            dropped_closed: self.dropped_closed.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Producer handle held by request handlers. Cheap to clone.
#[derive(Clone)]
pub struct ClickSender {
    tx: mpsc::Sender<ClickEvent>,
    counters: Arc<ClickCounters>,
}

impl ClickSender {
    /// Offers an event to the queue without waiting.
    pub fn record(&self, event: ClickEvent) -> Enqueue {
        match self.tx.try_send(event) {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("clicks_enqueued_total").increment(1);
                Enqueue::Accepted
            }
            Err(mpsc::error::TrySendError::Full(event)) => {
                self.counters.dropped_full.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("clicks_dropped_total", "reason" => "queue_full").increment(1);
                warn!(link_id = %event.link_id, "Click queue full, dropping event");
                Enqueue::DroppedFull
            }
            Err(mpsc::error::TrySendError::Closed(event)) => {
                self.counters.dropped_closed.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("clicks_dropped_total", "reason" => "shutting_down")
                    .increment(1);
                debug!(link_id = %event.link_id, "Click pipeline closed, dropping event");
                Enqueue::DroppedClosed
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Number of events waiting for the consumer.
    pub fn queued(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn stats(&self) -> ClickStats {
        self.counters.snapshot()
    }
}

/// Outcome of waiting for the consumer to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drain {
    /// Queue emptied and the consumer exited.
    Drained(ClickStats),
    /// The bound elapsed first; the consumer was aborted.
    TimedOut(ClickStats),
    /// The consumer task panicked.
    Crashed(ClickStats),
}

/// Handle to the background consumer task.
pub struct ClickWorker {
    handle: JoinHandle<()>,
    counters: Arc<ClickCounters>,
}

impl ClickWorker {
    /// Waits for the consumer to drain, at most `limit`.
    ///
    /// The consumer only exits after shutdown was signalled (or every
    /// sender was dropped), so call this after triggering shutdown.
    pub async fn join(mut self, limit: Duration) -> Drain {
        match tokio::time::timeout(limit, &mut self.handle).await {
            Ok(Ok(())) => Drain::Drained(self.counters.snapshot()),
            Ok(Err(e)) => {
                error!(error = %e, "Click worker crashed");
                Drain::Crashed(self.counters.snapshot())
            }
            Err(_) => {
                self.handle.abort();
                Drain::TimedOut(self.counters.snapshot())
            }
        }
    }

    pub fn stats(&self) -> ClickStats {
        self.counters.snapshot()
    }
}

/// Starts the consumer and returns the producer handle plus the worker.
///
/// `shutdown` flipping to `true` closes the queue to new events; the worker
/// then drains what is left and exits. A `capacity` of zero is raised to one.
pub fn spawn_click_pipeline<R>(
    repository: Arc<R>,
    capacity: usize,
    shutdown: watch::Receiver<bool>,
) -> (ClickSender, ClickWorker)
where
    R: ClickRepository + ?Sized + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let counters = Arc::new(ClickCounters::default());

    let handle = tokio::spawn(run_click_worker(
        rx,
        repository,
        counters.clone(),
        shutdown,
    ));

    let sender = ClickSender {
        tx,
        counters: counters.clone(),
    };
    (sender, ClickWorker { handle, counters })
}

async fn run_click_worker<R>(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<R>,
    counters: Arc<ClickCounters>,
    mut shutdown: watch::Receiver<bool>,
) where
    R: ClickRepository + ?Sized,
{
    let mut closing = false;

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(event) => persist(repository.as_ref(), &counters, event).await,
                None => break,
            },
            _ = shutdown_requested(&mut shutdown), if !closing => {
                closing = true;
                info!(queued = rx.len(), "Click pipeline closing, draining queued events");
                rx.close();
            }
        }
    }

    let stats = counters.snapshot();
    info!(
        persisted = stats.persisted,
        failed = stats.failed,
        dropped = stats.dropped_full + stats.dropped_closed,
        "Click worker stopped"
    );
}

/// Resolves once `shutdown` reads `true` or its sender is gone.
///
/// The watch borrow is released before this returns, so the future can sit
/// in a `select!` whose other arms await.
pub(crate) async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}

async fn persist<R>(repository: &R, counters: &ClickCounters, event: ClickEvent)
where
    R: ClickRepository + ?Sized,
{
    match repository.record_click(&event).await {
        Ok(_) => {
            counters.persisted.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("clicks_persisted_total").increment(1);
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("clicks_failed_total").increment(1);
            error!(
                link_id = %event.link_id,
                retryable = e.is_retryable(),
                error = %e,
                "Failed to persist click event, dropping it"
            );
        }
    }
}
