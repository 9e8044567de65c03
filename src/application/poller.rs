use crate::domain::payment::{PaymentLookup, PaymentStatus};
use crate::domain::ports::PaymentSourceArc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;

/// Default delay between status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Event delivered to the watcher of a payment.
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// A distinct status transition, reported exactly once per change.
    /// A missing record reports as an implicit `Pending`.
    Status(PaymentStatus),
    /// A transient fetch failure, reported once per error streak while
    /// polling continues.
    TransientError(String),
}

/// Polls the backend payment record for an order until a terminal status
/// or explicit stop.
///
/// Each `start` spawns a single owned task; the fetch is awaited inline so
/// at most one request is ever in flight (a tick that would overlap is
/// effectively skipped).
pub struct PaymentStatusPoller {
    source: PaymentSourceArc,
    interval: Duration,
}

impl PaymentStatusPoller {
    pub fn new(source: PaymentSourceArc, interval: Duration) -> Self {
        Self { source, interval }
    }

    pub fn start(&self, order_id: impl Into<String>) -> PaymentWatch {
        let (events_tx, events_rx) = mpsc::channel(16);
        let wake = Arc::new(Notify::new());
        let task = tokio::spawn(poll_loop(
            self.source.clone(),
            order_id.into(),
            self.interval,
            events_tx,
            wake.clone(),
        ));
        PaymentWatch {
            events: events_rx,
            wake,
            task,
        }
    }
}

/// Handle to an active poll. Dropping it cancels the task, so navigating
/// away can never leave an orphaned poller firing against a stale callback.
pub struct PaymentWatch {
    events: mpsc::Receiver<PollEvent>,
    wake: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PaymentWatch {
    /// Next event; `None` once polling has terminated.
    pub async fn next_event(&mut self) -> Option<PollEvent> {
        self.events.recv().await
    }

    /// Cloneable handle that forces an immediate re-fetch, used when the
    /// hosting view regains foreground visibility.
    pub fn waker(&self) -> PollWaker {
        PollWaker {
            wake: self.wake.clone(),
        }
    }

    /// Cancels the pending re-fetch. Safe to call repeatedly and after
    /// natural termination.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for PaymentWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Clone)]
pub struct PollWaker {
    wake: Arc<Notify>,
}

impl PollWaker {
    pub fn wake(&self) {
        self.wake.notify_one();
    }
}

async fn poll_loop(
    source: PaymentSourceArc,
    order_id: String,
    interval: Duration,
    events: mpsc::Sender<PollEvent>,
    wake: Arc<Notify>,
) {
    let mut last: Option<PaymentStatus> = None;
    let mut error_reported = false;

    loop {
        match source.fetch(&order_id).await {
            Ok(PaymentLookup::Found(record)) => {
                error_reported = false;
                let status = record.status;
                if last != Some(status) {
                    last = Some(status);
                    tracing::debug!(order_id = %order_id, status = %status, "payment status transition");
                    if events.send(PollEvent::Status(status)).await.is_err() {
                        return;
                    }
                }
                if status.is_terminal() {
                    return;
                }
            }
            Ok(PaymentLookup::NotYetCreated) => {
                // The backend write may lag the gateway redirect; display
                // as pending rather than as an error.
                error_reported = false;
                if last.is_none() {
                    last = Some(PaymentStatus::Pending);
                    if events
                        .send(PollEvent::Status(PaymentStatus::Pending))
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
            }
            Err(err) => {
                if !error_reported {
                    error_reported = true;
                    tracing::warn!(order_id = %order_id, error = %err, "payment status fetch failed");
                    if events
                        .send(PollEvent::TransientError(err.to_string()))
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = wake.notified() => {}
        }
    }
}
