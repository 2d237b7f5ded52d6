//! Value settling: only the last value of a burst gets through.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Identifies one pushed value; only the most recent ticket can settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Clock-free debounce state.
///
/// The caller owns the timer: push a value, wait the delay, then settle the
/// ticket it got back. Used by the desktop client, where timers are iced
/// commands rather than tasks we can abort.
#[derive(Debug)]
pub struct DebounceGate<T> {
    generation: u64,
    pending: Option<T>,
}

impl<T> DebounceGate<T> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            pending: None,
        }
    }

    /// Replace the pending value. Every earlier ticket becomes stale.
    pub fn push(&mut self, value: T) -> Ticket {
        self.generation += 1;
        self.pending = Some(value);
        Ticket(self.generation)
    }

    /// Take the pending value if `ticket` is still the latest one.
    pub fn settle(&mut self, ticket: Ticket) -> Option<T> {
        if ticket.0 != self.generation {
            return None;
        }
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending value. Outstanding tickets go stale; later pushes
    /// settle as usual.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.pending = None;
    }
}

impl<T> Default for DebounceGate<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Tokio-timed debouncer delivering settled values over a channel.
///
/// Each push aborts the running timer and starts a new one. Dropping the
/// debouncer aborts the pending timer, so nothing is delivered after
/// teardown.
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            tx,
            pending: None,
        };
        (debouncer, rx)
    }

    pub fn push(&mut self, value: T) {
        self.cancel();

        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the consumer was torn down.
            let _ = tx.send(value);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
