//! Skip-when-busy frame hand-off
//!
//! At most one frame is in flight between the producer and the consumer.
//! While a frame is queued or being processed, newly offered frames are
//! dropped instead of queued.

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender, TrySendError};
use observability::metrics::record_frame_skipped;
use tracing::trace;

use crate::metrics::IngestionMetrics;

/// Result of offering a frame to the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    /// Frame handed to the consumer
    Accepted,
    /// Consumer busy; frame dropped
    Skipped,
    /// Consumer gone
    Closed,
}

/// Create a connected gate / receiver pair
pub fn frame_gate<T>(metrics: Arc<IngestionMetrics>) -> (FrameGate<T>, FrameReceiver<T>) {
    let (tx, rx) = bounded(1);
    let busy = Arc::new(AtomicBool::new(false));

    let gate = FrameGate {
        tx,
        busy: busy.clone(),
        metrics: metrics.clone(),
    };
    let receiver = FrameReceiver { rx, busy, metrics };
    (gate, receiver)
}

/// Producer side
pub struct FrameGate<T> {
    tx: Sender<T>,
    /// Set from acceptance until the consumer drops its `Delivery`
    busy: Arc<AtomicBool>,
    metrics: Arc<IngestionMetrics>,
}

impl<T> Clone for FrameGate<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            busy: self.busy.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<T> FrameGate<T> {
    /// Offer a frame; never blocks
    pub fn offer(&self, frame: T) -> Offer {
        self.offer_with(|| frame)
    }

    /// Like [`offer`](Self::offer), but only builds the frame when it will
    /// be accepted
    pub fn offer_with(&self, build: impl FnOnce() -> T) -> Offer {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.skip();
            return Offer::Skipped;
        }

        match self.tx.try_send(build()) {
            Ok(()) => Offer::Accepted,
            Err(TrySendError::Full(_)) => {
                self.skip();
                Offer::Skipped
            }
            Err(TrySendError::Closed(_)) => {
                self.busy.store(false, Ordering::Release);
                Offer::Closed
            }
        }
    }

    fn skip(&self) {
        self.metrics.record_skipped();
        record_frame_skipped();
        trace!("frame skipped, consumer busy");
    }

    /// Whether a frame is queued or being processed
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Close the channel; the receiver drains and then yields `None`
    pub fn close(&self) {
        self.tx.close();
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side
pub struct FrameReceiver<T> {
    rx: Receiver<T>,
    busy: Arc<AtomicBool>,
    metrics: Arc<IngestionMetrics>,
}

impl<T> FrameReceiver<T> {
    /// Wait for the next frame
    ///
    /// Returns `None` once every gate is dropped or the gate was closed.
    /// The gate stays busy until the returned `Delivery` is dropped.
    pub async fn recv(&self) -> Option<Delivery<T>> {
        let frame = self.rx.recv().await.ok()?;
        self.metrics.record_delivered();
        Some(Delivery {
            frame,
            _guard: BusyGuard {
                busy: self.busy.clone(),
            },
        })
    }
}

/// A received frame; holding it keeps the gate busy
pub struct Delivery<T> {
    frame: T,
    _guard: BusyGuard,
}

impl<T> Deref for Delivery<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.frame
    }
}

struct BusyGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
