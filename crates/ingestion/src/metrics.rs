//! Ingestion counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Ingestion metrics
///
/// Shared between the producing device task and the consumer.
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Frame sets produced by the device
    pub frames_produced: AtomicU64,

    /// Frame sets handed to the consumer
    pub frames_delivered: AtomicU64,

    /// Frame sets skipped because the consumer was busy
    pub frames_skipped: AtomicU64,

    /// Frame sets rejected by the assembler
    pub incomplete_frames: AtomicU64,

    /// Image buffer reallocations caused by format changes
    pub buffer_reallocations: AtomicU64,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_produced(&self) {
        self.frames_produced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivered(&self) {
        self.frames_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.frames_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_incomplete(&self) {
        self.incomplete_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reallocation(&self) {
        self.buffer_reallocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_produced: self.frames_produced.load(Ordering::Relaxed),
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            frames_skipped: self.frames_skipped.load(Ordering::Relaxed),
            incomplete_frames: self.incomplete_frames.load(Ordering::Relaxed),
            buffer_reallocations: self.buffer_reallocations.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_produced: u64,
    pub frames_delivered: u64,
    pub frames_skipped: u64,
    pub incomplete_frames: u64,
    pub buffer_reallocations: u64,
}
