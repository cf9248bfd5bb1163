//! Per-hop callbacks.
//!
//! The engine reports every successful hop to a [`HopObserver`] as a
//! [`HopRecord`]. Contended selections are not reported.

use crossbeam_channel::Sender;
use hopkmc_core::HopRecord;

/// Receives every executed hop, in order.
pub trait HopObserver {
    /// Called once per successful hop, after the tree is updated.
    fn on_hop(&mut self, record: &HopRecord);
}

impl<F: FnMut(&HopRecord)> HopObserver for F {
    fn on_hop(&mut self, record: &HopRecord) {
        self(record)
    }
}

/// Discards every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl HopObserver for NoopObserver {
    fn on_hop(&mut self, _record: &HopRecord) {}
}

/// Collects records in memory.
#[derive(Clone, Debug, Default)]
pub struct TrajectoryRecorder {
    records: Vec<HopRecord>,
}

impl TrajectoryRecorder {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records so far.
    pub fn records(&self) -> &[HopRecord] {
        &self.records
    }

    /// Take ownership of the records.
    pub fn into_records(self) -> Vec<HopRecord> {
        self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl HopObserver for TrajectoryRecorder {
    fn on_hop(&mut self, record: &HopRecord) {
        self.records.push(*record);
    }
}

/// Forwards records to another thread.
///
/// Sends never block on an unbounded channel. Once the receiver is gone,
/// records are dropped and counted.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: Sender<HopRecord>,
    dropped: u64,
}

impl ChannelSink {
    /// Forward into `tx`.
    pub fn new(tx: Sender<HopRecord>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Records lost because the receiver disconnected.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl HopObserver for ChannelSink {
    fn on_hop(&mut self, record: &HopRecord) {
        if self.tx.send(*record).is_err() {
            if self.dropped == 0 {
                tracing::warn!("hop receiver disconnected, dropping records");
            }
            self.dropped += 1;
        }
    }
}
